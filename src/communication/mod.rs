//! Communication Protocols
//!
//! # Protocols
//!
//! - **MAVLink 2.0**: telemetry to the ground control station
//!   - Periodic streams (HEARTBEAT, SYS_STATUS, GPS_RAW_INT, SCALED_IMU, ATTITUDE)
//!   - Parameter streaming (PARAM_VALUE)
//!   - Event messages (COMMAND_ACK, STATUSTEXT)

pub mod mavlink;
