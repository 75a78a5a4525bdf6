//! MAVLink Telemetry Handlers
//!
//! # Handlers
//!
//! - **Message builders**: HEARTBEAT, SYS_STATUS, PARAM_VALUE, GPS_RAW_INT,
//!   SCALED_IMU, ATTITUDE, COMMAND_ACK, STATUSTEXT
//! - **Stream scheduler**: raises the periodic flags at their configured rates
//! - **Parameter streamer**: walks the parameter cursor for list/read requests

pub mod param;
pub mod stream;
pub mod telemetry;

// Re-export commonly used types
pub use param::ParamStreamer;
pub use stream::{StreamConfig, StreamRates, StreamScheduler};
pub use telemetry::HeartbeatIdentity;
