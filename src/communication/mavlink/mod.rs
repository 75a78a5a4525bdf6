//! MAVLink 2.0 Telemetry
//!
//! Outbound telemetry for Ground Control Stations such as QGroundControl and
//! Mission Planner.
//!
//! # Architecture
//!
//! - **Gate**: per-kind "send requested" flags, consumed atomically
//! - **State**: gate plus the notice, command-ack and parameter-cursor slots
//! - **Status notifier**: calibration notice catalog for STATUSTEXT
//! - **Handlers**: message builders, stream-rate scheduler, parameter streamer
//! - **Writer**: MAVLink 2 framing via rust-mavlink
//! - **Transport**: non-blocking frame sink abstraction
//! - **Dispatcher**: build, encode and send every requested kind once per cycle
//! - **Task**: one periodic step tying the above together
//!
//! # Usage
//!
//! ```ignore
//! use fc_telemetry::communication::mavlink::{MessageKind, TelemetryState};
//!
//! static STATE: TelemetryState = TelemetryState::new();
//!
//! // From the command handler
//! STATE.set_command_ack(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM, MavResult::MAV_RESULT_ACCEPTED);
//! STATE.request_send(MessageKind::CommandAck);
//!
//! // From the calibration routine
//! STATE.publish_notice(Notice::Progress50.index())?;
//! ```

pub mod dispatcher; // Flag-gated dispatch cycle
pub mod gate; // Dispatch flags
pub mod handlers; // Message builders and schedulers
pub mod state; // Shared telemetry state
pub mod status_notifier; // STATUSTEXT notice catalog
pub mod task; // Telemetry task
pub mod transport; // Transport abstraction layer
pub mod writer; // Message writing

pub use dispatcher::{DispatchError, DispatchStats, TelemetryDispatcher};
pub use gate::{DispatchGate, MessageKind};
pub use state::{CommandAck, TelemetryState};
pub use status_notifier::{Notice, NoticeError, NoticeText};
pub use task::{TelemetryConfig, TelemetryTask};
