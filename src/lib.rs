#![cfg_attr(not(test), no_std)]

//! fc_telemetry - Flag-gated MAVLink telemetry for flight controllers
//!
//! Encodes vehicle state into MAVLink messages and hands the frames to a
//! best-effort transport whenever an external scheduler (or an event such as a
//! calibration notice) requests them.

// Core systems (logging, parameter store)
pub mod core;

// Snapshot sources read by the telemetry encoders
pub mod devices;

// Communication protocols (MAVLink telemetry)
pub mod communication;

pub use communication::mavlink::{
    MessageKind, TelemetryConfig, TelemetryDispatcher, TelemetryState, TelemetryTask,
};
