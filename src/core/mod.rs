//! Core flight-controller infrastructure
//!
//! Logging macros and the parameter store the telemetry link reads from.

pub mod logging;
pub mod parameters;
