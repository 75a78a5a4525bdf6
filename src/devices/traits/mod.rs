//! Device traits
//!
//! Hardware-independent views of the sensor and estimator subsystems.
//! The telemetry dispatcher only ever reads through these traits, which keeps it
//! testable on the host with [`crate::devices::CachedSources`].

pub mod snapshot;

pub use snapshot::{
    AttitudeSnapshot, BatterySnapshot, GpsFixType, GpsSnapshot, ImuSnapshot, TelemetrySources,
};
