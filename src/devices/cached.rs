//! Cached snapshot sources
//!
//! Holds the most recent reading from each producer (AHRS, IMU driver, GPS driver,
//! battery monitor, CPU-load sampler). Producers publish through the `update_*`
//! setters from their own tasks or interrupt handlers; the telemetry dispatcher
//! reads through [`TelemetrySources`].
//!
//! Each snapshot lives behind its own critical-section mutex, so a reader always
//! gets a whole sample and unrelated producers never contend on one lock.

use crate::devices::traits::{
    AttitudeSnapshot, BatterySnapshot, GpsSnapshot, ImuSnapshot, TelemetrySources,
};
use core::cell::Cell;
use critical_section::Mutex;

/// Latest-value store implementing [`TelemetrySources`]
pub struct CachedSources {
    attitude: Mutex<Cell<Option<AttitudeSnapshot>>>,
    imu: Mutex<Cell<Option<ImuSnapshot>>>,
    gps: Mutex<Cell<Option<GpsSnapshot>>>,
    battery: Mutex<Cell<Option<BatterySnapshot>>>,
    cpu_load: Mutex<Cell<f32>>,
    uptime_ms: Mutex<Cell<u32>>,
}

impl CachedSources {
    /// Create an empty cache (const constructor for static initialization)
    ///
    /// Getters return the snapshot type's default until the first update.
    pub const fn new() -> Self {
        Self {
            attitude: Mutex::new(Cell::new(None)),
            imu: Mutex::new(Cell::new(None)),
            gps: Mutex::new(Cell::new(None)),
            battery: Mutex::new(Cell::new(None)),
            cpu_load: Mutex::new(Cell::new(0.0)),
            uptime_ms: Mutex::new(Cell::new(0)),
        }
    }

    /// Publish a new attitude estimate
    pub fn update_attitude(&self, attitude: AttitudeSnapshot) {
        critical_section::with(|cs| self.attitude.borrow(cs).set(Some(attitude)));
    }

    /// Publish new IMU readings
    pub fn update_imu(&self, imu: ImuSnapshot) {
        critical_section::with(|cs| self.imu.borrow(cs).set(Some(imu)));
    }

    /// Publish a new GPS solution
    pub fn update_gps(&self, gps: GpsSnapshot) {
        critical_section::with(|cs| self.gps.borrow(cs).set(Some(gps)));
    }

    /// Publish a new battery reading
    pub fn update_battery(&self, battery: BatterySnapshot) {
        critical_section::with(|cs| self.battery.borrow(cs).set(Some(battery)));
    }

    /// Publish CPU load in percent
    pub fn update_cpu_load(&self, percent: f32) {
        critical_section::with(|cs| self.cpu_load.borrow(cs).set(percent));
    }

    /// Publish system uptime in milliseconds
    pub fn update_uptime_ms(&self, uptime_ms: u32) {
        critical_section::with(|cs| self.uptime_ms.borrow(cs).set(uptime_ms));
    }
}

impl Default for CachedSources {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySources for CachedSources {
    fn attitude(&self) -> AttitudeSnapshot {
        critical_section::with(|cs| self.attitude.borrow(cs).get()).unwrap_or_default()
    }

    fn imu(&self) -> ImuSnapshot {
        critical_section::with(|cs| self.imu.borrow(cs).get()).unwrap_or_default()
    }

    fn gps(&self) -> GpsSnapshot {
        critical_section::with(|cs| self.gps.borrow(cs).get()).unwrap_or_default()
    }

    fn battery(&self) -> BatterySnapshot {
        critical_section::with(|cs| self.battery.borrow(cs).get()).unwrap_or_default()
    }

    fn cpu_load(&self) -> f32 {
        critical_section::with(|cs| self.cpu_load.borrow(cs).get())
    }

    fn uptime_ms(&self) -> u32 {
        critical_section::with(|cs| self.uptime_ms.borrow(cs).get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_defaults_before_first_update() {
        let sources = CachedSources::new();
        assert_eq!(sources.attitude(), AttitudeSnapshot::default());
        assert_eq!(sources.imu(), ImuSnapshot::default());
        assert_eq!(sources.cpu_load(), 0.0);
        assert_eq!(sources.uptime_ms(), 0);
    }

    #[test]
    fn test_update_replaces_whole_snapshot() {
        let sources = CachedSources::new();
        sources.update_attitude(AttitudeSnapshot {
            angles_deg: Vector3::new(10.0, -5.0, 90.0),
        });
        sources.update_attitude(AttitudeSnapshot {
            angles_deg: Vector3::new(1.0, 2.0, 3.0),
        });
        assert_eq!(sources.attitude().angles_deg, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_battery_and_uptime() {
        let sources = CachedSources::new();
        sources.update_battery(BatterySnapshot {
            voltage: 12.6,
            current: 3.2,
        });
        sources.update_uptime_ms(42_000);
        assert_eq!(sources.battery().voltage, 12.6);
        assert_eq!(sources.uptime_ms(), 42_000);
    }
}
