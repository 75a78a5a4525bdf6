//! Telemetry Snapshot Types
//!
//! Latest-value readings exposed by the estimator and sensor subsystems.
//! Units follow the drivers that produce them, not the wire format:
//!
//! - Attitude angles: degrees
//! - Angular rate: degrees/second
//! - Acceleration: g
//! - Magnetometer: device units (gauss)
//! - GPS position: degrees / meters, velocity m/s, accuracy meters
//! - Battery: volts / amps, CPU load: percent (0-100)
//!
//! Every getter returns a copy, so an encoder that reads a snapshot once sees
//! one consistent sample even if the producer updates it mid-encode.

use mavlink::common::GpsFixType as MavGpsFixType;
use nalgebra::Vector3;

/// Estimated vehicle attitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeSnapshot {
    /// Roll, pitch, yaw in degrees (x, y, z)
    pub angles_deg: Vector3<f32>,
}

impl Default for AttitudeSnapshot {
    fn default() -> Self {
        Self {
            angles_deg: Vector3::zeros(),
        }
    }
}

/// Calibrated inertial and magnetic sensor readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSnapshot {
    /// Accelerometer: g, body frame
    pub accel_g: Vector3<f32>,
    /// Gyroscope: degrees/second, body frame
    pub gyro_dps: Vector3<f32>,
    /// Magnetometer: device units, body frame
    pub mag: Vector3<f32>,
}

impl Default for ImuSnapshot {
    fn default() -> Self {
        Self {
            accel_g: Vector3::new(0.0, 0.0, 1.0), // 1g down
            gyro_dps: Vector3::zeros(),
            mag: Vector3::zeros(),
        }
    }
}

/// GPS fix type as reported by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpsFixType {
    /// No receiver connected
    NoGps,
    /// Receiver connected, no fix
    #[default]
    NoFix,
    /// 2D fix (latitude, longitude only)
    Fix2D,
    /// 3D fix (latitude, longitude, altitude)
    Fix3D,
    /// Differential GPS
    Dgps,
    /// RTK float solution
    RtkFloat,
    /// RTK fixed solution
    RtkFixed,
}

impl GpsFixType {
    /// Convert to the MAVLink GPS_FIX_TYPE enumeration
    pub fn to_mav(self) -> MavGpsFixType {
        match self {
            GpsFixType::NoGps => MavGpsFixType::GPS_FIX_TYPE_NO_GPS,
            GpsFixType::NoFix => MavGpsFixType::GPS_FIX_TYPE_NO_FIX,
            GpsFixType::Fix2D => MavGpsFixType::GPS_FIX_TYPE_2D_FIX,
            GpsFixType::Fix3D => MavGpsFixType::GPS_FIX_TYPE_3D_FIX,
            GpsFixType::Dgps => MavGpsFixType::GPS_FIX_TYPE_DGPS,
            GpsFixType::RtkFloat => MavGpsFixType::GPS_FIX_TYPE_RTK_FLOAT,
            GpsFixType::RtkFixed => MavGpsFixType::GPS_FIX_TYPE_RTK_FIXED,
        }
    }
}

/// GPS receiver solution
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsSnapshot {
    /// Receiver timestamp in milliseconds
    pub time_ms: u64,
    /// Latitude in degrees (-90 to +90)
    pub latitude_deg: f64,
    /// Longitude in degrees (-180 to +180)
    pub longitude_deg: f64,
    /// Altitude above mean sea level in meters
    pub altitude_m: f32,
    /// Horizontal accuracy estimate in meters
    pub h_acc_m: f32,
    /// Vertical accuracy estimate in meters
    pub v_acc_m: f32,
    /// North velocity in m/s
    pub vel_north_mps: f32,
    /// East velocity in m/s
    pub vel_east_mps: f32,
    /// Fix type
    pub fix_type: GpsFixType,
    /// Satellites used in the solution
    pub satellites: u8,
}

/// Battery monitor reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatterySnapshot {
    /// Pack voltage in volts
    pub voltage: f32,
    /// Pack current in amps
    pub current: f32,
}

/// Read-only access to the latest telemetry snapshots.
///
/// Implementations must be cheap and non-blocking: the dispatcher calls these
/// from its cycle, once per encoded frame.
pub trait TelemetrySources {
    /// Estimated attitude
    fn attitude(&self) -> AttitudeSnapshot;

    /// Accelerometer, gyroscope and magnetometer readings
    fn imu(&self) -> ImuSnapshot;

    /// Latest GPS solution
    fn gps(&self) -> GpsSnapshot;

    /// Battery voltage and current
    fn battery(&self) -> BatterySnapshot;

    /// CPU load in percent (0-100)
    fn cpu_load(&self) -> f32;

    /// Milliseconds since boot
    fn uptime_ms(&self) -> u32;
}

impl<S: TelemetrySources + ?Sized> TelemetrySources for &S {
    fn attitude(&self) -> AttitudeSnapshot {
        (**self).attitude()
    }

    fn imu(&self) -> ImuSnapshot {
        (**self).imu()
    }

    fn gps(&self) -> GpsSnapshot {
        (**self).gps()
    }

    fn battery(&self) -> BatterySnapshot {
        (**self).battery()
    }

    fn cpu_load(&self) -> f32 {
        (**self).cpu_load()
    }

    fn uptime_ms(&self) -> u32 {
        (**self).uptime_ms()
    }
}
