//! MAVLink Telemetry Message Builders
//!
//! Turns snapshot readings and shared slots into typed MAVLink messages.
//! Each builder is a pure function; the dispatcher decides when to call it and
//! hands the result to the codec.
//!
//! # Supported Messages
//!
//! - **HEARTBEAT**: fixed vehicle identity
//! - **SYS_STATUS**: CPU load, battery voltage/current (tenths)
//! - **PARAM_VALUE**: parameter at the stream cursor
//! - **GPS_RAW_INT**: receiver solution (degE7, mm, cm)
//! - **SCALED_IMU**: accel (mG), gyro (mrad/s), mag (x1000)
//! - **ATTITUDE**: roll/pitch/yaw and body rates in radians
//! - **COMMAND_ACK**: last recorded command outcome
//! - **STATUSTEXT**: staged notice text
//!
//! # Numeric Conversions
//!
//! Float to integer casts saturate at the field's range and map NaN to 0.
//! Latitude/longitude round to nearest; every other scaled field truncates
//! toward zero.

use crate::communication::mavlink::state::CommandAck;
use crate::communication::mavlink::status_notifier::NoticeText;
use crate::core::parameters::{ParamStoreError, ParameterStore, PARAM_ID_LEN};
use crate::devices::traits::{AttitudeSnapshot, BatterySnapshot, GpsSnapshot, ImuSnapshot};
use mavlink::common::{
    MavAutopilot, MavMessage, MavModeFlag, MavParamType, MavState, MavSysStatusSensor, MavType,
    ATTITUDE_DATA, COMMAND_ACK_DATA, GPS_RAW_INT_DATA, HEARTBEAT_DATA, PARAM_VALUE_DATA,
    SCALED_IMU_DATA, STATUSTEXT_DATA, SYS_STATUS_DATA,
};
use nalgebra::Vector3;

/// MAVLink protocol version advertised in HEARTBEAT
const MAVLINK_VERSION: u8 = 3;

/// Course over ground "unknown" sentinel
pub const COG_UNKNOWN: u16 = u16::MAX;

/// Battery remaining "unknown" sentinel
pub const BATTERY_REMAINING_UNKNOWN: i8 = -1;

/// Fixed identity reported in HEARTBEAT
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartbeatIdentity {
    /// Vehicle type
    pub mav_type: MavType,
    /// Autopilot type
    pub autopilot: MavAutopilot,
    /// System status
    pub system_status: MavState,
}

impl Default for HeartbeatIdentity {
    /// Quadrotor reporting as PX4, so QGroundControl enables its multirotor
    /// calibration and parameter screens.
    fn default() -> Self {
        Self {
            mav_type: MavType::MAV_TYPE_QUADROTOR,
            autopilot: MavAutopilot::MAV_AUTOPILOT_PX4,
            system_status: MavState::MAV_STATE_STANDBY,
        }
    }
}

/// Build HEARTBEAT message
pub fn build_heartbeat(identity: &HeartbeatIdentity) -> MavMessage {
    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 0,
        mavtype: identity.mav_type,
        autopilot: identity.autopilot,
        base_mode: MavModeFlag::empty(),
        system_status: identity.system_status,
        mavlink_version: MAVLINK_VERSION,
    })
}

/// Build SYS_STATUS message
///
/// Load, voltage and current are all sent in tenths of their source unit.
/// Sensor bitmasks are unused and battery remaining is reported as unknown.
pub fn build_sys_status(battery: &BatterySnapshot, cpu_load_percent: f32) -> MavMessage {
    MavMessage::SYS_STATUS(SYS_STATUS_DATA {
        onboard_control_sensors_present: MavSysStatusSensor::empty(),
        onboard_control_sensors_enabled: MavSysStatusSensor::empty(),
        onboard_control_sensors_health: MavSysStatusSensor::empty(),
        load: (cpu_load_percent * 10.0) as u16,
        voltage_battery: (battery.voltage * 10.0) as u16,
        current_battery: (battery.current * 10.0) as i16,
        battery_remaining: BATTERY_REMAINING_UNKNOWN,
        ..Default::default()
    })
}

/// Build PARAM_VALUE message for the parameter at `index`
///
/// The name is copied into the 16-byte `param_id` field and zero padded; a
/// name of exactly 16 bytes is sent without a terminator.
pub fn build_param_value<P: ParameterStore + ?Sized>(
    params: &P,
    index: u16,
) -> Result<MavMessage, ParamStoreError> {
    let param_value = params.value(index)?;
    let name = params.name(index)?.as_bytes();

    let mut param_id = [0u8; PARAM_ID_LEN];
    let copy_len = name.len().min(PARAM_ID_LEN);
    param_id[..copy_len].copy_from_slice(&name[..copy_len]);

    Ok(MavMessage::PARAM_VALUE(PARAM_VALUE_DATA {
        param_value,
        param_count: params.count(),
        param_index: index,
        param_id: param_id.into(),
        param_type: MavParamType::MAV_PARAM_TYPE_REAL32,
    }))
}

/// Build GPS_RAW_INT message
pub fn build_gps_raw_int(gps: &GpsSnapshot) -> MavMessage {
    MavMessage::GPS_RAW_INT(GPS_RAW_INT_DATA {
        time_usec: gps.time_ms.saturating_mul(1000),
        lat: libm::round(gps.latitude_deg * 1e7) as i32,
        lon: libm::round(gps.longitude_deg * 1e7) as i32,
        alt: (gps.altitude_m * 1000.0) as i32,
        eph: (gps.h_acc_m * 100.0) as u16,
        epv: (gps.v_acc_m * 100.0) as u16,
        vel: ground_speed(gps) as u16,
        cog: COG_UNKNOWN,
        fix_type: gps.fix_type.to_mav(),
        satellites_visible: gps.satellites,
        ..Default::default()
    })
}

/// Horizontal speed: Euclidean norm of the north/east velocity
pub fn ground_speed(gps: &GpsSnapshot) -> f32 {
    libm::hypotf(gps.vel_north_mps, gps.vel_east_mps)
}

/// Build SCALED_IMU message
pub fn build_scaled_imu(imu: &ImuSnapshot, time_boot_ms: u32) -> MavMessage {
    let accel = milli(imu.accel_g);
    let gyro = milli(degrees_to_radians(imu.gyro_dps));
    let mag = milli(imu.mag);

    MavMessage::SCALED_IMU(SCALED_IMU_DATA {
        time_boot_ms,
        xacc: accel[0],
        yacc: accel[1],
        zacc: accel[2],
        xgyro: gyro[0],
        ygyro: gyro[1],
        zgyro: gyro[2],
        xmag: mag[0],
        ymag: mag[1],
        zmag: mag[2],
        ..Default::default()
    })
}

/// Build ATTITUDE message
///
/// Angles come from the attitude estimate, body rates from the gyroscope.
pub fn build_attitude(
    attitude: &AttitudeSnapshot,
    gyro_dps: Vector3<f32>,
    time_boot_ms: u32,
) -> MavMessage {
    let angles = degrees_to_radians(attitude.angles_deg);
    let rates = degrees_to_radians(gyro_dps);

    MavMessage::ATTITUDE(ATTITUDE_DATA {
        time_boot_ms,
        roll: angles.x,
        pitch: angles.y,
        yaw: angles.z,
        rollspeed: rates.x,
        pitchspeed: rates.y,
        yawspeed: rates.z,
    })
}

/// Build COMMAND_ACK message
pub fn build_command_ack(ack: &CommandAck) -> MavMessage {
    MavMessage::COMMAND_ACK(COMMAND_ACK_DATA {
        command: ack.command,
        result: ack.result,
        ..Default::default()
    })
}

/// Build STATUSTEXT message (single chunk)
pub fn build_status_text(notice: &NoticeText) -> MavMessage {
    MavMessage::STATUSTEXT(STATUSTEXT_DATA {
        severity: notice.severity,
        text: notice.text.into(),
    })
}

fn degrees_to_radians(v: Vector3<f32>) -> Vector3<f32> {
    v.map(f32::to_radians)
}

fn milli(v: Vector3<f32>) -> [i16; 3] {
    [
        (v.x * 1000.0) as i16,
        (v.y * 1000.0) as i16,
        (v.z * 1000.0) as i16,
    ]
}
