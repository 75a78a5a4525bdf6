//! Telemetry Stream Scheduling
//!
//! Raises dispatch flags for the periodic message kinds at their configured rates.
//! The scheduler only decides *when*; the dispatcher builds and sends.
//!
//! # Periodic Kinds
//!
//! | Kind         | Default rate |
//! |--------------|--------------|
//! | HEARTBEAT    | 1 Hz         |
//! | SYS_STATUS   | 1 Hz         |
//! | GPS_RAW_INT  | 5 Hz         |
//! | SCALED_IMU   | 5 Hz         |
//! | ATTITUDE     | 10 Hz        |
//!
//! PARAM_VALUE, COMMAND_ACK and STATUSTEXT are event-driven and never raised here.

use crate::communication::mavlink::gate::MessageKind;
use crate::communication::mavlink::state::TelemetryState;

/// Per-kind stream rates in Hz (0 = disabled)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamRates {
    pub heartbeat_hz: u32,
    pub sys_status_hz: u32,
    pub gps_hz: u32,
    pub scaled_imu_hz: u32,
    pub attitude_hz: u32,
}

impl Default for StreamRates {
    fn default() -> Self {
        Self {
            heartbeat_hz: 1,
            sys_status_hz: 1,
            gps_hz: 5,
            scaled_imu_hz: 5,
            attitude_hz: 10,
        }
    }
}

/// Stream configuration for a single telemetry message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Target rate in Hz (0 = disabled)
    pub rate_hz: u32,
    /// Last send timestamp in microseconds
    pub last_send_us: u64,
}

impl StreamConfig {
    /// Sentinel for "never sent"
    const NEVER: u64 = u64::MAX;

    /// Create new stream config with specified rate
    pub const fn new(rate_hz: u32) -> Self {
        Self {
            rate_hz,
            last_send_us: Self::NEVER,
        }
    }

    /// Check if it's time to send based on rate and elapsed time
    pub fn should_send(&self, current_time_us: u64) -> bool {
        if self.rate_hz == 0 {
            return false; // Disabled
        }

        // First request goes out immediately
        if self.last_send_us == Self::NEVER {
            return true;
        }

        let interval_us = 1_000_000 / u64::from(self.rate_hz);
        current_time_us.saturating_sub(self.last_send_us) >= interval_us
    }

    /// Update last send timestamp
    pub fn mark_sent(&mut self, timestamp_us: u64) {
        self.last_send_us = timestamp_us;
    }
}

/// Rate scheduler for the periodic telemetry kinds
pub struct StreamScheduler {
    heartbeat: StreamConfig,
    sys_status: StreamConfig,
    gps: StreamConfig,
    scaled_imu: StreamConfig,
    attitude: StreamConfig,
}

impl StreamScheduler {
    /// Create a scheduler with the given rates
    pub fn new(rates: &StreamRates) -> Self {
        Self {
            heartbeat: StreamConfig::new(rates.heartbeat_hz),
            sys_status: StreamConfig::new(rates.sys_status_hz),
            gps: StreamConfig::new(rates.gps_hz),
            scaled_imu: StreamConfig::new(rates.scaled_imu_hz),
            attitude: StreamConfig::new(rates.attitude_hz),
        }
    }

    /// Change stream rates at runtime
    ///
    /// Send history is kept, so a stream whose rate rises fires as soon as the
    /// new, shorter interval has elapsed.
    pub fn update_rates(&mut self, rates: &StreamRates) {
        self.heartbeat.rate_hz = rates.heartbeat_hz;
        self.sys_status.rate_hz = rates.sys_status_hz;
        self.gps.rate_hz = rates.gps_hz;
        self.scaled_imu.rate_hz = rates.scaled_imu_hz;
        self.attitude.rate_hz = rates.attitude_hz;
    }

    /// Current stream rates
    pub fn rates(&self) -> StreamRates {
        StreamRates {
            heartbeat_hz: self.heartbeat.rate_hz,
            sys_status_hz: self.sys_status.rate_hz,
            gps_hz: self.gps.rate_hz,
            scaled_imu_hz: self.scaled_imu.rate_hz,
            attitude_hz: self.attitude.rate_hz,
        }
    }

    /// Stream configuration for a periodic kind
    pub fn config(&self, kind: MessageKind) -> Option<&StreamConfig> {
        match kind {
            MessageKind::Heartbeat => Some(&self.heartbeat),
            MessageKind::SysStatus => Some(&self.sys_status),
            MessageKind::GpsRawInt => Some(&self.gps),
            MessageKind::ScaledImu => Some(&self.scaled_imu),
            MessageKind::Attitude => Some(&self.attitude),
            _ => None,
        }
    }

    /// Raise the flag of every stream whose interval has elapsed
    ///
    /// # Arguments
    ///
    /// * `state` - Shared telemetry state
    /// * `now_us` - Current timestamp in microseconds
    ///
    /// # Returns
    ///
    /// Number of flags raised.
    pub fn tick(&mut self, state: &TelemetryState, now_us: u64) -> usize {
        let streams = [
            (MessageKind::Heartbeat, &mut self.heartbeat),
            (MessageKind::SysStatus, &mut self.sys_status),
            (MessageKind::GpsRawInt, &mut self.gps),
            (MessageKind::ScaledImu, &mut self.scaled_imu),
            (MessageKind::Attitude, &mut self.attitude),
        ];

        let mut raised = 0;
        for (kind, config) in streams {
            if config.should_send(now_us) {
                state.request_send(kind);
                config.mark_sent(now_us);
                raised += 1;
            }
        }
        raised
    }
}

impl Default for StreamScheduler {
    fn default() -> Self {
        Self::new(&StreamRates::default())
    }
}
