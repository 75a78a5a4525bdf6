//! Telemetry Task
//!
//! Ties the rate scheduler, the parameter streamer and the dispatcher into one
//! periodic step, plus the Embassy loop that drives it.
//!
//! # Task Responsibilities
//!
//! Each step, in order:
//!
//! 1. **Rate scheduling**: raise flags for periodic streams that are due
//! 2. **Parameter streaming**: advance the parameter cursor if the previous
//!    PARAM_VALUE has gone out
//! 3. **Dispatch**: emit every kind whose flag is raised
//!
//! # Usage
//!
//! ```ignore
//! use fc_telemetry::communication::mavlink::{
//!     state::TelemetryState,
//!     task::{run_telemetry_loop, TelemetryConfig, TelemetryTask},
//! };
//!
//! static STATE: TelemetryState = TelemetryState::new();
//!
//! #[embassy_executor::task]
//! async fn telemetry(sources: &'static CachedSources, uart: UartQueue) {
//!     let config = TelemetryConfig::from_build_env();
//!     let task = TelemetryTask::new(&STATE, sources, &PARAMS, config.writer(), uart, &config);
//!     run_telemetry_loop(task).await
//! }
//! ```

use super::dispatcher::TelemetryDispatcher;
use super::handlers::{HeartbeatIdentity, ParamStreamer, StreamRates, StreamScheduler};
use super::state::TelemetryState;
use super::transport::FrameTransport;
use super::writer::{MavlinkWriter, MessageCodec};
use crate::core::parameters::{ParamStoreError, ParameterStore};
use crate::devices::traits::TelemetrySources;

/// Period of one telemetry step (100 Hz)
pub const TICK_PERIOD_MS: u64 = 10;

/// Telemetry configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryConfig {
    /// System ID (MAVLink system ID for this vehicle)
    pub system_id: u8,
    /// Component ID (MAVLink component ID, typically 1 for autopilot)
    pub component_id: u8,
    /// Identity reported in HEARTBEAT
    pub identity: HeartbeatIdentity,
    /// Periodic stream rates
    pub rates: StreamRates,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            system_id: 1,
            component_id: 1,
            identity: HeartbeatIdentity::default(),
            rates: StreamRates::default(),
        }
    }
}

impl TelemetryConfig {
    /// Configuration with IDs baked in at build time
    ///
    /// Reads `FC_MAV_SYSTEM_ID` and `FC_MAV_COMPONENT_ID` as captured by the
    /// build script. Unparseable values and 0 (broadcast) fall back to 1.
    pub fn from_build_env() -> Self {
        Self {
            system_id: parse_id(env!("FC_MAV_SYSTEM_ID")),
            component_id: parse_id(env!("FC_MAV_COMPONENT_ID")),
            ..Self::default()
        }
    }

    /// MAVLink 2 writer stamping this configuration's IDs
    pub fn writer(&self) -> MavlinkWriter {
        MavlinkWriter::new(self.system_id, self.component_id)
    }
}

fn parse_id(raw: &str) -> u8 {
    match raw.trim().parse::<u8>() {
        Ok(0) | Err(_) => {
            crate::log_warn!("Invalid MAVLink ID '{}', using 1", raw);
            1
        }
        Ok(id) => id,
    }
}

/// Scheduler, parameter streamer and dispatcher driven as one unit
pub struct TelemetryTask<'a, S, P, C, T> {
    scheduler: StreamScheduler,
    param_streamer: ParamStreamer,
    dispatcher: TelemetryDispatcher<'a, S, P, C, T>,
}

impl<'a, S, P, C, T> TelemetryTask<'a, S, P, C, T>
where
    S: TelemetrySources,
    P: ParameterStore,
    C: MessageCodec,
    T: FrameTransport,
{
    /// Create a task from its collaborators and configuration
    pub fn new(
        state: &'a TelemetryState,
        sources: S,
        params: P,
        codec: C,
        transport: T,
        config: &TelemetryConfig,
    ) -> Self {
        crate::log_info!(
            "Telemetry task: system {} component {}",
            config.system_id,
            config.component_id
        );
        Self {
            scheduler: StreamScheduler::new(&config.rates),
            param_streamer: ParamStreamer::new(),
            dispatcher: TelemetryDispatcher::new(
                state,
                sources,
                params,
                codec,
                transport,
                config.identity,
            ),
        }
    }

    /// Run one step at `now_us`
    ///
    /// # Returns
    ///
    /// Number of frames sent.
    pub fn step(&mut self, now_us: u64) -> usize {
        let state = self.dispatcher.state();
        self.scheduler.tick(state, now_us);
        self.param_streamer.poll(state);
        self.dispatcher.run_cycle()
    }

    /// Stream every parameter (PARAM_REQUEST_LIST)
    pub fn request_param_list(&mut self) {
        let count = self.dispatcher.params().count();
        self.param_streamer.start_list(count);
    }

    /// Stream one parameter by index (PARAM_REQUEST_READ)
    pub fn request_param_read(&mut self, index: u16) -> Result<(), ParamStoreError> {
        let count = self.dispatcher.params().count();
        self.param_streamer.request_read(index, count)
    }

    /// Change stream rates at runtime
    pub fn update_rates(&mut self, rates: &StreamRates) {
        crate::log_info!(
            "Stream rates: HB {} SYS {} GPS {} IMU {} ATT {} Hz",
            rates.heartbeat_hz,
            rates.sys_status_hz,
            rates.gps_hz,
            rates.scaled_imu_hz,
            rates.attitude_hz
        );
        self.scheduler.update_rates(rates);
    }

    /// Rate scheduler
    pub fn scheduler(&self) -> &StreamScheduler {
        &self.scheduler
    }

    /// Parameter streamer
    pub fn param_streamer(&self) -> &ParamStreamer {
        &self.param_streamer
    }

    /// Dispatcher
    pub fn dispatcher(&self) -> &TelemetryDispatcher<'a, S, P, C, T> {
        &self.dispatcher
    }

    /// Get mutable reference to the dispatcher
    pub fn dispatcher_mut(&mut self) -> &mut TelemetryDispatcher<'a, S, P, C, T> {
        &mut self.dispatcher
    }
}

/// Drive `task` every [`TICK_PERIOD_MS`] forever
#[cfg(feature = "embassy")]
pub async fn run_telemetry_loop<S, P, C, T>(mut task: TelemetryTask<'_, S, P, C, T>) -> !
where
    S: TelemetrySources,
    P: ParameterStore,
    C: MessageCodec,
    T: FrameTransport,
{
    use embassy_time::{Duration, Instant, Ticker};

    crate::log_info!("Telemetry task started");
    crate::log_info!("  Tick period: {} ms", TICK_PERIOD_MS);

    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS));
    loop {
        task.step(Instant::now().as_micros());
        ticker.next().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::mavlink::gate::MessageKind;
    use crate::communication::mavlink::transport::mock::MockTransport;
    use crate::communication::mavlink::writer::mock::RecordingCodec;
    use crate::core::parameters::ParameterTable;
    use crate::devices::CachedSources;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.system_id, 1);
        assert_eq!(config.component_id, 1);
        assert_eq!(config.rates.attitude_hz, 10);
    }

    #[test]
    fn test_build_env_ids() {
        let config = TelemetryConfig::from_build_env();
        assert_ne!(config.system_id, 0);
        assert_ne!(config.component_id, 0);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), 42);
        assert_eq!(parse_id(" 7 "), 7);
        assert_eq!(parse_id("0"), 1);
        assert_eq!(parse_id("300"), 1);
        assert_eq!(parse_id("abc"), 1);
    }

    #[test]
    fn test_writer_uses_config_ids() {
        let config = TelemetryConfig {
            system_id: 9,
            component_id: 190,
            ..TelemetryConfig::default()
        };
        let writer = config.writer();
        assert_eq!(writer.system_id(), 9);
        assert_eq!(writer.component_id(), 190);
    }

    #[test]
    fn test_first_step_sends_periodic_streams() {
        let state = TelemetryState::new();
        let params = ParameterTable::<2>::new();
        let mut task = TelemetryTask::new(
            &state,
            CachedSources::new(),
            &params,
            RecordingCodec::default(),
            MockTransport::new(),
            &TelemetryConfig::default(),
        );

        assert_eq!(task.step(0), 5);
        let ids = task.dispatcher().transport().message_ids();
        assert_eq!(&ids[..], &[0, 1, 24, 26, 30]);

        // 10ms later nothing is due yet
        assert_eq!(task.step(10_000), 0);
    }

    #[test]
    fn test_param_list_one_per_step() {
        let state = TelemetryState::new();
        let mut params = ParameterTable::<3>::new();
        params.register("SYSID_THISMAV", 1.0).unwrap();
        params.register("SR_EXTRA1", 10.0).unwrap();
        params.register("SR_POSITION", 5.0).unwrap();

        let config = TelemetryConfig {
            rates: StreamRates {
                heartbeat_hz: 0,
                sys_status_hz: 0,
                gps_hz: 0,
                scaled_imu_hz: 0,
                attitude_hz: 0,
            },
            ..TelemetryConfig::default()
        };
        let mut task = TelemetryTask::new(
            &state,
            CachedSources::new(),
            &params,
            RecordingCodec::default(),
            MockTransport::new(),
            &config,
        );

        task.request_param_list();
        for step in 0..5u64 {
            task.step(step * 10_000);
        }

        let ids = task.dispatcher().transport().message_ids();
        assert_eq!(&ids[..], &[22, 22, 22]);
        assert!(!state.gate().is_requested(MessageKind::ParamValue));
        assert!(!task.param_streamer().is_active());
    }

    #[test]
    fn test_param_read_out_of_range() {
        let state = TelemetryState::new();
        let params = ParameterTable::<1>::new();
        let mut task = TelemetryTask::new(
            &state,
            CachedSources::new(),
            &params,
            RecordingCodec::default(),
            MockTransport::new(),
            &TelemetryConfig::default(),
        );

        assert_eq!(
            task.request_param_read(0),
            Err(ParamStoreError::IndexOutOfRange { index: 0, count: 0 })
        );
    }

    #[test]
    fn test_update_rates() {
        let state = TelemetryState::new();
        let params = ParameterTable::<1>::new();
        let mut task = TelemetryTask::new(
            &state,
            CachedSources::new(),
            &params,
            RecordingCodec::default(),
            MockTransport::new(),
            &TelemetryConfig::default(),
        );

        let rates = StreamRates {
            attitude_hz: 50,
            ..StreamRates::default()
        };
        task.update_rates(&rates);
        assert_eq!(task.scheduler().rates(), rates);
    }
}
