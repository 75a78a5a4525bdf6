//! Telemetry Dispatcher
//!
//! Runs the outbound half of the telemetry link: for every message kind whose
//! dispatch flag is raised, build the message, encode it and hand the frame to
//! the transport.
//!
//! # Architecture
//!
//! ```text
//! StreamScheduler / ParamStreamer / publish_notice
//!            │ raise flag
//!            ▼
//!     TelemetryState (gate + slots)
//!            │ try_consume
//!            ▼
//!   TelemetryDispatcher ── build ──► MessageCodec ── frame ──► FrameTransport
//! ```
//!
//! # Failure Isolation
//!
//! Every kind is handled independently. A parameter that cannot be read, a frame
//! the codec rejects or a full transport queue is logged, counted in
//! [`DispatchStats`] and dropped; the cycle moves on to the next kind and nothing
//! is retried. The flag is consumed either way.

use super::gate::MessageKind;
use super::handlers::telemetry::{self, HeartbeatIdentity};
use super::state::TelemetryState;
use super::transport::{FrameTransport, TransportError};
use super::writer::{CodecError, MessageCodec};
use crate::core::parameters::{ParamStoreError, ParameterStore};
use crate::devices::traits::TelemetrySources;
use mavlink::common::MavMessage;

/// Dispatcher statistics for monitoring and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchStats {
    /// Frames accepted by the transport
    pub frames_sent: u32,
    /// Frames the transport refused (queue full, disconnected, I/O error)
    pub transport_drops: u32,
    /// Messages that could not be built or encoded
    pub encode_failures: u32,
}

/// Errors raised while emitting a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Parameter store rejected the cursor
    Param(ParamStoreError),
    /// Codec could not produce a frame
    Codec(CodecError),
    /// Transport dropped the frame
    Transport(TransportError),
}

impl From<ParamStoreError> for DispatchError {
    fn from(err: ParamStoreError) -> Self {
        DispatchError::Param(err)
    }
}

impl From<CodecError> for DispatchError {
    fn from(err: CodecError) -> Self {
        DispatchError::Codec(err)
    }
}

impl From<TransportError> for DispatchError {
    fn from(err: TransportError) -> Self {
        DispatchError::Transport(err)
    }
}

impl core::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DispatchError::Param(err) => write!(f, "parameter: {}", err),
            DispatchError::Codec(err) => write!(f, "codec: {}", err),
            DispatchError::Transport(err) => write!(f, "transport: {}", err),
        }
    }
}

/// Flag-gated telemetry dispatcher
///
/// Owns its collaborators; borrows the shared state so producers in other
/// contexts can keep raising flags and filling slots while it runs.
pub struct TelemetryDispatcher<'a, S, P, C, T> {
    state: &'a TelemetryState,
    sources: S,
    params: P,
    codec: C,
    transport: T,
    identity: HeartbeatIdentity,
    stats: DispatchStats,
}

impl<'a, S, P, C, T> TelemetryDispatcher<'a, S, P, C, T>
where
    S: TelemetrySources,
    P: ParameterStore,
    C: MessageCodec,
    T: FrameTransport,
{
    /// Create a new dispatcher
    ///
    /// # Arguments
    ///
    /// * `state` - Shared gate and slots
    /// * `sources` - Snapshot getters (attitude, IMU, GPS, battery, CPU, uptime)
    /// * `params` - Parameter store read by PARAM_VALUE
    /// * `codec` - Message serializer
    /// * `transport` - Frame sink
    /// * `identity` - Vehicle identity reported in HEARTBEAT
    pub fn new(
        state: &'a TelemetryState,
        sources: S,
        params: P,
        codec: C,
        transport: T,
        identity: HeartbeatIdentity,
    ) -> Self {
        Self {
            state,
            sources,
            params,
            codec,
            transport,
            identity,
            stats: DispatchStats::default(),
        }
    }

    /// Run one dispatch cycle
    ///
    /// Visits every kind in [`MessageKind::ALL`] order and emits those whose flag
    /// is raised.
    ///
    /// # Returns
    ///
    /// Number of frames the transport accepted.
    pub fn run_cycle(&mut self) -> usize {
        MessageKind::ALL
            .into_iter()
            .filter(|kind| self.dispatch(*kind))
            .count()
    }

    /// Emit `kind` if its flag is raised
    ///
    /// The flag is consumed before anything else happens, so a request is served
    /// at most once whatever the outcome.
    ///
    /// # Returns
    ///
    /// True if a frame was accepted by the transport.
    pub fn dispatch(&mut self, kind: MessageKind) -> bool {
        if !self.state.gate().try_consume(kind) {
            return false;
        }

        match self.emit(kind) {
            Ok(()) => {
                self.stats.frames_sent = self.stats.frames_sent.wrapping_add(1);
                true
            }
            Err(DispatchError::Transport(err)) => {
                crate::log_warn!("{} dropped: {}", kind.name(), err);
                self.stats.transport_drops = self.stats.transport_drops.wrapping_add(1);
                false
            }
            Err(err) => {
                crate::log_warn!("{} not sent: {}", kind.name(), err);
                self.stats.encode_failures = self.stats.encode_failures.wrapping_add(1);
                false
            }
        }
    }

    /// Send HEARTBEAT if requested
    pub fn send_heartbeat(&mut self) -> bool {
        self.dispatch(MessageKind::Heartbeat)
    }

    /// Send SYS_STATUS if requested
    pub fn send_sys_status(&mut self) -> bool {
        self.dispatch(MessageKind::SysStatus)
    }

    /// Send PARAM_VALUE for the parameter at the cursor if requested
    pub fn send_param_value(&mut self) -> bool {
        self.dispatch(MessageKind::ParamValue)
    }

    /// Send GPS_RAW_INT if requested
    pub fn send_gps_raw_int(&mut self) -> bool {
        self.dispatch(MessageKind::GpsRawInt)
    }

    /// Send SCALED_IMU if requested
    pub fn send_scaled_imu(&mut self) -> bool {
        self.dispatch(MessageKind::ScaledImu)
    }

    /// Send ATTITUDE if requested
    pub fn send_attitude(&mut self) -> bool {
        self.dispatch(MessageKind::Attitude)
    }

    /// Send COMMAND_ACK for the recorded command if requested
    pub fn send_command_ack(&mut self) -> bool {
        self.dispatch(MessageKind::CommandAck)
    }

    /// Send the staged STATUSTEXT if requested
    pub fn send_status_text(&mut self) -> bool {
        self.dispatch(MessageKind::StatusText)
    }

    /// Build, encode and send one message
    fn emit(&mut self, kind: MessageKind) -> Result<(), DispatchError> {
        let message = self.build(kind)?;
        let frame = self.codec.encode(&message)?;
        self.transport.send(frame)?;
        Ok(())
    }

    /// Build the message for `kind`
    ///
    /// An empty COMMAND_ACK or STATUSTEXT slot still produces a frame, carrying
    /// the zeroed slot contents.
    fn build(&self, kind: MessageKind) -> Result<MavMessage, DispatchError> {
        let message = match kind {
            MessageKind::Heartbeat => telemetry::build_heartbeat(&self.identity),
            MessageKind::SysStatus => {
                telemetry::build_sys_status(&self.sources.battery(), self.sources.cpu_load())
            }
            MessageKind::ParamValue => {
                telemetry::build_param_value(&self.params, self.state.param_cursor())?
            }
            MessageKind::GpsRawInt => telemetry::build_gps_raw_int(&self.sources.gps()),
            MessageKind::ScaledImu => {
                telemetry::build_scaled_imu(&self.sources.imu(), self.sources.uptime_ms())
            }
            MessageKind::Attitude => telemetry::build_attitude(
                &self.sources.attitude(),
                self.sources.imu().gyro_dps,
                self.sources.uptime_ms(),
            ),
            MessageKind::CommandAck => {
                telemetry::build_command_ack(&self.state.command_ack().unwrap_or_default())
            }
            MessageKind::StatusText => {
                telemetry::build_status_text(&self.state.notice().unwrap_or_default())
            }
        };
        Ok(message)
    }

    /// Shared state
    pub fn state(&self) -> &'a TelemetryState {
        self.state
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Reset dispatcher statistics
    pub fn reset_stats(&mut self) {
        self.stats = DispatchStats::default();
    }

    /// Vehicle identity reported in HEARTBEAT
    pub fn identity(&self) -> &HeartbeatIdentity {
        &self.identity
    }

    /// Snapshot sources
    pub fn sources(&self) -> &S {
        &self.sources
    }

    /// Parameter store
    pub fn params(&self) -> &P {
        &self.params
    }

    /// Get mutable reference to the parameter store
    pub fn params_mut(&mut self) -> &mut P {
        &mut self.params
    }

    /// Codec
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Get mutable reference to the codec
    pub fn codec_mut(&mut self) -> &mut C {
        &mut self.codec
    }

    /// Transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get mutable reference to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::mavlink::status_notifier::Notice;
    use crate::communication::mavlink::transport::mock::MockTransport;
    use crate::communication::mavlink::writer::mock::RecordingCodec;
    use crate::core::parameters::ParameterTable;
    use crate::devices::traits::{AttitudeSnapshot, ImuSnapshot};
    use crate::devices::CachedSources;
    use mavlink::common::{MavCmd, MavResult, COMMAND_ACK_DATA};
    use nalgebra::Vector3;

    type TestDispatcher<'a> =
        TelemetryDispatcher<'a, CachedSources, ParameterTable<4>, RecordingCodec, MockTransport>;

    fn dispatcher(state: &TelemetryState) -> TestDispatcher<'_> {
        let mut params = ParameterTable::new();
        params.register("SR_EXTRA1", 10.0).unwrap();
        params.register("SR_POSITION", 5.0).unwrap();

        TelemetryDispatcher::new(
            state,
            CachedSources::new(),
            params,
            RecordingCodec::new(1, 1),
            MockTransport::new(),
            HeartbeatIdentity::default(),
        )
    }

    fn stage_slots(state: &TelemetryState) {
        state.set_command_ack(MavCmd::MAV_CMD_NAV_TAKEOFF, MavResult::MAV_RESULT_ACCEPTED);
        state.publish_notice(Notice::CalibrationStarted.index()).unwrap();
    }

    #[test]
    fn test_no_request_no_send() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);

        for kind in MessageKind::ALL {
            assert!(!dispatcher.dispatch(kind));
            assert!(!state.gate().is_requested(kind));
        }
        assert_eq!(dispatcher.transport().send_calls, 0);
        assert_eq!(dispatcher.stats(), DispatchStats::default());
    }

    #[test]
    fn test_each_request_sends_exactly_once() {
        let state = TelemetryState::new();
        stage_slots(&state);
        let mut dispatcher = dispatcher(&state);

        for kind in MessageKind::ALL {
            state.request_send(kind);
            let before = dispatcher.transport().send_calls;

            assert!(dispatcher.dispatch(kind), "{} not sent", kind.name());
            assert_eq!(dispatcher.transport().send_calls, before + 1);
            assert!(!state.gate().is_requested(kind));

            // Second call without a new request is a no-op
            assert!(!dispatcher.dispatch(kind));
            assert_eq!(dispatcher.transport().send_calls, before + 1);
        }
        assert_eq!(dispatcher.stats().frames_sent, MessageKind::COUNT as u32);
    }

    #[test]
    fn test_cycle_follows_kind_order() {
        let state = TelemetryState::new();
        stage_slots(&state);
        for kind in MessageKind::ALL.into_iter().rev() {
            state.request_send(kind);
        }

        let mut dispatcher = dispatcher(&state);
        assert_eq!(dispatcher.run_cycle(), MessageKind::COUNT);

        let ids = dispatcher.transport().message_ids();
        assert_eq!(&ids[..], &[0, 1, 22, 24, 26, 30, 77, 253]);
        assert_eq!(state.gate().pending_count(), 0);
    }

    #[test]
    fn test_named_senders() {
        let state = TelemetryState::new();
        stage_slots(&state);
        let mut dispatcher = dispatcher(&state);

        assert!(!dispatcher.send_heartbeat());
        for kind in MessageKind::ALL {
            state.request_send(kind);
        }
        assert!(dispatcher.send_heartbeat());
        assert!(dispatcher.send_sys_status());
        assert!(dispatcher.send_param_value());
        assert!(dispatcher.send_gps_raw_int());
        assert!(dispatcher.send_scaled_imu());
        assert!(dispatcher.send_attitude());
        assert!(dispatcher.send_command_ack());
        assert!(dispatcher.send_status_text());
        assert_eq!(dispatcher.transport().frames().len(), MessageKind::COUNT);
    }

    #[test]
    fn test_transport_failure_is_isolated() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);
        dispatcher
            .transport_mut()
            .set_send_error(TransportError::QueueFull);

        state.request_send(MessageKind::Heartbeat);
        state.request_send(MessageKind::Attitude);
        assert_eq!(dispatcher.run_cycle(), 0);

        assert_eq!(dispatcher.transport().send_calls, 2);
        assert_eq!(dispatcher.stats().transport_drops, 2);
        assert_eq!(state.gate().pending_count(), 0);

        // Nothing is retried once the link recovers
        dispatcher.transport_mut().clear_send_error();
        assert_eq!(dispatcher.run_cycle(), 0);
        assert_eq!(dispatcher.transport().send_calls, 2);
    }

    #[test]
    fn test_codec_failure_skips_transport() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);
        dispatcher
            .codec_mut()
            .set_encode_error(CodecError::FrameTooLarge { len: 300, max: 280 });

        state.request_send(MessageKind::Heartbeat);
        assert!(!dispatcher.send_heartbeat());
        assert_eq!(dispatcher.transport().send_calls, 0);
        assert_eq!(dispatcher.stats().encode_failures, 1);
    }

    #[test]
    fn test_param_cursor_out_of_range() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);

        state.set_param_cursor(2); // two parameters registered
        state.request_send(MessageKind::ParamValue);
        state.request_send(MessageKind::Heartbeat);

        assert_eq!(dispatcher.run_cycle(), 1);
        assert_eq!(dispatcher.stats().encode_failures, 1);
        assert!(!state.gate().is_requested(MessageKind::ParamValue));
        assert_eq!(&dispatcher.transport().message_ids()[..], &[0]);
    }

    #[test]
    fn test_param_value_uses_cursor() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);

        state.set_param_cursor(1);
        state.request_send(MessageKind::ParamValue);
        assert!(dispatcher.send_param_value());

        match dispatcher.codec().last() {
            Some(MavMessage::PARAM_VALUE(data)) => {
                assert_eq!(data.param_index, 1);
                assert_eq!(data.param_count, 2);
                assert_eq!(data.param_value, 5.0);
                assert_eq!(&data.param_id[..11], b"SR_POSITION");
            }
            other => panic!("Expected PARAM_VALUE, got {:?}", other),
        }
    }

    #[test]
    fn test_fresh_state_every_kind_sends_once() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);

        for kind in MessageKind::ALL {
            state.request_send(kind);
            assert!(dispatcher.dispatch(kind), "{} not sent", kind.name());
        }
        assert_eq!(dispatcher.transport().send_calls, MessageKind::COUNT);
        assert_eq!(dispatcher.stats().frames_sent, MessageKind::COUNT as u32);
        assert_eq!(state.gate().pending_count(), 0);
    }

    #[test]
    fn test_empty_slots_send_zeroed_frames() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);

        state.request_send(MessageKind::CommandAck);
        state.request_send(MessageKind::StatusText);
        assert_eq!(dispatcher.run_cycle(), 2);

        match dispatcher.codec().messages() {
            [MavMessage::COMMAND_ACK(ack), MavMessage::STATUSTEXT(text)] => {
                assert_eq!(*ack, COMMAND_ACK_DATA::default());
                assert_eq!(text.severity as u8, 0);
                let bytes: &[u8] = text.text.as_ref();
                assert!(bytes.iter().all(|&b| b == 0));
            }
            other => panic!("Expected COMMAND_ACK and STATUSTEXT, got {:?}", other),
        }
        // Slots stay empty after sending
        assert!(state.command_ack().is_none());
        assert!(state.notice().is_none());
    }

    #[test]
    fn test_command_ack_last_write_wins() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);

        state.set_command_ack(MavCmd::MAV_CMD_NAV_TAKEOFF, MavResult::MAV_RESULT_ACCEPTED);
        state.set_command_ack(
            MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
            MavResult::MAV_RESULT_TEMPORARILY_REJECTED,
        );
        state.request_send(MessageKind::CommandAck);
        assert_eq!(dispatcher.run_cycle(), 1);

        match dispatcher.codec().last() {
            Some(MavMessage::COMMAND_ACK(data)) => {
                assert_eq!(data.command, MavCmd::MAV_CMD_COMPONENT_ARM_DISARM);
                assert_eq!(data.result, MavResult::MAV_RESULT_TEMPORARILY_REJECTED);
            }
            other => panic!("Expected COMMAND_ACK, got {:?}", other),
        }
    }

    #[test]
    fn test_attitude_reads_imu_rates() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);

        dispatcher.sources().update_attitude(AttitudeSnapshot {
            angles_deg: Vector3::new(0.0, 0.0, 180.0),
        });
        dispatcher.sources().update_imu(ImuSnapshot {
            gyro_dps: Vector3::new(0.0, 90.0, 0.0),
            ..Default::default()
        });
        dispatcher.sources().update_uptime_ms(1234);

        state.request_send(MessageKind::Attitude);
        assert!(dispatcher.send_attitude());

        match dispatcher.codec().last() {
            Some(MavMessage::ATTITUDE(data)) => {
                assert_eq!(data.time_boot_ms, 1234);
                assert!((data.yaw - core::f32::consts::PI).abs() < 1e-6);
                assert!((data.pitchspeed - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
            }
            other => panic!("Expected ATTITUDE, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_stats() {
        let state = TelemetryState::new();
        let mut dispatcher = dispatcher(&state);
        state.request_send(MessageKind::Heartbeat);
        dispatcher.run_cycle();
        assert_eq!(dispatcher.stats().frames_sent, 1);

        dispatcher.reset_stats();
        assert_eq!(dispatcher.stats(), DispatchStats::default());
    }
}
