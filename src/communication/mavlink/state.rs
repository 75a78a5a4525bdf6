//! Telemetry Shared State
//!
//! Everything the telemetry dispatcher shares with other execution contexts:
//!
//! - **Dispatch gate**: per-kind send flags (see [`DispatchGate`])
//! - **Notice slot**: last STATUSTEXT requested via `publish_notice`/`publish_text`
//! - **Command-ack slot**: last (command, result) pair to acknowledge
//! - **Parameter cursor**: index of the parameter PARAM_VALUE emits next
//!
//! # Thread Safety
//!
//! `TelemetryState` is `Sync` and has a const constructor, so it can live in a
//! `static` and be shared by reference between the dispatch task, the command
//! handler and interrupt handlers:
//!
//! - Flags and the cursor are atomics
//! - Each slot has its own critical-section mutex; writing the notice never
//!   blocks a reader of the command-ack slot
//!
//! # Lossy Slots
//!
//! The notice and command-ack slots hold one value each. A second write before the
//! dispatcher sends the first replaces it, and the first is never transmitted.

use super::gate::{DispatchGate, MessageKind};
use super::status_notifier::{self, NoticeError, NoticeText, CATALOG_NOTICE_SEVERITY};
use core::cell::Cell;
use core::sync::atomic::{AtomicU16, Ordering};
use critical_section::Mutex;
use mavlink::common::{MavCmd, MavResult, MavSeverity};

/// Outcome of a command, to be reported with COMMAND_ACK
///
/// The default value is what an empty slot sends.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommandAck {
    /// Command being acknowledged
    pub command: MavCmd,
    /// Result of the command
    pub result: MavResult,
}

/// State shared between the dispatcher and its producers
pub struct TelemetryState {
    gate: DispatchGate,
    notice: Mutex<Cell<Option<NoticeText>>>,
    command_ack: Mutex<Cell<Option<CommandAck>>>,
    param_cursor: AtomicU16,
}

impl TelemetryState {
    /// Create state with all flags cleared, cursor 0 and both slots empty
    ///
    /// Const constructor for static initialization.
    pub const fn new() -> Self {
        Self {
            gate: DispatchGate::new(),
            notice: Mutex::new(Cell::new(None)),
            command_ack: Mutex::new(Cell::new(None)),
            param_cursor: AtomicU16::new(0),
        }
    }

    /// Dispatch gate
    pub fn gate(&self) -> &DispatchGate {
        &self.gate
    }

    /// Raise the send request for `kind`
    pub fn request_send(&self, kind: MessageKind) {
        self.gate.request(kind);
    }

    /// Raise the send request for a MAVLink message ID
    pub fn request_send_by_id(&self, message_id: u32) -> bool {
        self.gate.request_by_id(message_id)
    }

    /// Stage a catalog notice and request STATUSTEXT
    ///
    /// An out-of-range index is rejected and leaves both the slot and the
    /// STATUSTEXT flag untouched.
    pub fn publish_notice(&self, index: u16) -> Result<(), NoticeError> {
        let text = status_notifier::lookup(index)?;
        crate::log_debug!("notice #{}: {}", index, text);
        self.stage_notice(NoticeText::new(CATALOG_NOTICE_SEVERITY, text));
        Ok(())
    }

    /// Stage free-form text (truncated to 50 bytes) and request STATUSTEXT
    pub fn publish_text(&self, severity: MavSeverity, text: &str) {
        if text.len() > status_notifier::NOTICE_TEXT_LEN {
            crate::log_warn!(
                "STATUSTEXT truncated to {} bytes (was {} bytes)",
                status_notifier::NOTICE_TEXT_LEN,
                text.len()
            );
        }
        self.stage_notice(NoticeText::new(severity, text));
    }

    fn stage_notice(&self, notice: NoticeText) {
        critical_section::with(|cs| self.notice.borrow(cs).set(Some(notice)));
        self.gate.request(MessageKind::StatusText);
    }

    /// Snapshot of the notice slot
    pub fn notice(&self) -> Option<NoticeText> {
        critical_section::with(|cs| self.notice.borrow(cs).get())
    }

    /// Record the outcome of a command
    ///
    /// Does not request COMMAND_ACK; the caller raises that flag when the ack
    /// should go out.
    pub fn set_command_ack(&self, command: MavCmd, result: MavResult) {
        critical_section::with(|cs| {
            self.command_ack
                .borrow(cs)
                .set(Some(CommandAck { command, result }))
        });
    }

    /// Snapshot of the command-ack slot
    pub fn command_ack(&self) -> Option<CommandAck> {
        critical_section::with(|cs| self.command_ack.borrow(cs).get())
    }

    /// Select the parameter PARAM_VALUE emits next
    ///
    /// The index is not validated here; the parameter store rejects it at
    /// encode time if it is out of range.
    pub fn set_param_cursor(&self, index: u16) {
        self.param_cursor.store(index, Ordering::Release);
    }

    /// Current parameter cursor
    pub fn param_cursor(&self) -> u16 {
        self.param_cursor.load(Ordering::Acquire)
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::mavlink::status_notifier::{Notice, NOTICE_TEXT_LEN};

    #[test]
    fn test_initial_state() {
        let state = TelemetryState::new();
        assert_eq!(state.gate().pending_count(), 0);
        assert_eq!(state.param_cursor(), 0);
        assert!(state.notice().is_none());
        assert!(state.command_ack().is_none());
    }

    #[test]
    fn test_publish_notice_stages_padded_text() {
        let state = TelemetryState::new();
        state.publish_notice(0).unwrap();

        let notice = state.notice().unwrap();
        let expected = b"[cal] calibration started:";
        assert_eq!(&notice.text[..expected.len()], expected);
        assert!(notice.text[expected.len()..].iter().all(|&b| b == 0));
        assert_eq!(notice.text.len(), NOTICE_TEXT_LEN);
        assert_eq!(notice.severity, CATALOG_NOTICE_SEVERITY);
        assert!(state.gate().is_requested(MessageKind::StatusText));
    }

    #[test]
    fn test_shorter_notice_clears_previous_tail() {
        let state = TelemetryState::new();
        state.publish_notice(Notice::FrontDone.index()).unwrap();
        state.publish_notice(Notice::Progress10.index()).unwrap();

        let notice = state.notice().unwrap();
        assert_eq!(notice.as_str(), Some("[cal] progress <10>"));
        assert!(notice.text[19..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_publish_notice_out_of_range() {
        let state = TelemetryState::new();
        state.publish_notice(Notice::CalibrationDone.index()).unwrap();
        assert!(state.gate().try_consume(MessageKind::StatusText));

        let result = state.publish_notice(25);
        assert_eq!(
            result,
            Err(NoticeError::IndexOutOfRange { index: 25, len: 25 })
        );
        // Slot keeps the previous notice, flag stays down
        assert_eq!(
            state.notice().unwrap().as_str(),
            Some(Notice::CalibrationDone.text())
        );
        assert!(!state.gate().is_requested(MessageKind::StatusText));
    }

    #[test]
    fn test_publish_text_uses_caller_severity() {
        let state = TelemetryState::new();
        state.publish_text(MavSeverity::MAV_SEVERITY_WARNING, "PreArm: GPS not ready");

        let notice = state.notice().unwrap();
        assert_eq!(notice.severity, MavSeverity::MAV_SEVERITY_WARNING);
        assert_eq!(notice.as_str(), Some("PreArm: GPS not ready"));
        assert!(state.gate().is_requested(MessageKind::StatusText));
    }

    #[test]
    fn test_command_ack_last_write_wins() {
        let state = TelemetryState::new();
        state.set_command_ack(MavCmd::MAV_CMD_NAV_TAKEOFF, MavResult::MAV_RESULT_ACCEPTED);
        state.set_command_ack(
            MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
            MavResult::MAV_RESULT_DENIED,
        );

        let ack = state.command_ack().unwrap();
        assert_eq!(ack.command, MavCmd::MAV_CMD_COMPONENT_ARM_DISARM);
        assert_eq!(ack.result, MavResult::MAV_RESULT_DENIED);
        // Recording an ack does not request it
        assert!(!state.gate().is_requested(MessageKind::CommandAck));
    }

    #[test]
    fn test_param_cursor() {
        let state = TelemetryState::new();
        state.set_param_cursor(3);
        assert_eq!(state.param_cursor(), 3);
        state.set_param_cursor(0);
        assert_eq!(state.param_cursor(), 0);
    }

    #[test]
    fn test_static_state() {
        static STATE: TelemetryState = TelemetryState::new();
        STATE.request_send(MessageKind::Heartbeat);
        assert!(STATE.gate().try_consume(MessageKind::Heartbeat));
    }
}
