//! Dispatch Gate
//!
//! One "send requested" flag per telemetry message kind. The rate scheduler (or an
//! event such as a new notice) raises a flag; the dispatcher consumes it at the start
//! of the matching encoder.
//!
//! # Concurrency
//!
//! Raising and consuming are each a single atomic operation, so a flag can be raised
//! from an interrupt or another task while the dispatch cycle runs:
//!
//! - `request()` is one atomic store
//! - `try_consume()` is one atomic swap, so two consumers can never both observe
//!   the same request, and a request raised after the swap stays pending for the
//!   next cycle

use core::sync::atomic::{AtomicBool, Ordering};

/// Telemetry message kinds handled by the dispatcher, in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    /// HEARTBEAT (#0)
    Heartbeat,
    /// SYS_STATUS (#1)
    SysStatus,
    /// PARAM_VALUE (#22)
    ParamValue,
    /// GPS_RAW_INT (#24)
    GpsRawInt,
    /// SCALED_IMU (#26)
    ScaledImu,
    /// ATTITUDE (#30)
    Attitude,
    /// COMMAND_ACK (#77)
    CommandAck,
    /// STATUSTEXT (#253)
    StatusText,
}

impl MessageKind {
    /// Number of message kinds
    pub const COUNT: usize = 8;

    /// All message kinds in dispatch order
    pub const ALL: [MessageKind; Self::COUNT] = [
        MessageKind::Heartbeat,
        MessageKind::SysStatus,
        MessageKind::ParamValue,
        MessageKind::GpsRawInt,
        MessageKind::ScaledImu,
        MessageKind::Attitude,
        MessageKind::CommandAck,
        MessageKind::StatusText,
    ];

    /// MAVLink message ID for this kind
    pub const fn message_id(self) -> u32 {
        match self {
            MessageKind::Heartbeat => 0,
            MessageKind::SysStatus => 1,
            MessageKind::ParamValue => 22,
            MessageKind::GpsRawInt => 24,
            MessageKind::ScaledImu => 26,
            MessageKind::Attitude => 30,
            MessageKind::CommandAck => 77,
            MessageKind::StatusText => 253,
        }
    }

    /// Look up a kind by MAVLink message ID
    pub fn from_message_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.message_id() == id)
    }

    /// MAVLink message name
    pub const fn name(self) -> &'static str {
        match self {
            MessageKind::Heartbeat => "HEARTBEAT",
            MessageKind::SysStatus => "SYS_STATUS",
            MessageKind::ParamValue => "PARAM_VALUE",
            MessageKind::GpsRawInt => "GPS_RAW_INT",
            MessageKind::ScaledImu => "SCALED_IMU",
            MessageKind::Attitude => "ATTITUDE",
            MessageKind::CommandAck => "COMMAND_ACK",
            MessageKind::StatusText => "STATUSTEXT",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Per-kind request flags
pub struct DispatchGate {
    flags: [AtomicBool; MessageKind::COUNT],
}

impl DispatchGate {
    /// Create a gate with every flag cleared (const constructor for static initialization)
    pub const fn new() -> Self {
        Self {
            flags: [const { AtomicBool::new(false) }; MessageKind::COUNT],
        }
    }

    /// Raise the send request for `kind`
    pub fn request(&self, kind: MessageKind) {
        self.flags[kind.slot()].store(true, Ordering::Release);
    }

    /// Raise the send request for a MAVLink message ID
    ///
    /// Returns false (and raises nothing) if the ID is not a dispatched kind.
    pub fn request_by_id(&self, message_id: u32) -> bool {
        match MessageKind::from_message_id(message_id) {
            Some(kind) => {
                self.request(kind);
                true
            }
            None => false,
        }
    }

    /// Consume the send request for `kind`
    ///
    /// Returns true exactly once per raise: the flag is cleared in the same atomic
    /// step that observes it set.
    pub fn try_consume(&self, kind: MessageKind) -> bool {
        self.flags[kind.slot()].swap(false, Ordering::AcqRel)
    }

    /// Check whether a request for `kind` is pending, without consuming it
    pub fn is_requested(&self, kind: MessageKind) -> bool {
        self.flags[kind.slot()].load(Ordering::Acquire)
    }

    /// Number of kinds with a pending request
    pub fn pending_count(&self) -> usize {
        MessageKind::ALL
            .into_iter()
            .filter(|kind| self.is_requested(*kind))
            .count()
    }
}

impl Default for DispatchGate {
    fn default() -> Self {
        Self::new()
    }
}
