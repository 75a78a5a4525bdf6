//! MAVLink STATUSTEXT Notices
//!
//! Calibration routines and other event-driven code report progress to the Ground
//! Control Station through a fixed catalog of human-readable strings. Publishing a
//! notice stages the text in the telemetry state's notice slot and raises the
//! STATUSTEXT dispatch flag (see [`TelemetryState::publish_notice`]).
//!
//! # Slot Semantics
//!
//! There is a single staging slot, not a queue. A notice published before the
//! previous one has been dispatched replaces it; only the latest text reaches the
//! wire.
//!
//! [`TelemetryState::publish_notice`]: super::state::TelemetryState::publish_notice

use mavlink::common::MavSeverity;

/// STATUSTEXT text field length (bytes)
pub const NOTICE_TEXT_LEN: usize = 50;

/// Severity attached to catalog notices
///
/// Wire value 0, which MAVLink names EMERGENCY. Receivers that honour the
/// severity will flag calibration progress as an emergency; it is kept at 0 so
/// ground stations that key on the existing wire value keep working.
pub const CATALOG_NOTICE_SEVERITY: MavSeverity = MavSeverity::MAV_SEVERITY_EMERGENCY;

/// Calibration notice catalog, indexed by [`Notice`]
///
/// Ground stations parse the `[cal]` prefix to drive their calibration UI, so
/// these strings are part of the protocol and must not be reworded.
pub const NOTICE_CATALOG: [&str; 25] = [
    "[cal] calibration started:",
    "[cal] calibration done:",
    "[cal] calibration failed:",
    "[cal] progress <10>",
    "[cal] progress <20>",
    "[cal] progress <30>",
    "[cal] progress <40>",
    "[cal] progress <50>",
    "[cal] progress <60>",
    "[cal] progress <70>",
    "[cal] progress <80>",
    "[cal] progress <90>",
    "[cal] progress <100>",
    "[cal] up orientation detected",
    "[cal] down orientation detected",
    "[cal] left orientation detected",
    "[cal] right orientation detected",
    "[cal] front orientation detected",
    "[cal] back orientation detected",
    "[cal] up side done, rotate to a different side",
    "[cal] down side done, rotate to a different side",
    "[cal] left side done, rotate to a different side",
    "[cal] right side done, rotate to a different side",
    "[cal] front side done, rotate to a different side",
    "[cal] back side done, rotate to a different side",
];

/// Named catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Notice {
    CalibrationStarted = 0,
    CalibrationDone,
    CalibrationFailed,
    Progress10,
    Progress20,
    Progress30,
    Progress40,
    Progress50,
    Progress60,
    Progress70,
    Progress80,
    Progress90,
    Progress100,
    UpDetected,
    DownDetected,
    LeftDetected,
    RightDetected,
    FrontDetected,
    BackDetected,
    UpDone,
    DownDone,
    LeftDone,
    RightDone,
    FrontDone,
    BackDone,
}

impl Notice {
    /// Catalog index of this notice
    pub const fn index(self) -> u16 {
        self as u16
    }

    /// Catalog text of this notice
    pub const fn text(self) -> &'static str {
        NOTICE_CATALOG[self as usize]
    }

    /// Progress notice for a percentage, rounded down to the nearest 10
    ///
    /// Returns None below 10%.
    pub fn progress(percent: u8) -> Option<Self> {
        match percent.min(100) / 10 {
            0 => None,
            step => Some(PROGRESS[usize::from(step) - 1]),
        }
    }
}

const PROGRESS: [Notice; 10] = [
    Notice::Progress10,
    Notice::Progress20,
    Notice::Progress30,
    Notice::Progress40,
    Notice::Progress50,
    Notice::Progress60,
    Notice::Progress70,
    Notice::Progress80,
    Notice::Progress90,
    Notice::Progress100,
];

/// Bounds-checked catalog lookup
pub fn lookup(index: u16) -> Result<&'static str, NoticeError> {
    NOTICE_CATALOG
        .get(index as usize)
        .copied()
        .ok_or(NoticeError::IndexOutOfRange {
            index,
            len: NOTICE_CATALOG.len() as u16,
        })
}

/// Notice text staged for STATUSTEXT
///
/// Always exactly 50 bytes: shorter text is zero padded, longer text truncated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoticeText {
    /// Severity sent with the text
    pub severity: MavSeverity,
    /// Zero-padded text bytes
    pub text: [u8; NOTICE_TEXT_LEN],
}

impl NoticeText {
    /// Build a notice from text, truncating to 50 bytes
    ///
    /// Truncation is byte-based; a multi-byte UTF-8 character straddling the
    /// limit is cut, matching what the GCS receives on the wire.
    pub fn new(severity: MavSeverity, text: &str) -> Self {
        let bytes = text.as_bytes();
        let len = bytes.len().min(NOTICE_TEXT_LEN);
        let mut buf = [0u8; NOTICE_TEXT_LEN];
        buf[..len].copy_from_slice(&bytes[..len]);
        Self {
            severity,
            text: buf,
        }
    }

    /// Text up to the first zero byte, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        let end = self
            .text
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NOTICE_TEXT_LEN);
        core::str::from_utf8(&self.text[..end]).ok()
    }
}

/// All-zero notice (severity 0, empty text), sent when nothing has been staged
impl Default for NoticeText {
    fn default() -> Self {
        Self {
            severity: MavSeverity::MAV_SEVERITY_EMERGENCY,
            text: [0; NOTICE_TEXT_LEN],
        }
    }
}

/// Notice publishing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NoticeError {
    /// Catalog index past the end of the catalog
    IndexOutOfRange { index: u16, len: u16 },
}

impl core::fmt::Display for NoticeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NoticeError::IndexOutOfRange { index, len } => {
                write!(f, "notice index {} out of range (catalog has {})", index, len)
            }
        }
    }
}
