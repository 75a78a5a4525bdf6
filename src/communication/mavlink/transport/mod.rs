//! MAVLink Transport Abstraction
//!
//! The dispatcher hands each encoded frame to a [`FrameTransport`]. The transport
//! owns whatever queue sits in front of the link (UART DMA ring, radio FIFO, UDP
//! socket buffer); the dispatcher never sees it.
//!
//! # Contract
//!
//! - `send()` never blocks. A transport that cannot take the frame right now
//!   returns an error and the frame is dropped
//! - Frames are not retried. Periodic telemetry is superseded by the next cycle
//! - A frame is either accepted whole or rejected whole
//!
//! ```text
//! ┌──────────────────────────────┐
//! │    TelemetryDispatcher       │
//! │  (build, encode, send)       │
//! └──────────┬───────────────────┘
//!            │ FrameTransport::send(&frame)
//!            ▼
//! ┌──────────────────────────────┐
//! │  UART / radio / UDP queue    │
//! └──────────────────────────────┘
//! ```

use core::fmt;

/// Best-effort, non-blocking sink for encoded frames
pub trait FrameTransport {
    /// Enqueue one complete frame
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Frame accepted
    /// - `Err(TransportError)` - Frame dropped
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;
}

impl<T: FrameTransport + ?Sized> FrameTransport for &mut T {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        (**self).send(frame)
    }
}

/// Transport error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Outbound queue has no room for the frame
    QueueFull,

    /// Transport disconnected
    ///
    /// Examples: UART cable unplugged, radio link lost
    Disconnected,

    /// Generic I/O error
    IoError,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::QueueFull => write!(f, "Transport queue full"),
            TransportError::Disconnected => write!(f, "Transport disconnected"),
            TransportError::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    //! Mock transport implementation for testing
    //!
    //! Records every accepted frame and can be configured to reject sends, so
    //! tests can check what reached the wire and how drops are handled.

    use super::{FrameTransport, TransportError};
    use crate::communication::mavlink::writer::MAX_FRAME_LEN;
    use heapless::Vec;

    /// Maximum frames kept by [`MockTransport`]
    pub const MOCK_FRAME_CAPACITY: usize = 64;

    /// One recorded frame
    pub type Frame = Vec<u8, MAX_FRAME_LEN>;

    /// Mock transport for testing
    pub struct MockTransport {
        /// Frames accepted via send(), oldest first
        pub frames: Vec<Frame, MOCK_FRAME_CAPACITY>,
        /// Error to return from send()
        pub send_error: Option<TransportError>,
        /// Number of send() calls, accepted or not
        pub send_calls: usize,
    }

    impl MockTransport {
        /// Create new mock transport
        pub fn new() -> Self {
            Self {
                frames: Vec::new(),
                send_error: None,
                send_calls: 0,
            }
        }

        /// Set error to return from send()
        pub fn set_send_error(&mut self, error: TransportError) {
            self.send_error = Some(error);
        }

        /// Accept frames again
        pub fn clear_send_error(&mut self) {
            self.send_error = None;
        }

        /// Frames accepted so far
        pub fn frames(&self) -> &[Frame] {
            &self.frames
        }

        /// MAVLink 2 message IDs of the accepted frames, in send order
        pub fn message_ids(&self) -> Vec<u32, MOCK_FRAME_CAPACITY> {
            self.frames
                .iter()
                .filter(|frame| frame.len() >= 10)
                .map(|frame| u32::from_le_bytes([frame[7], frame[8], frame[9], 0]))
                .collect()
        }

        /// Reset mock to initial state
        pub fn reset(&mut self) {
            self.frames.clear();
            self.send_error = None;
            self.send_calls = 0;
        }
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FrameTransport for MockTransport {
        fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
            self.send_calls += 1;

            if let Some(error) = self.send_error {
                return Err(error);
            }

            let frame = Frame::from_slice(frame).map_err(|_| TransportError::IoError)?;
            self.frames
                .push(frame)
                .map_err(|_| TransportError::QueueFull)
        }
    }
}
