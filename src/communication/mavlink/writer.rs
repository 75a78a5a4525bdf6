//! MAVLink Frame Writer
//!
//! Serializes typed MAVLink messages into MAVLink 2 frames using rust-mavlink.
//!
//! # Architecture
//!
//! - The dispatcher builds a `MavMessage` and hands it to a [`MessageCodec`]
//! - [`MavlinkWriter`] stamps system/component ID and the sequence number, then
//!   serializes into an internal frame buffer (payload trimmed, CRC appended)
//! - The returned slice borrows that buffer and is valid until the next encode
//!
//! # Buffer Management
//!
//! One frame buffer of [`MAX_FRAME_LEN`] bytes, reused for every message. The
//! largest MAVLink 2 frame (255-byte payload, signed) fits exactly.

use mavlink::common::MavMessage;
use mavlink::{MAVLinkV2MessageRaw, MavHeader};

/// Maximum MAVLink 2 frame size (bytes)
///
/// 10 header + 255 payload + 2 checksum + 13 signature.
pub const MAX_FRAME_LEN: usize = 280;

/// Serializes a message into a checksummed wire frame
pub trait MessageCodec {
    /// Encode `message`, returning the frame bytes
    ///
    /// The slice is only valid until the next call.
    fn encode(&mut self, message: &MavMessage) -> Result<&[u8], CodecError>;
}

/// MAVLink 2 writer
pub struct MavlinkWriter {
    /// System ID (our autopilot ID)
    system_id: u8,
    /// Component ID (autopilot component)
    component_id: u8,
    /// Message sequence counter
    sequence: u8,
    /// Frame buffer
    raw: MAVLinkV2MessageRaw,
}

impl MavlinkWriter {
    /// Create a new MAVLink writer
    ///
    /// # Arguments
    ///
    /// * `system_id` - MAVLink system ID (default: 1)
    /// * `component_id` - MAVLink component ID (default: 1 for autopilot)
    pub fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            system_id,
            component_id,
            sequence: 0,
            raw: MAVLinkV2MessageRaw::new(),
        }
    }

    /// Sequence number the next frame will carry
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// System ID stamped on every frame
    pub fn system_id(&self) -> u8 {
        self.system_id
    }

    /// Component ID stamped on every frame
    pub fn component_id(&self) -> u8 {
        self.component_id
    }
}

impl MessageCodec for MavlinkWriter {
    fn encode(&mut self, message: &MavMessage) -> Result<&[u8], CodecError> {
        let header = MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.sequence,
        };

        // Increment sequence for next message
        self.sequence = self.sequence.wrapping_add(1);

        self.raw.serialize_message(header, message);
        let frame = self.raw.raw_bytes();
        if frame.len() > MAX_FRAME_LEN {
            return Err(CodecError::FrameTooLarge {
                len: frame.len(),
                max: MAX_FRAME_LEN,
            });
        }
        Ok(frame)
    }
}

/// Codec error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Serialized frame does not fit the transport buffer
    FrameTooLarge { len: usize, max: usize },
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CodecError::FrameTooLarge { len, max } => {
                write!(f, "Frame too large: {} bytes (max {})", len, max)
            }
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    //! Recording codec for host tests
    //!
    //! Encodes through a real [`MavlinkWriter`] so frames on the mock transport are
    //! valid MAVLink, and keeps a copy of every message it was asked to encode so
    //! tests can assert on typed fields instead of raw bytes.

    use super::{CodecError, MavlinkWriter, MessageCodec};
    use heapless::Vec;
    use mavlink::common::MavMessage;

    /// Maximum messages kept by [`RecordingCodec`]
    pub const RECORD_CAPACITY: usize = 64;

    /// Codec double that records messages
    pub struct RecordingCodec {
        writer: MavlinkWriter,
        /// Messages encoded successfully, oldest first
        pub messages: Vec<MavMessage, RECORD_CAPACITY>,
        /// Error to return from encode()
        pub encode_error: Option<CodecError>,
    }

    impl RecordingCodec {
        /// Create a recording codec stamping the given IDs
        pub fn new(system_id: u8, component_id: u8) -> Self {
            Self {
                writer: MavlinkWriter::new(system_id, component_id),
                messages: Vec::new(),
                encode_error: None,
            }
        }

        /// Set error to return from encode()
        pub fn set_encode_error(&mut self, error: CodecError) {
            self.encode_error = Some(error);
        }

        /// Stop injecting errors
        pub fn clear_encode_error(&mut self) {
            self.encode_error = None;
        }

        /// Recorded messages
        pub fn messages(&self) -> &[MavMessage] {
            &self.messages
        }

        /// Most recently recorded message
        pub fn last(&self) -> Option<&MavMessage> {
            self.messages.last()
        }

        /// Forget recorded messages
        pub fn clear(&mut self) {
            self.messages.clear();
        }

        /// Underlying writer
        pub fn writer(&self) -> &MavlinkWriter {
            &self.writer
        }
    }

    impl Default for RecordingCodec {
        fn default() -> Self {
            Self::new(1, 1)
        }
    }

    impl MessageCodec for RecordingCodec {
        fn encode(&mut self, message: &MavMessage) -> Result<&[u8], CodecError> {
            if let Some(error) = self.encode_error {
                return Err(error);
            }
            // Oldest messages are kept once the record is full
            let _ = self.messages.push(message.clone());
            self.writer.encode(message)
        }
    }
}
