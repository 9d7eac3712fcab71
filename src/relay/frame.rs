//! Relayed frame types
//!
//! A [`Frame`] is the unit the relay moves between connections. It carries
//! opaque payload bytes, the originating connection, and a kind tag; the
//! relay never inspects or stores the payload beyond the hop into each
//! target's outbound queue.

use bytes::Bytes;

use crate::registry::ConnectionId;

/// Kind of relayed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Video frame payload
    Video,
    /// Audio chunk payload
    Audio,
    /// Status event (room notifications)
    Status,
    /// Error report, delivered to a single connection and never fanned out
    Error,
}

/// A frame to be fanned out to room members
///
/// Cheap to clone: the payload is reference-counted via `Bytes`, so every
/// target queue shares the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Kind of frame
    pub kind: FrameKind,
    /// Opaque payload (never interpreted by the relay)
    pub payload: Bytes,
    /// Connection the frame originated from
    pub origin: ConnectionId,
}

impl Frame {
    /// Create a video frame
    pub fn video(origin: ConnectionId, payload: Bytes) -> Self {
        Self {
            kind: FrameKind::Video,
            payload,
            origin,
        }
    }

    /// Create an audio frame
    pub fn audio(origin: ConnectionId, payload: Bytes) -> Self {
        Self {
            kind: FrameKind::Audio,
            payload,
            origin,
        }
    }

    /// Create a status event
    pub fn status(origin: ConnectionId, message: &str) -> Self {
        Self {
            kind: FrameKind::Status,
            payload: Bytes::copy_from_slice(message.as_bytes()),
            origin,
        }
    }

    /// Create an error report
    pub fn error(origin: ConnectionId, message: &str) -> Self {
        Self {
            kind: FrameKind::Error,
            payload: Bytes::copy_from_slice(message.as_bytes()),
            origin,
        }
    }

    /// Payload length in bytes
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constructors() {
        let origin = ConnectionId::new(7);

        let video = Frame::video(origin, Bytes::from_static(b"vvv"));
        assert_eq!(video.kind, FrameKind::Video);
        assert_eq!(video.origin, origin);
        assert_eq!(video.payload_len(), 3);

        let audio = Frame::audio(origin, Bytes::from_static(b"aa"));
        assert_eq!(audio.kind, FrameKind::Audio);

        let status = Frame::status(origin, "Someone joined!");
        assert_eq!(status.kind, FrameKind::Status);
        assert_eq!(status.payload, "Someone joined!");
    }

    #[test]
    fn test_clone_shares_payload() {
        let frame = Frame::video(ConnectionId::new(1), Bytes::from(vec![0u8; 1024]));
        let copy = frame.clone();

        // Same backing allocation, not a byte copy
        assert_eq!(frame.payload.as_ptr(), copy.payload.as_ptr());
    }
}
