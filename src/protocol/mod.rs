//! Wire protocol
//!
//! JSON text messages over the WebSocket, tagged by `event`. The inbound
//! vocabulary is `join_room` / `send_video` / `send_audio`; the outbound
//! vocabulary is `status` / `receive_video` / `receive_audio` / `error`.
//! Disconnect has no message: it is the transport closing.
//!
//! Media payloads arrive as strings (clients send base64) and pass through
//! the relay untouched: [`Payload`] keeps the raw string bytes in a
//! reference-counted `Bytes`, so the server neither decodes nor re-encodes
//! what it refuses to interpret.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::relay::{Frame, FrameKind};

/// Opaque media payload, carried as raw string bytes
///
/// Serializes as a JSON string without copying out of the shared buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(pub Bytes);

impl Payload {
    /// Wrap existing bytes
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// The raw payload bytes
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Payloads enter as JSON strings, so the bytes are valid UTF-8;
        // anything else is a constructed frame with a bad payload.
        let s = std::str::from_utf8(&self.0)
            .map_err(|_| serde::ser::Error::custom("payload is not valid UTF-8"))?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self(Bytes::from(s.into_bytes())))
    }
}

/// Messages a client sends to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a named room, implicitly leaving the current one
    JoinRoom {
        /// Target room name
        room: String,
    },
    /// Relay a video frame to the sender's room
    SendVideo {
        /// Base64 image data, passed through opaquely
        image: Payload,
    },
    /// Relay an audio chunk to the sender's room
    SendAudio {
        /// Base64 audio data, passed through opaquely
        audio: Payload,
    },
}

/// Messages the server sends to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Room status notification
    Status {
        /// Human-readable status text
        msg: String,
    },
    /// Video frame relayed from another member
    ReceiveVideo {
        /// Base64 image data as sent by the origin
        image: Payload,
    },
    /// Audio chunk relayed from another member
    ReceiveAudio {
        /// Base64 audio data as sent by the origin
        audio: Payload,
    },
    /// Request rejection, reported to the offending connection only
    Error {
        /// Human-readable error text
        msg: String,
    },
}

impl From<&Frame> for ServerMessage {
    fn from(frame: &Frame) -> Self {
        match frame.kind {
            FrameKind::Video => ServerMessage::ReceiveVideo {
                image: Payload(frame.payload.clone()),
            },
            FrameKind::Audio => ServerMessage::ReceiveAudio {
                audio: Payload(frame.payload.clone()),
            },
            FrameKind::Status => ServerMessage::Status {
                msg: String::from_utf8_lossy(&frame.payload).into_owned(),
            },
            FrameKind::Error => ServerMessage::Error {
                msg: String::from_utf8_lossy(&frame.payload).into_owned(),
            },
        }
    }
}
