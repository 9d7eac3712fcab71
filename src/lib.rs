//! # relay-rs
//!
//! A WebSocket room relay server: clients join named rooms and exchange
//! video/audio frames and status events with the other members of their
//! room. The server is a pure relay; it never persists or interprets the
//! media it forwards.
//!
//! # Design
//!
//! - Connections and rooms live in explicit, lock-disciplined registries
//!   ([`registry::ConnectionRegistry`], [`room::RoomTable`]), not ambient
//!   singletons.
//! - Fan-out ([`relay::FrameRelay`]) is best-effort and non-blocking: each
//!   target has a bounded outbound queue ([`queue::OutboundQueue`]) that
//!   evicts its oldest frame when full, so a slow receiver can neither
//!   stall the sender nor grow memory without bound.
//! - Frames from one connection reach each target in arrival order; there
//!   is no ordering across different senders.
//! - A sender never receives its own frame back.
//!
//! # Example
//!
//! ```no_run
//! use relay_rs::{RelayServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> relay_rs::Result<()> {
//!     let config = ServerConfig::with_addr("0.0.0.0:8000".parse().unwrap());
//!     RelayServer::new(config).run().await
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod queue;
pub mod registry;
pub mod relay;
pub mod room;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{Error, Result};
pub use protocol::{ClientMessage, Payload, ServerMessage};
pub use queue::OutboundQueue;
pub use registry::{
    ConnectionEntry, ConnectionId, ConnectionRegistry, RegistryConfig, RegistryError,
};
pub use relay::{Frame, FrameKind, FrameRelay};
pub use room::RoomTable;
pub use server::{RelayServer, ServerConfig};
pub use session::SessionManager;
