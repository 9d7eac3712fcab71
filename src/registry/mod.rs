//! Connection registry and shared error taxonomy
//!
//! The registry tracks every live connection and owns its outbound queue.
//! Together with the room table it forms the shared state the relay fans
//! out over.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<ConnectionRegistry>
//!                  ┌───────────────────────────┐
//!                  │ connections: HashMap<Id,  │
//!                  │   ConnectionEntry {       │
//!                  │     queue: OutboundQueue, │
//!                  │     alive, counters,      │
//!                  │   }                       │
//!                  │ >                         │
//!                  └────────────┬──────────────┘
//!                               │
//!        ┌──────────────────────┼──────────────────────┐
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//!   [inbound task]        [FrameRelay]           [drain task]
//!   on_media()            lookup(target)         queue.dequeue()
//!        │                      │                      │
//!        └──► relay() ──► queue.enqueue() ──► send ──► WebSocket
//! ```
//!
//! Payloads are `bytes::Bytes`, so fan-out to many targets shares one
//! allocation; the per-target queue clone is reference-counted, not copied.

pub mod config;
pub mod connection;
pub mod error;
pub mod store;

pub use config::RegistryConfig;
pub use connection::{ConnectionEntry, ConnectionId};
pub use error::RegistryError;
pub use store::ConnectionRegistry;
