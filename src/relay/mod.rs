//! Frame types and fan-out relay
//!
//! Relaying is fire-and-forget: real-time media has no value after a retry
//! delay, so nothing here retries, buffers beyond the per-target queues, or
//! reports per-target delivery back to the sender.

pub mod fanout;
pub mod frame;

pub use fanout::FrameRelay;
pub use frame::{Frame, FrameKind};
