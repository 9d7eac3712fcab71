//! Per-connection bounded outbound queue
//!
//! Each connection owns one [`OutboundQueue`] that decouples the relay's
//! fan-out from that connection's transport. The relay enqueues and returns
//! immediately; a dedicated drain task dequeues and writes to the socket.
//! A slow or stalled receiver therefore never stalls the sender or any
//! other member of the room.
//!
//! The queue is bounded by frame count. When full, `enqueue` evicts the
//! single oldest entry before inserting the new one: stale frames are worse
//! than dropped frames for real-time media. Queue length never exceeds
//! capacity.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::registry::RegistryError;
use crate::relay::Frame;

struct QueueState {
    frames: VecDeque<Frame>,
    closed: bool,
}

/// Bounded FIFO of frames awaiting transmission to one connection
pub struct OutboundQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    notify: Notify,
    dropped: AtomicU64,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` frames
    ///
    /// A capacity of zero is treated as one: a queue that can never admit a
    /// frame would silently discard all traffic to its connection.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                frames: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            capacity,
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue a frame, evicting the oldest entry if the queue is full
    ///
    /// Returns [`RegistryError::QueueClosed`] once the queue has been torn
    /// down; relayers treat that as a silent per-target drop.
    pub async fn enqueue(&self, frame: Frame) -> Result<(), RegistryError> {
        {
            let mut state = self.state.lock().await;

            if state.closed {
                return Err(RegistryError::QueueClosed);
            }

            if state.frames.len() == self.capacity {
                state.frames.pop_front();
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }

            state.frames.push_back(frame);
        }

        self.notify.notify_one();
        Ok(())
    }

    /// Dequeue the next frame, suspending while the queue is empty
    ///
    /// Resumes on enqueue or on [`close`](Self::close), at which point it
    /// fails with [`RegistryError::QueueClosed`].
    pub async fn dequeue(&self) -> Result<Frame, RegistryError> {
        loop {
            // Register for wakeup before checking state, so an enqueue
            // between the check and the await is not missed.
            let notified = self.notify.notified();

            {
                let mut state = self.state.lock().await;

                if let Some(frame) = state.frames.pop_front() {
                    return Ok(frame);
                }
                if state.closed {
                    return Err(RegistryError::QueueClosed);
                }
            }

            notified.await;
        }
    }

    /// Close the queue, waking all blocked dequeuers with `QueueClosed`
    ///
    /// Idempotent. Frames still queued are discarded; real-time data has no
    /// value after the connection is torn down.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return;
            }
            state.closed = true;
            state.frames.clear();
        }

        self.notify.notify_waiters();
    }

    /// Number of frames currently queued
    pub async fn len(&self) -> usize {
        self.state.lock().await.frames.len()
    }

    /// Whether the queue is empty
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.frames.is_empty()
    }

    /// Whether the queue has been closed
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Total frames evicted because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
