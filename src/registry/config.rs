//! Registry configuration

/// Configuration for the connection registry and room table
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum queued outbound frames per connection
    ///
    /// Bounds memory by frame count rather than byte size, since video and
    /// audio payload sizes vary widely. When a queue is full the oldest
    /// frame is evicted to admit the new one.
    pub outbound_queue_capacity: usize,

    /// Maximum accepted room name length in bytes
    pub max_room_name_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: 32,
            max_room_name_len: 128,
        }
    }
}

impl RegistryConfig {
    /// Set the per-connection outbound queue capacity
    pub fn outbound_queue_capacity(mut self, capacity: usize) -> Self {
        self.outbound_queue_capacity = capacity;
        self
    }

    /// Set the maximum room name length
    pub fn max_room_name_len(mut self, len: usize) -> Self {
        self.max_room_name_len = len;
        self
    }
}
