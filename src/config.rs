//! Allocation limits for buffers and writers

use serde::{Deserialize, Serialize};

/// Default ceiling for a single buffer allocation (256 MiB).
pub const DEFAULT_MAX_CAPACITY: usize = 256 * 1024 * 1024;

/// Default initial capacity of a [`GrowableWriter`](crate::GrowableWriter).
pub const DEFAULT_WRITER_CAPACITY: usize = 1024;

/// Sizing configuration shared by [`ByteBuffer`](crate::ByteBuffer) and
/// [`GrowableWriter`](crate::GrowableWriter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Largest capacity a single buffer may have, in bytes
    pub max_capacity: usize,
    /// Capacity a writer starts with when the caller does not pick one
    pub default_writer_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            default_writer_capacity: DEFAULT_WRITER_CAPACITY,
        }
    }
}

impl BufferConfig {
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn with_default_writer_capacity(mut self, capacity: usize) -> Self {
        self.default_writer_capacity = capacity;
        self
    }
}
