//! The one-way gesture channel between the detector and the display.
//!
//! Delivery is lossy and last-writer-wins: the producer publishes, the
//! consumer periodically takes the newest event and clears everything else.
//! There is no acknowledgment and no retry.

pub mod directory;
pub mod emitter;
pub mod memory;

use crate::core::gesture::GestureEvent;
use std::path::PathBuf;

// Re-export commonly used types
pub use directory::{decode_entry_name, encode_entry_name, DirectoryMailbox};
pub use emitter::{GestureEmitter, SortKeyClock};
pub use memory::MemoryMailbox;

/// A single-consumer mailbox for gesture events.
pub trait GestureChannel: Send + Sync {
    /// Make `event` visible to the consumer.
    fn publish(&self, event: &GestureEvent) -> Result<(), ChannelError>;

    /// Take the newest pending event and discard all others.
    ///
    /// Returns `Ok(None)` when nothing was pending or the newest entry could
    /// not be decoded.
    fn poll_latest_and_clear(&self) -> Result<Option<GestureEvent>, ChannelError>;
}

/// Errors raised by a gesture channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Mailbox IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not serialize gesture event: {0}")]
    Serialize(#[from] serde_json::Error),
}
