//! In-process mailbox for running both loops in one process.

use crate::core::gesture::GestureEvent;
use crate::mailbox::{ChannelError, GestureChannel};
use std::sync::{Arc, Mutex};

/// Single-slot mailbox; a new event overwrites an unread one.
///
/// Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailbox {
    slot: Arc<Mutex<Option<GestureEvent>>>,
}

impl MemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an unread event is waiting.
    pub fn has_pending(&self) -> bool {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}

impl GestureChannel for MemoryMailbox {
    fn publish(&self, event: &GestureEvent) -> Result<(), ChannelError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(*event);
        Ok(())
    }

    fn poll_latest_and_clear(&self) -> Result<Option<GestureEvent>, ChannelError> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).take())
    }
}
