//! Publishing classified gestures.

use crate::core::gesture::{Gesture, GestureEvent};
use crate::mailbox::{ChannelError, GestureChannel};
use chrono::Utc;
use std::sync::Arc;

/// Issues strictly increasing nanosecond timestamps.
///
/// Wall-clock based, bumped by one whenever the clock has not advanced since
/// the previous key.
#[derive(Debug, Clone, Default)]
pub struct SortKeyClock {
    last: u64,
}

impl SortKeyClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&mut self) -> u64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default().max(0) as u64;
        let key = now.max(self.last.saturating_add(1));
        self.last = key;
        key
    }
}

/// Turns classified gestures into published events.
pub struct GestureEmitter {
    channel: Arc<dyn GestureChannel>,
    clock: SortKeyClock,
    zoom_factor: f64,
}

impl GestureEmitter {
    pub fn new(channel: Arc<dyn GestureChannel>, zoom_factor: f64) -> Self {
        Self {
            channel,
            clock: SortKeyClock::new(),
            zoom_factor,
        }
    }

    /// Publish `gesture` once.
    ///
    /// `Gesture::None` is never published and yields `Ok(None)`.
    pub fn emit(&mut self, gesture: Gesture) -> Result<Option<GestureEvent>, ChannelError> {
        if gesture.is_none() {
            return Ok(None);
        }

        let event = GestureEvent::new(self.clock.next_key(), gesture, self.zoom_factor);
        self.channel.publish(&event)?;
        Ok(Some(event))
    }
}
