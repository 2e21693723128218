//! The display-side polling loop.

use crate::mailbox::GestureChannel;
use crate::record::SharedRunStats;
use crate::zoom::display::{Display, DisplayError, ESC_KEY};
use crate::zoom::engine::{ZoomEngine, ZoomOutcome};
use std::sync::Arc;

/// How long the first frame stays up before polling starts, in milliseconds.
const STARTUP_DELAY_MS: u64 = 1000;

/// Delay between polls, in milliseconds.
const POLL_DELAY_MS: u64 = 1;

/// Polls the gesture channel and drives a `ZoomEngine`.
pub struct DisplayLoop {
    engine: ZoomEngine,
    channel: Arc<dyn GestureChannel>,
    stats: SharedRunStats,
    last_timestamp: Option<u64>,
}

impl DisplayLoop {
    pub fn new(engine: ZoomEngine, channel: Arc<dyn GestureChannel>, stats: SharedRunStats) -> Self {
        Self {
            engine,
            channel,
            stats,
            last_timestamp: None,
        }
    }

    pub fn engine(&self) -> &ZoomEngine {
        &self.engine
    }

    /// Timestamp of the last event taken from the channel.
    pub fn last_timestamp(&self) -> Option<u64> {
        self.last_timestamp
    }

    /// Poll the channel once and apply the newest event, if it is new.
    ///
    /// Channel errors are logged and count as no event.
    pub fn poll_once<D: Display + ?Sized>(
        &mut self,
        display: &mut D,
    ) -> Result<Option<ZoomOutcome>, DisplayError> {
        let event = match self.channel.poll_latest_and_clear() {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!("Mailbox poll failed: {e}");
                return Ok(None);
            }
        };

        if self.last_timestamp == Some(event.timestamp) {
            tracing::debug!(timestamp = event.timestamp, "Event already applied");
            return Ok(None);
        }
        self.last_timestamp = Some(event.timestamp);
        self.stats.record_event_consumed();

        let outcome = self.engine.apply(&event, display)?;
        self.stats.record_stages_rendered(outcome.rendered() as u64);
        Ok(Some(outcome))
    }

    /// Show the base stage, then poll until the display reports the quit key.
    pub fn run<D: Display + ?Sized>(&mut self, display: &mut D) -> Result<(), DisplayError> {
        self.engine.show_current(display)?;
        if display.wait_key(STARTUP_DELAY_MS) == Some(ESC_KEY) {
            return Ok(());
        }

        loop {
            if display.wait_key(POLL_DELAY_MS) == Some(ESC_KEY) {
                tracing::info!(stage = self.engine.stage(), "Display loop stopped");
                return Ok(());
            }
            self.poll_once(display)?;
        }
    }
}
