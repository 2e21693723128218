//! Filesystem mailbox: one file per event in a shared directory.
//!
//! Entry names carry the event as `{timestamp:020}_{gesture}_{zoom_factor}`,
//! so the newest event is simply the last name in sorted order. The file body
//! holds the same event as JSON for offline inspection. No locks are taken;
//! an entry written between the consumer's listing and its cleanup can be
//! lost.

use crate::core::gesture::{Gesture, GestureEvent};
use crate::mailbox::{ChannelError, GestureChannel};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SEPARATOR: char = '_';

/// Encode an event as a mailbox entry name.
pub fn encode_entry_name(event: &GestureEvent) -> String {
    format!(
        "{:020}{SEPARATOR}{}{SEPARATOR}{}",
        event.timestamp,
        event.gesture.symbol(),
        event.zoom_factor
    )
}

/// Decode a mailbox entry name; malformed names yield `None`.
pub fn decode_entry_name(name: &str) -> Option<GestureEvent> {
    let mut parts = name.splitn(3, SEPARATOR);
    let timestamp = parts.next()?.parse::<u64>().ok()?;
    let gesture = parts.next()?.parse::<Gesture>().ok()?;
    let zoom_factor = parts.next()?.parse::<f64>().ok()?;
    Some(GestureEvent::new(timestamp, gesture, zoom_factor))
}

/// Mailbox backed by a directory shared between processes.
#[derive(Debug, Clone)]
pub struct DirectoryMailbox {
    dir: PathBuf,
}

impl DirectoryMailbox {
    /// Open (and create if needed) the mailbox directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ChannelError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| ChannelError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Names of visible entries, unsorted. In-flight temp files are hidden.
    fn entry_names(&self) -> Result<Vec<String>, ChannelError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| self.io_error(source))?;

        Ok(entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect())
    }

    fn io_error(&self, source: std::io::Error) -> ChannelError {
        ChannelError::Io {
            path: self.dir.clone(),
            source,
        }
    }
}

impl GestureChannel for DirectoryMailbox {
    fn publish(&self, event: &GestureEvent) -> Result<(), ChannelError> {
        let name = encode_entry_name(event);
        let temp = self.dir.join(format!(".{name}.tmp"));
        let body = serde_json::to_vec(event)?;

        std::fs::write(&temp, body).map_err(|source| self.io_error(source))?;
        std::fs::rename(&temp, self.dir.join(&name)).map_err(|source| self.io_error(source))?;
        Ok(())
    }

    fn poll_latest_and_clear(&self) -> Result<Option<GestureEvent>, ChannelError> {
        let mut names = self.entry_names()?;
        if names.is_empty() {
            return Ok(None);
        }

        for name in &names {
            match std::fs::remove_file(self.dir.join(name)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Could not remove mailbox entry {name}: {e}"),
            }
        }

        names.sort();
        let newest = names.last().map(String::as_str).unwrap_or_default();
        let event = decode_entry_name(newest);
        if event.is_none() {
            tracing::debug!("Ignoring malformed mailbox entry {newest:?}");
        }
        Ok(event)
    }
}
