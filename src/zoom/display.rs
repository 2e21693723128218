//! Screen output.

use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Key code that ends the display loop.
pub const ESC_KEY: u32 = 27;

/// A full-screen output surface.
pub trait Display {
    /// Present one frame.
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError>;

    /// Wait up to `delay_ms` for a key press and return its code.
    fn wait_key(&mut self, delay_ms: u64) -> Option<u32>;
}

/// Errors raised while presenting frames.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write frame {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Writes every shown frame as a numbered PNG.
///
/// There is no keyboard; the quit key is reported once `running` is cleared.
pub struct DirectoryDisplay {
    dir: PathBuf,
    running: Arc<AtomicBool>,
    frames_written: u64,
}

impl DirectoryDisplay {
    pub fn open(dir: impl Into<PathBuf>, running: Arc<AtomicBool>) -> Result<Self, DisplayError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| DisplayError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            running,
            frames_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl Display for DirectoryDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        let path = self.dir.join(format!("frame_{:06}.png", self.frames_written));
        frame
            .save(&path)
            .map_err(|source| DisplayError::Encode { path, source })?;
        self.frames_written += 1;
        Ok(())
    }

    fn wait_key(&mut self, delay_ms: u64) -> Option<u32> {
        if !self.running.load(Ordering::SeqCst) {
            return Some(ESC_KEY);
        }
        std::thread::sleep(Duration::from_millis(delay_ms.max(1)));
        (!self.running.load(Ordering::SeqCst)).then_some(ESC_KEY)
    }
}

/// Keeps shown frames in memory and replays scripted key presses.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    pub frames: Vec<RgbImage>,
    keys: VecDeque<Option<u32>>,
    waits: u64,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the results of the next `wait_key` calls.
    ///
    /// Once the queue runs dry every wait reports the quit key, so a scripted
    /// display loop always ends.
    pub fn with_keys(keys: impl IntoIterator<Item = Option<u32>>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of `wait_key` calls so far.
    pub fn waits(&self) -> u64 {
        self.waits
    }
}

impl Display for MemoryDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn wait_key(&mut self, _delay_ms: u64) -> Option<u32> {
        self.waits += 1;
        self.keys.pop_front().unwrap_or(Some(ESC_KEY))
    }
}
