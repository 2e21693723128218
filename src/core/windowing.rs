//! Window management for collecting samples into detection windows.
//!
//! Samples are collected into fixed-size windows. A window is handed out as
//! soon as it fills and the buffer starts over, so windows never overlap.

use crate::capture::types::Sample;
use serde::{Deserialize, Serialize};

/// A full window of samples, split per axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWindow {
    /// Zero-based position of this window within the run
    pub index: u64,
    pub x: Vec<i32>,
    pub y: Vec<i32>,
}

impl SampleWindow {
    /// Build a window directly from per-axis values.
    pub fn from_axes(index: u64, x: Vec<i32>, y: Vec<i32>) -> Self {
        Self { index, x, y }
    }
}

/// Accumulates samples until a window is full.
#[derive(Debug, Clone)]
pub struct WindowManager {
    /// Samples per window
    window_size: usize,
    /// Samples of the window being filled
    current: Vec<Sample>,
    /// Windows handed out so far
    completed: u64,
}

impl WindowManager {
    /// Create a new window manager with the given window size.
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            current: Vec::with_capacity(window_size),
            completed: 0,
        }
    }

    /// Add a sample; returns the window it completes, if any.
    pub fn push(&mut self, sample: Sample) -> Option<SampleWindow> {
        self.current.push(sample);
        if self.current.len() < self.window_size {
            return None;
        }

        let samples = std::mem::replace(&mut self.current, Vec::with_capacity(self.window_size));
        let window = SampleWindow {
            index: self.completed,
            x: samples.iter().map(|s| s.x).collect(),
            y: samples.iter().map(|s| s.y).collect(),
        };
        self.completed += 1;
        Some(window)
    }

    /// Samples waiting in the partially filled window.
    pub fn pending(&self) -> usize {
        self.current.len()
    }

    /// Get the number of completed windows.
    pub fn completed_window_count(&self) -> u64 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_fills_and_resets() {
        let mut manager = WindowManager::new(3);

        assert!(manager.push(Sample::new(1, 10)).is_none());
        assert!(manager.push(Sample::new(2, 20)).is_none());
        let window = manager.push(Sample::new(3, 30)).unwrap();

        assert_eq!(window.index, 0);
        assert_eq!(window.x, vec![1, 2, 3]);
        assert_eq!(window.y, vec![10, 20, 30]);
        assert_eq!(manager.pending(), 0);
    }

    #[test]
    fn test_windows_do_not_overlap() {
        let mut manager = WindowManager::new(2);
        let windows: Vec<SampleWindow> = (0..7)
            .filter_map(|i| manager.push(Sample::new(i, i)))
            .collect();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1].x, vec![2, 3]);
        assert_eq!(windows[2].index, 2);
        assert_eq!(manager.pending(), 1);
        assert_eq!(manager.completed_window_count(), 3);
    }
}
