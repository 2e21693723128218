//! Core gesture detection.
//!
//! This module contains:
//! - Motion sampling from consecutive frames
//! - Window management for collecting samples into detection windows
//! - Outlier filtering and trend classification
//! - The detector loop tying them together

pub mod classifier;
pub mod detector;
pub mod filter;
pub mod gesture;
pub mod motion;
pub mod windowing;

// Re-export commonly used types
pub use classifier::{classify, classify_trend, trend_strength, window_trend, Trend, TrendThresholds};
pub use detector::{Detector, DetectorSettings, WindowOutcome, WindowReport};
pub use filter::{
    outlier_filter, Cutoffs, FilteredWindow, IndependentAxisFilter, JointPairFilter, OutlierFilter,
};
pub use gesture::{Gesture, GestureEvent, UnknownGesture, ZoomDirection};
pub use motion::{motion_centroid, MotionSampler};
pub use windowing::{SampleWindow, WindowManager};
