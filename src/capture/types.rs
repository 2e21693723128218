//! Frame and sample types shared by capture and detection.

use serde::{Deserialize, Serialize};

/// A preprocessed (grayscale, square, blurred) camera frame.
pub type Frame = image::GrayImage;

/// Centroid of changed pixels between two consecutive frames.
///
/// Coordinates are in frame pixels. A frame pair with no changed pixels
/// yields `(0, 0)`, which the outlier cutoffs are expected to discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sample {
    pub x: i32,
    pub y: i32,
}

impl Sample {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this is the fallback produced by a motionless frame pair.
    pub fn is_degenerate(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}
