//! Motion sampling by frame differencing.
//!
//! Two consecutive frames are differenced pixel by pixel, the difference is
//! binarized with a fixed intensity threshold and the mean position of the
//! "on" pixels becomes the sample for that tick.

use crate::capture::types::{Frame, Sample};

/// Turns a stream of frames into a stream of motion centroids.
///
/// Only the most recent frame is kept, as the baseline for the next call.
#[derive(Debug, Clone)]
pub struct MotionSampler {
    intensity_threshold: u8,
    baseline: Option<Frame>,
}

impl MotionSampler {
    pub fn new(intensity_threshold: u8) -> Self {
        Self {
            intensity_threshold,
            baseline: None,
        }
    }

    /// Set the frame the next sample is compared against.
    pub fn prime(&mut self, frame: Frame) {
        self.baseline = Some(frame);
    }

    /// Whether a baseline frame is available.
    pub fn is_primed(&self) -> bool {
        self.baseline.is_some()
    }

    /// Compare `frame` with the baseline and make it the new baseline.
    ///
    /// The very first frame only primes the sampler and yields `None`.
    pub fn sample(&mut self, frame: Frame) -> Option<Sample> {
        let sample = self
            .baseline
            .as_ref()
            .map(|previous| motion_centroid(previous, &frame, self.intensity_threshold));
        self.baseline = Some(frame);
        sample
    }
}

/// Centroid of pixels whose absolute difference is at least `threshold`.
///
/// Frames of different sizes are compared over their common top-left region.
/// No changed pixel at all gives `(0, 0)`.
pub fn motion_centroid(previous: &Frame, current: &Frame, threshold: u8) -> Sample {
    let width = previous.width().min(current.width());
    let height = previous.height().min(current.height());

    let mut count: u64 = 0;
    let mut sum_x: u64 = 0;
    let mut sum_y: u64 = 0;

    for y in 0..height {
        for x in 0..width {
            let a = previous.get_pixel(x, y)[0];
            let b = current.get_pixel(x, y)[0];
            if a.abs_diff(b) >= threshold {
                count += 1;
                sum_x += x as u64;
                sum_y += y as u64;
            }
        }
    }

    if count == 0 {
        return Sample::default();
    }
    Sample::new((sum_x / count) as i32, (sum_y / count) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn frame_with_block(size: u32, x0: u32, y0: u32, side: u32) -> Frame {
        let mut frame = GrayImage::new(size, size);
        for y in y0..(y0 + side).min(size) {
            for x in x0..(x0 + side).min(size) {
                frame.put_pixel(x, y, Luma([200]));
            }
        }
        frame
    }

    #[test]
    fn test_identical_frames_give_fallback() {
        let frame = frame_with_block(20, 5, 5, 4);
        assert_eq!(motion_centroid(&frame, &frame, 10), Sample::new(0, 0));
    }

    #[test]
    fn test_centroid_of_appearing_block() {
        let empty = GrayImage::new(20, 20);
        let block = frame_with_block(20, 10, 4, 4);
        // Block covers x 10..14, y 4..8
        assert_eq!(motion_centroid(&empty, &block, 10), Sample::new(11, 5));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let a = GrayImage::from_pixel(4, 4, Luma([100]));
        let mut b = a.clone();
        b.put_pixel(3, 2, Luma([125]));

        assert_eq!(motion_centroid(&a, &b, 25), Sample::new(3, 2));
        assert_eq!(motion_centroid(&a, &b, 26), Sample::new(0, 0));
    }

    #[test]
    fn test_sampler_primes_on_first_frame() {
        let mut sampler = MotionSampler::new(10);
        assert!(!sampler.is_primed());
        assert_eq!(sampler.sample(GrayImage::new(10, 10)), None);
        assert!(sampler.is_primed());

        let sample = sampler.sample(frame_with_block(10, 2, 2, 2)).unwrap();
        assert_eq!(sample, Sample::new(2, 2));

        // The block frame is now the baseline; it disappearing is motion too.
        let sample = sampler.sample(GrayImage::new(10, 10)).unwrap();
        assert_eq!(sample, Sample::new(2, 2));
    }
}
