//! Fitting a stage onto the screen.

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Maps a stage image onto a `width x height` screen.
pub trait ViewTransform: Send {
    fn transform(&self, image: &RgbImage, width: u32, height: u32) -> RgbImage;
}

/// Scales the image to cover the screen and crops the overflow.
///
/// `center_x` and `center_y` pick where the visible window sits inside the
/// overflow: 0 keeps the left/top edge, 1 the right/bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchoredTransform {
    pub center_x: f64,
    pub center_y: f64,
}

impl AnchoredTransform {
    pub fn new(center_x: f64, center_y: f64) -> Self {
        Self {
            center_x: center_x.clamp(0.0, 1.0),
            center_y: center_y.clamp(0.0, 1.0),
        }
    }
}

impl ViewTransform for AnchoredTransform {
    fn transform(&self, image: &RgbImage, width: u32, height: u32) -> RgbImage {
        let (iw, ih) = image.dimensions();
        if (iw, ih) == (width, height) || iw == 0 || ih == 0 {
            return image.clone();
        }

        let scale = (width as f64 / iw as f64).max(height as f64 / ih as f64);
        let sw = ((iw as f64 * scale).ceil() as u32).max(width);
        let sh = ((ih as f64 * scale).ceil() as u32).max(height);
        let scaled = imageops::resize(image, sw, sh, FilterType::Triangle);

        let x = ((sw - width) as f64 * self.center_x).round() as u32;
        let y = ((sh - height) as f64 * self.center_y).round() as u32;
        imageops::crop_imm(&scaled, x, y, width, height).to_image()
    }
}
