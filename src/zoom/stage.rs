//! The cache of zoom stages.

use image::imageops::{self, FilterType};
use image::{ImageResult, RgbImage};
use std::path::Path;

/// Load the image the display zooms into, at display resolution.
pub fn load_base_image(path: &Path, width: u32, height: u32) -> ImageResult<RgbImage> {
    let image = image::open(path)?.to_rgb8();
    Ok(fit(image, width, height))
}

fn fit(image: RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        image
    } else {
        imageops::resize(&image, width, height, FilterType::Triangle)
    }
}

/// Crop `step` of the height and width off every side of `previous` and
/// scale the remainder back up to `width x height`.
///
/// The crop keeps at least one pixel in each direction.
pub fn crop_stage(previous: &RgbImage, step: f64, width: u32, height: u32) -> RgbImage {
    let (w, h) = previous.dimensions();
    let (x0, cw) = crop_span(w, step);
    let (y0, ch) = crop_span(h, step);

    let cropped = imageops::crop_imm(previous, x0, y0, cw, ch).to_image();
    fit(cropped, width, height)
}

/// Start and length of the kept range `round(len*step)..round(len*(1-step))`.
fn crop_span(len: u32, step: f64) -> (u32, u32) {
    let len_f = len as f64;
    let start = ((len_f * step).round() as u32).min(len.saturating_sub(1));
    let end = ((len_f * (1.0 - step)).round() as u32).min(len);
    (start, end.saturating_sub(start).max(1))
}

/// Append-only stack of zoom stages.
///
/// Stage 0 is the base image; stage k is stage k-1 cropped and rescaled.
/// Stages are never recomputed or removed, so zooming back out replays
/// exactly what was shown on the way in.
#[derive(Debug, Clone)]
pub struct StageStack {
    stages: Vec<RgbImage>,
    width: u32,
    height: u32,
}

impl StageStack {
    /// Start a stack from `base`, scaled to `width x height`.
    pub fn new(base: RgbImage, width: u32, height: u32) -> Self {
        Self {
            stages: vec![fit(base, width, height)],
            width,
            height,
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; the base stage cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RgbImage> {
        self.stages.get(index)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Return stage `index`, computing any missing stages up to it with `step`.
    pub fn ensure(&mut self, index: usize, step: f64) -> &RgbImage {
        while self.stages.len() <= index {
            let last = &self.stages[self.stages.len() - 1];
            let next = crop_stage(last, step, self.width, self.height);
            tracing::debug!(stage = self.stages.len(), step, "Stage computed");
            self.stages.push(next);
        }
        &self.stages[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Image whose red channel is the column and green channel the row.
    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    #[test]
    fn test_crop_span() {
        assert_eq!(crop_span(100, 0.2), (20, 60));
        assert_eq!(crop_span(720, 0.2), (144, 432));
        assert_eq!(crop_span(3, 0.45), (1, 1));
    }

    #[test]
    fn test_crop_stage_keeps_center() {
        let stage = crop_stage(&gradient(100, 100), 0.25, 50, 50);
        assert_eq!(stage.dimensions(), (50, 50));
        assert_eq!(stage.get_pixel(0, 0)[0], 25);
        assert_eq!(stage.get_pixel(0, 0)[1], 25);
    }

    #[test]
    fn test_crop_stage_rescales_to_display() {
        let stage = crop_stage(&gradient(40, 20), 0.2, 40, 20);
        assert_eq!(stage.dimensions(), (40, 20));
    }

    #[test]
    fn test_tiny_crop_keeps_one_pixel() {
        let stage = crop_stage(&gradient(2, 2), 0.49, 4, 4);
        assert_eq!(stage.dimensions(), (4, 4));
    }

    #[test]
    fn test_stack_only_grows() {
        let mut stack = StageStack::new(gradient(64, 32), 32, 16);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.dimensions(), (32, 16));

        stack.ensure(2, 0.2);
        assert_eq!(stack.len(), 3);

        let second = stack.get(2).unwrap().clone();
        stack.ensure(1, 0.4);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.get(2).unwrap(), &second);
    }
}
