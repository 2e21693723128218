//! Frame sources feeding the motion sampler.
//!
//! A source yields preprocessed frames: 8-bit grayscale, square at the
//! configured resolution, Gaussian blurred. `Ok(None)` means the source is
//! exhausted and the run should end.

use crate::capture::types::Frame;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// File extensions accepted by `ImageSequenceSource`.
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "pgm", "tif", "tiff"];

/// Anything that can hand the detector one frame at a time.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).next_frame()
    }
}

/// Errors raised while acquiring frames.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not decode frame {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("No frames found in {0:?}")]
    Empty(PathBuf),
}

/// Convert a captured image into a detector frame.
///
/// The image is reduced to luma, resized to `resolution x resolution` and
/// blurred with the sigma that a `blur_region`-sized Gaussian kernel implies.
/// A `blur_region` of 0 or 1 leaves the frame sharp.
pub fn preprocess(image: &DynamicImage, resolution: u32, blur_region: u32) -> Frame {
    let gray = image.to_luma8();
    let resized = if gray.dimensions() == (resolution, resolution) {
        gray
    } else {
        imageops::resize(&gray, resolution, resolution, FilterType::Triangle)
    };

    if blur_region <= 1 {
        return resized;
    }
    imageops::blur(&resized, kernel_sigma(blur_region))
}

fn kernel_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Replays a directory of still images as a camera feed, in file-name order.
pub struct ImageSequenceSource {
    pending: VecDeque<PathBuf>,
    resolution: u32,
    blur_region: u32,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path, resolution: u32, blur_region: u32) -> Result<Self, SourceError> {
        let entries = std::fs::read_dir(dir).map_err(|source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_frame_file(p))
            .collect();

        if frames.is_empty() {
            return Err(SourceError::Empty(dir.to_path_buf()));
        }
        frames.sort();

        Ok(Self {
            pending: frames.into(),
            resolution,
            blur_region,
        })
    }

    /// Number of frames not yet read.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };

        let image = image::open(&path).map_err(|source| SourceError::Decode {
            path: path.clone(),
            source,
        })?;
        Ok(Some(preprocess(&image, self.resolution, self.blur_region)))
    }
}

/// One stroke of a synthetic blob, in fractions of the frame size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticPath {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub frames: usize,
}

impl SyntheticPath {
    pub fn stroke(from: (f64, f64), to: (f64, f64), frames: usize) -> Self {
        Self { from, to, frames }
    }

    /// Blob resting at one spot; produces no motion.
    pub fn hold(at: (f64, f64), frames: usize) -> Self {
        Self {
            from: at,
            to: at,
            frames,
        }
    }

    fn position(&self, index: usize) -> (f64, f64) {
        if self.frames <= 1 {
            return self.from;
        }
        let t = index as f64 / (self.frames - 1) as f64;
        (
            self.from.0 + (self.to.0 - self.from.0) * t,
            self.from.1 + (self.to.1 - self.from.1) * t,
        )
    }
}

/// Renders a bright square moving over a black background.
///
/// Stands in for a hand in front of the camera when no frames are available.
pub struct SyntheticSource {
    resolution: u32,
    blob_size: u32,
    strokes: Vec<SyntheticPath>,
    stroke: usize,
    frame: usize,
}

impl SyntheticSource {
    pub fn new(resolution: u32, strokes: Vec<SyntheticPath>) -> Self {
        Self {
            resolution,
            blob_size: (resolution / 5).max(2),
            strokes,
            stroke: 0,
            frame: 0,
        }
    }

    /// Named gesture scripts: `swipe`, `zoom-in`, `zoom-out` and `zoom`.
    ///
    /// Every stroke spans `stroke_frames` frames and is separated by a hold of
    /// the same length, so with `stroke_frames` equal to the window size each
    /// gesture lands in its own window or two.
    pub fn script(name: &str, resolution: u32, stroke_frames: usize) -> Option<Self> {
        let n = stroke_frames.max(2);
        let left = (0.15, 0.5);
        let right = (0.85, 0.5);
        let top = (0.5, 0.15);
        let bottom = (0.5, 0.85);

        let up = |strokes: &mut Vec<SyntheticPath>| {
            strokes.push(SyntheticPath::hold(bottom, n));
            strokes.push(SyntheticPath::stroke(bottom, top, n));
        };
        let down = |strokes: &mut Vec<SyntheticPath>| {
            strokes.push(SyntheticPath::hold(top, n));
            strokes.push(SyntheticPath::stroke(top, bottom, n));
        };

        let mut strokes = Vec::new();
        match name {
            "swipe" => {
                strokes.push(SyntheticPath::hold(left, n));
                strokes.push(SyntheticPath::stroke(left, right, n));
                strokes.push(SyntheticPath::hold(right, n));
                strokes.push(SyntheticPath::stroke(right, left, n));
            }
            "zoom-in" => up(&mut strokes),
            "zoom-out" => down(&mut strokes),
            "zoom" => {
                up(&mut strokes);
                up(&mut strokes);
                down(&mut strokes);
                down(&mut strokes);
                down(&mut strokes);
            }
            _ => return None,
        }
        strokes.push(SyntheticPath::hold(top, n));

        Some(Self::new(resolution, strokes))
    }

    /// Total number of frames this source will produce.
    pub fn len(&self) -> usize {
        self.strokes.iter().map(|s| s.frames).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn render(&self, center: (f64, f64)) -> Frame {
        let mut frame = GrayImage::new(self.resolution, self.resolution);
        let half = self.blob_size as f64 / 2.0;
        let res = self.resolution as f64;

        let x0 = (center.0 * res - half).round().clamp(0.0, res) as u32;
        let y0 = (center.1 * res - half).round().clamp(0.0, res) as u32;
        let x1 = (x0 + self.blob_size).min(self.resolution);
        let y1 = (y0 + self.blob_size).min(self.resolution);

        for y in y0..y1 {
            for x in x0..x1 {
                frame.put_pixel(x, y, Luma([255]));
            }
        }
        frame
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        while let Some(stroke) = self.strokes.get(self.stroke) {
            if self.frame < stroke.frames {
                let center = stroke.position(self.frame);
                self.frame += 1;
                return Ok(Some(self.render(center)));
            }
            self.stroke += 1;
            self.frame = 0;
        }
        Ok(None)
    }
}
