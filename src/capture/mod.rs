//! Frame capture for the gesture detector.
//!
//! Camera hardware is not driven here. Frames come from a `FrameSource`
//! (a directory of images or a synthetic moving blob) and are handed to the
//! detector by a `FrameCollector` running the source on its own thread.

pub mod collector;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use collector::FrameCollector;
pub use source::{
    preprocess, FrameSource, ImageSequenceSource, SourceError, SyntheticPath, SyntheticSource,
};
pub use types::{Frame, Sample};
