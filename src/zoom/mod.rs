//! Staged zoom display.
//!
//! The display side of the pipeline: it polls the gesture channel and walks a
//! stack of progressively cropped views of one fixed image, showing every
//! intermediate stage on the way.

pub mod display;
pub mod display_loop;
pub mod engine;
pub mod stage;
pub mod transform;

// Re-export commonly used types
pub use display::{DirectoryDisplay, Display, DisplayError, MemoryDisplay, ESC_KEY};
pub use display_loop::DisplayLoop;
pub use engine::{step_factor, ZoomEngine, ZoomOutcome};
pub use stage::{crop_stage, load_base_image, StageStack};
pub use transform::{AnchoredTransform, ViewTransform};
