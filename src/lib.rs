//! gesture-zoom - hand gestures from camera motion, driving a staged zoom display.
//!
//! The detector tracks the centroid of changing pixels between consecutive
//! frames, groups the centroids into fixed windows, drops outliers and reads
//! a horizontal or vertical trend out of each window. Detected gestures go
//! into a lossy mailbox. The display polls that mailbox and zooms in or out
//! of a fixed image, animating every intermediate stage.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── detector ─────────────────────────────┐
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐              │
//! │  │   Capture   │──▶│   Motion    │──▶│  Windowing  │              │
//! │  │ (collector) │   │  (centroid) │   │ (N samples) │              │
//! │  └─────────────┘   └─────────────┘   └──────┬──────┘              │
//! │                                             ▼                     │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐              │
//! │  │   Emitter   │◀──│ Classifier  │◀──│   Filter    │              │
//! │  └──────┬──────┘   └─────────────┘   └─────────────┘              │
//! └─────────┼─────────────────────────────────────────────────────────┘
//!           ▼
//!    ┌─────────────┐
//!    │   Mailbox   │  last writer wins
//!    └──────┬──────┘
//!           ▼
//! ┌─────────┼────────────────── display ──────────────────────────────┐
//! │  ┌──────┴──────┐   ┌─────────────┐   ┌─────────────┐              │
//! │  │ DisplayLoop │──▶│ ZoomEngine  │──▶│   Display   │              │
//! │  │   (poll)    │   │ (stage stack)│  │  (render)   │              │
//! │  └─────────────┘   └─────────────┘   └─────────────┘              │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gesture_zoom::{capture, config::Config, core, mailbox, record};
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let source = capture::SyntheticSource::script("zoom-in", 100, 20).unwrap();
//! let collector = capture::FrameCollector::spawn(source, 4);
//!
//! let channel = Arc::new(mailbox::MemoryMailbox::new());
//! let settings = core::DetectorSettings::from_config(&config);
//! let mut detector = core::Detector::new(settings, channel, record::create_shared_stats());
//! detector.run(collector.frames(), &AtomicBool::new(true));
//! ```

pub mod capture;
pub mod config;
pub mod core;
pub mod mailbox;
pub mod record;
pub mod zoom;

// Re-export key types at crate root for convenience
pub use capture::{Frame, FrameCollector, FrameSource, Sample};
pub use config::{Config, ConfigError};
pub use core::{Detector, DetectorSettings, Gesture, GestureEvent};
pub use mailbox::{ChannelError, DirectoryMailbox, GestureChannel, MemoryMailbox};
pub use record::{RunRecord, RunStats, SharedRunStats};
pub use zoom::{Display, DisplayLoop, ZoomEngine};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
