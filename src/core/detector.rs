//! The detector loop: frames in, published gestures out.
//!
//! Single-threaded and synchronous. Every frame yields one motion sample;
//! every full window is filtered, classified and, when a gesture is found,
//! published. All run history lives in the detector's own `RunRecord`.

use crate::capture::types::{Frame, Sample};
use crate::config::{Config, FilterMode};
use crate::core::classifier::{classify_trend, window_trend, Trend, TrendThresholds};
use crate::core::filter::{outlier_filter, Cutoffs, OutlierFilter};
use crate::core::gesture::Gesture;
use crate::core::motion::MotionSampler;
use crate::core::windowing::{SampleWindow, WindowManager};
use crate::mailbox::{GestureChannel, GestureEmitter};
use crate::record::{RunRecord, SharedRunStats};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The parts of `Config` the detector needs.
#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub intensity_threshold: u8,
    pub window_size: usize,
    pub cutoffs: Cutoffs,
    pub min_survivors: usize,
    pub filter_mode: FilterMode,
    pub thresholds: TrendThresholds,
    pub zoom_factor: f64,
    /// Samples taken before the run ends; 0 runs until the frames run out
    pub frame_limit: u64,
}

impl DetectorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            intensity_threshold: config.image.intensity_threshold,
            window_size: config.data.window_size,
            cutoffs: Cutoffs::new(config.data.lower_cutoff, config.data.upper_cutoff),
            min_survivors: config.data.min_survivors,
            filter_mode: config.data.filter_mode,
            thresholds: TrendThresholds {
                x: config.data.x_threshold,
                y: config.y_threshold(),
            },
            zoom_factor: config.zoom.scale_factor,
            frame_limit: config.misc.frame_limit,
        }
    }
}

/// What happened to a completed window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowOutcome {
    /// Too few samples survived outlier filtering
    Skipped,
    /// Classified; `Gesture::None` is a valid steady-state result
    Classified { gesture: Gesture, trend: Trend },
}

impl WindowOutcome {
    pub fn gesture(&self) -> Option<Gesture> {
        match self {
            WindowOutcome::Skipped => None,
            WindowOutcome::Classified { gesture, .. } => Some(*gesture),
        }
    }
}

/// Outcome of one window together with its position in the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowReport {
    pub index: u64,
    pub outcome: WindowOutcome,
}

/// Samples frames, windows the samples and publishes gestures.
pub struct Detector {
    settings: DetectorSettings,
    sampler: MotionSampler,
    windows: WindowManager,
    filter: Box<dyn OutlierFilter>,
    emitter: GestureEmitter,
    record: RunRecord,
    stats: SharedRunStats,
    samples_taken: u64,
}

impl Detector {
    pub fn new(
        settings: DetectorSettings,
        channel: Arc<dyn GestureChannel>,
        stats: SharedRunStats,
    ) -> Self {
        let filter = outlier_filter(settings.filter_mode, settings.cutoffs, settings.min_survivors);
        Self::with_filter(settings, filter, channel, stats)
    }

    /// Build a detector around a custom outlier filtering strategy.
    pub fn with_filter(
        settings: DetectorSettings,
        filter: Box<dyn OutlierFilter>,
        channel: Arc<dyn GestureChannel>,
        stats: SharedRunStats,
    ) -> Self {
        Self {
            sampler: MotionSampler::new(settings.intensity_threshold),
            windows: WindowManager::new(settings.window_size),
            emitter: GestureEmitter::new(channel, settings.zoom_factor),
            filter,
            record: RunRecord::new(),
            stats,
            samples_taken: 0,
            settings,
        }
    }

    /// Feed one frame. The first frame only primes the sampler.
    pub fn process_frame(&mut self, frame: Frame) -> Option<WindowReport> {
        let sample = self.sampler.sample(frame)?;
        self.process_sample(sample)
    }

    /// Feed one motion sample; returns a report when it completes a window.
    pub fn process_sample(&mut self, sample: Sample) -> Option<WindowReport> {
        self.samples_taken += 1;
        self.stats.record_sample();
        self.record.push_raw(sample);
        if sample.is_degenerate() {
            tracing::debug!(sample = self.samples_taken, "No motion between frames");
        }

        let window = self.windows.push(sample)?;
        Some(self.analyze_window(&window))
    }

    /// Filter, classify and publish one full window.
    pub fn analyze_window(&mut self, window: &SampleWindow) -> WindowReport {
        let Some(filtered) = self.filter.filter(window) else {
            tracing::debug!(window = window.index, "Window skipped: too few samples within cutoffs");
            self.stats.record_window_skipped();
            return WindowReport {
                index: window.index,
                outcome: WindowOutcome::Skipped,
            };
        };

        self.record.push_filtered(&filtered);
        self.stats.record_window_analyzed();

        let trend = window_trend(&filtered);
        let gesture = classify_trend(trend, self.settings.thresholds);

        if !gesture.is_none() {
            match self.emitter.emit(gesture) {
                Ok(_) => {
                    tracing::info!(
                        window = window.index,
                        trend_x = trend.x,
                        trend_y = trend.y,
                        "Gesture detected: {gesture}"
                    );
                    self.stats.record_gesture_emitted();
                }
                Err(e) => {
                    tracing::warn!("Gesture {gesture} dropped: {e}");
                    self.stats.record_publish_failure();
                }
            }
        } else {
            tracing::debug!(
                window = window.index,
                trend_x = trend.x,
                trend_y = trend.y,
                "No gesture"
            );
        }

        WindowReport {
            index: window.index,
            outcome: WindowOutcome::Classified { gesture, trend },
        }
    }

    /// Consume frames until the frame limit, the end of the frames, or
    /// `running` is cleared. Returns the reports of all completed windows.
    pub fn run<I>(&mut self, frames: I, running: &AtomicBool) -> Vec<WindowReport>
    where
        I: IntoIterator<Item = Frame>,
    {
        let mut reports = Vec::new();
        for frame in frames {
            if !running.load(Ordering::SeqCst) || self.limit_reached() {
                break;
            }
            if let Some(report) = self.process_frame(frame) {
                reports.push(report);
            }
        }
        reports
    }

    /// Whether the configured number of samples has been taken.
    pub fn limit_reached(&self) -> bool {
        self.settings.frame_limit > 0 && self.samples_taken >= self.settings.frame_limit
    }

    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }

    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    /// End the run and hand over its record.
    pub fn finish(mut self) -> RunRecord {
        self.record.finish(self.stats.snapshot());
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::FilteredWindow;
    use crate::mailbox::MemoryMailbox;
    use crate::record::create_shared_stats;
    use image::{GrayImage, Luma};

    fn settings(window_size: usize) -> DetectorSettings {
        DetectorSettings {
            intensity_threshold: 25,
            window_size,
            cutoffs: Cutoffs::new(5, 95),
            min_survivors: 1,
            filter_mode: FilterMode::Independent,
            thresholds: TrendThresholds { x: 10.0, y: 25.0 },
            zoom_factor: 0.4,
            frame_limit: 0,
        }
    }

    fn detector(window_size: usize) -> (Detector, MemoryMailbox) {
        let mailbox = MemoryMailbox::new();
        let detector = Detector::new(
            settings(window_size),
            Arc::new(mailbox.clone()),
            create_shared_stats(),
        );
        (detector, mailbox)
    }

    #[test]
    fn test_ramp_window_publishes_swipe() {
        let (mut detector, mailbox) = detector(4);
        let samples = [(10, 50), (30, 50), (50, 50), (70, 50)];

        let reports: Vec<WindowReport> = samples
            .iter()
            .filter_map(|&(x, y)| detector.process_sample(Sample::new(x, y)))
            .collect();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome.gesture(), Some(Gesture::Right));

        let event = mailbox.poll_latest_and_clear().unwrap().unwrap();
        assert_eq!(event.gesture, Gesture::Right);
        assert_eq!(event.zoom_factor, 0.4);
    }

    #[test]
    fn test_degenerate_window_is_skipped() {
        let (mut detector, mailbox) = detector(3);
        let mut last = None;
        for _ in 0..3 {
            last = detector.process_sample(Sample::default());
        }

        assert_eq!(last.unwrap().outcome, WindowOutcome::Skipped);
        assert!(!mailbox.has_pending());
        assert!(detector.record().filtered_x.is_empty());
        assert_eq!(detector.record().raw_x.len(), 3);
    }

    #[test]
    fn test_still_window_publishes_nothing() {
        let (mut detector, mailbox) = detector(3);
        let mut last = None;
        for _ in 0..3 {
            last = detector.process_sample(Sample::new(50, 50));
        }

        assert_eq!(last.unwrap().outcome.gesture(), Some(Gesture::None));
        assert!(!mailbox.has_pending());
    }

    #[test]
    fn test_custom_filter_strategy() {
        struct KeepEverything;
        impl OutlierFilter for KeepEverything {
            fn filter(&self, window: &SampleWindow) -> Option<FilteredWindow> {
                Some(FilteredWindow {
                    x: window.x.clone(),
                    y: window.y.clone(),
                })
            }
        }

        let mailbox = MemoryMailbox::new();
        let mut detector = Detector::with_filter(
            settings(2),
            Box::new(KeepEverything),
            Arc::new(mailbox),
            create_shared_stats(),
        );
        detector.process_sample(Sample::new(0, 0));
        let report = detector.process_sample(Sample::new(0, 0)).unwrap();
        assert_eq!(report.outcome.gesture(), Some(Gesture::None));
    }

    #[test]
    fn test_run_honours_frame_limit() {
        let mailbox = MemoryMailbox::new();
        let mut limited = settings(2);
        limited.frame_limit = 5;
        let mut detector = Detector::new(limited, Arc::new(mailbox), create_shared_stats());

        let frames = (0..20u8).map(|i| GrayImage::from_pixel(8, 8, Luma([i * 10])));
        let running = AtomicBool::new(true);
        let reports = detector.run(frames, &running);

        assert_eq!(detector.samples_taken(), 5);
        assert_eq!(reports.len(), 2);
        assert!(detector.limit_reached());
    }

    #[test]
    fn test_run_stops_when_cleared() {
        let (mut detector, _mailbox) = detector(2);
        let running = AtomicBool::new(false);
        let frames = (0..10).map(|_| GrayImage::new(4, 4));
        detector.run(frames, &running);
        assert_eq!(detector.samples_taken(), 0);
    }

    #[test]
    fn test_finish_stamps_record() {
        let (mut detector, _mailbox) = detector(2);
        detector.process_sample(Sample::new(20, 20));
        let record = detector.finish();
        assert!(record.finished_at.is_some());
        assert_eq!(record.stats.unwrap().samples, 1);
    }
}
