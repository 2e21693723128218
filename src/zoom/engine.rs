//! The zoom stage state machine.
//!
//! The engine sits at one stage of the `StageStack`. A zoom-in gesture walks
//! `number_of_stages` stages deeper, computing any stage not yet cached; a
//! zoom-out gesture walks back the same distance, replaying cached stages,
//! and stops at stage 0. Every stage passed on the way is rendered.

use crate::config::ZoomConfig;
use crate::core::gesture::{Gesture, GestureEvent, ZoomDirection};
use crate::zoom::display::{Display, DisplayError};
use crate::zoom::stage::StageStack;
use crate::zoom::transform::{AnchoredTransform, ViewTransform};
use image::RgbImage;

/// Delay after every rendered stage, in milliseconds.
const RENDER_DELAY_MS: u64 = 1;

/// Per-step crop fraction for a zoom factor spread over `stages` steps.
pub fn step_factor(zoom_factor: f64, stages: usize) -> f64 {
    zoom_factor / stages.max(1) as f64
}

fn is_valid_step(step: f64) -> bool {
    step.is_finite() && step > 0.0 && step < 0.5
}

/// What a gesture did to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOutcome {
    /// Moved from one stage to another, rendering every stage after `from`
    Moved { from: usize, to: usize },
    /// Nothing to do: no zoom meaning, or already fully zoomed out
    Unchanged,
    /// The event's zoom factor gives an unusable crop step
    Rejected,
}

impl ZoomOutcome {
    /// Number of stages rendered.
    pub fn rendered(&self) -> usize {
        match self {
            ZoomOutcome::Moved { from, to } => from.abs_diff(*to),
            ZoomOutcome::Unchanged | ZoomOutcome::Rejected => 0,
        }
    }
}

pub struct ZoomEngine {
    stack: StageStack,
    stage: usize,
    number_of_stages: usize,
    transform: Box<dyn ViewTransform>,
}

impl ZoomEngine {
    /// Build an engine over `base` using the display settings in `config`.
    pub fn new(base: RgbImage, config: &ZoomConfig) -> Self {
        let transform = AnchoredTransform::new(config.center_x, config.center_y);
        Self::with_transform(base, config, Box::new(transform))
    }

    pub fn with_transform(
        base: RgbImage,
        config: &ZoomConfig,
        transform: Box<dyn ViewTransform>,
    ) -> Self {
        Self {
            stack: StageStack::new(base, config.screen_width, config.screen_height),
            stage: 0,
            number_of_stages: config.number_of_stages.max(1),
            transform,
        }
    }

    /// Index of the stage on screen.
    pub fn stage(&self) -> usize {
        self.stage
    }

    /// Number of cached stages.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn stages(&self) -> &StageStack {
        &self.stack
    }

    pub fn number_of_stages(&self) -> usize {
        self.number_of_stages
    }

    /// Present the current stage without changing state or waiting.
    pub fn show_current<D: Display + ?Sized>(&self, display: &mut D) -> Result<(), DisplayError> {
        self.present(self.stage, display)
    }

    /// Apply a gesture event.
    pub fn apply<D: Display + ?Sized>(
        &mut self,
        event: &GestureEvent,
        display: &mut D,
    ) -> Result<ZoomOutcome, DisplayError> {
        self.apply_gesture(event.gesture, event.zoom_factor, display)
    }

    pub fn apply_gesture<D: Display + ?Sized>(
        &mut self,
        gesture: Gesture,
        zoom_factor: f64,
        display: &mut D,
    ) -> Result<ZoomOutcome, DisplayError> {
        let Some(direction) = gesture.zoom_direction() else {
            tracing::debug!("Gesture {gesture} has no zoom action");
            return Ok(ZoomOutcome::Unchanged);
        };

        let step = step_factor(zoom_factor, self.number_of_stages);
        if !is_valid_step(step) {
            tracing::warn!(zoom_factor, step, "Gesture {gesture} rejected: unusable zoom factor");
            return Ok(ZoomOutcome::Rejected);
        }

        match direction {
            ZoomDirection::In => self.zoom_in(step, display),
            ZoomDirection::Out => self.zoom_out(display),
        }
    }

    /// Walk `number_of_stages` stages deeper, cropping by `step` per stage
    /// where a stage is not cached yet.
    pub fn zoom_in<D: Display + ?Sized>(
        &mut self,
        step: f64,
        display: &mut D,
    ) -> Result<ZoomOutcome, DisplayError> {
        let from = self.stage;
        let to = from + self.number_of_stages;

        for target in from + 1..=to {
            self.stack.ensure(target, step);
            self.render(target, display)?;
            self.stage = target;
        }

        tracing::info!(from, to, "Zoomed in");
        Ok(ZoomOutcome::Moved { from, to })
    }

    /// Walk back up to `number_of_stages` stages, never past stage 0.
    pub fn zoom_out<D: Display + ?Sized>(
        &mut self,
        display: &mut D,
    ) -> Result<ZoomOutcome, DisplayError> {
        let from = self.stage;
        if from == 0 {
            tracing::debug!("Already fully zoomed out");
            return Ok(ZoomOutcome::Unchanged);
        }
        let to = from.saturating_sub(self.number_of_stages);

        for target in (to..from).rev() {
            self.render(target, display)?;
            self.stage = target;
        }

        tracing::info!(from, to, "Zoomed out");
        Ok(ZoomOutcome::Moved { from, to })
    }

    fn present<D: Display + ?Sized>(&self, index: usize, display: &mut D) -> Result<(), DisplayError> {
        let Some(stage) = self.stack.get(index) else {
            return Ok(());
        };
        let (width, height) = self.stack.dimensions();
        display.show(&self.transform.transform(stage, width, height))
    }

    /// Present one animation stage and hold it for the render delay.
    fn render<D: Display + ?Sized>(&self, index: usize, display: &mut D) -> Result<(), DisplayError> {
        self.present(index, display)?;
        display.wait_key(RENDER_DELAY_MS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom::display::MemoryDisplay;
    use image::Rgb;

    fn config() -> ZoomConfig {
        ZoomConfig {
            scale_factor: 0.4,
            number_of_stages: 2,
            center_x: 0.3,
            center_y: 0.8,
            screen_width: 40,
            screen_height: 20,
        }
    }

    fn engine() -> ZoomEngine {
        let base = RgbImage::from_fn(80, 40, |x, y| Rgb([x as u8, y as u8, 128]));
        ZoomEngine::new(base, &config())
    }

    #[test]
    fn test_zoom_in_caches_and_renders_each_stage() {
        let mut engine = engine();
        let mut display = MemoryDisplay::new();

        let outcome = engine.apply_gesture(Gesture::Up, 0.4, &mut display).unwrap();

        assert_eq!(outcome, ZoomOutcome::Moved { from: 0, to: 2 });
        assert_eq!(engine.stage(), 2);
        assert_eq!(engine.stack_len(), 3);
        assert_eq!(display.frames.len(), 2);
        assert_eq!(&display.frames[1], engine.stages().get(2).unwrap());
        assert_eq!(display.waits(), 2);
    }

    #[test]
    fn test_zoom_out_replays_cached_stages() {
        let mut engine = engine();
        let mut display = MemoryDisplay::new();
        engine.apply_gesture(Gesture::PinchOut, 0.4, &mut display).unwrap();
        let zoomed_in = display.frames.clone();

        let outcome = engine.apply_gesture(Gesture::Down, 0.4, &mut display).unwrap();

        assert_eq!(outcome, ZoomOutcome::Moved { from: 2, to: 0 });
        assert_eq!(engine.stage(), 0);
        assert_eq!(engine.stack_len(), 3);
        assert_eq!(display.frames[2], zoomed_in[0]);
        assert_eq!(&display.frames[3], engine.stages().get(0).unwrap());
    }

    #[test]
    fn test_zoom_out_at_base_is_noop() {
        let mut engine = engine();
        let mut display = MemoryDisplay::new();

        let outcome = engine.apply_gesture(Gesture::PinchIn, 0.4, &mut display).unwrap();

        assert_eq!(outcome, ZoomOutcome::Unchanged);
        assert_eq!(engine.stage(), 0);
        assert!(display.frames.is_empty());
    }

    #[test]
    fn test_zoom_out_clamps_at_base() {
        let mut cfg = config();
        cfg.number_of_stages = 3;
        let mut engine = ZoomEngine::new(RgbImage::new(40, 20), &cfg);
        let mut display = MemoryDisplay::new();

        engine.zoom_in(0.1, &mut display).unwrap();
        engine.zoom_out(&mut display).unwrap();
        engine.zoom_in(0.1, &mut display).unwrap();
        assert_eq!(engine.stage(), 3);

        // Fewer stages left than a full step back.
        engine.stage = 2;
        display.frames.clear();
        let outcome = engine.zoom_out(&mut display).unwrap();
        assert_eq!(outcome, ZoomOutcome::Moved { from: 2, to: 0 });
        assert_eq!(outcome.rendered(), 2);
        assert_eq!(display.frames.len(), 2);
    }

    #[test]
    fn test_second_zoom_in_extends_stack() {
        let mut engine = engine();
        let mut display = MemoryDisplay::new();
        engine.apply_gesture(Gesture::Up, 0.4, &mut display).unwrap();
        engine.apply_gesture(Gesture::Up, 0.4, &mut display).unwrap();
        assert_eq!(engine.stage(), 4);
        assert_eq!(engine.stack_len(), 5);

        engine.apply_gesture(Gesture::Down, 0.4, &mut display).unwrap();
        engine.apply_gesture(Gesture::Up, 0.4, &mut display).unwrap();
        assert_eq!(engine.stage(), 4);
        assert_eq!(engine.stack_len(), 5);
    }

    #[test]
    fn test_horizontal_gestures_do_nothing() {
        let mut engine = engine();
        let mut display = MemoryDisplay::new();
        for gesture in [Gesture::Left, Gesture::Right, Gesture::None] {
            let outcome = engine.apply_gesture(gesture, 0.4, &mut display).unwrap();
            assert_eq!(outcome, ZoomOutcome::Unchanged);
        }
        assert_eq!(engine.stage(), 0);
        assert!(display.frames.is_empty());
    }

    #[test]
    fn test_unusable_factor_is_rejected() {
        let mut engine = engine();
        let mut display = MemoryDisplay::new();
        for factor in [0.0, -0.4, 1.0, f64::NAN, f64::INFINITY] {
            let outcome = engine.apply_gesture(Gesture::Up, factor, &mut display).unwrap();
            assert_eq!(outcome, ZoomOutcome::Rejected);
        }
        assert_eq!(engine.stage(), 0);
        assert_eq!(engine.stack_len(), 1);
    }

    #[test]
    fn test_show_current_does_not_wait() {
        let mut engine = engine();
        let mut display = MemoryDisplay::new();
        engine.apply_gesture(Gesture::Up, 0.4, &mut display).unwrap();
        let waits = display.waits();

        engine.show_current(&mut display).unwrap();

        assert_eq!(display.waits(), waits);
        assert_eq!(display.frames.last(), engine.stages().get(2));
    }

    #[test]
    fn test_apply_event() {
        let mut engine = engine();
        let mut display = MemoryDisplay::new();
        let event = GestureEvent::new(1, Gesture::Up, 0.4);
        assert_eq!(engine.apply(&event, &mut display).unwrap().rendered(), 2);
    }
}
