//! Trend analysis and gesture classification of filtered windows.
//!
//! The trend strength of an axis is the net displacement of its least-squares
//! line over the window: slope (per sample) times `len - 1`.

use crate::core::filter::FilteredWindow;
use crate::core::gesture::Gesture;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Thresholds a trend must exceed to count as a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    pub x: f64,
    pub y: f64,
}

/// Per-axis trend strengths of one window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Trend {
    pub x: f64,
    pub y: f64,
}

/// Fitted net displacement of `values` over their positions.
///
/// Fewer than two values carry no trend.
pub fn trend_strength(values: &[i32]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let positions: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let samples: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    let mean_t = positions.iter().mean();
    let mean_v = samples.iter().mean();

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (t, v) in positions.iter().zip(&samples) {
        covariance += (t - mean_t) * (v - mean_v);
        variance += (t - mean_t).powi(2);
    }

    let slope = covariance / variance;
    slope * (n - 1) as f64
}

/// Trend strengths of both axes.
pub fn window_trend(window: &FilteredWindow) -> Trend {
    Trend {
        x: trend_strength(&window.x),
        y: trend_strength(&window.y),
    }
}

/// Classify a trend.
///
/// The dominant axis wins, and only if it clears its own threshold. Rows grow
/// downward in image coordinates, so a negative vertical trend is `Up`.
pub fn classify_trend(trend: Trend, thresholds: TrendThresholds) -> Gesture {
    let (ax, ay) = (trend.x.abs(), trend.y.abs());

    if ax > thresholds.x && ax > ay {
        if trend.x > 0.0 {
            Gesture::Right
        } else {
            Gesture::Left
        }
    } else if ay > thresholds.y && ay > ax {
        if trend.y < 0.0 {
            Gesture::Up
        } else {
            Gesture::Down
        }
    } else {
        Gesture::None
    }
}

/// Classify a filtered window; exactly one result per window.
pub fn classify(window: &FilteredWindow, thresholds: TrendThresholds) -> Gesture {
    classify_trend(window_trend(window), thresholds)
}
