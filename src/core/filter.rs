//! Outlier filtering of full sample windows.
//!
//! Values outside the cutoffs are dropped before trend analysis. Both bounds
//! are inclusive. A window where either axis keeps fewer than
//! `min_survivors` values is reported as empty and skipped by the caller.

use crate::config::FilterMode;
use crate::core::windowing::SampleWindow;
use serde::{Deserialize, Serialize};

/// Inclusive value range a sample must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cutoffs {
    pub lower: i32,
    pub upper: i32,
}

impl Cutoffs {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// The values of a window that survived filtering.
///
/// With independent filtering the axes can end up with different lengths.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilteredWindow {
    pub x: Vec<i32>,
    pub y: Vec<i32>,
}

/// Strategy for removing outliers from a window.
pub trait OutlierFilter: Send {
    /// Filter a full window; `None` means the window should be skipped.
    fn filter(&self, window: &SampleWindow) -> Option<FilteredWindow>;
}

/// Filters each axis on its own, so survivors of one axis need not pair
/// with survivors of the other.
#[derive(Debug, Clone, Copy)]
pub struct IndependentAxisFilter {
    pub cutoffs: Cutoffs,
    pub min_survivors: usize,
}

impl OutlierFilter for IndependentAxisFilter {
    fn filter(&self, window: &SampleWindow) -> Option<FilteredWindow> {
        let keep = |values: &[i32]| -> Vec<i32> {
            values
                .iter()
                .copied()
                .filter(|&v| self.cutoffs.contains(v))
                .collect()
        };

        let filtered = FilteredWindow {
            x: keep(&window.x),
            y: keep(&window.y),
        };
        enough(filtered, self.min_survivors)
    }
}

/// Drops a sample pair when either coordinate is out of range; the axes stay
/// aligned.
#[derive(Debug, Clone, Copy)]
pub struct JointPairFilter {
    pub cutoffs: Cutoffs,
    pub min_survivors: usize,
}

impl OutlierFilter for JointPairFilter {
    fn filter(&self, window: &SampleWindow) -> Option<FilteredWindow> {
        let (x, y): (Vec<i32>, Vec<i32>) = window
            .x
            .iter()
            .zip(&window.y)
            .filter(|&(&x, &y)| self.cutoffs.contains(x) && self.cutoffs.contains(y))
            .map(|(&x, &y)| (x, y))
            .unzip();

        enough(FilteredWindow { x, y }, self.min_survivors)
    }
}

fn enough(filtered: FilteredWindow, min_survivors: usize) -> Option<FilteredWindow> {
    let min_survivors = min_survivors.max(1);
    if filtered.x.len() < min_survivors || filtered.y.len() < min_survivors {
        return None;
    }
    Some(filtered)
}

/// Build the filter selected by configuration.
pub fn outlier_filter(
    mode: FilterMode,
    cutoffs: Cutoffs,
    min_survivors: usize,
) -> Box<dyn OutlierFilter> {
    match mode {
        FilterMode::Independent => Box::new(IndependentAxisFilter {
            cutoffs,
            min_survivors,
        }),
        FilterMode::Joint => Box::new(JointPairFilter {
            cutoffs,
            min_survivors,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn independent(lower: i32, upper: i32) -> IndependentAxisFilter {
        IndependentAxisFilter {
            cutoffs: Cutoffs::new(lower, upper),
            min_survivors: 1,
        }
    }

    #[test]
    fn test_in_range_window_is_unchanged() {
        let x: Vec<i32> = (10..30).collect();
        let y: Vec<i32> = (10..30).rev().collect();
        let window = SampleWindow::from_axes(0, x.clone(), y.clone());

        let filtered = independent(5, 95).filter(&window).unwrap();
        assert_eq!(filtered.x, x);
        assert_eq!(filtered.y, y);
        assert_eq!(filtered.x.len(), 20);
    }

    #[test]
    fn test_out_of_range_window_is_empty() {
        let window = SampleWindow::from_axes(0, vec![0, 1, 200, 96], vec![0, 4, 99, 100]);
        assert!(independent(5, 95).filter(&window).is_none());
    }

    #[test]
    fn test_cutoffs_are_inclusive() {
        let window = SampleWindow::from_axes(0, vec![4, 5, 95, 96], vec![5, 5, 95, 95]);
        let filtered = independent(5, 95).filter(&window).unwrap();
        assert_eq!(filtered.x, vec![5, 95]);
        assert_eq!(filtered.y, vec![5, 5, 95, 95]);
    }

    #[test]
    fn test_one_empty_axis_empties_the_window() {
        let window = SampleWindow::from_axes(0, vec![10, 20], vec![0, 0]);
        assert!(independent(5, 95).filter(&window).is_none());
    }

    #[test]
    fn test_independent_axes_may_differ_in_length() {
        let window = SampleWindow::from_axes(0, vec![0, 10, 20, 30], vec![40, 0, 0, 50]);
        let filtered = independent(5, 95).filter(&window).unwrap();
        assert_eq!(filtered.x, vec![10, 20, 30]);
        assert_eq!(filtered.y, vec![40, 50]);
    }

    #[test]
    fn test_joint_filter_keeps_pairs_aligned() {
        let window = SampleWindow::from_axes(0, vec![0, 10, 20, 30], vec![40, 0, 60, 50]);
        let filter = JointPairFilter {
            cutoffs: Cutoffs::new(5, 95),
            min_survivors: 1,
        };
        let filtered = filter.filter(&window).unwrap();
        assert_eq!(filtered.x, vec![20, 30]);
        assert_eq!(filtered.y, vec![60, 50]);
    }

    #[test]
    fn test_min_survivors() {
        let window = SampleWindow::from_axes(0, vec![10, 20, 0], vec![10, 20, 30]);
        let filter = outlier_filter(FilterMode::Independent, Cutoffs::new(5, 95), 3);
        assert!(filter.filter(&window).is_none());

        let filter = outlier_filter(FilterMode::Independent, Cutoffs::new(5, 95), 2);
        assert!(filter.filter(&window).is_some());
    }
}
