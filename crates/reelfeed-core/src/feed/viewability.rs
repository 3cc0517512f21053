//! Active-item tracking for natively paged lists.
//!
//! The platform list snaps on its own; we only learn which rows are visible
//! and by how much. The first row at or above the threshold is the active one.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default share of the viewport a row must cover to count as active.
pub const DEFAULT_VIEWABILITY_THRESHOLD_PCT: u8 = 70;

/// Visibility report for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewToken {
    pub index: usize,
    /// 0.0 ..= 100.0
    pub visible_pct: f64,
}

impl ViewToken {
    pub fn new(index: usize, visible_pct: f64) -> Self {
        Self { index, visible_pct }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewabilityTracker {
    item_count: usize,
    threshold_pct: u8,
    current: usize,
}

impl ViewabilityTracker {
    pub fn new(item_count: usize, threshold_pct: u8) -> Result<Self, ValidationError> {
        if item_count == 0 {
            return Err(ValidationError::EmptyCollection("feed items".into()));
        }
        if !(1..=100).contains(&threshold_pct) {
            return Err(ValidationError::InvalidValue {
                field: "viewability_threshold_pct".into(),
                message: format!("must be within 1..=100, got {threshold_pct}"),
            });
        }
        Ok(Self {
            item_count,
            threshold_pct,
            current: 0,
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn threshold_pct(&self) -> u8 {
        self.threshold_pct
    }

    /// Apply a visibility report. Returns the new active index when it moved.
    pub fn on_viewable_items_changed(&mut self, tokens: &[ViewToken]) -> Option<usize> {
        let threshold = f64::from(self.threshold_pct);
        let first = tokens
            .iter()
            .filter(|t| t.index < self.item_count)
            .find(|t| t.visible_pct >= threshold)?;

        if first.index == self.current {
            return None;
        }
        self.current = first.index;
        Some(first.index)
    }
}
