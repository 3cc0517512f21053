//! Threshold single-step snap engine.
//!
//! The list scrolls freely; when a drag or a momentum scroll ends the engine
//! picks the page to settle on and asks the viewport to animate there.
//!
//! ## Rules
//!
//! ```text
//! index    = floor(offset / page_height)
//! fraction = (offset mod page_height) / page_height
//! natural  = fraction > threshold ? index + 1 : index
//! target   = clamp(clamp(natural, current - 1, current + 1), 0, len - 1)
//! ```
//!
//! A gesture never moves more than one page. The animation the engine itself
//! requests produces one more momentum-end; `awaiting_own_animation` swallows
//! it so it is not read as a second user gesture.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default fraction of a page the user must scroll past to advance.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.3;

/// Which scroll callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollPhase {
    /// The finger left the screen.
    Drag,
    /// A momentum (or programmatic) scroll settled.
    Momentum,
}

/// Instruction for the viewport to move to a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollCommand {
    pub page: usize,
    pub offset: f64,
    pub animated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapPaginator {
    item_count: usize,
    page_height: f64,
    threshold: f64,
    current: usize,
    /// Set when we issue an animated scroll, cleared by the settle it causes.
    awaiting_own_animation: bool,
}

impl SnapPaginator {
    pub fn new(item_count: usize, page_height: f64, threshold: f64) -> Result<Self, ValidationError> {
        if item_count == 0 {
            return Err(ValidationError::EmptyCollection("feed items".into()));
        }
        check_page_height(page_height)?;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ValidationError::InvalidValue {
                field: "snap_threshold".into(),
                message: format!("must be between 0 and 1 exclusive, got {threshold}"),
            });
        }
        Ok(Self {
            item_count,
            page_height,
            threshold,
            current: 0,
            awaiting_own_animation: false,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_awaiting_own_animation(&self) -> bool {
        self.awaiting_own_animation
    }

    /// Page the engine would settle on for `offset`, given the current page.
    pub fn target_for(&self, offset: f64) -> usize {
        let natural = natural_target(offset, self.page_height, self.threshold);
        let current = self.current as i64;
        let one_step = natural.clamp(current - 1, current + 1);
        one_step.clamp(0, self.item_count as i64 - 1) as usize
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Handle the end of a scroll. Returns the animation to run, if any.
    pub fn on_scroll_end(&mut self, phase: ScrollPhase, offset: f64) -> Option<ScrollCommand> {
        if self.awaiting_own_animation {
            if phase == ScrollPhase::Momentum {
                self.awaiting_own_animation = false;
            }
            tracing::debug!(?phase, offset, "ignoring scroll end from own animation");
            return None;
        }
        if !offset.is_finite() {
            tracing::warn!(offset, "ignoring non-finite scroll offset");
            return None;
        }

        self.current = self.target_for(offset);
        self.awaiting_own_animation = true;
        Some(ScrollCommand {
            page: self.current,
            offset: self.current as f64 * self.page_height,
            animated: true,
        })
    }

    /// The viewport changed size. Re-align to the current page without
    /// animating, so no settle event follows.
    pub fn resize(&mut self, page_height: f64) -> Result<ScrollCommand, ValidationError> {
        check_page_height(page_height)?;
        self.page_height = page_height;
        Ok(ScrollCommand {
            page: self.current,
            offset: self.current as f64 * page_height,
            animated: false,
        })
    }
}

fn check_page_height(page_height: f64) -> Result<(), ValidationError> {
    if page_height.is_finite() && page_height > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "page_height".into(),
            message: format!("must be a positive number, got {page_height}"),
        })
    }
}

/// Unclamped page a scroll offset points at.
///
/// `fraction` keeps the sign of `offset`, so an overscroll above the first
/// page never rounds up.
fn natural_target(offset: f64, page_height: f64, threshold: f64) -> i64 {
    let index = (offset / page_height).floor() as i64;
    let fraction = (offset % page_height) / page_height;
    if fraction > threshold {
        index.saturating_add(1)
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pager(count: usize) -> SnapPaginator {
        SnapPaginator::new(count, 100.0, DEFAULT_SNAP_THRESHOLD).unwrap()
    }

    /// Scroll, then deliver the settle of the engine's own animation.
    fn gesture(p: &mut SnapPaginator, offset: f64) -> Option<ScrollCommand> {
        let cmd = p.on_scroll_end(ScrollPhase::Drag, offset);
        if let Some(c) = cmd {
            assert!(p.on_scroll_end(ScrollPhase::Momentum, c.offset).is_none());
        }
        cmd
    }

    #[test]
    fn threshold_is_strict() {
        let p = pager(3);
        assert_eq!(p.target_for(30.0), 0);
        assert_eq!(p.target_for(30.5), 1);
        assert_eq!(p.target_for(29.0), 0);
    }

    #[test]
    fn never_moves_more_than_one_page() {
        let mut p = pager(10);
        let cmd = gesture(&mut p, 750.0).unwrap();
        assert_eq!(cmd.page, 1);
        assert_eq!(cmd.offset, 100.0);
        assert!(cmd.animated);
        assert_eq!(gesture(&mut p, 0.0).unwrap().page, 0);
    }

    #[test]
    fn clamps_at_both_ends() {
        let mut p = pager(2);
        assert_eq!(gesture(&mut p, -40.0).unwrap().page, 0);
        gesture(&mut p, 100.0);
        assert_eq!(p.current(), 1);
        assert_eq!(gesture(&mut p, 190.0).unwrap().page, 1);
    }

    #[test]
    fn own_animation_settle_is_swallowed() {
        let mut p = pager(3);
        p.on_scroll_end(ScrollPhase::Drag, 60.0).unwrap();
        assert!(p.is_awaiting_own_animation());

        // A drag end while we wait does not clear the flag.
        assert!(p.on_scroll_end(ScrollPhase::Drag, 160.0).is_none());
        assert!(p.is_awaiting_own_animation());

        assert!(p.on_scroll_end(ScrollPhase::Momentum, 100.0).is_none());
        assert!(!p.is_awaiting_own_animation());
        assert_eq!(p.current(), 1);

        assert_eq!(p.on_scroll_end(ScrollPhase::Momentum, 140.0).unwrap().page, 2);
    }

    #[test]
    fn resize_realigns_without_animation() {
        let mut p = pager(3);
        gesture(&mut p, 80.0);
        let cmd = p.resize(200.0).unwrap();
        assert_eq!(cmd, ScrollCommand { page: 1, offset: 200.0, animated: false });
        assert!(!p.is_awaiting_own_animation());
        assert!(p.resize(0.0).is_err());
        assert!(p.resize(f64::NAN).is_err());
        assert_eq!(p.page_height(), 200.0);
    }

    #[test]
    fn huge_offsets_still_step_one_page() {
        let mut p = pager(3);
        assert_eq!(p.target_for(1e300), 1);
        assert_eq!(p.target_for(f64::MAX), 1);
        assert_eq!(p.target_for(-1e300), 0);
        assert_eq!(gesture(&mut p, 1.5e300).unwrap().page, 1);
        assert_eq!(gesture(&mut p, 9.9e307).unwrap().page, 2);
        assert_eq!(gesture(&mut p, -f64::MAX).unwrap().page, 1);
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(SnapPaginator::new(0, 100.0, 0.3).is_err());
        assert!(SnapPaginator::new(3, -1.0, 0.3).is_err());
        assert!(SnapPaginator::new(3, 100.0, 1.0).is_err());
    }

    proptest! {
        #[test]
        fn gestures_stay_in_range_and_single_step(
            count in 1usize..12,
            offsets in proptest::collection::vec(-500.0f64..2_000.0, 1..40),
        ) {
            let mut p = pager(count);
            for offset in offsets {
                let before = p.current();
                gesture(&mut p, offset);
                let after = p.current();
                prop_assert!(after < count);
                prop_assert!((after as i64 - before as i64).abs() <= 1);
            }
        }

        #[test]
        fn fraction_decides_next_page(page in 0usize..5, fraction in 0.0f64..0.999) {
            let mut p = pager(10);
            for _ in 0..page {
                let next = (p.current() + 1) as f64 * 100.0;
                gesture(&mut p, next);
            }
            prop_assert_eq!(p.current(), page);
            let offset = (page as f64 + fraction) * 100.0;
            let f = (offset % 100.0) / 100.0;
            let expected = if f > DEFAULT_SNAP_THRESHOLD { page + 1 } else { page };
            prop_assert_eq!(p.target_for(offset), expected);
        }
    }
}
