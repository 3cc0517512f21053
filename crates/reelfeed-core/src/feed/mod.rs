//! The reel feed: items plus the engine that decides which one is active.

mod item;
mod snap;
mod viewability;

pub use item::{default_catalog, FeedItem, DEFAULT_REMAINING_COUNT};
pub use snap::{ScrollCommand, ScrollPhase, SnapPaginator, DEFAULT_SNAP_THRESHOLD};
pub use viewability::{ViewToken, ViewabilityTracker, DEFAULT_VIEWABILITY_THRESHOLD_PCT};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::storage::FeedConfig;

/// How the list pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Free scroll, snapped by us with the one-page threshold rule.
    Snap,
    /// Platform paging; we track the most visible row.
    Native,
}

impl Default for PagingMode {
    fn default() -> Self {
        PagingMode::Snap
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Paginator {
    Snap(SnapPaginator),
    Native(ViewabilityTracker),
}

impl Paginator {
    pub fn active_index(&self) -> usize {
        match self {
            Paginator::Snap(p) => p.current(),
            Paginator::Native(t) => t.current(),
        }
    }

    pub fn mode(&self) -> PagingMode {
        match self {
            Paginator::Snap(_) => PagingMode::Snap,
            Paginator::Native(_) => PagingMode::Native,
        }
    }
}

/// What a paging input did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageUpdate {
    pub previous: usize,
    pub active_index: usize,
    pub scroll: Option<ScrollCommand>,
}

impl PageUpdate {
    pub fn changed(&self) -> bool {
        self.previous != self.active_index
    }
}

/// Items in display order and the paging engine over them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedState {
    items: Vec<FeedItem>,
    paginator: Paginator,
}

impl FeedState {
    pub fn new(items: Vec<FeedItem>, config: &FeedConfig) -> Result<Self, ValidationError> {
        item::validate_items(&items)?;
        let paginator = match config.mode {
            PagingMode::Snap => Paginator::Snap(SnapPaginator::new(
                items.len(),
                config.page_height,
                config.snap_threshold,
            )?),
            PagingMode::Native => Paginator::Native(ViewabilityTracker::new(
                items.len(),
                config.viewability_threshold_pct,
            )?),
        };
        Ok(Self { items, paginator })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&FeedItem> {
        self.items.get(index)
    }

    pub fn active_index(&self) -> usize {
        self.paginator.active_index()
    }

    pub fn active_item(&self) -> &FeedItem {
        &self.items[self.active_index()]
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Bounds-checked mutable access for the redemption transitions.
    pub(crate) fn item_mut(&mut self, index: usize) -> Result<&mut FeedItem, ValidationError> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or_else(|| ValidationError::OutOfBounds {
                collection: "feed items".into(),
                index,
                len,
            })
    }

    // ── Paging inputs ────────────────────────────────────────────────

    /// Scroll-end callback. Only meaningful in snap mode.
    pub fn on_scroll_end(&mut self, phase: ScrollPhase, offset: f64) -> Option<PageUpdate> {
        let previous = self.active_index();
        match &mut self.paginator {
            Paginator::Snap(p) => {
                let scroll = p.on_scroll_end(phase, offset)?;
                Some(PageUpdate {
                    previous,
                    active_index: p.current(),
                    scroll: Some(scroll),
                })
            }
            Paginator::Native(_) => {
                tracing::debug!(?phase, offset, "scroll end ignored in native paging mode");
                None
            }
        }
    }

    /// Viewability callback. Only meaningful in native mode.
    pub fn on_viewable_items_changed(&mut self, tokens: &[ViewToken]) -> Option<PageUpdate> {
        let previous = self.active_index();
        match &mut self.paginator {
            Paginator::Native(t) => {
                let active_index = t.on_viewable_items_changed(tokens)?;
                Some(PageUpdate {
                    previous,
                    active_index,
                    scroll: None,
                })
            }
            Paginator::Snap(_) => {
                tracing::debug!(count = tokens.len(), "viewability ignored in snap paging mode");
                None
            }
        }
    }

    /// Viewport height changed. Native lists re-layout themselves.
    pub fn resize(&mut self, page_height: f64) -> Result<Option<PageUpdate>, ValidationError> {
        let previous = self.active_index();
        match &mut self.paginator {
            Paginator::Snap(p) => {
                let scroll = p.resize(page_height)?;
                Ok(Some(PageUpdate {
                    previous,
                    active_index: previous,
                    scroll: Some(scroll),
                }))
            }
            Paginator::Native(_) => Ok(None),
        }
    }
}
