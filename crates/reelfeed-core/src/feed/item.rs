//! Feed items and the static reel catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How many codes each reel starts with.
pub const DEFAULT_REMAINING_COUNT: u32 = 3;

/// One reel in the feed.
///
/// Everything except `remaining_count` is fixed once the feed is built.
/// The count only moves when a redemption starts or expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub handle: String,
    pub caption: String,
    pub emoji: String,
    pub remaining_count: u32,
}

impl FeedItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        handle: impl Into<String>,
        caption: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            handle: handle.into(),
            caption: caption.into(),
            emoji: emoji.into(),
            remaining_count: DEFAULT_REMAINING_COUNT,
        }
    }

    pub fn with_remaining(mut self, remaining_count: u32) -> Self {
        self.remaining_count = remaining_count;
        self
    }

    /// Take one code off the counter. Already-empty items stay at zero.
    pub(crate) fn consume_one(&mut self) {
        self.remaining_count = self.remaining_count.saturating_sub(1);
    }

    /// Give one code back to the counter.
    pub(crate) fn restore_one(&mut self) {
        self.remaining_count = self.remaining_count.saturating_add(1);
    }
}

/// The reels shipped with the app.
pub fn default_catalog() -> Vec<FeedItem> {
    vec![
        FeedItem::new(
            "1",
            "Joe's Coffee",
            "30% OFF",
            "@foodie_adventures",
            "Amazing latte art and cozy vibes! ☕",
            "🍔",
        ),
        FeedItem::new(
            "2",
            "Sunset Bistro",
            "Free dessert",
            "@taste_explorer",
            "Best view in town at golden hour 🌅",
            "☕",
        ),
        FeedItem::new(
            "3",
            "Green Garden",
            "15% OFF",
            "@healthy_bites",
            "Fresh salads and smoothie bowls 🥗",
            "🥐",
        ),
    ]
}

/// Reject empty catalogs and duplicate ids.
pub(crate) fn validate_items(items: &[FeedItem]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyCollection("feed items".into()));
    }
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                collection: "feed items".into(),
                id: item.id.clone(),
            });
        }
    }
    Ok(())
}
