//! What the screens render: routes, overlay placement and state snapshots.
//!
//! The tab bar and the screens themselves live outside the core. They read a
//! [`Snapshot`] and draw it; nothing here depends on how they draw.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::feed::{FeedItem, PagingMode};
use crate::redeem::{format_timer, PendingConfirmation, RedemptionCode, SessionId};

/// Bottom-tab destinations, in tab order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    #[default]
    Map,
    Reels,
    Leaderboard,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Map, Route::Reels, Route::Leaderboard];

    pub fn as_str(self) -> &'static str {
        match self {
            Route::Map => "map",
            Route::Reels => "reels",
            Route::Leaderboard => "leaderboard",
        }
    }

    pub fn is_feed(self) -> bool {
        self == Route::Reels
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown route: {s}"))
    }
}

/// Where the running redemption is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPlacement {
    None,
    /// Tinted overlay covering the feed.
    FullScreen,
    /// Persistent bar above the tab bar on other screens.
    CompactBar,
}

impl OverlayPlacement {
    pub fn for_route(route: Route, session_active: bool) -> Self {
        match (session_active, route.is_feed()) {
            (false, _) => OverlayPlacement::None,
            (true, true) => OverlayPlacement::FullScreen,
            (true, false) => OverlayPlacement::CompactBar,
        }
    }
}

/// Display fields of the running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub target_item_index: usize,
    pub item_title: String,
    pub code: RedemptionCode,
    pub seconds_remaining: u32,
    /// `M:SS`
    pub countdown: String,
}

impl SessionView {
    pub fn new(
        session_id: SessionId,
        target_item_index: usize,
        item_title: impl Into<String>,
        code: RedemptionCode,
        seconds_remaining: u32,
    ) -> Self {
        Self {
            session_id,
            target_item_index,
            item_title: item_title.into(),
            code,
            seconds_remaining,
            countdown: format_timer(seconds_remaining),
        }
    }
}

/// Everything a mounted screen may render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub route: Route,
    pub paging_mode: PagingMode,
    pub active_index: usize,
    pub items: Vec<FeedItem>,
    pub session: Option<SessionView>,
    pub overlay: OverlayPlacement,
    pub lost_visible: bool,
    pub pending_confirmation: Option<PendingConfirmation>,
}

impl Snapshot {
    pub fn active_item(&self) -> Option<&FeedItem> {
        self.items.get(self.active_index)
    }

    pub fn remaining_count(&self, index: usize) -> Option<u32> {
        self.items.get(index).map(|i| i.remaining_count)
    }

    /// `2/3` style position badge for the active reel.
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.active_index + 1, self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_follows_route_only_while_active() {
        assert_eq!(OverlayPlacement::for_route(Route::Reels, false), OverlayPlacement::None);
        assert_eq!(OverlayPlacement::for_route(Route::Reels, true), OverlayPlacement::FullScreen);
        assert_eq!(OverlayPlacement::for_route(Route::Map, true), OverlayPlacement::CompactBar);
        assert_eq!(
            OverlayPlacement::for_route(Route::Leaderboard, true),
            OverlayPlacement::CompactBar
        );
    }

    #[test]
    fn route_parses_case_insensitively() {
        assert_eq!("Reels".parse::<Route>(), Ok(Route::Reels));
        assert_eq!("leaderboard".parse::<Route>(), Ok(Route::Leaderboard));
        assert!("settings".parse::<Route>().is_err());
    }
}
