//! The shared state owner.
//!
//! `AppStore` holds the feed, the redemption session, the lost notice and the
//! current route, and is the only place any of them change. Every input is an
//! [`Action`]; every change comes back as [`Event`]s. The store does no I/O
//! and never waits: the tick source and the confirmation prompt live outside
//! and talk to it through actions.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::Event;
use crate::feed::{FeedItem, FeedState, PageUpdate, ScrollPhase, ViewToken};
use crate::redeem::{
    CodeGenerator, ConfirmDialog, Decision, LostFeedback, PendingConfirmation, SessionId,
    TickOutcome, TimerSession,
};
use crate::screen::{OverlayPlacement, Route, SessionView, Snapshot};
use crate::storage::Config;

/// Inputs the store understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ScrollEnd { phase: ScrollPhase, offset: f64 },
    ViewableItemsChanged { tokens: Vec<ViewToken> },
    Resize { page_height: f64 },
    /// Redeem tap on a reel. Opens the confirmation prompt.
    RequestRedeem { item_index: usize },
    /// Answer to the open confirmation prompt.
    Decide { decision: Decision },
    Tick { session_id: SessionId },
    DismissLost,
    Navigate { route: Route },
}

#[derive(Debug, Clone)]
pub struct AppStore {
    feed: FeedState,
    session: TimerSession,
    lost: LostFeedback,
    route: Route,
    pending: Option<PendingConfirmation>,
    session_length_secs: u32,
    codes: CodeGenerator,
}

impl AppStore {
    pub fn new(items: Vec<FeedItem>, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            feed: FeedState::new(items, &config.feed)?,
            session: TimerSession::new(),
            lost: LostFeedback::default(),
            route: Route::default(),
            pending: None,
            session_length_secs: config.redemption.session_length_secs,
            codes: CodeGenerator::from_entropy(),
        })
    }

    /// Replace the code source, e.g. with a seeded one.
    pub fn with_codes(mut self, codes: CodeGenerator) -> Self {
        self.codes = codes;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn lost(&self) -> LostFeedback {
        self.lost
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    pub fn session_length_secs(&self) -> u32 {
        self.session_length_secs
    }

    pub fn snapshot(&self) -> Snapshot {
        let session = self.session.active().map(|s| {
            let title = self
                .feed
                .item(s.target_item_index)
                .map(|i| i.title.as_str())
                .unwrap_or_default();
            SessionView::new(s.id, s.target_item_index, title, s.code, s.seconds_remaining)
        });
        Snapshot {
            route: self.route,
            paging_mode: self.feed.paginator().mode(),
            active_index: self.feed.active_index(),
            items: self.feed.items().to_vec(),
            overlay: OverlayPlacement::for_route(self.route, session.is_some()),
            session,
            lost_visible: self.lost.is_visible(),
            pending_confirmation: self.pending.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one input.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a redeem on a missing item or a
    /// non-positive resize. State is unchanged on error.
    pub fn dispatch(&mut self, action: Action) -> Result<Vec<Event>> {
        let events = match action {
            Action::ScrollEnd { phase, offset } => page_events(self.feed.on_scroll_end(phase, offset)),
            Action::ViewableItemsChanged { tokens } => {
                page_events(self.feed.on_viewable_items_changed(&tokens))
            }
            Action::Resize { page_height } => page_events(self.feed.resize(page_height)?),
            Action::RequestRedeem { item_index } => self.request_redeem(item_index)?,
            Action::Decide { decision } => self.decide(decision)?,
            Action::Tick { session_id } => self.tick(session_id)?,
            Action::DismissLost => self.dismiss_lost(),
            Action::Navigate { route } => self.navigate(route),
        };
        Ok(events)
    }

    fn request_redeem(&mut self, item_index: usize) -> Result<Vec<Event>> {
        let title = match self.feed.item(item_index) {
            Some(item) => item.title.clone(),
            None => {
                return Err(crate::error::ValidationError::OutOfBounds {
                    collection: "feed items".into(),
                    index: item_index,
                    len: self.feed.len(),
                }
                .into())
            }
        };
        let dialog = ConfirmDialog::for_redemption(&title);
        if let Some(previous) = self.pending.replace(PendingConfirmation {
            item_index,
            dialog: dialog.clone(),
        }) {
            tracing::debug!(previous = previous.item_index, item_index, "replacing open prompt");
        }
        Ok(vec![Event::ConfirmationRequested {
            item_index,
            dialog,
            at: Utc::now(),
        }])
    }

    fn decide(&mut self, decision: Decision) -> Result<Vec<Event>> {
        let Some(pending) = self.pending.take() else {
            tracing::debug!(?decision, "decision with no open prompt");
            return Ok(Vec::new());
        };
        let item_index = pending.item_index;
        if !decision.is_confirm() {
            tracing::debug!(item_index, "redemption declined");
            return Ok(vec![Event::RedemptionDeclined {
                item_index,
                at: Utc::now(),
            }]);
        }

        let item = self.feed.item_mut(item_index)?;
        item.consume_one();
        let remaining_count = item.remaining_count;

        let code = self.codes.next_code();
        let (session_id, replaced) = self.session.start(item_index, code, self.session_length_secs);
        let now = Utc::now();
        let mut events = Vec::with_capacity(2);
        if let Some(old) = replaced {
            tracing::info!(session = %old.id, item = old.target_item_index, "redemption superseded");
            events.push(Event::RedemptionSuperseded {
                session_id: old.id,
                item_index: old.target_item_index,
                at: now,
            });
        }
        tracing::info!(session = %session_id, item_index, remaining_count, "redemption started");
        events.push(Event::RedemptionStarted {
            session_id,
            item_index,
            code,
            remaining_count,
            seconds_remaining: self.session.seconds_remaining(),
            at: now,
        });
        Ok(events)
    }

    fn tick(&mut self, session_id: SessionId) -> Result<Vec<Event>> {
        match self.session.tick(session_id) {
            TickOutcome::Stale => {
                tracing::debug!(session = %session_id, "stale tick dropped");
                Ok(Vec::new())
            }
            TickOutcome::Running { seconds_remaining } => Ok(vec![Event::SessionTicked {
                session_id,
                seconds_remaining,
                at: Utc::now(),
            }]),
            TickOutcome::Expired(done) => {
                let item = self.feed.item_mut(done.target_item_index)?;
                item.restore_one();
                let remaining_count = item.remaining_count;
                self.lost.raise();
                tracing::info!(
                    session = %session_id,
                    item = done.target_item_index,
                    remaining_count,
                    "redemption expired"
                );
                Ok(vec![Event::RedemptionExpired {
                    session_id,
                    item_index: done.target_item_index,
                    remaining_count,
                    at: Utc::now(),
                }])
            }
        }
    }

    fn dismiss_lost(&mut self) -> Vec<Event> {
        if self.lost.dismiss() {
            vec![Event::LostFeedbackDismissed { at: Utc::now() }]
        } else {
            Vec::new()
        }
    }

    fn navigate(&mut self, route: Route) -> Vec<Event> {
        if route == self.route {
            return Vec::new();
        }
        let from = std::mem::replace(&mut self.route, route);
        vec![Event::RouteChanged {
            from,
            to: route,
            at: Utc::now(),
        }]
    }
}

fn page_events(update: Option<PageUpdate>) -> Vec<Event> {
    let Some(update) = update else {
        return Vec::new();
    };
    let now = Utc::now();
    let mut events = Vec::with_capacity(2);
    if let Some(command) = update.scroll {
        events.push(Event::ScrollRequested { command, at: now });
    }
    if update.changed() {
        events.push(Event::ActiveIndexChanged {
            from: update.previous,
            to: update.active_index,
            at: now,
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::default_catalog;

    fn store(length: u32) -> AppStore {
        let mut config = Config::default();
        config.redemption.session_length_secs = length;
        AppStore::new(default_catalog(), &config)
            .unwrap()
            .with_codes(CodeGenerator::seeded(42))
    }

    fn redeem(store: &mut AppStore, item_index: usize) -> SessionId {
        store.dispatch(Action::RequestRedeem { item_index }).unwrap();
        let events = store
            .dispatch(Action::Decide {
                decision: Decision::Confirm,
            })
            .unwrap();
        match events.last() {
            Some(Event::RedemptionStarted { session_id, .. }) => *session_id,
            other => panic!("Expected RedemptionStarted, got {other:?}"),
        }
    }

    fn count(store: &AppStore, index: usize) -> u32 {
        store.feed().item(index).unwrap().remaining_count
    }

    #[test]
    fn declining_changes_nothing() {
        let mut s = store(10);
        let before = s.snapshot();
        let events = s.dispatch(Action::RequestRedeem { item_index: 1 }).unwrap();
        assert!(matches!(events[0], Event::ConfirmationRequested { item_index: 1, .. }));
        assert!(s.pending().is_some());

        let events = s
            .dispatch(Action::Decide {
                decision: Decision::Cancel,
            })
            .unwrap();
        assert!(matches!(events[0], Event::RedemptionDeclined { item_index: 1, .. }));
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn decision_without_prompt_is_ignored() {
        let mut s = store(10);
        let events = s
            .dispatch(Action::Decide {
                decision: Decision::Confirm,
            })
            .unwrap();
        assert!(events.is_empty());
        assert!(!s.session().is_active());
    }

    #[test]
    fn full_session_restores_count_and_raises_lost() {
        let mut s = store(10);
        let before = count(&s, 0);
        let id = redeem(&mut s, 0);
        assert_eq!(count(&s, 0), before - 1);
        let code = s.session().code().unwrap();
        assert_eq!(code.to_string().len(), 6);

        for _ in 0..9 {
            let events = s.dispatch(Action::Tick { session_id: id }).unwrap();
            assert!(matches!(events[0], Event::SessionTicked { .. }));
        }
        assert_eq!(s.session().seconds_remaining(), 1);
        let events = s.dispatch(Action::Tick { session_id: id }).unwrap();
        assert!(matches!(events[0], Event::RedemptionExpired { item_index: 0, .. }));

        assert!(!s.session().is_active());
        assert_eq!(s.session().code(), None);
        assert!(s.lost().is_visible());
        assert_eq!(count(&s, 0), before);
    }

    #[test]
    fn redeeming_empty_item_stays_at_zero() {
        let mut config = Config::default();
        config.redemption.session_length_secs = 1;
        let items = default_catalog()
            .into_iter()
            .map(|i| i.with_remaining(0))
            .collect();
        let mut s = AppStore::new(items, &config).unwrap();
        let id = redeem(&mut s, 2);
        assert_eq!(count(&s, 2), 0);
        s.dispatch(Action::Tick { session_id: id }).unwrap();
        assert_eq!(count(&s, 2), 1);
    }

    #[test]
    fn second_redemption_supersedes_first() {
        let mut s = store(3);
        let first = redeem(&mut s, 0);
        s.dispatch(Action::RequestRedeem { item_index: 1 }).unwrap();
        let events = s
            .dispatch(Action::Decide {
                decision: Decision::Confirm,
            })
            .unwrap();
        assert!(matches!(events[0], Event::RedemptionSuperseded { item_index: 0, .. }));
        let Event::RedemptionStarted { session_id: second, .. } = events[1] else {
            panic!("Expected RedemptionStarted");
        };

        assert!(s.dispatch(Action::Tick { session_id: first }).unwrap().is_empty());
        for _ in 0..3 {
            s.dispatch(Action::Tick { session_id: second }).unwrap();
        }
        assert_eq!(count(&s, 0), 2);
        assert_eq!(count(&s, 1), 3);
        assert!(s.lost().is_visible());
    }

    #[test]
    fn navigation_does_not_touch_session() {
        let mut s = store(10);
        let id = redeem(&mut s, 0);
        s.dispatch(Action::Tick { session_id: id }).unwrap();
        s.dispatch(Action::Navigate { route: Route::Reels }).unwrap();
        assert_eq!(s.snapshot().overlay, OverlayPlacement::FullScreen);
        s.dispatch(Action::Navigate { route: Route::Leaderboard }).unwrap();
        assert_eq!(s.snapshot().overlay, OverlayPlacement::CompactBar);
        assert_eq!(s.session().seconds_remaining(), 9);
        s.dispatch(Action::Tick { session_id: id }).unwrap();
        assert_eq!(s.session().seconds_remaining(), 8);
    }

    #[test]
    fn dismiss_only_clears_notice() {
        let mut s = store(1);
        let id = redeem(&mut s, 1);
        s.dispatch(Action::Tick { session_id: id }).unwrap();
        let id = redeem(&mut s, 2);
        assert_eq!(s.dispatch(Action::DismissLost).unwrap().len(), 1);
        assert!(!s.lost().is_visible());
        assert!(s.dispatch(Action::DismissLost).unwrap().is_empty());
        assert_eq!(s.session().id(), Some(id));
    }

    #[test]
    fn redeem_out_of_range_is_rejected() {
        let mut s = store(10);
        assert!(s.dispatch(Action::RequestRedeem { item_index: 3 }).is_err());
        assert!(s.pending().is_none());
    }

    #[test]
    fn scrolling_reports_page_changes() {
        let mut s = store(10);
        let events = s
            .dispatch(Action::ScrollEnd {
                phase: ScrollPhase::Drag,
                offset: 400.0,
            })
            .unwrap();
        assert!(matches!(events[0], Event::ScrollRequested { .. }));
        assert!(matches!(events[1], Event::ActiveIndexChanged { from: 0, to: 1, .. }));
        assert_eq!(s.snapshot().position_label(), "2/3");
    }
}
