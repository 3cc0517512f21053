//! Redemption session state machine.
//!
//! One process-wide countdown. Like the rest of the core it owns no
//! threads: whoever hosts it delivers `tick(id)` once per second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Running)* -> Expired -> Idle
//! ```
//!
//! Starting while `Running` replaces the session outright. Ticks carry the id
//! of the session they were scheduled for; ticks for any other id are stale.

use serde::{Deserialize, Serialize};

use super::code::RedemptionCode;

/// Default session length in seconds.
pub const DEFAULT_SESSION_LENGTH_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionState {
    Idle,
    Running,
}

/// Identifies one run of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Data that only exists while a session runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub id: SessionId,
    pub target_item_index: usize,
    pub code: RedemptionCode,
    pub seconds_remaining: u32,
}

/// Result of delivering one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a session that is no longer running.
    Stale,
    Running { seconds_remaining: u32 },
    /// The countdown hit zero; the session is gone.
    Expired(ActiveSession),
}

/// The global countdown.
///
/// `running` is `None` when idle, so an idle session can never carry a code
/// or a target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerSession {
    running: Option<ActiveSession>,
    next_id: u64,
}

impl TimerSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RedemptionState {
        if self.running.is_some() {
            RedemptionState::Running
        } else {
            RedemptionState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.running.as_ref()
    }

    pub fn id(&self) -> Option<SessionId> {
        self.running.as_ref().map(|s| s.id)
    }

    pub fn target_item_index(&self) -> Option<usize> {
        self.running.as_ref().map(|s| s.target_item_index)
    }

    pub fn code(&self) -> Option<RedemptionCode> {
        self.running.as_ref().map(|s| s.code)
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.running.as_ref().map(|s| s.seconds_remaining).unwrap_or(0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a countdown for `target`. Returns the new id and the session it
    /// replaced, if one was running.
    pub fn start(
        &mut self,
        target_item_index: usize,
        code: RedemptionCode,
        length_secs: u32,
    ) -> (SessionId, Option<ActiveSession>) {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        let replaced = self.running.replace(ActiveSession {
            id,
            target_item_index,
            code,
            // A zero-length session would never receive the tick that ends it.
            seconds_remaining: length_secs.max(1),
        });
        (id, replaced)
    }

    /// Deliver one second to session `id`.
    pub fn tick(&mut self, id: SessionId) -> TickOutcome {
        let Some(session) = self.running.as_mut().filter(|s| s.id == id) else {
            return TickOutcome::Stale;
        };
        session.seconds_remaining = session.seconds_remaining.saturating_sub(1);
        if session.seconds_remaining > 0 {
            return TickOutcome::Running {
                seconds_remaining: session.seconds_remaining,
            };
        }
        match self.running.take() {
            Some(expired) => TickOutcome::Expired(expired),
            None => TickOutcome::Stale,
        }
    }
}

/// One-shot "you lost the code" notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostFeedback {
    visible: bool,
}

impl LostFeedback {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn raise(&mut self) {
        self.visible = true;
    }

    /// Hide the notice. Returns whether it was showing.
    pub fn dismiss(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }
}
