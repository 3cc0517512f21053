use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::ScrollCommand;
use crate::redeem::{ConfirmDialog, RedemptionCode, SessionId};
use crate::screen::Route;

/// Every state change in the store produces an Event.
/// Screens render from snapshots; events tell the host what just happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The viewport should move. Emitted by the snap engine and on resize.
    ScrollRequested {
        command: ScrollCommand,
        at: DateTime<Utc>,
    },
    ActiveIndexChanged {
        from: usize,
        to: usize,
        at: DateTime<Utc>,
    },
    /// A redeem tap opened the confirmation prompt.
    ConfirmationRequested {
        item_index: usize,
        dialog: ConfirmDialog,
        at: DateTime<Utc>,
    },
    RedemptionDeclined {
        item_index: usize,
        at: DateTime<Utc>,
    },
    RedemptionStarted {
        session_id: SessionId,
        item_index: usize,
        code: RedemptionCode,
        remaining_count: u32,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    /// A running session was replaced by a new one before it expired.
    RedemptionSuperseded {
        session_id: SessionId,
        item_index: usize,
        at: DateTime<Utc>,
    },
    SessionTicked {
        session_id: SessionId,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    /// The countdown ran out; the code went back to the item.
    RedemptionExpired {
        session_id: SessionId,
        item_index: usize,
        remaining_count: u32,
        at: DateTime<Utc>,
    },
    LostFeedbackDismissed {
        at: DateTime<Utc>,
    },
    RouteChanged {
        from: Route,
        to: Route,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::ScrollRequested { at, .. }
            | Event::ActiveIndexChanged { at, .. }
            | Event::ConfirmationRequested { at, .. }
            | Event::RedemptionDeclined { at, .. }
            | Event::RedemptionStarted { at, .. }
            | Event::RedemptionSuperseded { at, .. }
            | Event::SessionTicked { at, .. }
            | Event::RedemptionExpired { at, .. }
            | Event::LostFeedbackDismissed { at }
            | Event::RouteChanged { at, .. } => *at,
        }
    }
}
