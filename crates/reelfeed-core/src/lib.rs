//! # Reelfeed Core Library
//!
//! This library provides the core logic behind the reel feed: a vertically
//! paged list of offers and a timed redemption code that stays on screen
//! across tab changes. Screens, styling and the tab bar are thin layers that
//! render what this crate produces.
//!
//! ## Architecture
//!
//! - **Feed**: items plus a paging engine, either the one-page threshold snap
//!   engine or native paging with visibility tracking
//! - **Redemption**: a single global countdown session with a one-second tick
//!   task and a "code lost" notice on expiry
//! - **Store**: the one owner of all mutable state; inputs go in as actions,
//!   changes come out as events and snapshots
//! - **App**: the event loop hosting the store and the tick task
//!
//! ## Key Components
//!
//! - [`FeedState`]: items and active index
//! - [`TimerSession`]: redemption state machine
//! - [`AppStore`]: shared state owner
//! - [`App`] / [`AppHandle`]: event loop and capability handles
//! - [`Config`]: application configuration management

pub mod app;
pub mod error;
pub mod events;
pub mod feed;
pub mod redeem;
pub mod screen;
pub mod storage;
pub mod store;

pub use app::{App, AppHandle, FeedScroller, Input, Navigator, RedeemRequester, SessionReader};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use feed::{
    default_catalog, FeedItem, FeedState, PagingMode, ScrollCommand, ScrollPhase, ViewToken,
};
pub use redeem::{
    format_timer, CodeGenerator, ConfirmDialog, Decision, RedemptionCode, SessionId, TimerSession,
};
pub use screen::{OverlayPlacement, Route, SessionView, Snapshot};
pub use storage::Config;
pub use store::{Action, AppStore};
