//! Composition root: the event loop that owns the store and the tick task.
//!
//! ```ignore
//! let (app, handle) = App::from_config(&config)?;
//! tokio::spawn(app.run());
//! handle.request_redeem(0)?;
//! handle.decide(Decision::Confirm)?;
//! ```
//!
//! Screens never see the store itself. They get an [`AppHandle`] and use it
//! through the capability traits below, so a screen that only renders the
//! countdown asks for a [`SessionReader`] and nothing else.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::feed::{default_catalog, ScrollPhase, ViewToken};
use crate::redeem::{Decision, SessionId, Ticker, DEFAULT_TICK_INTERVAL};
use crate::screen::{Route, SessionView, Snapshot};
use crate::storage::Config;
use crate::store::{Action, AppStore};

const EVENT_CAPACITY: usize = 256;

/// Message into the event loop.
#[derive(Debug)]
pub enum Input {
    Dispatch(Action),
    /// Reply with the state after every input queued before this one.
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

fn tick_input(session_id: SessionId) -> Input {
    Input::Dispatch(Action::Tick { session_id })
}

/// The running app. Consumed by [`App::run`].
pub struct App {
    store: AppStore,
    ticker: Ticker<Input>,
    inputs: mpsc::UnboundedReceiver<Input>,
    snapshots: watch::Sender<Snapshot>,
    events: broadcast::Sender<Event>,
}

impl App {
    pub fn new(store: AppStore, tick_interval: Duration) -> (Self, AppHandle) {
        let (input_tx, inputs) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(store.snapshot());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let ticker = Ticker::new(tick_interval, input_tx.downgrade(), tick_input);
        let handle = AppHandle {
            inputs: input_tx,
            snapshots: snapshot_rx,
            events: events.clone(),
        };
        let app = Self {
            store,
            ticker,
            inputs,
            snapshots,
            events,
        };
        (app, handle)
    }

    /// Build the default catalog app from configuration, ticking once a second.
    pub fn from_config(config: &Config) -> Result<(Self, AppHandle)> {
        let store = AppStore::new(default_catalog(), config)?;
        Ok(Self::new(store, DEFAULT_TICK_INTERVAL))
    }

    /// Process inputs until shutdown or until every handle is dropped.
    /// Returns the final store; the tick task is aborted on the way out.
    pub async fn run(mut self) -> AppStore {
        tracing::debug!(tick = ?self.ticker.period(), "app loop started");
        while let Some(input) = self.inputs.recv().await {
            let action = match input {
                Input::Dispatch(action) => action,
                Input::Snapshot(reply) => {
                    let _ = reply.send(self.store.snapshot());
                    continue;
                }
                Input::Shutdown => break,
            };
            match self.store.dispatch(action) {
                Ok(events) => self.publish(events),
                Err(e) => tracing::warn!(error = %e, "input rejected"),
            }
        }
        if self.ticker.cancel() {
            tracing::debug!("tick task released on shutdown");
        }
        tracing::debug!("app loop stopped");
        self.store
    }

    fn publish(&mut self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        for event in &events {
            match event {
                Event::RedemptionStarted { session_id, .. } => self.ticker.restart(*session_id),
                Event::RedemptionExpired { .. } => {
                    self.ticker.cancel();
                }
                _ => {}
            }
        }
        self.snapshots.send_replace(self.store.snapshot());
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

/// Cloneable access to a running [`App`].
///
/// Every call fails with [`CoreError::StoreClosed`] once the app's loop has
/// ended; a handle never serves state from a store that no longer exists.
#[derive(Debug, Clone)]
pub struct AppHandle {
    inputs: mpsc::UnboundedSender<Input>,
    snapshots: watch::Receiver<Snapshot>,
    events: broadcast::Sender<Event>,
}

impl AppHandle {
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.inputs
            .send(Input::Dispatch(action))
            .map_err(|_| CoreError::StoreClosed)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.inputs
            .send(Input::Shutdown)
            .map_err(|_| CoreError::StoreClosed)
    }

    /// Snapshot taken by the loop itself, after all earlier inputs.
    pub async fn fetch(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.inputs
            .send(Input::Snapshot(reply))
            .map_err(|_| CoreError::StoreClosed)?;
        rx.await.map_err(|_| CoreError::StoreClosed)
    }

    /// Wait for the next published snapshot.
    pub async fn changed(&mut self) -> Result<Snapshot> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| CoreError::StoreClosed)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    fn current(&self) -> Result<Snapshot> {
        self.snapshots
            .has_changed()
            .map_err(|_| CoreError::StoreClosed)?;
        Ok(self.snapshots.borrow().clone())
    }
}

/// Read access to the shared state.
pub trait SessionReader {
    fn snapshot(&self) -> Result<Snapshot>;

    fn session(&self) -> Result<Option<SessionView>> {
        Ok(self.snapshot()?.session)
    }
}

/// Start redemptions and answer their prompts.
pub trait RedeemRequester {
    fn request_redeem(&self, item_index: usize) -> Result<()>;
    fn decide(&self, decision: Decision) -> Result<()>;
    fn dismiss_lost(&self) -> Result<()>;
}

/// Report tab changes.
pub trait Navigator {
    fn navigate(&self, route: Route) -> Result<()>;
}

/// Report list scrolling.
pub trait FeedScroller {
    fn scroll_end(&self, phase: ScrollPhase, offset: f64) -> Result<()>;
    fn viewable_items_changed(&self, tokens: Vec<ViewToken>) -> Result<()>;
    fn resize(&self, page_height: f64) -> Result<()>;
}

impl SessionReader for AppHandle {
    fn snapshot(&self) -> Result<Snapshot> {
        self.current()
    }
}

impl RedeemRequester for AppHandle {
    fn request_redeem(&self, item_index: usize) -> Result<()> {
        self.dispatch(Action::RequestRedeem { item_index })
    }

    fn decide(&self, decision: Decision) -> Result<()> {
        self.dispatch(Action::Decide { decision })
    }

    fn dismiss_lost(&self) -> Result<()> {
        self.dispatch(Action::DismissLost)
    }
}

impl Navigator for AppHandle {
    fn navigate(&self, route: Route) -> Result<()> {
        self.dispatch(Action::Navigate { route })
    }
}

impl FeedScroller for AppHandle {
    fn scroll_end(&self, phase: ScrollPhase, offset: f64) -> Result<()> {
        self.dispatch(Action::ScrollEnd { phase, offset })
    }

    fn viewable_items_changed(&self, tokens: Vec<ViewToken>) -> Result<()> {
        self.dispatch(Action::ViewableItemsChanged { tokens })
    }

    fn resize(&self, page_height: f64) -> Result<()> {
        self.dispatch(Action::Resize { page_height })
    }
}
