//! Application core - state, controllers and coordination

mod actions;
mod event_loop;
pub mod message;
pub mod render_thread;
pub mod search;
pub mod state;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError, MessageDetail, SearchResponse};
use crate::config::Config;
use crate::input::KeyBindings;
use crate::route::{self, Route, Router};

use message::MessageController;
use render_thread::RenderThread;
use search::SearchController;
use state::{AppState, ListState, ModalState, StatusState, View};

/// Completions of spawned API calls, delivered back to the event loop.
/// The loop is the only writer of view state; spawned tasks never touch it.
#[derive(Debug)]
pub enum AppEvent {
    SearchFinished {
        seq: u64,
        /// The limit the completed call was issued with.
        limit: u64,
        outcome: Result<SearchResponse, ApiError>,
    },
    MessageLoaded {
        seq: u64,
        outcome: Result<MessageDetail, ApiError>,
    },
    RedeliveryFinished {
        id: u64,
        outcome: Result<bool, ApiError>,
    },
}

pub struct App {
    pub(crate) client: ApiClient,
    pub(crate) state: AppState,
    pub(crate) bindings: KeyBindings,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
    /// Dirty flag: when true, UI needs re-render. Skips renders when nothing changed.
    pub(crate) dirty: bool,
}

impl App {
    /// Build the app and issue the initial search for the root address.
    /// Must run inside the tokio runtime since it spawns the first fetch.
    pub fn new(config: &Config, client: ApiClient) -> Self {
        let (event_tx, event_rx) = mpsc::channel(32);
        let defaults = config.search_defaults();

        let state = AppState {
            view: View::List,
            modal: ModalState::None,
            router: Router::new(Route::root()),
            search: SearchController::new(defaults),
            message: MessageController::default(),
            list: ListState::default(),
            status: StatusState::default(),
        };

        let mut app = Self {
            client,
            state,
            bindings: KeyBindings::new(),
            event_tx,
            event_rx,
            dirty: true,
        };
        app.apply_route();
        app
    }

    pub async fn run(&mut self) -> Result<()> {
        // Spawn background render thread (owns terminal setup/teardown)
        let render_thread = RenderThread::spawn()?;

        let result = self.event_loop(&render_thread).await;

        // Shutdown render thread (handles terminal cleanup)
        render_thread.shutdown();
        result
    }

    /// Push a new address and resolve it. Derivation happens exactly once,
    /// right here; a programmatic push never re-derives on its own, which
    /// is what prevents address/request update loops.
    pub(crate) fn navigate(&mut self, route: Route) {
        self.state.router.push(route);
        self.apply_route();
    }

    pub(crate) fn history_back(&mut self) {
        if self.state.router.back() {
            self.apply_route();
        }
    }

    pub(crate) fn history_forward(&mut self) {
        if self.state.router.forward() {
            self.apply_route();
        }
    }

    /// Resolve the current address into view state and issue the fetch it
    /// stands for. Runs on the initial load and after every navigation,
    /// including back/forward.
    pub(crate) fn apply_route(&mut self) {
        let route = self.state.router.current().clone();
        tracing::debug!(address = %route.encode(), "applying route");
        match &route {
            Route::Search { .. } => {
                self.state.view = View::List;
                self.state.message.close();
                if let Some(request) = route::derive_request(&route, &self.state.search.defaults) {
                    self.state.search.set_request(request);
                    self.state.search.issue(&self.client, &self.event_tx);
                }
            }
            Route::Message { id } => {
                self.state.view = View::Message;
                self.state.message.open(*id, &self.client, &self.event_tx);
            }
        }
    }

    /// Re-run the active request without touching the address.
    pub(crate) fn rerun_search(&mut self) {
        self.state.search.issue(&self.client, &self.event_tx);
    }
}
