//! Main event loop and API completion processing

use anyhow::Result;
use crossterm::event;
use std::time::Duration;

use crate::constants::{POLL_IDLE_MS, POLL_LOADING_MS};
use crate::input::{InputResult, handle_input};

use super::render_thread::RenderThread;
use super::{App, AppEvent};

impl App {
    pub(crate) async fn event_loop(&mut self, render_thread: &RenderThread) -> Result<()> {
        loop {
            // Process API completions first (non-blocking)
            if self.process_api_events() {
                self.dirty = true;
            }

            // Render only when dirty (non-blocking - sends to render thread)
            if self.dirty {
                render_thread.render(self.state.clone());
                self.dirty = false;
            }

            // Handle input (adaptive timeout: faster while a call is in flight
            // so completions and the spinner stay fresh)
            let poll_timeout = if self.state.is_loading() {
                POLL_LOADING_MS
            } else {
                POLL_IDLE_MS
            };
            if event::poll(Duration::from_millis(poll_timeout))? {
                let evt = event::read()?;
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.state, &self.bindings) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => self.handle_action(action),
                    InputResult::Char(c) => self.handle_char(c),
                    InputResult::Backspace => self.handle_backspace(),
                    InputResult::Continue => {}
                }
            }

            // Keep the spinner animating while something is in flight
            if self.state.is_loading() {
                self.dirty = true;
            }
        }

        Ok(())
    }

    /// Drain pending API completions. Returns true if any changed the
    /// displayed state; stale completions are discarded by the controllers.
    pub(crate) fn process_api_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::SearchFinished { seq, limit, outcome } => {
                    if self.state.search.apply(seq, limit, outcome) {
                        let rows = self.state.search.result().emails.len();
                        self.state.list.clamp_to(rows);
                        changed = true;
                    }
                }
                AppEvent::MessageLoaded { seq, outcome } => {
                    if self.state.message.apply_load(seq, outcome) {
                        changed = true;
                    }
                }
                AppEvent::RedeliveryFinished { id, outcome } => {
                    let confirmed = matches!(outcome, Ok(true));
                    if self.state.message.apply_send(id, outcome) {
                        if confirmed {
                            self.state.set_status("Message re-delivered");
                        }
                        changed = true;
                    }
                }
            }
        }
        changed
    }
}
