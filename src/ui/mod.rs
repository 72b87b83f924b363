//! UI rendering for mailpeek.
//!
//! Pure functions from AppState snapshots to ratatui frames. The render
//! thread calls [`render`] with whatever snapshot arrived last.

mod list;
mod message;
pub mod theme;
pub mod widgets;

use ratatui::Frame;

use crate::app::state::{AppState, View};

pub fn render(frame: &mut Frame, state: &AppState) {
    match state.view {
        View::List => list::render_list(frame, state),
        View::Message => message::render_message(frame, state),
    }
}
