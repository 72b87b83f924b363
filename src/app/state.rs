//! Application state types
//!
//! All state types live here to maintain clean dependency:
//! UI layer imports from app layer, not vice versa.

use crate::route::Router;

use super::message::MessageController;
use super::search::SearchController;

/// Which screen is showing. The message view's own data lives in the
/// message controller; the variant only selects the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    List,
    Message,
}

/// Modal overlay state - only one can be active at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    None,
    /// Editing the search query.
    Query { input: String },
    /// Search options panel: field toggles and the day window.
    Options { selected: usize },
}

impl ModalState {
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }

    pub fn is_options(&self) -> bool {
        matches!(self, Self::Options { .. })
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Get the query input if the query editor is open
    pub fn query_input(&self) -> Option<&str> {
        match self {
            Self::Query { input } => Some(input),
            _ => None,
        }
    }
}

/// Cursor state of the list view.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Selected row within the displayed page.
    pub selected: usize,
}

impl ListState {
    pub fn clamp_to(&mut self, rows: usize) {
        if rows == 0 {
            self.selected = 0;
        } else if self.selected >= rows {
            self.selected = rows - 1;
        }
    }
}

/// Transient status line state.
#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub modal: ModalState,
    pub router: Router,
    pub search: SearchController,
    pub message: MessageController,
    pub list: ListState,
    pub status: StatusState,
}

impl AppState {
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status.message = message.into();
    }

    pub fn clear_status(&mut self) {
        self.status.message.clear();
    }

    /// Whether any request for the showing view is still in flight.
    pub fn is_loading(&self) -> bool {
        match self.view {
            View::List => self.search.in_flight(),
            View::Message => {
                self.message.in_flight() || self.message.view().is_some_and(|v| v.sending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_selection_clamps() {
        let mut list = ListState { selected: 7 };
        list.clamp_to(3);
        assert_eq!(list.selected, 2);
        list.clamp_to(0);
        assert_eq!(list.selected, 0);
    }
}
