//! User action handlers: navigation, paging, query editing, options.

use crate::api::FieldName;
use crate::constants::DAY_WINDOW_PRESETS;
use crate::input::Action;
use crate::route::{self, QueryEdit, Route};

use super::App;
use super::state::{ModalState, View};

/// Directional and absolute page changes.
#[derive(Debug, Clone, Copy)]
enum PageTarget {
    Next,
    Prev,
    First,
    Last,
}

impl App {
    pub(crate) fn handle_action(&mut self, action: Action) {
        self.state.clear_status();

        if self.state.modal.is_options() {
            self.handle_options_action(action);
            return;
        }

        match action {
            Action::Submit => self.submit_query(),
            Action::CloseModal => self.state.modal = ModalState::None,
            Action::Search => self.open_query_editor(),
            Action::Options => self.state.modal = ModalState::Options { selected: 0 },
            Action::Up => self.move_selection(-1),
            Action::Down => self.move_selection(1),
            Action::Top => self.jump_selection(true),
            Action::Bottom => self.jump_selection(false),
            Action::Open => self.open_selected(),
            Action::HistoryBack => self.history_back(),
            Action::HistoryForward => self.history_forward(),
            Action::NextPage => self.change_page(PageTarget::Next),
            Action::PrevPage => self.change_page(PageTarget::Prev),
            Action::FirstPage => self.change_page(PageTarget::First),
            Action::LastPage => self.change_page(PageTarget::Last),
            Action::Refresh => self.apply_route(),
            Action::Redeliver => self.redeliver(),
            Action::Left | Action::Right | Action::Toggle | Action::Quit => {}
        }
    }

    pub(crate) fn handle_char(&mut self, c: char) {
        if let ModalState::Query { input } = &mut self.state.modal {
            input.push(c);
        }
    }

    pub(crate) fn handle_backspace(&mut self) {
        if let ModalState::Query { input } = &mut self.state.modal {
            input.pop();
        }
    }

    /// Open the query editor seeded with the query the address carries.
    fn open_query_editor(&mut self) {
        if self.state.view != View::List {
            return;
        }
        self.state.modal = ModalState::Query {
            input: self.state.router.current().query().to_string(),
        };
    }

    /// Commit an edited query: re-run in place when the address already
    /// reflects it, otherwise push a new address with the page cleared.
    fn submit_query(&mut self) {
        let Some(input) = self.state.modal.query_input() else {
            return;
        };
        let input = input.to_string();
        self.state.modal = ModalState::None;
        match route::decide_query_edit(&input, self.state.router.current()) {
            QueryEdit::RerunInPlace => self.rerun_search(),
            QueryEdit::Navigate(route) => self.navigate(route),
        }
    }

    fn move_selection(&mut self, delta: i64) {
        match self.state.view {
            View::List => {
                let rows = self.state.search.result().emails.len();
                if rows == 0 {
                    return;
                }
                let selected = self.state.list.selected as i64 + delta;
                self.state.list.selected = selected.clamp(0, rows as i64 - 1) as usize;
            }
            View::Message => {
                if let Some(view) = self.state.message.view_mut() {
                    view.scroll = view.scroll.saturating_add_signed(delta as i16);
                }
            }
        }
    }

    fn jump_selection(&mut self, top: bool) {
        match self.state.view {
            View::List => {
                let rows = self.state.search.result().emails.len();
                self.state.list.selected = if top { 0 } else { rows.saturating_sub(1) };
            }
            View::Message => {
                if top && let Some(view) = self.state.message.view_mut() {
                    view.scroll = 0;
                }
            }
        }
    }

    /// Open the selected row's message by navigating to its address.
    fn open_selected(&mut self) {
        if self.state.view != View::List {
            return;
        }
        let Some(summary) = self
            .state
            .search
            .result()
            .emails
            .get(self.state.list.selected)
        else {
            return;
        };
        self.navigate(Route::Message { id: summary.id });
    }

    /// Change page through the pagination guard: a target outside the
    /// displayed result's known bounds is a silent local no-op, with no
    /// network call and no navigation.
    fn change_page(&mut self, target: PageTarget) {
        if self.state.view != View::List {
            return;
        }
        let result = self.state.search.result();
        let current = result.current_page();
        let page = match target {
            PageTarget::Next => current + 1,
            PageTarget::Prev => current.saturating_sub(1),
            PageTarget::First => 1,
            PageTarget::Last => result.pages.max(1),
        };
        if page == current || self.state.search.page_offset(page).is_none() {
            return;
        }

        let query = self.state.router.current().query().to_string();
        self.navigate(Route::search(Some(query), Some(page)));
    }

    fn redeliver(&mut self) {
        if self.state.view != View::Message {
            return;
        }
        self.state.message.send(&self.client, &self.event_tx);
        if self.state.message.view().is_some_and(|v| v.sending) {
            self.state.set_status("Re-delivering...");
        }
    }

    fn handle_options_action(&mut self, action: Action) {
        // One entry per field plus the day-window row at the end.
        let rows = FieldName::ALL.len() + 1;
        let ModalState::Options { selected } = self.state.modal else {
            return;
        };

        match action {
            Action::CloseModal | Action::Options => self.state.modal = ModalState::None,
            Action::Up => {
                self.state.modal = ModalState::Options {
                    selected: selected.checked_sub(1).unwrap_or(rows - 1),
                };
            }
            Action::Down => {
                self.state.modal = ModalState::Options {
                    selected: (selected + 1) % rows,
                };
            }
            Action::Toggle | Action::Submit => {
                if selected < FieldName::ALL.len() {
                    self.toggle_field(FieldName::ALL[selected]);
                } else {
                    self.adjust_day_window(1);
                }
            }
            Action::Left => {
                if selected == FieldName::ALL.len() {
                    self.adjust_day_window(-1);
                }
            }
            Action::Right => {
                if selected == FieldName::ALL.len() {
                    self.adjust_day_window(1);
                }
            }
            _ => {}
        }
    }

    /// Toggle a searched location. The field list is carried-forward state,
    /// not address state, so the search re-runs in place with a freshly
    /// derived request.
    fn toggle_field(&mut self, field: FieldName) {
        let locations = &mut self.state.search.defaults.locations;
        if let Some(pos) = locations.iter().position(|f| *f == field) {
            if locations.len() == 1 {
                self.state.set_status("At least one search field is required");
                return;
            }
            locations.remove(pos);
        } else {
            locations.push(field);
        }
        self.refresh_after_options_change();
    }

    /// Step the "search last N days" window through its presets; 0 means
    /// unbounded. Like field toggles, this re-runs in place.
    fn adjust_day_window(&mut self, dir: i64) {
        let days = self.state.search.defaults.days;
        let index = DAY_WINDOW_PRESETS
            .iter()
            .position(|d| *d >= days)
            .unwrap_or(0);
        let next = (index as i64 + dir).rem_euclid(DAY_WINDOW_PRESETS.len() as i64);
        self.state.search.defaults.days = DAY_WINDOW_PRESETS[next as usize];
        self.refresh_after_options_change();
    }

    fn refresh_after_options_change(&mut self) {
        let request = self
            .state
            .search
            .request()
            .with_locations(self.state.search.defaults.locations.clone());
        self.state.search.set_request(request);
        self.rerun_search();
    }
}
