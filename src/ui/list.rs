//! Search/list view: query line, message table, pagination status and the
//! search options popup.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};

use crate::api::FieldName;
use crate::app::state::{AppState, ModalState};
use crate::constants::DATE_COLUMN_WIDTH;

use super::theme::Theme;
use super::widgets::{centered_rect, error_bar, help_bar, spinner_char, status_bar};

const HELP_HINTS: [(&str, &str); 8] = [
    ("j/k", "move"),
    ("Enter", "open"),
    ("/", "search"),
    ("f", "options"),
    ("n/p", "page"),
    ("[/]", "history"),
    ("r", "refresh"),
    ("q", "quit"),
];

pub fn render_list(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let error = state.search.result().error.as_deref();

    let mut constraints = vec![
        Constraint::Length(1), // query line
        Constraint::Min(1),    // table
    ];
    if error.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1)); // status bar
    constraints.push(Constraint::Length(1)); // help bar
    let chunks = Layout::vertical(constraints).split(area);

    render_query_line(frame, chunks[0], state);
    render_table(frame, chunks[1], state);

    let mut next = 2;
    if let Some(error) = error {
        error_bar(frame, chunks[next], error);
        next += 1;
    }
    render_status(frame, chunks[next], state);
    help_bar(frame, chunks[next + 1], &HELP_HINTS);

    if let ModalState::Options { selected } = state.modal {
        render_options(frame, area, state, selected);
    }
}

fn render_query_line(frame: &mut Frame, area: Rect, state: &AppState) {
    let line = if let Some(input) = state.modal.query_input() {
        Line::from(vec![
            Span::styled(" Search: ", Theme::title()),
            Span::styled(input.to_string(), Theme::text()),
            Span::styled("█", Theme::text_accent()),
        ])
    } else {
        let query = state.router.current().query();
        let query_span = if query.is_empty() {
            Span::styled("(all messages)", Theme::text_muted())
        } else {
            Span::styled(query.to_string(), Theme::text())
        };
        Line::from(vec![Span::styled(" Search: ", Theme::title()), query_span])
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let result = state.search.result();

    if result.emails.is_empty() {
        let text = if state.search.in_flight() {
            format!("{} loading...", spinner_char())
        } else {
            "No messages".to_string()
        };
        let paragraph = Paragraph::new(text)
            .style(Theme::text_muted())
            .centered();
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(["From", "To", "Subject", "Date", " "]).style(Theme::header_row());

    let rows = result.emails.iter().enumerate().map(|(i, summary)| {
        let style = if i == state.list.selected {
            Theme::selected()
        } else {
            Theme::text()
        };
        let delivered = if summary.delivered_at.is_some() {
            Cell::from("✓").style(if i == state.list.selected {
                style
            } else {
                Theme::delivered()
            })
        } else {
            Cell::from(" ")
        };
        Row::new(vec![
            Cell::from(summary.header.from.clone()),
            Cell::from(summary.header.to.clone()),
            Cell::from(summary.header.subject.clone()),
            Cell::from(summary.header.date.clone()),
            delivered,
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(22),
            Constraint::Percentage(22),
            Constraint::Fill(1),
            Constraint::Length(DATE_COLUMN_WIDTH),
            Constraint::Length(1),
        ],
    )
    .header(header)
    .column_spacing(1);

    frame.render_widget(table, area);
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let result = state.search.result();

    let mut left = format!("{} messages", result.total);
    if state.search.defaults.days > 0 {
        left.push_str(&format!(" · last {}d", state.search.defaults.days));
    }
    let fields = state
        .search
        .defaults
        .locations
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(",");
    left.push_str(&format!(" · in {}", fields));
    if !state.status.message.is_empty() {
        left.push_str(&format!(" · {}", state.status.message));
    }

    let right = if state.search.in_flight() {
        format!(
            "page {}/{} {}",
            result.current_page(),
            result.pages.max(1),
            spinner_char()
        )
    } else {
        format!("page {}/{}", result.current_page(), result.pages.max(1))
    };

    status_bar(frame, area, &left, &right);
}

/// Search options popup: field toggles plus the day window row.
fn render_options(frame: &mut Frame, area: Rect, state: &AppState, selected: usize) {
    let popup = centered_rect(area, 36, (FieldName::ALL.len() + 3) as u16);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Search options ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::popup())
        .border_style(Theme::border_focused());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = Vec::new();
    for (i, field) in FieldName::ALL.iter().enumerate() {
        let active = state.search.defaults.locations.contains(field);
        let marker = if active { "[x]" } else { "[ ]" };
        let style = if i == selected {
            Theme::selected()
        } else {
            Theme::text()
        };
        lines.push(Line::from(Span::styled(
            format!(" {} {} ", marker, field),
            style,
        )));
    }

    let days = state.search.defaults.days;
    let days_text = if days == 0 {
        " Days: all time ".to_string()
    } else {
        format!(" Days: last {} ", days)
    };
    let style = if selected == FieldName::ALL.len() {
        Theme::selected()
    } else {
        Theme::text()
    };
    lines.push(Line::from(Span::styled(days_text, style)));

    frame.render_widget(Paragraph::new(lines), inner);
}
