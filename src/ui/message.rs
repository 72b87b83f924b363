//! Single-message view: header block, scrollable body, re-delivery status.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::message::{LoadState, MessageView};
use crate::app::state::AppState;

use super::theme::Theme;
use super::widgets::{error_bar, help_bar, spinner_char, status_bar};

const HELP_HINTS: [(&str, &str); 5] = [
    ("j/k", "scroll"),
    ("d", "re-deliver"),
    ("Esc", "back"),
    ("]", "forward"),
    ("q", "quit"),
];

pub fn render_message(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let Some(view) = state.message.view() else {
        // Route switched but no message loaded yet, nothing to draw
        return;
    };
    let error = match &view.load {
        LoadState::Failed(e) => Some(e.as_str()),
        _ => view.send_error.as_deref(),
    };

    let mut constraints = vec![
        Constraint::Length(7), // header block
        Constraint::Min(1),    // body
    ];
    if error.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1)); // status bar
    constraints.push(Constraint::Length(1)); // help bar
    let chunks = Layout::vertical(constraints).split(area);

    render_header(frame, chunks[0], view);
    render_body(frame, chunks[1], view);

    let mut next = 2;
    if let Some(error) = error {
        error_bar(frame, chunks[next], error);
        next += 1;
    }
    render_status(frame, chunks[next], state, view);
    help_bar(frame, chunks[next + 1], &HELP_HINTS);
}

fn header_line(name: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:>10}: ", name), Theme::text_accent()),
        Span::styled(value.to_string(), Theme::text()),
    ])
}

fn render_header(frame: &mut Frame, area: Rect, view: &MessageView) {
    let block = Block::default()
        .title(format!(" Message {} ", view.id))
        .title_style(Theme::title())
        .borders(Borders::BOTTOM)
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    if let Some(detail) = view.detail() {
        lines.push(header_line("From", &detail.header.from));
        lines.push(header_line("To", &detail.header.to));
        lines.push(header_line("Subject", &detail.header.subject));
        lines.push(header_line("Date", &detail.header.date));
    }
    let delivered = match view.delivered_at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "no".to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{:>10}: ", "Delivered"), Theme::text_accent()),
        Span::styled(
            delivered,
            if view.delivered_at.is_some() {
                Theme::delivered()
            } else {
                Theme::text_muted()
            },
        ),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_body(frame: &mut Frame, area: Rect, view: &MessageView) {
    match &view.load {
        LoadState::Loading => {
            let paragraph = Paragraph::new(format!("{} loading...", spinner_char()))
                .style(Theme::text_muted())
                .centered();
            frame.render_widget(paragraph, area);
        }
        LoadState::Loaded(detail) => {
            let paragraph = Paragraph::new(detail.body.as_str())
                .style(Theme::text())
                .wrap(Wrap { trim: false })
                .scroll((view.scroll, 0));
            frame.render_widget(paragraph, area);
        }
        LoadState::Failed(_) => {
            let paragraph = Paragraph::new("Message could not be loaded")
                .style(Theme::text_muted())
                .centered();
            frame.render_widget(paragraph, area);
        }
    }
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState, view: &MessageView) {
    let left = if view.sending {
        format!("{} re-delivering...", spinner_char())
    } else if !state.status.message.is_empty() {
        state.status.message.clone()
    } else {
        String::new()
    };
    let right = format!("line {}", view.scroll + 1);
    status_bar(frame, area, &left, &right);
}
