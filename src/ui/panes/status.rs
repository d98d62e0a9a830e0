//! Status bar rendering with keybindings and state indicators

use crate::interpreter::engine::Status;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

fn badge(status: Status) -> (&'static str, Color) {
    match status {
        Status::Idle => (" IDLE ", DEFAULT_THEME.muted),
        Status::Running => (" RUNNING ", DEFAULT_THEME.accent),
        Status::WaitingForInput => (" ⌨ INPUT ", DEFAULT_THEME.warning),
        Status::Completed => (" COMPLETED ", DEFAULT_THEME.success),
        Status::Failed => (" FAILED ", DEFAULT_THEME.error),
    }
}

/// Render the status bar at the bottom
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    status: Status,
    current_line: Option<usize>,
    is_playing: bool,
) {
    // Split status bar into left and right
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let (label, color) = badge(status);
    let line_text = match current_line {
        Some(line) => format!(" Line {} ", line),
        None => " Line - ".to_string(),
    };

    let left_spans = vec![
        Span::styled(
            label,
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            line_text,
            Style::default()
                .bg(DEFAULT_THEME.active_line_bg)
                .fg(DEFAULT_THEME.muted),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.active_line_bg)
                .fg(DEFAULT_THEME.muted),
        ),
        Span::styled(
            format!(" {} ", message),
            Style::default()
                .bg(DEFAULT_THEME.active_line_bg)
                .fg(if status == Status::Failed {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.fg
                }),
        ),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.active_line_bg))
        .alignment(Alignment::Left);

    frame.render_widget(left_paragraph, layout[0]);

    // Right side: Keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.muted).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.active_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.active_line_bg)
        .fg(DEFAULT_THEME.muted);

    let keybinds: &[(&str, &str)] = if status == Status::WaitingForInput {
        &[(" ↵ ", " submit "), (" ⌫ ", " delete "), (" Esc ", " clear ")]
    } else {
        &[
            (" r ", " run "),
            (" →/s ", " step "),
            (" ⎵ ", " play "),
            (" ↵ ", " continue "),
            (" c ", " clear "),
            (" Tab ", " focus "),
            (" q ", " quit "),
        ]
    };

    let mut right_spans = Vec::new();
    for (i, (key, desc)) in keybinds.iter().enumerate() {
        if i > 0 {
            right_spans.push(Span::styled("│", sep_style));
            right_spans.push(Span::styled(" ", desc_style));
        }
        right_spans.push(Span::styled(*key, key_style));
        right_spans.push(Span::styled(*desc, desc_style));
    }

    if is_playing {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            " ▶ PLAYING ",
            Style::default()
                .bg(DEFAULT_THEME.warning)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.active_line_bg))
        .alignment(Alignment::Right);

    frame.render_widget(right_paragraph, layout[1]);
}
