//! Console pane rendering

use crate::console::{Console, EventKind};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

fn event_style(kind: EventKind) -> Style {
    match kind {
        EventKind::System => Style::default().fg(DEFAULT_THEME.muted),
        EventKind::Result => Style::default().fg(DEFAULT_THEME.fg),
        EventKind::Error => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD),
        EventKind::Success => Style::default().fg(DEFAULT_THEME.success),
        EventKind::Input => Style::default().fg(DEFAULT_THEME.echo),
    }
}

/// Inline input line shown while the run waits for input
pub struct InputLine<'a> {
    pub prompt: &'a str,
    pub buffer: &'a str,
}

/// Render the console pane
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    console: &Console,
    input: Option<InputLine<'_>>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if console.is_empty() && input.is_none() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.muted));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let mut all_items: Vec<ListItem> = console
        .events()
        .iter()
        .flat_map(|event| {
            // Multi-line results render one row per line
            let style = event_style(event.kind);
            let prefix = if event.kind == EventKind::Input { "> " } else { "" };
            event
                .message
                .split('\n')
                .map(move |line| ListItem::new(format!("{}{}", prefix, line)).style(style))
                .collect::<Vec<_>>()
        })
        .collect();

    if let Some(input) = input {
        all_items.push(
            ListItem::new(input.prompt.to_string()).style(Style::default().fg(DEFAULT_THEME.warning)),
        );
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(DEFAULT_THEME.warning)),
            Span::styled(input.buffer.to_string(), Style::default().fg(DEFAULT_THEME.echo)),
            Span::styled(
                "█",
                Style::default()
                    .fg(DEFAULT_THEME.warning)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ])));
    }

    // Calculate visible range for scrolling
    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1

    // Clamp scroll offset only if content exceeds visible area
    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}
