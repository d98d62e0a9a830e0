//! Memory pane rendering
//!
//! Lists every live variable in declaration order with its type, current
//! value and synthetic address. Strings and chars are shown quoted so an empty
//! string is still visible.

use crate::interpreter::format::render_value;
use crate::memory::{Memory, Value, Variable};
use crate::parser::ast::Dialect;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

fn value_span(value: &Value, dialect: Dialect) -> Span<'static> {
    match value {
        Value::Str(s) => Span::styled(
            format!("\"{}\"", s.escape_default()),
            Style::default().fg(DEFAULT_THEME.string),
        ),
        Value::Char(c) => Span::styled(
            format!("'{}'", c.escape_default()),
            Style::default().fg(DEFAULT_THEME.string),
        ),
        other => Span::styled(
            render_value(other, dialect),
            Style::default().fg(DEFAULT_THEME.number),
        ),
    }
}

fn variable_line(var: &Variable, dialect: Dialect, name_width: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<width$}", var.name, width = name_width),
            Style::default()
                .fg(DEFAULT_THEME.fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {:<6} ", var.value.type_name()),
            Style::default().fg(DEFAULT_THEME.type_name),
        ),
        Span::styled("= ", Style::default().fg(DEFAULT_THEME.muted)),
        value_span(&var.value, dialect),
        Span::styled(
            format!("  @ {}", var.display_address()),
            Style::default().fg(DEFAULT_THEME.muted),
        ),
    ])
}

/// Render the memory pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    memory: &Memory,
    dialect: Dialect,
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
        .title(format!(" Memory ({}) ", memory.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let all_items: Vec<ListItem> = if memory.is_empty() {
        vec![ListItem::new("(empty)").style(Style::default().fg(DEFAULT_THEME.muted))]
    } else {
        let name_width = memory.variables().map(|v| v.name.len()).max().unwrap_or(0);
        memory
            .variables()
            .map(|var| ListItem::new(variable_line(var, dialect, name_width)))
            .collect()
    };

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_line_shows_address() {
        let mut memory = Memory::with_seed(1);
        memory.declare("age", Value::Int(21));
        let var = memory.get("age").cloned().unwrap();
        let text: String = variable_line(&var, Dialect::C, 3)
            .spans
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert!(text.starts_with("age int"));
        assert!(text.contains("= 21"));
        assert!(text.ends_with(&var.display_address()));
    }
}
