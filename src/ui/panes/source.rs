//! Source code pane rendering with syntax highlighting
//!
//! This module renders the source code pane, which displays the program being
//! executed with basic syntax highlighting and execution indicators.
//!
//! # Features
//!
//! - Highlighting for keywords, types, strings, numbers and comments of all three dialects
//! - Current line highlighting; the failing line in red, a line waiting for input in orange
//! - Scroll state that keeps the current line at a fixed row while stepping
//! - Line numbering

use crate::parser::ast::Dialect;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Simple syntax highlighting for one line
fn highlight_source_code(line: &str, dialect: Dialect) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (byte_idx, c) = chars[i];

        let starts_comment = (c == '/'
            && dialect.slash_is_comment()
            && chars.get(i + 1).is_some_and(|&(_, n)| n == '/'))
            || (c == '#' && dialect.hash_is_comment());
        if starts_comment {
            flush_word(&mut spans, &mut current_word, false);
            spans.push(Span::styled(
                line[byte_idx..].to_string(),
                Style::default().fg(DEFAULT_THEME.muted),
            ));
            return Line::from(spans);
        }

        if matches!(c, '"' | '\'' | '`') {
            flush_word(&mut spans, &mut current_word, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                end += if chars[end].1 == '\\' { 2 } else { 1 };
            }
            end = (end + 1).min(chars.len());
            let end_byte = chars.get(end).map_or(line.len(), |&(b, _)| b);
            spans.push(Span::styled(
                line[byte_idx..end_byte].to_string(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            flush_word(&mut spans, &mut current_word, c == '(');

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.accent),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, false);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'_>>, word: &mut String, is_function: bool) {
    if !word.is_empty() {
        let style = get_keyword_style(word, is_function);
        spans.push(Span::styled(std::mem::take(word), style));
    }
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match word {
        "int" | "char" | "void" | "bool" | "float" | "double" | "long" | "short" | "unsigned"
        | "signed" | "const" | "string" | "let" | "var" => {
            Style::default().fg(DEFAULT_THEME.type_name) // Types
        }
        "return" | "if" | "else" | "elif" | "while" | "for" | "def" | "function" | "pass"
        | "and" | "or" | "not" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "NULL" | "True" | "False" | "None" | "true" | "false" | "null" => {
            Style::default().fg(DEFAULT_THEME.number) // Constants
        }
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_function => Style::default().fg(DEFAULT_THEME.builtin),
        _ => Style::default().fg(DEFAULT_THEME.fg), // Variables/Identifiers
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    pub target_line_row: Option<usize>,
}

/// What the source pane shows
pub struct SourceView<'a> {
    pub source_code: &'a str,
    pub dialect: Dialect,
    /// Line about to execute (1-indexed)
    pub current_line: Option<usize>,
    /// Line whose error failed the run
    pub error_line: Option<usize>,
    pub waiting_for_input: bool,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    view: &SourceView<'_>,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Source Code ({}) ", view.dialect))
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = view.source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1

    // Keep the highlighted line at a fixed visual row
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    let focus_line = view.error_line.or(view.current_line).unwrap_or(0);
    if focus_line > 0 && focus_line <= total_lines {
        scroll_state.offset = (focus_line - 1).saturating_sub(target_row);
        if total_lines > visible_height {
            scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_error = view.error_line == Some(line_num);
            let is_current = view.current_line == Some(line_num);
            let is_input = is_current && view.waiting_for_input;

            let (num_style, content_style) = if is_error {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Some(
                        Style::default()
                            .bg(DEFAULT_THEME.error)
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                )
            } else if is_input {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.warning)
                        .add_modifier(Modifier::BOLD),
                    Some(
                        Style::default()
                            .bg(DEFAULT_THEME.warning)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    ),
                )
            } else if is_current {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.warning)
                        .add_modifier(Modifier::BOLD),
                    None,
                )
            } else {
                (Style::default().fg(DEFAULT_THEME.muted), None)
            };

            let mut content_line = highlight_source_code(line, view.dialect);
            match content_style {
                // Error and input lines override the highlighting
                Some(style) => {
                    for span in &mut content_line.spans {
                        span.style = style;
                    }
                }
                None if is_current => {
                    let bg = Style::default().bg(DEFAULT_THEME.active_line_bg);
                    for span in &mut content_line.spans {
                        span.style = span.style.patch(bg);
                    }
                }
                None => {}
            }

            let mut spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
            spans.extend(content_line.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line<'_>) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        let line = highlight_source_code("x = 1  # note", Dialect::Python);
        assert_eq!(texts(&line).last().map(String::as_str), Some("# note"));
    }

    #[test]
    fn test_string_is_one_span() {
        let line = highlight_source_code(r#"printf("a \"b\"");"#, Dialect::C);
        assert!(texts(&line).contains(&r#""a \"b\"""#.to_string()));
    }

    #[test]
    fn test_type_and_call_colours() {
        let line = highlight_source_code("string s; scanf(&s);", Dialect::C);
        let colour_of = |word: &str| {
            line.spans
                .iter()
                .find(|s| s.content == word)
                .and_then(|s| s.style.fg)
        };
        assert_eq!(colour_of("string"), Some(DEFAULT_THEME.type_name));
        assert_eq!(colour_of("scanf"), Some(DEFAULT_THEME.builtin));
        assert_eq!(colour_of("s"), Some(DEFAULT_THEME.fg));
    }
}
