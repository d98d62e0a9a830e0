//! Colour palette shared by every pane

use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    /// Brackets and the running badge
    pub accent: Color,
    /// Input prompts and the waiting-for-input highlight
    pub warning: Color,
    /// Comments and secondary text
    pub muted: Color,
    pub success: Color,
    pub error: Color,
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    /// Background of the line about to execute
    pub active_line_bg: Color,
    /// Names in call position
    pub builtin: Color,
    pub type_name: Color,
    /// Text the user typed, echoed back on the console
    pub echo: Color,
}

/// Warm dark palette, readable on 256-colour terminals
pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(220, 215, 200),
    accent: Color::Rgb(120, 170, 200),
    warning: Color::Rgb(230, 165, 80),
    muted: Color::Rgb(125, 120, 110),
    success: Color::Rgb(150, 190, 110),
    error: Color::Rgb(220, 95, 85),
    keyword: Color::Rgb(200, 130, 180),
    string: Color::Rgb(170, 200, 120),
    number: Color::Rgb(210, 150, 110),
    border_focused: Color::Rgb(230, 200, 110),
    border_normal: Color::Rgb(85, 80, 75),
    active_line_bg: Color::Rgb(55, 50, 45),
    builtin: Color::Rgb(110, 190, 180),
    type_name: Color::Rgb(230, 200, 110),
    echo: Color::Rgb(190, 160, 220),
};
