//! TUI pane rendering modules
//!
//! This module provides the rendering logic for all visual panes in the TUI,
//! organized by responsibility for maintainability.
//!
//! # Pane Modules
//!
//! - [`source`]: Source code display with syntax highlighting and current line indicator
//! - [`console`]: Console events colored by kind, plus the inline input line
//! - [`memory`]: Variable table with values, types and synthetic addresses
//! - [`status`]: Status bar with keybindings and run state
//!
//! Each pane module exports a primary `render_*` function. Panes are stateless
//! apart from the scroll state the app passes in.

pub mod console;
pub mod memory;
pub mod source;
pub mod status;

// Re-export render functions for convenience
pub use console::render_console_pane;
pub use memory::render_memory_pane;
pub use source::{render_source_pane, SourceScrollState};
pub use status::render_status_bar;
