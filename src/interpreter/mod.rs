//! Line interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Line-by-line state machine with suspend/resume for input
//! - [`expressions`]: Sandboxed expression parser and evaluator
//! - [`format`]: `printf`, `print` and template output formatting
//! - [`errors`]: Runtime error types
//! - [`constants`]: Address window and fixed console messages
//!
//! # Execution Model
//!
//! Every source line is classified once when a run starts. The engine then
//! walks the classified lines with a program counter, mutating one
//! [`ExecutionState`](engine::ExecutionState) and appending events to the
//! [`Console`](crate::console::Console). The only point where a run yields is
//! an input statement.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod format;
