//! Source line analysis
//!
//! This module turns raw source text into classified statements:
//! - [`lexer`]: Expression tokenization plus literal-aware line scanning helpers
//! - [`classify`]: Pattern-based line classifier (line → [`ast::Statement`])
//! - [`ast`]: Statement vocabulary, dialects and source locations
//! - [`validate`]: Whole-program syntax pre-pass
//!
//! # Supported Subset
//!
//! One statement per line, in C, Python or JavaScript surface syntax:
//! - Declarations (typed in C, `let`/`const`/`var` in JavaScript, implicit in Python)
//! - Assignments, including compound forms and `++`/`--`
//! - Single-level `if`/`else` (`else if`/`elif` chains allowed)
//! - Input (`scanf`, `input`, `prompt`) and output (`printf`, `print`, `console.log`)
//!
//! Loops, functions, arrays and pointers are outside the subset. Lines the
//! classifier does not recognise are reported as [`ast::Statement::Unknown`].

pub mod ast;
pub mod classify;
pub mod lexer;
pub mod validate;
