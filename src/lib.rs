//! # Introduction
//!
//! labrun executes small practice programs one source line at a time, the way
//! a coding lab's "Run" button does: it validates the program, walks its lines
//! with a program counter, keeps a table of variables with synthetic display
//! addresses, and can stop at an input statement until the user types a value.
//! A terminal UI built with [ratatui](https://docs.rs/ratatui) plays the part
//! of the lab's editor and console.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Classifier → Validator → Interpreter → Console events → TUI / stdout
//! ```
//!
//! 1. [`parser`]: classifies each line and checks the whole program before it
//!    runs (missing `;`, use before declaration).
//! 2. [`interpreter`]: executes classified lines, evaluates expressions and
//!    formats output; suspends on input and resumes where it stopped.
//! 3. [`memory`]: tagged [`memory::value::Value`]s in an ordered
//!    [`memory::variables::Memory`].
//! 4. [`console`]: the append-only log of [`console::OutputEvent`]s.
//! 5. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Dialects
//!
//! C (`printf`/`scanf`, `;` required), Python (`print`/`input`, f-strings) and
//! JavaScript (`console.log`/`prompt`, template literals).
//!
//! ```
//! use labrun::interpreter::engine::{EngineConfig, Interpreter, Status};
//! use labrun::parser::ast::Dialect;
//!
//! let mut interp = Interpreter::new(EngineConfig::new(Dialect::C));
//! let status = interp.run("int age;\nscanf(\"%d\", &age);\nprintf(\"Age: %d\", age);");
//! assert_eq!(status, Status::WaitingForInput);
//! assert_eq!(interp.submit_input("21"), Ok(Status::Completed));
//! assert_eq!(interp.console().results().collect::<Vec<_>>(), vec!["Age: 21"]);
//! ```

pub mod console;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod ui;
