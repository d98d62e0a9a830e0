//! Runtime error types for the line interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! while a run executes (as opposed to syntax errors, which stop a run before it
//! starts), and [`InputError`], returned when input is submitted at the wrong time.
//!
//! All runtime errors are fatal - they emit one Error event and move the run to
//! `Failed`.

use super::engine::Status;
use crate::parser::ast::SourceLocation;
use std::fmt;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Read or write of a name that has no slot
    UnboundVariable {
        name: String,
        location: SourceLocation,
    },

    /// Malformed or unresolvable expression
    Evaluation {
        message: String,
        location: SourceLocation,
    },

    /// Division or modulo by zero
    DivisionByZero {
        operation: String,
        location: SourceLocation,
    },

    /// Integer overflow in arithmetic operation
    IntegerOverflow {
        operation: String,
        location: SourceLocation,
    },

    /// Operator applied to a value it does not accept
    TypeError {
        expected: String,
        got: String,
        location: SourceLocation,
    },

    /// Recognised statement that is not well formed (e.g. scanf without `&`)
    MalformedStatement {
        message: String,
        location: SourceLocation,
    },

    /// Submitted input cannot be converted for its target
    InvalidInput {
        message: String,
        location: SourceLocation,
    },
}

impl RuntimeError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            RuntimeError::UnboundVariable { location, .. } => location,
            RuntimeError::Evaluation { location, .. } => location,
            RuntimeError::DivisionByZero { location, .. } => location,
            RuntimeError::IntegerOverflow { location, .. } => location,
            RuntimeError::TypeError { location, .. } => location,
            RuntimeError::MalformedStatement { location, .. } => location,
            RuntimeError::InvalidInput { location, .. } => location,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnboundVariable { name, location } => {
                write!(f, "Unbound variable '{}' at line {}", name, location.line)
            }
            RuntimeError::Evaluation { message, location } => {
                write!(
                    f,
                    "Evaluation error at line {}: {}",
                    location.line, message
                )
            }
            RuntimeError::DivisionByZero {
                operation,
                location,
            } => {
                write!(f, "{} by zero at line {}", operation, location.line)
            }
            RuntimeError::IntegerOverflow {
                operation,
                location,
            } => {
                write!(
                    f,
                    "Integer overflow in operation: {} at line {}",
                    operation, location.line
                )
            }
            RuntimeError::TypeError {
                expected,
                got,
                location,
            } => {
                write!(
                    f,
                    "Type error at line {}: expected {}, got {}",
                    location.line, expected, got
                )
            }
            RuntimeError::MalformedStatement { message, location } => {
                write!(
                    f,
                    "Malformed statement at line {}: {}",
                    location.line, message
                )
            }
            RuntimeError::InvalidInput { message, location } => {
                write!(f, "Invalid input at line {}: {}", location.line, message)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Input submitted while the interpreter is not waiting for any
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    NotWaiting { status: Status },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NotWaiting { status } => {
                write!(f, "No input requested: the interpreter is {}", status)
            }
        }
    }
}

impl std::error::Error for InputError {}
