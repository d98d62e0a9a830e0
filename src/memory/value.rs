//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the tagged scalar every variable
//! slot holds. The source subset is untyped at runtime: a slot that holds an
//! `Int` may later hold a `Str`, so values carry their own tag instead of the
//! slot carrying a type.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 64-bit signed integer
//! - [`Value::Float`]: 64-bit float
//! - [`Value::Char`]: single character
//! - [`Value::Str`]: owned string
//! - [`Value::Bool`]: boolean (result of comparisons and logic)

use crate::parser::ast::{Coercion, TypeHint};
use std::fmt;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    Bool(bool),
}

/// Virtual address type
pub type Address = u64;

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl Value {
    /// Value a declaration without initializer starts with
    pub fn default_for(hint: TypeHint) -> Self {
        match hint {
            TypeHint::Integer | TypeHint::Dynamic => Value::Int(0),
            TypeHint::Float => Value::Float(0.0),
            TypeHint::Character => Value::Char('\0'),
            TypeHint::Boolean => Value::Bool(false),
            TypeHint::Text => Value::Str(String::new()),
        }
    }

    /// Short tag shown in the memory pane
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
        }
    }

    /// Integer view used by C-style promotion (chars and bools widen)
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Char(c) => Some(*c as i64),
            Value::Bool(b) => Some(*b as i64),
            Value::Float(x) if x.is_finite() => Some(x.trunc() as i64),
            _ => None,
        }
    }

    /// Floating view of any numeric value
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            other => other.to_int().map(|n| n as f64),
        }
    }

    /// C-style truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Char(c) => *c != '\0',
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    /// Convert an initializer to a declared type. Strings are left alone.
    pub fn coerce_to(self, hint: TypeHint) -> Value {
        let converted = match (hint, &self) {
            (TypeHint::Integer, Value::Float(_) | Value::Char(_) | Value::Bool(_)) => {
                self.to_int().map(Value::Int)
            }
            (TypeHint::Float, Value::Int(_) | Value::Char(_) | Value::Bool(_)) => {
                self.to_float().map(Value::Float)
            }
            (TypeHint::Character, Value::Int(n)) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char),
            (TypeHint::Boolean, Value::Int(_) | Value::Float(_) | Value::Char(_)) => {
                Some(Value::Bool(self.is_truthy()))
            }
            _ => None,
        };
        converted.unwrap_or(self)
    }

    /// Turn submitted input text into a value
    pub fn parse_input(text: &str, coercion: Coercion) -> Result<Value, String> {
        let text = text.trim();
        match coercion {
            Coercion::Auto => Ok(Self::parse_scalar(text)),
            Coercion::Integer => text
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("invalid integer input '{}'", text)),
            Coercion::Float => text
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("invalid number input '{}'", text)),
            Coercion::Character => text
                .chars()
                .next()
                .map(Value::Char)
                .ok_or_else(|| "expected a character, got empty input".to_string()),
            Coercion::Text => Ok(Value::Str(text.to_string())),
        }
    }

    /// Numeric if it parses as a number, text otherwise
    pub fn parse_scalar(text: &str) -> Value {
        if let Ok(n) = text.parse::<i64>() {
            Value::Int(n)
        } else if let Some(x) = text.parse::<f64>().ok().filter(|x| x.is_finite()) {
            Value::Float(x)
        } else {
            Value::Str(text.to_string())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}
