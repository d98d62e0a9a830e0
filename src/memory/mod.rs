//! Memory model for the line interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (Int, Float, Char, Str, Bool)
//! - [`variables`]: Ordered variable slots with synthetic display addresses
//!
//! # Scope
//!
//! There is exactly one scope per run. Blocks do not introduce scopes, and a
//! second declaration of a name replaces the first slot.
//!
//! # Addresses
//!
//! Addresses are cosmetic. They are random, word-aligned values inside a
//! fixed window (see [`crate::interpreter::constants`]) and are only shown in
//! the memory pane and diagnostics.

pub mod value;
pub mod variables;

pub use value::{Address, Value};
pub use variables::{Memory, Variable};
