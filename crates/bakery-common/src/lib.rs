//! # Bakery Common
//!
//! Shared types, utilities, and common functionality for the bakery
//! translation engine.
//!
//! This crate provides the foundational aliases, the shared error type and
//! the value helpers used across all other crates in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use types::*;
pub use utils::*;
