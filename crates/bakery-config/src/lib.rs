//! # Bakery Config
//!
//! Type-safe settings for the bakery translation engine.
//!
//! This crate provides the serializable engine settings, their defaults,
//! validation, and loading from TOML, YAML or JSON files with environment
//! overrides.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::*;
pub use schema::*;
pub use validator::*;
