//! # Bakery Plugins
//!
//! Ready-made extensions for the translation engine:
//!
//! * [`CapitalizePlugin`] - `_upper`, `_lower`, `_capitalize` and `_title`
//!   key suffixes
//! * [`NumberFormatPlugin`] - `{amount|currency:EUR}` style number tokens
//! * [`HttpBackend`] - loads namespaces over HTTP
//! * [`StaticLoader`] - serves embedded namespaces
//! * [`LogSaver`] and [`MemorySaver`] - missing-key savers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod capitalize;
pub mod error;
pub mod http_backend;
pub mod log_saver;
pub mod memory_saver;
pub mod number_format;
pub mod static_loader;

pub use capitalize::CapitalizePlugin;
pub use error::{PluginError, PluginResult};
pub use http_backend::{HttpBackend, HttpBackendConfig};
pub use log_saver::LogSaver;
pub use memory_saver::{MemorySaver, MissingEntry};
pub use number_format::NumberFormatPlugin;
pub use static_loader::StaticLoader;
