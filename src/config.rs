//! Configuration loader and schema types.
//!
//! This module exposes the settings schema (listener, audio, timing, log and
//! the restored track list) and helpers to load it from disk and environment.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
