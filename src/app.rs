//! Application module: exposes the UI model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the selection, the
//! in-progress edit, the file list and the latest cursor samples. Track and
//! session state stay in the playback engine.

mod model;

pub use model::*;
