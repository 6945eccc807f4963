//! Toggles a single symlink inside a vault directory and reports whether it is
//! present.

pub mod error;
pub mod host;
pub mod link;
pub mod plugin;
pub mod settings;
pub mod status;
pub mod ui;
