//! Presence indicator shown on the host's status surface

use std::sync::Mutex;

use crate::host::StatusSurface;

const PRESENT: &str = "Symlink: present";
const CLEAR: &str = "Symlink: clear";

/// Label for a known presence state
pub fn presence_label(present: bool) -> &'static str {
    if present { PRESENT } else { CLEAR }
}

/// Cached presence of the link
///
/// Only ever updated from a completed query or a successful toggle. Until the
/// first one the surface is left blank.
#[derive(Debug, Default)]
pub struct StatusIndicator {
    present: Mutex<Option<bool>>,
}

impl StatusIndicator {
    pub fn present(&self) -> Option<bool> {
        self.present.lock().ok().and_then(|present| *present)
    }

    /// Cache `present` and render it onto `surface`
    pub fn update(&self, present: bool, surface: &dyn StatusSurface) {
        if let Ok(mut cached) = self.present.lock() {
            *cached = Some(present);
        }
        surface.set_text(presence_label(present));
    }

    pub fn clear(&self, surface: &dyn StatusSurface) {
        if let Ok(mut cached) = self.present.lock() {
            *cached = None;
        }
        surface.set_text("");
    }
}
