//! Host collaborators
//!
//! The toggle only needs three things from whoever hosts it: a way to map the
//! vault onto the filesystem, a sink for transient notices and a surface for
//! the persistent status label.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;

/// Storage backend of the vault the link lives in.
pub trait VaultAdapter: Send + Sync {
    /// Absolute on-disk root of the vault, or `None` when the vault is not
    /// backed by a real filesystem.
    fn base_path(&self) -> Option<&Path>;
}

/// Vault stored in a directory on disk
#[derive(Debug, Clone)]
pub struct FileSystemAdapter {
    base: PathBuf,
}

impl FileSystemAdapter {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl VaultAdapter for FileSystemAdapter {
    fn base_path(&self) -> Option<&Path> {
        Some(&self.base)
    }
}

/// Vault with no filesystem behind it. Every toggle against it fails with a
/// configuration error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedAdapter;

impl VaultAdapter for DetachedAdapter {
    fn base_path(&self) -> Option<&Path> {
        None
    }
}

/// Fire-and-forget sink for transient messages.
pub trait Notifier: Send + Sync {
    fn notice(&self, message: &str);

    /// A notice reporting a failure. Sinks that keep no distinction show it
    /// like any other notice.
    fn error(&self, message: &str) {
        self.notice(message);
    }
}

/// Prints notices on stdout and failures on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notice(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{message}");
    }
}

impl Notifier for UnboundedSender<String> {
    fn notice(&self, message: &str) {
        // The receiving UI may already be gone during shutdown.
        if self.send(message.to_owned()).is_err() {
            info!("{message}");
        }
    }
}

/// Keeps every notice in memory
#[derive(Debug, Clone, Default)]
pub struct NoticeLog(Arc<Mutex<Vec<String>>>);

impl NoticeLog {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl Notifier for NoticeLog {
    fn notice(&self, message: &str) {
        match self.0.lock() {
            Ok(mut log) => log.push(message.to_owned()),
            Err(_) => warn!("notice log poisoned, dropping: {message}"),
        }
    }
}

/// Persistent one-line text surface.
pub trait StatusSurface: Send + Sync {
    fn set_text(&self, text: &str);
}

/// Status text shared with whoever renders it
#[derive(Debug, Clone, Default)]
pub struct StatusLine(Arc<Mutex<String>>);

impl StatusLine {
    pub fn text(&self) -> String {
        self.0.lock().map(|text| text.clone()).unwrap_or_default()
    }
}

impl StatusSurface for StatusLine {
    fn set_text(&self, text: &str) {
        if let Ok(mut current) = self.0.lock() {
            text.clone_into(&mut current);
        }
    }
}

/// The collaborators a host hands to [`crate::plugin::start`]
pub struct Host {
    pub adapter: Box<dyn VaultAdapter>,
    pub notifier: Box<dyn Notifier>,
    pub status: Box<dyn StatusSurface>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_detached_adapter_has_no_base() {
        assert!(DetachedAdapter.base_path().is_none());
        assert_eq!(
            FileSystemAdapter::new("/vault").base_path(),
            Some(Path::new("/vault"))
        );
    }

    #[test]
    fn test_channel_notifier_delivers_in_order() {
        let (tx, mut rx) = unbounded_channel();
        tx.notice("first");
        tx.notice("second");

        assert_eq!(rx.try_recv().as_deref(), Ok("first"));
        assert_eq!(rx.try_recv().as_deref(), Ok("second"));
    }

    #[test]
    fn test_status_line_keeps_latest_text() {
        let status = StatusLine::default();
        status.set_text("Symlink: clear");
        status.set_text("Symlink: present");

        assert_eq!(status.text(), "Symlink: present");
    }
}
