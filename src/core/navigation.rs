//! Forced-logout navigation
//!
//! When a session cannot be recovered the client sends the user back to the
//! login entry point. In the browser that is a full page navigation; headless
//! embedders log or record it instead.

use std::sync::{Mutex, PoisonError};

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Full client-side navigation through `window.location.href`
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

#[cfg(feature = "hydrate")]
impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            tracing::error!("No window available to navigate to {}", path);
            return;
        };
        if let Err(e) = window.location().set_href(path) {
            tracing::error!("Failed to navigate to {}: {:?}", path, e);
        }
    }
}

/// Navigator for native builds; there is no page to leave, so it only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::warn!("Session ended, sign in again at {}", path);
    }
}

/// Records every navigation instead of performing it
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visited().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
