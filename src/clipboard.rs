use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// How long a link shows its "Copied!" marker.
pub const COPIED_TTL: Duration = Duration::from_millis(2000);

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard, opened per copy.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
            .context("clipboard unavailable")
    }
}

/// Per-link "Copied!" markers, each expiring on its own.
#[derive(Debug, Default, Clone)]
pub struct CopyIndicator {
    expires: BTreeMap<usize, Instant>,
}

impl CopyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, index: usize, now: Instant) {
        self.expires.insert(index, now + COPIED_TTL);
    }

    pub fn is_copied(&self, index: usize) -> bool {
        self.expires.contains_key(&index)
    }

    /// Drops expired markers. Returns true when any were removed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let before = self.expires.len();
        self.expires.retain(|_, deadline| now < *deadline);
        self.expires.len() != before
    }
}
