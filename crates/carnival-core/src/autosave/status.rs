//! Save status shown next to the editor.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Everything edited so far has been persisted
    Saved,
    /// An edit is waiting for its quiet period or its write is in flight
    Saving,
    /// The most recent write failed; the buffer still holds the edits
    Failed(String),
}

impl SaveStatus {
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        matches!(self, Self::Saving)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Indicator text for the status bar
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Saved => "Saved",
            Self::Saving => "Saving...",
            Self::Failed(_) => "Save failed - retry",
        }
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "{} ({reason})", self.label()),
            _ => f.write_str(self.label()),
        }
    }
}

/// Which debounce an edit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Content,
    Title,
}

/// Bookkeeping from which the status is derived.
#[derive(Debug, Default)]
pub(crate) struct SaveTracker {
    content_pending: bool,
    title_pending: bool,
    in_flight: usize,
    last_error: Option<String>,
}

impl SaveTracker {
    pub(crate) fn mark_pending(&mut self, kind: SaveKind) {
        match kind {
            SaveKind::Content => self.content_pending = true,
            SaveKind::Title => self.title_pending = true,
        }
    }

    pub(crate) fn clear_pending(&mut self, kind: SaveKind) -> bool {
        let slot = match kind {
            SaveKind::Content => &mut self.content_pending,
            SaveKind::Title => &mut self.title_pending,
        };
        std::mem::replace(slot, false)
    }

    pub(crate) fn clear_all_pending(&mut self) -> bool {
        let content = self.clear_pending(SaveKind::Content);
        let title = self.clear_pending(SaveKind::Title);
        content || title
    }

    pub(crate) fn start_write(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn finish_write(&mut self, outcome: Result<(), String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.last_error = outcome.err();
    }

    /// The most recent write failed, whatever is pending since.
    pub(crate) const fn has_failed(&self) -> bool {
        self.last_error.is_some()
    }

    pub(crate) fn status(&self) -> SaveStatus {
        if self.content_pending || self.title_pending || self.in_flight > 0 {
            SaveStatus::Saving
        } else if let Some(reason) = &self.last_error {
            SaveStatus::Failed(reason.clone())
        } else {
            SaveStatus::Saved
        }
    }
}
