//! Note model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::Identity;

/// Title shown and persisted when a note's title is empty or whitespace-only.
pub const DEFAULT_TITLE: &str = "Untitled Note";

/// Serialized form of an empty rich-text document.
pub const EMPTY_DOCUMENT: &str = "<p></p>";

/// A unique identifier for a note, assigned by the backend on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// A row of the `notes` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Backend-assigned identifier
    pub id: NoteId,
    /// Owning identity, set once at creation
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Serialized rich-text document
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    #[must_use]
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        self.user_id == identity.id
    }

    /// Title for display, falling back to the placeholder when empty
    #[must_use]
    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }

    /// Document to hand to the rich-text surface; never empty
    #[must_use]
    pub fn document(&self) -> &str {
        if self.content.is_empty() {
            EMPTY_DOCUMENT
        } else {
            &self.content
        }
    }

    #[must_use]
    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// The list projection of a note: `id, title, content, updated_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: NoteId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl NoteSummary {
    #[must_use]
    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }

    /// Short date of the last modification in the local time zone
    #[must_use]
    pub fn display_date(&self) -> String {
        format_list_date(&self.updated_at.with_timezone(&chrono::Local))
    }
}

/// Insert payload for a new note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub user_id: String,
}

impl NewNote {
    /// The row inserted by the creation flow: placeholder title, empty content.
    #[must_use]
    pub fn placeholder(owner: &Identity) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            user_id: owner.id.clone(),
        }
    }
}

/// Update payload; every save writes title and content together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteUpdate {
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl NoteUpdate {
    /// Build an update, applying the title defaulting rule.
    #[must_use]
    pub fn new(title: &str, content: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            title: normalize_title(title),
            content: content.into(),
            updated_at,
        }
    }
}

/// Trim a title and substitute the placeholder when nothing is left.
///
/// ```
/// use carnival_core::models::normalize_title;
///
/// assert_eq!(normalize_title("  Groceries "), "Groceries");
/// assert_eq!(normalize_title(" \t "), "Untitled Note");
/// ```
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Render a date the way the note list shows it, e.g. `Oct 16, 2026`.
pub fn format_list_date<Tz: TimeZone>(date_time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    date_time.format("%b %-d, %Y").to_string()
}

fn display_title(title: &str) -> &str {
    if title.is_empty() {
        DEFAULT_TITLE
    } else {
        title
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
