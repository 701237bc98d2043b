//! Headless screens: list, creation and edit.
//!
//! Each screen resolves the current identity on its own and reports where to
//! navigate next as a [`Route`]; the hosting shell does the rendering.

pub mod create;
pub mod editor;
pub mod list;
mod notification;
mod route;

pub use create::{create_note, Creation};
pub use editor::{page_title, Access, EditorSession, EditorState};
pub use list::{DeleteOutcome, ListMount, NoteList};
pub use notification::{Notification, NotificationKind};
pub use route::{Route, FALLBACK_TITLE, NOT_FOUND_TITLE};
