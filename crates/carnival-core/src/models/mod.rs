//! Data models for Carnival

mod font;
mod identity;
mod note;

pub use font::FontChoice;
pub use identity::Identity;
pub use note::{
    format_list_date, normalize_title, NewNote, Note, NoteId, NoteSummary, NoteUpdate,
    DEFAULT_TITLE, EMPTY_DOCUMENT,
};
