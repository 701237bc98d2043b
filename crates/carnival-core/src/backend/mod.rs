//! Backend collaborator: the hosted data API and its session provider.

mod memory;
mod supabase;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Identity, NewNote, Note, NoteId, NoteSummary, NoteUpdate};

pub use memory::{MemoryNotesBackend, Operation};
pub use supabase::SupabaseNotesBackend;

/// Remote operations against the `notes` table.
///
/// Row-level authorization is the backend's job: a note owned by another
/// identity must look exactly like a missing one.
#[async_trait]
pub trait NotesBackend: Send + Sync {
    /// Identity of the current session, if any
    async fn current_identity(&self) -> Result<Option<Identity>>;

    /// All notes owned by `owner`, most recently modified first
    async fn list_notes(&self, owner: &Identity) -> Result<Vec<NoteSummary>>;

    /// Fetch one note; `None` when absent or not visible to the session
    async fn get_note(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Insert a note and return the stored row
    async fn insert_note(&self, note: NewNote) -> Result<Note>;

    /// Overwrite title, content and `updated_at`
    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<()>;

    async fn delete_note(&self, id: &NoteId) -> Result<()>;
}

/// Backend handle shared between screens and background save tasks.
pub type SharedBackend = Arc<dyn NotesBackend>;
