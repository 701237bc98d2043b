//! Creation flow: insert a placeholder note and open it.

use crate::backend::NotesBackend;
use crate::error::Error;
use crate::models::{NewNote, NoteId};

use super::Route;

/// Where the creation flow ended up.
#[derive(Debug)]
pub enum Creation {
    Created(NoteId),
    LoginRequired,
    /// Insert failed or returned no row; the user lands back on the list
    Failed(Error),
}

impl Creation {
    #[must_use]
    pub const fn route(&self) -> Route {
        match self {
            Self::Created(id) => Route::Edit(*id),
            Self::LoginRequired => Route::Login,
            Self::Failed(_) => Route::List,
        }
    }

    #[must_use]
    pub const fn note_id(&self) -> Option<NoteId> {
        match self {
            Self::Created(id) => Some(*id),
            _ => None,
        }
    }
}

/// Insert an untitled, empty note owned by the current session.
pub async fn create_note(backend: &dyn NotesBackend) -> Creation {
    let owner = match backend.current_identity().await {
        Ok(Some(owner)) => owner,
        Ok(None) => return Creation::LoginRequired,
        Err(error) => {
            tracing::warn!("Error creating note: {error}");
            return Creation::Failed(error);
        }
    };

    match backend.insert_note(NewNote::placeholder(&owner)).await {
        Ok(note) => {
            tracing::info!("Created note {}", note.id);
            Creation::Created(note.id)
        }
        Err(error) => {
            tracing::warn!("Error creating note: {error}");
            Creation::Failed(error)
        }
    }
}
