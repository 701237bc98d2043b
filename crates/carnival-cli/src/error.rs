use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] carnival_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Invalid note ID '{0}'")]
    InvalidNoteId(String),
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Not signed in. Run `carnival auth login --email <email> --password <password>`.")]
    NotSignedIn,
    #[error(
        "Supabase is not configured. Run `carnival config init` or set SUPABASE_URL and SUPABASE_ANON_KEY."
    )]
    NotConfigured,
    #[error("Save failed: {0}")]
    SaveFailed(String),
    #[error("{0}")]
    DeleteFailed(String),
    #[error("Could not create note: {0}")]
    CreateFailed(String),
}
