//! carnival-core - Core library for Carnival
//!
//! This crate contains the note model, the backend collaborator (Supabase or
//! in-memory), the list/creation/edit screens, and the debounced autosave
//! engine used by every Carnival interface.

pub mod auth;
pub mod autosave;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod views;

pub use error::{Error, Result};
pub use models::{FontChoice, Identity, Note, NoteId, NoteSummary};
