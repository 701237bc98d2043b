//! In-process `NotesBackend` (primarily for tests).
//!
//! Emulates the hosted table closely enough to exercise every screen:
//! backend-assigned ids, owner-only row visibility, and zero-row updates and
//! deletes that succeed silently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::NotesBackend;
use crate::error::{Error, Result};
use crate::models::{Identity, NewNote, Note, NoteId, NoteSummary, NoteUpdate};

/// Backend operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Identity,
    List,
    Get,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct Table {
    rows: Vec<Note>,
    updates: Vec<(NoteId, NoteUpdate)>,
    failures: HashMap<Operation, usize>,
    insert_returns_nothing: bool,
}

impl Table {
    fn take_failure(&mut self, operation: Operation) -> Result<()> {
        if let Some(remaining) = self.failures.get_mut(&operation) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Backend(format!("simulated {operation:?} failure")));
            }
        }
        Ok(())
    }
}

/// Clones share both the table and the session; see [`Self::session_for`]
/// for a second session over the same table.
#[derive(Clone, Default)]
pub struct MemoryNotesBackend {
    table: Arc<Mutex<Table>>,
    identity: Arc<Mutex<Option<Identity>>>,
    latency: Option<Duration>,
}

impl MemoryNotesBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose session already belongs to `identity`.
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        let backend = Self::new();
        backend.sign_in_as(identity);
        backend
    }

    /// Delay every call by `latency` to make in-flight requests observable.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// A separate session, signed in as `identity`, over the same table.
    #[must_use]
    pub fn session_for(&self, identity: Identity) -> Self {
        Self {
            table: Arc::clone(&self.table),
            identity: Arc::new(Mutex::new(Some(identity))),
            latency: self.latency,
        }
    }

    pub fn sign_in_as(&self, identity: Identity) {
        *lock_unchecked(&self.identity) = Some(identity);
    }

    pub fn sign_out(&self) {
        lock_unchecked(&self.identity).take();
    }

    /// Make the next `times` calls of `operation` fail with a backend error.
    pub fn fail_next(&self, operation: Operation, times: usize) {
        lock_unchecked(&self.table).failures.insert(operation, times);
    }

    /// Make inserts store the row but report that nothing came back.
    pub fn set_insert_returns_nothing(&self, value: bool) {
        lock_unchecked(&self.table).insert_returns_nothing = value;
    }

    /// Store a row directly, bypassing ownership checks.
    pub fn seed(&self, note: Note) {
        lock_unchecked(&self.table).rows.push(note);
    }

    /// Read a row directly, bypassing ownership checks.
    #[must_use]
    pub fn row(&self, id: &NoteId) -> Option<Note> {
        lock_unchecked(&self.table)
            .rows
            .iter()
            .find(|note| note.id == *id)
            .cloned()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        lock_unchecked(&self.table).rows.len()
    }

    /// Every update received, in arrival order, including zero-row updates.
    #[must_use]
    pub fn updates(&self) -> Vec<(NoteId, NoteUpdate)> {
        lock_unchecked(&self.table).updates.clone()
    }

    fn session_identity(&self) -> Result<Option<Identity>> {
        Ok(self
            .identity
            .lock()
            .map_err(|error| Error::Backend(format!("memory session poisoned: {error}")))?
            .clone())
    }

    fn table(&self) -> Result<MutexGuard<'_, Table>> {
        self.table
            .lock()
            .map_err(|error| Error::Backend(format!("memory table poisoned: {error}")))
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn lock_unchecked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn visible_to(note: &Note, session: Option<&Identity>) -> bool {
    session.is_some_and(|identity| note.is_owned_by(identity))
}

#[async_trait]
impl NotesBackend for MemoryNotesBackend {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        self.simulate_latency().await;
        self.table()?.take_failure(Operation::Identity)?;
        self.session_identity()
    }

    async fn list_notes(&self, owner: &Identity) -> Result<Vec<NoteSummary>> {
        self.simulate_latency().await;
        let session = self.session_identity()?;
        let mut table = self.table()?;
        table.take_failure(Operation::List)?;

        let mut notes = table
            .rows
            .iter()
            .filter(|note| note.is_owned_by(owner) && visible_to(note, session.as_ref()))
            .map(Note::summary)
            .collect::<Vec<_>>();
        notes.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
        Ok(notes)
    }

    async fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        self.simulate_latency().await;
        let session = self.session_identity()?;
        let mut table = self.table()?;
        table.take_failure(Operation::Get)?;
        Ok(table
            .rows
            .iter()
            .find(|note| note.id == *id && visible_to(note, session.as_ref()))
            .cloned())
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note> {
        self.simulate_latency().await;
        let session = self.session_identity()?;
        let mut table = self.table()?;
        table.take_failure(Operation::Insert)?;

        let Some(identity) = session else {
            return Err(Error::AuthRequired);
        };
        if identity.id != note.user_id {
            return Err(Error::Backend(
                "new row violates row-level security policy for table \"notes\"".to_string(),
            ));
        }

        let now = Utc::now();
        let stored = Note {
            id: NoteId::new(),
            user_id: note.user_id,
            title: note.title,
            content: note.content,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(stored.clone());

        if table.insert_returns_nothing {
            return Err(Error::Backend("Insert did not return the new row".to_string()));
        }
        Ok(stored)
    }

    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<()> {
        self.simulate_latency().await;
        let session = self.session_identity()?;
        let mut table = self.table()?;
        table.take_failure(Operation::Update)?;
        table.updates.push((*id, update.clone()));

        if let Some(note) = table
            .rows
            .iter_mut()
            .find(|note| note.id == *id && visible_to(note, session.as_ref()))
        {
            note.title.clone_from(&update.title);
            note.content.clone_from(&update.content);
            note.updated_at = update.updated_at;
        }
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.simulate_latency().await;
        let session = self.session_identity()?;
        let mut table = self.table()?;
        table.take_failure(Operation::Delete)?;
        table
            .rows
            .retain(|note| !(note.id == *id && visible_to(note, session.as_ref())));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_TITLE;
    use pretty_assertions::assert_eq;

    fn alice() -> Identity {
        Identity::new("alice")
    }

    fn bob() -> Identity {
        Identity::new("bob")
    }

    #[tokio::test]
    async fn list_returns_only_owner_notes_newest_first() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let first = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        let second = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        backend
            .session_for(bob())
            .insert_note(NewNote::placeholder(&bob()))
            .await
            .unwrap();

        backend
            .update_note(
                &first.id,
                &NoteUpdate::new("First", "", second.updated_at + chrono::Duration::seconds(5)),
            )
            .await
            .unwrap();

        let notes = backend.list_notes(&alice()).await.unwrap();
        let ids = notes.iter().map(|note| note.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(backend.row_count(), 3);
    }

    #[tokio::test]
    async fn other_sessions_cannot_see_or_modify_rows() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let note = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        let intruder = backend.session_for(bob());

        assert!(intruder.get_note(&note.id).await.unwrap().is_none());
        assert!(intruder.list_notes(&alice()).await.unwrap().is_empty());

        intruder
            .update_note(&note.id, &NoteUpdate::new("pwned", "", Utc::now()))
            .await
            .unwrap();
        intruder.delete_note(&note.id).await.unwrap();

        let stored = backend.get_note(&note.id).await.unwrap().unwrap();
        assert_eq!(stored.title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn insert_requires_matching_session() {
        let backend = MemoryNotesBackend::new();
        assert!(matches!(
            backend.insert_note(NewNote::placeholder(&alice())).await,
            Err(Error::AuthRequired)
        ));

        backend.sign_in_as(bob());
        assert!(matches!(
            backend.insert_note(NewNote::placeholder(&alice())).await,
            Err(Error::Backend(_))
        ));
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let backend = MemoryNotesBackend::signed_in(alice());
        backend.fail_next(Operation::List, 1);
        assert!(backend.list_notes(&alice()).await.is_err());
        assert!(backend.list_notes(&alice()).await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_from_list() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let note = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        backend.delete_note(&note.id).await.unwrap();
        assert!(backend.list_notes(&alice()).await.unwrap().is_empty());
        assert!(backend.row(&note.id).is_none());
    }
}
