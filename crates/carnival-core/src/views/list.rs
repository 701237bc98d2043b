//! Note list screen.

use crate::backend::SharedBackend;
use crate::models::{Identity, NoteId, NoteSummary};

use super::{Notification, Route};

pub const LOAD_FAILED: &str = "Failed to load notes";
pub const DELETE_SUCCEEDED: &str = "Note deleted successfully";
pub const DELETE_FAILED: &str = "Failed to delete note";
pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this note? This action cannot be undone.";
pub const EMPTY_MESSAGE: &str =
    "No notes yet. Create your first note by clicking the button above.";

/// Result of mounting the list screen.
pub enum ListMount {
    Ready(NoteList),
    Redirect(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user did not confirm; nothing was sent
    Declined,
    /// The id is not one of the listed notes
    NotListed,
    Deleted,
    /// The backend rejected the delete; the row stays listed
    Failed,
}

pub struct NoteList {
    backend: SharedBackend,
    /// Unknown until an identity lookup succeeds
    owner: Option<Identity>,
    notes: Vec<NoteSummary>,
    deleting: Option<NoteId>,
    notification: Option<Notification>,
}

impl NoteList {
    /// Resolve the session and fetch its notes.
    ///
    /// A missing or rejected session redirects to login. A transient failure
    /// of either lookup still mounts the screen, empty, with an error
    /// notification.
    pub async fn mount(backend: SharedBackend) -> ListMount {
        let owner = match backend.current_identity().await {
            Ok(Some(owner)) => Some(owner),
            Ok(None) => return ListMount::Redirect(Route::Login),
            Err(error) if error.is_transient() => {
                tracing::warn!("Failed to resolve session for note list: {error}");
                None
            }
            Err(error) => {
                tracing::warn!("Session rejected: {error}");
                return ListMount::Redirect(Route::Login);
            }
        };

        let mut list = Self {
            backend,
            owner,
            notes: Vec::new(),
            deleting: None,
            notification: None,
        };
        if list.owner.is_some() {
            list.refresh().await;
        } else {
            list.notification = Some(Notification::error(LOAD_FAILED));
        }
        ListMount::Ready(list)
    }

    /// Refetch from the backend, replacing whatever is held locally.
    ///
    /// Resolves the owner first if the mount could not. On failure the
    /// current rows stay and an error notification is set.
    pub async fn refresh(&mut self) {
        let owner = match &self.owner {
            Some(owner) => owner.clone(),
            None => match self.backend.current_identity().await {
                Ok(Some(owner)) => {
                    self.owner = Some(owner.clone());
                    owner
                }
                Ok(None) => {
                    tracing::warn!("No session while refreshing notes");
                    self.notification = Some(Notification::error(LOAD_FAILED));
                    return;
                }
                Err(error) => {
                    tracing::warn!("Failed to resolve session for note list: {error}");
                    self.notification = Some(Notification::error(LOAD_FAILED));
                    return;
                }
            },
        };

        match self.backend.list_notes(&owner).await {
            Ok(notes) => {
                tracing::debug!("Listed {} notes", notes.len());
                self.notes = notes;
            }
            Err(error) => {
                tracing::warn!("Failed to load notes: {error}");
                self.notification = Some(Notification::error(LOAD_FAILED));
            }
        }
    }

    /// Identity whose notes are listed, once known.
    #[must_use]
    pub const fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    #[must_use]
    pub fn notes(&self) -> &[NoteSummary] {
        &self.notes
    }

    #[must_use]
    pub fn find(&self, id: &NoteId) -> Option<&NoteSummary> {
        self.notes.iter().find(|note| note.id == *id)
    }

    /// Message to show instead of rows, if there are none.
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        self.notes.is_empty().then_some(EMPTY_MESSAGE)
    }

    #[must_use]
    pub fn is_deleting(&self, id: &NoteId) -> bool {
        self.deleting.as_ref() == Some(id)
    }

    #[must_use]
    pub const fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    /// Delete a listed note after `confirm` accepts the prompt.
    ///
    /// On success the row is dropped locally without refetching.
    pub async fn delete<F>(&mut self, id: NoteId, confirm: F) -> DeleteOutcome
    where
        F: FnOnce(&NoteSummary, &str) -> bool,
    {
        let Some(note) = self.find(&id) else {
            return DeleteOutcome::NotListed;
        };
        if !confirm(note, DELETE_PROMPT) {
            return DeleteOutcome::Declined;
        }

        self.deleting = Some(id);
        let result = self.backend.delete_note(&id).await;
        self.deleting = None;

        match result {
            Ok(()) => {
                self.notes.retain(|note| note.id != id);
                self.notification = Some(Notification::success(DELETE_SUCCEEDED));
                tracing::info!("Deleted note {id}");
                DeleteOutcome::Deleted
            }
            Err(error) => {
                tracing::warn!("Failed to delete note {id}: {error}");
                self.notification = Some(Notification::error(DELETE_FAILED));
                DeleteOutcome::Failed
            }
        }
    }
}

/// Route opened by selecting a row.
#[must_use]
pub const fn row_route(note: &NoteSummary) -> Route {
    Route::Edit(note.id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::{MemoryNotesBackend, NotesBackend, Operation};
    use crate::models::{NewNote, NoteUpdate, DEFAULT_TITLE};
    use pretty_assertions::assert_eq;

    fn alice() -> Identity {
        Identity::new("alice")
    }

    async fn ready(backend: &MemoryNotesBackend) -> NoteList {
        match NoteList::mount(Arc::new(backend.clone())).await {
            ListMount::Ready(list) => list,
            ListMount::Redirect(route) => panic!("unexpected redirect to {route}"),
        }
    }

    #[tokio::test]
    async fn no_session_redirects_to_login() {
        let backend = MemoryNotesBackend::new();
        let mounted = NoteList::mount(Arc::new(backend)).await;
        assert!(matches!(mounted, ListMount::Redirect(Route::Login)));
    }

    #[tokio::test]
    async fn empty_list_shows_message() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let list = ready(&backend).await;
        assert!(list.notes().is_empty());
        assert_eq!(list.empty_message(), Some(EMPTY_MESSAGE));
        assert!(list.notification().is_none());
    }

    #[tokio::test]
    async fn load_failure_mounts_with_notification() {
        let backend = MemoryNotesBackend::signed_in(alice());
        backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        backend.fail_next(Operation::List, 1);

        let mut list = ready(&backend).await;
        assert!(list.notes().is_empty());
        assert_eq!(list.take_notification(), Some(Notification::error(LOAD_FAILED)));

        list.refresh().await;
        assert_eq!(list.notes().len(), 1);
        assert!(list.notification().is_none());
    }

    #[tokio::test]
    async fn identity_failure_mounts_with_notification() {
        let backend = MemoryNotesBackend::signed_in(alice());
        backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        backend.fail_next(Operation::Identity, 1);

        let mut list = ready(&backend).await;
        assert!(list.owner().is_none());
        assert!(list.notes().is_empty());
        assert_eq!(list.take_notification(), Some(Notification::error(LOAD_FAILED)));

        list.refresh().await;
        assert_eq!(list.owner(), Some(&alice()));
        assert_eq!(list.notes().len(), 1);
        assert!(list.notification().is_none());
    }

    #[tokio::test]
    async fn rows_render_title_fallback_and_route() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let note = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        backend
            .update_note(&note.id, &NoteUpdate { title: String::new(), content: String::new(), updated_at: note.updated_at })
            .await
            .unwrap();

        let list = ready(&backend).await;
        let row = &list.notes()[0];
        assert_eq!(row.display_title(), DEFAULT_TITLE);
        assert_eq!(row_route(row), Route::Edit(note.id));
        assert_eq!(list.empty_message(), None);
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let note = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        let mut list = ready(&backend).await;

        let mut prompt = String::new();
        let outcome = list
            .delete(note.id, |_, text| {
                prompt = text.to_string();
                false
            })
            .await;

        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(prompt, DELETE_PROMPT);
        assert_eq!(backend.row_count(), 1);
        assert_eq!(list.notes().len(), 1);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_row_locally() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let keep = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        let gone = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        let mut list = ready(&backend).await;

        let outcome = list.delete(gone.id, |_, _| true).await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!list.is_deleting(&gone.id));
        assert_eq!(
            list.notes().iter().map(|note| note.id).collect::<Vec<_>>(),
            vec![keep.id]
        );
        assert_eq!(
            list.notification(),
            Some(&Notification::success(DELETE_SUCCEEDED))
        );
        assert!(backend.row(&gone.id).is_none());
    }

    #[tokio::test]
    async fn failed_delete_keeps_row() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let note = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        let mut list = ready(&backend).await;
        backend.fail_next(Operation::Delete, 1);

        assert_eq!(list.delete(note.id, |_, _| true).await, DeleteOutcome::Failed);
        assert_eq!(list.notes().len(), 1);
        assert!(list.notification().unwrap().is_error());
    }

    #[tokio::test]
    async fn unknown_id_is_not_deleted() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let mut list = ready(&backend).await;
        assert_eq!(
            list.delete(NoteId::new(), |_, _| true).await,
            DeleteOutcome::NotListed
        );
    }

    #[tokio::test]
    async fn refresh_reconciles_with_other_sessions() {
        let backend = MemoryNotesBackend::signed_in(alice());
        let mut list = ready(&backend).await;

        let other_tab = backend.session_for(alice());
        other_tab.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        assert!(list.notes().is_empty());

        list.refresh().await;
        assert_eq!(list.notes().len(), 1);
    }
}
