//! Edit screen: access check, then a live editing session.

use std::time::Duration;

use tokio::sync::watch;

use crate::autosave::{Autosave, SaveStatus};
use crate::backend::SharedBackend;
use crate::error::{Error, Result};
use crate::models::{FontChoice, Identity, Note, NoteId};

use super::route::{FALLBACK_TITLE, NOT_FOUND_TITLE};
use super::Route;

/// Hint shown in an empty document.
pub const PLACEHOLDER: &str = "Start typing... **bold** *italic* # heading";

/// Outcome of the ownership check. Missing and foreign notes are not told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allowed(Note),
    Denied,
}

impl Access {
    #[must_use]
    pub fn check(identity: &Identity, note: Option<Note>) -> Self {
        match note {
            Some(note) if note.is_owned_by(identity) => Self::Allowed(note),
            _ => Self::Denied,
        }
    }

    /// The allowed note, or [`Error::NotFoundOrForbidden`].
    pub fn into_result(self) -> Result<Note> {
        match self {
            Self::Allowed(note) => Ok(note),
            Self::Denied => Err(Error::NotFoundOrForbidden),
        }
    }
}

#[derive(Default)]
pub enum EditorState {
    #[default]
    Loading,
    Authorized(EditorSession),
    Redirecting(Route),
}

impl EditorState {
    /// Resolve the session, load the note (unless `initial` already has it)
    /// and check ownership.
    pub async fn open(
        backend: SharedBackend,
        id: NoteId,
        initial: Option<Note>,
        delay: Duration,
    ) -> Self {
        let identity = match backend.current_identity().await {
            Ok(Some(identity)) => identity,
            Ok(None) => return Self::Redirecting(Route::Login),
            Err(error) if error.is_transient() => {
                tracing::warn!("Error checking note {id}: {error}");
                return Self::Redirecting(Route::List);
            }
            Err(error) => {
                tracing::warn!("Session rejected while opening note {id}: {error}");
                return Self::Redirecting(Route::Login);
            }
        };

        let note = match initial.filter(|note| note.id == id) {
            Some(note) => Some(note),
            None => match backend.get_note(&id).await {
                Ok(note) => note,
                Err(error) => {
                    tracing::warn!("Error loading note {id}: {error}");
                    return Self::Redirecting(Route::List);
                }
            },
        };

        match Access::check(&identity, note) {
            Access::Allowed(note) => {
                Self::Authorized(EditorSession::start(backend, note, delay))
            }
            Access::Denied => {
                tracing::debug!("Note {id} not found or access denied");
                Self::Redirecting(Route::List)
            }
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn redirect(&self) -> Option<Route> {
        match self {
            Self::Redirecting(route) => Some(*route),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_session(self) -> Option<EditorSession> {
        match self {
            Self::Authorized(session) => Some(session),
            _ => None,
        }
    }
}

/// An authorized, open note.
///
/// Owns the edit buffer and both save timers. Dropping it without
/// [`EditorSession::close`] discards edits whose quiet period has not expired.
pub struct EditorSession {
    note: Note,
    autosave: Autosave,
    font: FontChoice,
}

impl EditorSession {
    /// Must be called inside a Tokio runtime.
    pub fn start(backend: SharedBackend, note: Note, delay: Duration) -> Self {
        let autosave = Autosave::spawn(backend, &note, delay);
        Self {
            note,
            autosave,
            font: FontChoice::default(),
        }
    }

    #[must_use]
    pub const fn note_id(&self) -> NoteId {
        self.note.id
    }

    /// The note as it was loaded.
    #[must_use]
    pub const fn loaded(&self) -> &Note {
        &self.note
    }

    /// Document the rich-text surface starts from; never empty.
    #[must_use]
    pub fn document(&self) -> &str {
        self.note.document()
    }

    /// Current serialized document.
    #[must_use]
    pub fn content(&self) -> String {
        self.autosave.content()
    }

    /// Title as typed.
    #[must_use]
    pub fn title(&self) -> String {
        self.autosave.title()
    }

    /// The rich-text surface reported a new document.
    pub fn content_changed(&mut self, html: impl Into<String>) {
        self.autosave.set_content(html);
    }

    pub fn title_changed(&mut self, title: impl Into<String>) {
        self.autosave.set_title(title);
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.autosave.subscribe()
    }

    pub fn retry(&self) -> bool {
        self.autosave.retry()
    }

    pub async fn flush(&mut self) -> SaveStatus {
        self.autosave.flush().await
    }

    pub async fn close(self) -> SaveStatus {
        self.autosave.close().await
    }

    #[must_use]
    pub const fn font(&self) -> FontChoice {
        self.font
    }

    pub fn set_font(&mut self, font: FontChoice) {
        self.font = font;
    }
}

/// Browser tab title for an edit route.
pub async fn page_title(backend: &SharedBackend, id: &NoteId) -> String {
    match backend.get_note(id).await {
        Ok(Some(note)) => note.title,
        Ok(None) => NOT_FOUND_TITLE.to_string(),
        Err(error) => {
            tracing::debug!("Page title lookup failed for {id}: {error}");
            FALLBACK_TITLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::{MemoryNotesBackend, NotesBackend, Operation};
    use crate::models::{NewNote, EMPTY_DOCUMENT};
    use pretty_assertions::assert_eq;

    const DELAY: Duration = Duration::from_millis(500);

    fn alice() -> Identity {
        Identity::new("alice")
    }

    async fn seeded() -> (MemoryNotesBackend, Note) {
        let backend = MemoryNotesBackend::signed_in(alice());
        let note = backend.insert_note(NewNote::placeholder(&alice())).await.unwrap();
        (backend, note)
    }

    #[test]
    fn access_requires_matching_owner() {
        let note = Note {
            id: NoteId::new(),
            user_id: "alice".to_string(),
            title: "Mine".to_string(),
            content: String::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(
            Access::check(&alice(), Some(note.clone())),
            Access::Allowed(note.clone())
        );
        assert_eq!(Access::check(&Identity::new("bob"), Some(note)), Access::Denied);
        assert_eq!(Access::check(&alice(), None), Access::Denied);
    }

    #[test]
    fn denied_access_is_not_found_or_forbidden() {
        assert!(matches!(
            Access::Denied.into_result(),
            Err(Error::NotFoundOrForbidden)
        ));
    }

    #[tokio::test]
    async fn identity_lookup_failure_redirects_to_list() {
        let (backend, note) = seeded().await;
        backend.fail_next(Operation::Identity, 1);
        let state = EditorState::open(Arc::new(backend), note.id, None, DELAY).await;
        assert_eq!(state.redirect(), Some(Route::List));
    }

    #[tokio::test]
    async fn owner_gets_a_session() {
        let (backend, note) = seeded().await;
        let state = EditorState::open(Arc::new(backend), note.id, None, DELAY).await;

        let session = state.into_session().unwrap();
        assert_eq!(session.note_id(), note.id);
        assert_eq!(session.document(), EMPTY_DOCUMENT);
        assert_eq!(session.content(), EMPTY_DOCUMENT);
        assert_eq!(session.title(), note.title);
        assert_eq!(session.status(), SaveStatus::Saved);
    }

    #[tokio::test]
    async fn missing_session_redirects_to_login() {
        let (backend, note) = seeded().await;
        backend.sign_out();
        let state = EditorState::open(Arc::new(backend), note.id, None, DELAY).await;
        assert_eq!(state.redirect(), Some(Route::Login));
    }

    #[tokio::test]
    async fn foreign_and_missing_notes_redirect_to_list() {
        let (backend, note) = seeded().await;
        let bob: SharedBackend = Arc::new(backend.session_for(Identity::new("bob")));

        let foreign = EditorState::open(Arc::clone(&bob), note.id, None, DELAY).await;
        let missing = EditorState::open(bob, NoteId::new(), None, DELAY).await;
        assert_eq!(foreign.redirect(), Some(Route::List));
        assert_eq!(missing.redirect(), Some(Route::List));
    }

    #[tokio::test]
    async fn preloaded_note_still_checks_owner() {
        let (backend, note) = seeded().await;
        let bob: SharedBackend = Arc::new(backend.session_for(Identity::new("bob")));
        let state = EditorState::open(bob, note.id, Some(note.clone()), DELAY).await;
        assert_eq!(state.redirect(), Some(Route::List));

        backend.fail_next(Operation::Get, 1);
        let state = EditorState::open(Arc::new(backend), note.id, Some(note), DELAY).await;
        assert!(state.into_session().is_some());
    }

    #[tokio::test]
    async fn load_failure_redirects_to_list() {
        let (backend, note) = seeded().await;
        backend.fail_next(Operation::Get, 1);
        let state = EditorState::open(Arc::new(backend), note.id, None, DELAY).await;
        assert_eq!(state.redirect(), Some(Route::List));
    }

    #[tokio::test(start_paused = true)]
    async fn edits_are_saved_after_quiet_period() {
        let (backend, note) = seeded().await;
        let mut session =
            EditorSession::start(Arc::new(backend.clone()), note.clone(), DELAY);

        session.title_changed("Groceries");
        session.content_changed("<p>milk</p>");
        assert!(session.status().is_saving());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let stored = backend.row(&note.id).unwrap();
        assert_eq!(stored.title, "Groceries");
        assert_eq!(stored.content, "<p>milk</p>");
        assert_eq!(session.status(), SaveStatus::Saved);
    }

    #[tokio::test]
    async fn font_is_local_only() {
        let (backend, note) = seeded().await;
        let mut session = EditorSession::start(Arc::new(backend.clone()), note, DELAY);

        assert_eq!(session.font(), FontChoice::Sans);
        session.set_font(FontChoice::Mono);
        assert_eq!(session.font(), FontChoice::Mono);
        assert_eq!(session.close().await, SaveStatus::Saved);
        assert!(backend.updates().is_empty());
    }

    #[tokio::test]
    async fn page_title_reflects_lookup() {
        let (backend, note) = seeded().await;
        let shared: SharedBackend = Arc::new(backend.clone());

        assert_eq!(page_title(&shared, &note.id).await, note.title);
        assert_eq!(page_title(&shared, &NoteId::new()).await, NOT_FOUND_TITLE);

        backend.fail_next(Operation::Get, 1);
        assert_eq!(page_title(&shared, &note.id).await, FALLBACK_TITLE);
    }

    #[test]
    fn default_state_is_loading() {
        assert!(EditorState::default().is_loading());
    }
}
