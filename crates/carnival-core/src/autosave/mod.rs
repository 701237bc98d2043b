//! Debounced autosave for one open note.
//!
//! Title and content edits land in an in-memory buffer immediately. Each kind
//! of edit restarts its own [`Debouncer`]; when a quiet period expires the
//! buffer is snapshotted and handed to a single writer task, so writes from one
//! editor reach the backend in the order they fired. Progress is published on
//! a `watch` channel as a [`SaveStatus`].

mod debounce;
mod status;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};

use crate::backend::SharedBackend;
use crate::models::{Note, NoteId, NoteUpdate};

pub use debounce::Debouncer;
pub use status::{SaveKind, SaveStatus};

use status::SaveTracker;

#[derive(Debug, Clone)]
struct Snapshot {
    title: String,
    content: String,
}

enum Command {
    Write(Snapshot),
    Barrier(oneshot::Sender<()>),
}

struct State {
    buffer: Snapshot,
    tracker: SaveTracker,
    writer: Option<mpsc::UnboundedSender<Command>>,
}

impl State {
    /// Queue a write of the current buffer. Returns false once the editor is closed.
    fn enqueue_write(&mut self) -> bool {
        self.tracker.start_write();
        let sent = self
            .writer
            .as_ref()
            .is_some_and(|writer| writer.send(Command::Write(self.buffer.clone())).is_ok());
        if !sent {
            self.tracker
                .finish_write(Err("Editor is closed".to_string()));
        }
        sent
    }
}

struct Shared {
    state: Mutex<State>,
    status: watch::Sender<SaveStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        let next = state.tracker.status();
        self.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn edit(&self, kind: SaveKind, apply: impl FnOnce(&mut Snapshot)) {
        let mut state = self.lock();
        apply(&mut state.buffer);
        state.tracker.mark_pending(kind);
        self.publish(&state);
    }

    /// Quiet period of `kind` expired.
    fn fire(&self, kind: SaveKind) {
        let mut state = self.lock();
        if state.tracker.clear_pending(kind) {
            state.enqueue_write();
        }
        self.publish(&state);
    }

    fn finish(&self, outcome: Result<(), String>) {
        let mut state = self.lock();
        state.tracker.finish_write(outcome);
        self.publish(&state);
    }
}

/// Autosave engine bound to one note.
///
/// Must be created inside a Tokio runtime. Dropping it cancels any pending
/// quiet periods; writes already handed to the writer still complete.
pub struct Autosave {
    note_id: NoteId,
    shared: Arc<Shared>,
    content_timer: Debouncer,
    title_timer: Debouncer,
    status: watch::Receiver<SaveStatus>,
}

impl Autosave {
    pub fn spawn(backend: SharedBackend, note: &Note, delay: Duration) -> Self {
        let (writer, commands) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Saved);
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                buffer: Snapshot {
                    title: note.title.clone(),
                    content: note.document().to_string(),
                },
                tracker: SaveTracker::default(),
                writer: Some(writer),
            }),
            status: status_tx,
        });

        tokio::spawn(run_writer(
            backend,
            note.id,
            note.updated_at,
            Arc::clone(&shared),
            commands,
        ));

        Self {
            note_id: note.id,
            shared,
            content_timer: Debouncer::new(delay),
            title_timer: Debouncer::new(delay),
            status,
        }
    }

    #[must_use]
    pub const fn note_id(&self) -> NoteId {
        self.note_id
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.content_timer.delay()
    }

    /// Title as typed, before normalization.
    #[must_use]
    pub fn title(&self) -> String {
        self.shared.lock().buffer.title.clone()
    }

    #[must_use]
    pub fn content(&self) -> String {
        self.shared.lock().buffer.content.clone()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        let content = content.into();
        self.shared
            .edit(SaveKind::Content, |buffer| buffer.content = content);
        let shared = Arc::clone(&self.shared);
        self.content_timer
            .schedule(move || shared.fire(SaveKind::Content));
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.shared.edit(SaveKind::Title, |buffer| buffer.title = title);
        let shared = Arc::clone(&self.shared);
        self.title_timer.schedule(move || shared.fire(SaveKind::Title));
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// After a failed write, write the current buffer now.
    ///
    /// Returns false when the last write succeeded or the editor is closed.
    pub fn retry(&self) -> bool {
        let mut state = self.shared.lock();
        if !state.tracker.has_failed() {
            return false;
        }
        let sent = state.enqueue_write();
        self.shared.publish(&state);
        sent
    }

    /// Skip any pending quiet periods and wait until every queued write resolved.
    pub async fn flush(&mut self) -> SaveStatus {
        self.content_timer.cancel();
        self.title_timer.cancel();

        let ack = {
            let mut state = self.shared.lock();
            if state.tracker.clear_all_pending() {
                state.enqueue_write();
            }
            self.shared.publish(&state);

            let (ack_tx, ack_rx) = oneshot::channel();
            state
                .writer
                .as_ref()
                .and_then(|writer| writer.send(Command::Barrier(ack_tx)).ok())
                .map(|()| ack_rx)
        };

        if let Some(ack) = ack {
            // Dropped unanswered only when the writer already stopped.
            let _ = ack.await;
        }
        self.status()
    }

    /// Flush and tear down.
    pub async fn close(mut self) -> SaveStatus {
        self.flush().await
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.content_timer.cancel();
        self.title_timer.cancel();
        // Closing the queue lets the writer drain and exit.
        self.shared.lock().writer.take();
    }
}

async fn run_writer(
    backend: SharedBackend,
    note_id: NoteId,
    mut last_written: DateTime<Utc>,
    shared: Arc<Shared>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Write(snapshot) => {
                let updated_at = Utc::now().max(last_written);
                let update = NoteUpdate::new(&snapshot.title, snapshot.content, updated_at);
                let outcome = match backend.update_note(&note_id, &update).await {
                    Ok(()) => {
                        last_written = updated_at;
                        tracing::debug!("Saved note {note_id}");
                        Ok(())
                    }
                    Err(error) => {
                        tracing::warn!("Failed to save note {note_id}: {error}");
                        Err(error.to_string())
                    }
                };
                shared.finish(outcome);
            }
            Command::Barrier(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("Autosave writer for note {note_id} stopped");
}
