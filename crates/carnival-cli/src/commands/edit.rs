use std::io::{self, Write};
use std::path::PathBuf;

use carnival_core::autosave::SaveStatus;
use carnival_core::models::EMPTY_DOCUMENT;
use carnival_core::views::EditorSession;
use carnival_core::{FontChoice, NoteId};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::commands::common::{
    capture_editor_input_with_initial, document_to_text, open_editor, open_workspace,
    paragraph, parse_note_id, text_to_document, Workspace,
};
use crate::error::CliError;

#[derive(Debug, Default)]
pub struct EditRequest {
    pub title: Option<String>,
    pub content_file: Option<PathBuf>,
    pub font: Option<FontChoice>,
    pub interactive: bool,
}

impl EditRequest {
    /// No replacement given on the command line; fall back to `$EDITOR`.
    pub const fn wants_editor(&self) -> bool {
        self.title.is_none() && self.content_file.is_none() && !self.interactive
    }
}

pub async fn run_edit(
    id: &str,
    request: EditRequest,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let workspace = open_workspace(global_profile)?;
    edit_note(&workspace, note_id, request).await
}

pub async fn edit_note(
    workspace: &Workspace,
    note_id: NoteId,
    request: EditRequest,
) -> Result<(), CliError> {
    let mut session = open_editor(
        workspace.backend.clone(),
        note_id,
        workspace.autosave_delay(),
    )
    .await?;
    tracing::debug!(
        "Editing note {note_id} with profile '{}'",
        workspace.profile_name
    );

    apply_edit_request(&mut session, &request)?;
    if request.font.is_some() {
        eprintln!("Font: {}", session.font());
    }

    if request.interactive {
        let status = session.subscribe_status();
        let printer = tokio::spawn(async move {
            print_status_changes(status, &mut std::io::stderr()).await
        });

        let stdin = BufReader::new(tokio::io::stdin());
        let result = edit_interactively(&mut session, stdin, &mut std::io::stderr()).await;
        let closed = session.close().await;
        // The status channel closes once the writer exits, ending the printer.
        match printer.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => tracing::debug!("Status printer failed: {error}"),
            Err(error) => tracing::debug!("Status printer stopped: {error}"),
        }
        result?;
        return finish(note_id, closed);
    }

    if request.wants_editor() {
        let original = document_to_text(&session.content());
        let edited = capture_editor_input_with_initial(&original)?;
        if let Some(document) = edited_document(&original, &edited) {
            session.content_changed(document);
        }
    }

    finish(note_id, session.close().await)
}

/// Document to save after a plain-text edit, or `None` when the text is unchanged.
///
/// Clearing every line empties the note.
pub fn edited_document(original: &str, edited: &str) -> Option<String> {
    (edited.trim_end() != original.trim_end()).then(|| text_to_document(edited))
}

/// Feed command-line replacements through the session's autosave.
pub fn apply_edit_request(
    session: &mut EditorSession,
    request: &EditRequest,
) -> Result<(), CliError> {
    if let Some(font) = request.font {
        session.set_font(font);
    }
    if let Some(title) = &request.title {
        session.title_changed(title.as_str());
    }
    if let Some(path) = &request.content_file {
        let raw = std::fs::read_to_string(path)?;
        session.content_changed(raw);
    }
    Ok(())
}

/// Print every status change until the session's status channel closes.
pub async fn print_status_changes<W: Write>(
    mut status: watch::Receiver<SaveStatus>,
    out: &mut W,
) -> io::Result<()> {
    while status.changed().await.is_ok() {
        let current = status.borrow_and_update().clone();
        writeln!(out, "[{current}]")?;
    }
    Ok(())
}

fn finish(note_id: NoteId, status: SaveStatus) -> Result<(), CliError> {
    match status {
        SaveStatus::Failed(reason) => Err(CliError::SaveFailed(reason)),
        SaveStatus::Saved | SaveStatus::Saving => {
            println!("{note_id}");
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveInput {
    /// A line of text appended as a paragraph
    Text(String),
    Title(String),
    Font(String),
    Retry,
    Status,
    Quit,
}

pub fn parse_interactive_line(line: &str) -> InteractiveInput {
    let Some(command) = line.strip_prefix(':') else {
        return InteractiveInput::Text(line.to_string());
    };
    let (name, argument) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));

    match name {
        "title" => InteractiveInput::Title(argument.to_string()),
        "font" => InteractiveInput::Font(argument.to_string()),
        "retry" => InteractiveInput::Retry,
        "status" => InteractiveInput::Status,
        "q" | "quit" => InteractiveInput::Quit,
        // `::text` escapes a leading colon
        _ => InteractiveInput::Text(line.strip_prefix(':').unwrap_or(line).to_string()),
    }
}

/// Read lines until EOF or `:q`, appending each text line as a paragraph.
pub async fn edit_interactively<R, W>(
    session: &mut EditorSession,
    reader: R,
    out: &mut W,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut document = session.content();
    if document == EMPTY_DOCUMENT {
        document.clear();
    }

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_interactive_line(&line) {
            InteractiveInput::Text(text) => {
                document.push_str(&paragraph(&text));
                session.content_changed(document.clone());
            }
            InteractiveInput::Title(title) => session.title_changed(title),
            InteractiveInput::Font(name) => match name.parse::<FontChoice>() {
                Ok(font) => {
                    session.set_font(font);
                    writeln!(out, "Font: {font}")?;
                }
                Err(message) => writeln!(out, "{message}")?,
            },
            InteractiveInput::Retry => {
                if !session.retry() {
                    writeln!(out, "Nothing to retry")?;
                }
            }
            InteractiveInput::Status => writeln!(out, "{}", session.status())?,
            InteractiveInput::Quit => break,
        }
    }
    Ok(())
}
