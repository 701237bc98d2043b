use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use carnival_core::auth::unix_timestamp_now;
use carnival_core::backend::SharedBackend;
use carnival_core::config::ClientConfig;
use carnival_core::models::{format_list_date, NoteSummary, EMPTY_DOCUMENT};
use carnival_core::views::{EditorSession, EditorState, ListMount, NoteList, Route};
use carnival_core::NoteId;
use serde::Serialize;

use crate::auth::backend_for_profile;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Resolved profile plus a backend bound to its keychain session.
pub struct Workspace {
    pub profile_name: String,
    pub config: ClientConfig,
    pub backend: SharedBackend,
}

impl Workspace {
    pub const fn autosave_delay(&self) -> Duration {
        self.config.autosave_delay
    }
}

/// Profile settings first; `SUPABASE_URL`/`SUPABASE_ANON_KEY` when the profile has none.
pub fn resolve_client_config(
    global_profile: Option<&str>,
) -> Result<(String, Option<ClientConfig>), CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(global_profile);

    if let Some(profile) = profiles.profile(&profile_name) {
        if let Some(config) = profile.client_config().map_err(CliError::Config)? {
            return Ok((profile_name, Some(config)));
        }
    }
    Ok((profile_name, ClientConfig::from_env()?))
}

pub fn open_workspace(global_profile: Option<&str>) -> Result<Workspace, CliError> {
    let (profile_name, config) = resolve_client_config(global_profile)?;
    let config = config.ok_or(CliError::NotConfigured)?;
    let backend = backend_for_profile(&profile_name, &config)?;
    tracing::debug!("Using profile '{profile_name}'");

    Ok(Workspace {
        profile_name,
        config,
        backend: Arc::new(backend),
    })
}

pub fn parse_note_id(raw: &str) -> Result<NoteId, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyNoteId);
    }
    trimmed
        .parse()
        .map_err(|_| CliError::InvalidNoteId(trimmed.to_string()))
}

pub async fn mount_list(backend: SharedBackend) -> Result<NoteList, CliError> {
    match NoteList::mount(backend).await {
        ListMount::Ready(list) => Ok(list),
        ListMount::Redirect(_) => Err(CliError::NotSignedIn),
    }
}

pub async fn open_editor(
    backend: SharedBackend,
    id: NoteId,
    delay: Duration,
) -> Result<EditorSession, CliError> {
    match EditorState::open(backend, id, None, delay).await {
        EditorState::Authorized(session) => Ok(session),
        EditorState::Redirecting(Route::Login) => Err(CliError::NotSignedIn),
        EditorState::Redirecting(_) | EditorState::Loading => {
            Err(CliError::NoteNotFound(id.to_string()))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub updated_at: String,
    pub date: String,
}

pub fn note_to_list_item(note: &NoteSummary) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.display_title().to_string(),
        preview: note_preview(&note.content, 80),
        updated_at: note.updated_at.to_rfc3339(),
        date: note.display_date(),
    }
}

pub fn format_note_lines(notes: &[NoteSummary]) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let id = note.id.to_string();
            let title = truncate_chars(note.display_title(), 40);
            format!("{id}  {title:<40}  {}", note.display_date())
        })
        .collect()
}

pub fn format_date(date_time: &chrono::DateTime<chrono::Utc>) -> String {
    format_list_date(&date_time.with_timezone(&chrono::Local))
}

pub fn note_preview(document: &str, max_chars: usize) -> String {
    let text = document_to_text(document);
    let first_line = text.lines().map(str::trim).find(|line| !line.is_empty());
    truncate_chars(first_line.unwrap_or_default(), max_chars)
}

pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = value.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Plain-text rendering of a serialized rich-text document, one block per line.
pub fn document_to_text(document: &str) -> String {
    let mut text = String::with_capacity(document.len());
    let mut rest = document;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            rest = &rest[start..];
            break;
        };
        let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
        if is_block_break(&tag) && !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    text.push_str(rest);

    decode_entities(text.trim_end_matches('\n'))
}

fn is_block_break(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default();
    matches!(
        name,
        "p" | "br" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre"
    )
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn paragraph(line: &str) -> String {
    if line.trim().is_empty() {
        "<p></p>".to_string()
    } else {
        format!("<p>{}</p>", escape_html(line))
    }
}

/// Document with one paragraph per line of `text`.
pub fn text_to_document(text: &str) -> String {
    let body = text.trim_end_matches('\n');
    if body.trim().is_empty() {
        return EMPTY_DOCUMENT.to_string();
    }
    body.lines().map(paragraph).collect()
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask on stderr, read one line from stdin. Anything but yes declines.
pub fn confirm_prompt(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(_) => false,
    }
}

/// Open `$VISUAL`/`$EDITOR` on `initial_content` and return the saved text.
pub fn capture_editor_input_with_initial(initial_content: &str) -> Result<String, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(note_content)
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    env::temp_dir().join(format!(
        "carnival-note-{}-{}.txt",
        std::process::id(),
        unix_timestamp_now()
    ))
}
