use carnival_core::backend::SharedBackend;
use carnival_core::views::Access;
use carnival_core::{Note, NoteId};

use crate::commands::common::{document_to_text, format_date, open_workspace, parse_note_id};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool, global_profile: Option<&str>) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let workspace = open_workspace(global_profile)?;
    let note = load_note(&workspace.backend, note_id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("{}", render_note(&note));
    }
    Ok(())
}

pub async fn load_note(backend: &SharedBackend, id: NoteId) -> Result<Note, CliError> {
    let identity = backend
        .current_identity()
        .await?
        .ok_or(CliError::NotSignedIn)?;
    let note = backend.get_note(&id).await?;

    Access::check(&identity, note)
        .into_result()
        .map_err(|_| CliError::NoteNotFound(id.to_string()))
}

pub fn render_note(note: &Note) -> String {
    let body = document_to_text(&note.content);
    let mut rendered = format!(
        "{}\n{}",
        note.display_title(),
        format_date(&note.updated_at)
    );
    if !body.is_empty() {
        rendered.push_str("\n\n");
        rendered.push_str(&body);
    }
    rendered
}
