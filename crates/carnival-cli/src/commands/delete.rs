use carnival_core::backend::SharedBackend;
use carnival_core::models::NoteSummary;
use carnival_core::views::list::{DELETE_FAILED, DELETE_SUCCEEDED};
use carnival_core::views::DeleteOutcome;
use carnival_core::NoteId;

use crate::commands::common::{confirm_prompt, mount_list, open_workspace, parse_note_id};
use crate::error::CliError;

pub async fn run_delete(
    id: &str,
    skip_confirm: bool,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let workspace = open_workspace(global_profile)?;

    let message = delete_note(workspace.backend, note_id, |note, prompt| {
        skip_confirm || confirm_prompt(&format!("{prompt}\n  {}", note.display_title()))
    })
    .await?;
    println!("{message}");
    Ok(())
}

pub async fn delete_note<F>(
    backend: SharedBackend,
    id: NoteId,
    confirm: F,
) -> Result<String, CliError>
where
    F: FnOnce(&NoteSummary, &str) -> bool,
{
    let mut list = mount_list(backend).await?;
    if let Some(notification) = list.take_notification() {
        // The listing is unknown, so the note cannot be checked against it.
        return Err(CliError::DeleteFailed(notification.message));
    }
    let outcome = list.delete(id, confirm).await;
    let notification = list.take_notification();

    match outcome {
        DeleteOutcome::Deleted => Ok(notification.map_or_else(
            || DELETE_SUCCEEDED.to_string(),
            |notification| notification.message,
        )),
        DeleteOutcome::Declined => Ok("Cancelled".to_string()),
        DeleteOutcome::NotListed => Err(CliError::NoteNotFound(id.to_string())),
        DeleteOutcome::Failed => Err(CliError::DeleteFailed(notification.map_or_else(
            || DELETE_FAILED.to_string(),
            |notification| notification.message,
        ))),
    }
}
