use carnival_core::backend::SharedBackend;
use carnival_core::views::{create_note, Creation};
use carnival_core::NoteId;

use crate::commands::common::open_workspace;
use crate::commands::edit::{edit_note, EditRequest};
use crate::error::CliError;

pub async fn run_new(no_edit: bool, global_profile: Option<&str>) -> Result<(), CliError> {
    let workspace = open_workspace(global_profile)?;
    let id = create(&workspace.backend).await?;
    println!("{id}");

    if no_edit {
        return Ok(());
    }
    edit_note(&workspace, id, EditRequest::default()).await
}

pub async fn create(backend: &SharedBackend) -> Result<NoteId, CliError> {
    match create_note(backend.as_ref()).await {
        Creation::Created(id) => Ok(id),
        Creation::LoginRequired => Err(CliError::NotSignedIn),
        Creation::Failed(error) => Err(CliError::CreateFailed(error.to_string())),
    }
}
