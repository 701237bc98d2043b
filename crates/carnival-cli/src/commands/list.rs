use carnival_core::backend::SharedBackend;
use carnival_core::views::Notification;

use crate::commands::common::{
    format_note_lines, mount_list, note_to_list_item, open_workspace, NoteListItem,
};
use crate::error::CliError;

/// Rendered list screen.
pub struct ListOutput {
    pub text: String,
    pub notification: Option<Notification>,
}

pub async fn run_list(as_json: bool, global_profile: Option<&str>) -> Result<(), CliError> {
    let workspace = open_workspace(global_profile)?;
    let output = render_list(workspace.backend, as_json).await?;

    if let Some(notification) = output.notification {
        eprintln!("{notification}");
    }
    println!("{}", output.text);
    Ok(())
}

pub async fn render_list(backend: SharedBackend, as_json: bool) -> Result<ListOutput, CliError> {
    let mut list = mount_list(backend).await?;
    let notification = list.take_notification();

    let text = if as_json {
        let items = list
            .notes()
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        serde_json::to_string_pretty(&items)?
    } else if let Some(message) = list.empty_message() {
        message.to_string()
    } else {
        format_note_lines(list.notes()).join("\n")
    };

    Ok(ListOutput { text, notification })
}
