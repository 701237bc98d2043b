//! Carnival CLI - list, create, and edit Supabase-backed notes from the terminal
//!
//! Every subcommand mounts one of the core screens; edits go through the same
//! debounced autosave the other clients use.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, EditRequest};
use crate::commands::list::run_list;
use crate::commands::new::run_new;
use crate::commands::show::run_show;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let default_directive = "carnival=info"
        .parse()
        .map_err(|error| CliError::Config(format!("Invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_directive),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    // The note list is the home screen.
    match cli.command.unwrap_or(Commands::List { json: false }) {
        Commands::List { json } => run_list(json, profile).await,
        Commands::New { no_edit } => run_new(no_edit, profile).await,
        Commands::Show { id, json } => run_show(&id, json, profile).await,
        Commands::Edit {
            id,
            title,
            content_file,
            font,
            interactive,
        } => {
            let request = EditRequest {
                title,
                content_file,
                font,
                interactive,
            };
            run_edit(&id, request, profile).await
        }
        Commands::Delete { id, yes } => run_delete(&id, yes, profile).await,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
        Commands::Config { command } => run_config(command, profile),
        Commands::Auth { command } => run_auth(command, profile).await,
    }
}
