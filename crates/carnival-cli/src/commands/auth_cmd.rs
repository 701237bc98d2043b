use carnival_core::auth::SignUpOutcome;
use carnival_core::config::ClientConfig;

use crate::auth::{clear_stored_session, load_stored_session, AuthSession, SupabaseAuthService};
use crate::cli::AuthCommands;
use crate::commands::common::resolve_client_config;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login {
            profile,
            email,
            password,
        } => {
            let (profile_name, service) = require_service(profile.as_deref().or(global_profile))?;
            let session = service
                .sign_in(&email, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            println!("Signed in profile '{profile_name}' as {}", session.user);
            Ok(())
        }
        AuthCommands::Signup {
            profile,
            email,
            password,
        } => {
            let (profile_name, service) = require_service(profile.as_deref().or(global_profile))?;
            let outcome = service
                .sign_up(&email, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            match outcome {
                SignUpOutcome::SignedIn(session) => {
                    println!("Signed up profile '{profile_name}' as {}", session.user);
                }
                SignUpOutcome::ConfirmationRequired => {
                    println!("Check {email} to confirm your account, then run `carnival auth login`.");
                }
            }
            Ok(())
        }
        AuthCommands::Status { profile } => {
            let (profile_name, config) = resolve_client_config(profile.as_deref().or(global_profile))?;
            let session = match config {
                Some(config) => service_for(&profile_name, &config)?
                    .restore_session()
                    .await
                    .map_err(|error| CliError::Auth(error.to_string()))?,
                None => load_stored_session(&profile_name)
                    .map_err(|error| CliError::Auth(error.to_string()))?,
            };
            println!("{}", status_line(&profile_name, session.as_ref()));
            Ok(())
        }
        AuthCommands::Logout { profile } => {
            let (profile_name, config) = resolve_client_config(profile.as_deref().or(global_profile))?;
            let stored_session = load_stored_session(&profile_name)
                .map_err(|error| CliError::Auth(error.to_string()))?;

            if let (Some(config), Some(session)) = (config, stored_session) {
                service_for(&profile_name, &config)?
                    .sign_out(&session.access_token)
                    .await
                    .map_err(|error| CliError::Auth(error.to_string()))?;
            } else {
                clear_stored_session(&profile_name)
                    .map_err(|error| CliError::Auth(error.to_string()))?;
            }

            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}

pub fn status_line(profile_name: &str, session: Option<&AuthSession>) -> String {
    session.map_or_else(
        || format!("Profile '{profile_name}' is not signed in."),
        |session| {
            format!(
                "Profile '{}' is signed in as {} (expires_at={})",
                profile_name, session.user, session.expires_at
            )
        },
    )
}

fn require_service(profile: Option<&str>) -> Result<(String, SupabaseAuthService), CliError> {
    let (profile_name, config) = resolve_client_config(profile)?;
    let config = config.ok_or(CliError::NotConfigured)?;
    let service = service_for(&profile_name, &config)?;
    Ok((profile_name, service))
}

fn service_for(profile_name: &str, config: &ClientConfig) -> Result<SupabaseAuthService, CliError> {
    SupabaseAuthService::new(profile_name, config).map_err(|error| CliError::Auth(error.to_string()))
}
