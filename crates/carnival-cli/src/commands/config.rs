use std::env;

use carnival_core::config::{normalize_text_option, parse_autosave_delay};

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            autosave_ms,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            ProfileInput {
                supabase_url,
                supabase_anon_key,
                autosave_ms,
            },
            no_activate,
        ),
    }
}

/// Values given on the command line for `config init`.
#[derive(Debug, Default)]
pub struct ProfileInput {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub autosave_ms: Option<u64>,
}

pub fn run_config_init(
    profile_name: Option<&str>,
    input: ProfileInput,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing_profile = config.profile(&profile_name).cloned().unwrap_or_default();

    let env_input = ProfileInput {
        supabase_url: env::var("SUPABASE_URL").ok(),
        supabase_anon_key: env::var("SUPABASE_ANON_KEY").ok(),
        autosave_ms: env_autosave_ms()?,
    };
    let merged = merge_profile(input, env_input, &existing_profile);
    merged.client_config().map_err(CliError::Config)?;
    *config.profile_mut_or_default(&profile_name) = merged;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let missing_fields = config
        .profile(&profile_name)
        .map(missing_fields)
        .unwrap_or_default();
    if missing_fields.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `carnival auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

/// Explicit flags win over environment variables, which win over what is stored.
pub fn merge_profile(explicit: ProfileInput, env_input: ProfileInput, existing: &CliProfile) -> CliProfile {
    CliProfile {
        supabase_url: normalize_text_option(explicit.supabase_url)
            .or_else(|| normalize_text_option(env_input.supabase_url))
            .or_else(|| existing.supabase_url()),
        supabase_anon_key: normalize_text_option(explicit.supabase_anon_key)
            .or_else(|| normalize_text_option(env_input.supabase_anon_key))
            .or_else(|| existing.supabase_anon_key()),
        autosave_ms: explicit
            .autosave_ms
            .or(env_input.autosave_ms)
            .or(existing.autosave_ms)
            .filter(|millis| *millis > 0),
    }
}

pub fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.supabase_url().is_none() {
        missing.push("supabase_url");
    }
    if profile.supabase_anon_key().is_none() {
        missing.push("supabase_anon_key");
    }
    missing
}

fn env_autosave_ms() -> Result<Option<u64>, CliError> {
    let raw = normalize_text_option(env::var("CARNIVAL_AUTOSAVE_MS").ok());
    if raw.is_none() {
        return Ok(None);
    }
    let delay = parse_autosave_delay(raw)?;
    Ok(Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)))
}
