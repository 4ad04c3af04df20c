//! CLI configuration: a thin layer over `fanlink_config` that applies
//! `GlobalOpts` overrides (--url, --profile, --timeout, --insecure).

use fanlink_config::{Config, ConfigError, Profile, profile_to_session_config};
use fanlink_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use fanlink_config::{config_path, load_config, save_config_to};

/// Build the `SessionConfig` for this invocation.
pub fn resolve_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config()?;
    resolve_with(&cfg, global)
}

/// Pick a profile, then let command-line flags win over its values.
pub fn resolve_with(cfg: &Config, global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let mut profile = match cfg.select_profile(global.profile.as_deref()) {
        Ok((_, profile)) => profile.clone(),
        // A bare --url needs no profile at all.
        Err(ConfigError::NoProfile | ConfigError::UnknownProfile { .. })
            if global.url.is_some() && global.profile.is_none() =>
        {
            Profile::default()
        }
        Err(ConfigError::UnknownProfile { profile }) => {
            return Err(CliError::ProfileNotFound {
                name: profile,
                available: available_profiles(cfg),
            });
        }
        Err(other) => return Err(other.into()),
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    Ok(profile_to_session_config(&profile, &cfg.defaults)?)
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
