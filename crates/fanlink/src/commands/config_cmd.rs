//! Config subcommand handlers. None of these contact a controller.

use tabled::Tabled;

use fanlink_config::{ConfigError, Profile, parse_controller_url};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled, serde::Serialize)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Default")]
    default: String,
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path();

    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let toml = toml::to_string_pretty(&cfg).map_err(ConfigError::from)?;
            let out = output::render_single(global.output, &cfg, |_| toml.trim_end().to_owned());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            url,
            name,
            ca_cert,
            make_default,
        } => {
            parse_controller_url(&url)?;

            let mut cfg = config::load_config()?;
            let profile = Profile {
                ca_cert,
                insecure: global.insecure.then_some(true),
                timeout: global.timeout,
                ..Profile::new(url)
            };
            cfg.profiles.insert(name.clone(), profile);

            let default_missing = cfg
                .default_profile
                .as_ref()
                .is_none_or(|d| !cfg.profiles.contains_key(d));
            if make_default || default_missing {
                cfg.default_profile = Some(name.clone());
            }

            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Profile '{name}' written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let rows: Vec<ProfileRow> = cfg
                .profiles
                .iter()
                .map(|(name, p)| ProfileRow {
                    name: name.clone(),
                    url: p.url.clone(),
                    default: if cfg.default_profile.as_deref() == Some(name.as_str()) {
                        "*".into()
                    } else {
                        String::new()
                    },
                })
                .collect();
            let out = output::render_single(global.output, rows.as_slice(), |rows| {
                output::render_rows(rows)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
