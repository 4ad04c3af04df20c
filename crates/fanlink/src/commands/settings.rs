//! Controller settings handlers.

use secrecy::SecretString;

use fanlink_core::{Session, Settings, SettingsUpdate};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand, SettingsSetArgs};
use crate::error::CliError;
use crate::output;

fn settings_detail(s: &Settings) -> String {
    output::render_pairs(&[
        ("IP address", s.ip_address.clone()),
        ("Username", s.username.clone()),
        (
            "Password",
            if s.password_set { "****" } else { "(not set)" }.into(),
        ),
        ("Interval", format!("{} s", s.interval)),
    ])
}

fn to_update(args: SettingsSetArgs) -> SettingsUpdate {
    SettingsUpdate {
        ip_address: args.ip_address,
        username: args.username,
        password: args.password.map(SecretString::from),
        interval: args.interval,
    }
}

pub async fn handle(
    session: &Session,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show => {
            let settings = session.fetch_settings().await?;
            let out = output::render_single(global.output, &settings, settings_detail);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SettingsCommand::Set(set) => {
            let update = to_update(set);
            if update.is_empty() {
                return Err(CliError::Validation {
                    field: "settings".into(),
                    reason: "nothing to change; pass at least one of --ip-address, \
                             --username, --password, --interval"
                        .into(),
                });
            }
            session.save_settings(&update).await?;
            if !global.quiet {
                eprintln!("Settings saved");
            }
            Ok(())
        }
    }
}
