//! Command dispatch: bridges CLI args -> session operations -> output.

pub mod config_cmd;
pub mod curve;
pub mod history;
pub mod logs;
pub mod settings;
pub mod status;
pub mod watch;

use fanlink_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to its handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(session, global).await,
        Command::RestoreAuto => status::restore_auto(session, global).await,
        Command::Curve(args) => curve::handle(session, args, global).await,
        Command::History(args) => history::handle(session, args, global).await,
        Command::Logs(args) => logs::handle(session, args, global).await,
        Command::Watch(args) => watch::handle(session, args, global).await,
        Command::Settings(args) => settings::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
