//! Status and restore-auto handlers.

use fanlink_core::{Session, Status};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn status_detail(status: &Status) -> String {
    let updated = status
        .last_update
        .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    output::render_pairs(&[
        ("CPU temp", format!("{:.1} °C", status.cpu_temp)),
        ("Fan speed", format!("{:.0} %", status.fan_speed)),
        ("Power", format!("{:.1} W", status.power)),
        ("Control", status.control_mode.to_string()),
        ("Updated", updated),
    ])
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let status = session.store().fetch_status().await?;
    let out = output::render_single(global.output, &status, status_detail);
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn restore_auto(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.store().restore_auto_control().await?;
    if !global.quiet {
        eprintln!("Automatic fan control restored");
    }
    Ok(())
}
