//! Live watch: follow status merges and log pushes until interrupted.

use chrono::Local;
use serde_json::json;
use tracing::debug;

use fanlink_core::{ErrorKey, LogEntry, Session, Status};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

fn status_line(status: &Status, format: OutputFormat, color: bool) -> String {
    if format == OutputFormat::Table {
        let now = Local::now().format("%H:%M:%S").to_string();
        format!(
            "{}  CPU {:>5.1} °C  fan {:>5.0} %  power {:>5.1} W  {}",
            output::paint_dim(&now, color),
            status.cpu_temp,
            status.fan_speed,
            status.power,
            status.control_mode,
        )
    } else {
        output::render_json_compact(&json!({ "type": "status", "data": status }))
    }
}

fn log_line(entry: &LogEntry, format: OutputFormat, color: bool) -> String {
    if format == OutputFormat::Table {
        let level = entry.level.as_deref().unwrap_or("INFO");
        format!(
            "{}  {:<8} {}",
            output::paint_dim(entry.time.as_deref().unwrap_or("-"), color),
            output::paint_level(level, color),
            entry.message.as_deref().unwrap_or_default(),
        )
    } else {
        output::render_json_compact(&json!({ "type": "log", "data": entry }))
    }
}

pub async fn handle(session: &Session, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let store = session.store();

    // Seed with a full pull so the first line is complete.
    let initial = store.fetch_status().await?;

    let mut status = store.subscribe_status();
    let mut logs = store.subscribe_logs();
    let mut tracking = store.subscribe_tracking();
    let mut state = session.channel().subscribe_state();
    // Lines already in the buffer were not pushed while watching.
    let mut logs_seen = store.logs().pushed();

    session.channel().connect();

    output::print_output(&status_line(&initial, global.output, color), global.quiet);
    let mut printed = 1usize;
    let mut channel_error: Option<String> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        if args.count.is_some_and(|limit| printed >= limit) {
            break;
        }

        tokio::select! {
            _ = &mut ctrl_c => break,

            Some(current) = status.changed() => {
                output::print_output(&status_line(&current, global.output, color), global.quiet);
                printed += 1;
            }

            Some(buffer) = logs.changed(), if !args.no_logs => {
                // Several pushes may land between two wake-ups.
                for entry in buffer.pushed_since(logs_seen) {
                    if args.count.is_some_and(|limit| printed >= limit) {
                        break;
                    }
                    output::print_output(&log_line(entry, global.output, color), global.quiet);
                    printed += 1;
                }
                logs_seen = buffer.pushed();
            }

            Some(snapshot) = tracking.changed() => {
                let latest = snapshot.error(ErrorKey::Channel).map(str::to_owned);
                if latest != channel_error {
                    if let Some(ref message) = latest {
                        if !global.quiet {
                            eprintln!("{message}");
                        }
                    }
                    channel_error = latest;
                }
            }

            Ok(()) = state.changed() => {
                debug!(state = %*state.borrow_and_update(), "channel state");
            }

            else => break,
        }
    }

    session.shutdown();
    Ok(())
}
