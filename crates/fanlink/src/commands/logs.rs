//! Logs handler.

use tabled::Tabled;

use fanlink_core::{LogEntry, LogQuery, Session};

use crate::cli::{GlobalOpts, LogsArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&LogEntry> for LogRow {
    fn from(e: &LogEntry) -> Self {
        Self {
            time: e.time.clone().unwrap_or_default(),
            level: e.level.clone().unwrap_or_default(),
            message: e.message.clone().unwrap_or_default(),
        }
    }
}

fn build_query(args: LogsArgs) -> LogQuery {
    let mut query = LogQuery::new();
    if let Some(level) = args.level {
        query = query.level(level);
    }
    if let Some(search) = args.search {
        query = query.search(search);
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    query
}

pub async fn handle(session: &Session, args: LogsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let query = build_query(args);
    let entries = session.store().fetch_logs(&query).await?;
    let out = output::render_list(global.output, &entries, |e| LogRow::from(e));
    output::print_output(&out, global.quiet);
    Ok(())
}
