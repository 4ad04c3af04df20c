//! History handler.

use tabled::Tabled;

use fanlink_core::{HistorySample, Session};

use crate::cli::{GlobalOpts, HistoryArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "CPU (°C)")]
    cpu_temp: String,
    #[tabled(rename = "Fan (%)")]
    fan_speed: String,
    #[tabled(rename = "Power (W)")]
    power: String,
}

impl From<&HistorySample> for SampleRow {
    fn from(s: &HistorySample) -> Self {
        Self {
            time: s
                .time
                .map_or_else(|| "-".into(), |t| t.format("%m-%d %H:%M:%S").to_string()),
            cpu_temp: output::opt_num(s.cpu_temp, 1),
            fan_speed: output::opt_num(s.fan_speed, 0),
            power: output::opt_num(s.power, 1),
        }
    }
}

pub async fn handle(
    session: &Session,
    args: HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let samples = session.store().fetch_history(args.range).await?;
    tracing::debug!(range = %args.range, count = samples.len(), "history fetched");
    let out = output::render_list(global.output, &samples, |s| SampleRow::from(s));
    output::print_output(&out, global.quiet);
    Ok(())
}
