//! Fan curve handlers.

use tabled::Tabled;

use fanlink_core::{CurvePoint, Session};

use crate::cli::{CurveArgs, CurveCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Temp (°C)")]
    temp: String,
    #[tabled(rename = "Speed (%)")]
    speed: String,
}

/// Parse `30:20,70:100` into curve points, in the given order.
pub fn parse_points(raw: &str) -> Result<Vec<CurvePoint>, CliError> {
    let invalid = |reason: String| CliError::Validation {
        field: "points".into(),
        reason,
    };

    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (x, y) = pair
                .split_once(':')
                .ok_or_else(|| invalid(format!("expected temp:speed, got '{pair}'")))?;
            let x: f64 = x
                .trim()
                .parse()
                .map_err(|_| invalid(format!("bad temperature in '{pair}'")))?;
            let y: f64 = y
                .trim()
                .parse()
                .map_err(|_| invalid(format!("bad speed in '{pair}'")))?;
            Ok(CurvePoint::new(x, y))
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: CurveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CurveCommand::Show => {
            let points = session.store().fetch_curve().await?;
            let out = output::render_single(global.output, points.as_slice(), |points| {
                let rows: Vec<PointRow> = points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| PointRow {
                        index: i + 1,
                        temp: format!("{:.1}", p.x),
                        speed: format!("{:.1}", p.y),
                    })
                    .collect();
                output::render_rows(&rows)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CurveCommand::Set { points } => {
            let points = parse_points(&points)?;
            if points.is_empty() {
                return Err(CliError::Validation {
                    field: "points".into(),
                    reason: "at least one temp:speed pair is required".into(),
                });
            }
            let count = points.len();
            session.store().save_curve(points).await?;
            if !global.quiet {
                eprintln!("Fan curve saved ({count} points)");
            }
            Ok(())
        }
    }
}
