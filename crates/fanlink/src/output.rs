//! Output formatting: table or JSON.
//!
//! Table uses `tabled`, JSON uses serde. Watch lines are colored with
//! `owo-colors` when the terminal allows it.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Color a log level by severity.
pub fn paint_level(level: &str, color: bool) -> String {
    if !color {
        return level.to_owned();
    }
    match level.to_ascii_uppercase().as_str() {
        "ERROR" | "CRITICAL" => level.red().bold().to_string(),
        "WARNING" | "WARN" => level.yellow().to_string(),
        "DEBUG" => level.dimmed().to_string(),
        _ => level.cyan().to_string(),
    }
}

/// Dim secondary text such as timestamps.
pub fn paint_dim(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serializable items as a table or JSON.
pub fn render_list<T, R>(format: OutputFormat, data: &[T], to_row: impl Fn(&T) -> R) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
    }
}

/// Render a single serializable item; tables use `detail_fn`.
pub fn render_single<T>(format: OutputFormat, data: &T, detail_fn: impl Fn(&T) -> String) -> String
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Key/value detail table for single items.
pub fn render_pairs(pairs: &[(&str, String)]) -> String {
    let mut builder = tabled::builder::Builder::default();
    for (key, value) in pairs {
        builder.push_record([(*key).to_owned(), value.clone()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Table of pre-built rows, for views whose rows need more than the item.
pub fn render_rows<R: Tabled>(rows: &[R]) -> String {
    render_table(rows)
}

pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

/// Render an optional number with a fixed precision, or `-`.
pub fn opt_num(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.precision$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        name: &'static str,
    }

    #[test]
    fn json_list() {
        let out = render_list(OutputFormat::JsonCompact, &[Row { name: "a" }], |r| Row {
            name: r.name,
        });
        assert_eq!(out, r#"[{"name":"a"}]"#);
    }

    #[test]
    fn plain_level_without_color() {
        assert_eq!(paint_level("ERROR", false), "ERROR");
        assert_eq!(opt_num(None, 1), "-");
        assert_eq!(opt_num(Some(41.26), 1), "41.3");
    }

    #[test]
    fn pairs_table_contains_values() {
        let out = render_pairs(&[("Fan speed", "1200".into())]);
        assert!(out.contains("Fan speed"));
        assert!(out.contains("1200"));
    }
}
