//! Output formatting for the `thermohub` command line.
//!
//! Listings are rendered as JSON, as plain lines, or as an ASCII table.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use unicode_width::UnicodeWidthStr;

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON document
    Json,
    /// One value per line, exactly as stored on ThermoHub (default)
    #[default]
    Plain,
    /// ASCII table
    Table,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub type Row = Map<String, JsonValue>;

pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(arr) => serde_json::to_string(arr).unwrap_or_default(),
        JsonValue::Object(obj) => serde_json::to_string(obj).unwrap_or_default(),
    }
}

/// Render values that are raw JSON text (as returned by the dataset accessors).
///
/// Plain output prints the text unchanged; JSON output embeds the parsed values.
pub fn render_list(format: OutputFormat, header: &str, items: &[String]) -> String {
    match format {
        OutputFormat::Plain => items.iter().map(|item| format!("{}\n", item)).collect(),
        OutputFormat::Json => {
            let values: Vec<JsonValue> = items.iter().map(|item| parse_raw(item)).collect();
            to_json(&JsonValue::Array(values))
        }
        OutputFormat::Table => {
            let column = ColumnInfo::new(header);
            let rows: Vec<Row> = items
                .iter()
                .map(|item| {
                    let mut row = Row::new();
                    row.insert(header.to_string(), parse_raw(item));
                    row
                })
                .collect();
            format_as_table(&[column], &rows)
        }
    }
}

/// Render records with named columns.
pub fn render_rows(format: OutputFormat, columns: &[ColumnInfo], rows: &[Row]) -> String {
    match format {
        OutputFormat::Json => to_json(&JsonValue::Array(
            rows.iter().cloned().map(JsonValue::Object).collect(),
        )),
        OutputFormat::Plain => rows
            .iter()
            .map(|row| {
                let fields: Vec<String> = columns
                    .iter()
                    .map(|col| row.get(&col.name).map(format_value).unwrap_or_default())
                    .collect();
                format!("{}\n", fields.join("\t"))
            })
            .collect(),
        OutputFormat::Table => format_as_table(columns, rows),
    }
}

pub fn format_as_table(columns: &[ColumnInfo], rows: &[Row]) -> String {
    if columns.is_empty() {
        return "Empty set\n".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.name.width()).collect();
    for row in rows {
        for (i, col) in columns.iter().enumerate() {
            if let Some(value) = row.get(&col.name) {
                widths[i] = widths[i].max(format_value(value).width());
            }
        }
    }

    let mut output = String::new();
    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("| {} ", pad(&col.name, *w, Align::Center)))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    output.push_str(&separator);

    for row in rows {
        let row_str: String = columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| {
                let value = row.get(&col.name).cloned().unwrap_or(JsonValue::Null);
                let align = if matches!(value, JsonValue::Number(_)) {
                    Align::Right
                } else {
                    Align::Left
                };
                format!("| {} ", pad(&format_value(&value), *w, align))
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&separator);
    let row_text = if rows.len() == 1 { "row" } else { "rows" };
    output.push_str(&format!("{} {}\n", rows.len(), row_text));

    output
}

enum Align {
    Left,
    Right,
    Center,
}

/// Pad to a display width; `format!` width counts chars, not terminal columns.
fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(text.width());
    let (left, right) = match align {
        Align::Left => (0, fill),
        Align::Right => (fill, 0),
        Align::Center => (fill / 2, fill - fill / 2),
    };
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

fn parse_raw(item: &str) -> JsonValue {
    serde_json::from_str(item).unwrap_or_else(|_| JsonValue::String(item.to_string()))
}

fn to_json(value: &JsonValue) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_default();
    text.push('\n');
    text
}
