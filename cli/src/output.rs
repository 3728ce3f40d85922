//! Record printing for `get` and `list`.
//!
//! `text`, `table` and `csv` print a selection of columns; `json` and
//! `yaml` always print whole records.

use std::collections::BTreeSet;
use std::io::Write;

use clap::ValueEnum;
use etcd_schema_core::ResourceSchema;
use etcd_schema_store::Record;
use tracing::debug;

use crate::error::Result;

/// Print format of `get` and `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Table,
    Csv,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Whether `--fields` applies to this format.
    pub fn selects_fields(self) -> bool {
        !matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }
}

/// Whether one record (`get`) or a collection (`list`) is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Single,
    Collection,
}

/// Columns to print: the requested fields in the given order, otherwise the
/// primary key, the declared fields and then any other stored keys sorted.
pub fn columns(schema: &ResourceSchema, records: &[Record], requested: &[String]) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }

    let declared = schema.column_names();
    let extra: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.keys().map(String::as_str))
        .filter(|key| !declared.contains(key))
        .collect();

    declared
        .iter()
        .chain(extra.iter())
        .map(|name| (*name).to_string())
        .collect()
}

/// Prints `records` in `format`.
pub fn write_records(
    out: &mut dyn Write,
    format: OutputFormat,
    shape: Shape,
    schema: &ResourceSchema,
    records: &[Record],
    requested: &[String],
) -> Result<()> {
    if !format.selects_fields() && !requested.is_empty() {
        debug!("Ignoring --fields for {format:?} output");
    }

    match format {
        OutputFormat::Text => {
            let columns = columns(schema, records, requested);
            write_text(out, &columns, records)
        }
        OutputFormat::Table => {
            let columns = columns(schema, records, requested);
            write_table(out, &columns, records)
        }
        OutputFormat::Csv => {
            let columns = columns(schema, records, requested);
            write_csv(out, &columns, records)
        }
        OutputFormat::Json => {
            match (shape, records) {
                (Shape::Single, [record]) => serde_json::to_writer_pretty(&mut *out, record)?,
                _ => serde_json::to_writer_pretty(&mut *out, records)?,
            }
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Yaml => {
            match (shape, records) {
                (Shape::Single, [record]) => serde_yaml::to_writer(&mut *out, record)?,
                _ => serde_yaml::to_writer(&mut *out, records)?,
            }
            Ok(())
        }
    }
}

fn cell<'r>(record: &'r Record, column: &str) -> &'r str {
    record.get(column).map(String::as_str).unwrap_or_default()
}

fn write_text(out: &mut dyn Write, columns: &[String], records: &[Record]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        for column in columns {
            writeln!(out, "{column}: {}", cell(record, column))?;
        }
    }
    Ok(())
}

fn write_table(out: &mut dyn Write, columns: &[String], records: &[Record]) -> Result<()> {
    let widths: Vec<usize> = columns
        .iter()
        .map(|column| {
            records
                .iter()
                .map(|record| cell(record, column).chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let row = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    writeln!(out, "{}", row(columns.iter().map(String::as_str).collect()))?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(out, "{}", rule.join("  "))?;
    for record in records {
        let cells = columns.iter().map(|column| cell(record, column)).collect();
        writeln!(out, "{}", row(cells))?;
    }
    Ok(())
}

fn write_csv(out: &mut dyn Write, columns: &[String], records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|column| cell(record, column)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Splits a `--fields` value, trimming names and dropping empty ones.
pub fn parse_csv_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}
