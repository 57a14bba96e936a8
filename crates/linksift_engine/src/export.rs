use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use linksift_core::Link;
use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Urls,
    Table,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "urls" => Ok(Self::Urls),
            "table" => Ok(Self::Table),
            other => Err(format!(
                "unknown export format {other:?} (expected json, csv, urls or table)"
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Urls => "urls",
            Self::Table => "table",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Pretty-printed JSON of any serializable value.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_links(links: &[Link], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(links),
        ExportFormat::Csv => Ok(to_csv(links)),
        ExportFormat::Urls => Ok(to_url_list(links)),
        ExportFormat::Table => Ok(to_table(links)),
    }
}

fn columns(first: &Link) -> Vec<&'static str> {
    let mut columns = vec!["name", "link", "source"];
    if first.excluded_by.is_some() {
        columns.push("excludedBy");
    }
    columns
}

fn cell<'a>(link: &'a Link, column: &str) -> &'a str {
    match column {
        "name" => &link.name,
        "link" => &link.link,
        "source" => &link.source,
        _ => link.excluded_by.as_deref().unwrap_or(""),
    }
}

/// Header row from the first record, every value quoted with `"` doubled.
pub fn to_csv(links: &[Link]) -> String {
    let Some(first) = links.first() else {
        return String::new();
    };
    let columns = columns(first);
    let mut rows = Vec::with_capacity(links.len() + 1);
    rows.push(columns.join(","));
    for link in links {
        let row = columns
            .iter()
            .map(|column| format!("\"{}\"", cell(link, column).replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",");
        rows.push(row);
    }
    rows.join("\n")
}

pub fn to_url_list(links: &[Link]) -> String {
    links
        .iter()
        .map(|link| link.link.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Box-drawn table with an index column.
pub fn to_table(links: &[Link]) -> String {
    let Some(first) = links.first() else {
        return String::new();
    };
    let mut headers = vec!["(index)"];
    headers.extend(columns(first));

    let rows: Vec<Vec<String>> = links
        .iter()
        .enumerate()
        .map(|(index, link)| {
            let mut row = vec![index.to_string()];
            row.extend(headers[1..].iter().map(|c| cell(link, c).to_string()));
            row
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!(" {cell}{} ", " ".repeat(pad))
            })
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = vec![rule("┌", "┬", "┐"), line(header_cells.as_slice()), rule("├", "┼", "┤")];
    out.extend(rows.iter().map(|row| line(row.as_slice())));
    out.push(rule("└", "┴", "┘"));
    out.join("\n")
}

/// Atomically writes `content` to `path`, creating parent directories.
pub fn write_export(path: &Path, content: &str) -> Result<PathBuf, ExportError> {
    let (writer, filename) = AtomicFileWriter::for_path(path)?;
    Ok(writer.write(&filename, content)?)
}
