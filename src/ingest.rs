use crate::data::{Column, Dataset, Value, INDEX_COLUMN_MARKER};
use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Text shown to the user whenever an upload cannot be turned into a dataset.
pub const USER_ERROR_MESSAGE: &str = "There was an error processing this file.";

/// Cell contents treated as missing in delimited text.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Detect the format from the file name's extension.
    pub fn detect(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())?;
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "CSV"),
            FileFormat::Xlsx => write!(f, "XLSX"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("unsupported file format for '{filename}' (expected .csv or .xlsx)")]
    UnsupportedFormat { filename: String },
    #[error("malformed {format} content: {message}")]
    Parse { format: FileFormat, message: String },
}

impl IngestError {
    fn parse(format: FileFormat, message: impl Into<String>) -> Self {
        IngestError::Parse { format, message: message.into() }
    }

    /// Message suitable for showing next to the upload widget.
    pub fn user_message(&self) -> String {
        format!("{USER_ERROR_MESSAGE} ({self})")
    }
}

/// A cell before per-column type inference.
#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Text(String),
    Number(f64),
    Missing,
}

/// Decode an uploaded payload into a dataset.
pub fn ingest(filename: &str, bytes: &[u8]) -> Result<Dataset, IngestError> {
    let format = FileFormat::detect(filename).ok_or_else(|| IngestError::UnsupportedFormat {
        filename: filename.to_string(),
    })?;
    debug!(filename, %format, bytes = bytes.len(), "Decoding upload");

    let (headers, rows) = match format {
        FileFormat::Csv => read_csv(bytes)?,
        FileFormat::Xlsx => read_xlsx(bytes)?,
    };

    let mut dataset = build_dataset(headers, rows).map_err(|e| IngestError::parse(format, e.to_string()))?;

    let dropped = dataset.drop_index_columns();
    if !dropped.is_empty() {
        debug!(?dropped, "Dropped saved index columns");
    }

    info!(
        filename,
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Loaded dataset"
    );
    Ok(dataset)
}

fn read_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<RawCell>>), IngestError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestError::parse(FileFormat::Csv, format!("content is not valid UTF-8: {e}")))?;
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::parse(FileFormat::Csv, e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(IngestError::parse(FileFormat::Csv, "no columns to parse from file"));
    }

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| IngestError::parse(FileFormat::Csv, e.to_string()))?;
        if record.len() > headers.len() {
            return Err(IngestError::parse(
                FileFormat::Csv,
                format!(
                    "expected {} fields in data row {}, saw {}",
                    headers.len(),
                    line + 1,
                    record.len()
                ),
            ));
        }
        rows.push(record.iter().map(|s| RawCell::Text(s.to_string())).collect());
    }

    Ok((headers, rows))
}

fn read_xlsx(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<RawCell>>), IngestError> {
    use calamine::{Data, Reader, Xlsx};

    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| IngestError::parse(FileFormat::Xlsx, format!("cannot open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::parse(FileFormat::Xlsx, "workbook has no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::parse(FileFormat::Xlsx, format!("cannot read sheet '{sheet_name}': {e}")))?;

    let mut all_rows = range.rows().map(|row| {
        row.iter()
            .map(|cell| match cell {
                Data::Empty | Data::Error(_) => RawCell::Missing,
                Data::String(s) => RawCell::Text(s.clone()),
                Data::Float(f) => RawCell::Number(*f),
                Data::Int(i) => RawCell::Number(*i as f64),
                Data::Bool(b) => RawCell::Text(if *b { "True".to_string() } else { "False".to_string() }),
                Data::DateTime(dt) => RawCell::Text(dt.to_string()),
                Data::DateTimeIso(s) => RawCell::Text(s.clone()),
                Data::DurationIso(s) => RawCell::Text(s.clone()),
            })
            .collect::<Vec<RawCell>>()
    });

    let headers: Vec<String> = all_rows
        .next()
        .ok_or_else(|| IngestError::parse(FileFormat::Xlsx, format!("sheet '{sheet_name}' is empty")))?
        .into_iter()
        .map(|cell| match cell {
            RawCell::Text(s) => s,
            RawCell::Number(n) => Value::Number(n).label(),
            RawCell::Missing => String::new(),
        })
        .collect();

    Ok((headers, all_rows.collect()))
}

/// Give every header a unique name; blank headers become `Unnamed: <i>`.
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("{INDEX_COLUMN_MARKER}: {i}")
            } else {
                h
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

fn build_dataset(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> anyhow::Result<Dataset> {
    let headers = normalize_headers(headers);
    let mut columns = Vec::with_capacity(headers.len());

    for (col_idx, name) in headers.into_iter().enumerate() {
        let cells: Vec<&RawCell> = rows
            .iter()
            .map(|row| row.get(col_idx).unwrap_or(&RawCell::Missing))
            .collect();
        columns.push(Column::new(name, infer_column(&cells)));
    }

    Dataset::new(columns)
}

/// A column is numeric when every non-missing cell parses as a number.
fn infer_column(cells: &[&RawCell]) -> Vec<Value> {
    let parsed: Vec<Option<Value>> = cells
        .iter()
        .map(|cell| match cell {
            RawCell::Missing => Some(Value::Missing),
            RawCell::Number(n) => Some(Value::Number(*n)),
            RawCell::Text(s) if is_missing_marker(s) => Some(Value::Missing),
            RawCell::Text(s) => parse_number(s).map(Value::Number),
        })
        .collect();

    if parsed.iter().all(Option::is_some) {
        return parsed.into_iter().flatten().collect();
    }

    cells
        .iter()
        .map(|cell| match cell {
            RawCell::Missing => Value::Missing,
            RawCell::Number(n) => Value::Text(Value::Number(*n).label()),
            RawCell::Text(s) if is_missing_marker(s) => Value::Missing,
            RawCell::Text(s) => Value::Text(s.clone()),
        })
        .collect()
}

fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s.trim())
}

/// Parse a number, accepting `,` as a thousands separator.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let first = trimmed.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '-' | '+' | '.')) {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
