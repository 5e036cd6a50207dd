use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::NumericSeries;

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// Which column of the table holds the values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnSelector {
    /// Zero-based column position.
    Position(usize),
    /// Header name, matched after trimming and ignoring ASCII case.
    Named(String),
}

impl Default for ColumnSelector {
    /// The value column is the second one by convention (the first is a timestamp).
    fn default() -> Self {
        ColumnSelector::Position(1)
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Position(i) => write!(f, "column #{i}"),
            ColumnSelector::Named(name) => write!(f, "column '{name}'"),
        }
    }
}

impl ColumnSelector {
    /// Resolve against a list of header names.
    fn resolve<'a>(&self, headers: impl IntoIterator<Item = &'a str>) -> Option<usize> {
        let mut headers = headers.into_iter();
        match self {
            ColumnSelector::Position(i) => headers.nth(*i).map(|_| *i),
            ColumnSelector::Named(name) => {
                let wanted = name.trim();
                headers.position(|h| h.trim().eq_ignore_ascii_case(wanted))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Source format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

impl SourceFormat {
    /// Dispatch by extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "parquet" | "pq" => Ok(SourceFormat::Parquet),
            other => bail!("Unsupported file extension: .{other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one value column from a file.
///
/// Supported formats:
/// * `.csv`     – header row, values in the selected column
/// * `.json`    – `[{ "date": "...", "pm25": 12.3, ... }, ...]`
/// * `.parquet` – any numeric or string column
pub fn load_series(path: &Path, selector: &ColumnSelector) -> Result<NumericSeries> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_series(&bytes, format, &source_label(path), selector)
}

/// Parse raw file content that has already been read into memory.
pub fn parse_series(
    bytes: &[u8],
    format: SourceFormat,
    label: &str,
    selector: &ColumnSelector,
) -> Result<NumericSeries> {
    let label = format!("{label} [{selector}]");
    let series = match format {
        SourceFormat::Csv => series_from_csv_reader(bytes, label, selector),
        SourceFormat::Json => series_from_json(bytes, label, selector)?,
        SourceFormat::Parquet => series_from_parquet(bytes, label, selector)?,
    };

    log::info!(
        "Loaded {} values from {} ({} rows dropped)",
        series.len(),
        series.label,
        series.dropped
    );
    if series.dropped > series.len() {
        log::warn!(
            "{}: more rows were dropped ({}) than kept ({})",
            series.label,
            series.dropped,
            series.len()
        );
    }
    Ok(series)
}

/// File name used as the series label.
pub fn source_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse a finite number from a cell, or nothing.
fn parse_cell(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Pull one column out of CSV text. Never fails: unusable rows are skipped and
/// a missing column yields an empty series.
pub fn series_from_csv_str(text: &str, selector: &ColumnSelector) -> NumericSeries {
    series_from_csv_reader(text.as_bytes(), "csv".to_string(), selector)
}

fn csv_reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes)
}

fn series_from_csv_reader(bytes: &[u8], label: String, selector: &ColumnSelector) -> NumericSeries {
    let mut reader = csv_reader(bytes);
    let col_idx = match reader.headers() {
        Ok(headers) => selector.resolve(headers.iter()),
        Err(e) => {
            log::warn!("{label}: unreadable CSV header: {e}");
            None
        }
    };

    let mut values = Vec::new();
    let mut dropped = 0;

    for (row_no, result) in reader.records().enumerate() {
        let value = match (&result, col_idx) {
            (Ok(record), Some(idx)) => record.get(idx).and_then(parse_cell),
            _ => None,
        };
        match value {
            Some(v) => values.push(v),
            None => {
                log::trace!("{label}: skipping CSV row {row_no}");
                dropped += 1;
            }
        }
    }

    if col_idx.is_none() {
        log::warn!("{label}: column not found");
    }
    NumericSeries::from_parts(label, values, dropped)
}

/// Read `"<POLLUTANT> PREDICTED"` and `"<POLLUTANT> TARGET"` from a single
/// CSV. A row is kept only when both cells parse, so the pair stays aligned.
pub fn paired_from_csv_str(text: &str, pollutant: &str) -> (NumericSeries, NumericSeries) {
    let predicted_name = format!("{pollutant} PREDICTED");
    let target_name = format!("{pollutant} TARGET");

    let mut reader = csv_reader(text.as_bytes());
    let columns = reader.headers().ok().and_then(|headers| {
        let p = ColumnSelector::Named(predicted_name.clone()).resolve(headers.iter())?;
        let t = ColumnSelector::Named(target_name.clone()).resolve(headers.iter())?;
        Some((p, t))
    });

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut dropped = 0;

    if let Some((p_idx, t_idx)) = columns {
        for record in reader.records() {
            let pair = record.ok().and_then(|r| {
                let x = r.get(p_idx).and_then(parse_cell)?;
                let y = r.get(t_idx).and_then(parse_cell)?;
                Some((x, y))
            });
            match pair {
                Some((x, y)) => {
                    xs.push(x);
                    ys.push(y);
                }
                None => dropped += 1,
            }
        }
    } else {
        log::warn!("CSV lacks '{predicted_name}' / '{target_name}' columns");
    }

    (
        NumericSeries::from_parts(predicted_name, xs, dropped),
        NumericSeries::from_parts(target_name, ys, dropped),
    )
}

/// File-based wrapper around [`paired_from_csv_str`].
pub fn load_paired(path: &Path, pollutant: &str) -> Result<(NumericSeries, NumericSeries)> {
    if SourceFormat::from_path(path)? != SourceFormat::Csv {
        bail!("Combined forecast files must be CSV: {}", path.display());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let (x, y) = paired_from_csv_str(&text, pollutant);
    log::info!(
        "Loaded {} {pollutant} pairs from {} ({} rows dropped)",
        x.len(),
        source_label(path),
        x.dropped
    );
    Ok((x, y))
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`):
///
/// ```json
/// [ { "date": "2024-01-01", "pm25": 12.5 }, ... ]
/// ```
///
/// Positional selectors index keys in document order.
fn series_from_json(bytes: &[u8], label: String, selector: &ColumnSelector) -> Result<NumericSeries> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut values = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for rec in records {
        let value = rec.as_object().and_then(|obj| {
            let idx = selector.resolve(obj.keys().map(String::as_str))?;
            let (_, cell) = obj.iter().nth(idx)?;
            json_to_f64(cell)
        });
        match value {
            Some(v) => values.push(v),
            None => dropped += 1,
        }
    }

    Ok(NumericSeries::from_parts(label, values, dropped))
}

fn json_to_f64(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        JsonValue::String(s) => parse_cell(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Load one column of a Parquet file. Integer and float columns are widened to
/// `f64`; string columns are parsed cell by cell; nulls are dropped.
fn series_from_parquet(bytes: &[u8], label: String, selector: &ColumnSelector) -> Result<NumericSeries> {
    let data = bytes::Bytes::copy_from_slice(bytes);
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(data).context("reading parquet metadata")?;

    let col_idx = selector.resolve(builder.schema().fields().iter().map(|f| f.name().as_str()));
    let Some(col_idx) = col_idx else {
        log::warn!("{label}: column not found");
        return Ok(NumericSeries::from_parts(label, Vec::new(), 0));
    };

    let reader = builder.build().context("building parquet reader")?;

    let mut values = Vec::new();
    let mut dropped = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for cell in column_to_f64(batch.column(col_idx))? {
            match cell.filter(|v| v.is_finite()) {
                Some(v) => values.push(v),
                None => dropped += 1,
            }
        }
    }

    Ok(NumericSeries::from_parts(label, values, dropped))
}

/// Convert an Arrow column to optional floats, one per row.
fn column_to_f64(col: &ArrayRef) -> Result<Vec<Option<f64>>> {
    match col.data_type() {
        DataType::Utf8 => Ok(col
            .as_string::<i32>()
            .iter()
            .map(|s| s.and_then(parse_cell))
            .collect()),
        DataType::LargeUtf8 => Ok(col
            .as_string::<i64>()
            .iter()
            .map(|s| s.and_then(parse_cell))
            .collect()),
        dt if dt.is_numeric() => {
            let casted = arrow::compute::cast(col, &DataType::Float64)
                .context("casting parquet column to Float64")?;
            Ok(casted.as_primitive::<Float64Type>().iter().collect())
        }
        other => bail!("Column type {other:?} cannot hold measurements"),
    }
}
