use crate::error::{AppError, Result};
use crate::ml::features::LABEL_COLUMN;
use crate::models::{Dimension, HistoricalRecord, Reading};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Name of the optional timestamp column
pub const DATE_COLUMN: &str = "Date";

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp cell. Bare dates become midnight.
pub fn parse_date(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AppError::Validation(format!("Unrecognised date: '{}'", raw)))
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;

    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| {
            AppError::CorruptArtifact(format!("Failed to parse CSV {}: {}", path.display(), e))
        })
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let values = column.f64()?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| AppError::missing([format!("{} (row {})", name, row + 1)]))
        })
        .collect()
}

fn optional_string_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<String>>>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };

    let column = column.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(Some(values))
}

/// Load the historical sensor log.
///
/// The four measurement columns are required; `Date` and `Recommendations`
/// are picked up when present.
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<HistoricalRecord>> {
    let path = path.as_ref();
    let df = read_frame(path)?;

    let missing: Vec<&str> = Dimension::all()
        .map(|d| d.column())
        .filter(|name| df.column(name).is_err())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::missing(missing));
    }

    let temperature = float_column(&df, Dimension::Temperature.column())?;
    let humidity = float_column(&df, Dimension::Humidity.column())?;
    let nutrients = float_column(&df, Dimension::Nutrients.column())?;
    let ph = float_column(&df, Dimension::Ph.column())?;

    let dates = optional_string_column(&df, DATE_COLUMN)?;
    let labels = optional_string_column(&df, LABEL_COLUMN)?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let reading = Reading::new(temperature[row], humidity[row], nutrients[row], ph[row]);
        let mut record = HistoricalRecord::new(reading);

        if let Some(dates) = &dates {
            if let Some(raw) = &dates[row] {
                record = record.with_date(parse_date(raw)?);
            }
        }
        if let Some(label) = labels.as_ref().and_then(|l| l[row].clone()) {
            record = record.with_label(label);
        }

        records.push(record);
    }

    info!(
        path = %path.display(),
        rows = records.len(),
        dated = dates.is_some(),
        labelled = labels.is_some(),
        "📈 Loaded historical data"
    );
    debug!(columns = df.width(), "CSV shape");

    Ok(records)
}
