use crate::data::history::DATE_COLUMN;
use crate::error::{AppError, Result};
use crate::ml::features::LABEL_COLUMN;
use crate::models::{Dimension, HistoricalRecord};
use crate::thresholds;
use chrono::{NaiveDateTime, Timelike};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Column holding the trained model's label for each row
pub const PREDICTIONS_COLUMN: &str = "Model Predictions";

fn format_date(date: &NaiveDateTime) -> String {
    if date.num_seconds_from_midnight() == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Write the records back out with rule recommendations regenerated and one
/// model prediction per row.
pub fn export_with_recommendations(
    records: &[HistoricalRecord],
    predictions: &[String],
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    if records.len() != predictions.len() {
        return Err(AppError::Validation(format!(
            "Got {} predictions for {} records",
            predictions.len(),
            records.len()
        )));
    }

    let mut columns: Vec<Column> = Vec::with_capacity(Dimension::COUNT + 3);

    if records.iter().any(|r| r.date.is_some()) {
        let dates: Vec<Option<String>> = records
            .iter()
            .map(|r| r.date.as_ref().map(format_date))
            .collect();
        columns.push(Column::new(DATE_COLUMN.into(), dates));
    }

    for dimension in Dimension::all() {
        let values: Vec<f64> = records.iter().map(|r| r.reading.value(dimension)).collect();
        columns.push(Column::new(dimension.column().into(), values));
    }

    let recommendations: Vec<String> = records
        .iter()
        .map(|r| thresholds::recommendations(&r.reading))
        .collect();
    columns.push(Column::new(LABEL_COLUMN.into(), recommendations));
    columns.push(Column::new(PREDICTIONS_COLUMN.into(), predictions.to_vec()));

    let mut df = DataFrame::new(columns)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    info!(path = %path.display(), rows = df.height(), "💾 Exported recommendations");
    Ok(())
}
