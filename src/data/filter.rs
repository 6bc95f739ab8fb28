use crate::data::history::DATE_COLUMN;
use crate::error::{AppError, Result};
use crate::models::{Dimension, HistoricalRecord, Tier};
use crate::thresholds::tier_for;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AppError::Validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether a timestamp falls on any day of the range
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let day = timestamp.date();
        self.start <= day && day <= self.end
    }

    /// Narrow with optional overrides, keeping the current bound otherwise
    pub fn with_overrides(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        Self::new(start.unwrap_or(self.start), end.unwrap_or(self.end))
    }
}

/// Earliest and latest day in the data, the default filter range
pub fn date_bounds(records: &[HistoricalRecord]) -> Result<DateRange> {
    let mut days = records.iter().filter_map(|r| r.date.map(|d| d.date()));

    let first = days.next().ok_or_else(|| AppError::missing([DATE_COLUMN]))?;
    let (start, end) = days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

    DateRange::new(start, end)
}

/// Records whose date falls inside the range. Undated records are dropped.
pub fn filter_by_date(records: &[HistoricalRecord], range: &DateRange) -> Vec<HistoricalRecord> {
    records
        .iter()
        .filter(|r| r.date.as_ref().is_some_and(|d| range.contains(d)))
        .cloned()
        .collect()
}

/// One point of a per-dimension time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDateTime,
    pub value: f64,
    pub tier: Tier,
}

/// Time series of one dimension, sorted by date
pub fn series(records: &[HistoricalRecord], dimension: Dimension) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = records
        .iter()
        .filter_map(|r| {
            let date = r.date?;
            let value = r.reading.value(dimension);
            Some(SeriesPoint {
                date,
                value,
                tier: tier_for(dimension, value),
            })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points
}
