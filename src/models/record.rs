use crate::models::Reading;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the historical sensor log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalRecord {
    /// Sample timestamp, absent when the file has no `Date` column
    pub date: Option<NaiveDateTime>,

    /// Measured values
    pub reading: Reading,

    /// Recommendation label, when the file carries one
    pub label: Option<String>,
}

impl HistoricalRecord {
    pub fn new(reading: Reading) -> Self {
        Self {
            date: None,
            reading,
            label: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
