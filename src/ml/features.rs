use crate::error::{AppError, Result};
use crate::ml::models::{TrainingDataset, TrainingSample};
use crate::models::{HistoricalRecord, Reading};
use crate::thresholds;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the label column in historical data files
pub const LABEL_COLUMN: &str = "Recommendations";

/// Where training labels come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// Use the labels already present on each record
    Column,

    /// Derive labels from the threshold rules
    Generated,
}

/// Training label for a reading, rendered by the threshold rules
pub fn generate_label(reading: &Reading) -> String {
    thresholds::recommendations(reading)
}

/// Feature vector in canonical dimension order
pub fn reading_features(reading: &Reading) -> Vec<f64> {
    reading.to_features().to_vec()
}

/// Feature matrix for a batch of readings
pub fn feature_matrix(readings: &[Reading]) -> Array2<f64> {
    let mut features = Array2::zeros((readings.len(), crate::models::Dimension::COUNT));
    for (i, reading) in readings.iter().enumerate() {
        for (j, value) in reading.to_features().iter().enumerate() {
            features[[i, j]] = *value;
        }
    }
    features
}

impl TrainingDataset {
    /// Build a dataset from historical rows
    pub fn from_records(records: &[HistoricalRecord], source: LabelSource) -> Result<Self> {
        let samples = records
            .iter()
            .map(|record| {
                let label = match source {
                    LabelSource::Generated => generate_label(&record.reading),
                    LabelSource::Column => record
                        .label
                        .clone()
                        .ok_or_else(|| AppError::missing([LABEL_COLUMN]))?,
                };
                Ok(TrainingSample::new(reading_features(&record.reading), label))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_samples(&samples)
    }
}

/// Bidirectional mapping between label strings and class indices.
///
/// Classes are kept sorted so the same label set always encodes the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let classes: BTreeSet<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| AppError::Validation(format!("Unknown label: {}", label)))
    }

    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Class index {} out of range ({} classes)",
                    index,
                    self.classes.len()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_encoder_roundtrip() {
        let encoder = LabelEncoder::fit(&["b", "a", "b", "c"]);

        assert_eq!(encoder.len(), 3);
        assert_eq!(encoder.classes(), &["a", "b", "c"]);
        assert_eq!(encoder.encode("b").unwrap(), 1);
        assert_eq!(encoder.decode(2).unwrap(), "c");
        assert!(encoder.encode("z").is_err());
        assert!(encoder.decode(3).is_err());
    }

    #[test]
    fn test_generated_labels_follow_rules() {
        let reading = Reading::new(32.0, 45.0, 2.0, 6.2);
        let label = generate_label(&reading);
        assert!(label.starts_with("Temperature (°C) est critique."));
        assert_eq!(label, thresholds::classify(&reading).recommendations);
    }

    #[test]
    fn test_from_records_generated() {
        let records = vec![
            HistoricalRecord::new(Reading::new(20.0, 45.0, 2.0, 6.2)),
            HistoricalRecord::new(Reading::new(50.0, 45.0, 2.0, 6.2)),
        ];

        let dataset = TrainingDataset::from_records(&records, LabelSource::Generated).unwrap();
        assert_eq!(dataset.n_samples, 2);
        assert_eq!(dataset.n_features, 4);
        assert_eq!(dataset.features[[1, 0]], 50.0);
        assert_ne!(dataset.labels[0], dataset.labels[1]);
    }

    #[test]
    fn test_from_records_column_requires_labels() {
        let records = vec![HistoricalRecord::new(Reading::new(20.0, 45.0, 2.0, 6.2))];

        match TrainingDataset::from_records(&records, LabelSource::Column) {
            Err(AppError::MissingField { fields }) => assert_eq!(fields, vec![LABEL_COLUMN]),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_matrix_order() {
        let matrix = feature_matrix(&[Reading::new(1.0, 2.0, 3.0, 4.0)]);
        assert_eq!(matrix.row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }
}
