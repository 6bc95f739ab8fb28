use crate::data::{export_with_recommendations, load_history};
use crate::error::Result;
use crate::ml::classifier::TrainedModel;
use crate::ml::features::LabelSource;
use crate::ml::models::{MLConfig, ModelMetrics, ModelType, TrainingDataset};
use crate::models::{HistoricalRecord, Reading};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Inputs of one offline training run
#[derive(Debug, Clone)]
pub struct TrainingJob {
    pub data_path: PathBuf,
    pub model_path: PathBuf,

    /// Where to write the data with predictions, if anywhere
    pub output_path: Option<PathBuf>,

    /// Ignore any label column and derive labels from the rules
    pub generate_labels: bool,
}

/// Outcome of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub algorithm: ModelType,
    pub label_source: LabelSource,
    pub samples: usize,
    pub classes: usize,
    pub training_metrics: ModelMetrics,
    pub validation_metrics: Option<ModelMetrics>,
    pub model_path: PathBuf,
    pub output_path: Option<PathBuf>,
}

/// Labels come from the file when it has any, otherwise from the rules
pub fn resolve_label_source(records: &[HistoricalRecord], generate: bool) -> LabelSource {
    if generate || records.iter().all(|r| r.label.is_none()) {
        LabelSource::Generated
    } else {
        LabelSource::Column
    }
}

impl TrainingJob {
    /// Load, fit, save, then score the full history and export it
    pub fn run(&self, config: &MLConfig) -> Result<TrainingReport> {
        let records = load_history(&self.data_path)?;
        let label_source = resolve_label_source(&records, self.generate_labels);
        info!(?label_source, rows = records.len(), "Preparing training data");

        let dataset = TrainingDataset::from_records(&records, label_source)?;
        let model = TrainedModel::train(&dataset, config)?;
        model.save(&self.model_path)?;

        if let Some(output) = &self.output_path {
            let readings: Vec<Reading> = records.iter().map(|r| r.reading).collect();
            let predictions = model.predict_many(&readings)?;
            export_with_recommendations(&records, &predictions, output)?;
        }

        let metadata = model.metadata();
        info!(
            accuracy = metadata.training_metrics.accuracy,
            classes = metadata.n_classes,
            "✅ Training complete"
        );

        Ok(TrainingReport {
            algorithm: metadata.model_type,
            label_source,
            samples: metadata.n_training_samples,
            classes: metadata.n_classes,
            training_metrics: metadata.training_metrics.clone(),
            validation_metrics: metadata.validation_metrics.clone(),
            model_path: self.model_path.clone(),
            output_path: self.output_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_source_resolution() {
        let unlabelled = vec![HistoricalRecord::new(Reading::new(20.0, 45.0, 2.0, 6.2))];
        let labelled =
            vec![HistoricalRecord::new(Reading::new(20.0, 45.0, 2.0, 6.2)).with_label("x")];

        assert_eq!(resolve_label_source(&unlabelled, false), LabelSource::Generated);
        assert_eq!(resolve_label_source(&labelled, false), LabelSource::Column);
        assert_eq!(resolve_label_source(&labelled, true), LabelSource::Generated);
    }
}
