use crate::error::{AppError, Result};
use crate::ml::classifier::TrainedModel;
use crate::ml::models::Prediction;
use crate::models::Reading;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Load-once holder for the model artifact.
///
/// The first successful load wins; every later caller shares the same
/// immutable model. A failed load leaves the cache empty so it can be retried.
#[derive(Debug, Default)]
pub struct ModelCache {
    path: Option<PathBuf>,
    cell: OnceCell<Arc<TrainedModel>>,
}

impl ModelCache {
    /// Cache that loads from `path` on first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cell: OnceCell::new(),
        }
    }

    /// Cache with no artifact configured
    pub fn empty() -> Self {
        Self::default()
    }

    /// Cache pre-filled with an in-memory model
    pub fn from_model(model: TrainedModel) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Arc::new(model));
        Self { path: None, cell }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Load the artifact on first call, then return the shared instance
    pub fn get_or_load(&self) -> Result<Arc<TrainedModel>> {
        self.cell
            .get_or_try_init(|| {
                let path = self.path.as_deref().ok_or_else(|| {
                    AppError::ModelUnavailable("No model artifact configured".to_string())
                })?;

                let started = Instant::now();
                let model = TrainedModel::load(path)?;
                let elapsed = started.elapsed().as_secs_f64();
                crate::metrics::observe_model_load(elapsed);

                info!(path = %path.display(), seconds = elapsed, "🧠 Model ready");
                Ok(Arc::new(model))
            })
            .cloned()
    }

    /// Attempt the startup load without failing the caller
    pub fn preload(&self) -> bool {
        match self.get_or_load() {
            Ok(_) => true,
            Err(e) => {
                warn!("Model not loaded, predictions unavailable: {}", e);
                false
            }
        }
    }

    /// Predict with the cached model, loading it if needed
    pub fn predict(&self, reading: &Reading) -> Result<Prediction<String>> {
        let model = self.get_or_load().map_err(|e| match e {
            AppError::ModelUnavailable(_) => e,
            other => AppError::ModelUnavailable(format!("Model could not be loaded: {}", other)),
        })?;
        model.predict(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::features::LabelSource;
    use crate::ml::models::{MLConfig, ModelType, TrainingDataset};
    use crate::models::HistoricalRecord;
    use tempfile::TempDir;

    fn model() -> TrainedModel {
        let records: Vec<HistoricalRecord> = [5.0, 20.0, 28.0]
            .iter()
            .map(|&t| HistoricalRecord::new(Reading::new(t, 45.0, 2.0, 6.2)))
            .collect();
        let dataset = TrainingDataset::from_records(&records, LabelSource::Generated).unwrap();
        let config = MLConfig {
            algorithm: ModelType::DecisionTree,
            ..Default::default()
        };
        TrainedModel::train(&dataset, &config).unwrap()
    }

    #[test]
    fn test_empty_cache_is_unavailable() {
        let cache = ModelCache::empty();
        assert!(!cache.is_loaded());
        assert!(!cache.preload());
        assert!(matches!(
            cache.predict(&Reading::new(20.0, 45.0, 2.0, 6.2)),
            Err(AppError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_loads_once_and_shares() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");
        model().save(&path).unwrap();

        let cache = ModelCache::new(&path);
        let first = cache.get_or_load().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_load_can_retry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");
        let cache = ModelCache::new(&path);

        assert!(cache.get_or_load().is_err());
        model().save(&path).unwrap();
        assert!(cache.get_or_load().is_ok());
    }

    #[test]
    fn test_from_model_predicts() {
        let cache = ModelCache::from_model(model());
        assert!(cache.is_loaded());
        assert!(cache.predict(&Reading::new(20.0, 45.0, 2.0, 6.2)).is_ok());
    }
}
