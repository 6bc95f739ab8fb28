/// Trained-model predictor for sensor readings
///
/// This module provides:
/// - Random forest and decision tree classifiers over the four reading dimensions
/// - Label encoding and rule-generated training labels
/// - Versioned binary artifacts for trained models
/// - A load-once cache sharing one immutable model across callers
/// - The offline training pipeline

pub mod classifier;
pub mod features;
pub mod models;
pub mod persistence;
pub mod service;
pub mod training;

pub use classifier::{Classifier, ClassifierModel, TrainedModel};
pub use features::{generate_label, LabelEncoder, LabelSource, LABEL_COLUMN};
pub use models::{
    ClassMetrics, MLConfig, ModelMetadata, ModelMetrics, ModelType, Prediction, TrainingDataset,
    TrainingSample,
};
pub use persistence::{load, save};
pub use service::ModelCache;
pub use training::{resolve_label_source, TrainingJob, TrainingReport};
