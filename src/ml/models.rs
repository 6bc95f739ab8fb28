use crate::error::{AppError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ML model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MLConfig {
    /// Algorithm to fit
    #[serde(default)]
    pub algorithm: ModelType,

    /// Number of trees in the forest
    #[serde(default = "default_n_trees")]
    pub n_trees: u16,

    /// Maximum tree depth (unbounded when absent)
    #[serde(default)]
    pub max_depth: Option<u16>,

    /// Minimum samples required to split a node
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Random seed for bootstrap sampling
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Fraction of rows held out for validation metrics (0.0 = none)
    #[serde(default)]
    pub validation_split: f64,
}

impl Default for MLConfig {
    fn default() -> Self {
        Self {
            algorithm: ModelType::RandomForest,
            n_trees: default_n_trees(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            seed: default_seed(),
            validation_split: 0.0,
        }
    }
}

impl MLConfig {
    /// Reject parameters the fitting code cannot use
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(AppError::Validation("n_trees must be at least 1".to_string()));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(AppError::Validation(format!(
                "validation_split must be in [0, 1), got {}",
                self.validation_split
            )));
        }
        if self.min_samples_split < 2 {
            return Err(AppError::Validation(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    /// Hyperparameters as reported in model metadata
    pub fn hyperparameters(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if self.algorithm == ModelType::RandomForest {
            params.insert("n_trees".to_string(), self.n_trees.to_string());
        }
        params.insert(
            "max_depth".to_string(),
            self.max_depth
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string()),
        );
        params.insert(
            "min_samples_split".to_string(),
            self.min_samples_split.to_string(),
        );
        params.insert("seed".to_string(), self.seed.to_string());
        params
    }
}

fn default_n_trees() -> u16 {
    100
}

fn default_min_samples_split() -> usize {
    2
}

fn default_seed() -> u64 {
    42
}

/// Prediction result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction<T> {
    /// Predicted value
    pub value: T,

    /// Encoded class index the model emitted
    pub class_index: usize,

    /// Algorithm that produced the prediction
    pub model_type: ModelType,
}

impl<T> Prediction<T> {
    pub fn new(value: T, class_index: usize, model_type: ModelType) -> Self {
        Self {
            value,
            class_index,
            model_type,
        }
    }
}

/// Training sample for ML models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Feature vector
    pub features: Vec<f64>,

    /// Recommendation label
    pub label: String,
}

impl TrainingSample {
    pub fn new(features: Vec<f64>, label: impl Into<String>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }
}

/// Training dataset
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// Feature matrix (n_samples × n_features)
    pub features: Array2<f64>,

    /// One label per row
    pub labels: Vec<String>,

    /// Number of samples
    pub n_samples: usize,

    /// Number of features
    pub n_features: usize,
}

impl TrainingDataset {
    /// Create a new training dataset from samples
    pub fn from_samples(samples: &[TrainingSample]) -> Result<Self> {
        let n_samples = samples.len();
        let n_features = samples.first().map(|s| s.features.len()).unwrap_or(0);

        let mut features = Array2::zeros((n_samples, n_features));
        let mut labels = Vec::with_capacity(n_samples);

        for (i, sample) in samples.iter().enumerate() {
            if sample.features.len() != n_features {
                return Err(AppError::Validation(format!(
                    "Sample {} has {} features, expected {}",
                    i,
                    sample.features.len(),
                    n_features
                )));
            }
            for (j, &val) in sample.features.iter().enumerate() {
                features[[i, j]] = val;
            }
            labels.push(sample.label.clone());
        }

        Ok(Self {
            features,
            labels,
            n_samples,
            n_features,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    /// Split dataset into train/test sets, holding out the trailing rows
    pub fn train_test_split(&self, test_size: f64) -> (TrainingDataset, TrainingDataset) {
        let n_test = (self.n_samples as f64 * test_size) as usize;
        let n_train = self.n_samples - n_test;

        let train_features = self.features.slice(ndarray::s![..n_train, ..]).to_owned();
        let test_features = self.features.slice(ndarray::s![n_train.., ..]).to_owned();

        let train_dataset = TrainingDataset {
            features: train_features,
            labels: self.labels[..n_train].to_vec(),
            n_samples: n_train,
            n_features: self.n_features,
        };

        let test_dataset = TrainingDataset {
            features: test_features,
            labels: self.labels[n_train..].to_vec(),
            n_samples: n_test,
            n_features: self.n_features,
        };

        (train_dataset, test_dataset)
    }
}

/// Model evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Accuracy
    pub accuracy: f64,

    /// Macro-averaged precision
    pub precision: f64,

    /// Macro-averaged recall
    pub recall: f64,

    /// Macro-averaged F1 score
    pub f1_score: f64,

    /// Confusion matrix (rows = true class, columns = predicted class)
    pub confusion_matrix: Option<Array2<usize>>,

    /// Per-class metrics keyed by label
    pub per_class_metrics: HashMap<String, ClassMetrics>,
}

/// Per-class evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            confusion_matrix: None,
            per_class_metrics: HashMap::new(),
        }
    }

    /// Compare encoded true and predicted classes
    pub fn calculate(y_true: &[usize], y_pred: &[usize], class_names: &[String]) -> Self {
        let n_samples = y_true.len();
        let n_classes = class_names.len();
        if n_samples == 0 || n_classes == 0 {
            return Self::new();
        }

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t == p)
            .count();
        let accuracy = correct as f64 / n_samples as f64;

        let mut confusion = Array2::zeros((n_classes, n_classes));
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            if t < n_classes && p < n_classes {
                confusion[[t, p]] += 1;
            }
        }

        let mut per_class = HashMap::new();

        for (class_idx, name) in class_names.iter().enumerate() {
            let tp = confusion[[class_idx, class_idx]];
            let fp = confusion.column(class_idx).sum() - tp;
            let fn_count = confusion.row(class_idx).sum() - tp;

            let precision = if tp + fp > 0 {
                tp as f64 / (tp + fp) as f64
            } else {
                0.0
            };

            let recall = if tp + fn_count > 0 {
                tp as f64 / (tp + fn_count) as f64
            } else {
                0.0
            };

            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            per_class.insert(
                name.clone(),
                ClassMetrics {
                    precision,
                    recall,
                    f1_score: f1,
                    support: tp + fn_count,
                },
            );
        }

        let avg_precision: f64 =
            per_class.values().map(|m| m.precision).sum::<f64>() / n_classes as f64;
        let avg_recall: f64 =
            per_class.values().map(|m| m.recall).sum::<f64>() / n_classes as f64;
        let avg_f1: f64 =
            per_class.values().map(|m| m.f1_score).sum::<f64>() / n_classes as f64;

        Self {
            accuracy,
            precision: avg_precision,
            recall: avg_recall,
            f1_score: avg_f1,
            confusion_matrix: Some(confusion),
            per_class_metrics: per_class,
        }
    }
}

impl Default for ModelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Crate version that trained the model
    pub version: String,

    /// Model type
    pub model_type: ModelType,

    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of training samples
    pub n_training_samples: usize,

    /// Number of features
    pub n_features: usize,

    /// Number of distinct labels
    pub n_classes: usize,

    /// Training metrics
    pub training_metrics: ModelMetrics,

    /// Validation metrics
    pub validation_metrics: Option<ModelMetrics>,

    /// Hyperparameters
    pub hyperparameters: HashMap<String, String>,
}

impl ModelMetadata {
    pub fn new(model_type: ModelType, hyperparameters: HashMap<String, String>) -> Self {
        Self {
            name: model_type.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_type,
            trained_at: chrono::Utc::now(),
            n_training_samples: 0,
            n_features: 0,
            n_classes: 0,
            training_metrics: ModelMetrics::new(),
            validation_metrics: None,
            hyperparameters,
        }
    }
}

/// Model type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Random forest (bagged decision trees)
    #[default]
    RandomForest,

    /// Single decision tree
    DecisionTree,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::RandomForest => write!(f, "Random Forest"),
            ModelType::DecisionTree => write!(f, "Decision Tree"),
        }
    }
}

impl std::str::FromStr for ModelType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "random_forest" | "forest" => Ok(ModelType::RandomForest),
            "decision_tree" | "tree" => Ok(ModelType::DecisionTree),
            other => Err(AppError::Validation(format!("Unknown algorithm: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_dataset_from_samples() {
        let samples = vec![
            TrainingSample::new(vec![1.0, 2.0], "a"),
            TrainingSample::new(vec![3.0, 4.0], "b"),
            TrainingSample::new(vec![5.0, 6.0], "a"),
        ];

        let dataset = TrainingDataset::from_samples(&samples).unwrap();

        assert_eq!(dataset.n_samples, 3);
        assert_eq!(dataset.n_features, 2);
        assert_eq!(dataset.features.shape(), &[3, 2]);
        assert_eq!(dataset.labels, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_ragged_samples_rejected() {
        let samples = vec![
            TrainingSample::new(vec![1.0, 2.0], "a"),
            TrainingSample::new(vec![3.0], "b"),
        ];
        assert!(matches!(
            TrainingDataset::from_samples(&samples),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_train_test_split() {
        let samples: Vec<TrainingSample> = (0..100)
            .map(|i| {
                TrainingSample::new(
                    vec![i as f64, (i * 2) as f64],
                    if i % 2 == 0 { "even" } else { "odd" },
                )
            })
            .collect();

        let dataset = TrainingDataset::from_samples(&samples).unwrap();
        let (train, test) = dataset.train_test_split(0.2);

        assert_eq!(train.n_samples, 80);
        assert_eq!(test.n_samples, 20);
        assert_eq!(train.labels.len(), 80);
        assert_eq!(test.features[[0, 0]], 80.0);
    }

    #[test]
    fn test_metrics_calculation() {
        let classes = vec!["a".to_string(), "b".to_string()];
        let metrics = ModelMetrics::calculate(&[0, 0, 1, 1], &[0, 1, 1, 1], &classes);

        assert_eq!(metrics.accuracy, 0.75);
        let a = &metrics.per_class_metrics["a"];
        assert_eq!(a.precision, 1.0);
        assert_eq!(a.recall, 0.5);
        assert_eq!(a.support, 2);
        let confusion = metrics.confusion_matrix.unwrap();
        assert_eq!(confusion[[0, 1]], 1);
        assert_eq!(confusion[[1, 1]], 2);
    }

    #[test]
    fn test_ml_config_default() {
        let config = MLConfig::default();
        assert_eq!(config.algorithm, ModelType::RandomForest);
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ml_config_validation() {
        let config = MLConfig {
            validation_split: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_type_display_and_parse() {
        assert_eq!(ModelType::RandomForest.to_string(), "Random Forest");
        assert_eq!(
            "decision-tree".parse::<ModelType>().unwrap(),
            ModelType::DecisionTree
        );
        assert!("svm".parse::<ModelType>().is_err());
    }
}
