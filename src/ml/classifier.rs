use crate::error::{AppError, Result};
use crate::ml::features::{feature_matrix, LabelEncoder};
use crate::ml::models::{
    MLConfig, ModelMetadata, ModelMetrics, ModelType, Prediction, TrainingDataset,
};
use crate::models::Reading;
use linfa::prelude::*;
use linfa_trees::{DecisionTree, DecisionTreeParams, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

type Tree = DecisionTree<f64, usize>;

/// Trait for classifiers over encoded class indices
pub trait Classifier: Send + Sync {
    /// Fit on a feature matrix and one encoded class per row
    fn train(&mut self, features: &Array2<f64>, classes: &[usize]) -> Result<()>;

    /// Predict encoded class indices
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>>;

    /// Get model type
    fn model_type(&self) -> ModelType;

    /// Check if model is trained
    fn is_trained(&self) -> bool;
}

/// Fully grown CART parameters; leaves stay pure unless `max_depth` cuts them
fn tree_params(max_depth: Option<u16>, min_samples_split: usize) -> DecisionTreeParams<f64, usize> {
    DecisionTree::params()
        .split_quality(SplitQuality::Gini)
        .max_depth(max_depth.map(usize::from))
        .min_weight_split(min_samples_split as f32)
        .min_weight_leaf(1.0)
}

fn fit_tree(
    params: DecisionTreeParams<f64, usize>,
    features: Array2<f64>,
    classes: Array1<usize>,
) -> Result<Tree> {
    params
        .fit(&Dataset::new(features, classes))
        .map_err(|e| AppError::Training(format!("Decision tree training failed: {}", e)))
}

fn untrained() -> AppError {
    AppError::ModelUnavailable("Model not trained".to_string())
}

/// Random forest: bootstrap-sampled trees combined by majority vote
#[derive(Serialize, Deserialize)]
pub struct RandomForestModel {
    n_trees: u16,
    max_depth: Option<u16>,
    min_samples_split: usize,
    seed: u64,
    n_classes: usize,
    trees: Vec<Tree>,
}

impl RandomForestModel {
    pub fn new(config: &MLConfig) -> Self {
        Self {
            n_trees: config.n_trees,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            seed: config.seed,
            n_classes: 0,
            trees: Vec::new(),
        }
    }

    /// Per-row vote counts, one slot per class
    fn votes(&self, features: &Array2<f64>) -> Vec<Vec<u32>> {
        let mut votes = vec![vec![0u32; self.n_classes]; features.nrows()];
        for tree in &self.trees {
            for (row, class) in tree.predict(features).iter().enumerate() {
                if let Some(count) = votes[row].get_mut(*class) {
                    *count += 1;
                }
            }
        }
        votes
    }
}

impl Classifier for RandomForestModel {
    fn train(&mut self, features: &Array2<f64>, classes: &[usize]) -> Result<()> {
        let n_rows = features.nrows();
        if n_rows == 0 || n_rows != classes.len() {
            return Err(AppError::Training(format!(
                "Expected one class per row, got {} rows and {} classes",
                n_rows,
                classes.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(usize::from(self.n_trees));
        for _ in 0..self.n_trees {
            let rows: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let sample = features.select(Axis(0), &rows);
            let targets: Array1<usize> = rows.iter().map(|&r| classes[r]).collect();
            trees.push(fit_tree(
                tree_params(self.max_depth, self.min_samples_split),
                sample,
                targets,
            )?);
        }

        self.n_classes = classes.iter().max().map_or(0, |&c| c + 1);
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        if self.trees.is_empty() {
            return Err(untrained());
        }

        // Ties go to the lowest class index
        Ok(self
            .votes(features)
            .into_iter()
            .map(|counts| {
                counts
                    .iter()
                    .enumerate()
                    .fold((0, 0), |best, (class, &n)| if n > best.1 { (class, n) } else { best })
                    .0
            })
            .collect())
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }
}

/// Single CART decision tree
#[derive(Serialize, Deserialize)]
pub struct DecisionTreeModel {
    max_depth: Option<u16>,
    min_samples_split: usize,
    model: Option<Tree>,
}

impl DecisionTreeModel {
    pub fn new(config: &MLConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            model: None,
        }
    }
}

impl Classifier for DecisionTreeModel {
    fn train(&mut self, features: &Array2<f64>, classes: &[usize]) -> Result<()> {
        let model = fit_tree(
            tree_params(self.max_depth, self.min_samples_split),
            features.clone(),
            Array1::from(classes.to_vec()),
        )?;

        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let model = self.model.as_ref().ok_or_else(untrained)?;
        Ok(model.predict(features).to_vec())
    }

    fn model_type(&self) -> ModelType {
        ModelType::DecisionTree
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }
}

/// Concrete classifier stored inside an artifact
#[derive(Serialize, Deserialize)]
pub enum ClassifierModel {
    RandomForest(RandomForestModel),
    DecisionTree(DecisionTreeModel),
}

impl ClassifierModel {
    pub fn new(config: &MLConfig) -> Self {
        match config.algorithm {
            ModelType::RandomForest => ClassifierModel::RandomForest(RandomForestModel::new(config)),
            ModelType::DecisionTree => ClassifierModel::DecisionTree(DecisionTreeModel::new(config)),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierModel::RandomForest(m) => m,
            ClassifierModel::DecisionTree(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            ClassifierModel::RandomForest(m) => m,
            ClassifierModel::DecisionTree(m) => m,
        }
    }
}

impl Classifier for ClassifierModel {
    fn train(&mut self, features: &Array2<f64>, classes: &[usize]) -> Result<()> {
        self.inner_mut().train(features, classes)
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        self.inner().predict(features)
    }

    fn model_type(&self) -> ModelType {
        self.inner().model_type()
    }

    fn is_trained(&self) -> bool {
        self.inner().is_trained()
    }
}

/// A fitted classifier with its label encoding and metadata.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Serialize, Deserialize)]
pub struct TrainedModel {
    metadata: ModelMetadata,
    encoder: LabelEncoder,
    classifier: ClassifierModel,
}

impl TrainedModel {
    /// Fit a model on a dataset, optionally reporting holdout metrics
    pub fn train(dataset: &TrainingDataset, config: &MLConfig) -> Result<Self> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(AppError::Validation(
                "Cannot train on an empty dataset".to_string(),
            ));
        }

        let (train_set, validation_set) = if config.validation_split > 0.0 {
            let (train, test) = dataset.train_test_split(config.validation_split);
            if train.is_empty() {
                return Err(AppError::Validation(
                    "Validation split leaves no training rows".to_string(),
                ));
            }
            (train, Some(test).filter(|t| !t.is_empty()))
        } else {
            (dataset.clone(), None)
        };

        let encoder = LabelEncoder::fit(&dataset.labels);
        let classes = encoder.encode_all(&train_set.labels)?;

        info!(
            algorithm = %config.algorithm,
            samples = train_set.n_samples,
            classes = encoder.len(),
            "Training classifier"
        );

        let mut classifier = ClassifierModel::new(config);
        classifier.train(&train_set.features, &classes)?;

        let predicted = classifier.predict(&train_set.features)?;
        let training_metrics = ModelMetrics::calculate(&classes, &predicted, encoder.classes());

        let mut metadata = ModelMetadata::new(config.algorithm, config.hyperparameters());
        metadata.n_training_samples = train_set.n_samples;
        metadata.n_features = train_set.n_features;
        metadata.n_classes = encoder.len();
        metadata.training_metrics = training_metrics;

        debug!(
            accuracy = metadata.training_metrics.accuracy,
            f1 = metadata.training_metrics.f1_score,
            "Training metrics"
        );

        let mut model = Self {
            metadata,
            encoder,
            classifier,
        };
        if let Some(holdout) = validation_set {
            let metrics = model.evaluate(&holdout)?;
            debug!(accuracy = metrics.accuracy, "Validation metrics");
            model.metadata.validation_metrics = Some(metrics);
        }

        Ok(model)
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn model_type(&self) -> ModelType {
        self.classifier.model_type()
    }

    /// Labels this model can emit
    pub fn classes(&self) -> &[String] {
        self.encoder.classes()
    }

    /// Predict the label for a single reading
    pub fn predict(&self, reading: &Reading) -> Result<Prediction<String>> {
        let indices = self
            .classifier
            .predict(&feature_matrix(std::slice::from_ref(reading)))?;
        let index = indices
            .first()
            .copied()
            .ok_or_else(|| AppError::Internal("Model returned no prediction".to_string()))?;

        let label = self.encoder.decode(index)?.to_string();
        Ok(Prediction::new(label, index, self.model_type()))
    }

    /// Predict labels for a batch of readings, in input order
    pub fn predict_many(&self, readings: &[Reading]) -> Result<Vec<String>> {
        if readings.is_empty() {
            return Ok(Vec::new());
        }

        self.classifier
            .predict(&feature_matrix(readings))?
            .into_iter()
            .map(|index| self.encoder.decode(index).map(str::to_string))
            .collect()
    }

    /// Score the model against a labelled dataset
    pub fn evaluate(&self, dataset: &TrainingDataset) -> Result<ModelMetrics> {
        if dataset.is_empty() {
            return Ok(ModelMetrics::new());
        }
        let truth = self.encoder.encode_all(&dataset.labels)?;
        let predicted = self.classifier.predict(&dataset.features)?;
        Ok(ModelMetrics::calculate(&truth, &predicted, self.encoder.classes()))
    }

    pub(crate) fn is_trained(&self) -> bool {
        self.classifier.is_trained()
    }
}

impl std::fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedModel")
            .field("model_type", &self.model_type())
            .field("classes", &self.classes().len())
            .field("trained_at", &self.metadata.trained_at)
            .finish()
    }
}
