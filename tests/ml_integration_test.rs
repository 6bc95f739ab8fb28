//! Integration tests for the trained-model pipeline
//!
//! These tests verify:
//! - Training on rule-generated and file-provided labels
//! - Artifact round trips preserving every prediction
//! - The offline training job end to end
//! - Load-once sharing through the model cache

use agrisense::{
    data::load_history,
    error::AppError,
    ml::{
        generate_label, LabelSource, MLConfig, ModelCache, ModelType, TrainedModel,
        TrainingDataset, TrainingJob,
    },
    models::{HistoricalRecord, Reading},
};
use std::sync::Arc;
use tempfile::TempDir;

mod common;

fn grid_records() -> Vec<HistoricalRecord> {
    common::reading_grid()
        .into_iter()
        .map(HistoricalRecord::new)
        .collect()
}

fn forest_config() -> MLConfig {
    MLConfig {
        n_trees: 20,
        ..Default::default()
    }
}

#[test]
fn test_save_load_predicts_identically_on_every_row() {
    let dir = TempDir::new().unwrap();
    let records = grid_records();
    let readings: Vec<Reading> = records.iter().map(|r| r.reading).collect();

    for algorithm in [ModelType::RandomForest, ModelType::DecisionTree] {
        let config = MLConfig {
            algorithm,
            ..forest_config()
        };
        let dataset = TrainingDataset::from_records(&records, LabelSource::Generated).unwrap();
        let model = TrainedModel::train(&dataset, &config).unwrap();

        let path = dir.path().join(format!("{:?}.bin", algorithm));
        model.save(&path).unwrap();
        let loaded = TrainedModel::load(&path).unwrap();

        assert_eq!(
            model.predict_many(&readings).unwrap(),
            loaded.predict_many(&readings).unwrap()
        );
        assert_eq!(loaded.metadata().n_training_samples, records.len());
        assert_eq!(loaded.model_type(), algorithm);
    }
}

#[test]
fn test_random_forest_is_deterministic_for_a_seed() {
    let records = grid_records();
    let readings: Vec<Reading> = records.iter().map(|r| r.reading).collect();
    let dataset = TrainingDataset::from_records(&records, LabelSource::Generated).unwrap();

    let a = TrainedModel::train(&dataset, &forest_config()).unwrap();
    let b = TrainedModel::train(&dataset, &forest_config()).unwrap();

    assert_eq!(
        a.predict_many(&readings).unwrap(),
        b.predict_many(&readings).unwrap()
    );
}

#[test]
fn test_decision_tree_learns_the_rules() {
    let records = grid_records();
    let dataset = TrainingDataset::from_records(&records, LabelSource::Generated).unwrap();
    let config = MLConfig {
        algorithm: ModelType::DecisionTree,
        ..Default::default()
    };
    let model = TrainedModel::train(&dataset, &config).unwrap();

    for record in &records {
        assert_eq!(
            model.predict(&record.reading).unwrap().value,
            generate_label(&record.reading)
        );
    }
}

#[test]
fn test_training_job_end_to_end() {
    let dir = TempDir::new().unwrap();
    let readings = common::reading_grid();
    let data_path = common::write_history_csv(dir.path(), &readings, None);
    let model_path = dir.path().join("model.bin");
    let output_path = dir.path().join("out.csv");

    let job = TrainingJob {
        data_path,
        model_path: model_path.clone(),
        output_path: Some(output_path.clone()),
        generate_labels: false,
    };
    let report = job.run(&forest_config()).unwrap();

    assert_eq!(report.label_source, LabelSource::Generated);
    assert_eq!(report.samples, readings.len());
    assert!(report.classes > 1);
    assert!(model_path.exists());

    let exported = load_history(&output_path).unwrap();
    assert_eq!(exported.len(), readings.len());
    assert_eq!(
        exported[0].label.as_deref(),
        Some(generate_label(&readings[0]).as_str())
    );
    let header = std::fs::read_to_string(&output_path).unwrap();
    assert!(header.lines().next().unwrap().ends_with(",Model Predictions"));
}

#[test]
fn test_training_job_uses_label_column() {
    let dir = TempDir::new().unwrap();
    let readings = common::reading_grid();
    let labels: Vec<String> = readings
        .iter()
        .map(|r| if r.temperature > 25.0 { "warm" } else { "cool" }.to_string())
        .collect();
    let data_path = common::write_history_csv(dir.path(), &readings, Some(&labels));

    let job = TrainingJob {
        data_path,
        model_path: dir.path().join("model.bin"),
        output_path: None,
        generate_labels: false,
    };
    let report = job.run(&forest_config()).unwrap();

    assert_eq!(report.label_source, LabelSource::Column);
    assert_eq!(report.classes, 2);

    let model = TrainedModel::load(dir.path().join("model.bin")).unwrap();
    assert_eq!(model.classes(), &["cool".to_string(), "warm".to_string()]);
}

#[test]
fn test_training_job_missing_data_is_io() {
    let dir = TempDir::new().unwrap();
    let job = TrainingJob {
        data_path: dir.path().join("absent.csv"),
        model_path: dir.path().join("model.bin"),
        output_path: None,
        generate_labels: true,
    };

    let err = job.run(&forest_config()).unwrap_err();
    assert!(err.is_io());
}

#[test]
fn test_corrupt_artifact_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.bin");
    std::fs::write(&path, b"AGRIMDL\0\x01\x00garbage").unwrap();

    assert!(matches!(
        TrainedModel::load(&path),
        Err(AppError::CorruptArtifact(_))
    ));
}

#[test]
fn test_model_cache_shares_across_threads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.bin");
    let dataset = TrainingDataset::from_records(&grid_records(), LabelSource::Generated).unwrap();
    TrainedModel::train(&dataset, &forest_config())
        .unwrap()
        .save(&path)
        .unwrap();

    let cache = Arc::new(ModelCache::new(&path));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            std::thread::spawn(move || cache.get_or_load().unwrap())
        })
        .collect();

    let models: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for model in &models[1..] {
        assert!(Arc::ptr_eq(&models[0], model));
    }
}
