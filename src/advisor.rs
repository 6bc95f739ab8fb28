use crate::error::Result;
use crate::metrics;
use crate::ml::{ModelCache, Prediction};
use crate::models::{PartialReading, Reading};
use crate::thresholds::{self, Classification};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::debug;
use validator::Validate;

/// Which recommendation paths to run for a reading
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// Threshold rules only
    Rules,
    /// Trained model only
    Model,
    /// Both, side by side
    #[default]
    Both,
}

impl Strategy {
    fn uses_rules(self) -> bool {
        matches!(self, Strategy::Rules | Strategy::Both)
    }

    fn uses_model(self) -> bool {
        matches!(self, Strategy::Model | Strategy::Both)
    }
}

/// A reading typed in by a user, bounded to plausible sensor ranges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct ManualReading {
    #[validate(range(min = 10.0, max = 40.0))]
    pub temperature: f64,

    #[validate(range(min = 10.0, max = 100.0))]
    pub humidity: f64,

    #[validate(range(min = 0.0, max = 20.0))]
    pub nutrients: f64,

    #[validate(range(min = 0.0, max = 14.0))]
    pub ph: f64,
}

impl ManualReading {
    /// Validate bounds and convert
    pub fn into_reading(self) -> Result<Reading> {
        self.validate()?;
        Ok(Reading::new(
            self.temperature,
            self.humidity,
            self.nutrients,
            self.ph,
        ))
    }
}

impl From<Reading> for ManualReading {
    fn from(reading: Reading) -> Self {
        Self {
            temperature: reading.temperature,
            humidity: reading.humidity,
            nutrients: reading.nutrients,
            ph: reading.ph,
        }
    }
}

/// Recommendations for one reading
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Prediction<String>>,
}

/// Runs the rule-based and model-based paths independently
#[derive(Clone)]
pub struct Advisor {
    model: Arc<ModelCache>,
}

impl Advisor {
    pub fn new(model: Arc<ModelCache>) -> Self {
        Self { model }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Rule classification of a reading that may be missing fields
    pub fn classify(&self, partial: &PartialReading) -> Result<Classification> {
        let classification = thresholds::classify_partial(partial)?;
        for assessment in &classification.assessments {
            metrics::record_classification(assessment.dimension, assessment.tier);
        }
        Ok(classification)
    }

    /// Recommendations for a complete reading
    pub fn advise(&self, reading: &Reading, strategy: Strategy) -> Result<Advice> {
        let result = self.run(reading, strategy);
        metrics::record_prediction(&strategy.to_string(), result.is_ok());
        result
    }

    /// Validate a manual reading, then advise
    pub fn advise_manual(&self, reading: ManualReading, strategy: Strategy) -> Result<Advice> {
        let reading = reading.into_reading()?;
        self.advise(&reading, strategy)
    }

    fn run(&self, reading: &Reading, strategy: Strategy) -> Result<Advice> {
        let model = if strategy.uses_model() {
            Some(self.model.predict(reading)?)
        } else {
            None
        };

        let rules = if strategy.uses_rules() {
            let classification = thresholds::classify(reading);
            for assessment in &classification.assessments {
                metrics::record_classification(assessment.dimension, assessment.tier);
            }
            Some(classification)
        } else {
            None
        };

        debug!(%strategy, worst = ?rules.as_ref().map(|c| c.worst_tier()), "Advice ready");
        Ok(Advice {
            strategy,
            rules,
            model,
        })
    }
}
