use crate::error::Result;
use crate::models::{Dimension, PartialReading, Reading, Tier};
use crate::thresholds::guidance::{guidance, join_sentences, status_sentence};
use crate::thresholds::table::tier_for;
use serde::{Deserialize, Serialize};

/// Outcome for one dimension of a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAssessment {
    pub dimension: Dimension,
    pub value: f64,
    pub tier: Tier,

    /// Status statement, e.g. "pH est critique. ..."
    pub status: String,

    /// Agronomic guidance for this tier
    pub guidance: String,
}

/// Rule-based classification of a full reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Per-dimension results in canonical order
    pub assessments: Vec<DimensionAssessment>,

    /// All status sentences, space-joined
    pub recommendations: String,

    /// All guidance sentences, space-joined
    pub advice: String,
}

impl Classification {
    /// Tier of one dimension
    pub fn tier(&self, dimension: Dimension) -> Option<Tier> {
        self.assessments
            .iter()
            .find(|a| a.dimension == dimension)
            .map(|a| a.tier)
    }

    /// Most severe tier across all dimensions
    pub fn worst_tier(&self) -> Tier {
        self.assessments
            .iter()
            .map(|a| a.tier)
            .max()
            .unwrap_or(Tier::Optimal)
    }

    /// Dimensions that need an intervention
    pub fn flagged(&self) -> Vec<Dimension> {
        self.assessments
            .iter()
            .filter(|a| a.tier.needs_action())
            .map(|a| a.dimension)
            .collect()
    }
}

/// Classify every dimension of a reading. Total over all `f64` inputs.
pub fn classify(reading: &Reading) -> Classification {
    let assessments: Vec<DimensionAssessment> = Dimension::all()
        .map(|dimension| {
            let value = reading.value(dimension);
            let tier = tier_for(dimension, value);
            DimensionAssessment {
                dimension,
                value,
                tier,
                status: status_sentence(dimension, tier),
                guidance: guidance(dimension, tier).to_string(),
            }
        })
        .collect();

    let recommendations = join_sentences(assessments.iter().map(|a| a.status.as_str()));
    let advice = join_sentences(assessments.iter().map(|a| a.guidance.as_str()));

    Classification {
        assessments,
        recommendations,
        advice,
    }
}

/// Classify a possibly incomplete reading. Every missing field is reported
/// before any dimension is classified.
pub fn classify_partial(partial: &PartialReading) -> Result<Classification> {
    let reading = partial.complete()?;
    Ok(classify(&reading))
}

/// Status aggregate only, as used for training labels
pub fn recommendations(reading: &Reading) -> String {
    join_sentences(
        Dimension::all().map(|d| status_sentence(d, tier_for(d, reading.value(d)))),
    )
}
