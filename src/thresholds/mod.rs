/// Rule-based classification of sensor readings against fixed agronomic
/// thresholds.
///
/// Every reading dimension is mapped to a [`Tier`](crate::models::Tier) by a
/// single shared band table, and each (dimension, tier) pair renders a status
/// sentence and a guidance sentence. The same table produces the labels the
/// trained model learns from.

pub mod classifier;
pub mod guidance;
pub mod table;

pub use classifier::{
    classify, classify_partial, recommendations, Classification, DimensionAssessment,
};
pub use guidance::{guidance, status_sentence, NO_RECOMMENDATION};
pub use table::{bands, tier_for, Band, ThresholdBand};
