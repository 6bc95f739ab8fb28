use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Severity classification of a single measurement.
///
/// Variants are declared from least to most severe, so the derived `Ord`
/// gives `Optimal < Good < Critical < Dangerous`.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    EnumIter,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    Optimal,
    Good,
    Critical,
    Dangerous,
}

impl Tier {
    /// Numeric severity rank (0 = optimal, 3 = dangerous)
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Optimal => 0,
            Tier::Good => 1,
            Tier::Critical => 2,
            Tier::Dangerous => 3,
        }
    }

    /// Whether the measurement needs an intervention
    pub fn needs_action(&self) -> bool {
        matches!(self, Tier::Critical | Tier::Dangerous)
    }
}
