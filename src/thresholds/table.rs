use crate::models::{Dimension, Tier};
use serde::Serialize;

/// Inclusive numeric interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Inclusive on both ends. NaN is never contained.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Bands for one dimension, checked in priority order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdBand {
    pub optimal: Band,
    pub good: Band,
    pub critical: Band,

    /// Values above the critical band stay critical up to this ceiling.
    /// Anything above it, or below the critical floor, is dangerous.
    pub dangerous_ceiling: f64,
}

impl ThresholdBand {
    /// First match wins: optimal, good, critical, otherwise dangerous
    pub fn tier(&self, value: f64) -> Tier {
        if self.optimal.contains(value) {
            Tier::Optimal
        } else if self.good.contains(value) {
            Tier::Good
        } else if self.critical.contains(value) || self.critical_margin().contains(value) {
            Tier::Critical
        } else {
            Tier::Dangerous
        }
    }

    /// Span between the critical band and the dangerous ceiling
    pub fn critical_margin(&self) -> Band {
        Band::new(self.critical.high, self.dangerous_ceiling)
    }
}

pub const TEMPERATURE: ThresholdBand = ThresholdBand {
    optimal: Band::new(18.0, 22.0),
    good: Band::new(15.0, 25.0),
    critical: Band::new(10.0, 30.0),
    dangerous_ceiling: 35.0,
};

pub const HUMIDITY: ThresholdBand = ThresholdBand {
    optimal: Band::new(40.0, 50.0),
    good: Band::new(30.0, 60.0),
    critical: Band::new(20.0, 70.0),
    dangerous_ceiling: 80.0,
};

pub const NUTRIENTS: ThresholdBand = ThresholdBand {
    optimal: Band::new(1.5, 2.5),
    good: Band::new(1.0, 3.5),
    critical: Band::new(0.5, 4.0),
    dangerous_ceiling: 5.0,
};

pub const PH: ThresholdBand = ThresholdBand {
    optimal: Band::new(6.0, 6.5),
    good: Band::new(5.5, 7.0),
    critical: Band::new(5.0, 7.5),
    dangerous_ceiling: 8.0,
};

/// The single threshold table shared by classification, guidance and
/// training-label generation
pub fn bands(dimension: Dimension) -> &'static ThresholdBand {
    match dimension {
        Dimension::Temperature => &TEMPERATURE,
        Dimension::Humidity => &HUMIDITY,
        Dimension::Nutrients => &NUTRIENTS,
        Dimension::Ph => &PH,
    }
}

/// Tier of one measurement
pub fn tier_for(dimension: Dimension, value: f64) -> Tier {
    bands(dimension).tier(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_inclusive() {
        let band = Band::new(18.0, 22.0);
        assert!(band.contains(18.0));
        assert!(band.contains(22.0));
        assert!(!band.contains(22.000_001));
        assert!(!band.contains(f64::NAN));
    }

    #[test]
    fn test_bands_nest() {
        for dimension in Dimension::all() {
            let b = bands(dimension);
            assert!(b.good.low <= b.optimal.low && b.optimal.high <= b.good.high);
            assert!(b.critical.low <= b.good.low && b.good.high <= b.critical.high);
            assert!(b.critical.high <= b.dangerous_ceiling);
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for(Dimension::Temperature, 18.0), Tier::Optimal);
        assert_eq!(tier_for(Dimension::Temperature, 22.0), Tier::Optimal);
        assert_eq!(tier_for(Dimension::Temperature, 15.0), Tier::Good);
        assert_eq!(tier_for(Dimension::Temperature, 30.0), Tier::Critical);
        assert_eq!(tier_for(Dimension::Temperature, 35.0), Tier::Critical);
        assert_eq!(tier_for(Dimension::Temperature, 35.5), Tier::Dangerous);
        assert_eq!(tier_for(Dimension::Humidity, 70.0), Tier::Critical);
        assert_eq!(tier_for(Dimension::Nutrients, 0.5), Tier::Critical);
        assert_eq!(tier_for(Dimension::Ph, 7.0), Tier::Good);
    }

    #[test]
    fn test_below_critical_floor_is_dangerous() {
        assert_eq!(tier_for(Dimension::Temperature, -50.0), Tier::Dangerous);
        assert_eq!(tier_for(Dimension::Humidity, 0.0), Tier::Dangerous);
        assert_eq!(tier_for(Dimension::Nutrients, 0.1), Tier::Dangerous);
        assert_eq!(tier_for(Dimension::Ph, 2.0), Tier::Dangerous);
    }

    #[test]
    fn test_critical_margin_up_to_ceiling() {
        assert_eq!(tier_for(Dimension::Temperature, 32.0), Tier::Critical);
        assert_eq!(tier_for(Dimension::Humidity, 80.0), Tier::Critical);
        assert_eq!(tier_for(Dimension::Nutrients, 4.5), Tier::Critical);
        assert_eq!(tier_for(Dimension::Ph, 7.8), Tier::Critical);

        assert_eq!(tier_for(Dimension::Temperature, 36.0), Tier::Dangerous);
        assert_eq!(tier_for(Dimension::Humidity, 81.0), Tier::Dangerous);
        assert_eq!(tier_for(Dimension::Nutrients, 5.1), Tier::Dangerous);
        assert_eq!(tier_for(Dimension::Ph, 8.5), Tier::Dangerous);
    }

    #[test]
    fn test_nan_is_dangerous() {
        for dimension in Dimension::all() {
            assert_eq!(tier_for(dimension, f64::NAN), Tier::Dangerous);
        }
    }
}
