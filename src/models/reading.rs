use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One monitored environmental dimension.
///
/// Declaration order is the canonical order used for feature vectors,
/// aggregated sentences and CSV columns.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    Temperature,
    Humidity,
    Nutrients,
    Ph,
}

impl Dimension {
    /// Number of dimensions in a reading
    pub const COUNT: usize = 4;

    /// Field name used in JSON payloads and error messages
    pub fn field_name(&self) -> &'static str {
        match self {
            Dimension::Temperature => "temperature",
            Dimension::Humidity => "humidity",
            Dimension::Nutrients => "nutrients",
            Dimension::Ph => "ph",
        }
    }

    /// Column header in the historical data file
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Temperature => "Temperature (°C)",
            Dimension::Humidity => "Humidity (%)",
            Dimension::Nutrients => "Nutrients (g/L)",
            Dimension::Ph => "pH",
        }
    }

    /// Physical unit, empty for pH
    pub fn unit(&self) -> &'static str {
        match self {
            Dimension::Temperature => "°C",
            Dimension::Humidity => "%",
            Dimension::Nutrients => "g/L",
            Dimension::Ph => "",
        }
    }

    /// All dimensions in canonical order
    pub fn all() -> impl Iterator<Item = Dimension> {
        Dimension::iter()
    }
}

/// A complete sensor reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    /// Air temperature (°C)
    pub temperature: f64,

    /// Relative humidity (%)
    pub humidity: f64,

    /// Nutrient concentration (g/L)
    pub nutrients: f64,

    /// Acidity, 0-14
    pub ph: f64,
}

impl Reading {
    pub fn new(temperature: f64, humidity: f64, nutrients: f64, ph: f64) -> Self {
        Self {
            temperature,
            humidity,
            nutrients,
            ph,
        }
    }

    /// Value of a single dimension
    pub fn value(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Temperature => self.temperature,
            Dimension::Humidity => self.humidity,
            Dimension::Nutrients => self.nutrients,
            Dimension::Ph => self.ph,
        }
    }

    /// Values in canonical dimension order
    pub fn to_features(&self) -> [f64; Dimension::COUNT] {
        [self.temperature, self.humidity, self.nutrients, self.ph]
    }
}

/// A reading whose fields may be absent, as received from callers
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PartialReading {
    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub humidity: Option<f64>,

    #[serde(default)]
    pub nutrients: Option<f64>,

    #[serde(default)]
    pub ph: Option<f64>,
}

impl PartialReading {
    fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Temperature => self.temperature,
            Dimension::Humidity => self.humidity,
            Dimension::Nutrients => self.nutrients,
            Dimension::Ph => self.ph,
        }
    }

    /// Names of every absent field, in canonical order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        Dimension::all()
            .filter(|d| self.get(*d).is_none())
            .map(|d| d.field_name())
            .collect()
    }

    /// Convert to a complete reading, failing if any field is absent
    pub fn complete(&self) -> Result<Reading> {
        match (self.temperature, self.humidity, self.nutrients, self.ph) {
            (Some(temperature), Some(humidity), Some(nutrients), Some(ph)) => {
                Ok(Reading::new(temperature, humidity, nutrients, ph))
            }
            _ => Err(AppError::missing(self.missing_fields())),
        }
    }
}

impl From<Reading> for PartialReading {
    fn from(reading: Reading) -> Self {
        Self {
            temperature: Some(reading.temperature),
            humidity: Some(reading.humidity),
            nutrients: Some(reading.nutrients),
            ph: Some(reading.ph),
        }
    }
}

impl TryFrom<PartialReading> for Reading {
    type Error = AppError;

    fn try_from(partial: PartialReading) -> Result<Self> {
        partial.complete()
    }
}
