//! Agrisense: threshold classification and trained-model recommendations for
//! hydroponic and greenhouse sensor readings.
//!
//! The core is [`thresholds`] (a pure rule classifier) and [`ml`] (a
//! random-forest predictor trained on rule-labelled history). Around it sit
//! the historical [`data`] source, [`auth`] for the login-gated [`api`], and
//! the [`advisor`] that runs either path for a single reading.

pub mod advisor;
pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod thresholds;

pub use error::{AppError, Result};
