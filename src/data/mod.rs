//! Historical sensor data: CSV loading, date filtering, chart series and
//! export with regenerated recommendations.

pub mod export;
pub mod filter;
pub mod history;

pub use export::{export_with_recommendations, PREDICTIONS_COLUMN};
pub use filter::{date_bounds, filter_by_date, series, DateRange, SeriesPoint};
pub use history::{load_history, parse_date, DATE_COLUMN};
