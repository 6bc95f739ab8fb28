pub mod reading;
pub mod record;
pub mod tier;

pub use reading::*;
pub use record::*;
pub use tier::*;
