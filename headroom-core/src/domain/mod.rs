//! Domain types for a screening run.

pub mod bar;
pub mod instrument;
pub mod series;

pub use bar::Bar;
pub use instrument::Instrument;
pub use series::{PriceSeries, SeriesError};
