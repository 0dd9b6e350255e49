//! Market data and FX rate providers.

pub mod csv_import;
pub mod fx;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_import::CsvProvider;
pub use fx::{resolve_rate, FixedRate, FxRate, RateSource};
pub use provider::{
    canonicalize, resample_weekly, DataError, DataProvider, HistoryRequest, Interval, Period,
    RateProvider,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
