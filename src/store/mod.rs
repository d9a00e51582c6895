mod file_store;
mod series;
mod store;
mod tokens;

pub use file_store::FileStore;
pub use series::{series_key, Series, UserSeries};
pub use store::MeasurementStore;
pub use tokens::TokenRegistry;
