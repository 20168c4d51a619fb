mod models;
mod schema;
mod store;
mod trait_def;

pub use models::TrendingRecord;
pub use store::SqliteTrendingStore;
#[cfg(any(test, feature = "mock"))]
pub use trait_def::MockTrendingStore;
pub use trait_def::TrendingStore;
