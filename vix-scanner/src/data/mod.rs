pub mod types;
pub mod yahoo;

pub use types::{Changes, MarketSnapshot};
pub use yahoo::{FetchError, SnapshotSource, SymbolConfig, YahooSource};
