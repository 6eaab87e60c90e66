//! Table shapes read from and derived from the snapshot file.

mod horizon;
mod schema;
mod table;
mod tidy_change;
mod views;

pub use horizon::Horizon;
pub use schema::{
    Schema, NAME_COLUMN, TIMESTAMP_COLUMN, TIMESTAMP_FORMAT,
};
pub use table::Table;
pub use tidy_change::TidyChange;
pub use views::{DominanceShare, MarketPoint, PricePoint};
