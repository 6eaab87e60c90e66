//! Derived views over the loaded snapshot table.

pub use self::{
    filter::filter,
    percent_change::transform,
    views::{market_cap_vs_volume, market_dominance, price_series},
};

mod filter;
mod percent_change;
mod views;
