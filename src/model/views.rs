use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketPoint {
    pub name: String,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominanceShare {
    pub name: String,
    pub market_cap: f64,
    pub share: f64,
}
