use serde_json::{json, Value};

use crate::model::{Horizon, Table};

/// Listing shaped like one entry of the listings `data` array.
pub fn listing(name: &str, changes: [f64; 6]) -> Value {
    let mut quote = json!({
        "price": 100.0,
        "volume_24h": 2000.0,
        "volume_change_24h": 1.5,
        "market_cap": 50000.0,
        "market_cap_dominance": 10.0,
        "fully_diluted_market_cap": 60000.0,
        "last_updated": "2024-03-01T12:00:00.000Z"
    });

    for (horizon, change) in Horizon::ALL.iter().zip(changes) {
        quote[format!("percent_change_{}", horizon.label())] = json!(change);
    }

    json!({
        "id": 1,
        "name": name,
        "symbol": name.to_uppercase(),
        "slug": name.to_lowercase(),
        "tags": ["mineable"],
        "platform": null,
        "cmc_rank": 1,
        "last_updated": "2024-03-01T12:00:00.000Z",
        "quote": {"USD": quote}
    })
}

/// Table with the given headers and rows, for transforms that do not need
/// the full file layout.
pub fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    let mut table =
        Table::new(headers.iter().map(|header| header.to_string()).collect());
    for row in rows {
        table
            .rows
            .push(row.iter().map(|cell| cell.to_string()).collect());
    }
    table
}
