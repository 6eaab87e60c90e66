use std::cmp::Ordering;

use crate::{
    error::Error,
    helpers::parse_timestamp,
    model::{
        DominanceShare, MarketPoint, PricePoint, Schema, Table, NAME_COLUMN,
        TIMESTAMP_COLUMN,
    },
    transform::filter,
};

/// Price of one coin over capture time, in file order.
pub fn price_series(
    table: &Table,
    schema: &Schema,
    entity_name: &str,
) -> Result<Vec<PricePoint>, Error> {
    let subset = filter(table, entity_name)?;
    let timestamp = subset.column(TIMESTAMP_COLUMN)?;
    let price = subset.column(&schema.price_column())?;

    let series = subset
        .rows
        .iter()
        .filter_map(|row| {
            Some(PricePoint {
                timestamp: parse_timestamp(subset.value(row, timestamp))?,
                price: subset.number(row, price)?,
            })
        })
        .collect();

    Ok(series)
}

/// Market cap against 24h volume for every row carrying both, with price.
pub fn market_cap_vs_volume(
    table: &Table,
    schema: &Schema,
) -> Result<Vec<MarketPoint>, Error> {
    let name = table.column(NAME_COLUMN)?;
    let market_cap = table.column(&schema.market_cap_column())?;
    let volume = table.column(&schema.volume_column())?;
    let price = table.column(&schema.price_column())?;

    let points = table
        .rows
        .iter()
        .filter_map(|row| {
            Some(MarketPoint {
                name: table.value(row, name).to_owned(),
                market_cap: table.number(row, market_cap)?,
                volume_24h: table.number(row, volume)?,
                price: table.number(row, price)?,
            })
        })
        .collect();

    Ok(points)
}

/// The `top` largest market caps of the latest batch and their share of
/// the combined cap, in percent.
pub fn market_dominance(
    table: &Table,
    schema: &Schema,
    top: usize,
) -> Result<Vec<DominanceShare>, Error> {
    let name = table.column(NAME_COLUMN)?;
    let timestamp = table.column(TIMESTAMP_COLUMN)?;
    let market_cap = table.column(&schema.market_cap_column())?;

    let latest = table
        .rows
        .iter()
        .filter_map(|row| parse_timestamp(table.value(row, timestamp)))
        .max();

    let Some(latest) = latest else {
        return Ok(vec![]);
    };

    let mut caps: Vec<(String, f64)> = table
        .rows
        .iter()
        .filter(|row| parse_timestamp(table.value(row, timestamp)) == Some(latest))
        .filter_map(|row| {
            Some((table.value(row, name).to_owned(), table.number(row, market_cap)?))
        })
        .collect();

    caps.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    caps.truncate(top);

    let total: f64 = caps.iter().map(|(_, cap)| cap).sum();

    let shares = caps
        .into_iter()
        .map(|(name, cap)| DominanceShare {
            share: if total > 0.0 { cap / total * 100.0 } else { 0.0 },
            name,
            market_cap: cap,
        })
        .collect();

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::table;

    const HEADERS: [&str; 5] = [
        "name",
        "quote.USD.price",
        "quote.USD.volume_24h",
        "quote.USD.market_cap",
        "timestamp",
    ];

    fn data() -> Table {
        table(
            &HEADERS,
            &[
                &["Bitcoin", "100", "10", "600", "2024-03-01 12:00:00.000000"],
                &["Ethereum", "50", "5", "300", "2024-03-01 12:00:00.000000"],
                &["Tether", "1", "", "100", "2024-03-01 12:00:00.000000"],
                &["Bitcoin", "110", "11", "700", "2024-03-01 12:01:00.000000"],
                &["Ethereum", "55", "6", "200", "2024-03-01 12:01:00.000000"],
                &["Tether", "1", "1", "100", "2024-03-01 12:01:00.000000"],
            ],
        )
    }

    #[test]
    fn test_price_series_for_one_coin() {
        let series = price_series(&data(), &Schema::v1("USD"), "Bitcoin").unwrap();

        let prices: Vec<f64> = series.iter().map(|point| point.price).collect();
        assert_eq!(prices, vec![100.0, 110.0]);
        assert!(series[0].timestamp < series[1].timestamp);

        assert!(price_series(&data(), &Schema::v1("USD"), "Solana")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_market_cap_vs_volume_skips_incomplete_rows() {
        let points = market_cap_vs_volume(&data(), &Schema::v1("USD")).unwrap();

        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|point| point.volume_24h > 0.0));
    }

    #[test]
    fn test_market_dominance_uses_latest_batch() {
        let shares = market_dominance(&data(), &Schema::v1("USD"), 2).unwrap();

        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bitcoin", "Ethereum"]);
        assert_eq!(shares[0].market_cap, 700.0);
        assert!((shares[0].share - 700.0 / 9.0).abs() < 1e-9);
        assert!((shares.iter().map(|s| s.share).sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_market_dominance_of_empty_table() {
        let empty = table(&HEADERS, &[]);
        assert!(market_dominance(&empty, &Schema::v1("USD"), 5)
            .unwrap()
            .is_empty());
    }
}
