//! Text rendering of the derived views, plus CSV export.

use std::{fmt::Write, fs::File, path::Path};

use serde::Serialize;
use tracing::info;

use crate::{
    error::Error,
    model::{DominanceShare, MarketPoint, PricePoint, Schema, Table, TidyChange},
    transform::{market_cap_vs_volume, market_dominance, price_series, transform},
};

const DOMINANCE_TOP: usize = 5;

/// Serialize rows into a CSV file, header taken from the field names.
pub fn to_csv<T: Serialize>(data: &[T], path: &Path) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(File::create(path)?);
    for record in data {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    info!("Exported {} rows to {}", data.len(), path.display());

    Ok(())
}

pub fn render_percent_change(tidy: &[TidyChange]) -> Result<String, Error> {
    let mut out = String::new();
    let width = name_width(tidy.iter().map(|row| row.name.as_str()));

    writeln!(out, "{:<width$}  {:>14}  {:>12}", "name", "Percent_Change", "values")?;
    for row in tidy {
        writeln!(
            out,
            "{:<width$}  {:>14}  {:>12}",
            row.name,
            row.percent_change.label(),
            number(row.value)
        )?;
    }

    Ok(out)
}

pub fn render_price_series(
    entity_name: &str,
    series: &[PricePoint],
) -> Result<String, Error> {
    let mut out = String::new();

    writeln!(out, "Price over time: {}", entity_name)?;
    if series.is_empty() {
        writeln!(out, "  (no rows)")?;
    }
    for point in series {
        writeln!(
            out,
            "  {}  {:>18.5}",
            point.timestamp.format("%Y-%m-%d %H:%M:%S"),
            point.price
        )?;
    }

    Ok(out)
}

pub fn render_market_points(points: &[MarketPoint]) -> Result<String, Error> {
    let mut out = String::new();
    let width = name_width(points.iter().map(|point| point.name.as_str()));

    writeln!(
        out,
        "{:<width$}  {:>22}  {:>22}  {:>16}",
        "name", "market_cap", "volume_24h", "price"
    )?;
    for point in points {
        writeln!(
            out,
            "{:<width$}  {:>22.2}  {:>22.2}  {:>16.5}",
            point.name, point.market_cap, point.volume_24h, point.price
        )?;
    }

    Ok(out)
}

pub fn render_dominance(shares: &[DominanceShare]) -> Result<String, Error> {
    let mut out = String::new();
    let width = name_width(shares.iter().map(|share| share.name.as_str()));

    writeln!(out, "Market dominance of top {} by market cap", shares.len())?;
    for share in shares {
        writeln!(out, "  {:<width$}  {:>5.1}%", share.name, share.share)?;
    }

    Ok(out)
}

/// Everything the analysis pass shows for one loaded table.
pub fn render_report(
    table: &Table,
    schema: &Schema,
    entity_name: &str,
) -> Result<String, Error> {
    let tidy = transform(table, schema)?;
    let points = market_cap_vs_volume(table, schema)?;
    let series = price_series(table, schema, entity_name)?;
    let shares = market_dominance(table, schema, DOMINANCE_TOP)?;

    let sections = [
        render_percent_change(&tidy)?,
        render_market_points(&points)?,
        render_price_series(entity_name, &series)?,
        render_dominance(&shares)?,
    ];

    Ok(sections.join("\n"))
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|name| name.chars().count()).max().unwrap_or(0).max(4)
}

fn number(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.5}", value),
        None => String::from("NaN"),
    }
}
