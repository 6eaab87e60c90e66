use crate::{error::Error, model::Horizon};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const NAME_COLUMN: &str = "name";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const LISTING_FIELDS: [&str; 21] = [
    "id",
    "name",
    "symbol",
    "slug",
    "num_market_pairs",
    "date_added",
    "tags",
    "max_supply",
    "circulating_supply",
    "total_supply",
    "infinite_supply",
    "platform.id",
    "platform.name",
    "platform.symbol",
    "platform.slug",
    "platform.token_address",
    "cmc_rank",
    "self_reported_circulating_supply",
    "self_reported_market_cap",
    "tvl_ratio",
    "last_updated",
];

const QUOTE_FIELDS: [&str; 7] = [
    "price",
    "volume_24h",
    "volume_change_24h",
    "market_cap",
    "market_cap_dominance",
    "fully_diluted_market_cap",
    "last_updated",
];

/// Fixed column layout of the snapshot file.
///
/// Records are projected onto these columns at write time, so the file
/// layout never depends on which fields the first batch happened to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub version: u16,
    pub convert: String,
    pub columns: Vec<String>,
}

impl Schema {
    pub fn v1(convert: &str) -> Schema {
        let mut columns: Vec<String> =
            LISTING_FIELDS.iter().map(|field| field.to_string()).collect();

        for field in QUOTE_FIELDS {
            columns.push(quote_column(convert, field));
            if field == "volume_change_24h" {
                columns.extend(Horizon::ALL.iter().map(|h| h.column(convert)));
            }
        }

        columns.push(TIMESTAMP_COLUMN.to_owned());

        Schema {
            version: 1,
            convert: convert.to_owned(),
            columns,
        }
    }

    pub fn price_column(&self) -> String {
        quote_column(&self.convert, "price")
    }

    pub fn market_cap_column(&self) -> String {
        quote_column(&self.convert, "market_cap")
    }

    pub fn volume_column(&self) -> String {
        quote_column(&self.convert, "volume_24h")
    }

    pub fn check_header<S: AsRef<str>>(
        &self,
        header: &[S],
    ) -> Result<(), Error> {
        if header.len() != self.columns.len() {
            return Err(Error::SchemaMismatch(format!(
                "expected {} columns (v{}), found {}",
                self.columns.len(),
                self.version,
                header.len()
            )));
        }

        let drift = self
            .columns
            .iter()
            .zip(header)
            .position(|(expected, found)| expected != found.as_ref());

        match drift {
            Some(index) => Err(Error::SchemaMismatch(format!(
                "column {} is {:?}, expected {:?}",
                index,
                header[index].as_ref(),
                self.columns[index]
            ))),
            None => Ok(()),
        }
    }
}

fn quote_column(convert: &str, field: &str) -> String {
    format!("quote.{}.{}", convert, field)
}
