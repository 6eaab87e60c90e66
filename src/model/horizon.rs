use std::fmt;

use serde::{Serialize, Serializer};

/// Percent-change window reported for every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Horizon {
    H1,
    H24,
    D7,
    D30,
    D60,
    D90,
}

impl Horizon {
    pub const ALL: [Horizon; 6] = [
        Horizon::H1,
        Horizon::H24,
        Horizon::D7,
        Horizon::D30,
        Horizon::D60,
        Horizon::D90,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::H1 => "1h",
            Horizon::H24 => "24h",
            Horizon::D7 => "7d",
            Horizon::D30 => "30d",
            Horizon::D60 => "60d",
            Horizon::D90 => "90d",
        }
    }

    /// Flattened column holding this horizon, e.g. `quote.USD.percent_change_7d`.
    pub fn column(&self, convert: &str) -> String {
        format!("quote.{}.percent_change_{}", convert, self.label())
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Horizon {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}
