use crate::error::Error;

/// In-memory copy of the snapshot file: one header, rows of raw cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Table {
        Table {
            headers,
            rows: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Result<usize, Error> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| Error::FieldNotExist(name.to_owned()))
    }

    pub fn value<'a>(&self, row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or_default()
    }

    /// Numeric cell; empty or non-numeric cells count as missing.
    pub fn number(&self, row: &[String], column: usize) -> Option<f64> {
        self.value(row, column)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| !value.is_nan())
    }

    pub fn select<F>(&self, mut predicate: F) -> Table
    where
        F: FnMut(&[String]) -> bool,
    {
        Table {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| predicate(row))
                .cloned()
                .collect(),
        }
    }
}
