use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::{error::Error, model::TIMESTAMP_FORMAT};

/// Flattens a listing object into dotted-path keys.
///
/// `{"quote": {"USD": {"price": 1.0}}}` becomes `quote.USD.price`. Arrays and
/// empty objects stay whole and are rendered as JSON text.
pub fn flatten_record(record: &Value) -> Result<HashMap<String, String>, Error> {
    let object = record.as_object().ok_or_else(|| {
        Error::MalformedPayload(format!("listing is not an object: {}", record))
    })?;

    let mut cells = HashMap::new();
    flatten_into(&mut cells, None, object)?;

    Ok(cells)
}

fn flatten_into(
    cells: &mut HashMap<String, String>,
    prefix: Option<&str>,
    object: &Map<String, Value>,
) -> Result<(), Error> {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.to_owned(),
        };

        match value {
            Value::Object(inner) if !inner.is_empty() => {
                flatten_into(cells, Some(&path), inner)?;
            },
            _ => {
                cells.insert(path, to_cell(value)?);
            },
        }
    }

    Ok(())
}

pub fn to_cell(value: &Value) -> Result<String, Error> {
    let cell = match value {
        Value::Null => String::new(),
        Value::String(s) => s.to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value)?,
    };

    Ok(cell)
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()
}
