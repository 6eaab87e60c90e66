use serde::Deserialize;
use serde_json::Value;

/// Envelope returned by the listings endpoint.
///
/// Entries of `data` are kept as raw JSON: they are flattened into
/// columns by the append store rather than mapped onto a struct.
#[derive(Debug, Deserialize)]
pub struct ListingsResponse {
    pub status: Option<ListingsStatus>,
    pub data: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct ListingsStatus {
    #[serde(default)]
    pub error_code: i64,
    pub error_message: Option<String>,
}
