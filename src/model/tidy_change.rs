use serde::Serialize;

use crate::model::Horizon;

/// Mean percent change of one entity over one horizon.
///
/// `value` is `None` when none of the entity's rows carried a number for
/// the horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyChange {
    pub name: String,
    pub percent_change: Horizon,
    pub value: Option<f64>,
}
