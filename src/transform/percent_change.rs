use std::collections::HashMap;

use crate::{
    error::Error,
    model::{Horizon, Schema, Table, TidyChange, NAME_COLUMN},
};

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / f64::from(self.count))
    }
}

/// Pivots the six percent-change columns into one row per
/// (entity, horizon), averaging every loaded row of the entity.
///
/// Entities keep the order in which they first appear in the table.
pub fn transform(
    table: &Table,
    schema: &Schema,
) -> Result<Vec<TidyChange>, Error> {
    let name = table.column(NAME_COLUMN)?;
    let mut columns = [0usize; 6];
    for (slot, horizon) in columns.iter_mut().zip(Horizon::ALL) {
        *slot = table.column(&horizon.column(&schema.convert))?;
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, [Mean; 6])> = vec![];

    for row in &table.rows {
        let entity = table.value(row, name);
        let position = *index.entry(entity).or_insert_with(|| {
            groups.push((entity, [Mean::default(); 6]));
            groups.len() - 1
        });

        let (_, means) = &mut groups[position];
        for (mean, column) in means.iter_mut().zip(columns) {
            mean.push(table.number(row, column));
        }
    }

    let tidy = groups
        .into_iter()
        .flat_map(|(entity, means)| {
            Horizon::ALL.into_iter().zip(means).map(move |(horizon, mean)| {
                TidyChange {
                    name: entity.to_owned(),
                    percent_change: horizon,
                    value: mean.value(),
                }
            })
        })
        .collect();

    Ok(tidy)
}
