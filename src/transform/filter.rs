use crate::{
    error::Error,
    model::{Table, NAME_COLUMN},
};

/// Rows whose `name` equals `entity_name` exactly. No match is an empty
/// table.
pub fn filter(table: &Table, entity_name: &str) -> Result<Table, Error> {
    let name = table.column(NAME_COLUMN)?;
    Ok(table.select(|row| table.value(row, name) == entity_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::table;

    fn data() -> Table {
        table(
            &["name", "quote.USD.price"],
            &[&["Bitcoin", "1"], &["Ethereum", "2"], &["Bitcoin", "3"]],
        )
    }

    #[test]
    fn test_filter_keeps_exact_matches_in_order() {
        let subset = filter(&data(), "Bitcoin").unwrap();

        assert_eq!(subset.headers, data().headers);
        assert_eq!(subset.rows, vec![vec!["Bitcoin", "1"], vec!["Bitcoin", "3"]]);
    }

    #[test]
    fn test_filter_is_case_sensitive_and_never_fails_on_no_match() {
        assert!(filter(&data(), "bitcoin").unwrap().is_empty());
        assert!(filter(&data(), "Dogecoin").unwrap().is_empty());
    }
}
