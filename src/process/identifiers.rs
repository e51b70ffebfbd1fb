// src/process/identifiers.rs

use serde::{ser::SerializeMap, Serialize, Serializer};
use std::{collections::HashMap, fmt};
use tracing::debug;

use crate::error::Result;
use crate::table::{Cell, ResponseTable};

/// Dense integer codes for the distinct values of an identifier column.
///
/// Codes are assigned in sorted order of the distinct values: numerically when
/// every value is a number, otherwise by code point. The same set of distinct
/// values therefore always yields the same codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    classes: Vec<String>,
    codes: HashMap<String, i64>,
}

impl IdentifierMap {
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();

        let numeric: Option<Vec<f64>> = classes
            .iter()
            .map(|c| c.trim().parse::<f64>().ok())
            .collect();
        match numeric {
            Some(values) => {
                let mut keyed: Vec<(f64, String)> = values.into_iter().zip(classes).collect();
                keyed.sort_by(|(x, a), (y, b)| x.total_cmp(y).then_with(|| a.cmp(b)));
                classes = keyed.into_iter().map(|(_, c)| c).collect();
            }
            None => classes.sort(),
        }
        classes.dedup();

        let codes = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i as i64))
            .collect();
        Self { classes, codes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn code(&self, value: &str) -> Option<i64> {
        self.codes.get(value).copied()
    }

    /// Reverse lookup: the original value behind `code`.
    pub fn original(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
    }

    /// `(original, code)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i as i64))
    }
}

impl Serialize for IdentifierMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len()))?;
        for (original, code) in self.iter() {
            map.serialize_entry(original, &code)?;
        }
        map.end()
    }
}

impl fmt::Display for IdentifierMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (original, code) in self.iter() {
            writeln!(f, "  {:>4} <- {}", code, original)?;
        }
        Ok(())
    }
}

/// Replace `column` with dense integer codes and rename it to `encoded_name`.
pub fn encode_identifiers(
    table: &mut ResponseTable,
    column: &str,
    encoded_name: &str,
) -> Result<IdentifierMap> {
    let id_map = IdentifierMap::fit(table.column(column)?.map(|c| c.render().into_owned()));

    table.map_column(column, |cell| {
        id_map
            .code(&cell.render())
            .map(Cell::Integer)
            .unwrap_or(Cell::Missing)
    })?;
    table.rename_column(column, encoded_name)?;
    debug!(distinct = id_map.len(), column, "encoded identifiers");

    Ok(id_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn assigns_codes_in_sorted_order() {
        let map = IdentifierMap::fit(["Student3", "Student1", "Student2", "Student1"]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.code("Student1"), Some(0));
        assert_eq!(map.code("Student2"), Some(1));
        assert_eq!(map.code("Student3"), Some(2));
    }

    #[test]
    fn numeric_identifiers_sort_numerically() {
        let map = IdentifierMap::fit(["10", "9", "100"]);
        let order: Vec<&str> = map.iter().map(|(o, _)| o).collect();
        assert_eq!(order, ["9", "10", "100"]);
    }

    #[test]
    fn same_distinct_set_gives_same_codes() {
        let a = IdentifierMap::fit(["b", "a", "c"]);
        let b = IdentifierMap::fit(["c", "c", "a", "b", "a"]);
        assert_eq!(a, b);
    }

    #[test]
    fn encoding_is_a_bijection() {
        let mut table = ResponseTable::from_text_rows(
            &["SQ1", "SQ2"],
            &[
                vec!["zoe", "x"],
                vec!["amir", "y"],
                vec!["zoe", "z"],
                vec!["Bo", "w"],
            ],
        )
        .unwrap();
        let originals: Vec<String> = table
            .column("SQ1")
            .unwrap()
            .map(|c| c.render().into_owned())
            .collect();

        let map = encode_identifiers(&mut table, "SQ1", "SQ1_encoded").unwrap();
        assert!(!table.has_column("SQ1"));

        let codes: Vec<i64> = table
            .column("SQ1_encoded")
            .unwrap()
            .map(|c| match c {
                Cell::Integer(i) => *i,
                other => panic!("not encoded: {:?}", other),
            })
            .collect();

        let distinct_originals: HashSet<&String> = originals.iter().collect();
        let distinct_codes: HashSet<&i64> = codes.iter().collect();
        assert_eq!(distinct_originals.len(), distinct_codes.len());
        assert_eq!(map.len(), distinct_originals.len());

        for (code, original) in codes.iter().zip(&originals) {
            assert_eq!(map.original(*code), Some(original.as_str()));
        }
        // code point order puts upper case first
        assert_eq!(map.code("Bo"), Some(0));
        assert_eq!(map.original(-1), None);
    }
}
