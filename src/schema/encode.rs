// src/schema/encode.rs

use std::collections::HashSet;
use tracing::debug;

use super::types::{ColumnLayout, ColumnMapping, ColumnNameMap};
use crate::error::{Result, SurveyError};

/// Map the raw export headers onto compact positional keys.
///
/// With the default layout, header 0 is metadata and is left alone, headers
/// 1..=18 become `SQ1..SQ18`, 19..=23 `BQ1..BQ5`, 24..=28 `DQ1..DQ5` and
/// 29..=33 `MQ1..MQ5`.
///
/// The header count must match `layout.width()` exactly and every mapped
/// header must be distinct, otherwise the rename would silently mislabel
/// answers.
pub fn encode_column_names<S: AsRef<str>>(
    headers: &[S],
    layout: &ColumnLayout,
) -> Result<ColumnNameMap> {
    let expected = layout.width();
    if headers.len() != expected {
        return Err(SurveyError::SchemaMismatch {
            expected,
            found: headers.len(),
            detail: format!(
                "layout is {} metadata + {} encoded columns",
                layout.metadata_columns,
                layout.encoded_width()
            ),
        });
    }

    let mut seen = HashSet::with_capacity(expected);
    if let Some(dup) = headers
        .iter()
        .map(|h| -> &str { h.as_ref() })
        .find(|h| !seen.insert(*h))
    {
        return Err(SurveyError::SchemaMismatch {
            expected,
            found: headers.len(),
            detail: format!("duplicate header `{}`", dup),
        });
    }

    let mut entries = Vec::with_capacity(layout.encoded_width());
    let mut pos = layout.metadata_columns;
    for (prefix, count) in layout.families() {
        for n in 1..=count {
            entries.push(ColumnMapping {
                key: format!("{}{}", prefix, n),
                original: headers[pos].as_ref().to_string(),
            });
            pos += 1;
        }
    }
    debug!(mapped = entries.len(), "encoded column names");

    Ok(ColumnNameMap::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Column{}", i)).collect()
    }

    #[test]
    fn maps_34_headers_to_33_unique_keys() {
        let map = encode_column_names(&headers(34), &ColumnLayout::default()).unwrap();
        assert_eq!(map.len(), 33);

        let keys: HashSet<&str> = map.keys().collect();
        assert_eq!(keys.len(), 33);
        for (prefix, count) in [("SQ", 18), ("BQ", 5), ("DQ", 5), ("MQ", 5)] {
            for n in 1..=count {
                assert!(keys.contains(format!("{}{}", prefix, n).as_str()));
            }
        }
    }

    #[test]
    fn follows_positional_partition() {
        let map = encode_column_names(&headers(34), &ColumnLayout::default()).unwrap();
        assert_eq!(map.original("SQ1"), Some("Column1"));
        assert_eq!(map.original("SQ18"), Some("Column18"));
        assert_eq!(map.original("BQ1"), Some("Column19"));
        assert_eq!(map.original("BQ5"), Some("Column23"));
        assert_eq!(map.original("DQ1"), Some("Column24"));
        assert_eq!(map.original("DQ5"), Some("Column28"));
        assert_eq!(map.original("MQ1"), Some("Column29"));
        assert_eq!(map.original("MQ5"), Some("Column33"));
        assert_eq!(map.original("MQ6"), None);
    }

    #[test]
    fn one_short_is_a_schema_mismatch() {
        match encode_column_names(&headers(33), &ColumnLayout::default()) {
            Err(SurveyError::SchemaMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, 34);
                assert_eq!(found, 33);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn extra_columns_are_rejected() {
        assert!(matches!(
            encode_column_names(&headers(35), &ColumnLayout::default()),
            Err(SurveyError::SchemaMismatch { found: 35, .. })
        ));
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let mut h = headers(34);
        h[20] = h[5].clone();
        assert!(matches!(
            encode_column_names(&h, &ColumnLayout::default()),
            Err(SurveyError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn custom_layout_moves_the_partition() {
        let layout = ColumnLayout {
            metadata_columns: 2,
            general_questions: 3,
            business_questions: 1,
            sourcing_questions: 1,
            modeling_questions: 2,
        };
        let map = encode_column_names(&headers(9), &layout).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["SQ1", "SQ2", "SQ3", "BQ1", "DQ1", "MQ1", "MQ2"]);
        assert_eq!(map.original("SQ1"), Some("Column2"));
        assert_eq!(map.original("MQ2"), Some("Column8"));
    }
}
