// src/process/mod.rs

pub mod identifiers;
pub mod majors;
pub mod score;

use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::Result;
use crate::schema::{encode_column_names, ColumnLayout, ColumnNameMap};
use crate::table::ResponseTable;

pub use identifiers::{encode_identifiers, IdentifierMap};
pub use majors::{normalize_major, normalize_major_column};
pub use score::{
    append_scores, check_battery_layout, score_row, AnswerKey, Cohort, ScoreSummary,
};

/// Placeholder written into every missing cell.
pub const SENTINEL: &str = "Not Taken";

pub const ID_COLUMN: &str = "SQ1";
pub const ENCODED_ID_COLUMN: &str = "SQ1_encoded";
pub const MAJOR_COLUMN: &str = "SQ2";
pub const COURSE_COLUMN: &str = "SQ18";
pub const SCORE_COLUMN: &str = "o_score";

/// Mappings produced while preprocessing, kept for traceability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preprocessed {
    pub column_map: ColumnNameMap,
    pub id_map: IdentifierMap,
}

/// Normalize a raw export in place:
/// 1) rename raw headers to their encoded keys
/// 2) fill missing cells with [`SENTINEL`]
/// 3) replace `SQ1` with dense codes as `SQ1_encoded`
/// 4) canonicalize the major names in `SQ2`
#[tracing::instrument(level = "info", skip_all, fields(rows = table.num_rows()))]
pub fn preprocess(table: &mut ResponseTable, layout: &ColumnLayout) -> Result<Preprocessed> {
    let column_map = encode_column_names(table.columns(), layout)?;
    let renames: HashMap<&str, &str> = column_map
        .iter()
        .map(|m| (m.original.as_str(), m.key.as_str()))
        .collect();
    table.rename_columns(|name| renames.get(name).map(|key| key.to_string()));
    debug!(renamed = renames.len(), "renamed columns");

    let filled = table.fill_missing(SENTINEL);
    debug!(filled, "filled missing cells");

    let id_map = encode_identifiers(table, ID_COLUMN, ENCODED_ID_COLUMN)?;
    normalize_major_column(table, MAJOR_COLUMN)?;

    info!(
        columns = column_map.len(),
        identifiers = id_map.len(),
        filled,
        "preprocessed responses"
    );
    Ok(Preprocessed { column_map, id_map })
}

/// Preprocess, then append objective scores.
pub fn preprocess_and_score(
    table: &mut ResponseTable,
    layout: &ColumnLayout,
    key: &AnswerKey,
) -> Result<(Preprocessed, ScoreSummary)> {
    check_battery_layout(layout)?;
    let preprocessed = preprocess(table, layout)?;
    let summary = append_scores(table, key)?;
    Ok((preprocessed, summary))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{read_csv, Cell};

    #[test]
    fn preprocess_renames_fills_encodes_and_normalizes() {
        let mut table = read_csv(fixtures::raw_csv().as_bytes()).unwrap();
        let pre = preprocess(&mut table, &ColumnLayout::default()).unwrap();

        assert_eq!(pre.column_map.len(), 33);
        assert_eq!(pre.column_map.original("SQ2"), Some("General question 2?"));
        assert_eq!(table.columns()[0], "Timestamp");
        assert_eq!(table.columns()[1], ENCODED_ID_COLUMN);
        assert!(table.has_column("MQ5"));

        for row in table.rows() {
            assert!(row.cells().iter().all(|c| !c.is_missing()));
        }

        // sorted identifier order: s-01, s-02, s-03, s-04
        let ids: Vec<_> = table.column(ENCODED_ID_COLUMN).unwrap().cloned().collect();
        assert_eq!(
            ids,
            [2, 0, 1, 3].map(Cell::Integer).to_vec()
        );
        assert_eq!(pre.id_map.original(2), Some("s-03"));

        let majors: Vec<_> = table.column(MAJOR_COLUMN).unwrap().cloned().collect();
        assert_eq!(
            majors,
            ["AIPI", "ECON", "STATISTICS", "NOT TAKEN"].map(Cell::text).to_vec()
        );
    }

    #[test]
    fn full_pipeline_scores_each_cohort() {
        let mut table = read_csv(fixtures::raw_csv().as_bytes()).unwrap();
        let (_, summary) =
            preprocess_and_score(&mut table, &ColumnLayout::default(), &AnswerKey::STANDARD)
                .unwrap();

        let scores: Vec<_> = table.column(SCORE_COLUMN).unwrap().cloned().collect();
        assert_eq!(scores, [5, 4, 2, 0].map(Cell::Integer).to_vec());
        assert_eq!(summary.per_cohort.get(&Cohort::Other), Some(&1));
        // the blank course was filled before scoring
        let course = table.row(3).unwrap().get(COURSE_COLUMN).cloned();
        assert_eq!(course, Some(Cell::text(SENTINEL)));
    }

    #[test]
    fn whitespace_cells_are_values_not_gaps() {
        let csv = fixtures::to_csv(vec![
            fixtures::raw_row("   ", "   ", "", None, 0),
            fixtures::raw_row("  ", "Statistics", "", None, 0),
        ]);
        let mut table = read_csv(csv.as_bytes()).unwrap();
        let pre = preprocess(&mut table, &ColumnLayout::default()).unwrap();

        // two distinct raw identifiers keep two codes
        assert_eq!(pre.id_map.len(), 2);
        assert_eq!(pre.id_map.code("  "), Some(0));
        assert_eq!(pre.id_map.code("   "), Some(1));
        assert_eq!(pre.id_map.code(SENTINEL), None);

        let majors: Vec<_> = table.column(MAJOR_COLUMN).unwrap().cloned().collect();
        assert_eq!(majors, [Cell::text(""), Cell::text("STATISTICS")].to_vec());
    }

    #[test]
    fn resized_battery_is_rejected_before_any_mutation() {
        let layout = ColumnLayout {
            business_questions: 6,
            general_questions: 17,
            ..ColumnLayout::default()
        };
        let mut table = read_csv(fixtures::raw_csv().as_bytes()).unwrap();
        let before = table.clone();

        let err = preprocess_and_score(&mut table, &layout, &AnswerKey::STANDARD).unwrap_err();
        assert!(matches!(err, crate::error::SurveyError::InvalidParameter(_)));
        assert_eq!(table, before);
    }

    #[test]
    fn short_header_row_fails_before_any_mutation() {
        let mut headers = fixtures::raw_headers();
        headers.pop();
        let refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let mut table = ResponseTable::from_text_rows(&refs, &[]).unwrap();
        let before = table.clone();

        let err = preprocess(&mut table, &ColumnLayout::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SurveyError::SchemaMismatch { expected: 34, found: 33, .. }
        ));
        assert_eq!(table, before);
    }
}
