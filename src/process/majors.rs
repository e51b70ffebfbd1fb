// src/process/majors.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::table::{Cell, ResponseTable};

/// Upper-cased spellings of a major → canonical short name.
pub static MAJOR_SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ARTIFICIAL INTELLIGENCE IN PRODUCT INNOVATION", "AIPI"),
        ("ARTIFICIAL INTELLIGENCE", "AIPI"),
        ("AI", "AIPI"),
        ("M.ENG AIPI", "AIPI"),
        ("MENG IN AIPI", "AIPI"),
        ("COMPUTER SCIENCE, PHYSICS", "CS & PHYSICS"),
        ("PHYSICS, COMPUTER SCIENCE", "CS & PHYSICS"),
        ("ECONOMIC S", "ECON"),
        ("UNDECLARED - STATISTICAL SCIENCE", "UNDECLARED/STATSCI"),
        ("LINGUISTICS AND SPANISH", "LINGUISTICS & SPANISH"),
        ("MECHANICAL ENGINEERING", "MECHE"),
        ("FGG", "UNDECLARED"),
    ])
});

/// Trim, upper-case, then swap in the canonical name if there is one.
pub fn normalize_major(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    match MAJOR_SYNONYMS.get(upper.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => upper,
    }
}

/// Normalize every cell of `column`; numbers are normalized through their text form.
pub fn normalize_major_column(table: &mut ResponseTable, column: &str) -> Result<()> {
    let mut replaced = 0usize;
    table.map_column(column, |cell| {
        if cell.is_missing() {
            return Cell::Missing;
        }
        let upper = cell.render().trim().to_uppercase();
        let normalized = normalize_major(&upper);
        if normalized != upper {
            replaced += 1;
        }
        Cell::Text(normalized)
    })?;
    debug!(column, replaced, "normalized majors");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_uppercases_and_maps_synonyms() {
        assert_eq!(normalize_major("  artificial intelligence  "), "AIPI");
        assert_eq!(normalize_major("Mechanical Engineering"), "MECHE");
        assert_eq!(normalize_major("Physics, Computer Science"), "CS & PHYSICS");
        assert_eq!(normalize_major("fgg"), "UNDECLARED");
    }

    #[test]
    fn unmatched_values_pass_through_normalized() {
        assert_eq!(normalize_major(" Economics "), "ECONOMICS");
        assert_eq!(normalize_major("Not Taken"), "NOT TAKEN");
        // only exact matches are replaced
        assert_eq!(normalize_major("AI and ML"), "AI AND ML");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = MAJOR_SYNONYMS
            .keys()
            .copied()
            .chain(["  econ ", "Statistics", "cs & physics", ""]);
        for raw in inputs {
            let once = normalize_major(raw);
            assert_eq!(normalize_major(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn normalizes_a_column_in_place() {
        let mut table = ResponseTable::new(
            vec!["SQ2".into()],
            vec![
                vec![Cell::text(" ai ")],
                vec![Cell::Integer(42)],
                vec![Cell::Missing],
            ],
        )
        .unwrap();
        normalize_major_column(&mut table, "SQ2").unwrap();
        let values: Vec<_> = table.column("SQ2").unwrap().cloned().collect();
        assert_eq!(
            values,
            vec![Cell::text("AIPI"), Cell::text("42"), Cell::Missing]
        );
    }
}
