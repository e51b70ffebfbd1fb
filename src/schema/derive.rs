// src/schema/derive.rs

use tracing::debug;

/// Value kind shared by every non-empty cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

/// For each column, look at every row:
///  - Ignore empty cells; whitespace-only cells count as text
///  - Start from the narrowest kind seen and widen Integer → Float → Text
///  - A column with no samples defaults to Text
pub fn derive_kinds(header_names: &[String], rows: &[Vec<String>]) -> Vec<ColumnKind> {
    header_names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut kind: Option<ColumnKind> = None;
            for row in rows {
                let cell = row.get(idx).map(String::as_str).unwrap_or("");
                if cell.is_empty() {
                    continue;
                }
                let inferred = infer_kind(cell.trim());
                kind = Some(match (kind, inferred) {
                    (None, k) => k,
                    (Some(ColumnKind::Text), _) | (_, ColumnKind::Text) => ColumnKind::Text,
                    (Some(ColumnKind::Float), _) | (_, ColumnKind::Float) => ColumnKind::Float,
                    _ => ColumnKind::Integer,
                });
                if kind == Some(ColumnKind::Text) {
                    break;
                }
            }
            let kind = kind.unwrap_or(ColumnKind::Text);
            debug!(column = %name, ?kind, "derived column kind");
            kind
        })
        .collect()
}

fn infer_kind(v: &str) -> ColumnKind {
    if v.is_empty() {
        ColumnKind::Text
    } else if v.parse::<i64>().is_ok() {
        ColumnKind::Integer
    } else if v.parse::<f64>().is_ok_and(f64::is_finite) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}
