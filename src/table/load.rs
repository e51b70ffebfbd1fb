// src/table/load.rs

use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, warn};

use super::{Cell, ResponseTable};
use crate::error::{Result, SurveyError};
use crate::schema::derive::{derive_kinds, ColumnKind};

/// Open `path` and parse it as a header-first CSV export.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<ResponseTable> {
    let file = File::open(&path)?;
    let table = read_csv(file)?;
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "loaded responses"
    );
    Ok(table)
}

/// Parse CSV text into a typed table.
///
/// - short records are padded with missing cells
/// - records longer than the header row are rejected
/// - each column is typed from its non-empty cells (see [`derive_kinds`])
pub fn read_csv<R: Read>(reader: R) -> Result<ResponseTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(SurveyError::SchemaMismatch {
                expected: headers.len(),
                found: record.len(),
                detail: format!("record {} has more fields than the header row", idx),
            });
        }
        if record.len() < headers.len() {
            warn!(record = idx, fields = record.len(), "short record padded");
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        raw_rows.push(row);
    }

    let kinds = derive_kinds(&headers, &raw_rows);
    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(raw, kind)| to_cell(raw, *kind))
                .collect()
        })
        .collect();

    ResponseTable::new(headers, rows)
}

// only an empty field is missing; whitespace is kept as text
fn to_cell(raw: String, kind: ColumnKind) -> Cell {
    if raw.is_empty() {
        return Cell::Missing;
    }
    match kind {
        ColumnKind::Integer => raw
            .trim()
            .parse()
            .map(Cell::Integer)
            .unwrap_or(Cell::Text(raw)),
        ColumnKind::Float => raw
            .trim()
            .parse()
            .map(Cell::Number)
            .unwrap_or(Cell::Text(raw)),
        ColumnKind::Text => Cell::Text(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn types_columns_and_marks_empty_cells_missing() -> Result<()> {
        let csv = "id,score,rating,comment\n\
                   a,1,2.5,hello\n\
                   b,,3,\n\
                   c,7,4,\"x, y\"\n";
        let table = read_csv(csv.as_bytes())?;

        assert_eq!(table.columns(), ["id", "score", "rating", "comment"]);
        assert_eq!(table.num_rows(), 3);

        let score: Vec<_> = table.column("score")?.cloned().collect();
        assert_eq!(score, vec![Cell::Integer(1), Cell::Missing, Cell::Integer(7)]);

        let rating: Vec<_> = table.column("rating")?.cloned().collect();
        assert_eq!(
            rating,
            vec![Cell::Number(2.5), Cell::Number(3.0), Cell::Number(4.0)]
        );

        let comment: Vec<_> = table.column("comment")?.cloned().collect();
        assert_eq!(
            comment,
            vec![Cell::text("hello"), Cell::Missing, Cell::text("x, y")]
        );
        Ok(())
    }

    #[test]
    fn whitespace_only_cells_are_text_not_missing() -> Result<()> {
        let table = read_csv("id,n\n\"   \",1\n\"  \",\n".as_bytes())?;
        let ids: Vec<_> = table.column("id")?.cloned().collect();
        assert_eq!(ids, vec![Cell::text("   "), Cell::text("  ")]);
        let n: Vec<_> = table.column("n")?.cloned().collect();
        assert_eq!(n, vec![Cell::Integer(1), Cell::Missing]);
        Ok(())
    }

    #[test]
    fn pads_short_records_and_rejects_long_ones() -> Result<()> {
        let table = read_csv("a,b,c\n1,2\n".as_bytes())?;
        assert_eq!(table.row(0).unwrap().get("c"), Some(&Cell::Missing));

        let err = read_csv("a,b\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SurveyError::SchemaMismatch { expected: 2, found: 3, .. }));
        Ok(())
    }

    #[test]
    fn loads_from_disk() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "Timestamp,Name\n2024/01/01,Ana\n")?;
        let table = load_csv(tmp.path())?;
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.row(0).unwrap().get("Name"), Some(&Cell::text("Ana")));
        Ok(())
    }
}
