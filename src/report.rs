// src/report.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fmt,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

use crate::error::Result;
use crate::process::{IdentifierMap, Preprocessed, ScoreSummary};
use crate::schema::ColumnNameMap;
use crate::table::{write::write_atomically, ResponseTable};

/// Longest cell shown by [`render_preview`], in characters.
pub const PREVIEW_CELL_WIDTH: usize = 24;

/// Human-readable mapping and score report printed after a run.
pub struct MappingReport<'a> {
    pre: &'a Preprocessed,
    summary: &'a ScoreSummary,
}

pub fn mapping_report<'a>(pre: &'a Preprocessed, summary: &'a ScoreSummary) -> MappingReport<'a> {
    MappingReport { pre, summary }
}

impl fmt::Display for MappingReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Column mapping ({} keys):", self.pre.column_map.len())?;
        write!(f, "{}", self.pre.column_map)?;
        writeln!(f, "Identifier mapping ({} respondents):", self.pre.id_map.len())?;
        write!(f, "{}", self.pre.id_map)?;
        writeln!(f, "Scores ({} respondents):", self.summary.respondents)?;
        for (cohort, n) in &self.summary.per_cohort {
            writeln!(f, "  {:<10} {}", cohort.name(), n)?;
        }
        for (score, n) in self.summary.distribution.iter().enumerate() {
            writeln!(f, "  o_score={} {}", score, n)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Audit<'a> {
    generated_at: DateTime<Utc>,
    column_map: &'a ColumnNameMap,
    id_map: &'a IdentifierMap,
}

/// Write both mappings as pretty JSON, stamped with the current UTC time.
#[tracing::instrument(level = "info", skip(path, pre), fields(path = %path.display()))]
pub fn write_audit(path: &Path, pre: &Preprocessed) -> Result<()> {
    let audit = Audit {
        generated_at: Utc::now(),
        column_map: &pre.column_map,
        id_map: &pre.id_map,
    };
    write_atomically(path, |file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &audit)?;
        writer.flush()?;
        Ok(())
    })?;
    info!(
        columns = pre.column_map.len(),
        identifiers = pre.id_map.len(),
        "wrote audit"
    );
    Ok(())
}

fn clip(s: &str) -> String {
    if s.chars().count() <= PREVIEW_CELL_WIDTH {
        return s.to_string();
    }
    let mut clipped: String = s.chars().take(PREVIEW_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

/// First rows of a table, clipped and aligned; see [`render_preview`].
pub struct Preview {
    widths: Vec<usize>,
    lines: Vec<Vec<String>>,
}

/// First `rows` rows as an aligned text table.
pub fn render_preview(table: &ResponseTable, rows: usize) -> Preview {
    let header: Vec<String> = table.columns().iter().map(|c| clip(c)).collect();
    let body = table
        .rows()
        .take(rows)
        .map(|row| row.cells().iter().map(|c| clip(&c.render())).collect());

    let mut lines = vec![header];
    lines.extend(body);
    let mut widths = vec![0; lines[0].len()];
    for line in &lines {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect();
    lines.insert(1, rule);
    Preview { widths, lines }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cells in &self.lines {
            let line: Vec<String> = cells
                .iter()
                .zip(&self.widths)
                .map(|(c, w)| format!("{:<w$}", c, w = *w))
                .collect();
            writeln!(f, "{}", line.join(" | ").trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{fixtures, preprocess_and_score, AnswerKey};
    use crate::schema::ColumnLayout;
    use crate::table::read_csv;

    #[test]
    fn report_lists_every_mapping() {
        let mut table = read_csv(fixtures::raw_csv().as_bytes()).unwrap();
        let (pre, summary) =
            preprocess_and_score(&mut table, &ColumnLayout::default(), &AnswerKey::STANDARD)
                .unwrap();
        let report = mapping_report(&pre, &summary).to_string();
        assert!(report.contains("Column mapping (33 keys):"));
        assert!(report.contains("SQ1   <- General question 1?"));
        assert!(report.contains("s-04"));
        assert!(report.contains("o_score=5 1"));
    }

    #[test]
    fn audit_is_valid_json_with_both_maps() -> anyhow::Result<()> {
        let mut table = read_csv(fixtures::raw_csv().as_bytes())?;
        let (pre, _) =
            preprocess_and_score(&mut table, &ColumnLayout::default(), &AnswerKey::STANDARD)?;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("audit").join("mappings.json");

        write_audit(&path, &pre)?;
        let json: serde_json::Value = serde_json::from_reader(std::fs::File::open(&path)?)?;
        assert_eq!(json["column_map"].as_array().map(Vec::len), Some(33));
        assert_eq!(json["column_map"][0]["key"], "SQ1");
        assert_eq!(json["id_map"]["s-01"], 0);
        assert!(json["generated_at"].as_str().is_some());
        Ok(())
    }

    #[test]
    fn preview_truncates_and_aligns() {
        let long = "x".repeat(40);
        let table = ResponseTable::from_text_rows(
            &["id", "answer"],
            &[vec!["1", long.as_str()], vec!["22", "short"], vec!["3", "z"]],
        )
        .unwrap();
        let preview = render_preview(&table, 2).to_string();
        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id | answer"));
        assert!(lines[2].contains(&format!("{}…", "x".repeat(23))));
        assert!(!preview.contains(&"x".repeat(24)));
        assert!(lines[3].starts_with("22 | short"));
    }

    #[test]
    fn report_and_preview_format_the_same_every_time() {
        let mut table = read_csv(fixtures::raw_csv().as_bytes()).unwrap();
        let (pre, summary) =
            preprocess_and_score(&mut table, &ColumnLayout::default(), &AnswerKey::STANDARD)
                .unwrap();
        let report = mapping_report(&pre, &summary);
        assert_eq!(report.to_string(), format!("{}", report));
        assert!(report.to_string().ends_with("o_score=5 1\n"));

        let preview = render_preview(&table, 0).to_string();
        assert_eq!(preview.lines().count(), 2);
        assert!(preview.lines().nth(1).unwrap().starts_with("---"));
    }
}
