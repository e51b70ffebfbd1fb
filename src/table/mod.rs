// src/table/mod.rs

pub mod load;
pub mod write;

use serde::Serialize;
use std::{borrow::Cow, fmt};

use crate::error::{Result, SurveyError};

pub use load::{load_csv, read_csv};
pub use write::{write_csv, write_parquet};

/// A single value in the response table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Integer(i64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Only text cells expose a string; numbers never compare equal to answer text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Display form used for sorting identifiers and CSV write-back.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Cell::Missing => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s),
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Integer(i) => Cow::Owned(i.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Column-addressed survey table: one `Vec<Cell>` per respondent, all rows as wide as `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Borrowed view of one respondent row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a ResponseTable,
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        let idx = self.table.columns.iter().position(|c| c == column)?;
        self.cells.get(idx)
    }

    pub fn cell(&self, idx: usize) -> Option<&'a Cell> {
        self.cells.get(idx)
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

impl ResponseTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(SurveyError::SchemaMismatch {
                expected: columns.len(),
                found: row.len(),
                detail: format!("row {} has the wrong number of cells", idx),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Build a text-only table, treating empty strings as missing.
    pub fn from_text_rows<S: AsRef<str>>(columns: &[S], rows: &[Vec<&str>]) -> Result<Self> {
        let columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let rows = rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|v| {
                        if v.is_empty() {
                            Cell::Missing
                        } else {
                            Cell::text(*v)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SurveyError::missing_column(name))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        self.rows.get(idx).map(|cells| Row {
            table: self,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |cells| Row {
            table: self,
            cells,
        })
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let idx = self.column_index(from)?;
        self.columns[idx] = to.to_string();
        Ok(())
    }

    /// Rename all columns at once; `rename` returns `None` to keep a name.
    pub fn rename_columns<F>(&mut self, mut rename: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for name in &mut self.columns {
            if let Some(new) = rename(name.as_str()) {
                *name = new;
            }
        }
    }

    /// Replace every cell of `name` with `f(cell)`.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&Cell) -> Cell,
    {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        Ok(())
    }

    /// Replace every missing cell with `sentinel`; returns how many were filled.
    pub fn fill_missing(&mut self, sentinel: &str) -> usize {
        let mut filled = 0;
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_missing() {
                *cell = Cell::text(sentinel);
                filled += 1;
            }
        }
        filled
    }

    /// Append `values` as column `name`, replacing an existing column of that name.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(SurveyError::SchemaMismatch {
                expected: self.rows.len(),
                found: values.len(),
                detail: format!("column `{}` has the wrong number of values", name),
            });
        }
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        Ok(())
    }
}
