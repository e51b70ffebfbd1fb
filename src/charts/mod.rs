// src/charts/mod.rs

pub mod stats;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashMap},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, error, info};

use crate::error::{Result, SurveyError};
use crate::process::{COURSE_COLUMN, MAJOR_COLUMN, SCORE_COLUMN, SENTINEL};
use crate::table::{write::write_atomically, Cell, ResponseTable};
use stats::{histogram, Bin, DensityGrid, Summary};

const WORDCLOUD_LIMIT: usize = 200;
const GRID_BINS: usize = 10;
const HISTOGRAM_BINS: usize = 10;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}']+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T> {
    pub column: String,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: Cell,
    pub y: Cell,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Cell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Cell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

/// Plot-ready data for one chart; serialized as JSON with a `kind` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    WordCloud {
        columns: Vec<String>,
        words: Vec<WordCount>,
    },
    Violin {
        series: Vec<Series<Summary>>,
    },
    Contour {
        x: String,
        y: String,
        grid: DensityGrid,
    },
    Histogram {
        rows: usize,
        series: Vec<Series<Vec<Bin>>>,
    },
    Scatter3d {
        x: String,
        y: String,
        z: String,
        points: Vec<[f64; 3]>,
    },
    Pie {
        column: String,
        slices: Vec<Slice>,
    },
    Scatter {
        x: String,
        y: String,
        color: Option<String>,
        symbol: Option<String>,
        size: Option<String>,
        points: Vec<ScatterPoint>,
    },
}

/// A named chart builder.
pub struct Chart {
    pub name: &'static str,
    build: fn(&ResponseTable) -> Result<ChartData>,
}

impl Chart {
    pub fn build(&self, table: &ResponseTable) -> Result<ChartData> {
        (self.build)(table)
    }
}

pub const CHARTS: [Chart; 9] = [
    Chart {
        name: "wordcloud_sq9_sq12",
        build: |t| word_cloud(t, &["SQ9", "SQ12"]),
    },
    Chart {
        name: "violin_sq8_sq11_sq15_sq17",
        build: |t| violin(t, &["SQ8", "SQ11", "SQ15", "SQ17"]),
    },
    Chart {
        name: "contour_sq5_sq10",
        build: |t| contour(t, "SQ5", "SQ10"),
    },
    Chart {
        name: "histogram_o_score_sq10_sq13",
        build: |t| nonzero_histograms(t, &[SCORE_COLUMN, "SQ10", "SQ13"]),
    },
    Chart {
        name: "scatter3d_sq6_sq13_o_score",
        build: |t| scored_scatter3d(t, "SQ6", "SQ13"),
    },
    Chart {
        name: "scatter3d_sq7_sq13_o_score",
        build: |t| scored_scatter3d(t, "SQ7", "SQ13"),
    },
    Chart {
        name: "pie_sq18",
        build: |t| pie(t, COURSE_COLUMN),
    },
    Chart {
        name: "scatter_sq5_sq2",
        build: |t| {
            scatter(
                t,
                ("SQ5", MAJOR_COLUMN),
                Some("SQ3"),
                Some("SQ4"),
                Some("SQ6"),
            )
        },
    },
    Chart {
        name: "scatter_sq16_sq14",
        build: |t| scatter(t, ("SQ16", "SQ14"), None, None, None),
    },
];

fn empty(chart: &str) -> SurveyError {
    SurveyError::EmptyChart(chart.to_string())
}

fn numeric_column(table: &ResponseTable, column: &str) -> Result<Vec<Option<f64>>> {
    Ok(table.column(column)?.map(Cell::as_f64).collect())
}

/// Lower-cased word frequencies over free-text answers, most frequent first.
pub fn word_cloud(table: &ResponseTable, columns: &[&str]) -> Result<ChartData> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for column in columns {
        for cell in table.column(column)? {
            let text = cell.render();
            if cell.is_missing() || text == SENTINEL {
                continue;
            }
            for word in WORD.find_iter(&text) {
                *counts.entry(word.as_str().to_lowercase()).or_default() += 1;
            }
        }
    }
    if counts.is_empty() {
        return Err(empty("word cloud"));
    }

    let mut words: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(WORDCLOUD_LIMIT);

    Ok(ChartData::WordCloud {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        words,
    })
}

/// Distribution summary per column; columns without numbers are left out.
pub fn violin(table: &ResponseTable, columns: &[&str]) -> Result<ChartData> {
    let mut series = Vec::with_capacity(columns.len());
    for column in columns {
        let values = numeric_column(table, column)?;
        match Summary::new(values.into_iter().flatten()) {
            Some(data) => series.push(Series {
                column: column.to_string(),
                data,
            }),
            None => debug!(column, "no numeric values for violin"),
        }
    }
    if series.is_empty() {
        return Err(empty("violin"));
    }
    Ok(ChartData::Violin { series })
}

pub fn contour(table: &ResponseTable, x: &str, y: &str) -> Result<ChartData> {
    let points: Vec<(f64, f64)> = numeric_column(table, x)?
        .into_iter()
        .zip(numeric_column(table, y)?)
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        })
        .collect();
    let grid = DensityGrid::new(&points, GRID_BINS).ok_or_else(|| empty("contour"))?;
    Ok(ChartData::Contour {
        x: x.to_string(),
        y: y.to_string(),
        grid,
    })
}

/// Histograms per column, restricted to rows where every column holds a non-zero number.
pub fn nonzero_histograms(table: &ResponseTable, columns: &[&str]) -> Result<ChartData> {
    let values = columns
        .iter()
        .map(|c| numeric_column(table, c))
        .collect::<Result<Vec<_>>>()?;

    let keep: Vec<usize> = (0..table.num_rows())
        .filter(|&i| {
            values
                .iter()
                .all(|col| matches!(col[i], Some(v) if v != 0.0))
        })
        .collect();
    if keep.is_empty() {
        return Err(empty("histogram"));
    }

    let series = columns
        .iter()
        .zip(&values)
        .map(|(column, col)| {
            let kept: Vec<f64> = keep.iter().filter_map(|&i| col[i]).collect();
            Series {
                column: column.to_string(),
                data: histogram(&kept, HISTOGRAM_BINS),
            }
        })
        .collect();
    Ok(ChartData::Histogram {
        rows: keep.len(),
        series,
    })
}

/// `(x, y, o_score)` points for respondents with a non-zero score.
pub fn scored_scatter3d(table: &ResponseTable, x: &str, y: &str) -> Result<ChartData> {
    let xs = numeric_column(table, x)?;
    let ys = numeric_column(table, y)?;
    let zs = numeric_column(table, SCORE_COLUMN)?;

    let points: Vec<[f64; 3]> = xs
        .into_iter()
        .zip(ys)
        .zip(zs)
        .filter_map(|((x, y), z)| match (x, y, z) {
            (Some(x), Some(y), Some(z)) if z != 0.0 => Some([x, y, z]),
            _ => None,
        })
        .collect();
    if points.is_empty() {
        return Err(empty("scatter3d"));
    }
    Ok(ChartData::Scatter3d {
        x: x.to_string(),
        y: y.to_string(),
        z: SCORE_COLUMN.to_string(),
        points,
    })
}

pub fn pie(table: &ResponseTable, column: &str) -> Result<ChartData> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for cell in table.column(column)? {
        *counts.entry(cell.render().into_owned()).or_default() += 1;
    }
    if counts.is_empty() {
        return Err(empty("pie"));
    }
    let mut slices: Vec<Slice> = counts
        .into_iter()
        .map(|(label, count)| Slice { label, count })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(ChartData::Pie {
        column: column.to_string(),
        slices,
    })
}

/// One point per respondent; the optional encodings are read from their own columns.
pub fn scatter(
    table: &ResponseTable,
    (x, y): (&str, &str),
    color: Option<&str>,
    symbol: Option<&str>,
    size: Option<&str>,
) -> Result<ChartData> {
    let idx = |c: &str| table.column_index(c);
    let (xi, yi) = (idx(x)?, idx(y)?);
    let ci = color.map(idx).transpose()?;
    let si = symbol.map(idx).transpose()?;
    let zi = size.map(idx).transpose()?;

    let points: Vec<ScatterPoint> = table
        .rows()
        .filter_map(|row| {
            let get = |i: usize| row.cell(i).cloned();
            Some(ScatterPoint {
                x: get(xi)?,
                y: get(yi)?,
                color: ci.and_then(get),
                symbol: si.and_then(get),
                size: zi.and_then(|i| row.cell(i)).and_then(Cell::as_f64),
            })
        })
        .collect();
    if points.is_empty() {
        return Err(empty("scatter"));
    }
    let name = |c: Option<&str>| c.map(str::to_string);
    Ok(ChartData::Scatter {
        x: x.to_string(),
        y: y.to_string(),
        color: name(color),
        symbol: name(symbol),
        size: name(size),
        points,
    })
}

/// Paths written and names of the charts that could not be built.
#[derive(Debug, Default)]
pub struct ChartOutcome {
    pub written: Vec<PathBuf>,
    pub failed: Vec<&'static str>,
}

/// Build every chart and write each to `<dir>/<name>.json`; one failing chart
/// does not stop the others.
#[tracing::instrument(level = "info", skip(table, dir), fields(dir = %dir.display()))]
pub fn write_charts(table: &ResponseTable, dir: &Path) -> Result<ChartOutcome> {
    std::fs::create_dir_all(dir)?;
    let mut outcome = ChartOutcome::default();

    for chart in &CHARTS {
        let path = dir.join(format!("{}.json", chart.name));
        let result = chart.build(table).and_then(|data| {
            write_atomically(&path, |file| {
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &data)?;
                writer.flush()?;
                Ok(())
            })
        });
        match result {
            Ok(()) => {
                debug!(chart = chart.name, path = %path.display(), "wrote chart");
                outcome.written.push(path);
            }
            Err(e) => {
                error!(chart = chart.name, error = %e, "chart failed");
                outcome.failed.push(chart.name);
            }
        }
    }

    info!(
        written = outcome.written.len(),
        failed = outcome.failed.len(),
        "charts done"
    );
    Ok(outcome)
}
