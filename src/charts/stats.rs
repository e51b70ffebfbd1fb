// src/charts/stats.rs

use serde::Serialize;

/// Five-number summary plus mean, as drawn by a violin/box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl Summary {
    /// `None` for an empty input.
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values: Vec<f64> = values.into_iter().collect();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        debug_assert!(sorted.is_sorted_by(|a, b| a <= b));
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        Some(Self {
            n,
            min,
            q1: quantile(sorted, 0.25),
            median: quantile(sorted, 0.5),
            q3: quantile(sorted, 0.75),
            max,
            mean,
        })
    }
}

/// Linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// One histogram bin, `[start, end)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins spanning the data range.
pub fn histogram(values: &[f64], num_bins: usize) -> Vec<Bin> {
    let Some((min, max)) = bounds(values.iter().copied()) else {
        return vec![];
    };
    if num_bins == 0 {
        return vec![];
    }
    let width = bin_width(min, max, num_bins);
    let mut bins: Vec<Bin> = (0..num_bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in values {
        bins[bin_index(*v, min, width, num_bins)].count += 1;
    }
    bins
}

/// 2-D counts over a `num_bins` x `num_bins` grid; `counts[y][x]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityGrid {
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    pub counts: Vec<Vec<usize>>,
}

impl DensityGrid {
    pub fn new(points: &[(f64, f64)], num_bins: usize) -> Option<Self> {
        let (x_min, x_max) = bounds(points.iter().map(|p| p.0))?;
        let (y_min, y_max) = bounds(points.iter().map(|p| p.1))?;
        if num_bins == 0 {
            return None;
        }
        let x_width = bin_width(x_min, x_max, num_bins);
        let y_width = bin_width(y_min, y_max, num_bins);

        let mut counts = vec![vec![0usize; num_bins]; num_bins];
        for &(x, y) in points {
            let xi = bin_index(x, x_min, x_width, num_bins);
            let yi = bin_index(y, y_min, y_width, num_bins);
            counts[yi][xi] += 1;
        }
        let edges = |min: f64, width: f64| (0..=num_bins).map(|i| min + width * i as f64).collect();
        Some(Self {
            x_edges: edges(x_min, x_width),
            y_edges: edges(y_min, y_width),
            counts,
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

// a constant column still gets one unit-wide range
fn bin_width(min: f64, max: f64, num_bins: usize) -> f64 {
    if max > min {
        (max - min) / num_bins as f64
    } else {
        1.0 / num_bins as f64
    }
}

fn bin_index(v: f64, min: f64, width: f64, num_bins: usize) -> usize {
    (((v - min) / width) as usize).min(num_bins - 1)
}
