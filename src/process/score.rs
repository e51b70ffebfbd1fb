// src/process/score.rs

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::{COURSE_COLUMN, SCORE_COLUMN};
use crate::error::{Result, SurveyError};
use crate::schema::{Battery, ColumnLayout};
use crate::table::{Cell, ResponseTable, Row};

pub const QUESTIONS_PER_BATTERY: usize = 5;

pub const MODELING_COURSE: &str = "AIPI 520 - Modeling Process & Algorithms";
pub const BUSINESS_COURSE: &str = "MENG 570 - Business Fundamentals for Engineers";
pub const SOURCING_COURSE: &str = "AIPI 510 - Sourcing Data for Analytics";

/// Reject layouts whose batteries are not exactly [`QUESTIONS_PER_BATTERY`] wide.
pub fn check_battery_layout(layout: &ColumnLayout) -> Result<()> {
    for battery in Battery::ALL {
        let count = layout.battery_questions(battery);
        if count != QUESTIONS_PER_BATTERY {
            return Err(SurveyError::InvalidParameter(format!(
                "layout has {} {} questions, scoring reads exactly {}",
                count,
                battery.prefix(),
                QUESTIONS_PER_BATTERY
            )));
        }
    }
    Ok(())
}

/// Course a respondent reported in `SQ18`, which decides the battery they are scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cohort {
    Modeling,
    Business,
    Sourcing,
    Other,
}

impl Cohort {
    /// Exact, case-sensitive match on the course name.
    pub fn from_course(course: &str) -> Self {
        match course {
            MODELING_COURSE => Cohort::Modeling,
            BUSINESS_COURSE => Cohort::Business,
            SOURCING_COURSE => Cohort::Sourcing,
            _ => Cohort::Other,
        }
    }

    pub fn from_cell(cell: Option<&Cell>) -> Self {
        cell.and_then(Cell::as_text)
            .map_or(Cohort::Other, Cohort::from_course)
    }

    pub fn battery(self) -> Option<Battery> {
        match self {
            Cohort::Modeling => Some(Battery::Modeling),
            Cohort::Business => Some(Battery::Business),
            Cohort::Sourcing => Some(Battery::Sourcing),
            Cohort::Other => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cohort::Modeling => MODELING_COURSE,
            Cohort::Business => BUSINESS_COURSE,
            Cohort::Sourcing => SOURCING_COURSE,
            Cohort::Other => "other",
        }
    }
}

/// Exact-match correct answers, one array per battery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    pub business: [&'static str; QUESTIONS_PER_BATTERY],
    pub sourcing: [&'static str; QUESTIONS_PER_BATTERY],
    pub modeling: [&'static str; QUESTIONS_PER_BATTERY],
}

impl AnswerKey {
    pub const STANDARD: AnswerKey = AnswerKey {
        modeling: [
            "No single algorithm performs best across all tasks",
            "There are significant multicollinearity issues in the data",
            "The model is violating the assumption of linearity",
            "The true population parameter lies within the interval 95% of the time",
            "The model is too simple to capture the data's underlying patterns",
        ],
        business: [
            "To define a clear, compelling message that differentiates your product",
            "To provide feedback and help validate the product-market fit",
            "Target specific customer groups with tailored marketing strategies",
            "A unique feature that cannot be easily copied or bought by competitors",
            "Understanding customer needs and validating business assumptions",
        ],
        sourcing: [
            "To collect data from various sources for analysis and decision-making",
            "Verifying the quality and accuracy of the data",
            "To extract real-time data from various online platforms",
            "It can extract data from websites without needing API access",
            "Streaming data sources",
        ],
    };

    pub fn answers(&self, battery: Battery) -> &[&'static str; QUESTIONS_PER_BATTERY] {
        match battery {
            Battery::Business => &self.business,
            Battery::Sourcing => &self.sourcing,
            Battery::Modeling => &self.modeling,
        }
    }
}

impl Default for AnswerKey {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Count of exact matches between `answers` and the key.
fn count_matches<'a, I>(answers: I, key: &[&str; QUESTIONS_PER_BATTERY]) -> u8
where
    I: IntoIterator<Item = Option<&'a Cell>>,
{
    answers
        .into_iter()
        .zip(key)
        .filter(|(cell, expected)| cell.and_then(Cell::as_text) == Some(**expected))
        .count() as u8
}

/// Objective score of one respondent, 0..=5.
///
/// Missing or non-text answers simply fail to match.
pub fn score_row(row: &Row<'_>, key: &AnswerKey) -> u8 {
    let Some(battery) = Cohort::from_cell(row.get(COURSE_COLUMN)).battery() else {
        return 0;
    };
    let answers = (1..=QUESTIONS_PER_BATTERY).map(|n| row.get(&battery.column(n)));
    count_matches(answers, key.answers(battery))
}

/// Fail with `MissingColumn` unless `SQ18` and every battery column exist.
fn require_score_columns(table: &ResponseTable) -> Result<()> {
    table.column_index(COURSE_COLUMN)?;
    for battery in Battery::ALL {
        for n in 1..=QUESTIONS_PER_BATTERY {
            table.column_index(&battery.column(n))?;
        }
    }
    Ok(())
}

/// Per-run scoring summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    pub respondents: usize,
    pub per_cohort: BTreeMap<Cohort, usize>,
    /// `distribution[s]` = respondents scoring `s`.
    pub distribution: [usize; QUESTIONS_PER_BATTERY + 1],
}

/// Append the `o_score` column.
///
/// Requires `SQ18` and all fifteen battery columns. An existing `o_score`
/// column is overwritten; no other column is touched.
#[tracing::instrument(level = "info", skip_all, fields(rows = table.num_rows()))]
pub fn append_scores(table: &mut ResponseTable, key: &AnswerKey) -> Result<ScoreSummary> {
    require_score_columns(table)?;
    if table.has_column(SCORE_COLUMN) {
        warn!("replacing existing {} column", SCORE_COLUMN);
    }

    let mut summary = ScoreSummary::default();
    let mut scores = Vec::with_capacity(table.num_rows());
    for (idx, row) in table.rows().enumerate() {
        let cohort = Cohort::from_cell(row.get(COURSE_COLUMN));
        let score = score_row(&row, key);
        debug!(row = idx, ?cohort, score, "scored respondent");

        summary.respondents += 1;
        *summary.per_cohort.entry(cohort).or_default() += 1;
        summary.distribution[usize::from(score)] += 1;
        scores.push(Cell::Integer(i64::from(score)));
    }

    table.set_column(SCORE_COLUMN, scores)?;
    info!(
        respondents = summary.respondents,
        distribution = ?summary.distribution,
        "appended objective scores"
    );
    Ok(summary)
}
