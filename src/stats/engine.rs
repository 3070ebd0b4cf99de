//! The four dashboard summaries.
//!
//! Every function here is pure: it only reads the table it is given.

use serde::Serialize;

use super::primitives::{pearson, EqualWidthBins, MeanAccumulator};
use crate::data::filter::{filter_rows, FilterSelection};
use crate::data::model::{Passenger, PassengerTable, Satisfaction};
use crate::data::schema::{ScoreColumn, SCORE_COLUMNS, SCORE_COUNT, SEAT_COMFORT};

/// Rows at or beyond this distance are left out of the comfort profile.
pub const DISTANCE_LIMIT: u32 = 3500;

/// Number of equal-width distance bins in the comfort profile.
pub const DISTANCE_BINS: usize = 10;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One value per score column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry<T> {
    pub key: &'static str,
    pub label: &'static str,
    pub value: T,
}

/// Per-score-column results, in [`SCORE_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoreSeries<T> {
    entries: Vec<ScoreEntry<T>>,
}

impl<T> ScoreSeries<T> {
    fn from_fn(mut f: impl FnMut(usize, &ScoreColumn) -> T) -> Self {
        let entries = SCORE_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| ScoreEntry {
                key: column.key,
                label: column.label,
                value: f(i, column),
            })
            .collect();
        ScoreSeries { entries }
    }

    /// Value for a human-readable label such as `Seat comfort`.
    pub fn get(&self, label: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.label == label).map(|e| &e.value)
    }

    /// Value for a column key such as `seatComfort`.
    pub fn get_key(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoreEntry<T>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a ScoreSeries<T> {
    type Item = &'a ScoreEntry<T>;
    type IntoIter = std::slice::Iter<'a, ScoreEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Average seat comfort for one distance range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceBin {
    pub lower: f64,
    pub upper: f64,
    pub rows: usize,
    /// `None` for a bin without rows.
    pub average: Option<f64>,
}

/// Mean of one score column within each satisfaction group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupMeans {
    pub satisfied: Option<f64>,
    pub dissatisfied: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionComparison {
    pub satisfied_rows: usize,
    pub dissatisfied_rows: usize,
    pub scores: ScoreSeries<GroupMeans>,
}

// ---------------------------------------------------------------------------
// Computations
// ---------------------------------------------------------------------------

fn column_means<'a, I>(rows: I) -> (usize, [MeanAccumulator; SCORE_COUNT])
where
    I: IntoIterator<Item = &'a Passenger>,
{
    let mut count = 0;
    let mut acc = [MeanAccumulator::default(); SCORE_COUNT];
    for row in rows {
        count += 1;
        for (slot, &score) in acc.iter_mut().zip(row.scores.iter()) {
            slot.push(score as f64);
        }
    }
    (count, acc)
}

/// Mean of every score column over the rows passing `selection`.
///
/// An empty match gives `None` for every column.
pub fn filtered_averages(
    table: &PassengerTable,
    selection: &FilterSelection,
) -> ScoreSeries<Option<f64>> {
    let predicate = selection.predicate();
    let (matched, acc) = column_means(filter_rows(table, &predicate));
    log::debug!("Selection matched {matched} of {} passengers", table.len());

    ScoreSeries::from_fn(|i, _| acc[i].mean())
}

/// Average seat comfort over ten equal-width distance bins, for flights
/// shorter than [`DISTANCE_LIMIT`]. Bins span the min..max distance of those
/// flights and are returned in increasing order. No such flights gives an
/// empty profile.
pub fn distance_comfort_profile(table: &PassengerTable) -> Vec<DistanceBin> {
    let restricted: Vec<&Passenger> = table
        .iter()
        .filter(|p| p.travel_distance < DISTANCE_LIMIT)
        .collect();

    let min = restricted.iter().map(|p| p.travel_distance).min();
    let max = restricted.iter().map(|p| p.travel_distance).max();
    let Some(bins) = min
        .zip(max)
        .and_then(|(lo, hi)| EqualWidthBins::new(lo as f64, hi as f64, DISTANCE_BINS))
    else {
        log::warn!("No passengers below {DISTANCE_LIMIT} distance units; comfort profile is empty");
        return Vec::new();
    };

    let mut acc = vec![MeanAccumulator::default(); bins.count()];
    for p in &restricted {
        acc[bins.index_of(p.travel_distance as f64)].push(p.score(SEAT_COMFORT) as f64);
    }

    acc.iter()
        .enumerate()
        .map(|(i, a)| {
            let (lower, upper) = bins.edges(i);
            DistanceBin {
                lower,
                upper,
                rows: a.count(),
                average: a.mean(),
            }
        })
        .collect()
}

/// Per-column means of the satisfied and the neutral-or-dissatisfied groups.
pub fn satisfaction_comparison(table: &PassengerTable) -> SatisfactionComparison {
    let (satisfied_rows, satisfied) =
        column_means(table.iter().filter(|p| p.satisfaction == Satisfaction::Satisfied));
    let (dissatisfied_rows, dissatisfied) = column_means(
        table
            .iter()
            .filter(|p| p.satisfaction == Satisfaction::NeutralOrDissatisfied),
    );

    SatisfactionComparison {
        satisfied_rows,
        dissatisfied_rows,
        scores: ScoreSeries::from_fn(|i, _| GroupMeans {
            satisfied: satisfied[i].mean(),
            dissatisfied: dissatisfied[i].mean(),
        }),
    }
}

/// Pearson correlation of each score column with the satisfaction outcome
/// coded as 1 (satisfied) / 0 (neutral or dissatisfied).
///
/// A column whose correlation is undefined (constant values, constant
/// outcome, fewer than two rows) is `None`.
pub fn correlation_with_satisfaction(table: &PassengerTable) -> ScoreSeries<Option<f64>> {
    let outcome: Vec<f64> = table
        .iter()
        .map(|p| if p.satisfaction.is_satisfied() { 1.0 } else { 0.0 })
        .collect();

    ScoreSeries::from_fn(|i, column| {
        let scores: Vec<f64> = table.score_values(i).map(f64::from).collect();
        let r = pearson(&scores, &outcome);
        if r.is_none() {
            log::debug!("Correlation undefined for '{}'", column.field);
        }
        r
    })
}
