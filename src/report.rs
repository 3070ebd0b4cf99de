//! Plain-text and JSON rendering of a dashboard snapshot.

use std::fmt;

use serde::Serialize;

use crate::dashboard::Dashboard;
use crate::data::filter::FilterSelection;
use crate::stats::{DistanceBin, SatisfactionComparison, ScoreSeries};

pub const TITLE: &str = "Airline satisfaction";
pub const AVERAGES_TITLE: &str = "Average review";
pub const DISTANCE_TITLE: &str = "Average seat review by travel distance";
pub const COMPARISON_TITLE: &str = "Average review: satisfied vs dissatisfied";
pub const CORRELATION_TITLE: &str = "Correlation with overall satisfaction";

/// Serializable view of the four summaries.
#[derive(Debug, Serialize)]
pub struct DashboardReport<'a> {
    pub passengers: usize,
    pub selection: &'a FilterSelection,
    pub averages: &'a ScoreSeries<Option<f64>>,
    pub distance_profile: &'a [DistanceBin],
    pub satisfaction: &'a SatisfactionComparison,
    pub correlations: &'a ScoreSeries<Option<f64>>,
}

impl<'a> DashboardReport<'a> {
    pub fn new(dashboard: &'a Dashboard<'_>) -> Self {
        DashboardReport {
            passengers: dashboard.table().len(),
            selection: dashboard.selection(),
            averages: dashboard.averages(),
            distance_profile: &dashboard.distance_profile,
            satisfaction: &dashboard.satisfaction,
            correlations: &dashboard.correlations,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DashboardReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "{TITLE} ({} passengers)", self.passengers)?;
        writeln!(
            out,
            "Gender: {}  |  Travel type: {}  |  Loyalty: {}",
            join(self.selection.genders()),
            join(self.selection.travel_types()),
            join(self.selection.loyalty()),
        )?;

        writeln!(out, "\n{AVERAGES_TITLE}")?;
        for entry in self.averages {
            writeln!(out, "  {:<18} {}", entry.label, fmt_value(entry.value, 2))?;
        }

        writeln!(out, "\n{DISTANCE_TITLE}")?;
        if self.distance_profile.is_empty() {
            writeln!(out, "  (no flights in range)")?;
        }
        for bin in self.distance_profile {
            writeln!(
                out,
                "  {:>7.1} .. {:>7.1}  {:>6} rows  {}",
                bin.lower,
                bin.upper,
                bin.rows,
                fmt_value(bin.average, 2)
            )?;
        }

        writeln!(
            out,
            "\n{COMPARISON_TITLE} ({} / {} rows)",
            self.satisfaction.satisfied_rows, self.satisfaction.dissatisfied_rows
        )?;
        writeln!(out, "  {:<18} {:>9} {:>12}", "", "Satisfied", "Dissatisfied")?;
        for entry in &self.satisfaction.scores {
            writeln!(
                out,
                "  {:<18} {:>9} {:>12}",
                entry.label,
                fmt_value(entry.value.satisfied, 2),
                fmt_value(entry.value.dissatisfied, 2)
            )?;
        }

        writeln!(out, "\n{CORRELATION_TITLE}")?;
        for entry in self.correlations {
            writeln!(out, "  {:<18} {}", entry.label, fmt_value(entry.value, 3))?;
        }
        Ok(())
    }
}

fn join<T: fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "n/a".to_string(),
    }
}
