use crate::data::filter::{FilterField, FilterSelection, FilterValue};
use crate::data::model::PassengerTable;
use crate::error::SelectionError;
use crate::stats::{
    correlation_with_satisfaction, distance_comfort_profile, filtered_averages,
    satisfaction_comparison, DistanceBin, SatisfactionComparison, ScoreSeries,
};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything a presentation layer renders, independent of rendering.
///
/// The three table-wide summaries are computed once in [`Dashboard::new`];
/// the filtered averages are recomputed on every selection change.
pub struct Dashboard<'a> {
    table: &'a PassengerTable,

    /// Current checklist state.
    selection: FilterSelection,

    /// Score averages over rows passing `selection`.
    averages: ScoreSeries<Option<f64>>,

    pub distance_profile: Vec<DistanceBin>,
    pub satisfaction: SatisfactionComparison,
    pub correlations: ScoreSeries<Option<f64>>,
}

impl<'a> Dashboard<'a> {
    /// Compute the static summaries and the averages for the full selection.
    pub fn new(table: &'a PassengerTable) -> Self {
        log::info!("Computing dashboard summaries over {} passengers", table.len());
        let selection = FilterSelection::all();
        let averages = filtered_averages(table, &selection);

        Self {
            table,
            selection,
            averages,
            distance_profile: distance_comfort_profile(table),
            satisfaction: satisfaction_comparison(table),
            correlations: correlation_with_satisfaction(table),
        }
    }

    pub fn table(&self) -> &'a PassengerTable {
        self.table
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn averages(&self) -> &ScoreSeries<Option<f64>> {
        &self.averages
    }

    /// Replace the selection and recompute the averages.
    pub fn set_selection(&mut self, selection: FilterSelection) {
        if selection == self.selection {
            return;
        }
        self.selection = selection;
        self.refilter();
    }

    /// Toggle a single checklist value. An invalid result leaves the
    /// dashboard unchanged.
    pub fn toggle(&mut self, value: FilterValue) -> Result<(), SelectionError> {
        let next = self.selection.toggled(value)?;
        self.set_selection(next);
        Ok(())
    }

    /// Select every value of one field.
    pub fn select_all(&mut self, field: FilterField) {
        let next = self.selection.with_all(field);
        self.set_selection(next);
    }

    fn refilter(&mut self) {
        self.averages = filtered_averages(self.table, &self.selection);
    }
}
