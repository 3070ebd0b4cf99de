use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{Category, Gender, Loyalty, Passenger, PassengerTable, TravelType};
use crate::error::SelectionError;

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

/// A test applied to one passenger row.
pub trait RowPredicate {
    fn matches(&self, row: &Passenger) -> bool;

    /// Conjunction: both predicates must hold.
    fn and<P: RowPredicate>(self, other: P) -> And<Self, P>
    where
        Self: Sized,
    {
        And(self, other)
    }
}

impl<F> RowPredicate for F
where
    F: Fn(&Passenger) -> bool,
{
    fn matches(&self, row: &Passenger) -> bool {
        self(row)
    }
}

/// Logical AND of two predicates.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(pub A, pub B);

impl<A: RowPredicate, B: RowPredicate> RowPredicate for And<A, B> {
    fn matches(&self, row: &Passenger) -> bool {
        self.0.matches(row) && self.1.matches(row)
    }
}

/// Passes rows whose categorical field is one of the selected values.
pub struct MemberOf<'a, C> {
    selected: &'a BTreeSet<C>,
    field: fn(&Passenger) -> C,
}

impl<'a, C: Category> MemberOf<'a, C> {
    pub fn new(selected: &'a BTreeSet<C>, field: fn(&Passenger) -> C) -> Self {
        MemberOf { selected, field }
    }
}

impl<C: Category> RowPredicate for MemberOf<'_, C> {
    fn matches(&self, row: &Passenger) -> bool {
        self.selected.contains(&(self.field)(row))
    }
}

/// Rows of `table` that pass `predicate`, in table order.
pub fn filter_rows<'a, P: RowPredicate>(
    table: &'a PassengerTable,
    predicate: &'a P,
) -> impl Iterator<Item = &'a Passenger> + 'a {
    table.iter().filter(move |row| predicate.matches(row))
}

// ---------------------------------------------------------------------------
// FilterSelection
// ---------------------------------------------------------------------------

/// The categorical field a checklist value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Gender,
    TravelType,
    Loyalty,
}

/// One checklist value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue {
    Gender(Gender),
    TravelType(TravelType),
    Loyalty(Loyalty),
}

/// Selected values for each categorical filter. Every set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    genders: BTreeSet<Gender>,
    travel_types: BTreeSet<TravelType>,
    loyalty: BTreeSet<Loyalty>,
}

impl Default for FilterSelection {
    /// Every value selected.
    fn default() -> Self {
        Self::all()
    }
}

impl FilterSelection {
    pub fn new(
        genders: BTreeSet<Gender>,
        travel_types: BTreeSet<TravelType>,
        loyalty: BTreeSet<Loyalty>,
    ) -> Result<Self, SelectionError> {
        non_empty(&genders)?;
        non_empty(&travel_types)?;
        non_empty(&loyalty)?;
        Ok(FilterSelection {
            genders,
            travel_types,
            loyalty,
        })
    }

    /// Selection covering the full domain of every field.
    pub fn all() -> Self {
        FilterSelection {
            genders: Gender::ALL.iter().copied().collect(),
            travel_types: TravelType::ALL.iter().copied().collect(),
            loyalty: Loyalty::ALL.iter().copied().collect(),
        }
    }

    /// Build a selection from raw labels as a UI would submit them.
    pub fn from_labels<S: AsRef<str>>(
        genders: &[S],
        travel_types: &[S],
        loyalty: &[S],
    ) -> Result<Self, SelectionError> {
        Self::new(parse_all(genders)?, parse_all(travel_types)?, parse_all(loyalty)?)
    }

    pub fn genders(&self) -> &BTreeSet<Gender> {
        &self.genders
    }

    pub fn travel_types(&self) -> &BTreeSet<TravelType> {
        &self.travel_types
    }

    pub fn loyalty(&self) -> &BTreeSet<Loyalty> {
        &self.loyalty
    }

    /// Conjunction of the three membership tests.
    pub fn predicate(&self) -> impl RowPredicate + '_ {
        MemberOf::new(&self.genders, |p| p.gender)
            .and(MemberOf::new(&self.travel_types, |p| p.travel_type))
            .and(MemberOf::new(&self.loyalty, |p| p.loyalty))
    }

    /// Copy of this selection with `value` flipped. Deselecting the last
    /// value of a field is rejected.
    pub fn toggled(&self, value: FilterValue) -> Result<Self, SelectionError> {
        let mut next = self.clone();
        match value {
            FilterValue::Gender(g) => toggle(&mut next.genders, g)?,
            FilterValue::TravelType(t) => toggle(&mut next.travel_types, t)?,
            FilterValue::Loyalty(l) => toggle(&mut next.loyalty, l)?,
        }
        Ok(next)
    }

    /// Copy of this selection with every value of `field` selected.
    pub fn with_all(&self, field: FilterField) -> Self {
        let mut next = self.clone();
        match field {
            FilterField::Gender => next.genders = Gender::ALL.iter().copied().collect(),
            FilterField::TravelType => {
                next.travel_types = TravelType::ALL.iter().copied().collect()
            }
            FilterField::Loyalty => next.loyalty = Loyalty::ALL.iter().copied().collect(),
        }
        next
    }

    /// Whether every field has its whole domain selected.
    pub fn is_unfiltered(&self) -> bool {
        self.genders.len() == Gender::ALL.len()
            && self.travel_types.len() == TravelType::ALL.len()
            && self.loyalty.len() == Loyalty::ALL.len()
    }
}

fn non_empty<C: Category>(set: &BTreeSet<C>) -> Result<(), SelectionError> {
    if set.is_empty() {
        return Err(SelectionError::Empty { field: C::NAME });
    }
    Ok(())
}

fn parse_all<C: Category, S: AsRef<str>>(labels: &[S]) -> Result<BTreeSet<C>, SelectionError> {
    labels
        .iter()
        .map(|label| {
            let label = label.as_ref();
            C::parse(label).ok_or_else(|| SelectionError::UnknownValue {
                field: C::NAME,
                value: label.to_string(),
                expected: C::expected(),
            })
        })
        .collect()
}

fn toggle<C: Category>(set: &mut BTreeSet<C>, value: C) -> Result<(), SelectionError> {
    if !set.remove(&value) {
        set.insert(value);
    }
    non_empty(set)
}
