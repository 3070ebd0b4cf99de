use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::schema::{SCORE_COLUMNS, SCORE_COUNT};

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a flattened source record
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from JSON, CSV or Parquet, before it is
/// coerced into a typed [`Passenger`] field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// One source record flattened to `dotted.path → value`.
pub type FlatRecord = BTreeMap<String, FieldValue>;

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s:?}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Strict integer interpretation: integers, floats without a fractional
    /// part, and strings holding an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Lenient float interpretation used for optional measurements.
    pub fn as_float(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Integer(i) => *i as f64,
            FieldValue::Float(v) => *v,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Categorical domains
// ---------------------------------------------------------------------------

/// A closed categorical domain whose values are matched by exact label.
pub trait Category: Copy + Ord + fmt::Debug + 'static {
    /// Human name of the field, used in error messages.
    const NAME: &'static str;
    /// Every value of the domain, in display order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == label)
    }

    /// Comma-separated list of valid labels.
    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Category for Gender {
    const NAME: &'static str = "gender";
    const ALL: &'static [Self] = &[Gender::Male, Gender::Female];

    fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TravelType {
    #[serde(rename = "Business travel")]
    Business,
    #[serde(rename = "Personal Travel")]
    Personal,
}

impl Category for TravelType {
    const NAME: &'static str = "travel type";
    const ALL: &'static [Self] = &[TravelType::Business, TravelType::Personal];

    fn as_str(self) -> &'static str {
        match self {
            TravelType::Business => "Business travel",
            TravelType::Personal => "Personal Travel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Loyalty {
    #[serde(rename = "Loyal Customer")]
    Loyal,
    #[serde(rename = "disloyal Customer")]
    Disloyal,
}

impl Category for Loyalty {
    const NAME: &'static str = "loyalty";
    const ALL: &'static [Self] = &[Loyalty::Loyal, Loyalty::Disloyal];

    fn as_str(self) -> &'static str {
        match self {
            Loyalty::Loyal => "Loyal Customer",
            Loyalty::Disloyal => "disloyal Customer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Satisfaction {
    #[serde(rename = "satisfied")]
    Satisfied,
    #[serde(rename = "neutral or dissatisfied")]
    NeutralOrDissatisfied,
}

impl Category for Satisfaction {
    const NAME: &'static str = "satisfaction";
    const ALL: &'static [Self] = &[Satisfaction::Satisfied, Satisfaction::NeutralOrDissatisfied];

    fn as_str(self) -> &'static str {
        match self {
            Satisfaction::Satisfied => "satisfied",
            Satisfaction::NeutralOrDissatisfied => "neutral or dissatisfied",
        }
    }
}

impl Satisfaction {
    pub fn is_satisfied(self) -> bool {
        self == Satisfaction::Satisfied
    }
}

macro_rules! impl_display_for_category {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_for_category!(Gender, TravelType, Loyalty, Satisfaction);

// ---------------------------------------------------------------------------
// Passenger – one survey response
// ---------------------------------------------------------------------------

/// A single passenger survey response (one row of the table).
#[derive(Debug, Clone, PartialEq)]
pub struct Passenger {
    pub gender: Gender,
    pub loyalty: Loyalty,
    pub age: u32,
    pub travel_type: TravelType,
    pub travel_distance: u32,
    /// Ratings indexed like [`SCORE_COLUMNS`].
    pub scores: [u8; SCORE_COUNT],
    pub departure_delay_minutes: u32,
    /// `None` when the source value was missing or unparseable.
    pub arrival_delay_minutes: Option<f64>,
    pub satisfaction: Satisfaction,
}

impl Passenger {
    /// Rating for the score column at `index` in [`SCORE_COLUMNS`].
    pub fn score(&self, index: usize) -> u8 {
        self.scores[index]
    }
}

// ---------------------------------------------------------------------------
// PassengerTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded dataset. Built once and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassengerTable {
    rows: Vec<Passenger>,
}

impl PassengerTable {
    pub fn new(rows: Vec<Passenger>) -> Self {
        PassengerTable { rows }
    }

    pub fn rows(&self) -> &[Passenger] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Passenger> {
        self.rows.iter()
    }

    /// Number of passengers.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one score column in row order.
    pub fn score_values(&self, index: usize) -> impl Iterator<Item = u8> + '_ {
        debug_assert!(index < SCORE_COLUMNS.len());
        self.rows.iter().map(move |p| p.scores[index])
    }

    /// Arrival delays that are present; missing values are skipped, never
    /// reported as zero.
    pub fn arrival_delays(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().filter_map(|p| p.arrival_delay_minutes)
    }
}

impl<'a> IntoIterator for &'a PassengerTable {
    type Item = &'a Passenger;
    type IntoIter = std::slice::Iter<'a, Passenger>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
