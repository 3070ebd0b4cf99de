//! Column identifiers of the survey dataset and the score-column table.

// ---------------------------------------------------------------------------
// Dotted field paths (as they appear after flattening)
// ---------------------------------------------------------------------------

pub const GENDER_FIELD: &str = "passenger.gender";
pub const LOYALTY_FIELD: &str = "passenger.type";
pub const AGE_FIELD: &str = "passenger.age";
pub const TRAVEL_TYPE_FIELD: &str = "travelType";
pub const TRAVEL_DISTANCE_FIELD: &str = "travelDistance";
pub const DEPARTURE_DELAY_FIELD: &str = "review.departureDelayInMinutes";
pub const ARRIVAL_DELAY_FIELD: &str = "review.arrivalDelayInMinutes";
pub const SATISFACTION_FIELD: &str = "review.satisfaction";

/// Parent object of every score column.
pub const SCORE_PREFIX: &str = "review.";

/// Every non-score field a passenger row is built from.
pub const PASSENGER_FIELDS: [&str; 8] = [
    GENDER_FIELD,
    LOYALTY_FIELD,
    AGE_FIELD,
    TRAVEL_TYPE_FIELD,
    TRAVEL_DISTANCE_FIELD,
    DEPARTURE_DELAY_FIELD,
    ARRIVAL_DELAY_FIELD,
    SATISFACTION_FIELD,
];

/// Whether a dotted field is read when building a passenger row.
pub fn is_passenger_field(field: &str) -> bool {
    PASSENGER_FIELDS.contains(&field) || SCORE_COLUMNS.iter().any(|c| c.field == field)
}

// ---------------------------------------------------------------------------
// Score columns
// ---------------------------------------------------------------------------

/// Constant metadata for one ordinal rating column.
///
/// `min..=max` is enforced at load time: a rating outside the survey's 0–5
/// scale is a load error, which is stricter than a plain integer cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreColumn {
    /// Identifier without its parent prefix, e.g. `wifiService`.
    pub key: &'static str,
    /// Full dotted path, e.g. `review.wifiService`.
    pub field: &'static str,
    /// Human-readable label, e.g. `Wifi service`.
    pub label: &'static str,
    pub min: u8,
    pub max: u8,
}

impl ScoreColumn {
    const fn new(key: &'static str, field: &'static str, label: &'static str) -> Self {
        ScoreColumn {
            key,
            field,
            label,
            min: 0,
            max: 5,
        }
    }
}

pub const SCORE_COUNT: usize = 14;

/// The 14 rating columns in display order.
pub const SCORE_COLUMNS: [ScoreColumn; SCORE_COUNT] = [
    ScoreColumn::new("wifiService", "review.wifiService", "Wifi service"),
    ScoreColumn::new("timeConvenient", "review.timeConvenient", "Time convenient"),
    ScoreColumn::new("bookingEase", "review.bookingEase", "Booking ease"),
    ScoreColumn::new("gateLocation", "review.gateLocation", "Gate location"),
    ScoreColumn::new("food", "review.food", "Food"),
    ScoreColumn::new("boarding", "review.boarding", "Boarding"),
    ScoreColumn::new("seatComfort", "review.seatComfort", "Seat comfort"),
    ScoreColumn::new("entertainment", "review.entertainment", "Entertainment"),
    ScoreColumn::new("onboardService", "review.onboardService", "Onboard service"),
    ScoreColumn::new("legRoomService", "review.legRoomService", "Leg room service"),
    ScoreColumn::new("baggageHandling", "review.baggageHandling", "Baggage handling"),
    ScoreColumn::new("checkinService", "review.checkinService", "Checkin service"),
    ScoreColumn::new("inflightService", "review.inflightService", "Inflight service"),
    ScoreColumn::new("cleanliness", "review.cleanliness", "Cleanliness"),
];

/// Index of `seatComfort` in [`SCORE_COLUMNS`].
pub const SEAT_COMFORT: usize = 6;

/// Position of a score column by key (`seatComfort`) or dotted field
/// (`review.seatComfort`).
pub fn score_index(name: &str) -> Option<usize> {
    SCORE_COLUMNS
        .iter()
        .position(|c| c.key == name || c.field == name)
}

// ---------------------------------------------------------------------------
// Labeler
// ---------------------------------------------------------------------------

/// Turn a camelCase identifier into a sentence-case label.
///
/// A new word starts at every upper-case character after the first one. The
/// first word is capitalised and every following word lower-cased:
/// `legRoomService` → `Leg room service`.
pub fn label(identifier: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for (i, ch) in identifier.chars().enumerate() {
        if i == 0 || ch.is_uppercase() {
            words.push(ch.to_string());
        } else if let Some(word) = words.last_mut() {
            word.push(ch);
        }
    }

    words
        .iter()
        .enumerate()
        .map(|(i, word)| if i == 0 { capitalize(word) } else { word.to_lowercase() })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label of a dotted field path; the parent path (`review.`) is dropped.
pub fn field_label(field: &str) -> String {
    let key = field.rsplit('.').next().unwrap_or(field);
    label(key)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
