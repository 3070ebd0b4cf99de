use std::collections::btree_map::Entry;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{Category, FieldValue, FlatRecord, Passenger, PassengerTable};
use super::schema::{
    is_passenger_field, AGE_FIELD, ARRIVAL_DELAY_FIELD, DEPARTURE_DELAY_FIELD, GENDER_FIELD,
    LOYALTY_FIELD, SATISFACTION_FIELD, SCORE_COLUMNS, SCORE_COUNT, TRAVEL_DISTANCE_FIELD,
    TRAVEL_TYPE_FIELD,
};
use crate::error::LoadError;

type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a passenger table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "passenger": { "gender": ... }, "review": { ... }, ... }, ...]`
/// * `.csv`     – flattened form, one dotted column name per header cell
/// * `.parquet` – flattened form, one dotted column name per field
pub fn load_file(path: &Path) -> Result<PassengerTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let table = match ext.as_str() {
        "json" => load_json_str(&std::fs::read_to_string(path).map_err(io_error)?)?,
        "csv" => load_csv(std::fs::File::open(path).map_err(io_error)?)?,
        "parquet" | "pq" => load_parquet(std::fs::File::open(path).map_err(io_error)?)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!("Loaded {} passengers from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Parse a JSON document of nested passenger records.
///
/// ```json
/// [
///   {
///     "passenger": { "gender": "Female", "type": "Loyal Customer", "age": 41 },
///     "travelType": "Business travel",
///     "travelDistance": 853,
///     "review": { "wifiService": 3, "seatComfort": 5, "satisfaction": "satisfied", ... }
///   },
///   ...
/// ]
/// ```
pub fn load_json_str(text: &str) -> Result<PassengerTable> {
    let root: JsonValue = serde_json::from_str(text)?;
    load_json_value(&root)
}

/// Build a table from an already parsed JSON document.
pub fn load_json_value(root: &JsonValue) -> Result<PassengerTable> {
    let records = root.as_array().ok_or(LoadError::NotAnArray)?;

    let flat = records.iter().enumerate().map(|(row, rec)| -> Result<FlatRecord> {
        let obj = rec.as_object().ok_or(LoadError::RowNotObject { row })?;
        flatten(row, obj)
    });

    table_from_records(flat)
}

/// Flatten nested objects into `parent.child` keys. Non-object values are
/// leaves. Two leaves reaching the same dotted path (`"review.food"` next to
/// `"review": { "food": .. }`) are rejected.
pub fn flatten(row: usize, obj: &Map<String, JsonValue>) -> Result<FlatRecord> {
    let mut record = FlatRecord::new();
    flatten_into(row, obj, "", &mut record)?;
    Ok(record)
}

fn flatten_into(
    row: usize,
    obj: &Map<String, JsonValue>,
    prefix: &str,
    out: &mut FlatRecord,
) -> Result<()> {
    for (key, val) in obj {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            JsonValue::Object(child) => flatten_into(row, child, &path, out)?,
            leaf => match out.entry(path) {
                Entry::Vacant(slot) => {
                    slot.insert(json_to_field(leaf));
                }
                Entry::Occupied(slot) => {
                    return Err(LoadError::DuplicateField {
                        row,
                        field: slot.key().clone(),
                    });
                }
            },
        }
    }
    Ok(())
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row of dotted column names (`passenger.gender`,
/// `review.wifiService`, ...), one passenger per record. Empty cells are null.
pub fn load_csv<R: Read>(reader: R) -> Result<PassengerTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let flat = reader.records().map(|result| -> Result<FlatRecord> {
        let record = result?;
        Ok(headers
            .iter()
            .cloned()
            .zip(record.iter().map(guess_field_type))
            .collect::<FlatRecord>())
    });

    table_from_records(flat)
}

fn guess_field_type(s: &str) -> FieldValue {
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return FieldValue::Float(f);
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    FieldValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose columns carry the dotted field names.
///
/// Works with the output of `generate_sample` and with a flattened frame
/// written by Pandas (`df.to_parquet()`) or Polars. Columns that are not
/// passenger fields are never decoded, whatever their type.
pub fn load_parquet(file: std::fs::File) -> Result<PassengerTable> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let columns: Vec<(usize, &String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| is_passenger_field(f.name()))
            .map(|(i, f)| (i, f.name()))
            .collect();

        for row in 0..batch.num_rows() {
            let mut record = FlatRecord::new();
            for &(col_idx, name) in &columns {
                let value = match extract_field_value(batch.column(col_idx), row, name) {
                    // The arrival delay is optional; an unreadable column means missing.
                    Err(LoadError::UnsupportedColumnType { .. }) if name == ARRIVAL_DELAY_FIELD => {
                        FieldValue::Null
                    }
                    other => other?,
                };
                record.insert(name.clone(), value);
            }
            records.push(record);
        }
    }

    table_from_records(records.into_iter().map(Ok))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_field_value(col: &Arc<dyn Array>, row: usize, name: &str) -> Result<FieldValue> {
    if col.is_null(row) {
        return Ok(FieldValue::Null);
    }
    let unsupported = || LoadError::UnsupportedColumnType {
        column: name.to_string(),
        data_type: format!("{:?}", col.data_type()),
    };

    let value = match col.data_type() {
        DataType::Utf8 => FieldValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => FieldValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().ok_or_else(unsupported)?;
            FieldValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().ok_or_else(unsupported)?;
            FieldValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().ok_or_else(unsupported)?;
            FieldValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().ok_or_else(unsupported)?;
            FieldValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().ok_or_else(unsupported)?;
            FieldValue::Bool(arr.value(row))
        }
        _ => return Err(unsupported()),
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Flat record → Passenger
// ---------------------------------------------------------------------------

/// Coerce every flat record; the first failure aborts the whole load.
fn table_from_records<I>(records: I) -> Result<PassengerTable>
where
    I: IntoIterator<Item = Result<FlatRecord>>,
{
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(row, record)| passenger_from_record(row, &record?))
        .collect::<Result<Vec<_>>>()?;

    let missing = rows.iter().filter(|p| p.arrival_delay_minutes.is_none()).count();
    if missing > 0 {
        log::debug!("{missing} of {} rows have no usable '{ARRIVAL_DELAY_FIELD}'", rows.len());
    }

    Ok(PassengerTable::new(rows))
}

/// Coerce one flattened record into a typed row.
pub fn passenger_from_record(row: usize, record: &FlatRecord) -> Result<Passenger> {
    let mut scores = [0u8; SCORE_COUNT];
    for (slot, column) in scores.iter_mut().zip(SCORE_COLUMNS.iter()) {
        let value = required_int(row, record, column.field, column.min as i64, column.max as i64)?;
        *slot = value as u8;
    }

    Ok(Passenger {
        gender: required_category(row, record, GENDER_FIELD)?,
        loyalty: required_category(row, record, LOYALTY_FIELD)?,
        age: required_int(row, record, AGE_FIELD, 0, u32::MAX as i64)? as u32,
        travel_type: required_category(row, record, TRAVEL_TYPE_FIELD)?,
        travel_distance: required_int(row, record, TRAVEL_DISTANCE_FIELD, 0, u32::MAX as i64)?
            as u32,
        scores,
        departure_delay_minutes: required_int(
            row,
            record,
            DEPARTURE_DELAY_FIELD,
            0,
            u32::MAX as i64,
        )? as u32,
        arrival_delay_minutes: record
            .get(ARRIVAL_DELAY_FIELD)
            .and_then(FieldValue::as_float)
            .filter(|v| *v >= 0.0),
        satisfaction: required_category(row, record, SATISFACTION_FIELD)?,
    })
}

fn required<'a>(row: usize, record: &'a FlatRecord, field: &str) -> Result<&'a FieldValue> {
    record.get(field).ok_or_else(|| LoadError::MissingField {
        row,
        field: field.to_string(),
    })
}

fn required_int(row: usize, record: &FlatRecord, field: &str, min: i64, max: i64) -> Result<i64> {
    let raw = required(row, record, field)?;
    let value = raw.as_integer().ok_or_else(|| LoadError::NotAnInteger {
        row,
        field: field.to_string(),
        value: raw.to_string(),
    })?;
    if !(min..=max).contains(&value) {
        return Err(LoadError::OutOfRange {
            row,
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value)
}

fn required_category<C: Category>(row: usize, record: &FlatRecord, field: &str) -> Result<C> {
    let raw = required(row, record, field)?;
    raw.as_text()
        .and_then(C::parse)
        .ok_or_else(|| LoadError::UnknownCategory {
            row,
            field: field.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::model::{Gender, Loyalty, Satisfaction, TravelType};
    use crate::data::schema::SEAT_COMFORT;

    fn record(wifi: JsonValue, arrival: JsonValue) -> JsonValue {
        json!({
            "id": 7,
            "passenger": { "gender": "Male", "type": "disloyal Customer", "age": 33 },
            "travelType": "Personal Travel",
            "travelDistance": 1200,
            "review": {
                "wifiService": wifi,
                "timeConvenient": 4,
                "bookingEase": 3,
                "gateLocation": 1,
                "food": 5,
                "boarding": 2,
                "seatComfort": 4,
                "entertainment": 3,
                "onboardService": 4,
                "legRoomService": 3,
                "baggageHandling": 5,
                "checkinService": 4,
                "inflightService": 5,
                "cleanliness": 3,
                "departureDelayInMinutes": 12,
                "arrivalDelayInMinutes": arrival,
                "satisfaction": "neutral or dissatisfied"
            }
        })
    }

    #[test]
    fn flatten_joins_nested_keys() {
        let rec = record(json!(2), json!(8.0));
        let flat = flatten(0, rec.as_object().unwrap()).unwrap();
        assert_eq!(flat.get("passenger.gender"), Some(&FieldValue::Text("Male".into())));
        assert_eq!(flat.get("review.wifiService"), Some(&FieldValue::Integer(2)));
        assert_eq!(flat.get("travelDistance"), Some(&FieldValue::Integer(1200)));
        assert_eq!(flat.get("id"), Some(&FieldValue::Integer(7)));
        assert!(!flat.contains_key("review"));
    }

    #[test]
    fn colliding_dotted_paths_are_rejected() {
        let mut rec = record(json!(2), json!(0));
        rec["review.wifiService"] = json!(5);
        let err = load_json_value(&json!([record(json!(1), json!(0)), rec])).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateField { row: 1, ref field } if field == "review.wifiService"
        ));
    }

    #[test]
    fn loads_typed_row() {
        let table = load_json_value(&json!([record(json!(2), json!(8.0))])).unwrap();
        assert_eq!(table.len(), 1);

        let p = &table.rows()[0];
        assert_eq!(p.gender, Gender::Male);
        assert_eq!(p.loyalty, Loyalty::Disloyal);
        assert_eq!(p.travel_type, TravelType::Personal);
        assert_eq!(p.satisfaction, Satisfaction::NeutralOrDissatisfied);
        assert_eq!(p.age, 33);
        assert_eq!(p.travel_distance, 1200);
        assert_eq!(p.scores[0], 2);
        assert_eq!(p.score(SEAT_COMFORT), 4);
        assert_eq!(p.departure_delay_minutes, 12);
        assert_eq!(p.arrival_delay_minutes, Some(8.0));
    }

    #[test]
    fn numeric_strings_are_accepted_for_scores() {
        let table = load_json_value(&json!([record(json!("5"), json!(0))])).unwrap();
        assert_eq!(table.rows()[0].scores[0], 5);
    }

    #[test]
    fn non_numeric_score_aborts_load() {
        let doc = json!([
            record(json!(3), json!(0)),
            record(json!("excellent"), json!(0)),
        ]);
        match load_json_value(&doc) {
            Err(LoadError::NotAnInteger { row, field, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(field, "review.wifiService");
            }
            other => panic!("expected NotAnInteger, got {other:?}"),
        }
    }

    #[test]
    fn out_of_scale_score_is_rejected() {
        let err = load_json_value(&json!([record(json!(9), json!(0))])).unwrap_err();
        assert!(matches!(err, LoadError::OutOfRange { value: 9, .. }));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut rec = record(json!(3), json!(0));
        rec["passenger"].as_object_mut().unwrap().remove("gender");
        let err = load_json_value(&json!([rec])).unwrap_err();
        assert!(matches!(err, LoadError::MissingField { row: 0, ref field } if field == "passenger.gender"));
    }

    #[test]
    fn unknown_satisfaction_is_rejected() {
        let mut rec = record(json!(3), json!(0));
        rec["review"]["satisfaction"] = json!("dissatisfied");
        let err = load_json_value(&json!([rec])).unwrap_err();
        assert!(matches!(err, LoadError::UnknownCategory { .. }));
    }

    #[test]
    fn arrival_delay_is_lenient() {
        let doc = json!([
            record(json!(3), json!(null)),
            record(json!(3), json!("n/a")),
            record(json!(3), json!("17")),
            record(json!(3), json!(-4)),
        ]);
        let mut rec = record(json!(3), json!(0));
        rec["review"].as_object_mut().unwrap().remove("arrivalDelayInMinutes");
        let mut rows = doc.as_array().unwrap().clone();
        rows.push(rec);

        let table = load_json_value(&JsonValue::Array(rows)).unwrap();
        let delays: Vec<_> = table.iter().map(|p| p.arrival_delay_minutes).collect();
        assert_eq!(delays, vec![None, None, Some(17.0), None, None]);
    }

    #[test]
    fn top_level_must_be_array() {
        assert!(matches!(load_json_str("{}"), Err(LoadError::NotAnArray)));
        assert!(matches!(load_json_str("[1]"), Err(LoadError::RowNotObject { row: 0 })));
        assert!(matches!(load_json_str("[{"), Err(LoadError::Json(_))));
    }

    #[test]
    fn empty_document_is_an_empty_table() {
        assert!(load_json_str("[]").unwrap().is_empty());
    }

    #[test]
    fn loads_flat_csv() {
        let mut header: Vec<String> = vec![
            "passenger.gender".into(),
            "passenger.type".into(),
            "passenger.age".into(),
            "travelType".into(),
            "travelDistance".into(),
            "review.departureDelayInMinutes".into(),
            "review.arrivalDelayInMinutes".into(),
            "review.satisfaction".into(),
        ];
        header.extend(SCORE_COLUMNS.iter().map(|c| c.field.to_string()));

        let first = ["Female", "Loyal Customer", "52", "Business travel", "3100", "0", "", "satisfied"];
        let second = ["Male", "Loyal Customer", "19", "Personal Travel", "250", "5", "3.0", "neutral or dissatisfied"];
        let mut text = header.join(",") + "\n";
        text += &(first.join(",") + &",4".repeat(SCORE_COUNT) + "\n");
        text += &(second.join(",") + &",1".repeat(SCORE_COUNT) + "\n");

        let table = load_csv(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].arrival_delay_minutes, None);
        assert_eq!(table.rows()[0].scores, [4; SCORE_COUNT]);
        assert_eq!(table.rows()[1].arrival_delay_minutes, Some(3.0));
        assert_eq!(table.rows()[1].gender, Gender::Male);
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("passengers.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ref ext) if ext == "xlsx"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/nonexistent/passengers.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
