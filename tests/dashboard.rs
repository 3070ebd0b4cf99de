use std::path::{Path, PathBuf};
use std::sync::Arc;

use airline_satisfaction::data::filter::{FilterField, FilterValue};
use airline_satisfaction::data::loader::{load_json_str, load_json_value};
use airline_satisfaction::data::model::{Category, Gender, Loyalty, TravelType};
use airline_satisfaction::data::schema::{SCORE_COLUMNS, SCORE_COUNT};
use airline_satisfaction::stats::{
    correlation_with_satisfaction, distance_comfort_profile, filtered_averages,
    satisfaction_comparison,
};
use airline_satisfaction::{load_file, Dashboard, FilterSelection, LoadError, PassengerTable};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/passengers.json")
}

fn fixture() -> PassengerTable {
    load_file(&fixture_path()).expect("fixture loads")
}

fn unfiltered_mean(table: &PassengerTable, index: usize) -> f64 {
    table.score_values(index).map(f64::from).sum::<f64>() / table.len() as f64
}

#[test]
fn fixture_loads_every_row() {
    let table = fixture();
    assert_eq!(table.len(), 8);
    // One null and one empty-string arrival delay.
    assert_eq!(table.arrival_delays().count(), 6);
}

#[test]
fn full_selection_matches_unfiltered_means() {
    let table = fixture();
    let averages = filtered_averages(&table, &FilterSelection::all());

    assert_eq!(averages.len(), SCORE_COUNT);
    for (i, entry) in averages.iter().enumerate() {
        assert_eq!(entry.label, SCORE_COLUMNS[i].label);
        let expected = unfiltered_mean(&table, i);
        assert!(
            (entry.value.unwrap() - expected).abs() < 1e-12,
            "{}: {:?} != {expected}",
            entry.label,
            entry.value
        );
    }
    assert_eq!(averages.get("Inflight service"), Some(&Some(4.125)));
}

#[test]
fn every_narrowed_selection_is_well_defined() {
    let table = fixture();
    for &g in Gender::ALL {
        for &t in TravelType::ALL {
            for &l in Loyalty::ALL {
                let selection = FilterSelection::from_labels(
                    &[g.as_str()],
                    &[t.as_str()],
                    &[l.as_str()],
                )
                .unwrap();
                let matched = table
                    .iter()
                    .filter(|p| p.gender == g && p.travel_type == t && p.loyalty == l)
                    .count();

                let averages = filtered_averages(&table, &selection);
                assert_eq!(averages.len(), SCORE_COUNT);
                assert!(averages.iter().all(|e| e.value.is_some() == (matched > 0)));
            }
        }
    }
}

#[test]
fn disloyal_business_travellers() {
    let table = fixture();
    let selection =
        FilterSelection::from_labels(&["Male"], &["Business travel"], &["disloyal Customer"])
            .unwrap();
    let averages = filtered_averages(&table, &selection);
    assert_eq!(averages.get("Checkin service"), Some(&Some(5.0)));
}

#[test]
fn satisfaction_groups_partition_the_table() {
    let table = fixture();
    let cmp = satisfaction_comparison(&table);
    assert_eq!(cmp.satisfied_rows, 4);
    assert_eq!(cmp.satisfied_rows + cmp.dissatisfied_rows, table.len());

    let wifi = cmp.scores.get("Wifi service").unwrap();
    assert_eq!(wifi.satisfied, Some(4.0));
    assert_eq!(wifi.dissatisfied, Some(2.0));
}

#[test]
fn correlations_are_bounded() {
    let table = fixture();
    let corr = correlation_with_satisfaction(&table);
    assert_eq!(corr.len(), SCORE_COUNT);
    for entry in &corr {
        let r = entry.value.expect("fixture columns vary");
        assert!((-1.0..=1.0).contains(&r), "{} = {r}", entry.label);
    }
    // Seat comfort tracks satisfaction in the fixture.
    assert!(corr.get("Seat comfort").unwrap().unwrap() > 0.5);
}

#[test]
fn comfort_profile_over_fixture() {
    let table = fixture();
    let profile = distance_comfort_profile(&table);

    assert_eq!(profile.len(), 10);
    assert_eq!(profile[0].lower, 235.0);
    assert!((profile[9].upper - 3200.0).abs() < 1e-9);
    // The 3900-distance passenger is left out.
    assert_eq!(profile.iter().map(|b| b.rows).sum::<usize>(), 7);
    assert_eq!(profile[0].average, Some(4.0));
    assert_eq!(profile[1].average, None);
    assert_eq!(profile[9].average, Some(4.0));
}

#[test]
fn non_numeric_score_aborts_fixture_load() {
    let text = std::fs::read_to_string(fixture_path()).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    doc[5]["review"]["wifiService"] = serde_json::json!("very good");

    match load_json_value(&doc) {
        Err(LoadError::NotAnInteger { row: 5, field, .. }) => {
            assert_eq!(field, "review.wifiService")
        }
        other => panic!("expected a load error, got {other:?}"),
    }
}

#[test]
fn malformed_document_is_rejected() {
    assert!(load_json_str(r#"{"passengers": []}"#).is_err());
}

#[test]
fn dashboard_follows_checklist_changes() {
    let table = fixture();
    let mut dashboard = Dashboard::new(&table);
    let static_profile = dashboard.distance_profile.clone();

    dashboard
        .toggle(FilterValue::TravelType(TravelType::Business))
        .unwrap();
    let personal = dashboard.averages().get("Food").copied().flatten().unwrap();
    assert!((personal - 3.0).abs() < 1e-12);

    dashboard.select_all(FilterField::TravelType);
    assert_eq!(dashboard.averages().get("Food"), Some(&Some(3.25)));
    assert_eq!(dashboard.distance_profile, static_profile);
}

fn write_parquet(table_path: &Path, table: &PassengerTable, extra: Vec<(Field, ArrayRef)>) {
    let rows = table.rows();
    let strings = |f: fn(&airline_satisfaction::data::model::Passenger) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new("passenger.gender", DataType::Utf8, false),
        Field::new("passenger.type", DataType::Utf8, false),
        Field::new("passenger.age", DataType::Int64, false),
        Field::new("travelType", DataType::Utf8, false),
        Field::new("travelDistance", DataType::Int64, false),
        Field::new("review.departureDelayInMinutes", DataType::Int64, false),
        Field::new("review.arrivalDelayInMinutes", DataType::Float64, true),
        Field::new("review.satisfaction", DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        strings(|p| p.gender.as_str()),
        strings(|p| p.loyalty.as_str()),
        Arc::new(Int64Array::from(rows.iter().map(|p| p.age as i64).collect::<Vec<_>>())),
        strings(|p| p.travel_type.as_str()),
        Arc::new(Int64Array::from(
            rows.iter().map(|p| p.travel_distance as i64).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(
            rows.iter().map(|p| p.departure_delay_minutes as i64).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|p| p.arrival_delay_minutes).collect::<Vec<_>>(),
        )),
        strings(|p| p.satisfaction.as_str()),
    ];
    for (i, column) in SCORE_COLUMNS.iter().enumerate() {
        fields.push(Field::new(column.field, DataType::Int64, false));
        columns.push(Arc::new(Int64Array::from(
            rows.iter().map(|p| p.scores[i] as i64).collect::<Vec<_>>(),
        )));
    }
    for (field, column) in extra {
        fields.push(field);
        columns.push(column);
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
    let file = std::fs::File::create(table_path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

#[test]
fn parquet_flat_form_loads_the_same_table() {
    let table = fixture();
    let path = std::env::temp_dir().join(format!(
        "airline-satisfaction-{}.parquet",
        std::process::id()
    ));
    write_parquet(&path, &table, Vec::new());

    let reloaded = load_file(&path);
    let _ = std::fs::remove_file(&path);
    assert_eq!(reloaded.unwrap(), table);
}

#[test]
fn parquet_ignores_unused_columns_of_any_type() {
    let table = fixture();
    let path = std::env::temp_dir().join(format!(
        "airline-satisfaction-extra-{}.parquet",
        std::process::id()
    ));
    let dates: Vec<i32> = (0..table.len() as i32).map(|d| 19_000 + d).collect();
    write_parquet(
        &path,
        &table,
        vec![(
            Field::new("flightDate", DataType::Date32, false),
            Arc::new(Date32Array::from(dates)) as ArrayRef,
        )],
    );

    let reloaded = load_file(&path);
    let _ = std::fs::remove_file(&path);
    assert_eq!(reloaded.unwrap(), table);
}
