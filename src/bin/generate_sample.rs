use std::path::PathBuf;
use std::sync::Arc;

use airline_satisfaction::data::model::{Category, Gender, Loyalty, Satisfaction, TravelType};
use airline_satisfaction::data::schema::{
    AGE_FIELD, ARRIVAL_DELAY_FIELD, DEPARTURE_DELAY_FIELD, GENDER_FIELD, LOYALTY_FIELD,
    SATISFACTION_FIELD, SCORE_COLUMNS, SCORE_COUNT, TRAVEL_DISTANCE_FIELD, TRAVEL_TYPE_FIELD,
};
use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde_json::{json, Map, Value};

/// Write a synthetic passenger survey in the dashboard's input formats.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Number of passengers
    #[arg(default_value_t = 2000)]
    rows: usize,

    /// Output path without extension
    #[arg(short, long, default_value = "sample_passengers")]
    output: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Deterministic SplitMix64 generator.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<T: Copy>(&mut self, values: &[T]) -> T {
        values[self.below(values.len() as u64) as usize]
    }
}

struct Row {
    gender: Gender,
    loyalty: Loyalty,
    age: i64,
    travel_type: TravelType,
    distance: i64,
    scores: [i64; SCORE_COUNT],
    departure_delay: i64,
    arrival_delay: Option<f64>,
    satisfaction: Satisfaction,
}

fn generate_row(i: usize, rng: &mut Rng) -> Row {
    let travel_type = if rng.unit() < 0.7 {
        TravelType::Business
    } else {
        TravelType::Personal
    };
    let loyalty = if rng.unit() < 0.8 {
        Loyalty::Loyal
    } else {
        Loyalty::Disloyal
    };
    let distance = 50 + rng.below(4900) as i64;

    // Business travellers and shorter flights rate a little higher.
    let mood = match travel_type {
        TravelType::Business => 0.6,
        TravelType::Personal => -0.4,
    } - distance as f64 / 5000.0;

    let mut scores = [0i64; SCORE_COUNT];
    for score in &mut scores {
        let raw = 3.0 + mood + (rng.unit() - 0.5) * 4.0;
        *score = raw.round().clamp(0.0, 5.0) as i64;
    }
    let average = scores.iter().sum::<i64>() as f64 / SCORE_COUNT as f64;
    let satisfaction = if average + (rng.unit() - 0.5) > 3.2 {
        Satisfaction::Satisfied
    } else {
        Satisfaction::NeutralOrDissatisfied
    };

    let departure_delay = if rng.unit() < 0.6 { 0 } else { rng.below(180) as i64 };
    // Every 37th record lacks an arrival delay, like the real survey.
    let arrival_delay = (i % 37 != 0)
        .then(|| (departure_delay as f64 + rng.unit() * 20.0 - 8.0).max(0.0).round());

    Row {
        gender: rng.pick(Gender::ALL),
        loyalty,
        age: 7 + rng.below(78) as i64,
        travel_type,
        distance,
        scores,
        departure_delay,
        arrival_delay,
        satisfaction,
    }
}

/// Nested record, as the survey export ships it.
fn to_json(id: usize, row: &Row) -> Value {
    let mut review = Map::new();
    for (column, score) in SCORE_COLUMNS.iter().zip(row.scores) {
        review.insert(column.key.to_string(), json!(score));
    }
    review.insert("departureDelayInMinutes".into(), json!(row.departure_delay));
    review.insert("arrivalDelayInMinutes".into(), json!(row.arrival_delay));
    review.insert("satisfaction".into(), json!(row.satisfaction.as_str()));

    json!({
        "id": id,
        "passenger": {
            "gender": row.gender.as_str(),
            "type": row.loyalty.as_str(),
            "age": row.age,
        },
        "travelType": row.travel_type.as_str(),
        "travelDistance": row.distance,
        "review": review,
    })
}

/// Flattened record batch with dotted column names.
fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let text = |f: fn(&Row) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: &dyn Fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new(GENDER_FIELD, DataType::Utf8, false),
        Field::new(LOYALTY_FIELD, DataType::Utf8, false),
        Field::new(AGE_FIELD, DataType::Int64, false),
        Field::new(TRAVEL_TYPE_FIELD, DataType::Utf8, false),
        Field::new(TRAVEL_DISTANCE_FIELD, DataType::Int64, false),
        Field::new(DEPARTURE_DELAY_FIELD, DataType::Int64, false),
        Field::new(ARRIVAL_DELAY_FIELD, DataType::Float64, true),
        Field::new(SATISFACTION_FIELD, DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        text(|r| r.gender.as_str()),
        text(|r| r.loyalty.as_str()),
        int(&|r| r.age),
        text(|r| r.travel_type.as_str()),
        int(&|r| r.distance),
        int(&|r| r.departure_delay),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.arrival_delay).collect::<Vec<_>>(),
        )),
        text(|r| r.satisfaction.as_str()),
    ];
    for (i, column) in SCORE_COLUMNS.iter().enumerate() {
        fields.push(Field::new(column.field, DataType::Int64, false));
        columns.push(int(&|r| r.scores[i]));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context("building record batch")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = Rng(args.seed);
    let rows: Vec<Row> = (0..args.rows).map(|i| generate_row(i, &mut rng)).collect();

    let json_path = args.output.with_extension("json");
    let records: Vec<Value> = rows.iter().enumerate().map(|(i, r)| to_json(i, r)).collect();
    let text = serde_json::to_string_pretty(&records).context("serializing records")?;
    std::fs::write(&json_path, text)
        .with_context(|| format!("writing {}", json_path.display()))?;

    let parquet_path = args.output.with_extension("parquet");
    let batch = to_batch(&rows)?;
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    let satisfied = rows.iter().filter(|r| r.satisfaction.is_satisfied()).count();
    log::info!("{satisfied} of {} generated passengers are satisfied", rows.len());
    println!(
        "Wrote {} passengers to {} and {}",
        rows.len(),
        json_path.display(),
        parquet_path.display()
    );
    Ok(())
}
