use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const HOURS: usize = 24 * 14;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Hourly PM2.5 with a morning and evening traffic peak.
fn pm25_at(hour: usize, rng: &mut SimpleRng) -> f64 {
    let h = (hour % 24) as f64;
    let peak = |mu: f64, amp: f64| amp * (-(h - mu).powi(2) / 8.0).exp();
    let day_drift = 6.0 * ((hour / 24) as f64 * 0.9).sin();
    (25.0 + peak(8.0, 30.0) + peak(19.0, 22.0) + day_drift + rng.gauss(0.0, 4.0)).max(0.0)
}

fn timestamp(hour: usize) -> String {
    format!("2024-03-{:02} {:02}:00", 1 + hour / 24, hour % 24)
}

fn write_single(path: &str, header: &str, dates: &[String], values: &[f64]) -> Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    w.write_record(["date", header])?;
    for (d, v) in dates.iter().zip(values) {
        let value = format!("{v:.2}");
        w.write_record([d.as_str(), value.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let dates: Vec<String> = (0..HOURS).map(timestamp).collect();
    let actual: Vec<f64> = (0..HOURS).map(|h| pm25_at(h, &mut rng)).collect();
    // Forecast lags slightly high with its own noise.
    let predicted: Vec<f64> = actual
        .iter()
        .map(|&a| (a * 1.05 + 1.5 + rng.gauss(0.0, 5.0)).max(0.0))
        .collect();

    write_single("predicted.csv", "PM2.5", &dates, &predicted)?;
    write_single("actual.csv", "PM2.5", &dates, &actual)?;

    // Combined file with a few sensor gaps.
    let mut w = csv::Writer::from_path("forecast.csv").context("creating forecast.csv")?;
    w.write_record(["date", "PM2.5 PREDICTED", "PM2.5 TARGET"])?;
    for (i, d) in dates.iter().enumerate() {
        let target = if i % 37 == 5 {
            "NA".to_string()
        } else {
            format!("{:.2}", actual[i])
        };
        let pred = format!("{:.2}", predicted[i]);
        w.write_record([d.as_str(), pred.as_str(), target.as_str()])?;
    }
    w.flush()?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Utf8, false),
        Field::new("pm25_predicted", DataType::Float64, false),
        Field::new("pm25_target", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(dates)),
            Arc::new(Float64Array::from(predicted)),
            Arc::new(Float64Array::from(actual)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create("forecast.parquet").context("creating forecast.parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {HOURS} hourly PM2.5 readings to predicted.csv, actual.csv, forecast.csv and forecast.parquet"
    );
    Ok(())
}
