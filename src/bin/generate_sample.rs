//! Write synthetic echocardiogram notes for trying the pipeline:
//! `sample_notes.parquet` and `sample_notes.csv`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.range(0, items.len() as u64 - 1) as usize]
    }
}

const LEADS: &[&str] = &[
    "EJECTION FRACTION:",
    "LVEF",
    "Left ventricular ejection fraction is",
    "EF estimated at",
    "â€¢ EF",
];

const METHODS: &[&str] = &[
    "by 2D Simpson's biplane.",
    "2D Simpsons biplane method.",
    "Biplane EF.",
    "3D imaging performed.",
    "Visual estimate.",
    "",
];

const FILLER: &[&str] = &[
    "Normal sinus rhythm.",
    "No pericardial effusion.",
    "Mild mitral regurgitation.",
    "Patient tolerated the study well.",
];

fn note(rng: &mut SimpleRng) -> String {
    if rng.range(0, 9) == 0 {
        return rng.pick(FILLER).to_string();
    }
    let low = rng.range(25, 65);
    let value = match rng.range(0, 2) {
        0 => format!("{low}%"),
        1 => format!("{low}-{}%", low + 5),
        // Decimal point dropped the way some dictation systems write it.
        _ => format!("{low}{}", rng.range(0, 9)),
    };
    format!(
        "{} {value}. {} {}",
        rng.pick(LEADS),
        rng.pick(METHODS),
        rng.pick(FILLER)
    )
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let n: i64 = 200;

    let ids: Vec<i64> = (0..n).collect();
    let notes: Vec<String> = ids.iter().map(|_| note(&mut rng)).collect();

    // Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("ID", DataType::Int64, false),
        Field::new("NOTE_TEXT", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ids.clone())),
            Arc::new(StringArray::from(
                notes.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "sample_notes.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    // CSV, with the blank index header pandas writes
    let csv_path = "sample_notes.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).context("creating CSV")?;
    csv_writer.write_record(["", "NOTE_TEXT"])?;
    for (id, text) in ids.iter().zip(&notes) {
        csv_writer.write_record([id.to_string().as_str(), text.as_str()])?;
    }
    csv_writer.flush()?;

    println!("Wrote {n} notes to {parquet_path} and {csv_path}");
    Ok(())
}
