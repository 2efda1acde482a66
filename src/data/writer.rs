use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value as JsonValue};

use super::model::{NoteDataset, NoteRecord};
use crate::mentions;

/// Core output columns, in order. Pass-through columns follow.
pub const OUTPUT_COLUMNS: [&str; 6] = [
    "ID",
    "NOTE_CLEAN",
    "MENTIONS",
    "METHOD",
    "LOWER EF",
    "UPPER EF",
];

/// Save an enriched dataset.  Dispatch by extension (`.csv` or `.json`).
pub fn write_file(path: &Path, dataset: &NoteDataset) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, dataset),
        "json" => write_json(path, dataset),
        other => Err(anyhow!("Unsupported output extension: .{other}")),
    }
    .with_context(|| format!("writing {}", path.display()))?;

    log::info!("wrote {} records to {}", dataset.len(), path.display());
    Ok(())
}

/// Output cells of one record in [`OUTPUT_COLUMNS`] order, as text.
fn core_cells(rec: &NoteRecord) -> [String; 6] {
    let method = rec.method.map(|m| m.to_string()).unwrap_or_default();
    let (lower, upper) = rec
        .measurement
        .map(|m| (format!("{:.1}", m.lower), format!("{:.1}", m.upper)))
        .unwrap_or_default();
    [
        rec.id.to_string(),
        rec.clean_text.clone(),
        mentions::flatten(&rec.mentions),
        method,
        lower,
        upper,
    ]
}

fn write_csv(path: &Path, dataset: &NoteDataset) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;

    let header = OUTPUT_COLUMNS
        .iter()
        .copied()
        .chain(dataset.extra_columns.iter().map(String::as_str));
    writer.write_record(header).context("writing CSV header")?;

    for rec in &dataset.records {
        let extras = dataset
            .extra_columns
            .iter()
            .map(|c| rec.extra.get(c).map(|v| v.to_string()).unwrap_or_default());
        let row: Vec<String> = core_cells(rec).into_iter().chain(extras).collect();
        writer
            .write_record(&row)
            .with_context(|| format!("writing record {}", rec.id))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Records-oriented JSON: numbers stay numbers, mentions stay a list.
fn write_json(path: &Path, dataset: &NoteDataset) -> Result<()> {
    let rows: Vec<JsonValue> = dataset
        .records
        .iter()
        .map(|rec| {
            let mut obj = Map::new();
            obj.insert("ID".into(), rec.id.to_json());
            obj.insert("NOTE_CLEAN".into(), rec.clean_text.clone().into());
            obj.insert("MENTIONS".into(), rec.mentions.clone().into());
            obj.insert(
                "METHOD".into(),
                rec.method.map_or(JsonValue::Null, |m| m.to_string().into()),
            );
            let range = rec.measurement.unwrap_or_default();
            obj.insert("LOWER EF".into(), range.lower.into());
            obj.insert("UPPER EF".into(), range.upper.into());
            for col in &dataset.extra_columns {
                let value = rec.extra.get(col).map_or(JsonValue::Null, |v| v.to_json());
                obj.insert(col.clone(), value);
            }
            JsonValue::Object(obj)
        })
        .collect();

    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &rows)
        .context("serialising JSON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MethodLabel;
    use crate::data::model::CellValue;
    use crate::measure::MeasurementRange;

    #[test]
    fn core_cells_flatten_mentions() {
        let mut rec = NoteRecord::new(CellValue::Integer(3), "raw");
        rec.clean_text = "ef 55 biplane".into();
        rec.mentions = vec!["ef 55".into(), "biplane".into()];
        rec.method = Some(MethodLabel::SimpsonBiplane);
        rec.measurement = Some(MeasurementRange::new(55.0, 55.0));

        assert_eq!(
            core_cells(&rec),
            [
                "3".to_string(),
                "ef 55 biplane".into(),
                "ef 55, biplane".into(),
                "2d simpson biplane".into(),
                "55.0".into(),
                "55.0".into(),
            ]
        );
    }

    #[test]
    fn unsupported_output_extension() {
        let err = write_file(Path::new("out.xlsx"), &NoteDataset::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported output extension"));
    }
}
