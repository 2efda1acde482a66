use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, NoteDataset, NoteRecord};
use super::writer::OUTPUT_COLUMNS;
use crate::config::ColumnConfig;
use crate::mentions;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a notes table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one note per row
/// * `.json`    – `[{ "ID": 1, "NOTE_TEXT": "...", ...meta }, ...]`
/// * `.parquet` – any flat schema with string / integer / float / bool columns
pub fn load_file(path: &Path, columns: &ColumnConfig) -> Result<NoteDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::info!(
        "read {} rows, {} columns from {}",
        table.rows.len(),
        table.columns.len(),
        path.display()
    );

    build_dataset(table, columns).with_context(|| format!("loading {}", path.display()))
}

// ---------------------------------------------------------------------------
// Raw table → NoteDataset
// ---------------------------------------------------------------------------

/// Column-ordered cells as read from disk, before any column is interpreted.
#[derive(Debug, Default)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    /// Cells are untyped text (CSV) and pass-through values need type guessing.
    untyped: bool,
}

/// Headers pandas gives a written-out index column.
fn is_index_column(name: &str) -> bool {
    name.is_empty() || name.starts_with("Unnamed") || name == "__index_level_0__"
}

fn build_dataset(table: RawTable, columns: &ColumnConfig) -> Result<NoteDataset> {
    let position = |name: &str| table.columns.iter().position(|c| c == name);

    let id_idx = match position(columns.id.as_str()) {
        Some(i) => i,
        None => {
            let i = table
                .columns
                .iter()
                .position(|c| is_index_column(c))
                .with_context(|| format!("missing identifier column '{}'", columns.id))?;
            log::info!(
                "no '{}' column, using index column '{}' as identifier",
                columns.id,
                table.columns[i]
            );
            i
        }
    };
    let text_idx = position(columns.text.as_str())
        .with_context(|| format!("missing text column '{}'", columns.text))?;
    let mentions_idx = match &columns.mentions {
        Some(name) => Some(
            position(name.as_str())
                .with_context(|| format!("missing mentions column '{name}'"))?,
        ),
        None => None,
    };

    // Pass-through columns; all-null ones and the writer's own output
    // columns are dropped.
    let mut extra_idx = Vec::new();
    for (i, name) in table.columns.iter().enumerate() {
        if i == id_idx || i == text_idx || Some(i) == mentions_idx {
            continue;
        }
        if OUTPUT_COLUMNS.contains(&name.as_str()) {
            log::info!("replacing stored column '{name}'");
            continue;
        }
        if table.rows.iter().all(|row| row[i].is_null()) {
            log::info!("dropping all-null column '{name}'");
            continue;
        }
        extra_idx.push(i);
    }

    let retype = |cell: &CellValue| match cell {
        CellValue::String(s) if table.untyped => CellValue::guess(s),
        other => other.clone(),
    };

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_no, row) in table.rows.iter().enumerate() {
        let id = retype(&row[id_idx]);
        if id.is_null() {
            bail!("row {row_no}: null identifier");
        }

        let text_cell = &row[text_idx];
        if text_cell.is_null() {
            log::warn!("row {row_no} (id {id}): empty note text");
        }
        let mut record = NoteRecord::new(id, text_cell.as_text());

        if let Some(mi) = mentions_idx {
            record.mentions = match &row[mi] {
                CellValue::List(items) => items.clone(),
                other => mentions::parse_serialized(&other.as_text()),
            };
        }
        for &i in &extra_idx {
            record.extra.insert(table.columns[i].clone(), retype(&row[i]));
        }
        records.push(record);
    }

    Ok(NoteDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every other row one note.
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = (0..columns.len())
            .map(|i| match record.get(i) {
                Some("") | None => CellValue::Null,
                Some(s) => CellValue::String(s.to_string()),
            })
            .collect::<Vec<_>>();
        rows.push(row);
    }

    Ok(RawTable {
        columns,
        rows,
        untyped: true,
    })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`).
/// Keys missing from a row read as null.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|c| obj.get(c).map_or(CellValue::Null, CellValue::from))
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(RawTable {
        columns,
        rows,
        untyped: false,
    })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table, as written by **Pandas** (`df.to_parquet()`)
/// or **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable {
        columns,
        rows,
        untyped: false,
    })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Null => CellValue::Null,
        other => bail!("unsupported parquet column type {other:?}"),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            untyped: true,
        }
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn builds_records_and_drops_all_null_column() {
        let t = table(
            &["ID", "NOTE_TEXT", "Unnamed: 2", "SITE"],
            vec![
                vec![s("1"), s("EF 55%"), CellValue::Null, s("north")],
                vec![s("2"), s("no echo"), CellValue::Null, CellValue::Null],
            ],
        );
        let ds = build_dataset(t, &ColumnConfig::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.extra_columns, vec!["SITE"]);
        assert_eq!(ds.records[0].id, CellValue::Integer(1));
        assert_eq!(ds.records[0].raw_text, "EF 55%");
        assert_eq!(ds.records[1].extra["SITE"], CellValue::Null);
    }

    #[test]
    fn falls_back_to_pandas_index_column() {
        let t = table(
            &["Unnamed: 0", "NOTE_TEXT"],
            vec![vec![s("0"), s("a")], vec![s("1"), s("b")]],
        );
        let ds = build_dataset(t, &ColumnConfig::default()).unwrap();
        assert_eq!(ds.records[1].id, CellValue::Integer(1));
        assert!(ds.extra_columns.is_empty());
    }

    #[test]
    fn missing_columns_are_fatal() {
        let t = table(&["ID", "TEXT"], vec![]);
        let err = build_dataset(t, &ColumnConfig::default()).unwrap_err();
        assert!(err.to_string().contains("NOTE_TEXT"));

        let t = table(&["KEY", "NOTE_TEXT"], vec![]);
        let err = build_dataset(t, &ColumnConfig::default()).unwrap_err();
        assert!(err.to_string().contains("identifier"));
    }

    #[test]
    fn null_identifier_is_fatal() {
        let t = table(&["ID", "NOTE_TEXT"], vec![vec![CellValue::Null, s("x")]]);
        assert!(build_dataset(t, &ColumnConfig::default()).is_err());
    }

    #[test]
    fn reads_saved_mentions_column() {
        let t = table(
            &["ID", "NOTE_CLEAN", "MENTIONS", "METHOD"],
            vec![vec![s("4"), s("ef 55"), s("['ef 55', 'biplane']"), s("None")]],
        );
        let ds = build_dataset(t, &ColumnConfig::saved_dataset()).unwrap();
        assert_eq!(ds.records[0].mentions, vec!["ef 55", "biplane"]);
    }

    #[test]
    fn stored_output_columns_are_not_passed_through() {
        let t = table(
            &["ID", "NOTE_CLEAN", "MENTIONS", "METHOD", "LOWER EF", "UPPER EF", "SITE"],
            vec![vec![
                s("4"),
                s("ef 55"),
                s("ef 55"),
                s("3d imaging"),
                s("10.0"),
                s("10.0"),
                s("north"),
            ]],
        );
        let ds = build_dataset(t, &ColumnConfig::saved_dataset()).unwrap();
        assert_eq!(ds.extra_columns, vec!["SITE"]);
        assert!(!ds.records[0].extra.contains_key("METHOD"));
    }

    #[test]
    fn list_mentions_are_read_as_is() {
        let t = RawTable {
            columns: vec!["ID".into(), "NOTE_CLEAN".into(), "MENTIONS".into()],
            rows: vec![vec![
                CellValue::Integer(1),
                s("ef 55 biplane"),
                CellValue::List(vec!["ef 55".into(), "biplane".into()]),
            ]],
            untyped: false,
        };
        let ds = build_dataset(t, &ColumnConfig::saved_dataset()).unwrap();
        assert_eq!(ds.records[0].mentions, vec!["ef 55", "biplane"]);
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("notes.xlsx"), &ColumnConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file extension: .xlsx");
    }
}
