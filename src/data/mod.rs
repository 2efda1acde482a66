/// Data layer: note records, loading, filtering and saving.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → NoteDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  NoteDataset  │  Vec<NoteRecord>, pass-through columns
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  optional record predicates → kept records
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  NoteDataset → .csv / .json
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
