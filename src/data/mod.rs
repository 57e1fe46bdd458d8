/// Data layer: cell types, loading, and validation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │   Catalog     │  required columns checked, typed CatalogRecords
///   └──────────────┘
/// ```

pub mod loader;
pub mod model;
