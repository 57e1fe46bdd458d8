use std::collections::HashSet;
use std::fmt;

use crate::error::AnalysisError;

/// Columns every catalog must provide, in output order.
pub const REQUIRED_COLUMNS: [&str; 6] = ["objID", "ra", "dec", "u", "dered_u", "z"];

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// RawTable – the loaded file before validation
// ---------------------------------------------------------------------------

/// Column names plus rows of untyped cells, as read from the source file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub column_names: Vec<String>,
    /// Every row has one cell per column name.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    /// Column names that occur more than once, each reported once.
    pub fn duplicate_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dups: Vec<String> = Vec::new();
        for name in &self.column_names {
            if !seen.insert(name.as_str()) && !dups.contains(name) {
                dups.push(name.clone());
            }
        }
        dups
    }

    /// Required columns absent from this table, in required order.
    pub fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|col| self.column_index(col).is_none())
            .map(|col| col.to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CatalogRecord / Catalog – the validated, typed view
// ---------------------------------------------------------------------------

/// One survey object. Nulls in the source become `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub obj_id: Option<String>,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub u: Option<f64>,
    pub dered_u: Option<f64>,
    pub z: Option<f64>,
}

/// A validated catalog, rows in source order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub records: Vec<CatalogRecord>,
}

impl Catalog {
    /// Validate a raw table and convert it to typed records.
    ///
    /// Checks run in order: the table has rows, every required column is
    /// present, and each numeric cell is either null or a number.
    pub fn from_table(table: &RawTable) -> Result<Self, AnalysisError> {
        if table.is_empty() {
            return Err(AnalysisError::EmptyAfterParse);
        }

        let missing = table.missing_columns();
        if !missing.is_empty() {
            return Err(AnalysisError::MissingRequiredColumns { missing });
        }

        for dup in table.duplicate_columns() {
            log::warn!("column '{dup}' appears more than once; using its first occurrence");
        }

        let index = |name: &str| table.column_index(name).unwrap_or_default();
        let [id_idx, ra_idx, dec_idx, u_idx, dered_idx, z_idx] = REQUIRED_COLUMNS.map(index);

        let mut records = Vec::with_capacity(table.len());
        for (row_no, row) in table.rows.iter().enumerate() {
            let numeric = |idx: usize| numeric_cell(row, idx, row_no, &table.column_names[idx]);

            records.push(CatalogRecord {
                obj_id: row.get(id_idx).filter(|c| !c.is_null()).map(|c| c.to_string()),
                ra: numeric(ra_idx)?,
                dec: numeric(dec_idx)?,
                u: numeric(u_idx)?,
                dered_u: numeric(dered_idx)?,
                z: numeric(z_idx)?,
            });
        }

        Ok(Catalog { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn numeric_cell(
    row: &[CellValue],
    idx: usize,
    row_no: usize,
    column: &str,
) -> Result<Option<f64>, AnalysisError> {
    match row.get(idx) {
        None | Some(CellValue::Null) => Ok(None),
        Some(cell) => cell
            .as_f64()
            .map(Some)
            .ok_or_else(|| AnalysisError::NonNumericValue {
                row: row_no,
                column: column.to_string(),
                value: cell.to_string(),
            }),
    }
}
