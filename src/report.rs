use std::sync::Arc;

use anyhow::{anyhow, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use serde::Serialize;

use crate::analysis::AnalyzedRecord;

/// Column headers of the augmented table, in output order.
pub const OUTPUT_COLUMNS: [&str; 8] = [
    "objID",
    "ra",
    "dec",
    "u",
    "dered_u",
    "z",
    "Distance (Mpc)",
    "Absolute u",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned, boxed text table
    #[default]
    Table,
    /// JSON array of row objects
    Json,
    /// Comma-separated values with a header row
    Csv,
}

/// One output row, keyed by the output column headers.
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    #[serde(rename = "objID")]
    obj_id: Option<&'a str>,
    ra: Option<f64>,
    dec: Option<f64>,
    u: Option<f64>,
    dered_u: Option<f64>,
    z: Option<f64>,
    #[serde(rename = "Distance (Mpc)")]
    distance_mpc: f64,
    #[serde(rename = "Absolute u")]
    absolute_u: f64,
}

impl<'a> From<&'a AnalyzedRecord> for OutputRow<'a> {
    fn from(row: &'a AnalyzedRecord) -> Self {
        let rec = &row.record;
        OutputRow {
            obj_id: rec.obj_id.as_deref(),
            ra: rec.ra,
            dec: rec.dec,
            u: rec.u,
            dered_u: rec.dered_u,
            z: rec.z,
            distance_mpc: row.distance_mpc,
            absolute_u: row.absolute_u,
        }
    }
}

/// Render analyzed rows in the requested format. The result ends with a newline.
pub fn render(rows: &[AnalyzedRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => render_table(rows),
        OutputFormat::Json => render_json(rows),
        OutputFormat::Csv => render_csv(rows),
    }
}

fn render_table(rows: &[AnalyzedRecord]) -> Result<String> {
    let schema = Arc::new(Schema::new(
        OUTPUT_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, name)| match i {
                0 => Field::new(*name, DataType::Utf8, true),
                1..=5 => Field::new(*name, DataType::Float64, true),
                _ => Field::new(*name, DataType::Float64, false),
            })
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(
            rows.iter()
                .map(|r| r.record.obj_id.as_deref())
                .collect::<StringArray>(),
        ),
        passthrough(rows, |r| r.record.ra),
        passthrough(rows, |r| r.record.dec),
        passthrough(rows, |r| r.record.u),
        passthrough(rows, |r| r.record.dered_u),
        passthrough(rows, |r| r.record.z),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.distance_mpc))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.absolute_u))),
    ];

    let batch = RecordBatch::try_new(schema, columns)?;
    Ok(format!("{}\n", pretty_format_batches(&[batch])?))
}

fn passthrough(rows: &[AnalyzedRecord], get: fn(&AnalyzedRecord) -> Option<f64>) -> ArrayRef {
    Arc::new(rows.iter().map(get).collect::<Float64Array>())
}

fn render_json(rows: &[AnalyzedRecord]) -> Result<String> {
    let out: Vec<OutputRow<'_>> = rows.iter().map(OutputRow::from).collect();
    Ok(format!("{}\n", serde_json::to_string_pretty(&out)?))
}

fn render_csv(rows: &[AnalyzedRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(OutputRow::from(row))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CatalogRecord;

    fn sample_rows() -> Vec<AnalyzedRecord> {
        vec![
            AnalyzedRecord {
                record: CatalogRecord {
                    obj_id: Some("1237645876861272165".into()),
                    ra: Some(10.0),
                    dec: Some(20.0),
                    u: Some(19.5),
                    dered_u: Some(19.3),
                    z: Some(0.05),
                },
                distance_mpc: 222.289,
                absolute_u: -17.2346,
            },
            AnalyzedRecord {
                record: CatalogRecord {
                    obj_id: Some("2".into()),
                    ra: None,
                    dec: Some(-5.5),
                    u: None,
                    dered_u: None,
                    z: Some(0.1),
                },
                distance_mpc: 460.0,
                absolute_u: f64::NAN,
            },
        ]
    }

    #[test]
    fn table_has_all_columns_and_rows_in_order() {
        let text = render(&sample_rows(), OutputFormat::Table).unwrap();
        let header = text.lines().nth(1).unwrap();
        let mut last = 0;
        for col in OUTPUT_COLUMNS {
            let pos = header.find(col).unwrap_or_else(|| panic!("missing {col}"));
            assert!(pos >= last);
            last = pos;
        }
        let first = text.find("1237645876861272165").unwrap();
        let second = text.find("| 2 ").unwrap();
        assert!(first < second);
        assert!(text.contains("222.289"));
    }

    #[test]
    fn json_uses_output_headers_as_keys() {
        let text = render(&sample_rows(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["objID"], "1237645876861272165");
        assert_eq!(rows[0]["Distance (Mpc)"], 222.289);
        assert!(rows[1]["ra"].is_null());
        assert!(rows[1]["Absolute u"].is_null());
    }

    #[test]
    fn csv_header_matches_output_columns() {
        let text = render(&sample_rows(), OutputFormat::Csv).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), OUTPUT_COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "1237645876861272165,10.0,20.0,19.5,19.3,0.05,222.289,-17.2346"
        );
        assert!(lines.next().unwrap().starts_with("2,,-5.5,,,0.1,460.0,"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let rows = sample_rows();
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Csv] {
            assert_eq!(render(&rows, format).unwrap(), render(&rows, format).unwrap());
        }
    }
}
