//! Tabular inputs: the Feature Table, inference uploads and partitioning.

use std::io::Read;

use crate::error::DataFormatError;

pub mod sample;
pub mod schema;
pub mod split;
pub mod table;
pub mod upload;

pub use schema::{FeatureSchema, NON_FEATURE_COLUMNS};
pub use split::{SplitIndices, train_test_split};
pub use table::{FeatureTable, FinancialRecord};
pub use upload::{UploadBatch, parse_upload};

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn parse_feature(raw: &str, line: u64, column: &str) -> Result<f32, DataFormatError> {
    // checked after narrowing: values beyond f32 range become inf
    match raw.parse::<f64>().map(|value| value as f32) {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DataFormatError::InvalidNumber {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}
