//! Feature Table loading: company-year records with engineered features.

use std::io::Read;
use std::path::Path;

use crate::error::{DataFormatError, PipelineError};

use super::schema::{FeatureSchema, TableColumns};
use super::{csv_reader, parse_feature};

/// One company-year row of the Feature Table.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    pub company: String,
    pub category: String,
    pub year: i32,
    /// `0` healthy, `1` distressed.
    pub status: u8,
    /// Feature values in schema order.
    pub features: Vec<f32>,
}

/// Labeled historical dataset used for training and explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub schema: FeatureSchema,
    pub records: Vec<FinancialRecord>,
}

impl FeatureTable {
    /// Load a Feature Table CSV from disk.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let file = std::fs::File::open(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            features = table.schema.len(),
            "Loaded feature table"
        );
        Ok(table)
    }

    /// Parse a Feature Table from CSV text with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut reader = csv_reader(reader);
        let headers = reader.headers().map_err(DataFormatError::from)?.clone();
        if headers.is_empty() {
            return Err(DataFormatError::Empty.into());
        }
        let header_names: Vec<&str> = headers.iter().collect();
        let (schema, columns) = FeatureSchema::from_table_header(&header_names)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(DataFormatError::from)?;
            let line = row.position().map(|pos| pos.line()).unwrap_or(0);
            records.push(parse_record(&row, line, &columns, &header_names)?);
        }
        Ok(Self { schema, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row-major feature matrix in schema order.
    pub fn feature_matrix(&self) -> Vec<Vec<f32>> {
        self.records.iter().map(|r| r.features.clone()).collect()
    }

    /// Target labels aligned with [`Self::feature_matrix`].
    pub fn labels(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.status).collect()
    }

    /// `[healthy, distressed]` row counts.
    pub fn class_counts(&self) -> [usize; 2] {
        let distressed = self.records.iter().filter(|r| r.status == 1).count();
        [self.records.len() - distressed, distressed]
    }
}

fn parse_record(
    row: &csv::StringRecord,
    line: u64,
    columns: &TableColumns,
    headers: &[&str],
) -> Result<FinancialRecord, DataFormatError> {
    let field = |pos: usize| row.get(pos).unwrap_or("");
    let features = columns
        .features
        .iter()
        .map(|&pos| parse_feature(field(pos), line, headers[pos]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FinancialRecord {
        company: field(columns.company).to_string(),
        category: field(columns.category).to_string(),
        year: parse_year(field(columns.year), line)?,
        status: parse_status(field(columns.target), line)?,
        features,
    })
}

fn parse_year(raw: &str, line: u64) -> Result<i32, DataFormatError> {
    let invalid = || DataFormatError::InvalidYear {
        line,
        value: raw.to_string(),
    };
    if let Ok(year) = raw.parse::<i32>() {
        return Ok(year);
    }
    // Exports from spreadsheet tools sometimes write integral years as `2019.0`.
    let value = raw.parse::<f64>().map_err(|_| invalid())?;
    if value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Ok(value as i32)
    } else {
        Err(invalid())
    }
}

fn parse_status(raw: &str, line: u64) -> Result<u8, DataFormatError> {
    match raw.parse::<f64>() {
        Ok(value) if value == 0.0 => Ok(0),
        Ok(value) if value == 1.0 => Ok(1),
        _ => Err(DataFormatError::InvalidLabel {
            line,
            value: raw.to_string(),
        }),
    }
}
