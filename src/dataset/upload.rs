//! Parsing of user-uploaded CSV batches for inference.

use crate::error::{DataFormatError, UploadError};

use super::schema::FeatureSchema;
use super::{csv_reader, parse_feature};

/// Validated upload rows, reordered into schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadBatch {
    /// Company names when the upload carries a `Company` column.
    pub companies: Option<Vec<String>>,
    pub rows: Vec<Vec<f32>>,
}

impl UploadBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display label for row `index`, falling back to `Company N` (1-based).
    pub fn company_label(&self, index: usize) -> String {
        self.companies
            .as_ref()
            .and_then(|names| names.get(index))
            .cloned()
            .unwrap_or_else(|| format!("Company {}", index + 1))
    }
}

/// Parse an uploaded CSV against `schema`.
///
/// The header must name every schema feature; `Company`, `Category`, `Year`
/// and `Financial_Status` are optional and only `Company` is used. A header
/// without data rows is a valid, empty batch.
pub fn parse_upload(bytes: &[u8], schema: &FeatureSchema) -> Result<UploadBatch, UploadError> {
    let mut reader = csv_reader(bytes);
    let headers = reader.headers().map_err(DataFormatError::from)?.clone();
    if headers.is_empty() {
        return Err(DataFormatError::Empty.into());
    }
    let header_names: Vec<&str> = headers.iter().collect();
    let columns = schema.resolve(&header_names)?;

    let mut companies = columns.company.map(|_| Vec::new());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(DataFormatError::from)?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let row = columns
            .features
            .iter()
            .map(|&pos| parse_feature(record.get(pos).unwrap_or(""), line, header_names[pos]))
            .collect::<Result<Vec<_>, _>>()?;
        if let (Some(names), Some(pos)) = (companies.as_mut(), columns.company) {
            names.push(record.get(pos).unwrap_or("").to_string());
        }
        rows.push(row);
    }
    Ok(UploadBatch { companies, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec!["Current_Ratio".into(), "Debt_Ratio".into()]).unwrap()
    }

    #[test]
    fn reorders_columns_by_name() {
        let text = "Debt_Ratio,Current_Ratio\n0.4,1.5\n0.9,0.7\n";
        let batch = parse_upload(text.as_bytes(), &schema()).unwrap();
        assert_eq!(batch.rows, vec![vec![1.5, 0.4], vec![0.7, 0.9]]);
        assert_eq!(batch.companies, None);
        assert_eq!(batch.company_label(1), "Company 2");
    }

    #[test]
    fn keeps_company_names_and_ignores_identifier_columns() {
        let text = "Company,Year,Current_Ratio,Debt_Ratio,Financial_Status\nAcme,2020,1.5,0.4,0\n";
        let batch = parse_upload(text.as_bytes(), &schema()).unwrap();
        assert_eq!(batch.company_label(0), "Acme");
        assert_eq!(batch.rows, vec![vec![1.5, 0.4]]);
    }

    #[test]
    fn header_only_upload_is_an_empty_batch() {
        let batch = parse_upload(b"Current_Ratio,Debt_Ratio\n", &schema()).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn rejects_empty_and_mismatched_uploads() {
        assert_eq!(
            parse_upload(b"", &schema()).unwrap_err(),
            UploadError::DataFormat(DataFormatError::Empty)
        );
        assert_eq!(
            parse_upload(b"Current_Ratio\n1.0\n", &schema()).unwrap_err(),
            UploadError::Schema(SchemaError::MissingColumns(vec!["Debt_Ratio".into()]))
        );
        assert!(matches!(
            parse_upload(b"Current_Ratio,Debt_Ratio\n1.0\n", &schema()).unwrap_err(),
            UploadError::DataFormat(DataFormatError::Csv { .. })
        ));
        assert!(matches!(
            parse_upload(b"Current_Ratio,Debt_Ratio\n1.0,abc\n", &schema()).unwrap_err(),
            UploadError::DataFormat(DataFormatError::InvalidNumber { line: 2, .. })
        ));
    }

    #[test]
    fn values_beyond_f32_range_are_invalid() {
        let err = parse_upload(b"Current_Ratio,Debt_Ratio\n1e39,0.4\n", &schema()).unwrap_err();
        assert_eq!(
            err,
            UploadError::DataFormat(DataFormatError::InvalidNumber {
                line: 2,
                column: "Current_Ratio".into(),
                value: "1e39".into(),
            })
        );
        let batch = parse_upload(b"Current_Ratio,Debt_Ratio\n3e38,-3e38\n", &schema()).unwrap();
        assert!(batch.rows[0].iter().all(|v| v.is_finite()));
    }
}
