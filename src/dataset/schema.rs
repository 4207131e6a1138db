//! Named feature-schema contract shared by training and inference.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

pub const COMPANY_COLUMN: &str = "Company";
pub const CATEGORY_COLUMN: &str = "Category";
pub const YEAR_COLUMN: &str = "Year";
pub const TARGET_COLUMN: &str = "Financial_Status";

/// Columns that are never model features.
pub const NON_FEATURE_COLUMNS: [&str; 4] =
    [TARGET_COLUMN, COMPANY_COLUMN, CATEGORY_COLUMN, YEAR_COLUMN];

/// Ordered feature column names a model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

/// Column positions of a Feature Table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumns {
    pub company: usize,
    pub category: usize,
    pub year: usize,
    pub target: usize,
    /// Feature positions in schema order.
    pub features: Vec<usize>,
}

/// Column positions of an upload header, resolved against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadColumns {
    pub company: Option<usize>,
    /// Feature positions in schema order.
    pub features: Vec<usize>,
}

impl FeatureSchema {
    /// Build a schema from feature names, rejecting empty, duplicate or
    /// reserved names.
    pub fn new(names: Vec<String>) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::EmptyFeatureSet);
        }
        let mut seen = BTreeSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }
        let reserved: Vec<String> = names
            .iter()
            .filter(|name| NON_FEATURE_COLUMNS.contains(&name.as_str()))
            .cloned()
            .collect();
        if !reserved.is_empty() {
            return Err(SchemaError::UnexpectedColumns(reserved));
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Derive the schema from a Feature Table header: every column except the
    /// identifier and target columns is a feature, in header order.
    pub fn from_table_header<S: AsRef<str>>(
        headers: &[S],
    ) -> Result<(Self, TableColumns), SchemaError> {
        let index = header_index(headers)?;
        let missing: Vec<String> = NON_FEATURE_COLUMNS
            .iter()
            .filter(|column| !index.contains_key(**column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }
        let mut names = Vec::new();
        let mut features = Vec::new();
        for (pos, header) in headers.iter().enumerate() {
            let header = header.as_ref();
            if !NON_FEATURE_COLUMNS.contains(&header) {
                names.push(header.to_string());
                features.push(pos);
            }
        }
        let schema = Self::new(names)?;
        let columns = TableColumns {
            company: index[COMPANY_COLUMN],
            category: index[CATEGORY_COLUMN],
            year: index[YEAR_COLUMN],
            target: index[TARGET_COLUMN],
            features,
        };
        Ok((schema, columns))
    }

    /// Map an arbitrary header onto this schema by name.
    ///
    /// Identifier and target columns are optional and ignored except
    /// `Company`. Every schema feature must be present and no other column
    /// may appear.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<UploadColumns, SchemaError> {
        let index = header_index(headers)?;
        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|name| !index.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }
        let known: BTreeSet<&str> = self.names.iter().map(String::as_str).collect();
        let unexpected: Vec<String> = headers
            .iter()
            .map(|header| header.as_ref())
            .filter(|header| !known.contains(header) && !NON_FEATURE_COLUMNS.contains(header))
            .map(str::to_string)
            .collect();
        if !unexpected.is_empty() {
            return Err(SchemaError::UnexpectedColumns(unexpected));
        }
        Ok(UploadColumns {
            company: index.get(COMPANY_COLUMN).copied(),
            features: self.names.iter().map(|name| index[name.as_str()]).collect(),
        })
    }

    /// Position of each of `other`'s features inside this schema, or the
    /// schema error describing the difference.
    pub fn permutation_from(&self, other: &FeatureSchema) -> Result<Vec<usize>, SchemaError> {
        self.resolve(other.names()).map(|columns| columns.features)
    }
}

fn header_index<S: AsRef<str>>(headers: &[S]) -> Result<HashMap<&str, usize>, SchemaError> {
    let mut index = HashMap::with_capacity(headers.len());
    for (pos, header) in headers.iter().enumerate() {
        let header = header.as_ref();
        if index.insert(header, pos).is_some() {
            return Err(SchemaError::DuplicateColumn(header.to_string()));
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> FeatureSchema {
        FeatureSchema::new(names.iter().map(|n| n.to_string()).collect()).unwrap()
    }

    #[test]
    fn table_header_splits_identifiers_from_features() {
        let headers = ["Company", "Year", "Current_Ratio", "Category", "ROA", "Financial_Status"];
        let (schema, columns) = FeatureSchema::from_table_header(&headers).unwrap();
        assert_eq!(schema.names(), &["Current_Ratio".to_string(), "ROA".to_string()]);
        assert_eq!(columns.features, vec![2, 4]);
        assert_eq!(columns.company, 0);
        assert_eq!(columns.year, 1);
        assert_eq!(columns.category, 3);
        assert_eq!(columns.target, 5);
    }

    #[test]
    fn table_header_requires_identifier_and_target_columns() {
        let err = FeatureSchema::from_table_header(&["Company", "ROA"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns(vec![
                "Financial_Status".into(),
                "Category".into(),
                "Year".into()
            ])
        );
    }

    #[test]
    fn table_header_without_features_is_rejected() {
        let err = FeatureSchema::from_table_header(&["Company", "Category", "Year", "Financial_Status"])
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyFeatureSet);
    }

    #[test]
    fn resolve_reorders_by_name_and_picks_up_company() {
        let schema = schema(&["Current_Ratio", "ROA", "Debt_Ratio"]);
        let columns = schema
            .resolve(&["Debt_Ratio", "Company", "ROA", "Current_Ratio", "Year"])
            .unwrap();
        assert_eq!(columns.features, vec![3, 2, 0]);
        assert_eq!(columns.company, Some(1));
    }

    #[test]
    fn resolve_reports_missing_and_unexpected_columns() {
        let schema = schema(&["Current_Ratio", "ROA"]);
        assert_eq!(
            schema.resolve(&["ROA"]).unwrap_err(),
            SchemaError::MissingColumns(vec!["Current_Ratio".into()])
        );
        assert_eq!(
            schema.resolve(&["ROA", "Current_Ratio", "EBITDA"]).unwrap_err(),
            SchemaError::UnexpectedColumns(vec!["EBITDA".into()])
        );
        assert_eq!(
            schema.resolve(&["ROA", "ROA", "Current_Ratio"]).unwrap_err(),
            SchemaError::DuplicateColumn("ROA".into())
        );
    }
}
