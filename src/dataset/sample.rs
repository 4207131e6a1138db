//! Draw upload-shaped samples from the Feature Table for smoke tests.

use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::error::PipelineError;
use crate::fs_ops;

use super::table::{FeatureTable, FinancialRecord};

/// Pick up to `count` distinct records at random, in draw order.
pub fn sample_records(table: &FeatureTable, count: usize, seed: Option<u64>) -> Vec<&FinancialRecord> {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..table.len()).collect();
    order.shuffle(&mut rng);
    order.truncate(count);
    order.into_iter().map(|idx| &table.records[idx]).collect()
}

/// Serialize records as an upload CSV: feature columns only, no
/// identifier or target columns.
pub fn upload_csv(table: &FeatureTable, records: &[&FinancialRecord]) -> Result<Vec<u8>, PipelineError> {
    let render_err = |err: csv::Error| PipelineError::Render {
        what: "sample CSV",
        reason: err.to_string(),
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.schema.names()).map_err(render_err)?;
    for record in records {
        writer
            .write_record(record.features.iter().map(|value| value.to_string()))
            .map_err(render_err)?;
    }
    writer.into_inner().map_err(|err| PipelineError::Render {
        what: "sample CSV",
        reason: err.to_string(),
    })
}

/// Sample `count` rows and write them to `path` as an upload CSV.
pub fn write_sample_upload(
    table: &FeatureTable,
    count: usize,
    seed: Option<u64>,
    path: &Path,
) -> Result<usize, PipelineError> {
    let records = sample_records(table, count, seed);
    let bytes = upload_csv(table, &records)?;
    fs_ops::atomic_write(path, &bytes).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = records.len(), "Wrote sample upload");
    Ok(records.len())
}
