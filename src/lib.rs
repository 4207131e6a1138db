//! Library exports for the FinGuard jobs, benchmarks and tests.
/// Application directory resolution.
pub mod app_dirs;
/// Shared command-line helpers for the job binaries.
pub mod cli;
/// TOML configuration.
pub mod config;
/// Feature Table, uploads and partitioning.
pub mod dataset;
/// Pipeline error taxonomy.
pub mod error;
/// Feature attributions and summary plots.
pub mod explain;
/// Filesystem helpers.
pub mod fs_ops;
/// Tracing setup.
pub mod logging;
/// Boosted trees, metrics and the model artifact.
pub mod ml;
/// Batch inference and the report session.
pub mod predict;
/// Report rendering and exports.
pub mod report;
/// Training job.
pub mod trainer;
