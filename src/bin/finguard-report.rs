//! Predict financial health for uploaded CSVs and export the reports.
//!
//! Uploads come from `--upload` flags, or one path per line on stdin. On
//! stdin, `:reload` re-reads the model artifact. A failing upload is
//! reported and the session moves on to the next one.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use finguard::cli::{self, next_value};
use finguard::config::{FinguardConfig, ReportSettings};
use finguard::error::PipelineError;
use finguard::predict::{BatchReport, ReportSession};
use finguard::report;

fn main() {
    match run() {
        Ok(0) => {}
        Ok(failed) => {
            eprintln!("{failed} upload(s) failed");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

/// Returns the number of uploads that failed.
fn run() -> Result<usize, String> {
    let (config_path, args) = cli::split_config_flag(std::env::args().skip(1).collect())?;
    let mut config = cli::load_config(config_path.as_deref())?;
    let uploads = apply_args(&mut config, &args)?;
    config.validate().map_err(|err| err.to_string())?;
    cli::init_logging("finguard-report");

    let mut session =
        ReportSession::open(&config.paths.model_artifact).map_err(|err| err.to_string())?;
    let mut failed = 0usize;
    if uploads.is_empty() {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line.map_err(|err| format!("Failed to read stdin: {err}"))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == ":reload" {
                match session.reload() {
                    Ok(()) => println!("model reloaded"),
                    Err(err) => eprintln!("reload failed: {err}"),
                }
                continue;
            }
            if !report_upload(&session, Path::new(line), &config) {
                failed += 1;
            }
        }
    } else {
        for upload in &uploads {
            if !report_upload(&session, upload, &config) {
                failed += 1;
            }
        }
    }
    Ok(failed)
}

/// Process one upload end to end; errors are printed, never propagated.
fn report_upload(session: &ReportSession, upload: &Path, config: &FinguardConfig) -> bool {
    let bytes = match std::fs::read(upload) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{}: failed to read: {err}", upload.display());
            return false;
        }
    };
    let batch = match session.process_upload(&bytes) {
        Ok(batch) => batch,
        Err(err) => {
            eprintln!("{}: {err}", upload.display());
            return false;
        }
    };

    println!("== {} ==", upload.display());
    for line in report::render_summary(&batch) {
        println!("{line}");
    }
    for entry in report::render_entries(&batch) {
        println!("  {entry}");
    }

    let out_dir = export_dir(&config.paths.report_dir, upload);
    match export(&batch, &out_dir, &config.report) {
        Ok(written) => {
            println!("exports: {}", written.join(", "));
            true
        }
        Err(err) => {
            eprintln!("{}: {err}", upload.display());
            false
        }
    }
}

fn export(batch: &BatchReport, dir: &Path, settings: &ReportSettings) -> Result<Vec<String>, PipelineError> {
    let exports = report::build_exports(batch, settings)?;
    let paths = report::write_exports(&exports, dir, settings)?;
    Ok([paths.csv, paths.pdf, paths.chart]
        .iter()
        .map(|path| path.display().to_string())
        .collect())
}

/// Exports for `data/acme.csv` land in `<report_dir>/acme/`.
fn export_dir(report_dir: &Path, upload: &Path) -> PathBuf {
    let stem = upload
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    report_dir.join(stem)
}

fn apply_args(config: &mut FinguardConfig, args: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut uploads = Vec::new();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model" => {
                config.paths.model_artifact = PathBuf::from(next_value(args, &mut idx, "--model")?);
            }
            "--upload" => uploads.push(PathBuf::from(next_value(args, &mut idx, "--upload")?)),
            "--out-dir" => {
                config.paths.report_dir = PathBuf::from(next_value(args, &mut idx, "--out-dir")?);
            }
            "--title" => config.report.title = next_value(args, &mut idx, "--title")?.to_string(),
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(uploads)
}

fn help_text() -> String {
    [
        "finguard-report",
        "",
        "Predict financial health for uploaded CSVs and export CSV/PDF/SVG reports.",
        "",
        "Usage:",
        "  finguard-report [--config <file>] [--model <model.json>] [--out-dir <dir>]",
        "                  [--title <text>] [--upload <csv>]...",
        "",
        "Without --upload, reads one CSV path per line from stdin;",
        "a line containing `:reload` re-reads the model artifact.",
    ]
    .join("\n")
}
