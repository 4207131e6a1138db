//! Write a few random Feature Table rows as an upload CSV.

use std::path::PathBuf;

use finguard::cli::{self, next_parsed, next_value};
use finguard::config::FinguardConfig;
use finguard::dataset::FeatureTable;
use finguard::dataset::sample::write_sample_upload;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let (config_path, args) = cli::split_config_flag(std::env::args().skip(1).collect())?;
    let mut config = cli::load_config(config_path.as_deref())?;
    apply_args(&mut config, &args)?;
    config.validate().map_err(|err| err.to_string())?;
    cli::init_logging("finguard-sample");

    let table = FeatureTable::load(&config.paths.feature_table).map_err(|err| err.to_string())?;
    let sample = &config.sample;
    let written = write_sample_upload(&table, sample.rows, sample.seed, &sample.output)
        .map_err(|err| err.to_string())?;
    println!("wrote {written} rows to {}", sample.output.display());
    Ok(())
}

fn apply_args(config: &mut FinguardConfig, args: &[String]) -> Result<(), String> {
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--table" => {
                config.paths.feature_table = PathBuf::from(next_value(args, &mut idx, "--table")?);
            }
            "--out" => config.sample.output = PathBuf::from(next_value(args, &mut idx, "--out")?),
            "--rows" => config.sample.rows = next_parsed(args, &mut idx, "--rows")?,
            "--seed" => config.sample.seed = Some(next_parsed(args, &mut idx, "--seed")?),
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(())
}

fn help_text() -> String {
    [
        "finguard-sample",
        "",
        "Draw random rows from the Feature Table as an upload CSV.",
        "",
        "Usage:",
        "  finguard-sample [--config <file>] [--table <csv>] [--out <csv>] [--rows <n>] [--seed <n>]",
    ]
    .join("\n")
}
