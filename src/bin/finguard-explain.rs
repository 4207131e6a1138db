//! Compute feature attributions over the Feature Table and write the
//! summary plot.

use std::path::PathBuf;

use finguard::cli::{self, next_parsed, next_value};
use finguard::config::FinguardConfig;
use finguard::dataset::FeatureTable;
use finguard::explain::{Explainer, write_summary_plot};

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
    cli::init_logging("finguard-explain");

    let explainer = Explainer::open(&config.paths.model_artifact).map_err(|err| err.to_string())?;
    let table = FeatureTable::load(&config.paths.feature_table).map_err(|err| err.to_string())?;
    let summary = explainer.explain(&table).map_err(|err| err.to_string())?;
    write_summary_plot(&summary, config.explain.max_display, &config.paths.attribution_output)
        .map_err(|err| err.to_string())?;

    println!(
        "expected value (log-odds): {:.4} over {} rows",
        summary.expected_value,
        summary.rows()
    );
    println!("mean |attribution| by feature:");
    for (rank, feature) in summary.top(config.explain.max_display).iter().enumerate() {
        println!("{:>3}. {:<32} {:.4}", rank + 1, feature.name, feature.mean_abs);
    }
    println!("summary plot: {}", config.paths.attribution_output.display());
    Ok(())
}

fn apply_args(config: &mut FinguardConfig, args: &[String]) -> Result<(), String> {
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model" => {
                config.paths.model_artifact = PathBuf::from(next_value(args, &mut idx, "--model")?);
            }
            "--table" => {
                config.paths.feature_table = PathBuf::from(next_value(args, &mut idx, "--table")?);
            }
            "--out" => {
                config.paths.attribution_output = PathBuf::from(next_value(args, &mut idx, "--out")?);
            }
            "--max-display" => {
                config.explain.max_display = next_parsed(args, &mut idx, "--max-display")?;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(())
}

fn help_text() -> String {
    [
        "finguard-explain",
        "",
        "Explain the trained model with per-feature attributions.",
        "",
        "Usage:",
        "  finguard-explain [--config <file>] [--model <model.json>] [--table <csv>]",
        "                   [--out <plot.svg>] [--max-display <n>]",
    ]
    .join("\n")
}
