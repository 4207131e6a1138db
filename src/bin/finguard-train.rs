//! Train the financial-health classifier and write the model artifact.

use std::path::PathBuf;

use finguard::cli::{self, next_parsed, next_value};
use finguard::config::FinguardConfig;
use finguard::trainer;

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
    cli::init_logging("finguard-train");

    let paths = &config.paths;
    let outcome = trainer::run(&paths.feature_table, &paths.model_artifact, &config.training)
        .map_err(|err| err.to_string())?;

    let summary = &outcome.artifact.training;
    println!(
        "trained {} trees on {} rows, evaluated on {} rows",
        outcome.artifact.model.trees.len(),
        summary.train_rows,
        summary.test_rows
    );
    println!("classification report (held-out):");
    print!("{}", outcome.report);
    match outcome.roc_auc {
        Some(auc) => println!("ROC-AUC: {auc:.4}"),
        None => println!("ROC-AUC: undefined (held-out partition has one class)"),
    }
    println!("model artifact: {}", paths.model_artifact.display());
    Ok(())
}

fn apply_args(config: &mut FinguardConfig, args: &[String]) -> Result<(), String> {
    let training = &mut config.training;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--table" => {
                config.paths.feature_table = PathBuf::from(next_value(args, &mut idx, "--table")?);
            }
            "--out" => {
                config.paths.model_artifact = PathBuf::from(next_value(args, &mut idx, "--out")?);
            }
            "--seed" => training.seed = next_parsed(args, &mut idx, "--seed")?,
            "--test-fraction" => {
                training.test_fraction = next_parsed(args, &mut idx, "--test-fraction")?;
            }
            "--n-estimators" => {
                training.n_estimators = next_parsed(args, &mut idx, "--n-estimators")?;
            }
            "--learning-rate" => {
                training.learning_rate = next_parsed(args, &mut idx, "--learning-rate")?;
            }
            "--max-depth" => training.max_depth = next_parsed(args, &mut idx, "--max-depth")?,
            "--bins" => training.bins = next_parsed(args, &mut idx, "--bins")?,
            "--l2" => training.l2_regularization = next_parsed(args, &mut idx, "--l2")?,
            "--min-child-weight" => {
                training.min_child_weight = next_parsed(args, &mut idx, "--min-child-weight")?;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(())
}

fn help_text() -> String {
    [
        "finguard-train",
        "",
        "Train the gradient-boosted financial-health classifier.",
        "",
        "Usage:",
        "  finguard-train [--config <file>] [--table <csv>] [--out <model.json>] [options]",
        "",
        "Options:",
        "  --seed <n>               Split seed (default 42).",
        "  --test-fraction <f>      Held-out fraction (default 0.2).",
        "  --n-estimators <n>       Boosting rounds (default 200).",
        "  --learning-rate <f>      Shrinkage (default 0.1).",
        "  --max-depth <n>          Tree depth (default 4).",
        "  --bins <n>               Histogram bins (default 32).",
        "  --l2 <f>                 Leaf L2 regularization (default 1.0).",
        "  --min-child-weight <f>   Minimum child hessian (default 1.0).",
    ]
    .join("\n")
}
