//! Inspect or initialize the FinGuard configuration file.

use finguard::config::{self, FinguardConfig};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("path") => {
            let path = config::config_path().map_err(|err| err.to_string())?;
            println!("{}", path.display());
        }
        Some("show") => {
            let config = config::load_or_default().map_err(|err| err.to_string())?;
            let text = toml::to_string_pretty(&config).map_err(|err| err.to_string())?;
            print!("{text}");
        }
        Some("init") => {
            let force = args.iter().skip(1).any(|arg| arg == "--force");
            let path = config::config_path().map_err(|err| err.to_string())?;
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                ));
            }
            let path = config::save(&FinguardConfig::default()).map_err(|err| err.to_string())?;
            println!("wrote default configuration to {}", path.display());
        }
        _ => return Err(help_text()),
    }
    Ok(())
}

fn help_text() -> String {
    [
        "finguard-config",
        "",
        "Usage:",
        "  finguard-config path            Print the config file location.",
        "  finguard-config show            Print the effective configuration.",
        "  finguard-config init [--force]  Write a default config file.",
    ]
    .join("\n")
}
