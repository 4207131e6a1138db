//! Argument helpers shared by the `finguard-*` binaries.
//!
//! Binaries parse flags by hand; these helpers keep the value handling and
//! error messages uniform.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{self, FinguardConfig};
use crate::logging;

/// Advance past a flag and return its value.
pub fn next_value<'a>(args: &'a [String], idx: &mut usize, flag: &str) -> Result<&'a str, String> {
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Advance past a flag and parse its value.
pub fn next_parsed<T: FromStr>(args: &[String], idx: &mut usize, flag: &str) -> Result<T, String> {
    let value = next_value(args, idx, flag)?;
    value
        .parse::<T>()
        .map_err(|_| format!("Invalid {flag} value: {value}"))
}

/// Pull `--config <file>` out of `args`, returning it with the rest.
pub fn split_config_flag(args: Vec<String>) -> Result<(Option<PathBuf>, Vec<String>), String> {
    let mut config = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut idx = 0usize;
    while idx < args.len() {
        if args[idx] == "--config" {
            config = Some(PathBuf::from(next_value(&args, &mut idx, "--config")?));
        } else {
            rest.push(args[idx].clone());
        }
        idx += 1;
    }
    Ok((config, rest))
}

/// Load the explicit config file, or the default one when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<FinguardConfig, String> {
    config::load(path).map_err(|err| err.to_string())
}

/// Install logging for `job`; failures only warn so the job can still run.
pub fn init_logging(job: &str) {
    if let Err(err) = logging::init(job) {
        eprintln!("warning: logging disabled: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_config_flag() {
        let (config, rest) =
            split_config_flag(args(&["--seed", "7", "--config", "cfg.toml", "--out", "m.json"])).unwrap();
        assert_eq!(config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(rest, args(&["--seed", "7", "--out", "m.json"]));
        assert!(split_config_flag(args(&["--config"])).is_err());
    }

    #[test]
    fn parses_values_with_flag_in_errors() {
        let list = args(&["--rows", "12", "--seed", "x"]);
        let mut idx = 0;
        assert_eq!(next_parsed::<usize>(&list, &mut idx, "--rows").unwrap(), 12);
        assert_eq!(idx, 1);
        idx = 2;
        assert_eq!(
            next_parsed::<u64>(&list, &mut idx, "--seed").unwrap_err(),
            "Invalid --seed value: x"
        );
        let mut idx = 3;
        assert_eq!(
            next_value(&list, &mut idx, "--seed").unwrap_err(),
            "--seed requires a value"
        );
    }
}
