// src/cli.rs

//! CLI argument parsing using `clap`.

use std::collections::BTreeMap;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `trialflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "trialflow",
    version,
    about = "Build and walk dataset pipeline workflows.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a workflow file (TOML).
    ///
    /// Default: `Trialflow.toml` in the current working directory.
    #[arg(long, value_name = "PATH", conflicts_with = "builtin")]
    pub workflow: Option<String>,

    /// Use a built-in workflow instead of a file
    /// (sdtm, sce, adam_tfl, full, analysis, r_plot).
    #[arg(long, value_name = "NAME")]
    pub builtin: Option<String>,

    /// Workflow parameter override, e.g. `sdtm_data_path=/mnt/sdtm/1`.
    ///
    /// May be repeated.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Where placeholder output handles are rooted when walking the plan.
    #[arg(long, value_name = "URI", default_value = "staging://trialflow")]
    pub staging_dir: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TRIALFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the plan, but don't dispatch any steps.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Parameter overrides as a map; later flags win.
    pub fn param_map(&self) -> BTreeMap<String, String> {
        self.params.iter().cloned().collect()
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid parameter '{s}' (expected KEY=VALUE)")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
