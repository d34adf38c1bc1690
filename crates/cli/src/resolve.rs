//! `nugget run` / `nugget score` - golden-record resolution of a delimited file.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use nugget_io::{output_filename, read_table, write_table, ReadOptions};
use nugget_resolve::engine::{analyze_table, choose_keys};
use nugget_resolve::{MergePolicy, ResolveConfig, ResolveError};

use crate::exit_codes::{resolve_exit_code, EXIT_ERROR, EXIT_NO_KEY_FIELDS};
use crate::util::render_score_table;
use crate::CliError;

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    #[value(name = "latest_with_fill")]
    LatestWithFill,
    #[value(name = "first_value_aggregate")]
    FirstValueAggregate,
}

impl From<PolicyArg> for MergePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::LatestWithFill => MergePolicy::LatestWithFill,
            PolicyArg::FirstValueAggregate => MergePolicy::FirstValueAggregate,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  nugget config validate nugget.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

/// Options shared by `run` and `score`.
pub struct RunArgs {
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub policy: Option<PolicyArg>,
    pub drop_undated: bool,
    pub delimiter: Option<char>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

fn engine_err(err: ResolveError) -> CliError {
    CliError {
        code: resolve_exit_code(&err),
        message: err.to_string(),
        hint: None,
    }
}

/// Load the config file (or defaults) and apply command-line overrides.
fn load_config(args: &RunArgs) -> Result<ResolveConfig, CliError> {
    let mut config = match args.config {
        Some(ref path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                engine_err(ResolveError::Io(format!("cannot read config {}: {e}", path.display())))
            })?;
            ResolveConfig::from_toml(&text).map_err(engine_err)?
        }
        None => ResolveConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.keys.threshold = threshold;
    }
    if let Some(policy) = args.policy {
        config.merge.policy = policy.into();
    }
    if args.drop_undated {
        config.merge.drop_undated_groups = true;
    }

    config.validate().map_err(engine_err)?;
    log::debug!("effective config: {config:?}");
    Ok(config)
}

fn read_options(config: &ResolveConfig, delimiter: Option<char>) -> Result<ReadOptions, CliError> {
    let mut options = ReadOptions::for_schema(&config.schema);
    if let Some(d) = delimiter {
        if !d.is_ascii() {
            return Err(CliError::args(format!("delimiter must be a single ASCII character, got '{d}'")));
        }
        options.delimiter = Some(d as u8);
    }
    Ok(options)
}

/// Ask for the input path on stdin.
fn prompt_input_path() -> Result<PathBuf, CliError> {
    eprint!("Enter the full path to the input file: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CliError { code: EXIT_ERROR, message: format!("cannot read stdin: {e}"), hint: None })?;

    let path = line.trim();
    if path.is_empty() {
        return Err(CliError::args("no input file given"));
    }
    Ok(PathBuf::from(path))
}

fn load_table(input: &Path, config: &ResolveConfig, delimiter: Option<char>) -> Result<nugget_resolve::Table, CliError> {
    let options = read_options(config, delimiter)?;
    read_table(input, &options).map_err(engine_err)
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args)?;
    let input = match args.input {
        Some(ref p) => p.clone(),
        None => prompt_input_path()?,
    };
    let output = args.output.clone().unwrap_or_else(|| output_filename(&input));

    let table = load_table(&input, &config, args.delimiter)?;

    let result = match nugget_resolve::run(&config, table) {
        Ok(r) => r,
        Err(ResolveError::NoKeyFieldsFound { threshold, scores }) => {
            eprint!("{}", render_score_table(&scores, &[], &config.schema));
            return Err(CliError {
                code: EXIT_NO_KEY_FIELDS,
                message: format!("no field scored above the threshold ({threshold})"),
                hint: Some("lower --threshold or pin key fields in the config ([keys] fields = [...])".into()),
            });
        }
        Err(e) => return Err(engine_err(e)),
    };

    write_table(&result.golden, &output).map_err(engine_err)?;

    if args.json {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json_str}");
    }

    let s = &result.summary;
    eprintln!("key fields: {}", result.key_fields.join(", "));
    eprintln!(
        "{} rows -> {} golden records ({} groups merged, {} dates nulled, {} groups dropped)",
        s.input_rows, s.golden_rows, s.merged_groups, s.dates_nulled, s.dropped_groups,
    );
    eprintln!("wrote {}", output.display());

    Ok(())
}

pub fn cmd_score(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args)?;
    let input = args
        .input
        .clone()
        .ok_or_else(|| CliError::args("input file required"))?;

    let table = load_table(&input, &config, args.delimiter)?;
    let analysis = analyze_table(&config, table);

    // Zero keys is a finding here, not a failure
    let keys = match choose_keys(&config, &analysis) {
        Ok(keys) => keys,
        Err(ResolveError::NoKeyFieldsFound { .. }) => Vec::new(),
        Err(e) => return Err(engine_err(e)),
    };

    if args.json {
        let payload = serde_json::json!({
            "threshold": config.keys.threshold,
            "key_fields": keys,
            "scores": analysis.scores,
            "dates_nulled": analysis.sanitize.nulled.len(),
        });
        let json_str = serde_json::to_string_pretty(&payload)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json_str}");
    } else {
        print!("{}", render_score_table(&analysis.scores, &keys, &config.schema));
        if keys.is_empty() {
            println!("no key fields above threshold {}", config.keys.threshold);
        } else {
            println!("key fields: {}", keys.join(", "));
        }
    }

    Ok(())
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { config } => {
            let args = RunArgs {
                input: None,
                config: Some(config.clone()),
                threshold: None,
                policy: None,
                drop_undated: false,
                delimiter: None,
                output: None,
                json: false,
            };
            let parsed = load_config(&args)?;
            eprintln!(
                "{}: ok (threshold {}, policy {})",
                config.display(),
                parsed.keys.threshold,
                parsed.merge.policy
            );
            Ok(())
        }
    }
}
