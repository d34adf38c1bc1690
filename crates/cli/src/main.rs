// nugget CLI - golden-record resolution for delimited files

mod exit_codes;
mod resolve;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};
use resolve::{ConfigCommands, PolicyArg, RunArgs};

#[derive(Parser)]
#[command(name = "nugget")]
#[command(about = "Merge duplicate records into golden records (headless)")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover key fields, group duplicates and write golden records
    #[command(after_help = "\
Examples:
  nugget run clients.csv
  nugget run clients.csv --threshold 25 --output golden.csv
  nugget run clients.csv --config nugget.toml --json
  nugget run clients.csv --policy first_value_aggregate
  nugget run                      (prompts for the input path)")]
    Run {
        /// Input file (prompted for when omitted)
        input: Option<PathBuf>,

        /// TOML config file (schema, keys, merge, dates)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Key threshold: fields must score strictly above this
        #[arg(long, short = 't')]
        threshold: Option<f64>,

        /// Conflict-resolution policy
        #[arg(long)]
        policy: Option<PolicyArg>,

        /// Exclude records without an update date; groups with none are dropped
        #[arg(long)]
        drop_undated: bool,

        /// Field delimiter (sniffed when omitted)
        #[arg(long, short = 'd')]
        delimiter: Option<char>,

        /// Output file (default: golden_records_<input>.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print run metadata, summary and scores as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Print per-field coverage, distinctiveness and score
    #[command(after_help = "\
Examples:
  nugget score clients.csv
  nugget score clients.csv --threshold 25 --json")]
    Score {
        /// Input file
        input: PathBuf,

        /// TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Key threshold used to mark selected fields
        #[arg(long, short = 't')]
        threshold: Option<f64>,

        /// Field delimiter (sniffed when omitted)
        #[arg(long, short = 'd')]
        delimiter: Option<char>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Config file commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: nugget <command> [options]");
            eprintln!("       nugget --help for more information");
            Ok(())
        }
        Some(Commands::Run {
            input,
            config,
            threshold,
            policy,
            drop_undated,
            delimiter,
            output,
            json,
        }) => resolve::cmd_run(RunArgs {
            input,
            config,
            threshold,
            policy,
            drop_undated,
            delimiter,
            output,
            json,
        }),
        Some(Commands::Score { input, config, threshold, delimiter, json }) => {
            resolve::cmd_score(RunArgs {
                input: Some(input),
                config,
                threshold,
                policy: None,
                drop_undated: false,
                delimiter,
                output: None,
                json,
            })
        }
        Some(Commands::Config(cmd)) => resolve::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
