//! blackboard command-line interface

use blackboard::cli::aggregate::{self, AggregateConfig};
use blackboard::cli::calculate::{self, CalculateConfig};
use blackboard::cli::format::{self, FormatConfig};
use blackboard::cli::logging::{self, LogConfig};
use blackboard::cli::output::{self, ColorMode, OutputFormat};
use blackboard::cli::validate::{self, ValidateConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OpenBlackboard command-line tool
#[derive(Parser)]
#[command(name = "blackboard")]
#[command(author, version, about = "OpenBlackboard protocol tools", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check protocol schemas for model errors
    Validate {
        /// Protocol files to validate
        files: Vec<PathBuf>,

        /// Strict mode (warnings as errors)
        #[arg(short, long)]
        strict: bool,
    },

    /// Validate and calculate one submission
    Calculate {
        /// Protocol file
        protocol: PathBuf,

        /// Submitted values (JSON object of reference to value)
        #[arg(short, long)]
        data: PathBuf,

        /// Culture used to read numbers and booleans (e.g. it-IT)
        #[arg(short, long)]
        culture: Option<String>,
    },

    /// Aggregate many submissions of one protocol
    Aggregate {
        /// Protocol file
        protocol: PathBuf,

        /// Submitted value files
        files: Vec<PathBuf>,

        /// Culture used to read numbers and booleans (e.g. it-IT)
        #[arg(short, long)]
        culture: Option<String>,

        /// Count mode ignores null values
        #[arg(long)]
        exclude_null_from_count: bool,

        /// Keep aggregating after errors
        #[arg(long)]
        ignore_errors: bool,
    },

    /// Rewrite a protocol schema in canonical form
    Format {
        /// Protocol file
        protocol: PathBuf,

        /// Overwrite the protocol file
        #[arg(short, long)]
        in_place: bool,
    },
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let colors = output::setup_colors(cli.color);
    if let Err(e) = logging::init_logging(&LogConfig::from_verbosity(cli.verbose).with_ansi(colors)) {
        eprintln!("{}", output::format_warning(&format!("logging disabled: {}", e)));
    }

    let result = match cli.command {
        Commands::Validate { files, strict } => {
            let config = ValidateConfig {
                files,
                strict,
                format: cli.format,
                output_file: cli.output,
            };
            validate::validate(config).await
        }

        Commands::Calculate { protocol, data, culture } => {
            let config = CalculateConfig {
                protocol,
                data,
                culture,
                format: cli.format,
                output_file: cli.output,
            };
            calculate::calculate(config).await
        }

        Commands::Aggregate {
            protocol,
            files,
            culture,
            exclude_null_from_count,
            ignore_errors,
        } => {
            let config = AggregateConfig {
                protocol,
                files,
                culture,
                exclude_null_from_count,
                ignore_errors,
                format: cli.format,
                output_file: cli.output,
            };
            aggregate::aggregate(config).await
        }

        Commands::Format { protocol, in_place } => {
            let config = FormatConfig {
                protocol,
                in_place,
                output_file: cli.output,
            };
            format::format(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
