#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use jsbundle_core::Config;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jsbundle")]
#[command(author, version, about = "Bundle JavaScript modules into one script", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Bundle the project's entry and everything it imports
    Bundle {
        /// Config file (default: jsbundle.config.json)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Entry file, overriding the config
        #[arg(long, value_name = "FILE")]
        entry: Option<String>,

        /// Output directory, overriding the config
        #[arg(long, value_name = "DIR")]
        out_dir: Option<String>,

        /// Rebuild when a reachable file changes
        #[arg(long, short = 'w')]
        watch: bool,
    },

    /// Write a default config file
    Init {
        /// Config file to write (default: jsbundle.config.json)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compile files and report their imports or parse errors
    Check {
        /// Files to check, relative to the working directory
        #[arg(required = true)]
        files: Vec<String>,

        /// Also print the rewritten module
        #[arg(long)]
        print: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Bundle {
            config: config_path,
            entry,
            out_dir,
            watch,
        }) => {
            let action = commands::bundle::BundleAction {
                cwd,
                config: config_path,
                entry,
                out_dir,
                watch,
            };
            commands::bundle::run(action, cli.json)
        }
        Some(Commands::Init {
            config: config_path,
            force,
        }) => commands::init::run(&cwd, config_path.as_deref(), force, cli.json),
        Some(Commands::Check { files, print }) => {
            commands::check::run(&cwd, &files, print, cli.json)
        }
    }
}
