use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::str::FromStr;

use colint_lib::cli_types::{CommandName, Mode, OutputFormatArg};
use colint_lib::config::Config;
use colint_lib::dispatch::{self, OperationContext};
use colint_lib::exit_codes::exit;
use colint_lib::file_processor::{Discoverer, process_targets};
use colint_lib::output::{OutputFormat, OutputWriter};
use colint_lib::tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(name = "colint", author, version, about, long_about = None)]
struct Cli {
    /// Command to run: sort-libraries, code-format, grammar-check, newline-fix,
    /// clean-jupyter, lint or docformat
    #[arg(value_parser = CommandName::from_str)]
    command: CommandName,

    /// Directory (or single file) to process
    path_to_dir: PathBuf,

    /// Report what would change without modifying any file
    #[arg(long)]
    check: bool,

    /// Also clear notebook outputs when running lint
    #[arg(long)]
    clean_notebooks: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormatArg::Text)]
    output_format: OutputFormatArg,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,

    /// Show more log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<i32> {
    let target = &cli.path_to_dir;
    if !target.exists() {
        bail!("Path '{}' does not exist", target.display());
    }
    if cli.command == CommandName::Docformat && target.is_dir() {
        bail!("docformat works on a single file, but '{}' is a directory", target.display());
    }
    if cli.clean_notebooks && cli.command != CommandName::Lint {
        log::warn!("--clean-notebooks only applies to lint; ignoring it for {}", cli.command);
    }

    let (config, config_path) =
        Config::load(cli.config_file.as_deref(), target).context("Failed to load configuration")?;
    if let Some(path) = &config_path {
        log::info!("Using configuration from {}", path.display());
    }

    let registry = ToolRegistry::new(&config);
    let ctx = OperationContext::new(&config, &registry);
    let operations = dispatch::operations_for(cli.command, cli.clean_notebooks, &ctx);
    let discoverer = Discoverer::new(config.colint())?;

    let mode = Mode::from_check_flag(cli.check);
    let formatter = OutputFormat::from(cli.output_format).create_formatter(!cli.no_color);
    let writer = OutputWriter::new(cli.quiet);

    let report = process_targets(&operations, target, mode, &discoverer, |outcome| {
        if let Some(text) = formatter.format_outcome(outcome)
            && let Err(err) = writer.write_detail(&text)
        {
            log::warn!("Failed to write output: {err}");
        }
    })?;

    if let Some(text) = formatter.format_report(&report) {
        writer.writeln(&text).context("Failed to write report")?;
    }

    Ok(report.exit_code())
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(code) => exit::with_code(code),
        Err(err) => {
            eprintln!("{}: {err:#}", "Error".red().bold());
            exit::tool_error();
        }
    }
}
