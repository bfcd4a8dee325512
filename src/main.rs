mod commands;
mod core;
mod files;
mod logging;
mod release;
mod version;

use clap::Parser;
use core::config::ReleaseConfig;
use core::error::{ReleaseError, print_error};
use std::path::PathBuf;

/// Assemble a BGT database release bundle from changed SQL files
#[derive(Parser)]
#[command(name = "bgt-release")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Release number written into the deployment guide
  release_number: String,

  /// Changed SQL files (<database>/<directory>/<file>.sql), optionally followed by
  /// <PREVIOUS_TAG> <CURRENT_TAG> in the form AGT_<version>_and_AWB_<version>
  items: Vec<String>,

  /// Configuration file (default: release.toml, .release.toml or .config/release.toml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override the release root directory
  #[arg(long)]
  release_root: Option<PathBuf>,

  /// Override the template directory
  #[arg(long)]
  templates: Option<PathBuf>,

  /// Override the run log path
  #[arg(long)]
  log_file: Option<PathBuf>,

  /// Resolve versions and show the release plan without writing anything
  #[arg(long)]
  dry_run: bool,

  /// Output the plan or run summary in JSON format
  #[arg(long)]
  json: bool,

  /// Raise console log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let workdir = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(2);
    }
  };

  let config = match ReleaseConfig::load(cli.config.as_deref(), &workdir) {
    Ok(config) => config.with_overrides(cli.release_root, cli.templates, cli.log_file),
    Err(e) => {
      logging::init_logging(cli.verbose, None);
      handle_error(e);
    }
  };

  // A dry run leaves the disk untouched, log file included
  let log_file = (!cli.dry_run).then(|| workdir.join(&config.paths.log_file));
  logging::init_logging(cli.verbose, log_file.as_deref());

  let args = commands::ReleaseArgs {
    release_number: cli.release_number,
    items: cli.items,
    dry_run: cli.dry_run,
    json: cli.json,
  };

  if let Err(err) = commands::run_release(&config, &workdir, args) {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
