//! The release command: build (or plan) one release bundle

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::pipeline::{ReleasePipeline, RunSummary};
use crate::core::plan::ReleasePlan;
use crate::release::SkipReason;
use std::path::Path;

/// Positional input and output switches for one run
#[derive(Debug, Clone)]
pub struct ReleaseArgs {
  pub release_number: String,
  pub items: Vec<String>,
  pub dry_run: bool,
  pub json: bool,
}

/// Run the release command
pub fn run_release(config: &ReleaseConfig, workdir: &Path, args: ReleaseArgs) -> ReleaseResult<()> {
  if args.items.is_empty() {
    return Err(ReleaseError::usage(format!(
      "Release {} has no changed files or version tags",
      args.release_number
    )));
  }

  let pipeline = ReleasePipeline::new(config, workdir);

  if args.dry_run {
    let ctx = pipeline.plan(&args.release_number, args.items)?;
    let plan = ReleasePlan::from_context(&ctx, config)?;
    if args.json {
      println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
      print!("{}", plan.to_human_readable());
      println!();
      println!("🔍 Dry-run mode (nothing written)");
    }
    return Ok(());
  }

  let summary = pipeline.execute(&args.release_number, args.items)?;
  if args.json {
    println!("{}", serde_json::to_string_pretty(&summary)?);
  } else {
    print_summary(&summary);
  }
  Ok(())
}

fn print_summary(summary: &RunSummary) {
  println!(
    "📦 Release {} ({} mode): {}",
    summary.release_number,
    summary.mode,
    summary.release_path.display()
  );
  println!("   {} file(s) generated", summary.written.len());
  match &summary.deploy_guide {
    Some(path) => println!("   Deployment guide: {}", path.display()),
    None => println!("   ⚠️  Deployment guide was not saved (see log)"),
  }

  let report = &summary.copy_report;
  println!("   {} changed file(s) copied", report.copied.len());
  for skipped in &report.skipped {
    let reason = match &skipped.reason {
      SkipReason::InvalidPath => "expected <database>/<directory>/<file>".to_string(),
      SkipReason::Unmapped { directory } => format!("no release file mapped for '{}'", directory),
      SkipReason::NoReleaseDirectory { database } => format!("no release directory matches '{}'", database),
      SkipReason::CopyFailed => "copy failed (see log)".to_string(),
    };
    println!("   ⚠️  Skipped {}: {}", skipped.path.display(), reason);
  }

  println!();
  println!("✅ Release {} completed!", summary.release_number);
}
