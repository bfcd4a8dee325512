//! Release plan: what a run would do, computed without touching disk
//!
//! Built from a [`RunContext`] that reached `PathBuilt`. Printed by
//! `--dry-run`, as text or as JSON for automation.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::pipeline::{RunContext, RunState};
use crate::release::FileRoute;
use crate::release::copy::matching_dirs;
use crate::version::{DatabaseId, VersionSet};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Where one changed file would be appended
#[derive(Debug, Clone, Serialize)]
pub struct PlannedFile {
  pub path: PathBuf,
  /// `None` when the path has fewer than two components
  pub route: Option<FileRoute>,
  /// Release files that would receive the content (empty = skipped)
  pub targets: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
  pub release_number: String,
  pub mode: &'static str,
  pub versions: VersionSet,
  pub release_path: PathBuf,
  pub release_dirs: Vec<PathBuf>,
  pub files: Vec<PlannedFile>,
}

impl ReleasePlan {
  pub fn from_context(ctx: &RunContext, config: &ReleaseConfig) -> ReleaseResult<Self> {
    let (RunState::PathBuilt, Some(source), Some(versions), Some(release_path)) =
      (ctx.state, &ctx.source, &ctx.versions, &ctx.release_path)
    else {
      return Err(ReleaseError::message(format!(
        "A release plan needs a run stopped at '{}', got '{}'",
        RunState::PathBuilt,
        ctx.state
      )));
    };

    let release_dirs: Vec<PathBuf> = config.databases.iter().map(|db| release_path.join(db)).collect();

    let files = ctx
      .changed_files
      .iter()
      .map(|path| {
        let route = FileRoute::resolve(path, &config.mapping);
        let targets = match &route {
          Some(FileRoute {
            database,
            release_file: Some(file),
            ..
          }) => matching_dirs(&release_dirs, Path::new(""), database)
            .map(|dir| dir.join(file))
            .collect(),
          _ => Vec::new(),
        };
        PlannedFile {
          path: path.clone(),
          route,
          targets,
        }
      })
      .collect();

    Ok(Self {
      release_number: ctx.release_number.clone(),
      mode: source.mode(),
      versions: versions.clone(),
      release_path: release_path.clone(),
      release_dirs,
      files,
    })
  }

  pub fn to_human_readable(&self) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📦 Release {} ({} mode)", self.release_number, self.mode);
    for id in [DatabaseId::Agt, DatabaseId::Awb] {
      let pair = self.versions.get(id);
      let _ = writeln!(out, "  {}: {} → {}", id.as_str().to_uppercase(), pair.old, pair.new);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  Release path: {}", self.release_path.display());
    for dir in &self.release_dirs {
      let _ = writeln!(out, "    {}", dir.display());
    }

    if self.files.is_empty() {
      return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Changed files:");
    for file in &self.files {
      if file.targets.is_empty() {
        let _ = writeln!(out, "    ⚠️  {} (skipped)", file.path.display());
        continue;
      }
      let _ = writeln!(out, "    {}", file.path.display());
      for target in &file.targets {
        let _ = writeln!(out, "      → {}", target.display());
      }
    }
    out
  }
}
