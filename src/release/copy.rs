//! Route changed SQL sources into release files
//!
//! A changed path looks like `<database>/<directory>/<file>.sql`. The directory
//! picks the release file through the configured mapping, the database picks
//! the release directory. Unmapped files are reported, never copied.

use crate::core::error::ReleaseError;
use crate::files::append_text_converted;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Where a changed file would go
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRoute {
  pub database: String,
  pub directory: String,
  pub release_file: Option<String>,
}

impl FileRoute {
  /// Split a changed path into database and directory names (the first two
  /// normal components; `.` segments are ignored) and look the directory up.
  pub fn resolve(path: &Path, mapping: &BTreeMap<String, String>) -> Option<Self> {
    let mut parts = path.components().filter_map(|c| match c {
      Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
      _ => None,
    });

    let database = parts.next()?;
    let directory = parts.next()?;
    let release_file = mapping.get(&directory).cloned();

    Some(Self {
      database,
      directory,
      release_file,
    })
  }
}

/// Why a changed file was left out of the release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
  /// Fewer than two path components
  InvalidPath,
  /// Parent directory has no mapping entry
  Unmapped { directory: String },
  /// No release directory matches the database name
  NoReleaseDirectory { database: String },
  /// Reading or appending failed (see log)
  CopyFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
  pub path: PathBuf,
  pub reason: SkipReason,
}

/// Outcome of the copy step
#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyReport {
  /// (changed file, release file) pairs that were appended
  pub copied: Vec<(PathBuf, PathBuf)>,
  pub skipped: Vec<SkippedFile>,
}

impl CopyReport {
  fn skip(&mut self, path: &Path, reason: SkipReason) {
    self.skipped.push(SkippedFile {
      path: path.to_path_buf(),
      reason,
    });
  }
}

/// Release directories whose path contains `database`. The path is taken
/// relative to `root` (the working directory), so e.g. `release/AWB_.../<db>`.
pub(crate) fn matching_dirs<'a>(
  release_dirs: &'a [PathBuf],
  root: &'a Path,
  database: &'a str,
) -> impl Iterator<Item = &'a PathBuf> {
  release_dirs.iter().filter(move |dir| {
    dir
      .strip_prefix(root)
      .unwrap_or(dir)
      .to_string_lossy()
      .contains(database)
  })
}

/// Append every mapped changed file to its release file in each release
/// directory whose path (relative to `source_root`) contains the database
/// segment. Changed paths are routed as given and read relative to
/// `source_root`. Never creates directories.
pub fn copy_changed_files_into_release_files(
  changed: &[PathBuf],
  source_root: &Path,
  release_dirs: &[PathBuf],
  mapping: &BTreeMap<String, String>,
) -> CopyReport {
  let mut report = CopyReport::default();

  for path in changed {
    tracing::info!("Routing changed file {}", path.display());

    let Some(route) = FileRoute::resolve(path, mapping) else {
      tracing::warn!("Invalid file path structure, skipping: {}", path.display());
      report.skip(path, SkipReason::InvalidPath);
      continue;
    };

    let Some(release_file) = route.release_file else {
      let miss = ReleaseError::MappingMiss {
        path: path.clone(),
        directory: route.directory.clone(),
      };
      tracing::warn!("{}; file excluded from the release", miss);
      report.skip(
        path,
        SkipReason::Unmapped {
          directory: route.directory,
        },
      );
      continue;
    };

    let targets: Vec<&PathBuf> = matching_dirs(release_dirs, source_root, &route.database).collect();
    if targets.is_empty() {
      tracing::warn!(
        "No release directory matches database '{}' for {}",
        route.database,
        path.display()
      );
      report.skip(
        path,
        SkipReason::NoReleaseDirectory {
          database: route.database.clone(),
        },
      );
      continue;
    }

    let source = source_root.join(path);
    for dir in targets {
      let dest = dir.join(&release_file);
      if append_text_converted(&source, &dest) {
        report.copied.push((path.clone(), dest));
      } else {
        report.skip(path, SkipReason::CopyFailed);
      }
    }
  }

  report
}
