//! Generated files: numbered SQL release files and static release templates

use super::placeholders::Substitutions;
use crate::core::config::SqlHeaderPaths;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::files::{read_text, write_text};
use std::path::{Path, PathBuf};

/// Header contents, read once per generation
#[derive(Debug, Clone)]
pub struct SqlHeaders {
  pub default: String,
  pub with_create: String,
}

impl SqlHeaders {
  /// Read both header templates. Either one missing is fatal.
  pub fn load(paths: &SqlHeaderPaths) -> ReleaseResult<Self> {
    let with_create = read_text(&paths.with_create)
      .with_context(|| format!("Failed to read SQL header template {}", paths.with_create.display()))?;
    let default = read_text(&paths.default)
      .with_context(|| format!("Failed to read SQL header template {}", paths.default.display()))?;
    Ok(Self { default, with_create })
  }

  fn for_file(&self, file_name: &str, create_table_file: &str) -> &str {
    if file_name == create_table_file {
      &self.with_create
    } else {
      &self.default
    }
  }
}

/// Write every SQL release file into every release directory.
///
/// `create_table_file` gets the with-create header, the rest the default one.
/// Returns the paths that were written; write failures are logged and skipped.
pub fn generate_release_files(
  release_dirs: &[PathBuf],
  file_names: &[String],
  create_table_file: &str,
  headers: &SqlHeaders,
  subs: &Substitutions<'_>,
) -> ReleaseResult<Vec<PathBuf>> {
  let mut written = Vec::new();

  for dir in release_dirs {
    for file_name in file_names {
      let header = headers.for_file(file_name, create_table_file);
      let content = subs.apply(header, dir, Some(file_name))?;

      let path = dir.join(file_name);
      if write_text(&path, &content) {
        written.push(path);
      }
    }
  }

  Ok(written)
}

/// Copy one static template into every release directory under `file_name`.
///
/// The template is read once (fatal if unreadable); only the generic
/// placeholders are resolved.
pub fn generate_template_files(
  release_dirs: &[PathBuf],
  template_path: &Path,
  file_name: &str,
  subs: &Substitutions<'_>,
) -> ReleaseResult<Vec<PathBuf>> {
  let template = read_text(template_path)
    .with_context(|| format!("Failed to read release template {}", template_path.display()))?;

  let mut written = Vec::new();
  for dir in release_dirs {
    let content = subs.apply(&template, dir, None)?;
    let path = dir.join(file_name);
    if write_text(&path, &content) {
      written.push(path);
    }
  }

  Ok(written)
}
