//! Placeholder substitution for generated release files
//!
//! Applied in a fixed order:
//!
//! 1. SQL release files only: `title_based_on_script` -> file name, `strdatetime` -> local time
//! 2. `deployment_db_name` -> database directory name
//! 3. database name -> version pair (`agt` / `awb` substring)
//! 4. `old_version` / `new_version` -> quoted versions

use crate::core::error::ReleaseResult;
use crate::files::substitute;
use crate::version::VersionSet;
use std::path::Path;

pub const TITLE: &str = "title_based_on_script";
pub const DATETIME: &str = "strdatetime";
pub const DB_NAME: &str = "deployment_db_name";
pub const OLD_VERSION: &str = "old_version";
pub const NEW_VERSION: &str = "new_version";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything needed to resolve placeholders during one generation step
#[derive(Debug, Clone)]
pub struct Substitutions<'a> {
  versions: &'a VersionSet,
  timestamp: String,
}

impl<'a> Substitutions<'a> {
  /// Stamp with the current local time
  pub fn new(versions: &'a VersionSet) -> Self {
    Self::with_timestamp(versions, chrono::Local::now().format(TIMESTAMP_FORMAT).to_string())
  }

  pub fn with_timestamp(versions: &'a VersionSet, timestamp: impl Into<String>) -> Self {
    Self {
      versions,
      timestamp: timestamp.into(),
    }
  }

  /// Resolve all placeholders for a file destined for `release_dir`.
  /// `sql_file_name` is set for SQL release files and enables step 1.
  pub fn apply(&self, content: &str, release_dir: &Path, sql_file_name: Option<&str>) -> ReleaseResult<String> {
    let mut content = content.to_string();

    if let Some(file_name) = sql_file_name {
      content = substitute(&content, TITLE, file_name);
      content = substitute(&content, DATETIME, &self.timestamp);
    }

    let db_name = database_name(release_dir);
    content = substitute(&content, DB_NAME, &db_name);

    let pair = self.versions.for_database(&db_name)?;
    content = substitute(&content, OLD_VERSION, &quoted(&pair.old));
    content = substitute(&content, NEW_VERSION, &quoted(&pair.new));

    Ok(content)
  }
}

/// Final path segment of a release directory
pub fn database_name(release_dir: &Path) -> String {
  release_dir
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}

fn quoted(version: &str) -> String {
  format!("'{}'", version)
}
