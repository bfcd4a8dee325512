//! Old/new version resolution for the AGT and AWB databases
//!
//! Versions come from one of two sources:
//!
//! - **tags**: the last two input items, `AGT_<ver>_and_AWB_<ver>` (previous, current)
//! - **descriptor**: `old_version=` / `new_version=` lines in each database's version file
//!
//! Either way the result is a [`VersionSet`] holding exactly one [`VersionPair`]
//! per database, built once and read-only afterwards.

pub mod descriptor;
pub mod tags;

use crate::core::error::{ReleaseError, ReleaseResult};
use serde::Serialize;
use std::fmt;

pub use descriptor::from_descriptors;
pub use tags::{from_tags, split_trailing_tags};

/// The two databases a release covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseId {
  Agt,
  Awb,
}

impl DatabaseId {
  pub fn as_str(&self) -> &'static str {
    match self {
      DatabaseId::Agt => "agt",
      DatabaseId::Awb => "awb",
    }
  }

  /// Resolve a database directory name by substring, `agt` checked first
  pub fn from_database_name(name: &str) -> Option<Self> {
    if name.contains("agt") {
      Some(DatabaseId::Agt)
    } else if name.contains("awb") {
      Some(DatabaseId::Awb)
    } else {
      None
    }
  }
}

impl fmt::Display for DatabaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Previous and upcoming version of one database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionPair {
  pub old: String,
  pub new: String,
}

impl VersionPair {
  pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
    Self {
      old: old.into(),
      new: new.into(),
    }
  }
}

/// One version pair per database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSet {
  agt: VersionPair,
  awb: VersionPair,
}

impl VersionSet {
  pub fn new(agt: VersionPair, awb: VersionPair) -> Self {
    Self { agt, awb }
  }

  pub fn get(&self, id: DatabaseId) -> &VersionPair {
    match id {
      DatabaseId::Agt => &self.agt,
      DatabaseId::Awb => &self.awb,
    }
  }

  /// Version pair for a database directory name
  pub fn for_database(&self, name: &str) -> ReleaseResult<&VersionPair> {
    DatabaseId::from_database_name(name)
      .map(|id| self.get(id))
      .ok_or_else(|| ReleaseError::UnknownDatabase { name: name.to_string() })
  }
}

/// Where the run takes its versions from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
  /// Previous and current `AGT_<ver>_and_AWB_<ver>` tags
  Tags { previous: String, current: String },
  /// Raw content of the AGT and AWB version files
  Descriptors { agt: String, awb: String },
}

impl VersionSource {
  /// Pick the source: descriptors when both contents are non-empty, else tags
  pub fn select(descriptors: Option<(String, String)>, tags: Option<(String, String)>) -> ReleaseResult<Self> {
    if let Some((agt, awb)) = descriptors
      && !agt.trim().is_empty()
      && !awb.trim().is_empty()
    {
      return Ok(VersionSource::Descriptors { agt, awb });
    }

    match tags {
      Some((previous, current)) => Ok(VersionSource::Tags { previous, current }),
      None => Err(ReleaseError::with_help(
        "No version information: no version tags in the input and the AGT/AWB version files are missing or empty",
        "Pass <PREVIOUS_TAG> <CURRENT_TAG> as the last two items or provide both version files.",
      )),
    }
  }

  pub fn mode(&self) -> &'static str {
    match self {
      VersionSource::Tags { .. } => "tags",
      VersionSource::Descriptors { .. } => "descriptor",
    }
  }

  /// Resolve the version set from this source
  pub fn resolve(&self) -> ReleaseResult<VersionSet> {
    match self {
      VersionSource::Tags { previous, current } => from_tags(previous, current),
      VersionSource::Descriptors { agt, awb } => from_descriptors(agt, awb),
    }
  }
}

/// Upper-case the build marker of a version: every `-b` becomes `-B`
pub fn normalize_build_suffix(version: &str) -> String {
  version.replace("-b", "-B")
}
