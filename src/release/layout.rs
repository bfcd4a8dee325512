//! Release directory tree: `<root>/AWB_<newAWB>_AGT_<newAGT>/<database>`

use crate::core::error::{ReleaseError, ReleaseResult};
use crate::version::{DatabaseId, VersionSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Bundle directory name for the upcoming versions
pub fn release_bundle_name(versions: &VersionSet) -> String {
  format!(
    "AWB_{}_AGT_{}",
    versions.get(DatabaseId::Awb).new,
    versions.get(DatabaseId::Agt).new
  )
}

/// `<release_root>/AWB_<newAWB>_AGT_<newAGT>`
pub fn release_bundle_path(release_root: &Path, versions: &VersionSet) -> PathBuf {
  release_root.join(release_bundle_name(versions))
}

/// Create one directory per database under the bundle path.
///
/// Existing directories are fine. Any OS error aborts with no partial result.
pub fn create_release_directories(bundle_path: &Path, database_names: &[String]) -> ReleaseResult<Vec<PathBuf>> {
  let mut created = Vec::with_capacity(database_names.len());

  for name in database_names {
    let dir = bundle_path.join(name);
    fs::create_dir_all(&dir).map_err(|e| {
      tracing::error!("Failed to create directory {}: {}", dir.display(), e);
      ReleaseError::io(&dir, e)
    })?;

    tracing::info!("Directory created or already exists: {}", dir.display());
    created.push(dir);
  }

  if created.is_empty() {
    return Err(ReleaseError::message("No release directories were created (empty database list)"));
  }

  Ok(created)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::version::VersionPair;
  use tempfile::TempDir;

  fn names() -> Vec<String> {
    vec!["datatrak_bgt_agt".to_string(), "datatrak_bgt_awb".to_string()]
  }

  #[test]
  fn test_bundle_path() {
    let versions = VersionSet::new(VersionPair::new("1.0", "1.1-B2"), VersionPair::new("2.0", "2.1-B2"));
    assert_eq!(
      release_bundle_path(Path::new("release"), &versions),
      PathBuf::from("release/AWB_2.1-B2_AGT_1.1-B2")
    );
  }

  #[test]
  fn test_create_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let bundle = tmp.path().join("release").join("AWB_2_AGT_1");

    let first = create_release_directories(&bundle, &names()).unwrap();
    let second = create_release_directories(&bundle, &names()).unwrap();
    assert_eq!(first, second);
    assert!(first.iter().all(|dir| dir.is_dir()));

    let count = fs::read_dir(&bundle).unwrap().count();
    assert_eq!(count, 2);
  }

  #[test]
  fn test_create_fails_when_path_is_a_file() {
    let tmp = TempDir::new().unwrap();
    let bundle = tmp.path().join("bundle");
    fs::write(&bundle, "not a directory").unwrap();

    let err = create_release_directories(&bundle, &names()).unwrap_err();
    assert!(matches!(err, ReleaseError::Io { .. }));
  }

  #[test]
  fn test_create_with_no_names_fails() {
    let tmp = TempDir::new().unwrap();
    assert!(create_release_directories(tmp.path(), &[]).is_err());
  }
}
