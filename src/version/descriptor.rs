//! Version descriptor files: `old_version=<v>` and `new_version=<v>` lines

use super::{VersionPair, VersionSet, normalize_build_suffix};
use crate::core::error::{ReleaseError, ReleaseResult};
use regex::Regex;
use std::sync::LazyLock;

static OLD_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"old_version=(.+)").expect("valid regex"));
static NEW_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"new_version=(.+)").expect("valid regex"));

/// First match of `re` in `content`, trimmed. `.` stops at the line end.
fn capture_value(re: &Regex, content: &str) -> Option<String> {
  re.captures(content)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().trim().to_string())
    .filter(|value| !value.is_empty())
}

/// Parse one descriptor. `-b` -> `-B` applies to the new version only.
pub fn parse_descriptor(content: &str, label: &str) -> ReleaseResult<VersionPair> {
  let old = capture_value(&OLD_VERSION_RE, content)
    .ok_or_else(|| ReleaseError::version_parse(label, "no old_version= line in version file"))?;
  let new = capture_value(&NEW_VERSION_RE, content)
    .ok_or_else(|| ReleaseError::version_parse(label, "no new_version= line in version file"))?;

  Ok(VersionPair::new(old, normalize_build_suffix(&new)))
}

/// Resolve versions from the AGT and AWB descriptor contents
pub fn from_descriptors(agt: &str, awb: &str) -> ReleaseResult<VersionSet> {
  let agt = parse_descriptor(agt, "AGT version file")?;
  let awb = parse_descriptor(awb, "AWB version file")?;
  tracing::info!("Versions from descriptor files: agt={:?} awb={:?}", agt, awb);
  Ok(VersionSet::new(agt, awb))
}
