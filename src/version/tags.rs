//! Version tags passed on the command line: `AGT_<ver>_and_AWB_<ver>`

use super::{VersionPair, VersionSet, normalize_build_suffix};
use crate::core::error::{ReleaseError, ReleaseResult};

const TAG_SEPARATOR: &str = "_and_";
const AGT_PREFIX: &str = "AGT_";
const AWB_PREFIX: &str = "AWB_";

/// The AGT and AWB versions carried by one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTag {
  pub agt: String,
  pub awb: String,
}

impl VersionTag {
  /// Split on `_and_`, then take what follows the first `AGT_` in the first
  /// half and the first `AWB_` in the second half. Anything after a second
  /// `_and_` is ignored.
  pub fn parse(tag: &str) -> ReleaseResult<Self> {
    let mut halves = tag.split(TAG_SEPARATOR);
    let agt_half = halves.next().unwrap_or_default();
    let awb_half = halves
      .next()
      .ok_or_else(|| ReleaseError::version_parse(tag, format!("missing '{}' separator", TAG_SEPARATOR)))?;

    let (_, agt) = agt_half
      .split_once(AGT_PREFIX)
      .ok_or_else(|| ReleaseError::version_parse(tag, format!("missing '{}' before the separator", AGT_PREFIX)))?;
    let (_, awb) = awb_half
      .split_once(AWB_PREFIX)
      .ok_or_else(|| ReleaseError::version_parse(tag, format!("missing '{}' after the separator", AWB_PREFIX)))?;

    Ok(Self {
      agt: agt.to_string(),
      awb: awb.to_string(),
    })
  }
}

/// Resolve versions from the previous and current tags.
/// Only the current (new) versions get the `-b` -> `-B` normalization.
pub fn from_tags(previous: &str, current: &str) -> ReleaseResult<VersionSet> {
  let old = VersionTag::parse(previous)?;
  let new = VersionTag::parse(current)?;

  Ok(VersionSet::new(
    VersionPair::new(old.agt, normalize_build_suffix(&new.agt)),
    VersionPair::new(old.awb, normalize_build_suffix(&new.awb)),
  ))
}

/// Positional heuristic: with more than two items, the last two are version
/// tags unless either of them names an existing file.
///
/// Returns the changed-file items and the trailing `(previous, current)` tags.
pub fn split_trailing_tags<F>(items: &[String], is_file: F) -> (Vec<String>, Option<(String, String)>)
where
  F: Fn(&str) -> bool,
{
  if let [changed @ .., previous, current] = items
    && items.len() > 2
    && !is_file(previous.as_str())
    && !is_file(current.as_str())
  {
    return (changed.to_vec(), Some((previous.clone(), current.clone())));
  }

  (items.to_vec(), None)
}
