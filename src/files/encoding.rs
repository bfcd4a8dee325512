//! Character encoding detection for SQL sources and templates
//!
//! Release inputs come from editors on several platforms: UTF-8, UTF-16 with a
//! byte-order mark (SSMS exports), and legacy single-byte code pages. Only the
//! leading bytes are sampled.

use crate::core::error::{ReleaseError, ReleaseResult};
use encoding_rs::Encoding;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes sampled for detection
pub const SAMPLE_SIZE: usize = 4096;

/// Guesses a character encoding from a byte sample
pub trait CharsetDetector {
  /// Return the best guess, or `None` when the sample gives no usable evidence.
  /// `complete` is true when the sample holds the entire file.
  fn detect(&self, sample: &[u8], complete: bool) -> Option<&'static Encoding>;
}

/// Byte-order mark first, then chardetng's byte-distribution heuristic
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicDetector;

impl CharsetDetector for HeuristicDetector {
  fn detect(&self, sample: &[u8], complete: bool) -> Option<&'static Encoding> {
    if sample.is_empty() {
      return None;
    }

    if let Some((encoding, _bom_len)) = Encoding::for_bom(sample) {
      return Some(encoding);
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(sample, complete);
    Some(detector.guess(None, true))
  }
}

/// Detect the encoding of a file with the default detector
pub fn detect_encoding(path: &Path) -> ReleaseResult<&'static Encoding> {
  detect_encoding_with(&HeuristicDetector, path)
}

/// Detect the encoding of a file with a specific detector
pub fn detect_encoding_with(detector: &dyn CharsetDetector, path: &Path) -> ReleaseResult<&'static Encoding> {
  let file = File::open(path).map_err(|e| ReleaseError::io(path, e))?;

  let mut sample = Vec::with_capacity(SAMPLE_SIZE);
  file
    .take(SAMPLE_SIZE as u64 + 1)
    .read_to_end(&mut sample)
    .map_err(|e| ReleaseError::io(path, e))?;

  // One byte past the sample tells us whether the file continues
  let complete = sample.len() <= SAMPLE_SIZE;
  sample.truncate(SAMPLE_SIZE);

  let encoding = detector
    .detect(&sample, complete)
    .ok_or_else(|| ReleaseError::Detection { path: path.to_path_buf() })?;

  tracing::debug!("Detected encoding for {}: {}", path.display(), encoding.name());
  Ok(encoding)
}
