//! Encoding-aware reads, UTF-8 writes and literal placeholder substitution

use super::encoding::detect_encoding;
use crate::core::error::{ReleaseError, ReleaseResult};
use encoding_rs::Encoding;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Read a file as text using its detected encoding (BOM removed)
pub fn read_text(path: &Path) -> ReleaseResult<String> {
  decode_file(path, detect_encoding(path)?)
}

fn decode_file(path: &Path, encoding: &'static Encoding) -> ReleaseResult<String> {
  let bytes = fs::read(path).map_err(|e| ReleaseError::io(path, e))?;

  let (text, had_errors) = encoding.decode_with_bom_removal(&bytes);
  if had_errors {
    return Err(ReleaseError::Decode {
      path: path.to_path_buf(),
      encoding: encoding.name(),
    });
  }

  tracing::debug!("Read {} as {}", path.display(), encoding.name());
  Ok(text.into_owned())
}

/// Write UTF-8 content, creating or truncating the file.
///
/// Failures are logged and swallowed; the return value reports whether the
/// write happened.
pub fn write_text(path: &Path, content: &str) -> bool {
  match fs::write(path, content) {
    Ok(()) => {
      tracing::info!("Written to file: {}", path.display());
      true
    }
    Err(e) => {
      tracing::error!("Failed to write to file {}: {}", path.display(), e);
      false
    }
  }
}

/// Append `source` (in its detected encoding) to `dest` as UTF-8, followed by
/// two newlines. `dest` is created if absent; its directory is not.
///
/// Failures are logged and swallowed; the return value reports success.
pub fn append_text_converted(source: &Path, dest: &Path) -> bool {
  match try_append(source, dest) {
    Ok(()) => {
      tracing::info!("Copied {} to {}", source.display(), dest.display());
      true
    }
    Err(e) => {
      tracing::error!("Error copying {} to {}: {}", source.display(), dest.display(), e);
      false
    }
  }
}

fn try_append(source: &Path, dest: &Path) -> ReleaseResult<()> {
  let text = read_text(source)?;

  let mut file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(dest)
    .map_err(|e| ReleaseError::io(dest, e))?;

  file.write_all(text.as_bytes()).map_err(|e| ReleaseError::io(dest, e))?;
  file.write_all(b"\n\n").map_err(|e| ReleaseError::io(dest, e))?;
  Ok(())
}

/// Literal (non-regex) replacement of every occurrence of `placeholder`
pub fn substitute(content: &str, placeholder: &str, value: &str) -> String {
  content.replace(placeholder, value)
}
