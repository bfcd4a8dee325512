//! Deployment guide generation
//!
//! The guide is a document template whose text runs carry the placeholders
//! `file_name` and `version`. Documents sit behind [`DocumentTemplate`] so the
//! host format stays swappable; [`DocxTemplate`] handles Office Open XML
//! (`.docx`) files by rewriting the `<w:t>` runs of `word/document.xml` in place
//! and copying every other archive entry through untouched. A placeholder split
//! across two runs is not matched, same as a run-level find/replace in Word.

use crate::core::error::{ReleaseError, ReleaseResult};
use regex::{Captures, Regex};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::LazyLock;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const FILE_NAME_PLACEHOLDER: &str = "file_name";
pub const VERSION_PLACEHOLDER: &str = "version";

/// A document whose text runs can be rewritten in place
pub trait DocumentTemplate: Sized {
  fn load(path: &Path) -> ReleaseResult<Self>;

  /// Visit every text run; returning `Some` replaces the run's text
  fn for_each_text_run(&mut self, visitor: &mut dyn FnMut(&str) -> Option<String>);

  fn save(&self, path: &Path) -> ReleaseResult<()>;
}

/// Replace placeholders run by run, in the given order. Returns the number of
/// runs that changed.
pub fn fill_placeholders<D: DocumentTemplate>(doc: &mut D, replacements: &[(&str, &str)]) -> usize {
  let mut changed = 0;
  doc.for_each_text_run(&mut |text| {
    let mut updated = text.to_string();
    for (placeholder, value) in replacements {
      if updated.contains(placeholder) {
        updated = updated.replace(placeholder, value);
      }
    }
    if updated == text {
      None
    } else {
      changed += 1;
      Some(updated)
    }
  });
  changed
}

/// Fill the deployment guide template and write it to `output_path`.
///
/// A template that cannot be loaded is fatal; a failed save is logged and
/// reported through the return value.
pub fn generate_deploy_guide_document(
  release_number: &str,
  release_path_label: &str,
  template_path: &Path,
  output_path: &Path,
) -> ReleaseResult<bool> {
  let mut doc = DocxTemplate::load(template_path)?;
  let changed = fill_placeholders(
    &mut doc,
    &[
      (FILE_NAME_PLACEHOLDER, release_path_label),
      (VERSION_PLACEHOLDER, release_number),
    ],
  );
  tracing::debug!("Deployment guide: {} text runs updated", changed);

  match doc.save(output_path) {
    Ok(()) => {
      tracing::info!("Created the deployment guide: {}", output_path.display());
      Ok(true)
    }
    Err(e) => {
      tracing::error!("Failed to create deployment guide: {}", e);
      Ok(false)
    }
  }
}

const DOCUMENT_PART: &str = "word/document.xml";

static TEXT_RUN_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(<w:t(?:\s[^>]*)?>)([^<]*)(</w:t>)").expect("valid regex"));

#[derive(Debug, Clone)]
struct ArchiveEntry {
  name: String,
  is_dir: bool,
  data: Vec<u8>,
}

/// Office Open XML word-processing document
#[derive(Debug, Clone)]
pub struct DocxTemplate {
  entries: Vec<ArchiveEntry>,
  document_index: usize,
  document_xml: String,
}

impl DocxTemplate {
  fn error(path: &Path, message: impl Into<String>) -> ReleaseError {
    ReleaseError::Document {
      path: path.to_path_buf(),
      message: message.into(),
    }
  }
}

impl DocumentTemplate for DocxTemplate {
  fn load(path: &Path) -> ReleaseResult<Self> {
    let file = File::open(path).map_err(|e| ReleaseError::io(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Self::error(path, e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
      let mut entry = archive.by_index(index).map_err(|e| Self::error(path, e.to_string()))?;
      let mut data = Vec::new();
      entry
        .read_to_end(&mut data)
        .map_err(|e| Self::error(path, format!("{}: {}", entry.name(), e)))?;
      entries.push(ArchiveEntry {
        name: entry.name().to_string(),
        is_dir: entry.is_dir(),
        data,
      });
    }

    let document_index = entries
      .iter()
      .position(|entry| entry.name == DOCUMENT_PART)
      .ok_or_else(|| Self::error(path, format!("missing {}", DOCUMENT_PART)))?;
    let document_xml = String::from_utf8(entries[document_index].data.clone())
      .map_err(|e| Self::error(path, format!("{} is not UTF-8: {}", DOCUMENT_PART, e)))?;

    Ok(Self {
      entries,
      document_index,
      document_xml,
    })
  }

  fn for_each_text_run(&mut self, visitor: &mut dyn FnMut(&str) -> Option<String>) {
    let rewritten = TEXT_RUN_RE.replace_all(&self.document_xml, |caps: &Captures| {
      let text = unescape_xml(&caps[2]);
      match visitor(&text) {
        Some(updated) => format!("{}{}{}", &caps[1], escape_xml(&updated), &caps[3]),
        None => caps[0].to_string(),
      }
    });
    self.document_xml = rewritten.into_owned();
  }

  fn save(&self, path: &Path) -> ReleaseResult<()> {
    let file = File::create(path).map_err(|e| ReleaseError::io(path, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, entry) in self.entries.iter().enumerate() {
      if entry.is_dir {
        writer
          .add_directory(entry.name.as_str(), options)
          .map_err(|e| Self::error(path, e.to_string()))?;
        continue;
      }

      writer
        .start_file(entry.name.as_str(), options)
        .map_err(|e| Self::error(path, e.to_string()))?;
      let data = if index == self.document_index {
        self.document_xml.as_bytes()
      } else {
        entry.data.as_slice()
      };
      writer.write_all(data).map_err(|e| ReleaseError::io(path, e))?;
    }

    writer.finish().map_err(|e| Self::error(path, e.to_string()))?;
    Ok(())
  }
}

static ENTITY_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|lt|gt|quot|apos|amp);").expect("valid regex"));

/// Decode the predefined entities and numeric character references in one
/// pass. A reference that is not a valid char is kept verbatim.
fn unescape_xml(text: &str) -> String {
  ENTITY_RE
    .replace_all(text, |caps: &Captures| {
      let decoded = match &caps[1] {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        reference => {
          let code = match reference.strip_prefix("#x").or_else(|| reference.strip_prefix("#X")) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => reference[1..].parse::<u32>().ok(),
          };
          code.and_then(char::from_u32)
        }
      };
      decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
    })
    .into_owned()
}

fn escape_xml(text: &str) -> String {
  text
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
}
