//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const PREVIOUS_TAG: &str = "AGT_1.0-b1_and_AWB_2.0-b1";
pub const CURRENT_TAG: &str = "AGT_1.1-b2_and_AWB_2.1-b2";
pub const BUNDLE: &str = "release/AWB_2.1-B2_AGT_1.1-B2";
pub const DEPLOY_GUIDE: &str = "BGT MsSQL DBs Release Deployment Guide.docx";

const RELEASE_FILES: [&str; 7] = [
  "1_datatrak_create_new_table_scripts.sql",
  "2_datatrak_alter_table_scripts.sql",
  "3_datatrak_functions_scripts.sql",
  "4_datatrak_triggers_scripts.sql",
  "5_datatrak_views_scripts.sql",
  "6_datatrak_sp_scripts.sql",
  "7_new_datatrak_data_insertion_scripts.sql",
];

const TEMPLATES: [&str; 4] = [
  "__DO_IT.bat_txt",
  "scriptlist.txt",
  "8_permission_datatrak_scripts.sql",
  "9_new_datatrak_mis_version_update_scripts.sql",
];

/// A working directory with templates and a release.toml
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a workspace with the standard templates and two databases,
  /// `proj_agt` and `other_awb`
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    std::fs::write(path.join("release.toml"), "databases = [\"proj_agt\", \"other_awb\"]\n")?;

    let templates = path.join("file_templates");
    std::fs::create_dir_all(&templates)?;
    std::fs::write(
      templates.join("default_header.txt"),
      "-- title_based_on_script (strdatetime)\nUSE deployment_db_name;\n-- upgrade old_version -> new_version\n",
    )?;
    std::fs::write(
      templates.join("defalt_header_with_create.txt"),
      "-- title_based_on_script (strdatetime)\nUSE deployment_db_name;\n-- create tables for new_version\n",
    )?;
    for name in TEMPLATES {
      std::fs::write(templates.join(name), "-- deployment_db_name: old_version -> new_version\n")?;
    }
    write_docx(
      &templates.join(DEPLOY_GUIDE),
      "<w:p><w:r><w:t>Release folder: file_name</w:t></w:r></w:p><w:p><w:r><w:t>Release version</w:t></w:r></w:p>",
    )?;

    Ok(Self { _root: root, path })
  }

  /// Write a file relative to the workspace, creating parent directories
  pub fn write_file(&self, rel: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file, content)?;
    Ok(file)
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    std::fs::read_to_string(self.path.join(path)).with_context(|| format!("Failed to read {}", path))
  }

  /// Read `word/document.xml` out of a generated document
  pub fn read_docx_text(&self, path: &str) -> Result<String> {
    let file = std::fs::File::open(self.path.join(path))?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut entry = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    std::io::Read::read_to_string(&mut entry, &mut xml)?;
    Ok(xml)
  }

  pub fn release_files() -> &'static [&'static str] {
    &RELEASE_FILES
  }

  pub fn template_files() -> &'static [&'static str] {
    &TEMPLATES
  }
}

/// Minimal .docx: content types plus a body with the given paragraphs
pub fn write_docx(path: &Path, body: &str) -> Result<()> {
  let mut writer = ZipWriter::new(std::fs::File::create(path)?);
  let options = SimpleFileOptions::default();
  writer.start_file("[Content_Types].xml", options)?;
  writer.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types/>"#)?;
  writer.start_file("word/document.xml", options)?;
  write!(
    writer,
    r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
    body
  )?;
  writer.finish()?;
  Ok(())
}

/// Run bgt-release, returning the output whatever the exit status
pub fn run_bgt_release_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_bgt-release");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("BGT_RELEASE_LOG")
    .output()
    .context("Failed to run bgt-release")
}

/// Run bgt-release and fail unless it succeeds
pub fn run_bgt_release(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_bgt_release_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "bgt-release command failed: bgt-release {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
