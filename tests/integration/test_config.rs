//! Integration tests for release.toml handling and command-line overrides

use crate::helpers::{CURRENT_TAG, PREVIOUS_TAG, TestWorkspace, run_bgt_release, run_bgt_release_raw};
use anyhow::Result;

#[test]
fn test_custom_mapping_and_release_root() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::write(
    ws.path.join("release.toml"),
    r#"
databases = ["proj_agt", "other_awb"]

[mapping]
procs = "6_datatrak_sp_scripts.sql"
"#,
  )?;
  ws.write_file("proj/procs/p1.sql", "CREATE PROCEDURE p1 AS SELECT 1;")?;
  ws.write_file("proj/stored_procedures/p2.sql", "CREATE PROCEDURE p2 AS SELECT 2;")?;

  run_bgt_release(
    &ws.path,
    &[
      "42",
      "--release-root",
      "out",
      "proj/procs/p1.sql",
      "proj/stored_procedures/p2.sql",
      PREVIOUS_TAG,
      CURRENT_TAG,
    ],
  )?;

  let sp = ws.read_file("out/AWB_2.1-B2_AGT_1.1-B2/proj_agt/6_datatrak_sp_scripts.sql")?;
  assert!(sp.contains("p1"));
  // the [mapping] table replaces the built-in one
  assert!(!sp.contains("p2"));
  assert!(!ws.file_exists("release"));
  Ok(())
}

#[test]
fn test_explicit_config_and_log_file() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::remove_file(ws.path.join("release.toml"))?;
  ws.write_file(
    "conf/bgt.toml",
    "databases = [\"proj_agt\", \"other_awb\"]\n[paths]\ntemplate_dir = \"file_templates\"\n",
  )?;

  run_bgt_release(
    &ws.path,
    &[
      "42",
      "-c",
      "conf/bgt.toml",
      "--log-file",
      "run.log",
      "proj/tables/t1.sql",
      PREVIOUS_TAG,
      CURRENT_TAG,
    ],
  )?;

  assert!(ws.file_exists("release/AWB_2.1-B2_AGT_1.1-B2/other_awb/scriptlist.txt"));
  assert!(ws.file_exists("run.log"));
  assert!(!ws.file_exists("bgt_release.log"));
  Ok(())
}

#[test]
fn test_missing_explicit_config_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let output = run_bgt_release_raw(&ws.path, &["42", "-c", "nope.toml", "a/b/c.sql", PREVIOUS_TAG, CURRENT_TAG])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("nope.toml"));
  Ok(())
}

#[test]
fn test_invalid_config_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::write(
    ws.path.join("release.toml"),
    "databases = [\"proj_agt\", \"proj_agt\"]\n",
  )?;

  let output = run_bgt_release_raw(&ws.path, &["42", "a/b/c.sql", PREVIOUS_TAG, CURRENT_TAG])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("listed twice"));
  assert!(!ws.file_exists("release"));
  Ok(())
}
