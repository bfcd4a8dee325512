//! Integration tests for release bundle generation

use crate::helpers::{BUNDLE, CURRENT_TAG, DEPLOY_GUIDE, PREVIOUS_TAG, TestWorkspace, run_bgt_release, run_bgt_release_raw};
use anyhow::Result;

#[test]
fn test_release_from_tags() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("proj/stored_procedures/sp1.sql", "CREATE PROCEDURE sp1 AS SELECT 1;")?;

  let output = run_bgt_release(
    &ws.path,
    &["42", "proj/stored_procedures/sp1.sql", PREVIOUS_TAG, CURRENT_TAG],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Release 42 completed"), "stdout: {}", stdout);

  for db in ["proj_agt", "other_awb"] {
    for file in TestWorkspace::release_files().iter().chain(TestWorkspace::template_files()) {
      let path = format!("{}/{}/{}", BUNDLE, db, file);
      assert!(ws.file_exists(&path), "missing {}", path);
    }
  }

  let sp_awb = ws.read_file(&format!("{}/other_awb/6_datatrak_sp_scripts.sql", BUNDLE))?;
  assert!(sp_awb.contains("'2.0-b1'"));
  assert!(sp_awb.contains("'2.1-B2'"));
  assert!(sp_awb.contains("USE other_awb;"));
  assert!(!sp_awb.contains("sp1"));

  let sp_agt = ws.read_file(&format!("{}/proj_agt/6_datatrak_sp_scripts.sql", BUNDLE))?;
  assert!(sp_agt.starts_with("-- 6_datatrak_sp_scripts.sql ("));
  assert!(sp_agt.contains("-- upgrade '1.0-b1' -> '1.1-B2'"));
  assert!(sp_agt.ends_with("CREATE PROCEDURE sp1 AS SELECT 1;\n\n"));

  let create = ws.read_file(&format!("{}/proj_agt/1_datatrak_create_new_table_scripts.sql", BUNDLE))?;
  assert!(create.contains("-- create tables for '1.1-B2'"));

  let scriptlist = ws.read_file(&format!("{}/other_awb/scriptlist.txt", BUNDLE))?;
  assert_eq!(scriptlist, "-- other_awb: '2.0-b1' -> '2.1-B2'\n");

  let guide = ws.read_docx_text(DEPLOY_GUIDE)?;
  assert!(guide.contains(&format!("Release folder: {}", BUNDLE)));
  assert!(guide.contains("Release 42"));

  let log = ws.read_file("bgt_release.log")?;
  assert!(log.contains("Created the deployment guide"));

  Ok(())
}

#[test]
fn test_descriptor_files_win_over_tags() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("datatrak_bgt_agt/version.txt", "old_version=3.0-b1\nnew_version=3.1-b2\n")?;
  ws.write_file("datatrak_bgt_awb/version.txt", "old_version=4.0-b1\nnew_version=4.1-b2\n")?;

  let output = run_bgt_release(
    &ws.path,
    &["7", "--json", "proj/tables/t1.sql", PREVIOUS_TAG, CURRENT_TAG],
  )?;
  let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(summary["mode"], "descriptor");
  assert_eq!(summary["versions"]["agt"]["new"], "3.1-B2");
  assert_eq!(summary["versions"]["awb"]["old"], "4.0-b1");

  assert!(ws.file_exists("release/AWB_4.1-B2_AGT_3.1-B2/proj_agt"));
  assert!(!ws.file_exists(BUNDLE));
  Ok(())
}

#[test]
fn test_unmapped_directory_is_skipped_with_warning() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("db/unknown_dir/x.sql", "SELECT 1;")?;

  let output = run_bgt_release(&ws.path, &["42", "db/unknown_dir/x.sql", PREVIOUS_TAG, CURRENT_TAG])?;
  let stderr = String::from_utf8_lossy(&output.stderr);
  let warnings = stderr.lines().filter(|line| line.contains("unknown_dir")).count();
  assert_eq!(warnings, 1, "stderr: {}", stderr);

  for db in ["proj_agt", "other_awb"] {
    for file in TestWorkspace::release_files() {
      let content = ws.read_file(&format!("{}/{}/{}", BUNDLE, db, file))?;
      assert!(!content.contains("SELECT 1;"));
    }
  }

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Skipped db/unknown_dir/x.sql"));
  Ok(())
}

#[test]
fn test_utf16_source_is_converted() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let mut bytes = vec![0xFF, 0xFE];
  for unit in "CREATE VIEW v_café AS SELECT 1;".encode_utf16() {
    bytes.extend_from_slice(&unit.to_le_bytes());
  }
  ws.write_file("other/views/v1.sql", bytes)?;

  run_bgt_release(&ws.path, &["42", "other/views/v1.sql", PREVIOUS_TAG, CURRENT_TAG])?;

  let views = ws.read_file(&format!("{}/other_awb/5_datatrak_views_scripts.sql", BUNDLE))?;
  assert!(views.ends_with("CREATE VIEW v_café AS SELECT 1;\n\n"));
  Ok(())
}

#[test]
fn test_missing_version_information_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("proj/tables/t1.sql", "CREATE TABLE t1 (id INT);")?;

  let output = run_bgt_release_raw(&ws.path, &["42", "proj/tables/t1.sql"])?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No version information"), "stderr: {}", stderr);
  assert!(!ws.file_exists("release"));
  Ok(())
}

#[test]
fn test_malformed_tag_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let output = run_bgt_release_raw(&ws.path, &["42", "proj/tables/t1.sql", "AGT_1.0", "AGT_1.1_and_AWB_2.1"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(!ws.file_exists("release"));
  Ok(())
}

#[test]
fn test_no_items_is_usage_error() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let output = run_bgt_release_raw(&ws.path, &["42"])?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("Usage: bgt-release"));
  Ok(())
}

#[test]
fn test_missing_header_template_is_system_error() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::remove_file(ws.path.join("file_templates/default_header.txt"))?;

  let output = run_bgt_release_raw(&ws.path, &["42", "proj/tables/t1.sql", PREVIOUS_TAG, CURRENT_TAG])?;
  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("sql-files-written"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_dry_run_writes_nothing() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("proj/stored_procedures/sp1.sql", "CREATE PROCEDURE sp1 AS SELECT 1;")?;

  let output = run_bgt_release(
    &ws.path,
    &["42", "--dry-run", "proj/stored_procedures/sp1.sql", PREVIOUS_TAG, CURRENT_TAG],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains(BUNDLE));
  assert!(stdout.contains("proj_agt/6_datatrak_sp_scripts.sql"));

  let output = run_bgt_release(
    &ws.path,
    &["42", "--dry-run", "--json", "proj/stored_procedures/sp1.sql", PREVIOUS_TAG, CURRENT_TAG],
  )?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(plan["mode"], "tags");
  assert_eq!(plan["files"][0]["route"]["directory"], "stored_procedures");

  assert!(!ws.file_exists("release"));
  assert!(!ws.file_exists(DEPLOY_GUIDE));
  assert!(!ws.file_exists("bgt_release.log"));
  Ok(())
}

#[test]
fn test_rerun_regenerates_release_files() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("proj/stored_procedures/sp1.sql", "CREATE PROCEDURE sp1 AS SELECT 1;")?;
  let args = ["42", "proj/stored_procedures/sp1.sql", PREVIOUS_TAG, CURRENT_TAG];

  run_bgt_release(&ws.path, &args)?;
  run_bgt_release(&ws.path, &args)?;

  // release files are rewritten from their header before the copy step
  let sp = ws.read_file(&format!("{}/proj_agt/6_datatrak_sp_scripts.sql", BUNDLE))?;
  assert_eq!(sp.matches("CREATE PROCEDURE sp1").count(), 1);
  Ok(())
}
