//! Release run orchestration
//!
//! A run walks a fixed sequence of states:
//!
//! ```text
//! Init -> ModeSelected -> VersionsResolved -> PathBuilt -> DirectoriesCreated
//!      -> TemplatesWritten -> DeployGuideWritten -> SqlFilesWritten
//!      -> SqlFilesCopied -> Done
//! ```
//!
//! Each transition consumes a [`RunContext`] and returns the next one. The
//! first failing step logs its stage and the run ends in the failed terminal
//! state, which is the `Err` returned by [`ReleasePipeline::advance`] (it names
//! the stage that failed); nothing is retried or rolled back. Everything up to `PathBuilt` is read-only, which is
//! what `--dry-run` relies on.

use crate::core::config::{ReleaseConfig, SqlHeaderPaths};
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::files::read_text;
use crate::release::{
  CopyReport, SqlHeaders, Substitutions, copy_changed_files_into_release_files, create_release_directories,
  generate_deploy_guide_document, generate_release_files, generate_template_files, release_bundle_path,
};
use crate::version::{DatabaseId, VersionSet, VersionSource, split_trailing_tags};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Stage of a release run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  Init,
  ModeSelected,
  VersionsResolved,
  PathBuilt,
  DirectoriesCreated,
  TemplatesWritten,
  DeployGuideWritten,
  SqlFilesWritten,
  SqlFilesCopied,
  Done,
}

impl RunState {
  /// The state a successful step leads to
  pub fn next(self) -> Option<Self> {
    use RunState::*;
    match self {
      Init => Some(ModeSelected),
      ModeSelected => Some(VersionsResolved),
      VersionsResolved => Some(PathBuilt),
      PathBuilt => Some(DirectoriesCreated),
      DirectoriesCreated => Some(TemplatesWritten),
      TemplatesWritten => Some(DeployGuideWritten),
      DeployGuideWritten => Some(SqlFilesWritten),
      SqlFilesWritten => Some(SqlFilesCopied),
      SqlFilesCopied => Some(Done),
      Done => None,
    }
  }

  pub fn is_terminal(self) -> bool {
    self.next().is_none()
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      RunState::Init => "init",
      RunState::ModeSelected => "mode-selected",
      RunState::VersionsResolved => "versions-resolved",
      RunState::PathBuilt => "path-built",
      RunState::DirectoriesCreated => "directories-created",
      RunState::TemplatesWritten => "templates-written",
      RunState::DeployGuideWritten => "deploy-guide-written",
      RunState::SqlFilesWritten => "sql-files-written",
      RunState::SqlFilesCopied => "sql-files-copied",
      RunState::Done => "done",
    };
    f.write_str(name)
  }
}

/// Per-run state, replaced (never mutated) on every transition
#[derive(Debug, Clone)]
pub struct RunContext {
  pub state: RunState,
  pub release_number: String,
  /// Raw positional items after the release number
  pub items: Vec<String>,
  /// Changed files in input order
  pub changed_files: Vec<PathBuf>,
  pub source: Option<VersionSource>,
  pub versions: Option<VersionSet>,
  /// Bundle path as configured (relative to the working directory unless absolute)
  pub release_path: Option<PathBuf>,
  pub release_dirs: Vec<PathBuf>,
  /// Files generated so far
  pub written: Vec<PathBuf>,
  pub deploy_guide: Option<PathBuf>,
  pub copy_report: Option<CopyReport>,
}

impl RunContext {
  pub fn new(release_number: impl Into<String>, items: Vec<String>) -> Self {
    Self {
      state: RunState::Init,
      release_number: release_number.into(),
      items,
      changed_files: Vec::new(),
      source: None,
      versions: None,
      release_path: None,
      release_dirs: Vec::new(),
      written: Vec::new(),
      deploy_guide: None,
      copy_report: None,
    }
  }

  fn versions(&self) -> ReleaseResult<&VersionSet> {
    self
      .versions
      .as_ref()
      .ok_or_else(|| ReleaseError::message(format!("Versions are not resolved at stage '{}'", self.state)))
  }

  fn release_path(&self) -> ReleaseResult<&Path> {
    self
      .release_path
      .as_deref()
      .ok_or_else(|| ReleaseError::message(format!("Release path is not built at stage '{}'", self.state)))
  }

  fn with_written(&self, files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut written = self.written.clone();
    written.extend(files);
    written
  }
}

/// What a completed run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub release_number: String,
  pub mode: &'static str,
  pub versions: VersionSet,
  pub release_path: PathBuf,
  pub release_dirs: Vec<PathBuf>,
  pub written: Vec<PathBuf>,
  pub deploy_guide: Option<PathBuf>,
  pub copy_report: CopyReport,
}

impl TryFrom<RunContext> for RunSummary {
  type Error = ReleaseError;

  fn try_from(ctx: RunContext) -> ReleaseResult<Self> {
    if ctx.state != RunState::Done {
      return Err(ReleaseError::message(format!("Run stopped at stage '{}'", ctx.state)));
    }
    let (Some(source), Some(versions), Some(release_path)) = (ctx.source, ctx.versions, ctx.release_path) else {
      return Err(ReleaseError::message("Completed run is missing its versions or release path"));
    };

    Ok(Self {
      release_number: ctx.release_number,
      mode: source.mode(),
      versions,
      release_path,
      release_dirs: ctx.release_dirs,
      written: ctx.written,
      deploy_guide: ctx.deploy_guide,
      copy_report: ctx.copy_report.unwrap_or_default(),
    })
  }
}

/// Drives a run against one configuration and working directory
pub struct ReleasePipeline<'a> {
  config: &'a ReleaseConfig,
  workdir: PathBuf,
}

impl<'a> ReleasePipeline<'a> {
  pub fn new(config: &'a ReleaseConfig, workdir: impl Into<PathBuf>) -> Self {
    Self {
      config,
      workdir: workdir.into(),
    }
  }

  /// Run every stage to `Done`
  pub fn execute(&self, release_number: &str, items: Vec<String>) -> ReleaseResult<RunSummary> {
    let ctx = self.run_until(RunContext::new(release_number, items), RunState::Done)?;
    RunSummary::try_from(ctx)
  }

  /// Resolve everything a run needs without touching disk
  pub fn plan(&self, release_number: &str, items: Vec<String>) -> ReleaseResult<RunContext> {
    self.run_until(RunContext::new(release_number, items), RunState::PathBuilt)
  }

  /// Advance until `target` (or a terminal state) is reached
  pub fn run_until(&self, mut ctx: RunContext, target: RunState) -> ReleaseResult<RunContext> {
    while ctx.state != target && !ctx.state.is_terminal() {
      ctx = self.advance(ctx)?;
    }
    Ok(ctx)
  }

  /// Perform the single step out of `ctx.state`
  pub fn advance(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    let Some(next) = ctx.state.next() else {
      return Ok(ctx);
    };
    let from = ctx.state;

    match self.step(ctx) {
      Ok(ctx) => {
        tracing::debug!("Release run: {} -> {}", from, next);
        Ok(ctx)
      }
      Err(err) => {
        tracing::error!("Release run failed at stage '{}' (from '{}'): {}", next, from, err);
        Err(err.context(format!("Release step '{}' failed", next)))
      }
    }
  }

  fn step(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    match ctx.state {
      RunState::Init => self.select_mode(ctx),
      RunState::ModeSelected => self.resolve_versions(ctx),
      RunState::VersionsResolved => self.build_path(ctx),
      RunState::PathBuilt => self.create_directories(ctx),
      RunState::DirectoriesCreated => self.write_templates(ctx),
      RunState::TemplatesWritten => self.write_deploy_guide(ctx),
      RunState::DeployGuideWritten => self.write_sql_files(ctx),
      RunState::SqlFilesWritten => self.copy_changed_files(ctx),
      RunState::SqlFilesCopied => Ok(RunContext {
        state: RunState::Done,
        ..ctx
      }),
      RunState::Done => Ok(ctx),
    }
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    self.workdir.join(path)
  }

  fn select_mode(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    if ctx.items.is_empty() {
      return Err(ReleaseError::usage("Expected at least one changed file or version tag"));
    }

    let (changed, tags) = split_trailing_tags(&ctx.items, |item| self.resolve(Path::new(item)).is_file());
    let descriptors = self.read_descriptors().context("Failed to read the AGT/AWB version files")?;
    let source = VersionSource::select(descriptors, tags)?;

    tracing::info!("Version mode: {} ({} changed file(s))", source.mode(), changed.len());

    Ok(RunContext {
      state: RunState::ModeSelected,
      changed_files: changed.into_iter().map(PathBuf::from).collect(),
      source: Some(source),
      ..ctx
    })
  }

  /// Both descriptor contents, if both version files exist
  fn read_descriptors(&self) -> ReleaseResult<Option<(String, String)>> {
    let agt = self.resolve(&self.config.version_files.agt);
    let awb = self.resolve(&self.config.version_files.awb);
    if !agt.is_file() || !awb.is_file() {
      tracing::debug!("Version files not found, versions come from tags");
      return Ok(None);
    }

    Ok(Some((read_descriptor(&agt)?, read_descriptor(&awb)?)))
  }

  fn resolve_versions(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    let source = ctx
      .source
      .as_ref()
      .ok_or_else(|| ReleaseError::message("Version source was not selected"))?;
    let versions = source.resolve()?;

    for id in [DatabaseId::Agt, DatabaseId::Awb] {
      let pair = versions.get(id);
      tracing::info!("{} version: {} -> {}", id.as_str().to_uppercase(), pair.old, pair.new);
    }

    Ok(RunContext {
      state: RunState::VersionsResolved,
      versions: Some(versions),
      ..ctx
    })
  }

  fn build_path(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    let release_path = release_bundle_path(&self.config.paths.release_root, ctx.versions()?);
    tracing::info!("Release path: {}", release_path.display());

    Ok(RunContext {
      state: RunState::PathBuilt,
      release_path: Some(release_path),
      ..ctx
    })
  }

  fn create_directories(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    let bundle = self.resolve(ctx.release_path()?);
    let release_dirs = create_release_directories(&bundle, &self.config.databases)?;

    Ok(RunContext {
      state: RunState::DirectoriesCreated,
      release_dirs,
      ..ctx
    })
  }

  fn write_templates(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    let mut written = Vec::new();
    {
      let subs = Substitutions::new(ctx.versions()?);
      for name in &self.config.templates {
        let template = self.resolve(&self.config.template_path(name));
        written.extend(generate_template_files(&ctx.release_dirs, &template, name, &subs)?);
      }
    }

    Ok(RunContext {
      state: RunState::TemplatesWritten,
      written: ctx.with_written(written),
      ..ctx
    })
  }

  fn write_deploy_guide(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    let label = ctx.release_path()?.display().to_string();
    let template = self.resolve(&self.config.deploy_guide_template());
    let output = self.resolve(&self.config.deploy_guide.output);

    let saved = generate_deploy_guide_document(&ctx.release_number, &label, &template, &output)?;

    Ok(RunContext {
      state: RunState::DeployGuideWritten,
      deploy_guide: saved.then_some(output),
      ..ctx
    })
  }

  fn write_sql_files(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    let paths = self.config.header_paths();
    let headers = SqlHeaders::load(&SqlHeaderPaths {
      default: self.resolve(&paths.default),
      with_create: self.resolve(&paths.with_create),
    })?;

    let written = {
      let subs = Substitutions::new(ctx.versions()?);
      generate_release_files(
        &ctx.release_dirs,
        &self.config.sql.release_files,
        &self.config.sql.create_table_file,
        &headers,
        &subs,
      )?
    };

    Ok(RunContext {
      state: RunState::SqlFilesWritten,
      written: ctx.with_written(written),
      ..ctx
    })
  }

  fn copy_changed_files(&self, ctx: RunContext) -> ReleaseResult<RunContext> {
    let report = copy_changed_files_into_release_files(
      &ctx.changed_files,
      &self.workdir,
      &ctx.release_dirs,
      &self.config.mapping,
    );

    if !report.skipped.is_empty() {
      tracing::warn!("{} changed file(s) left out of the release", report.skipped.len());
    }

    Ok(RunContext {
      state: RunState::SqlFilesCopied,
      copy_report: Some(report),
      ..ctx
    })
  }
}

/// Version file content; an empty file reads as empty text so mode selection
/// can fall back to the tags
fn read_descriptor(path: &Path) -> ReleaseResult<String> {
  let len = std::fs::metadata(path).map_err(|e| ReleaseError::io(path, e))?.len();
  if len == 0 {
    tracing::warn!("Version file {} is empty", path.display());
    return Ok(String::new());
  }
  read_text(path)
}
