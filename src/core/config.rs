use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for bgt-release
/// Searched in order: release.toml, .release.toml, .config/release.toml.
/// Every field falls back to the built-in defaults, so running without a
/// config file reproduces the standard datatrak layout.
///
/// # Example
///
/// ```toml
/// databases = ["datatrak_bgt_agt", "datatrak_bgt_awb"]
///
/// [paths]
/// release_root = "release"
/// template_dir = "/app/file_templates"
///
/// [mapping]
/// stored_procedures = "6_datatrak_sp_scripts.sql"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
  /// Database directory names; one release directory is created per name
  pub databases: Vec<String>,
  /// Static files copied (with placeholders resolved) into every release directory
  pub templates: Vec<String>,
  pub paths: PathsConfig,
  pub version_files: VersionFilesConfig,
  pub sql: SqlConfig,
  /// Changed-file parent directory name -> release SQL file name
  pub mapping: BTreeMap<String, String>,
  pub deploy_guide: DeployGuideConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
  pub release_root: PathBuf,
  pub template_dir: PathBuf,
  /// Run log, truncated on every run
  pub log_file: PathBuf,
}

impl Default for PathsConfig {
  fn default() -> Self {
    Self {
      release_root: PathBuf::from("release"),
      template_dir: PathBuf::from("file_templates"),
      log_file: PathBuf::from("bgt_release.log"),
    }
  }
}

/// Version descriptor files (`old_version=` / `new_version=` lines)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionFilesConfig {
  pub agt: PathBuf,
  pub awb: PathBuf,
}

impl Default for VersionFilesConfig {
  fn default() -> Self {
    Self {
      agt: PathBuf::from("./datatrak_bgt_agt/version.txt"),
      awb: PathBuf::from("./datatrak_bgt_awb/version.txt"),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
  /// Numbered SQL release files generated in every release directory
  pub release_files: Vec<String>,
  /// The release file that gets the with-create header
  pub create_table_file: String,
  /// Header template names, resolved against `paths.template_dir`
  pub default_header: String,
  pub create_header: String,
}

impl Default for SqlConfig {
  fn default() -> Self {
    Self {
      release_files: [
        CREATE_TABLE_FILE,
        "2_datatrak_alter_table_scripts.sql",
        "3_datatrak_functions_scripts.sql",
        "4_datatrak_triggers_scripts.sql",
        "5_datatrak_views_scripts.sql",
        "6_datatrak_sp_scripts.sql",
        "7_new_datatrak_data_insertion_scripts.sql",
      ]
      .iter()
      .map(|s| s.to_string())
      .collect(),
      create_table_file: CREATE_TABLE_FILE.to_string(),
      default_header: "default_header.txt".to_string(),
      create_header: "defalt_header_with_create.txt".to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployGuideConfig {
  /// Document template name, resolved against `paths.template_dir`
  pub template: String,
  /// Where the filled document is written (relative to the working directory)
  pub output: PathBuf,
}

impl Default for DeployGuideConfig {
  fn default() -> Self {
    Self {
      template: DEPLOY_GUIDE.to_string(),
      output: PathBuf::from(DEPLOY_GUIDE),
    }
  }
}

const CREATE_TABLE_FILE: &str = "1_datatrak_create_new_table_scripts.sql";
const DEPLOY_GUIDE: &str = "BGT MsSQL DBs Release Deployment Guide.docx";

fn default_mapping() -> BTreeMap<String, String> {
  [
    ("tables", CREATE_TABLE_FILE),
    ("alter_table", "2_datatrak_alter_table_scripts.sql"),
    ("index", "2_datatrak_alter_table_scripts.sql"),
    ("functions", "3_datatrak_functions_scripts.sql"),
    ("triggers", "4_datatrak_triggers_scripts.sql"),
    ("views", "5_datatrak_views_scripts.sql"),
    ("stored_procedures", "6_datatrak_sp_scripts.sql"),
    ("insert_statements", "7_new_datatrak_data_insertion_scripts.sql"),
  ]
  .iter()
  .map(|(dir, file)| (dir.to_string(), file.to_string()))
  .collect()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      databases: vec!["datatrak_bgt_agt".to_string(), "datatrak_bgt_awb".to_string()],
      templates: vec![
        "__DO_IT.bat_txt".to_string(),
        "scriptlist.txt".to_string(),
        "8_permission_datatrak_scripts.sql".to_string(),
        "9_new_datatrak_mis_version_update_scripts.sql".to_string(),
      ],
      paths: PathsConfig::default(),
      version_files: VersionFilesConfig::default(),
      sql: SqlConfig::default(),
      mapping: default_mapping(),
      deploy_guide: DeployGuideConfig::default(),
    }
  }
}

/// Header template paths keyed by kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlHeaderPaths {
  pub default: PathBuf,
  pub with_create: PathBuf,
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(dir: &Path) -> Option<PathBuf> {
    let candidates = [
      dir.join("release.toml"),
      dir.join(".release.toml"),
      dir.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config from an explicit path, or search `dir`, or fall back to defaults
  pub fn load(explicit: Option<&Path>, dir: &Path) -> ReleaseResult<Self> {
    let config_path = match explicit {
      Some(path) if !path.is_file() => {
        return Err(ConfigError::NotFound {
          path: path.to_path_buf(),
        }
        .into());
      }
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(dir) {
        Some(path) => path,
        None => {
          tracing::info!("No release.toml found in {}, using built-in defaults", dir.display());
          return Ok(Self::default());
        }
      },
    };

    let content = fs::read_to_string(&config_path)
      .map_err(|e| ReleaseError::io(&config_path, e))
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;

    tracing::info!("Loaded configuration from {}", config_path.display());
    Ok(config)
  }

  /// Parse and validate config content
  pub fn parse(content: &str) -> ReleaseResult<Self> {
    let config: ReleaseConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate cross-field consistency
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.databases.is_empty() {
      return Err(
        ConfigError::MissingField {
          field: "databases".to_string(),
        }
        .into(),
      );
    }

    let mut seen = HashSet::new();
    for name in &self.databases {
      if name.trim().is_empty() {
        return Err(invalid("databases", "database names must not be empty"));
      }
      if !seen.insert(name.as_str()) {
        return Err(invalid("databases", format!("database '{}' is listed twice", name)));
      }
    }

    if self.sql.release_files.is_empty() {
      return Err(
        ConfigError::MissingField {
          field: "sql.release_files".to_string(),
        }
        .into(),
      );
    }

    if !self.sql.release_files.contains(&self.sql.create_table_file) {
      return Err(invalid(
        "sql.create_table_file",
        format!("'{}' is not one of sql.release_files", self.sql.create_table_file),
      ));
    }

    for (directory, file) in &self.mapping {
      if !self.sql.release_files.contains(file) {
        return Err(invalid(
          &format!("mapping.{}", directory),
          format!("'{}' is not one of sql.release_files", file),
        ));
      }
    }

    Ok(())
  }

  /// Apply command-line overrides on top of the loaded config
  pub fn with_overrides(
    mut self,
    release_root: Option<PathBuf>,
    template_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
  ) -> Self {
    if let Some(root) = release_root {
      self.paths.release_root = root;
    }
    if let Some(dir) = template_dir {
      self.paths.template_dir = dir;
    }
    if let Some(log) = log_file {
      self.paths.log_file = log;
    }
    self
  }

  /// Resolve a template name against the template directory
  pub fn template_path(&self, name: &str) -> PathBuf {
    self.paths.template_dir.join(name)
  }

  pub fn header_paths(&self) -> SqlHeaderPaths {
    SqlHeaderPaths {
      default: self.template_path(&self.sql.default_header),
      with_create: self.template_path(&self.sql.create_header),
    }
  }

  pub fn deploy_guide_template(&self) -> PathBuf {
    self.template_path(&self.deploy_guide.template)
  }
}

fn invalid(field: &str, reason: impl Into<String>) -> ReleaseError {
  ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.into(),
  }
  .into()
}
