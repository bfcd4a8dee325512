//! Error types for bgt-release with contextual messages and exit codes
//!
//! Every failure the release run can hit is categorized here so the binary can
//! print a single readable message, an optional hint, and exit with a code that
//! separates operator mistakes from environment problems.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for bgt-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (invocation, config, version data, database names)
  User = 1,
  /// System error (I/O, encodings, document template)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for bgt-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Bad invocation, detected before the run starts
  Usage { message: String },

  /// File missing, unreadable or unwritable
  Io { path: PathBuf, source: io::Error },

  /// No viable character encoding could be guessed for a file
  Detection { path: PathBuf },

  /// File bytes are malformed under the detected encoding
  Decode { path: PathBuf, encoding: &'static str },

  /// Malformed version tag or version descriptor
  VersionParse { input: String, reason: String },

  /// Database directory name matches neither `agt` nor `awb`
  UnknownDatabase { name: String },

  /// Changed file lives in a directory with no release file mapping
  MappingMiss { path: PathBuf, directory: String },

  /// Configuration errors
  Config(ConfigError),

  /// Deployment guide template could not be loaded or rewritten
  Document { path: PathBuf, message: String },

  /// Another error with the step that produced it
  Context { context: String, source: Box<ReleaseError> },

  /// Generic error with message and optional help
  Message { message: String, help: Option<String> },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      help: Some(help.into()),
    }
  }

  /// Create a usage error
  pub fn usage(msg: impl Into<String>) -> Self {
    ReleaseError::Usage { message: msg.into() }
  }

  /// Wrap an I/O error with the path it happened on
  pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    ReleaseError::Io {
      path: path.into(),
      source,
    }
  }

  /// Create a version parsing error
  pub fn version_parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
    ReleaseError::VersionParse {
      input: input.into(),
      reason: reason.into(),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    ReleaseError::Context {
      context: ctx.into(),
      source: Box::new(self),
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Usage { .. } => ExitCode::User,
      ReleaseError::Io { .. } => ExitCode::System,
      ReleaseError::Detection { .. } => ExitCode::System,
      ReleaseError::Decode { .. } => ExitCode::System,
      ReleaseError::VersionParse { .. } => ExitCode::User,
      ReleaseError::UnknownDatabase { .. } => ExitCode::User,
      ReleaseError::MappingMiss { .. } => ExitCode::User,
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Document { .. } => ExitCode::System,
      ReleaseError::Context { source, .. } => source.exit_code(),
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Usage { .. } => {
        Some("Usage: bgt-release <RELEASE_NUMBER> <CHANGED_FILE>... [<PREVIOUS_TAG> <CURRENT_TAG>]".to_string())
      }
      ReleaseError::VersionParse { .. } => Some(
        "Version tags look like AGT_<version>_and_AWB_<version>; version files need old_version= and new_version= lines."
          .to_string(),
      ),
      ReleaseError::UnknownDatabase { .. } => {
        Some("Database directory names must contain 'agt' or 'awb' (see `databases` in release.toml).".to_string())
      }
      ReleaseError::MappingMiss { .. } => {
        Some("Add the directory to the [mapping] table in release.toml to include it in the release.".to_string())
      }
      ReleaseError::Detection { .. } | ReleaseError::Decode { .. } => {
        Some("Save the file as UTF-8 (or UTF-16 with a byte-order mark) and re-run.".to_string())
      }
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Context { source, .. } => source.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Usage { message } => write!(f, "{}", message),
      ReleaseError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
      ReleaseError::Detection { path } => write!(f, "Unable to detect the encoding of {}", path.display()),
      ReleaseError::Decode { path, encoding } => {
        write!(f, "Unable to decode {} as {}", path.display(), encoding)
      }
      ReleaseError::VersionParse { input, reason } => {
        write!(f, "Cannot parse versions from '{}': {}", input, reason)
      }
      ReleaseError::UnknownDatabase { name } => write!(f, "Unknown database directory: {}", name),
      ReleaseError::MappingMiss { path, directory } => write!(
        f,
        "No release file mapped for directory '{}' (changed file {})",
        directory,
        path.display()
      ),
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Document { path, message } => {
        write!(f, "Deployment guide error for {}: {}", path.display(), message)
      }
      ReleaseError::Context { context, source } => write!(f, "{}\n{}", context, source),
      ReleaseError::Message { message, .. } => write!(f, "{}", message),
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io { source, .. } => Some(source),
      ReleaseError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit --config path does not exist
  NotFound { path: PathBuf },

  /// Missing or empty required field
  MissingField { field: String },

  /// Field present but inconsistent with the rest of the config
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Omit --config to use release.toml from the working directory or the built-in defaults.".to_string())
      }
      ConfigError::MissingField { field } => Some(format!("Set `{}` in release.toml.", field)),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Configuration file not found: {}", path.display()),
      ConfigError::MissingField { field } => write!(f, "Missing required field in config: {}", field),
      ConfigError::Invalid { field, reason } => write!(f, "Invalid config field '{}': {}", field, reason),
    }
  }
}

/// Result type alias for bgt-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
