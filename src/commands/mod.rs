//! CLI commands for bgt-release

pub mod release;

pub use release::{ReleaseArgs, run_release};
