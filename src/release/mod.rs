//! Release bundle assembly
//!
//! Everything that lands on disk for a release:
//!
//! - **layout**: `<release_root>/AWB_<newAWB>_AGT_<newAGT>/<database>` directories
//! - **placeholders**: the substitution protocol shared by generated files
//! - **generate**: numbered SQL release files and static templates
//! - **copy**: changed SQL sources appended to their release file
//! - **document**: the filled deployment guide

pub mod copy;
pub mod document;
pub mod generate;
pub mod layout;
pub mod placeholders;

pub use copy::{CopyReport, FileRoute, SkipReason, copy_changed_files_into_release_files};
pub use document::generate_deploy_guide_document;
pub use generate::{SqlHeaders, generate_release_files, generate_template_files};
pub use layout::{create_release_directories, release_bundle_path};
pub use placeholders::Substitutions;
