//! File I/O used by every release step
//!
//! - **encoding**: charset detection over a leading byte sample
//! - **io**: encoding-aware reads, best-effort UTF-8 writes and appends, literal substitution

pub mod encoding;
pub mod io;

pub use io::{append_text_converted, read_text, substitute, write_text};
