//! Integration tests driving the bgt-release binary

mod helpers;
mod test_config;
mod test_release;
