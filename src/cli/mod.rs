//! Command-line interface module.

mod args;
pub mod inspect;
pub mod replay;

pub use args::{Cli, Commands};
