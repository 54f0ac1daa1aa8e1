//! Command-line interface module.

mod args;
pub mod check;
pub mod publish;
pub mod register;

pub use args::{Cli, Commands, PublishArgs, RegisterArgs};

/// `1 bundle`, `3 bundles`.
pub fn plural(count: usize, noun: &str) -> String {
    let s = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{s}")
}
