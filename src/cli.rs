//! CLI surface: clap declarations, route table, and presentation helpers.

pub mod parse;
pub mod presentation;
pub mod route;

pub use parse::Cli;
pub use route::RunContext;
