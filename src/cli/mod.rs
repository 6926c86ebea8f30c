//! CLI module for depwait - command-line interface.
//!
//! Parses targets and retry overrides; everything else lives in the library.

pub mod args;

pub use args::Cli;
