//! Command-line interface for generating corpora, verifying candidates, and
//! reconstructing oracle paths.

mod commands;

pub use commands::{
    AlgorithmArg, Cli, CliError, Command, ExecutionSummary, GenerateCommand, PathCommand,
    VerifyCommand, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
