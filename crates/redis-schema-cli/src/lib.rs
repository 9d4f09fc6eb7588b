//! # Redis Schema CLI
//!
//! Command-line front end for [`redis_schema_core`]. Reads JSON, YAML or
//! TOML documents, validates them as Cloud Redis v1 messages and reports
//! every violation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use redis_schema_cli::{run_cli, SchemaCli};
//!
//! fn main() {
//!     let cli = SchemaCli::parse();
//!     let exit_code = run_cli(cli);
//!     std::process::exit(exit_code.into());
//! }
//! ```

pub mod cli;
pub mod error;

pub use cli::{DocumentKind, ExitCode, OutputFormat, SchemaCli, SchemaCommands};
pub use error::CliError;

/// Run the CLI and map failures to exit codes
pub fn run_cli(cli: SchemaCli) -> ExitCode {
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}
