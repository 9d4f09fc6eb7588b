//! Redis schema validator CLI
//!
//! # Usage
//!
//! ```bash
//! # Validate a create request
//! redis-schema validate --kind create-request --input create.yaml
//!
//! # Split a resource name into its parts
//! redis-schema parse-name projects/p1/locations/us-east1/instances/cache1 --format json
//!
//! # Check an update mask
//! redis-schema update-mask displayName,memory_size_gb
//! ```
//!
//! # Exit Codes
//!
//! - 0: Document is valid
//! - 1: Document has violations
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 10: Internal error

use clap::Parser;
use redis_schema_cli::{run_cli, SchemaCli};
use tracing::Level;

fn main() {
    let cli = SchemaCli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
