//! Entry point for the landing API binary.
//!
//! All orchestration lives in [`landing_api::cli`]: configuration loading,
//! tracing setup, state construction and command dispatch. This file only
//! starts the runtime and turns a failed command into a non-zero exit.

use landing_api::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        tracing::error!(error = %e, "Application error");
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}
