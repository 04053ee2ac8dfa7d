//! Command-line interface and composition root.
//!
//! Every command resolves configuration the same way: environment file,
//! process environment, then the optional secrets overlay. `serve` and
//! `invoke` then build the same [`AppState`] and handler chain.
//!
//! # Commands
//!
//! - `serve`: run the always-on HTTP server
//! - `invoke`: handle a single gateway envelope read from a file or stdin
//! - `config`: print the resolved configuration with secrets masked
//!
//! # Example
//!
//! ```bash
//! landing-api serve --port 8080
//! landing-api invoke --event event.json --request-id local-1
//! echo '{"httpMethod":"GET","path":"/health"}' | landing-api invoke
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::WrapErr;
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapter::{Adapter, InvocationContext, InvocationEnvelope};
use crate::api::server::run_server;
use crate::app_state::AppState;
use crate::config::{self, Settings};
use crate::email::SmtpEmailSender;
use crate::observability;

/// Landing site backend
#[derive(Parser, Debug)]
#[command(name = "landing-api")]
#[command(about = "Backend API for the landing site", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the always-on HTTP server
    Serve {
        /// Port to listen on (default: LANDING_API_PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Handle one gateway invocation envelope
    Invoke {
        /// Envelope JSON file (default: read stdin)
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// Request id recorded in the invocation log
        #[arg(short, long)]
        request_id: Option<String>,
    },

    /// Print the resolved configuration
    Config,
}

/// Parse CLI arguments and execute the appropriate command.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the server fails, the
/// envelope cannot be read, or the handler chain faults during `invoke`.
pub async fn run() -> eyre::Result<()> {
    let cli = Cli::parse();

    let env_load = config::load_environment_config(&config::config_dir());
    let settings = Settings::from_env().wrap_err("invalid configuration")?;

    let _guard = init_logging(&settings)?;
    env_load.log();

    let settings = config::apply_secrets_overlay(settings).await;

    match cli.command {
        Commands::Serve { port } => run_serve_command(settings, port).await,
        Commands::Invoke { event, request_id } => {
            run_invoke_command(settings, event, request_id).await
        }
        Commands::Config => {
            print_settings(&settings);
            Ok(())
        }
    }
}

fn init_logging(settings: &Settings) -> eyre::Result<Option<WorkerGuard>> {
    let guard = observability::init_tracing(
        Some(settings.log_level().to_string()),
        settings.log_file().cloned(),
        settings.log_json(),
    )
    .wrap_err("failed to initialize tracing")?;
    Ok(guard)
}

fn build_state(settings: Settings) -> eyre::Result<AppState> {
    let mailer = SmtpEmailSender::from_settings(&settings).wrap_err("failed to configure SMTP")?;
    Ok(AppState::new(settings, Arc::new(mailer)))
}

/// Execute the serve command.
async fn run_serve_command(settings: Settings, port: Option<u16>) -> eyre::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or_else(|| settings.port())));
    let state = build_state(settings)?;

    run_server(state, addr).await?;
    Ok(())
}

/// Execute the invoke command and print the response envelope.
async fn run_invoke_command(
    settings: Settings,
    event: Option<PathBuf>,
    request_id: Option<String>,
) -> eyre::Result<()> {
    let raw = read_event(event.as_ref())?;
    let envelope: InvocationEnvelope =
        serde_json::from_str(&raw).wrap_err("event is not a valid invocation envelope")?;

    let context = request_id
        .or_else(|| envelope.request_id().map(str::to_string))
        .map_or_else(InvocationContext::default, InvocationContext::new);

    info!(request_id = %context.request_id, "Handling invocation");

    let adapter = Adapter::for_app(build_state(settings)?);
    let response = adapter.handle(envelope, &context).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn read_event(event: Option<&PathBuf>) -> eyre::Result<String> {
    match event {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .wrap_err("failed to read envelope from stdin")?;
            Ok(raw)
        }
    }
}

/// Display the resolved settings with colored formatting.
fn print_settings(settings: &Settings) {
    let cors = settings
        .cors_origins()
        .map_or_else(|| "(open)".to_string(), |origins| origins.join(", "));

    println!("{}", "Landing API configuration".cyan().bold());
    print_row("version", settings.version());
    print_row("debug", &settings.debug().to_string());
    print_row("port", &settings.port().to_string());
    print_row("path prefix", or_none(settings.path_prefix()));
    print_row(
        "rate limit",
        &format!(
            "{} per {}s",
            settings.rate_limit(),
            settings.rate_limit_window().as_secs()
        ),
    );
    print_row("rate limit bypass", &settings.rate_limit_bypass().join(", "));
    print_row("allowed hosts", &settings.allowed_hosts().join(", "));
    print_row("cors origins", &cors);
    print_row("log level", settings.log_level());
    print_row(
        "smtp",
        &format!(
            "{}:{} (tls: {})",
            settings.smtp_host(),
            settings.smtp_port(),
            settings.smtp_use_tls()
        ),
    );
    print_row("smtp username", settings.smtp_username().unwrap_or("(none)"));
    print_row(
        "smtp password",
        &settings.smtp_password().map_or_else(|| "(none)".to_string(), mask),
    );
    print_row("email from", settings.email_from());
    print_row("email to", settings.email_to());
}

fn print_row(label: &str, value: &str) {
    println!("  {:<18} {}", label.dimmed(), value.yellow());
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}

/// Mask a secret, keeping at most the first two characters.
fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(2).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_cli_parsing() {
        assert!(Cli::try_parse_from(["landing-api", "serve"]).is_ok());
        assert!(Cli::try_parse_from(["landing-api", "invoke"]).is_ok());
        assert!(Cli::try_parse_from(["landing-api", "config"]).is_ok());
        assert!(Cli::try_parse_from(["landing-api", "watch"]).is_err());
    }

    #[test]
    fn test_serve_command_with_port() {
        let cli = Cli::try_parse_from(["landing-api", "serve", "--port", "9000"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Serve { port: Some(9000) }
            })
        ));
    }

    #[test]
    fn test_invoke_command_with_event_and_request_id() {
        let cli = Cli::try_parse_from([
            "landing-api",
            "invoke",
            "--event",
            "event.json",
            "--request-id",
            "req-7",
        ]);

        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Invoke { ref event, ref request_id },
            }) if event.as_deref() == Some(Path::new("event.json"))
                && request_id.as_deref() == Some("req-7")
        ));
    }

    #[test]
    fn test_mask_hides_secrets() {
        assert_eq!(mask("hunter2-password"), "hu****");
        assert_eq!(mask("abc"), "****");
    }
}
