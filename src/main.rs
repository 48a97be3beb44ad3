//! # auth-config-check
//!
//! Validates a gateway authentication document before deployment. Exits 0 when
//! every strategy and authentication entry is valid, 1 otherwise, listing each
//! violation with its path in the document.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use gateway_auth_config::loader::load_and_validate;
use gateway_auth_config::{AuthConfigError, AuthConfigValidator, RegisteredMiddlewareValidator};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Parser)]
#[command(name = "auth-config-check")]
#[command(about = "Validate an API gateway authentication document", version)]
struct Cli {
    /// Path to the document (.json for JSON, anything else is read as YAML)
    #[arg(env = "AUTH_CONFIG_PATH", default_value = "config/authentication.yaml")]
    path: PathBuf,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Middleware names references may point at; repeat for each. When omitted,
    /// any reference is accepted.
    #[arg(long = "middleware")]
    middleware: Vec<String>,
}

fn init_logging(format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gateway_auth_config=info,auth_config_check=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().with_target(true).json())
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let validator = if cli.middleware.is_empty() {
        AuthConfigValidator::new()
    } else {
        AuthConfigValidator::with_middleware_validator(Arc::new(
            RegisteredMiddlewareValidator::new(cli.middleware.iter().cloned()),
        ))
    };

    info!(path = %cli.path.display(), "Validating authentication document");

    match load_and_validate(&cli.path, &validator).await {
        Ok(document) => {
            for (name, strategy) in &document.strategies {
                info!(strategy = %name, kind = %strategy.kind(), "Strategy ok");
            }
            info!(
                strategies = document.strategies.len(),
                entries = document.authentication.len(),
                "Authentication document is valid"
            );
            Ok(())
        }
        Err(AuthConfigError::Validation(err)) => {
            for violation in &err.violations {
                error!(
                    path = %violation.path,
                    code = violation.kind.code(),
                    "{}",
                    violation.kind
                );
            }
            error!(violations = err.violations.len(), "Authentication document is invalid");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
