mod app;
mod cache;
mod config;
mod handlers;
mod state;
mod storage;

use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clinica_auth::InMemoryUserDirectory;
use clinica_core::auth::{hash_password, UserAccount, DEFAULT_COST};
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app,
    config::{AdminAccount, Config},
    state::AppState,
};

/// Clinica - Clinic management backend
#[derive(Parser, Debug)]
#[command(name = "clinica")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a password from stdin and print its bcrypt hash (for ADMIN_PASSWORD_HASH)
    HashPassword {
        /// bcrypt cost
        #[arg(long, default_value_t = DEFAULT_COST, env = "PASSWORD_HASH_COST")]
        cost: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::HashPassword { cost }) = cli.command {
        return print_password_hash(cost);
    }

    init_tracing(cli.log_format);

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        server = %config.database.server,
        database = %config.database.name,
        auth_mode = %config.database.auth_mode,
        "Database settings (consultas are served from the in-memory repository)"
    );

    let roles = config.load_role_permissions()?;
    let users = Arc::new(InMemoryUserDirectory::new());
    seed_admin(&users, config.admin.as_ref()).await;

    let state = AppState::from_config(&config, users, roles)?;
    tracing::info!(
        max_entries = config.cache_max_entries.get(),
        default_ttl_secs = config.cache_ttls.default_ttl().as_secs(),
        session_timeout_secs = config.auth.session_timeout.as_secs(),
        max_login_attempts = config.auth.max_login_attempts,
        "Services initialized"
    );

    // Build the application router
    let app = create_app(state);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "clinica=debug,clinica_auth=debug,tower_http=debug".into()
            }),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

fn print_password_hash(cost: u32) -> Result<()> {
    let mut password = String::new();
    io::stdin()
        .lock()
        .read_line(&mut password)
        .context("failed to read password from stdin")?;

    let password = password.trim_end_matches(['\r', '\n']);
    anyhow::ensure!(!password.is_empty(), "password must not be empty");

    println!("{}", hash_password(password, cost)?);
    Ok(())
}

async fn seed_admin(users: &InMemoryUserDirectory, admin: Option<&AdminAccount>) {
    let Some(admin) = admin else {
        tracing::warn!("ADMIN_EMAIL / ADMIN_PASSWORD_HASH not set, no account can log in");
        return;
    };

    users
        .insert_user(UserAccount {
            id: 1,
            full_name: "Administrador".to_string(),
            email: admin.email.clone(),
            password_hash: admin.password_hash.clone(),
            role_id: 1,
            role_name: "administrador".to_string(),
            active: true,
        })
        .await;
    tracing::info!(email = %admin.email, "Seeded administrator account");
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
