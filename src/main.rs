use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use lp_portal::{
    AppState, build_app,
    config::{AppConfig, STARTER_CONFIG},
    db::DbPool,
    observability,
    services::OnboardingService,
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(version, about = "Fund admin console and LP portal", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "lp-portal.toml")]
    config: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the portal server (default)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Write a starter configuration file
    Init {
        /// Path to create the config file (defaults to the --config path)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create an admin profile for an existing identity provider user
    CreateAdmin {
        /// User id assigned by the identity provider
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => {
            run_init(output.unwrap_or(args.config), force);
        }
        Some(Command::Migrate) => {
            run_migrate(&args.config).await;
        }
        Some(Command::CreateAdmin { id, email }) => {
            run_create_admin(&args.config, id, &email).await;
        }
        Some(Command::Serve) | None => {
            run_server(&args.config).await;
        }
    }
}

/// Load config and install logging, or exit.
fn load_config(path: &PathBuf) -> (AppConfig, observability::TracingGuard) {
    let config = match AppConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    let guard = match observability::init_tracing(&config.observability) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(1);
        }
    };

    (config, guard)
}

async fn connect(config: &AppConfig) -> DbPool {
    match DbPool::from_config(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    }
}

fn run_init(output: PathBuf, force: bool) {
    if output.exists() && !force {
        eprintln!(
            "Config file already exists: {} (use --force to overwrite)",
            output.display()
        );
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&output, STARTER_CONFIG) {
        eprintln!("Failed to write config file: {e}");
        std::process::exit(1);
    }

    println!("Created configuration at: {}", output.display());
    println!("Set IDENTITY_URL and IDENTITY_API_KEY, then run `lp-portal serve`.");
}

async fn run_migrate(config_path: &PathBuf) {
    let (config, _guard) = load_config(config_path);
    let pool = connect(&config).await;

    if let Err(e) = pool.run_migrations().await {
        tracing::error!(error = %e, "Migration failed");
        std::process::exit(1);
    }
    pool.close().await;
}

async fn run_create_admin(config_path: &PathBuf, id: Uuid, email: &str) {
    let (config, _guard) = load_config(config_path);
    let state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize");
            std::process::exit(1);
        }
    };

    let onboarding: &OnboardingService = &state.services.onboarding;
    match onboarding.create_admin(id, email).await {
        Ok(profile) => {
            println!("Created admin profile {} <{}>", profile.id, profile.email);
        }
        Err(e) => {
            eprintln!("Failed to create admin profile: {e}");
            std::process::exit(1);
        }
    }
    state.db.close().await;
}

async fn run_server(config_path: &PathBuf) {
    let (config, _tracing_guard) = load_config(config_path);

    if let Err(e) = observability::metrics::init_metrics(&config.observability.metrics) {
        tracing::warn!(error = %e, "Failed to initialize metrics: {e}");
    }

    tracing::info!(config_file = %config_path.display(), "Starting LP portal");

    if !config.session.secure {
        tracing::warn!(
            "Session cookies are not marked Secure. Only use this for local development over plain HTTP."
        );
    }

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize application state");
            std::process::exit(1);
        }
    };
    let db = Arc::clone(&state.db);

    let app = build_app(&config, state);

    let addr = std::net::SocketAddr::from((config.server.host, config.server.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    db.close().await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
