//! Fleetwatch Server
//!
//! Authenticated fleet status API. Ingests the vehicle schedule once at
//! startup, then serves HTTP until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use fleetwatch_core::config::load_config_file;
use fleetwatch_core::tracing_init::init_tracing;
use fleetwatch_server::auth::JwtManager;
use fleetwatch_server::ingest::{Ingestor, ScheduleSource};
use fleetwatch_server::server::auth_svc::ensure_admin;
use fleetwatch_server::server::{AppState, build_router};
use fleetwatch_server::storage::FleetDatabase;

const SCHEDULE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "fleetwatch-server")]
#[command(version, about = "Fleetwatch server - fleet status API and schedule ingestion")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "FLEETWATCH_ADDR", default_value = "0.0.0.0:8081")]
    addr: SocketAddr,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Token signing secret. A random secret is generated when unset, which
    /// invalidates all tokens on restart.
    #[arg(long, env = "FLEETWATCH_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Token lifetime in seconds.
    #[arg(long, default_value_t = 3600)]
    token_ttl: i64,

    /// Remote schedule file. Overrides the config file.
    #[arg(long, env = "FLEETWATCH_SCHEDULE_URL")]
    schedule_url: Option<String>,

    /// Local copy of the schedule file.
    #[arg(long)]
    schedule_path: Option<PathBuf>,

    /// JSON config file (`{"FilesUrl": {"ReisaiUrl": "..."}}`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Create this admin at startup if the username is free.
    #[arg(long, env = "FLEETWATCH_ADMIN_USERNAME", requires = "admin_password")]
    admin_username: Option<String>,

    /// Password for the seeded admin.
    #[arg(long, env = "FLEETWATCH_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("fleetwatch_server=info,tower_http=info", args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        "Starting fleetwatch-server"
    );

    let file_config = match &args.config {
        Some(path) => match load_config_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(error = %e, "Ignoring config file");
                None
            }
        },
        None => None,
    };

    let db_path = match args.db_path {
        Some(path) => path,
        None => default_path("fleet.db")?,
    };
    info!(path = %db_path.display(), "Opening fleet database");
    let db = FleetDatabase::open(&db_path).await?;

    let jwt = match args.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
        Some(secret) => JwtManager::new(secret.as_bytes(), args.token_ttl)?,
        None => {
            warn!("No token secret configured; generated one for this run");
            JwtManager::new(&JwtManager::generate_secret(), args.token_ttl)?
        }
    };

    if let (Some(username), Some(password)) = (args.admin_username, args.admin_password)
        && ensure_admin(&db, &username, password).await?
    {
        info!(username = %username, "Seeded admin credential");
    }

    let source = ScheduleSource {
        url: args
            .schedule_url
            .or_else(|| file_config.as_ref()?.schedule_url().map(str::to_string)),
        local_path: match args.schedule_path {
            Some(path) => path,
            None => default_path("schedule.txt")?,
        },
        fetch_timeout: SCHEDULE_FETCH_TIMEOUT,
    };
    let report = Ingestor::new(source, db.clone()).run().await;
    info!(phase = %report.phase, "Schedule ingestion finished");

    let app = build_router(AppState {
        db,
        jwt: Arc::new(jwt),
    });
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, "Listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Server stopped");
    Ok(())
}

fn default_path(file: &str) -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".fleetwatch").join(file))
}
