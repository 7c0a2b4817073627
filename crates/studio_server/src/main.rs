use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use studio_core::SystemClock;
use studio_database::{PostgresStore, create_pool, run_migrations};
use studio_error::DatabaseError;
use studio_interface::UsageStore;
use studio_quota::{QuotaService, StudioConfig};
use studio_server::{
    AdminKey, ApiState, LemonfoxClient, Secrets, TokenIssuer, create_router, init_logging, serve,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Studio voice-generation API", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the layered lookup)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overrides `server.bind`
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Register a Free account
    CreateAccount {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Print an access token for an existing account
    IssueToken {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StudioConfig::from_file(path),
        None => StudioConfig::load(),
    }
    .context("loading configuration")?;
    init_logging(&config.logging)?;

    let secrets = Secrets::from_env()?;

    match cli.command {
        Commands::Serve { bind } => run_server(config, secrets, bind).await,
        Commands::Migrate => {
            let pool = create_pool(&secrets.database_url, 1)?;
            let mut conn = pool.get().map_err(DatabaseError::from)?;
            run_migrations(&mut conn)?;
            info!("Migrations applied");
            Ok(())
        }
        Commands::CreateAccount { name, email } => {
            let pool = create_pool(&secrets.database_url, 1)?;
            let profile = PostgresStore::new(pool).create_account(&name, &email).await?;
            println!("Created account {} <{}>", profile.id(), profile.email());
            Ok(())
        }
        Commands::IssueToken { email } => {
            let issuer =
                TokenIssuer::new(secrets.jwt_secret.as_bytes(), config.server.token_ttl_minutes)?;
            println!("{}", issuer.issue(&email)?);
            Ok(())
        }
    }
}

async fn run_server(config: StudioConfig, secrets: Secrets, bind: Option<String>) -> Result<()> {
    let pool = create_pool(&secrets.database_url, config.server.pool_size)?;
    {
        let mut conn = pool.get().map_err(DatabaseError::from)?;
        run_migrations(&mut conn)?;
    }
    let store = Arc::new(PostgresStore::new(pool));

    let synthesizer = LemonfoxClient::new(&config.synthesis, secrets.lemonfox_api_key)?;
    if !synthesizer.is_configured() {
        warn!("LEMONFOX_API_KEY is not set, voice generation will be unavailable");
    }
    let admin_key = secrets.admin_key.as_deref().map(AdminKey::new);
    if admin_key.is_none() {
        warn!("STUDIO_ADMIN_KEY is not set, admin routes are disabled");
    }

    let usage: Arc<dyn UsageStore> = store.clone();
    let quota = Arc::new(QuotaService::new(
        usage,
        config.plans.clone(),
        Arc::new(SystemClock),
    ));

    let state = ApiState::new(
        quota,
        store.clone(),
        store,
        Arc::new(synthesizer),
        TokenIssuer::new(secrets.jwt_secret.as_bytes(), config.server.token_ttl_minutes)?,
        admin_key,
        config.subscription.clone(),
    );

    let router = create_router(state, &config.server.allowed_origins);
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    info!(bind = %bind, "Starting Studio API");
    serve(&bind, router).await?;
    Ok(())
}
