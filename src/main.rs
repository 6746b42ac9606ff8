use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use intake::auth::{provision_operator, ProvisionError, ProvisionOutcome};
use intake::db::SqliteOperatorStore;
use intake::web::{AppState, WebServer};
use intake::{Config, Database, IntakeError};

#[derive(Parser)]
#[command(name = "intake", version, about = "Recruitment intake and review service")]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default).
    Serve,
    /// Create the admin operator, or reset its password.
    SeedAdmin {
        /// Operator email.
        #[arg(long, env = "ADMIN_EMAIL")]
        email: String,
        /// Operator password.
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

fn load_config(path: &PathBuf) -> intake::Result<Config> {
    let mut config = match Config::load_optional(path)? {
        Some(config) => config,
        None => {
            eprintln!("{} not found, using default configuration.", path.display());
            Config::default()
        }
    };
    config.apply_env_overrides();
    Ok(config)
}

async fn serve(config: Config) -> intake::Result<()> {
    config.validate()?;

    info!("intake - recruitment intake and review service");
    let db = Database::open(&config.database.path).await?;
    let state = AppState::from_database(config, &db)?;
    let server = WebServer::new(state)?;
    info!("Server configured on {}", server.addr());

    server.run().await?;
    Ok(())
}

async fn seed_admin(config: Config, email: &str, password: &str) -> intake::Result<()> {
    let db = Database::open(&config.database.path).await?;
    let store = SqliteOperatorStore::new(db.pool().clone());

    match provision_operator(&store, email, password).await {
        Ok(ProvisionOutcome::Created(id)) => info!(operator_id = id, "Admin operator created"),
        Ok(ProvisionOutcome::Rotated(id)) => info!(operator_id = id, "Admin password reset"),
        Err(ProvisionError::Database(msg)) => return Err(IntakeError::Database(msg)),
        Err(e) => return Err(IntakeError::Validation(e.to_string())),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            if let Err(e) = intake::logging::init(&config.logging) {
                eprintln!("Failed to initialize logging: {e}");
                intake::logging::init_console_only(&config.logging.level);
            }
            serve(config).await
        }
        Command::SeedAdmin { email, password } => {
            intake::logging::init_console_only(&config.logging.level);
            seed_admin(config, &email, &password).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
