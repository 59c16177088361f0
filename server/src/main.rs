mod config;
mod employees;
mod http;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DbPool, EmployeeRepository, connect};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::EmployeeService;
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "employee-server", version, about = "Employee directory service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Insert demo employees.
    Seed,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _obs = init_tracing(ObsConfig::default().with_env())?;
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let pool = connect(&config.database)
        .await
        .context("failed to open database pool")?;

    let outcome = match cli.command {
        Command::Serve(cmd) => run_server(cmd, config, pool.clone()).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up(&pool).await,
            MigrateCommand::Down => migrate_down(&pool).await,
        },
        Command::Seed => run_seed(pool.clone()).await,
    };

    let closed = platform_db::close(pool).await;
    outcome?;
    closed.context("failed to close database pool")?;
    Ok(())
}

async fn run_server(cmd: ServeCommand, config: AppConfig, pool: DbPool) -> Result<()> {
    ensure_migrations(&pool, cmd.allow_dirty).await?;
    let store = Arc::new(EmployeeRepository::new(pool.clone()));
    let state = AppState {
        pool,
        employees: EmployeeService::new(store),
        config: Arc::new(config),
    };
    http::serve((&cmd).into(), state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `employee-server migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn run_seed(pool: DbPool) -> Result<()> {
    let service = EmployeeService::new(Arc::new(EmployeeRepository::new(pool)));
    let seeded = service.seed_demo().await.context("seeding employees failed")?;
    for employee in &seeded {
        info!(employee_id = %employee.id, name = %employee.name, "seeded employee");
    }
    Ok(())
}

async fn migrate_up(pool: &DbPool) -> Result<()> {
    Migrator::up(pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down(pool: &DbPool) -> Result<()> {
    Migrator::down(pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}
