//! Hard-delete accounts whose deletion grace period has elapsed.
//!
//! Intended for a daily scheduler. Reads the same `EDUMEETUP_*` settings as
//! the server; `--dry-run` only counts the accounts that would go.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use edumeetup::domain::Services;
use edumeetup::outbound::persistence::{DbPool, PoolConfig};
use edumeetup::outbound::wiring::postgres_service_ports;
use edumeetup::settings::AppSettings;
use ortho_config::OrthoConfig;

/// `deletion-sweep` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "deletion-sweep",
    about = "Remove accounts whose deletion grace period has elapsed",
    version
)]
struct CliArgs {
    /// Report what would be deleted without touching any data.
    #[arg(long)]
    dry_run: bool,
    /// Override the grace period in days.
    #[arg(long, value_name = "days")]
    grace_days: Option<u32>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let mut settings = AppSettings::load_from_iter([OsString::from("edumeetup")])
        .map_err(|error| color_eyre::eyre::eyre!("load settings: {error}"))?;
    if let Some(days) = args.grace_days {
        settings.deletion_grace_days = Some(days);
    }

    let database_url = settings.database_url()?;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .wrap_err("create database pool")?;
    let ports = postgres_service_ports(&pool, &settings)?;
    let service_settings = settings.service_settings()?;
    let services = Services::new(&ports, &service_settings);

    let report = services.deletion.sweep(args.dry_run).await?;
    info!(
        candidates = report.candidates,
        deleted = report.deleted,
        failed = report.failed,
        dry_run = report.dry_run,
        grace_days = service_settings.grace_days,
        "deletion sweep complete"
    );
    if report.failed > 0 {
        return Err(color_eyre::eyre::eyre!(
            "{} of {} deletions failed",
            report.failed,
            report.candidates
        ));
    }
    Ok(())
}
