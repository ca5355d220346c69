//! Campus platform HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage and token keys into the HTTP router and starts
//! the API server next to the Prometheus endpoint. The `create-superadmin`
//! subcommand seeds a platform admin account and exits.
mod api;
mod app;
mod auth;
mod config;
mod curriculum;
mod grading;
mod model;
mod observability;
mod provisioning;
mod store;

use anyhow::Context;
use api::types::CreateAccountRequest;
use app::{AppState, build_router};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::sync::Arc;
use store::{CampusStore, memory::InMemoryStore, postgres::PostgresStore};

#[derive(Debug, Parser)]
#[command(name = "campus-platform", version, about = "Campus assessment platform API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a platform admin account and exit.
    CreateSuperadmin {
        #[arg(long, env = "CAMPUS_SUPERADMIN_EMAIL")]
        email: String,
        #[arg(long, env = "CAMPUS_SUPERADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "Super Admin")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::PlatformConfig::from_env_or_yaml().context("platform config")?;
    match cli.command {
        Some(Command::CreateSuperadmin {
            email,
            password,
            name,
        }) => {
            create_superadmin(
                config,
                CreateAccountRequest {
                    email,
                    password,
                    name,
                },
            )
            .await
        }
        None => {
            run_with_shutdown(config, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
        }
    }
}

async fn run_with_shutdown<F>(config: config::PlatformConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("campus-platform")?;
    if config.auth.secret_generated {
        tracing::warn!("CAMPUS_JWT_SECRET not set; issued tokens will not survive a restart");
    }
    let state = build_state(config.clone()).await?;
    tracing::info!(
        backend = state.store.backend_name(),
        durable = state.store.is_durable(),
        "store ready"
    );
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, "campus platform listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: config::PlatformConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn CampusStore + Send + Sync> = match config.storage {
        config::StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        config::StorageBackend::Postgres => {
            let pg = config
                .postgres
                .as_ref()
                .context("postgres configuration missing")?;
            Arc::new(PostgresStore::connect(pg).await?)
        }
    };
    AppState::new(store, &config.auth, config.curriculum)
}

async fn create_superadmin(
    config: config::PlatformConfig,
    body: CreateAccountRequest,
) -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt().try_init();
    api::ensure_present(
        &[body.email.as_str(), body.password.as_str(), body.name.as_str()],
        "Email, password, and name are required",
    )
    .map_err(|err| anyhow::anyhow!(err.body.error))?;
    let state = build_state(config).await?;
    let admin = api::superadmin::register_platform_admin(&state, body)
        .await
        .map_err(|err| anyhow::anyhow!(err.body.error))?;
    println!("created platform admin {} <{}>", admin.id, admin.email);
    Ok(())
}
