mod app;
mod config;
mod handlers;
mod manager;
mod metrics;
mod output;
mod state;
mod storage;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tablekeeper_core::storage::TableStore;
use tablekeeper_core::tables::format_plan;

use crate::{
    app::create_app,
    config::{ManagerArgs, ServerArgs, StoreArgs, StoreBackend},
    manager::{SyncReport, TableManager},
    metrics::MetricsRegistry,
    output::{aprintln, p_g, print_plan},
    state::AppState,
    storage::{dynamodb::create_client, DynamoDbTableStore, InMemoryTableStore},
};

/// Tablekeeper - Keeps periodic DynamoDB tables created and provisioned
#[derive(Parser, Debug)]
#[command(name = "tablekeeper")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true, env = "LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile tables on every poll interval and serve metrics
    Run {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        manager: ManagerArgs,
        #[command(flatten)]
        server: ServerArgs,
    },
    /// Run a single reconciliation pass and exit
    #[command(name = "sync")]
    SyncOnce {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        manager: ManagerArgs,
    },
    /// Show what a pass would create and check, without changing anything
    Plan {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        manager: ManagerArgs,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format);

    match cli.command {
        Command::Run {
            store,
            manager,
            server,
        } => run(store, manager, server).await,
        Command::SyncOnce { store, manager } => sync_once(store, manager).await,
        Command::Plan {
            store,
            manager,
            json,
        } => plan(store, manager, json).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tablekeeper=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Builds the table store selected on the command line.
async fn build_store(args: &StoreArgs) -> Arc<dyn TableStore> {
    match args.store {
        StoreBackend::Dynamodb => {
            let aws = args.aws_config();
            tracing::info!(target_store = %aws.target_display(), "Using DynamoDB table store");
            Arc::new(DynamoDbTableStore::new(create_client(&aws).await))
        }
        StoreBackend::Memory => {
            tracing::info!("Using in-memory table store");
            Arc::new(InMemoryTableStore::new())
        }
    }
}

fn store_target(args: &StoreArgs) -> String {
    match args.store {
        StoreBackend::Dynamodb => args.aws_config().target_display(),
        StoreBackend::Memory => "in-memory store".to_string(),
    }
}

async fn build_manager(
    store: &StoreArgs,
    manager: &ManagerArgs,
    registry: &MetricsRegistry,
) -> Result<TableManager> {
    let config = manager.table_manager_config()?;
    let store = build_store(store).await;
    Ok(TableManager::new(config, store, registry.sink())?)
}

async fn run(store: StoreArgs, manager: ManagerArgs, server: ServerArgs) -> Result<()> {
    let registry = MetricsRegistry::new()?;
    let manager = Arc::new(build_manager(&store, &manager, &registry).await?);

    let listener = TcpListener::bind(server.metrics_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    serve(listener, manager, registry, shutdown_signal()).await
}

/// Runs the poll loop alongside the HTTP server until `shutdown` resolves.
///
/// The loop is stopped and awaited on every exit path, including a server
/// error.
async fn serve<F>(
    listener: TcpListener,
    manager: Arc<TableManager>,
    registry: MetricsRegistry,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = manager.start();
    let state = AppState::new(registry, handle.subscribe());

    let served = axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await;

    handle.stop().await;
    tracing::info!("Table manager stopped");

    served?;
    Ok(())
}

async fn sync_once(store: StoreArgs, manager: ManagerArgs) -> Result<()> {
    let registry = MetricsRegistry::new()?;
    let manager = build_manager(&store, &manager, &registry).await?;

    let SyncReport {
        expected,
        created,
        updated,
        unchanged,
        not_active,
    } = manager.sync_tables().await?;

    aprintln!(
        "{} {} expected, {} created, {} updated, {} unchanged, {} not active",
        p_g("Synced:"),
        expected,
        created,
        updated,
        unchanged,
        not_active
    );
    Ok(())
}

async fn plan(store: StoreArgs, manager: ManagerArgs, json: bool) -> Result<()> {
    let registry = MetricsRegistry::new()?;
    let target = store_target(&store);
    let manager = build_manager(&store, &manager, &registry).await?;

    let partition = manager.plan().await?;

    if json {
        aprintln!("{}", serde_json::to_string_pretty(&partition)?);
    } else {
        print_plan(&target, &format_plan(&partition));
    }
    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
