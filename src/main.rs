use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podwarden::{
    api::AppState,
    config::Config,
    create_router,
    k8s::K8sClient,
    retaliation::{ApiKiller, DryRunKiller, PodKiller},
    telemetry::{install_prometheus_recorder, MetricsSink, PrometheusMetrics},
    watchdog::{MonitorSettings, NamespaceFilter, NamespaceSupervisor, StatusBoard},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first: the log level depends on it
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PodWarden");
    tracing::info!(
        grace_period_secs = config.grace_period().as_secs(),
        dry_run = config.dry_run,
        "Configuration loaded"
    );

    // An invalid filter is fatal before any watching begins
    let filter = NamespaceFilter::new(&config.filter_namespaces)?;

    let k8s = Arc::new(K8sClient::new(config.kubeconfig_path.as_deref()).await?);
    if let Err(e) = k8s.health_check().await {
        tracing::warn!("⚠️ K8s client created but unhealthy: {}", e);
    }

    let prometheus = install_prometheus_recorder()?;
    let metrics: Arc<dyn MetricsSink> = Arc::new(PrometheusMetrics::new());

    let killer: Arc<dyn PodKiller> = if config.dry_run {
        tracing::info!("Dry run enabled, pods will not be deleted");
        Arc::new(DryRunKiller)
    } else {
        Arc::new(ApiKiller::new(k8s.clone(), config.kill_grace_period_seconds))
    };

    let status = StatusBoard::new();
    let shutdown = CancellationToken::new();

    let supervisor = NamespaceSupervisor::new(
        k8s,
        filter,
        MonitorSettings::from_config(&config),
        killer,
        metrics.clone(),
        status.clone(),
    )
    .with_shutdown_timeout(config.monitor_shutdown_timeout());
    let supervisor_task = tokio::spawn(supervisor.run(shutdown.clone()));

    let state = AppState::new(config.clone(), status, metrics).with_prometheus(prometheus);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown requested");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    supervisor_task.await?;
    tracing::info!("PodWarden stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl-C: {}", e);
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
                tracing::error!("Cannot listen for SIGTERM: {}", e);
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
}
