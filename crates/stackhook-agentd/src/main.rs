use std::{
    io::ErrorKind,
    net::{Ipv4Addr, Ipv6Addr},
    sync::Arc,
};

use anyhow::Context;
use axum::Router;
use tokio::{net::TcpListener, sync::watch};
use tracing::{debug, info, warn};

use stackhook_api::{GatewayApiAdapter, HttpApi};
use stackhook_core::{
    DeployExecutor, DeployPlan, Gateway, GatewaySettings, SignatureVerifier, TokenStore,
};
use stackhook_exec::{SshTarget, SshTransport};
use stackhook_observe::init_logger;
use stackhook_telegram::TelegramNotifier;

mod config;
use config::{AgentConfig, LISTEN_PORT};

fn main() -> anyhow::Result<()> {
    // 1) config + logger, while still single-threaded
    let cfg = AgentConfig::from_env().context("load configuration")?;
    init_logger(&cfg.logger)?;
    for warning in &cfg.warnings {
        warn!("{warning}");
    }
    info!(config = ?cfg, "configuration loaded");

    // 2) runtime
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?
        .block_on(run(cfg))
}

async fn run(cfg: AgentConfig) -> anyhow::Result<()> {
    let router = build_router(&cfg)?;
    let listeners = bind_listeners(LISTEN_PORT).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let mut servers = Vec::with_capacity(listeners.len());
    for listener in listeners {
        info!(addr = %listener.local_addr()?, "listening");

        let app = router.clone();
        let mut stop = shutdown_rx.clone();
        servers.push(tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop.changed().await;
                })
                .await
        }));
    }

    shutdown_signal().await;
    info!("shutting down");
    let _ = shutdown_tx.send(());

    for server in servers {
        server.await?.context("http server")?;
    }
    info!("stopped");
    Ok(())
}

fn build_router(cfg: &AgentConfig) -> anyhow::Result<Router> {
    if !cfg.stack_script.is_file() {
        warn!(path = %cfg.stack_script.display(), "stack script not found, deploys will fail");
    }

    let transport = SshTransport::new(SshTarget {
        host: cfg.ssh_host.clone(),
        user: cfg.ssh_user.clone(),
        port: cfg.ssh_port,
        identity_file: cfg.ssh_key_path.clone(),
    })
    .context("ssh target")?;

    let plan = DeployPlan::new(
        cfg.stack_dir.clone(),
        cfg.stack_name.clone(),
        cfg.branch.clone(),
        cfg.stack_script.clone(),
    );
    let deployer = Arc::new(DeployExecutor::new(plan, Arc::new(transport)));
    let notifier = Arc::new(TelegramNotifier::new(
        cfg.telegram_token.clone(),
        cfg.telegram_chat_id.clone(),
    ));

    let gateway = Gateway::new(
        GatewaySettings {
            branch: cfg.branch.clone(),
            public_url: cfg.public_url.clone(),
            stack_name: cfg.stack_name.clone(),
        },
        SignatureVerifier::new(cfg.webhook_secret.clone()),
        Arc::new(TokenStore::new(cfg.url_validity)),
        notifier,
        deployer,
    );

    let handler = Arc::new(GatewayApiAdapter::new(Arc::new(gateway)));
    Ok(HttpApi::new(handler).router())
}

/// Bind `[::]` and `0.0.0.0`. On hosts where the IPv6 socket already
/// accepts IPv4 the second bind fails with `AddrInUse` and is skipped.
async fn bind_listeners(port: u16) -> anyhow::Result<Vec<TcpListener>> {
    let mut listeners = Vec::with_capacity(2);

    match TcpListener::bind((Ipv6Addr::UNSPECIFIED, port)).await {
        Ok(l) => listeners.push(l),
        Err(e) => warn!(error = %e, "IPv6 listener unavailable"),
    }

    match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
        Ok(l) => listeners.push(l),
        Err(e) if e.kind() == ErrorKind::AddrInUse && !listeners.is_empty() => {
            debug!("IPv6 listener is dual-stack, skipping IPv4 bind");
        }
        Err(e) => return Err(e).with_context(|| format!("bind 0.0.0.0:{port}")),
    }

    Ok(listeners)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
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
