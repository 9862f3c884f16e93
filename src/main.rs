//! Application entrypoint and state wiring.

use std::sync::Arc;

use access_ledger_node::{routes, AccessControlTable, AppState, Ledger, NodeConfig};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "access_ledger_node=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = NodeConfig::from_env().context("load configuration")?;
    let addr = config.bind_addr()?;

    let ledger = Arc::new(Ledger::new(config.digest));
    let acl = Arc::new(AccessControlTable::new());
    let app = routes::app(AppState::new(ledger, acl));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, digest = %config.digest, "access ledger node listening");
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
