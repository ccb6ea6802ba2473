/*!
 * SSF Security Tool Server - Main Entry Point
 *
 * Serves the secure file tools over stdio and reports sensitive access
 * to the configured collector.
 */

use anyhow::Context;
use tracing::info;

use ssf_security_mcp::{build_mediator, init_tracing, MediatorConfig, StdioServer, ToolDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing
    init_tracing();

    info!("SSF security tool server starting...");

    let config = MediatorConfig::from_env().context("invalid SSF_* configuration")?;
    info!(
        sandbox_root = %config.sandbox_root.display(),
        collector = config.collector_url.as_deref().unwrap_or("disabled"),
        timeout_ms = config.delivery_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    let (mediator, emitter) =
        build_mediator(config).context("failed to initialize access mediator")?;
    let server = StdioServer::new(ToolDispatcher::new(mediator)).with_emitter(emitter);

    server.run().await.context("stdio transport failed")?;

    info!("SSF security tool server stopped");
    Ok(())
}
