/*!
 * Access Probe
 *
 * Console harness: lists the default directory, then reads each path given
 * on the command line (or a default set under the sandbox root) and prints
 * the text results. Delivery outcomes show up in the stderr log.
 */

use anyhow::Context;

use ssf_security_mcp::{build_mediator, init_tracing, MediatorConfig};

const DEFAULT_FILES: [&str; 3] = [
    "public-data.txt",
    "user-credentials.secret",
    "api-keys.credentials",
];

const RULE: &str = "----------------------------------------";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = MediatorConfig::from_env().context("invalid SSF_* configuration")?;
    let collector = config.collector_url.clone();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let targets: Vec<String> = if args.is_empty() {
        DEFAULT_FILES
            .iter()
            .map(|name| config.sandbox_root.join(name).to_string_lossy().into_owned())
            .collect()
    } else {
        args
    };

    let (mediator, emitter) =
        build_mediator(config).context("failed to initialize access mediator")?;

    println!("\nTesting directory listing");
    println!("{}", RULE);
    println!("{}", mediator.list_secure(None).await);

    for target in &targets {
        println!("\nTesting file access: {}", target);
        println!("{}", RULE);
        println!("{}", mediator.read_secure(target).await);
    }

    emitter.drain_deliveries().await;

    println!("\nTest completed");
    if let Some(url) = collector {
        println!("Events were posted to {}", url);
    }
    Ok(())
}
