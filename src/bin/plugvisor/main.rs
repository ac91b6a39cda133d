//! `plugvisor <ModuleName> [Debug!] [parameters...]`
//!
//! Runs one registered worker under the supervisor with the console as the
//! command channel. Type `Help!` for the built-in commands.

mod hello;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use plugvisor::{
    ConsoleChannel, LaunchArgs, LogWriter, Logger, RuntimeError, Shutdown, Subscribe, Supervisor,
    SupervisorConfig, WorkerRegistry,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use hello::HelloWorld;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = LaunchArgs::parse(std::env::args().skip(1))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("unable to start the async runtime")?;
    runtime.block_on(run(args));

    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_timeout(Duration::from_millis(100));
    Ok(())
}

/// Runs the supervisor to completion. Failures end up as one console line;
/// the process still returns normally.
async fn run(args: LaunchArgs) {
    let registry = WorkerRegistry::new().register("HelloWorld", HelloWorld::default);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_loader(registry)
        .with_subscribers(subs)
        .build();
    let console_logger = Logger::new(
        sup.bus().clone(),
        sup.config().debug.clone(),
        "console",
    );
    let console = ConsoleChannel::stdin(64, console_logger);

    let result = sup.run(args, console).await.and_then(Shutdown::into_result);
    match result {
        Ok(shutdown) => info!(
            worker = %shutdown.worker,
            reason = ?shutdown.reason,
            termination = ?shutdown.termination,
            "supervisor finished"
        ),
        Err(e) => error!(label = e.as_label(), "{}", failure_line(&e)),
    }
}

/// Single console line for a failed run.
fn failure_line(e: &RuntimeError) -> String {
    format!("plugvisor: {e}")
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,plugvisor=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
