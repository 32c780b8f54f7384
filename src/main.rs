//! glb demo driver.
//!
//! Spawns a handful of callers that share one load balancer. Each caller
//! takes a child of a root context, makes its selections, holds them for a
//! while, then cancels so least connections strategies release its
//! attributions. Ctrl-C cancels the root and with it every caller.
//!
//! ```text
//! glb --strategy least_conns --callers 3 --calls 10 http://a:80 http://b:80
//! ```

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tokio::task::{JoinError, JoinSet};
use url::Url;

use glb::config::{read_config, validate_config, ConfigError, DemoConfig, GlbConfig};
use glb::observability::{logging, metrics};
use glb::{load_balancer, Context, LoadBalancer, Strategy};

#[derive(Parser)]
#[command(name = "glb")]
#[command(about = "Drive a load balancer with cancellable callers", long_about = None)]
struct Cli {
    /// TOML configuration file; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// round_robin, least_conns or least_conns_heap
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Number of concurrent callers
    #[arg(long)]
    callers: Option<usize>,

    /// Selections per caller
    #[arg(long)]
    calls: Option<usize>,

    /// Milliseconds each caller holds its selections before cancelling
    #[arg(long)]
    hold_ms: Option<u64>,

    #[arg(long)]
    log_level: Option<String>,

    /// Backend URLs, replacing the configured pool
    backends: Vec<String>,
}

impl Cli {
    fn apply(self, config: &mut GlbConfig) {
        if let Some(strategy) = self.strategy {
            config.balancer.strategy = strategy;
        }
        if !self.backends.is_empty() {
            config.balancer.backends = self.backends;
        }
        if let Some(callers) = self.callers {
            config.demo.callers = callers;
        }
        if let Some(calls) = self.calls {
            config.demo.calls_per_caller = calls;
        }
        if let Some(hold_ms) = self.hold_ms {
            config.demo.hold_ms = hold_ms;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

/// What one caller observed.
#[derive(Debug, Default)]
struct CallerReport {
    selections: HashMap<String, usize>,
    errors: usize,
}

/// Totals across all callers, printed as JSON.
#[derive(Debug, Serialize)]
struct Summary {
    strategy: Strategy,
    selections: BTreeMap<String, usize>,
    errors: usize,
}

impl Summary {
    fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            selections: BTreeMap::new(),
            errors: 0,
        }
    }

    fn merge(&mut self, report: CallerReport) {
        for (backend, count) in report.selections {
            *self.selections.entry(backend).or_default() += count;
        }
        self.errors += report.errors;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => GlbConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        strategy = %config.balancer.strategy,
        backends = config.balancer.backends.len(),
        callers = config.demo.callers,
        calls_per_caller = config.demo.calls_per_caller,
        "glb demo starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let backends = config.balancer.backend_urls()?;
    let lb: Arc<dyn LoadBalancer<Url>> = Arc::from(load_balancer::new(config.balancer.strategy, backends)?);

    let (root, cancel_root) = Context::with_cancel();
    let interrupt = {
        let cancel_root = cancel_root.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling callers");
                cancel_root.cancel();
            }
        })
    };

    let summary = run_callers(lb, &root, &config.demo).await?;
    interrupt.abort();
    cancel_root.cancel();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    tracing::info!(errors = summary.errors, "glb demo complete");
    Ok(())
}

async fn run_callers(
    lb: Arc<dyn LoadBalancer<Url>>,
    root: &Context,
    demo: &DemoConfig,
) -> Result<Summary, JoinError> {
    let mut callers = JoinSet::new();
    let hold = Duration::from_millis(demo.hold_ms);

    for caller in 0..demo.callers {
        let lb = Arc::clone(&lb);
        let (ctx, cancel) = root.child();
        let calls = demo.calls_per_caller;

        callers.spawn(async move {
            let mut report = CallerReport::default();
            for _ in 0..calls {
                match lb.next(&ctx) {
                    Ok(backend) => *report.selections.entry(backend.to_string()).or_default() += 1,
                    Err(err) => {
                        tracing::warn!(caller, error = %err, "Error on calling lb.next");
                        report.errors += 1;
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(hold) => {}
                _ = ctx.cancelled() => {}
            }
            cancel.cancel();
            tracing::debug!(caller, "Caller finished");
            report
        });
    }

    let mut summary = Summary::new(lb.strategy());
    while let Some(report) = callers.join_next().await {
        summary.merge(report?);
    }
    Ok(summary)
}
