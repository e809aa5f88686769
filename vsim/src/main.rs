use adaptive::{Client, ClientConfig, Estimator};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::time::Duration;

/// A batch of simulated requests sharing the same latency, written as `COUNTxLATENCY`
#[derive(Debug, Clone, Copy)]
struct Phase {
    count: usize,
    latency: Duration,
}

impl std::str::FromStr for Phase {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let (count, latency) = s
            .split_once('x')
            .ok_or_else(|| anyhow!("expected COUNTxLATENCY (e.g. 50x150ms), got {s:?}"))?;
        let count = count
            .parse::<usize>()
            .with_context(|| format!("invalid request count in {s:?}"))?;
        let latency = humantime::parse_duration(latency)
            .with_context(|| format!("invalid latency in {s:?}"))?;
        if latency.is_zero() {
            return Err(anyhow!("latency must be positive in {s:?}"));
        }
        Ok(Phase { count, latency })
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}x{}",
            self.count,
            humantime::format_duration(self.latency)
        )
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "vsim",
    version,
    about = "Explore how adaptive concurrency limits react to latency",
    long_about = "`vsim` drives the adaptive concurrency limiter with simulated latencies.

EXAMPLES:
    # Feed latencies straight to the estimator
    vsim replay 100ms 200ms 200ms 150ms

    # Baseline request, then two batches of concurrent requests on a virtual clock
    vsim load --virtual-time --phase 2x200ms --phase 50x150ms"
)]
struct Args {
    /// Limit estimation algorithm
    #[arg(long, default_value = "vegas", global = true)]
    algorithm: String,

    /// Initial concurrency limit
    #[arg(long, default_value_t = congestion::LIMIT_DEFAULT, global = true)]
    limit: usize,

    /// Upper bound for the concurrency limit (default: unbounded)
    #[arg(long, global = true)]
    limit_max: Option<usize>,

    /// Verbose level: -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed latencies to the estimator in order and print the limit after each one
    Replay {
        /// Latency samples, e.g. "100ms 150ms 1s"
        #[arg(required = true, value_parser = humantime::parse_duration)]
        latencies: Vec<Duration>,
    },
    /// Send batches of concurrent simulated requests through an adaptive client
    Load {
        /// Latency of the single request that establishes the baseline
        #[arg(long, default_value = "100ms", value_parser = humantime::parse_duration)]
        baseline: Duration,

        /// Batch of concurrent requests as COUNTxLATENCY (can be specified multiple times)
        #[arg(long, value_name = "COUNTxLATENCY", required = true, action = clap::ArgAction::Append)]
        phase: Vec<Phase>,

        /// Run on a paused clock that jumps straight to the next timer
        #[arg(long)]
        virtual_time: bool,
    },
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            algorithm: self.algorithm.clone(),
            ..Default::default()
        };
        config.vegas.limit = self.limit;
        if let Some(limit_max) = self.limit_max {
            config.vegas.limit_max = limit_max;
        }
        config
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn replay(config: &ClientConfig, latencies: Vec<Duration>) -> Result<()> {
    let mut estimator = Estimator::from_config(config)?;
    let steps = congestion::replay(&mut estimator, latencies)?;
    for step in steps {
        println!(
            "{}\t{}",
            humantime::format_duration(step.round_trip_time),
            step.limit
        );
    }
    Ok(())
}

async fn request(client: &Client, latency: Duration) -> Result<()> {
    client
        .run(move || async move {
            tokio::time::sleep(latency).await;
            Ok(())
        })
        .await
}

async fn load(client: Client, baseline: Duration, phases: Vec<Phase>) -> Result<()> {
    let client = &client;
    let start = tokio::time::Instant::now();
    request(client, baseline).await?;
    println!(
        "baseline {}\tlimit {}",
        humantime::format_duration(baseline),
        client.limit()
    );
    for phase in phases {
        let latency = phase.latency;
        let requests = (0..phase.count).map(move |_| request(client, latency));
        for result in futures::future::join_all(requests).await {
            result?;
        }
        tracing::info!(%phase, limit = client.limit(), "phase complete");
        println!("{phase}\tlimit {}", client.limit());
    }
    tracing::info!(elapsed = ?start.elapsed(), "load complete");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = args.client_config();
    match args.command {
        Command::Replay { latencies } => replay(&config, latencies),
        Command::Load {
            baseline,
            phase,
            virtual_time,
        } => {
            if baseline.is_zero() {
                return Err(anyhow!("baseline latency must be positive"));
            }
            let client = Client::new(&config)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(virtual_time)
                .build()
                .context("failed to build tokio runtime")?;
            runtime.block_on(load(client, baseline, phase))
        }
    }
}
