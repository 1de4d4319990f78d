use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rand::Rng;
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use transfer_sim::config::SimulationConfig;
use transfer_sim::interfaces::csv::account_writer::AccountWriter;

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Final balances as `id,balance` rows
    Csv,
    /// The full run report
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of accounts (random between 4 and 19 when omitted)
    #[arg(long)]
    accounts: Option<usize>,

    /// Number of successful transfers to reach
    #[arg(long, default_value_t = 30)]
    target: usize,

    /// Number of parallel workers (random between 2 and 9 when omitted)
    #[arg(long)]
    workers: Option<usize>,

    /// Starting balance of every account
    #[arg(long, default_value_t = 10_000)]
    initial_balance: i64,

    /// Bound on each lock acquisition, in milliseconds
    #[arg(long, default_value_t = 1000)]
    lock_timeout_ms: u64,

    /// Shortest pacing delay before an attempt, in milliseconds
    #[arg(long, default_value_t = 1000)]
    min_delay_ms: u64,

    /// Longest pacing delay before an attempt, in milliseconds
    #[arg(long, default_value_t = 2000)]
    max_delay_ms: u64,

    /// Transfer amounts are drawn below this bound
    #[arg(long, default_value_t = 10_000)]
    max_amount: i64,

    /// Time workers get to exit after the target is reached, in milliseconds
    #[arg(long, default_value_t = 5000)]
    grace_ms: u64,

    /// Seed for the workers' random generators
    #[arg(long)]
    seed: Option<u64>,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

impl Cli {
    fn into_config(self) -> (SimulationConfig, OutputFormat) {
        let mut rng = rand::thread_rng();
        let config = SimulationConfig {
            accounts_count: self.accounts.unwrap_or_else(|| rng.gen_range(4..20)),
            target_transfers: self.target,
            worker_count: self.workers.unwrap_or_else(|| rng.gen_range(2..10)),
            initial_balance: self.initial_balance,
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_amount: self.max_amount,
            grace_period: Duration::from_millis(self.grace_ms),
            seed: self.seed,
        };
        (config, self.format)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let (config, format) = cli.into_config();
    config.validate().into_diagnostic()?;

    let report = transfer_sim::run_with_config(config)
        .await
        .into_diagnostic()?;

    let stdout = io::stdout();
    match format {
        OutputFormat::Csv => {
            let mut writer = AccountWriter::new(stdout.lock());
            writer.write_accounts(&report.accounts).into_diagnostic()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(stdout.lock(), &report).into_diagnostic()?;
            println!();
        }
    }

    Ok(())
}
