use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use feescope_cli::{run, write_report};
use feescope_core::policy::fee_to_units;
use feescope_data::config::DEFAULT_MIN_HEIGHT;
use feescope_data::{load_config, load_records};
use feescope_stats::{estimate, rank_all};

#[derive(Parser, Debug)]
#[command(
    name = "feescope",
    version,
    about = "Block complexity analysis and congestion-pricing replay"
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "debug", "feescope_stats=trace").
    #[arg(long, global = true, default_value = "info", value_name = "FILTER")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the typical block spacing and per-dimension target rates.
    Estimate(EstimateArgs),
    /// Detect and rank complexity peaks on every dimension.
    Peaks(PeaksArgs),
    /// Run the full analysis described by a config file and write reports.
    Analyze {
        /// RON, TOML or JSON analysis config.
        #[arg(long, value_name = "PATH")]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// Block record CSV.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// Ignore blocks below this height.
    #[arg(long, default_value_t = DEFAULT_MIN_HEIGHT)]
    min_height: u64,

    /// Quantile of per-second complexity, in (0, 1].
    #[arg(long, default_value_t = 0.99)]
    quantile: f64,
}

#[derive(Args, Debug)]
struct PeaksArgs {
    #[command(flatten)]
    estimate: EstimateArgs,

    /// Peaks kept per dimension.
    #[arg(long, default_value_t = 10)]
    top_k: usize,

    /// Print the ranking as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Estimate(args) => cmd_estimate(&args),
        Command::Peaks(args) => cmd_peaks(&args),
        Command::Analyze { config } => cmd_analyze(&config),
    }
}

fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(env_filter).with_writer(std::io::stderr).try_init();
}

fn cmd_estimate(args: &EstimateArgs) -> Result<()> {
    let store = load_records(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let stats = estimate(store.samples(), args.min_height, args.quantile)
        .context("estimating target rates")?;

    println!("target block delay: {}s", stats.median_time_step);
    println!("target complexities: {}", stats.target_rates);
    println!("max complexities: {}", store.max_complexity());
    Ok(())
}

fn cmd_peaks(args: &PeaksArgs) -> Result<()> {
    let input = &args.estimate.input;
    let store = load_records(input).with_context(|| format!("loading {}", input.display()))?;
    let stats = estimate(store.samples(), args.estimate.min_height, args.estimate.quantile)
        .context("estimating target rates")?;
    let caps = store.max_complexity();
    let ranked = rank_all(store.samples(), &caps, &stats.target_rates, args.top_k)
        .context("ranking peaks")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    for (dimension, peaks) in ranked.iter() {
        println!(
            "{dimension} (cap {}, rate {}/s):",
            caps[dimension], stats.target_rates[dimension]
        );
        for (rank, peak) in peaks.iter().enumerate() {
            println!(
                "  #{:<2} heights {}..={}  blocks {:<5} seconds {:<6} cumulated {}",
                rank + 1,
                peak.start_height,
                peak.end_height,
                peak.block_count,
                peak.elapsed_time,
                peak.cumulated_complexity,
            );
        }
    }
    Ok(())
}

fn cmd_analyze(path: &Path) -> Result<()> {
    let config =
        load_config(path).with_context(|| format!("loading config {}", path.display()))?;
    let report = run(&config).context("running analysis")?;
    let files = write_report(&report, &config.output_dir)
        .with_context(|| format!("writing reports to {}", config.output_dir.display()))?;

    println!("target block delay: {}s", report.stats.median_time_step);
    println!("target complexities: {}", report.stats.target_rates);
    println!("max complexities: {}", report.max_complexity);
    println!(
        "replayed {} peak #{}: heights {}..={} ({} blocks)",
        report.dimension,
        config.peak_rank,
        report.window.low,
        report.window.high,
        report.fees.len(),
    );
    println!("max fee: {} units", fee_to_units(report.max_fee));
    println!("wrote {}", files.peaks.display());
    println!("wrote {}", files.complexity.display());
    println!("wrote {}", files.fees.display());
    Ok(())
}
