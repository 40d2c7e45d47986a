use benchmatrix_engine::orchestrator::DEFAULT_TMP_DIR;
use benchmatrix_engine::{
    format_error, log_warnings, select, BenchError, BenchmarkList, ConfigurationList,
    ExecutionContext, Orchestrator, ProcessExecutor, Result, RunOptions, SelectionRequest,
};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Parser)]
#[command(name = "benchmatrix")]
#[command(about = "Benchmatrix - build and run Go benchmarks across toolchain configurations")]
#[command(version)]
#[command(long_about = "
Benchmatrix builds a test binary for every configuration × benchmark pair,
runs each one N times, and can feed the merged CPU profiles of one
configuration into the PGO build of another.

Examples:
  benchmatrix -C conf.toml -B bench.toml                # Build and run everything enabled
  benchmatrix -C conf.toml -B bench.toml -c base,pgo -N 5
  benchmatrix -C conf.toml -B bench.toml --list         # Show the resolved matrix
")]
struct Cli {
    /// Configurations file
    #[arg(short = 'C', value_name = "FILE")]
    configurations: Option<PathBuf>,

    /// Use configurations from comma-separated list (even if normally "disabled")
    #[arg(short = 'c', value_name = "NAMES")]
    configuration_names: Option<String>,

    /// Benchmarks file
    #[arg(short = 'B', value_name = "FILE")]
    benchmarks: Option<PathBuf>,

    /// Run benchmarks in comma-separated list (even if normally "disabled")
    #[arg(short = 'b', value_name = "NAMES")]
    benchmark_names: Option<String>,

    /// Benchmark/test repeat count
    #[arg(short = 'N', value_name = "COUNT", default_value_t = 1)]
    count: usize,

    /// Path to temporary directory
    #[arg(short = 'T', value_name = "DIR", default_value = DEFAULT_TMP_DIR)]
    tmp_dir: PathBuf,

    /// Print commands as they are run
    #[arg(short, long)]
    verbose: bool,

    /// Print the resolved matrix and exit without building
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli);

    if let Err(e) = run(cli).await {
        eprintln!("{}", format_error(&e));
        process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let configurations_path = cli.configurations.as_ref().ok_or(BenchError::MissingInput {
        what: "Configurations",
    })?;
    let benchmarks_path = cli.benchmarks.as_ref().ok_or(BenchError::MissingInput {
        what: "Benchmarks",
    })?;

    let configurations = ConfigurationList::load_from_file(configurations_path)?;
    info!(
        "Loaded {} configurations from {}",
        configurations.configurations.len(),
        configurations_path.display()
    );
    let benchmarks = BenchmarkList::load_from_file(benchmarks_path)?;
    info!(
        "Loaded {} benchmarks from {}",
        benchmarks.benchmarks.len(),
        benchmarks_path.display()
    );

    let context = ExecutionContext::from_current_dir()?;
    let request = SelectionRequest {
        configurations: cli.configuration_names.unwrap_or_default(),
        benchmarks: cli.benchmark_names.unwrap_or_default(),
        default_dir: context.working_dir.clone(),
    };
    let selection = select(
        &configurations.configurations,
        &benchmarks.benchmarks,
        &request,
    )?;
    log_warnings(&selection);

    if cli.list {
        print!("{}", output::render_matrix(&selection));
        return Ok(());
    }

    let options = RunOptions {
        count: cli.count,
        verbose: cli.verbose,
        tmp_dir: cli.tmp_dir,
    };
    let orchestrator = Orchestrator::new(Arc::new(ProcessExecutor), context, options);
    orchestrator.run(&selection).await?;
    Ok(())
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout belongs to the benchmarks; diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("benchmatrix={},benchmatrix_engine={}", log_level, log_level).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
