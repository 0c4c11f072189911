use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use specrace::demos::{matmul, puzzle, sim, sort};
use specrace::race::{run_race, RaceConfig, RaceError, RaceOutcome, RaceReport, Strategy};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "specrace")]
#[command(about = "specrace - speculative strategy races with cooperative cancellation")]
#[command(version)]
#[command(subcommand_required = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Race matrix-multiplication strategies on a random NxN pair
    Matmul {
        /// Matrix dimension
        #[arg(default_value_t = 256)]
        n: usize,
        /// Random seed for problem generation
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        #[command(flatten)]
        race: RaceOpts,
    },
    /// Race sorting strategies on N random keys
    Sort {
        /// Number of keys to sort
        #[arg(default_value_t = 100_000)]
        n: usize,
        /// Random seed for problem generation
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        #[command(flatten)]
        race: RaceOpts,
    },
    /// Race eight-puzzle solvers on a scrambled board
    Puzzle {
        /// Scramble length (random walk away from the goal)
        #[arg(default_value_t = 12)]
        scramble: usize,
        /// Random seed for the scramble
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        #[command(flatten)]
        race: RaceOpts,
    },
    /// Race two simulation models over the same step count
    Sim {
        /// Simulation steps
        #[arg(default_value_t = 100_000_000)]
        steps: u64,
        #[command(flatten)]
        race: RaceOpts,
    },
}

/// Options shared by every race subcommand.
#[derive(Args)]
struct RaceOpts {
    /// Number of competing workers (clamped to the demo's strategy pool)
    #[arg(long, short = 'j')]
    workers: Option<usize>,
    /// Deadline in seconds for the first finisher
    #[arg(long)]
    timeout: Option<u64>,
    /// Print the full per-worker report
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap renders its own usage/help text; fold every real parse
            // failure into a single usage exit code.
            let _ = err.print();
            process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32, RaceError> {
    match cli.command {
        Commands::Matmul { n, seed, race } => {
            let pair = matmul::MatrixPair::random(n, seed)?;
            let report = run_race(
                &pair,
                select(matmul::strategies(), race.workers),
                &config_for(&race),
            )?;
            Ok(conclude(&report, race.verbose, |p: &matmul::Product| {
                match p.c.first() {
                    Some(c0) => format!("sample c[0] = {c0:.3}"),
                    None => "empty product".to_string(),
                }
            }))
        }
        Commands::Sort { n, seed, race } => {
            let keys = sort::random_keys(n, seed)?;
            let report = run_race(
                &keys,
                select(sort::strategies(), race.workers),
                &config_for(&race),
            )?;
            Ok(conclude(&report, race.verbose, |keys: &Vec<i64>| {
                match keys.first() {
                    Some(k0) => format!("sorted {} keys, sample keys[0] = {k0}", keys.len()),
                    None => "sorted 0 keys".to_string(),
                }
            }))
        }
        Commands::Puzzle {
            scramble,
            seed,
            race,
        } => {
            let start = puzzle::Board::scrambled(scramble, seed);
            let report = run_race(
                &start,
                select(puzzle::strategies(), race.workers),
                &config_for(&race),
            )?;
            Ok(conclude(&report, race.verbose, |path: &Vec<puzzle::Move>| {
                format!(
                    "solution in {} moves: {}",
                    path.len(),
                    puzzle::path_string(path)
                )
            }))
        }
        Commands::Sim { steps, race } => {
            let input = sim::SimInput { steps };
            let report = run_race(
                &input,
                select(sim::strategies(), race.workers),
                &config_for(&race),
            )?;
            Ok(conclude(&report, race.verbose, |value: &i64| {
                format!("model value = {value}")
            }))
        }
    }
}

fn config_for(race: &RaceOpts) -> RaceConfig {
    RaceConfig::default().with_timeout_option(race.timeout.map(Duration::from_secs))
}

/// Take the first `workers` strategies from the pool, defaulting to the CPU
/// count and clamping to [2, pool size].
fn select<P, R>(
    pool: Vec<Box<dyn Strategy<P, R>>>,
    workers: Option<usize>,
) -> Vec<Box<dyn Strategy<P, R>>> {
    let available = pool.len();
    let want = workers.unwrap_or_else(num_cpus::get).clamp(2, available);
    pool.into_iter().take(want).collect()
}

fn conclude<R>(report: &RaceReport<R>, verbose: bool, sample: impl Fn(&R) -> String) -> i32 {
    if verbose {
        print!("{}", report.format_summary());
    }
    match &report.outcome {
        RaceOutcome::Winner {
            worker_id,
            strategy,
            result,
        } => {
            println!(
                "winner: worker {worker_id} ({strategy}) in {:.3?}",
                report.elapsed
            );
            println!("{}", sample(result));
            0
        }
        RaceOutcome::NoWinner => {
            eprintln!(
                "no winner: no strategy finished before the deadline ({:.3?} elapsed)",
                report.elapsed
            );
            1
        }
    }
}
