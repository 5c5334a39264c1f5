// scripts/convergence_report.rs
use clap::Parser;
use gbm_mc::analysis::{path_count_grid, step_count_grid, ConvergenceAnalyzer, ConvergencePoint};
use gbm_mc::analytics::reference_price;
use gbm_mc::config::{MarketParameters, SimulationConfig};
use gbm_mc::mc::estimate::Z_95;
use gbm_mc::mc::mc_engine::{ControlVariate, McEstimator};
use gbm_mc::mc::payoffs::Payoff;
use gbm_mc::output::{write_convergence_csv, write_summary_to_csv};
use gbm_mc::solvers::Scheme;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Convergence report for the GBM Monte Carlo estimators
#[derive(Parser, Debug)]
#[command(name = "convergence-report")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seed shared by every sweep point
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Largest path count of the path sweep (decades from 100)
    #[arg(long, default_value_t = 1_000_000)]
    max_paths: usize,

    /// Path count used by the step sweep and the variance-reduction runs
    #[arg(long, default_value_t = 100_000)]
    paths_for_steps: usize,

    /// Largest step count of the step sweep (decades from 1)
    #[arg(long, default_value_t = 1_000)]
    max_steps: usize,

    /// Directory for the CSV files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

/// 1, 10, 100, ... from `start`, capped at `max`.
fn decades(start: usize, max: usize) -> Vec<usize> {
    std::iter::successors(Some(start), |&n| n.checked_mul(10))
        .take_while(|&n| n <= max)
        .collect()
}

fn print_sweep(title: &str, points: &[ConvergencePoint]) {
    println!("\n{:=<96}", "");
    println!("{}", title);
    println!("{:-<96}", "");
    println!(
        "{:>10} {:>8} {:>12} {:>12} {:>23} {:>12} {:>12}",
        "Paths", "Steps", "Price", "Std Err", "95% CI", "Error", "Time (ms)"
    );
    for p in points {
        println!(
            "{:>10} {:>8} {:>12.6} {:>12} {:>23} {:>12.6} {:>12.2}",
            p.config.paths,
            p.config.steps,
            p.estimate.price,
            p.estimate
                .std_error
                .map(|se| format!("{:.6}", se))
                .unwrap_or_else(|| "N/A".to_string()),
            p.estimate
                .confidence_interval(Z_95)
                .map(|(lo, hi)| format!("[{:.4}, {:.4}]", lo, hi))
                .unwrap_or_else(|| "N/A".to_string()),
            p.error,
            p.elapsed_ms
        );
    }
}

fn csv_path(dir: &Path, stem: &str, timestamp: &str) -> PathBuf {
    dir.join(format!("{}_{}.csv", stem, timestamp))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    info!(
        cpu_cores = num_cpus::get(),
        rayon_threads = rayon::current_num_threads(),
        seed = cli.seed,
        "starting convergence report"
    );

    std::fs::create_dir_all(&cli.out_dir)?;
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let market = MarketParameters::default();
    let call = Payoff::EuropeanCall { k: market.strike() };
    let call_price = reference_price(&market, &call, 1)?;

    // Statistical error: exact scheme, one step, growing M
    let exact = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace));
    let path_grid = path_count_grid(&decades(100, cli.max_paths), 1, Some(cli.seed));
    let path_sweep = exact.analyze(&market, &call, call_price, &path_grid)?;
    print_sweep("Path-count sweep (log-space, European call)", &path_sweep);
    let path_file = csv_path(&cli.out_dir, "path_sweep", &timestamp);
    write_convergence_csv(&path_file, &path_sweep)?;
    info!(file = %path_file.display(), points = path_sweep.len(), "wrote path sweep");
    if let Some(finest) = path_sweep.last() {
        info!(
            paths = finest.config.paths,
            estimator_variance = ?finest.estimate.variance(),
            covers_reference = ?finest
                .estimate
                .confidence_interval(Z_95)
                .map(|(lo, hi)| lo <= call_price && call_price <= hi),
            "finest path sweep point"
        );
    }

    // Discretization bias: Euler, fixed M, growing N
    let euler = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::euler()).with_antithetic());
    let step_grid = step_count_grid(cli.paths_for_steps, &decades(1, cli.max_steps), Some(cli.seed));
    let step_sweep = euler.analyze(&market, &call, call_price, &step_grid)?;
    print_sweep("Step-count sweep (Euler-Maruyama, European call)", &step_sweep);
    let step_file = csv_path(&cli.out_dir, "step_sweep", &timestamp);
    write_convergence_csv(&step_file, &step_sweep)?;
    info!(file = %step_file.display(), points = step_sweep.len(), "wrote step sweep");

    // Antithetic straddle: equal number of normal draws per estimate
    let trials = 100;
    let trial_paths = (cli.paths_for_steps / trials).max(2);
    let straddle = Payoff::Straddle { k: market.strike() };
    let straddle_price = reference_price(&market, &straddle, 1)?;
    let trial_sim = SimulationConfig::new(trial_paths, 1)?.with_seed(cli.seed);
    let plain = exact.repeated_trials(&market, &straddle, &trial_sim, trials, straddle_price)?;
    let antithetic = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace).with_antithetic())
        .repeated_trials(&market, &straddle, &trial_sim, trials, straddle_price)?;
    info!(
        plain_variance = plain.variance,
        antithetic_variance = antithetic.variance,
        ratio = plain.variance / antithetic.variance,
        "antithetic straddle"
    );

    // Control variate: arithmetic Asian against the matching geometric Asian
    let asian_steps = 50;
    let asian = Payoff::AsianArithmeticCall { k: market.strike() };
    let asian_sim = SimulationConfig::new(trial_paths, asian_steps)?.with_seed(cli.seed);
    let control = ControlVariate::geometric_asian(&market, asian_steps)?;
    let asian_plain = exact.repeated_trials(&market, &asian, &asian_sim, trials, control.price)?;
    let asian_cv = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace).with_control(control))
        .repeated_trials(&market, &asian, &asian_sim, trials, control.price)?;
    info!(
        plain_mean = asian_plain.mean,
        plain_variance = asian_plain.variance,
        cv_mean = asian_cv.mean,
        cv_variance = asian_cv.variance,
        ratio = asian_plain.variance / asian_cv.variance,
        geometric_price = control.price,
        "control variate arithmetic Asian"
    );

    let summary_file = csv_path(&cli.out_dir, "summary", &timestamp);
    write_summary_to_csv(
        &summary_file,
        &[
            ("seed", cli.seed.to_string()),
            ("bs_call", call_price.to_string()),
            ("bs_straddle", straddle_price.to_string()),
            ("geometric_asian_call", control.price.to_string()),
            ("trials", trials.to_string()),
            ("trial_paths", trial_paths.to_string()),
            ("straddle_plain_variance", plain.variance.to_string()),
            ("straddle_antithetic_variance", antithetic.variance.to_string()),
            ("asian_plain_mean", asian_plain.mean.to_string()),
            ("asian_plain_variance", asian_plain.variance.to_string()),
            ("asian_cv_mean", asian_cv.mean.to_string()),
            ("asian_cv_variance", asian_cv.variance.to_string()),
        ],
    )?;
    info!(file = %summary_file.display(), "wrote summary");
    Ok(())
}
