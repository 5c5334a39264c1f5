// tests/integration_test.rs
use gbm_mc::analysis::{path_count_grid, step_count_grid, ConvergenceAnalyzer};
use gbm_mc::analytics::asian_analytic::{geometric_asian_call_price, GeometricAveraging};
use gbm_mc::analytics::{bs_analytic, reference_price};
use gbm_mc::config::{MarketParameters, SimulationConfig};
use gbm_mc::mc::mc_engine::{ControlVariate, McEstimator};
use gbm_mc::mc::payoffs::Payoff;
use gbm_mc::rng::SeededSource;
use gbm_mc::solvers::Scheme;

fn market() -> MarketParameters {
    MarketParameters::new(100.0, 100.0, 1.0, 0.05, 0.2).expect("Valid market")
}

#[test]
fn test_bs_mc_vs_analytic() {
    let sim = SimulationConfig::new(1_000_000, 1).expect("Valid configuration");
    let estimate = McEstimator::plain(Scheme::LogSpace)
        .price(
            &market(),
            &sim,
            &Payoff::EuropeanCall { k: 100.0 },
            &mut SeededSource::new(42),
        )
        .expect("Valid configuration");

    let analytic_price = bs_analytic::bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
    println!("\nMC Price: {} ± {:?}", estimate.price, estimate.std_error);
    println!("Analytic Price: {}", analytic_price);

    assert!(
        (estimate.price - 10.4506).abs() < 0.05,
        "MC price {} too far from 10.4506",
        estimate.price
    );
    assert!(estimate.std_error.unwrap() < 0.02);
}

#[test]
fn test_antithetic_reduces_straddle_error_at_equal_draws() {
    let sim = SimulationConfig::new(100_000, 1).unwrap();
    let straddle = Payoff::Straddle { k: 100.0 };

    let plain = McEstimator::plain(Scheme::LogSpace)
        .price(&market(), &sim, &straddle, &mut SeededSource::new(7))
        .unwrap();
    let antithetic = McEstimator::plain(Scheme::LogSpace)
        .with_antithetic()
        .price(&market(), &sim, &straddle, &mut SeededSource::new(7))
        .unwrap();

    let oracle = reference_price(&market(), &straddle, 1).unwrap();
    println!("\nStraddle oracle: {}", oracle);
    println!("Plain: {} ± {:?}", plain.price, plain.std_error);
    println!("Antithetic: {} ± {:?}", antithetic.price, antithetic.std_error);

    assert!(antithetic.std_error.unwrap() < plain.std_error.unwrap());
    assert!((antithetic.price - oracle).abs() < 4.0 * antithetic.std_error.unwrap());
}

#[test]
fn test_antithetic_variance_over_repeated_trials() {
    let sim = SimulationConfig::new(2_000, 1).unwrap().with_seed(2024);
    let call = Payoff::EuropeanCall { k: 100.0 };
    let oracle = reference_price(&market(), &call, 1).unwrap();

    let plain = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace))
        .repeated_trials(&market(), &call, &sim, 200, oracle)
        .unwrap();
    let antithetic = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace).with_antithetic())
        .repeated_trials(&market(), &call, &sim, 200, oracle)
        .unwrap();

    println!("\nPlain trials: {:?}", plain);
    println!("Antithetic trials: {:?}", antithetic);
    assert!(antithetic.variance < plain.variance);
    assert!(antithetic.rmse < plain.rmse);
}

#[test]
fn test_asian_option_cv() {
    let steps = 50;
    let sim = SimulationConfig::new(20_000, steps).unwrap();
    let asian = Payoff::AsianArithmeticCall { k: 100.0 };
    let control = ControlVariate::geometric_asian(&market(), steps).unwrap();

    let plain = McEstimator::plain(Scheme::LogSpace)
        .price(&market(), &sim, &asian, &mut SeededSource::new(43))
        .unwrap();
    let with_cv = McEstimator::plain(Scheme::LogSpace)
        .with_control(control)
        .price(&market(), &sim, &asian, &mut SeededSource::new(43))
        .unwrap();

    let vrf = (plain.std_error.unwrap() / with_cv.std_error.unwrap()).powi(2);
    println!("\nAsian Call Price (with CV): {}", with_cv.price);
    println!("Asian Call Price (without CV): {}", plain.price);
    println!("Geometric control price: {}", control.price);
    println!("beta: {:?}", with_cv.control_beta);
    println!("Variance Reduction Factor (Asian): {}", vrf);

    assert!(vrf > 25.0, "Variance Reduction Factor ({}) is too small", vrf);
    assert!((with_cv.price - plain.price).abs() < 4.0 * plain.std_error.unwrap());
    assert!(with_cv.price > control.price);
    let beta = with_cv.control_beta.unwrap();
    assert!(beta > 0.8 && beta < 1.2, "beta = {}", beta);
}

#[test]
fn test_antithetic_and_control_compose() {
    let steps = 12;
    let sim = SimulationConfig::new(20_000, steps).unwrap();
    let asian = Payoff::AsianArithmeticCall { k: 100.0 };
    let control = ControlVariate::geometric_asian(&market(), steps).unwrap();

    let cv = McEstimator::plain(Scheme::LogSpace)
        .with_control(control)
        .price(&market(), &sim, &asian, &mut SeededSource::new(5))
        .unwrap();
    let both = McEstimator::plain(Scheme::LogSpace)
        .with_antithetic()
        .with_control(control)
        .price(&market(), &sim, &asian, &mut SeededSource::new(5))
        .unwrap();

    assert_eq!(both.samples, 20_000);
    assert!(both.control_beta.is_some());
    assert!((both.price - cv.price).abs() < 6.0 * cv.std_error.unwrap());
}

#[test]
fn test_geometric_asian_mc_matches_discrete_closed_form() {
    let steps = 12;
    let sim = SimulationConfig::new(200_000, steps).unwrap();
    let payoff = Payoff::AsianGeometricCall { k: 100.0 };
    let estimate = McEstimator::plain(Scheme::LogSpace)
        .with_antithetic()
        .price(&market(), &sim, &payoff, &mut SeededSource::new(99))
        .unwrap();
    let closed_form = geometric_asian_call_price(
        100.0,
        100.0,
        0.05,
        0.2,
        1.0,
        GeometricAveraging::Discrete { steps },
    )
    .unwrap();

    assert_eq!(closed_form, reference_price(&market(), &payoff, steps).unwrap());
    assert!(
        (estimate.price - closed_form).abs() < 4.0 * estimate.std_error.unwrap(),
        "MC {} vs closed form {}",
        estimate.price,
        closed_form
    );
}

#[test]
fn test_path_sweep_error_shrinks_like_inverse_sqrt_paths() {
    let analyzer = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::LogSpace));
    let call = Payoff::EuropeanCall { k: 100.0 };
    let oracle = reference_price(&market(), &call, 1).unwrap();
    let grid = path_count_grid(&[1_000, 10_000, 100_000], 1, Some(42));
    let points = analyzer.analyze(&market(), &call, oracle, &grid).unwrap();

    assert_eq!(points.len(), 3);
    for pair in points.windows(2) {
        let ratio = pair[0].estimate.std_error.unwrap() / pair[1].estimate.std_error.unwrap();
        assert!(ratio > 2.6 && ratio < 3.8, "std error ratio {}", ratio);
    }
    let last = points.last().unwrap();
    assert!(last.abs_error() < 4.0 * last.estimate.std_error.unwrap());
}

#[test]
fn test_euler_step_sweep_exposes_discretization_bias() {
    let analyzer = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::euler()).with_antithetic());
    let call = Payoff::EuropeanCall { k: 100.0 };
    let oracle = reference_price(&market(), &call, 1).unwrap();
    let grid = step_count_grid(100_000, &[1, 100], Some(42));
    let points = analyzer.analyze(&market(), &call, oracle, &grid).unwrap();

    println!("\nEuler sweep: {:?}", points);
    assert!(points[0].abs_error() > 0.15);
    assert!(points[0].abs_error() > points[1].abs_error());
    assert!(points[1].abs_error() < 0.1);
}

#[test]
fn test_sweeps_are_reproducible() {
    let analyzer = ConvergenceAnalyzer::new(McEstimator::plain(Scheme::euler()));
    let call = Payoff::EuropeanCall { k: 100.0 };
    let grid = step_count_grid(5_000, &[1, 4, 16], Some(3));

    let first = analyzer.analyze(&market(), &call, 10.45, &grid).unwrap();
    let second = analyzer.analyze(&market(), &call, 10.45, &grid).unwrap();
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.estimate, b.estimate);
        assert_eq!(a.config, b.config);
    }
}
