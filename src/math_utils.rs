// src/math_utils.rs
use ndarray::{ArrayView1, Zip};
use statrs::function::erf;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Standard normal CDF, Φ(x) = ½·erfc(-x/√2).
///
/// Going through `erfc` keeps full relative precision in the lower tail,
/// where `0.5 * (1 + erf(x/√2))` cancels to zero around x < -8.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erf::erfc(-x * FRAC_1_SQRT_2)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (1.0 / (2.0 * PI).sqrt()) * (-0.5 * x * x).exp()
}

/// Unbiased sample variance (n - 1 denominator). `None` below two samples.
pub fn sample_variance(values: ArrayView1<f64>) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.var(1.0))
}

/// Unbiased sample covariance of two equally sized vectors.
pub fn sample_covariance(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Option<f64> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }
    let mean_x = x.mean()?;
    let mean_y = y.mean()?;
    let mut acc = 0.0;
    Zip::from(&x).and(&y).for_each(|&a, &b| acc += (a - mean_x) * (b - mean_y));
    Some(acc / (n as f64 - 1.0))
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
