// src/output.rs
//! Plain CSV writers for sweep results and run summaries.

use crate::analysis::convergence::ConvergencePoint;
use crate::mc::estimate::Z_95;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One row per sweep point, with the 95% interval around the price.
/// A missing standard error leaves its field and the interval empty.
pub fn write_convergence_csv<P: AsRef<Path>>(filename: P, points: &[ConvergencePoint]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "paths,steps,price,std_error,ci_low,ci_high,error,abs_error,elapsed_ms")?;
    for point in points {
        let std_error = point
            .estimate
            .std_error
            .map(|se| se.to_string())
            .unwrap_or_default();
        let (ci_low, ci_high) = point
            .estimate
            .confidence_interval(Z_95)
            .map(|(lo, hi)| (format!("{:.6}", lo), format!("{:.6}", hi)))
            .unwrap_or_default();
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{:.3}",
            point.config.paths,
            point.config.steps,
            point.estimate.price,
            std_error,
            ci_low,
            ci_high,
            point.error,
            point.abs_error(),
            point.elapsed_ms
        )?;
    }
    file.flush()
}

/// `key,value` lines, in the order given.
pub fn write_summary_to_csv<P: AsRef<Path>>(filename: P, summary_data: &[(&str, String)]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "key,value")?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key, value)?;
    }
    file.flush()
}
