//! CLI argument parsing for the eigentrace driver

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "eigentrace")]
#[command(version)]
#[command(about = "Symmetric eigensolver pipeline with per-routine wall-clock timing", long_about = None)]
pub struct Cli {
    /// Matrix order for the KMS test problem
    #[arg(short = 'n', long = "size", value_name = "N", default_value = "1000")]
    pub size: usize,

    /// KMS correlation parameter, must lie strictly inside (-1, 1)
    #[arg(long = "rho", value_name = "RHO", default_value = "0.95")]
    pub rho: f64,

    /// Diagonal shift added to the test matrix (>= 0)
    #[arg(long = "shift", value_name = "DELTA", default_value = "0.0")]
    pub shift: f64,

    /// Compute eigenvectors as well as eigenvalues
    #[arg(short = 'v', long = "vectors")]
    pub vectors: bool,

    /// Directory receiving the eigenvalue output file
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "out")]
    pub output: PathBuf,

    /// Write the timing report as JSON to the given path
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Enable debug tracing output
    #[arg(long)]
    pub debug: bool,
}
