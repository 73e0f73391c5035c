//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Which efficacy objective the clustering loop optimizes.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum Mode {
    /// Maximize total coverage minus a per-pathlet cost.
    Means,
    /// Minimize the worst-case distance to a cluster's reference.
    Center,
}

/// Discovers subtrajectory clusters (pathlets) in 2D polygonal trajectories
/// under discrete Frechet distance.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The input trajectory file, in `id t x y` format.
    pub input: PathBuf,

    /// The output file. Defaults to stdout if not given.
    pub output: Option<PathBuf>,

    /// Squared-distance ladder bounds `lo hi`. `-1 -1` auto-computes both
    /// from the nearest/farthest-neighbor distances in the data.
    #[arg(short = 'd', long = "distance_limit", num_args = 2, default_values_t = [-1.0, -1.0])]
    pub distance_limit: Vec<f64>,

    /// Efficacy factors `c1 c2 c3`, per Agarwal et al. (PODS'18).
    #[arg(short = 'c', long = "c", num_args = 3, default_values_t = [1.0, 0.005, 1.0])]
    pub c: Vec<f64>,

    /// Exclude single-point clusters from the efficacy objective.
    #[arg(short = 'p', long = "ignore_point_clusters")]
    pub ignore_point_clusters: bool,

    /// Search all candidate reference intervals instead of just the
    /// O(n log n) tree-interval 2-approximation.
    #[arg(short = 'a', long = "all_intervals")]
    pub all_intervals: bool,

    /// Number of worker threads.
    #[arg(short = 't', long = "threads", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=999))]
    pub threads: u32,

    /// Curve-simplification factor in `[0.0, 1.0]`.
    #[arg(short = 's', long = "simplify", default_value_t = 0.2, value_parser = parse_simplify_factor)]
    pub simplify: f64,

    /// Clustering objective.
    #[arg(short = 'm', long = "mode", value_enum, default_value_t = Mode::Center)]
    pub mode: Mode,
}

/// Parses and range-checks the `--simplify` argument.
fn parse_simplify_factor(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("simplify factor must be within [0.0, 1.0], got {value}"))
    }
}
