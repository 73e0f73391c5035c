//! Discovers subtrajectory clusters (pathlets) in a 2D polygonal trajectory
//! file under discrete Frechet distance.

mod cli;
mod io;
mod utils;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::time::Instant;

use clap::Parser;
use pathlets_core::{driver, validate, ClusterRoutine, ClusteringDriver, EfficacyFactors, RadiusIndex, RightstepConfig};
use pathlets_distances::Euclidean2D;

use cli::{Args, Mode};

fn main() -> Result<(), String> {
    let args = Args::parse();

    let logs_dir = std::env::temp_dir().join("pathlets-logs");
    let (_guard, log_path) = utils::configure_logger(&logs_dir)?;
    ftlog::info!("logging to {}", log_path.display());

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads as usize)
        .build_global()
        .map_err(|e| e.to_string())?;

    if !args.input.exists() {
        return Err(format!("input file '{}' does not exist", args.input.display()));
    }

    let file = File::open(&args.input).map_err(|e| format!("failed to open '{}': {e}", args.input.display()))?;
    let store = io::read_trajectory_with_timestamps_from_file(BufReader::new(file))?;

    let [dist_min, dist_max] = args.distance_limit[..] else {
        return Err("--distance_limit takes exactly two values".to_owned());
    };
    let [c1, c2, c3] = args.c[..] else {
        return Err("--c takes exactly three values".to_owned());
    };

    let metric = Euclidean2D;
    let index = RadiusIndex::build(&store, &metric);

    let efficacy_factors = EfficacyFactors {
        c1,
        c2,
        c3,
        ignore_point_clusters: args.ignore_point_clusters,
    };
    let config = RightstepConfig {
        tree_intervals_only: !args.all_intervals,
        curve_simplification_factor: args.simplify,
        prefer_small_subtrajectories: args.mode == Mode::Center,
        cost_per_pathlet: 0.0,
    };

    let min_distance = (dist_min >= 0.0).then_some(dist_min);
    let max_distance = (dist_max >= 0.0).then_some(dist_max);

    let mut clustering_driver = ClusteringDriver::new(
        &store,
        &index,
        &metric,
        min_distance,
        max_distance,
        efficacy_factors,
        config,
        ClusterRoutine::Rightstep,
    );

    let start = Instant::now();
    match args.mode {
        Mode::Center => clustering_driver.perform_center_clustering(),
        Mode::Means => clustering_driver.perform_means_clustering(),
    }
    let elapsed = start.elapsed().as_secs_f64();

    let had_overlap = validate::validate_no_overlap(clustering_driver.pathlets());
    if had_overlap {
        ftlog::warn!("clustering produced overlapping members");
    }

    let dataset_name = utils::strip_directories(&args.input.to_string_lossy());
    let sq_distances = clustering_driver.sq_distances();
    let (dist_min, dist_max) = (
        sq_distances.first().copied().unwrap_or(0.0).sqrt(),
        sq_distances.last().copied().unwrap_or(0.0).sqrt(),
    );

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).map_err(|e| format!("failed to create '{}': {e}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    writeln!(out, "{dataset_name}").map_err(|e| e.to_string())?;
    writeln!(out, "rightstep {c1} {c2} {c3} {dist_min} {dist_max}").map_err(|e| e.to_string())?;
    writeln!(out, "{elapsed}").map_err(|e| e.to_string())?;
    driver::print_clustering_spaced(&store, clustering_driver.pathlets(), &mut out).map_err(|e| e.to_string())?;

    Ok(())
}
