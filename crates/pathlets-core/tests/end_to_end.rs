//! End-to-end scenarios covering the full pipeline: a trajectory store, a
//! radius index, and a clustering driver or a standalone routine running
//! over the same input.

use pathlets_core::bbgll::BbgllRoutine;
use pathlets_core::driver::{ClusteringDriver, EfficacyFactors};
use pathlets_core::frechet;
use pathlets_core::rightstep::RightstepConfig;
use pathlets_core::trajectory::{Id, Subtrajectory, TrajectoryStore};
use pathlets_core::validate::validate_no_overlap;
use pathlets_core::{ClusterRoutine, RadiusIndex};
use pathlets_distances::{Euclidean2D, Point2};

fn push_line(store: &mut TrajectoryStore<Point2>, id: u32, points: &[(f64, f64)]) {
    for &(x, y) in points {
        store.push(Point2::new(x, y), Id(id));
    }
}

/// Three identical 2-segment curves: [(0,0),(1,0),(2,0)] repeated for ids 0-2.
#[test]
fn three_identical_curves_form_one_center_cluster() {
    let mut store = TrajectoryStore::new();
    for id in 0..3 {
        push_line(&mut store, id, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    }
    let metric = Euclidean2D;
    let index = RadiusIndex::build(&store, &metric);

    let config = RightstepConfig {
        tree_intervals_only: false,
        curve_simplification_factor: 0.0,
        prefer_small_subtrajectories: true,
        cost_per_pathlet: 0.0,
    };
    let mut driver = ClusteringDriver::new(
        &store,
        &index,
        &metric,
        Some(0.1),
        Some(1.0),
        EfficacyFactors::default(),
        config,
        ClusterRoutine::Rightstep,
    );
    driver.perform_center_clustering();

    assert_eq!(driver.pathlets().len(), 1);
    let cluster = &driver.pathlets()[0];
    assert_eq!(cluster.len(), 3);
    assert_eq!(cluster.reference().len(), 2);
    assert!(!validate_no_overlap(driver.pathlets()));
}

/// Deleting a range of the store must make every later query skip it.
#[test]
fn deleted_points_never_resurface_in_search_or_bbgll() {
    let mut store = TrajectoryStore::new();
    for i in 0..20 {
        push_line(&mut store, 0, &[(f64::from(i), 0.0)]);
    }
    let metric = Euclidean2D;
    let mut index = RadiusIndex::build(&store, &metric);

    store.delete_subtrajectory(Subtrajectory::new(4, 7));
    for i in 4..=7 {
        index.delete_point(i);
    }

    for i in 0..20 {
        if (4..=7).contains(&i) {
            continue;
        }
        let hits = index.search(&store, &metric, i, 4.0);
        assert!(!hits.iter().any(|&h| (4..=7).contains(&h)));
    }

    let routine = BbgllRoutine::new(&store, &index, &metric);
    let cluster = routine.find_max_cardinality_cluster_of_fixed_length(1, 0.25);
    for member in cluster.members() {
        assert!(!(4..=7).contains(&member.start));
        assert!(!(4..=7).contains(&member.end));
    }
}

/// Discrete Frechet distance between two parallel 4-point rows is the row
/// gap; moving one point further away raises the distance to that gap.
#[test]
fn frechet_distance_between_parallel_rows() {
    let mut store = TrajectoryStore::new();
    push_line(&mut store, 0, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    push_line(&mut store, 1, &[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0), (3.0, 1.0)]);
    let p = Subtrajectory::new(0, 3);
    let q = Subtrajectory::new(4, 7);
    let metric = Euclidean2D;

    let sq_dist = frechet::compute(&store, &metric, p, q);
    assert!((sq_dist.sqrt() - 1.0).abs() < 1e-9);

    let mut store2 = TrajectoryStore::new();
    push_line(&mut store2, 0, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    push_line(&mut store2, 1, &[(0.0, 2.0), (1.0, 1.0), (2.0, 1.0), (3.0, 1.0)]);
    let sq_dist2 = frechet::compute(&store2, &metric, p, q);
    assert!((sq_dist2.sqrt() - 2.0).abs() < 1e-9);
}

/// BBGLL's fixed-cardinality search must never chain across trajectory ids
/// even when points from different ids happen to sit close together.
#[test]
fn bbgll_does_not_chain_across_trajectory_ids() {
    let mut store = TrajectoryStore::new();
    push_line(&mut store, 0, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    push_line(&mut store, 1, &[(10.0, 10.0), (11.0, 10.0), (12.0, 10.0), (13.0, 10.0)]);
    let metric = Euclidean2D;
    let index = RadiusIndex::build(&store, &metric);
    let routine = BbgllRoutine::new(&store, &index, &metric);

    let cluster = routine.find_max_cardinality_cluster_of_fixed_length(3, 0.09);
    for member in cluster.members() {
        let start_id = store.original_id_at(member.start);
        let end_id = store.original_id_at(member.end);
        assert_eq!(start_id, end_id, "a member must not span two trajectory ids");
    }
}

/// Means-mode clustering must never let two clusters claim the same point.
#[test]
fn means_clustering_never_overlaps() {
    let mut store = TrajectoryStore::new();
    push_line(&mut store, 0, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    push_line(&mut store, 1, &[(0.0, 5.0), (1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]);
    let metric = Euclidean2D;
    let index = RadiusIndex::build(&store, &metric);

    let config = RightstepConfig {
        tree_intervals_only: true,
        curve_simplification_factor: 0.0,
        prefer_small_subtrajectories: false,
        cost_per_pathlet: 0.0,
    };
    let mut driver = ClusteringDriver::new(
        &store,
        &index,
        &metric,
        Some(0.1),
        Some(1.0),
        EfficacyFactors::default(),
        config,
        ClusterRoutine::Rightstep,
    );
    driver.perform_means_clustering();
    assert!(!validate_no_overlap(driver.pathlets()));
}
