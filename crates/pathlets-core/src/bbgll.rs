//! C6: the BBGLL subtrajectory-cluster routine (Buchin et al.), built on top
//! of the retrieving free-space graph (C4) and the radius index (C2).
//!
//! Slides a reference window `[left_column, right_column]` across the whole
//! point sequence, keeping the best cluster seen so far under one of two
//! objectives: longest reference trajectory, or highest cardinality.

use pathlets_distances::SquaredMetric;

use crate::cluster::SubtrajectoryCluster;
use crate::graph::retrieving::RetrievingGraph;
use crate::radius_index::{AsXy, RadiusIndex};
use crate::trajectory::{Id, Ix, TrajectoryStore};

/// An objective function over a finished [`SubtrajectoryCluster`], used to
/// pick the best cluster seen while sweeping.
pub trait Objective {
    /// A value comparable for "better than".
    type Value: Copy + PartialOrd;
    /// A value no real cluster can produce, used to seed the search.
    const LOWER_BOUND: Self::Value;
    /// Scores `cluster`.
    fn evaluate(cluster: &SubtrajectoryCluster) -> Self::Value;
}

/// Ranks clusters by the number of segments in their reference subtrajectory.
pub struct LengthObjective;

impl Objective for LengthObjective {
    type Value = i64;
    const LOWER_BOUND: i64 = -1;

    fn evaluate(cluster: &SubtrajectoryCluster) -> i64 {
        let r = cluster.reference();
        r.end as i64 - r.start as i64
    }
}

/// Ranks clusters by their member count.
pub struct CardinalityObjective;

impl Objective for CardinalityObjective {
    type Value = i64;
    const LOWER_BOUND: i64 = -1;

    fn evaluate(cluster: &SubtrajectoryCluster) -> i64 {
        cluster.len() as i64
    }
}

/// A double-buffer that keeps the best cluster seen so far under `O`,
/// letting the caller fill a scratch cluster and then test it for
/// improvement without extra allocation.
struct BestClusterStore<O: Objective> {
    clusters: [SubtrajectoryCluster; 2],
    best_is_first: bool,
    best_value: O::Value,
}

impl<O: Objective> BestClusterStore<O> {
    fn new() -> Self {
        Self {
            clusters: [SubtrajectoryCluster::new(), SubtrajectoryCluster::new()],
            best_is_first: true,
            best_value: O::LOWER_BOUND,
        }
    }

    fn temp_cluster_mut(&mut self) -> &mut SubtrajectoryCluster {
        if self.best_is_first {
            &mut self.clusters[1]
        } else {
            &mut self.clusters[0]
        }
    }

    /// Scores the current temp cluster; if it beats the stored best, swaps
    /// roles so the temp cluster becomes the new best.
    fn test_for_improvement(&mut self) -> bool {
        let temp_idx = usize::from(self.best_is_first);
        let value = O::evaluate(&self.clusters[temp_idx]);
        if value > self.best_value {
            self.best_is_first = !self.best_is_first;
            self.best_value = value;
            true
        } else {
            false
        }
    }

    fn into_best(self) -> SubtrajectoryCluster {
        let [a, b] = self.clusters;
        if self.best_is_first { a } else { b }
    }
}

/// The BBGLL sliding-window routine over one trajectory collection.
pub struct BbgllRoutine<'a, P, M> {
    store: &'a TrajectoryStore<P>,
    index: &'a RadiusIndex,
    metric: &'a M,
}

impl<'a, P: AsXy + Clone, M: SquaredMetric<P>> BbgllRoutine<'a, P, M> {
    /// Builds a routine over `store`, using `index` for radius queries.
    #[must_use]
    pub const fn new(store: &'a TrajectoryStore<P>, index: &'a RadiusIndex, metric: &'a M) -> Self {
        Self { store, index, metric }
    }

    fn populate_column(&self, graph: &mut RetrievingGraph, column_idx: Ix, sq_distance: f64) {
        let hits = self.index.search(self.store, self.metric, column_idx, sq_distance);
        debug_assert!(!hits.is_empty(), "a point is always within range of itself");
        for idx in hits {
            graph.add_zero(idx);
        }
    }

    /// Advances `right_column` to the next non-tombstoned index, adding it as
    /// a fresh column of `graph`. Returns whether a tombstoned point was
    /// skipped along the way.
    fn advance_to_next_right_column(&self, sq_distance: f64, graph: &mut RetrievingGraph, right_column: &mut Ix) -> bool {
        let mut skipped_deleted = false;
        loop {
            *right_column += 1;
            if *right_column >= self.store.total_len() {
                return skipped_deleted;
            }
            if self.store.id_at(*right_column) == Id::DELETED {
                skipped_deleted = true;
            } else {
                break;
            }
        }
        graph.new_column_at(*right_column);
        self.populate_column(graph, *right_column, sq_distance);
        skipped_deleted
    }

    /// Finds the cluster with the most members among all reference ranges of
    /// exactly `target_length` segments at squared distance `sq_distance`.
    #[must_use]
    pub fn find_max_cardinality_cluster_of_fixed_length(&self, target_length: Ix, sq_distance: f64) -> SubtrajectoryCluster {
        let mut right_column = self.store.first_non_deleted();
        let mut left_column = right_column;
        let mut graph = RetrievingGraph::new(right_column);
        self.populate_column(&mut graph, right_column, sq_distance);

        let mut clusters = BestClusterStore::<CardinalityObjective>::new();
        loop {
            self.advance_with_fixed_length(target_length, sq_distance, &mut graph, &mut left_column, &mut right_column);
            if right_column >= self.store.total_len() {
                break;
            }

            let temp = clusters.temp_cluster_mut();
            temp.clear();
            graph.query_subtrajectories_respecting_ids(self.store, temp, usize::MAX);
            clusters.test_for_improvement();

            left_column += 1;
            graph.delete_column();

            if left_column >= self.store.total_len() {
                break;
            }
        }
        clusters.into_best()
    }

    fn advance_with_fixed_length(
        &self,
        target_length: Ix,
        sq_distance: f64,
        graph: &mut RetrievingGraph,
        left_column: &mut Ix,
        right_column: &mut Ix,
    ) {
        while *right_column - *left_column != target_length {
            let skipped_deleted = self.advance_to_next_right_column(sq_distance, graph, right_column);
            if *right_column >= self.store.total_len() {
                break;
            }
            if skipped_deleted || self.store.id_at(*right_column) != self.store.id_at(*left_column) {
                graph.advance_left_column_to_right();
                *left_column = *right_column;
            }
        }
    }

    /// Finds the cluster with the longest reference subtrajectory among
    /// those with at least `target_size` members at squared distance
    /// `sq_distance`.
    #[must_use]
    pub fn find_longest_cluster_of_target_size_by_cardinality(&self, target_size: Ix, sq_distance: f64) -> SubtrajectoryCluster {
        self.find_longest_cluster_of_target_size::<LengthObjective>(target_size, sq_distance)
    }

    fn find_longest_cluster_of_target_size<O: Objective>(&self, target_size: Ix, sq_distance: f64) -> SubtrajectoryCluster {
        let mut right_column = self.store.first_non_deleted();
        let mut left_column = right_column;
        let mut graph = RetrievingGraph::new(right_column);
        self.populate_column(&mut graph, right_column, sq_distance);

        let mut clusters = BestClusterStore::<O>::new();
        let mut skipped_deleted = false;
        loop {
            let temp = clusters.temp_cluster_mut();
            temp.clear();
            graph.query_subtrajectories_respecting_ids(self.store, temp, target_size);

            if temp.len() < target_size && left_column != right_column {
                graph.delete_column();
                left_column += 1;
            } else {
                if temp.len() >= target_size {
                    clusters.test_for_improvement();
                }
                skipped_deleted = self.advance_to_next_right_column(sq_distance, &mut graph, &mut right_column);
                if right_column >= self.store.total_len() {
                    break;
                }
                if skipped_deleted || self.store.id_at(right_column) != self.store.id_at(left_column) {
                    graph.advance_left_column_to_right();
                    left_column = right_column;
                }
                skipped_deleted = false;
            }

            if left_column >= self.store.total_len() {
                break;
            }
        }
        let _ = skipped_deleted;
        clusters.into_best()
    }

    /// Finds the highest-cardinality cluster, breaking ties by longest
    /// reference subtrajectory. When `min_length` is `0`, the maximum
    /// cardinality is taken from the largest single-point neighborhood;
    /// otherwise it is taken from the best fixed-length cluster of that
    /// length. Returns `None` only when `min_length > 0` and no cluster of
    /// that length covers anything.
    #[must_use]
    pub fn find_max_cardinality_cluster_maximizing_length(
        &self,
        sq_distance: f64,
        min_length: Ix,
    ) -> Option<SubtrajectoryCluster> {
        let target_size = if min_length == 0 {
            let mut max_neighbors = 0;
            for idx in 0..self.store.total_len() {
                if self.store.id_at(idx) != Id::DELETED {
                    let hits = self.index.search(self.store, self.metric, idx, sq_distance);
                    max_neighbors = max_neighbors.max(hits.len());
                }
            }
            max_neighbors
        } else {
            self.find_max_cardinality_cluster_of_fixed_length(min_length, sq_distance).len()
        };

        if target_size == 0 {
            debug_assert!(min_length > 0);
            return None;
        }

        Some(self.find_longest_cluster_of_target_size_by_cardinality(target_size, sq_distance))
    }
}
