//! C7: the right-step subtrajectory-cluster routine.
//!
//! Finds, among all candidate reference ranges respecting trajectory
//! boundaries and deletions, the single one that scores best under a
//! coverage-per-cost (or raw coverage) objective, using the incremental
//! free-space graph (C5) to rank candidates before paying for a full
//! reconstruction against the retrieving graph (C4).
//!
//! Row indices are "spaced" (`spaced(i) = i + id(i)`) before being handed to
//! [`IncrementalGraph`], so that consecutive trajectories never appear
//! contiguous to it; [`RightstepRoutine::to_subtrajectory_cluster`] undoes
//! the spacing once a winning candidate has been reconstructed.

use pathlets_distances::SquaredMetric;

use crate::cluster::SubtrajectoryCluster;
use crate::graph::incremental::{ClusterQuality, IncrementalGraph};
use crate::radius_index::{AsXy, RadiusIndex};
use crate::trajectory::{Id, Ix, Subtrajectory, TrajectoryStore};

/// The coverage/cost summary a candidate reference range is scored by. Also
/// the type curve simplification (C8) maps back to original indices via
/// [`RightstepRoutine::to_subtrajectory_cluster`]'s inputs.
pub type ClusterSummary = ClusterQuality;

/// Tuning knobs for one right-step search.
#[derive(Clone, Copy, Debug)]
pub struct RightstepConfig {
    /// Restrict candidates to the O(n log n) tree-interval columns (a
    /// 2-approximation) instead of the exhaustive O(n^2) sweep.
    pub tree_intervals_only: bool,
    /// Merge consecutive points within `factor * distance` of each other
    /// before searching; `0.0` leaves the trajectory unsimplified. Only
    /// consumed by curve simplification (C8), kept here for documentation.
    pub curve_simplification_factor: f64,
    /// Break ties toward many small subtrajectories (good for k-center) or
    /// few large ones (good for k-means).
    pub prefer_small_subtrajectories: bool,
    /// Cost of adding one more pathlet to a cluster. `0.0` for k-means,
    /// `c3 * distance / c1` for k-center.
    pub cost_per_pathlet: f64,
}

impl Default for RightstepConfig {
    fn default() -> Self {
        Self {
            tree_intervals_only: false,
            curve_simplification_factor: 0.0,
            prefer_small_subtrajectories: true,
            cost_per_pathlet: 0.0,
        }
    }
}

/// A prefix-sum table answering `sum(l, r)`, the total weight of indices in
/// the half-open range `[l, r)`.
struct PrefixSum(Vec<f64>);

impl PrefixSum {
    fn build(weights: &[f64]) -> Self {
        let mut acc = Vec::with_capacity(weights.len() + 1);
        acc.push(0.0);
        for &w in weights {
            acc.push(acc.last().unwrap() + w);
        }
        Self(acc)
    }

    fn sum(&self, l: Ix, r: Ix) -> f64 {
        self.0[r] - self.0[l]
    }
}

/// The right-step routine over one trajectory collection.
pub struct RightstepRoutine<'a, P, M> {
    store: &'a TrajectoryStore<P>,
    index: &'a RadiusIndex,
    metric: &'a M,
    point_weights: PrefixSum,
    config: RightstepConfig,
}

impl<'a, P: AsXy + Clone, M: SquaredMetric<P>> RightstepRoutine<'a, P, M> {
    /// Builds a routine over `store`. `point_weights` gives one weight per
    /// point (curve-simplified points carry the number of original points
    /// they replace; pass all-ones for an unsimplified trajectory).
    ///
    /// # Panics
    ///
    /// Panics in debug builds unless `store` is sorted by trajectory id.
    #[must_use]
    pub fn new(
        store: &'a TrajectoryStore<P>,
        index: &'a RadiusIndex,
        metric: &'a M,
        point_weights: &[f64],
        config: RightstepConfig,
    ) -> Self {
        debug_assert!(
            store.is_sorted_by_id(),
            "right-step requires points sorted by trajectory id"
        );
        Self {
            store,
            index,
            metric,
            point_weights: Self::reindex_with_trajectory_id(point_weights, store),
            config,
        }
    }

    /// The best cluster at squared distance `distance_max`, or an empty
    /// cluster if nothing covers anything.
    #[must_use]
    pub fn find_best_cluster(&self, distance_max: f64) -> SubtrajectoryCluster {
        match self.find_best_cluster_candidate(distance_max) {
            Some(candidate) => self.to_subtrajectory_cluster(&candidate, distance_max),
            None => SubtrajectoryCluster::new(),
        }
    }

    /// The best-scoring candidate reference range at squared distance
    /// `distance_max`, ranked by coverage-per-cost when a cost model is in
    /// effect and by raw coverage otherwise.
    #[must_use]
    pub fn find_best_cluster_candidate(&self, distance_max: f64) -> Option<ClusterSummary> {
        if self.config.cost_per_pathlet > 0.0 {
            self.find_best_cluster_by(distance_max, |c| {
                (c.coverage_per_cost, c.right_column - c.left_column)
            })
        } else {
            self.find_best_cluster_by(distance_max, |c| {
                (c.covered_points_weight, c.right_column - c.left_column)
            })
        }
    }

    /// Reconstructs `cluster_candidate` into a full [`SubtrajectoryCluster`].
    #[must_use]
    pub fn to_subtrajectory_cluster(
        &self,
        cluster_summary: &ClusterSummary,
        distance_max: f64,
    ) -> SubtrajectoryCluster {
        let mut free_space = IncrementalGraph::new(
            cluster_summary.left_column,
            self.config.prefer_small_subtrajectories,
            self.config.cost_per_pathlet,
        );
        for column in cluster_summary.left_column..=cluster_summary.right_column {
            if column != cluster_summary.left_column {
                free_space.new_column();
            }
            for idx in self.index.search(self.store, self.metric, column, distance_max) {
                if self.store.is_deleted(idx) {
                    continue;
                }
                free_space.add_zero(self.spaced_index(idx));
            }
        }

        let mut cluster = SubtrajectoryCluster::new();
        free_space.query_subtrajectories(
            &mut cluster,
            self.spaced_index(cluster_summary.left_column),
            self.spaced_index(cluster_summary.right_column),
        );

        cluster.set_reference(Subtrajectory::new(
            cluster_summary.left_column,
            cluster_summary.right_column,
        ));
        self.undo_index_spacing(&mut cluster);
        cluster
    }

    fn spaced_index(&self, index: Ix) -> Ix {
        index + self.store.id_at(index).0 as usize
    }

    /// `adjust_index(adjust_index(i)) == i`, and `adjust_index(i + 1) ==
    /// adjust_index(i) - 1`; used to reuse the forward column-sweep logic for
    /// a backward sweep by complementing every index involved.
    const fn adjust_index(index: Ix, reverse: bool) -> Ix {
        if reverse {
            (!index).wrapping_sub(1)
        } else {
            index
        }
    }

    fn reindex_with_trajectory_id(old_weights: &[f64], store: &TrajectoryStore<P>) -> PrefixSum {
        let mut new_weights = vec![0.0; store.total_len() + store.num_trajectories()];
        for i in 0..store.total_len() {
            if store.is_deleted(i) {
                continue;
            }
            new_weights[i + store.id_at(i).0 as usize] = old_weights[i];
        }
        PrefixSum::build(&new_weights)
    }

    /// Maps every member's spaced indices back to the unspaced index space,
    /// in place. Requires indices to be visited in non-increasing order,
    /// which holds because [`IncrementalGraph::query_subtrajectories`]
    /// yields members from the rightmost row backward.
    fn undo_index_spacing(&self, cluster: &mut SubtrajectoryCluster) {
        let mut orig_index = self.store.total_len() - 1;
        let mut unspace = |index: &mut Ix, orig_index: &mut Ix| {
            while self.store.is_deleted(*orig_index) || self.spaced_index(*orig_index) != *index {
                *orig_index -= 1;
            }
            *index = *orig_index;
        };
        for member in cluster.members_mut() {
            unspace(&mut member.end, &mut orig_index);
            unspace(&mut member.start, &mut orig_index);
        }
    }

    fn find_best_cluster_by(
        &self,
        distance_max: f64,
        score: impl Fn(&ClusterSummary) -> (f64, Ix),
    ) -> Option<ClusterSummary> {
        let mut best: Option<ClusterSummary> = None;
        let mut best_score = (f64::NEG_INFINITY, 0_usize);
        let mut record = |candidate: ClusterSummary| {
            let s = score(&candidate);
            if s.0 > best_score.0 || ((s.0 - best_score.0).abs() < f64::EPSILON && s.1 > best_score.1) {
                best_score = s;
                best = Some(candidate);
            }
        };

        if self.config.tree_intervals_only {
            self.foreach_tree_cluster(distance_max, &mut record);
        } else {
            self.foreach_possible_cluster(distance_max, &mut record);
        }
        best
    }

    fn foreach_possible_cluster(&self, distance_max: f64, callback: &mut impl FnMut(ClusterSummary)) {
        let mut free_space =
            IncrementalGraph::new(0, self.config.prefer_small_subtrajectories, self.config.cost_per_pathlet);
        for left_column in self.store.first_non_deleted()..self.store.total_len() {
            self.do_column_sweep(distance_max, callback, &mut free_space, left_column, self.store.total_len(), false);
        }
    }

    fn foreach_tree_cluster(&self, distance_max: f64, callback: &mut impl FnMut(ClusterSummary)) {
        let mut free_space =
            IncrementalGraph::new(0, self.config.prefer_small_subtrajectories, self.config.cost_per_pathlet);

        let sweep_distance = |column: Ix| -> Ix { column & column.wrapping_neg() };
        for column in self.store.first_non_deleted()..self.store.total_len() {
            if self.store.id_at(column) == Id::DELETED {
                continue;
            }
            // These column_end choices give a 2-approximation in O(n log n)
            // steps instead of the O(n^2) exhaustive sweep.
            let forward_end = (column + sweep_distance(column)).min(self.store.total_len());
            self.do_column_sweep(distance_max, callback, &mut free_space, column, forward_end, false);

            let backward_end = column.wrapping_sub(sweep_distance(column + 1));
            self.do_column_sweep(distance_max, callback, &mut free_space, column, backward_end, true);
        }

        // Also try each whole trajectory, for the case where a trajectory
        // only ever covers itself.
        let mut left_column = 0;
        let mut right_column = 0;
        while right_column <= self.store.total_len() {
            let at_boundary = right_column == self.store.total_len()
                || self.store.id_at(left_column) != self.store.id_at(right_column);
            if at_boundary {
                if self.store.id_at(left_column) != Id::DELETED {
                    self.do_column_sweep(distance_max, callback, &mut free_space, left_column, right_column - 1, false);
                }
                left_column = right_column;
            }
            right_column += 1;
        }
    }

    fn do_column_sweep(
        &self,
        distance_max: f64,
        callback: &mut impl FnMut(ClusterSummary),
        free_space: &mut IncrementalGraph,
        column_begin: Ix,
        column_end: Ix,
        reverse: bool,
    ) {
        let reference_id = self.store.id_at(column_begin);
        if reference_id == Id::DELETED {
            return;
        }

        free_space.reset(column_begin);
        let step: isize = if reverse { -1 } else { 1 };
        let mut column = column_begin;
        loop {
            if column == column_end || self.store.id_at(column) != reference_id {
                break;
            }
            self.populate_column(free_space, distance_max, column, reverse);

            let first_reference_row = Self::adjust_index(self.spaced_index(column_begin), reverse);
            let last_reference_row = Self::adjust_index(self.spaced_index(column), reverse);

            let mut summary = free_space.query_cluster_candidate(
                |l, r| {
                    let (l, r) = if reverse { (r.wrapping_sub(1), l.wrapping_sub(1)) } else { (l, r) };
                    self.point_weights.sum(Self::adjust_index(l, reverse), Self::adjust_index(r, reverse))
                },
                first_reference_row,
                last_reference_row,
            );

            debug_assert_eq!(summary.left_column, column_begin);
            debug_assert_eq!(
                (summary.right_column as isize - summary.left_column as isize) * step,
                column as isize - column_begin as isize
            );

            if summary.subtrajectories_count > 0 {
                if reverse {
                    // free_space always advances by one column, so the
                    // columns it reports need correcting for a backward sweep.
                    summary.left_column = column;
                    summary.right_column = column_begin;
                }
                callback(summary);
            }

            free_space.new_column();
            if reverse {
                if column == 0 {
                    break;
                }
                column -= 1;
            } else {
                column += 1;
            }
        }
    }

    fn populate_column(&self, free_space: &mut IncrementalGraph, distance_max: f64, column: Ix, reverse: bool) {
        let mut hits = self.index.search(self.store, self.metric, column, distance_max);
        if reverse {
            hits.reverse();
        }
        for idx in hits {
            if self.store.is_deleted(idx) {
                continue;
            }
            free_space.add_zero(Self::adjust_index(self.spaced_index(idx), reverse));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RightstepConfig, RightstepRoutine};
    use crate::radius_index::RadiusIndex;
    use crate::trajectory::{Id, TrajectoryStore};
    use pathlets_distances::{Euclidean2D, Point2};

    fn line_store(n: i64) -> TrajectoryStore<Point2> {
        let mut store = TrajectoryStore::new();
        for x in 0..n {
            store.push(Point2::new(x as f64, 0.0), Id(0));
        }
        store
    }

    #[test]
    fn best_cluster_covers_the_whole_line_at_unit_distance() {
        let store = line_store(5);
        let index = RadiusIndex::build(&store, &Euclidean2D);
        let weights = vec![1.0; store.total_len()];
        let routine = RightstepRoutine::new(&store, &index, &Euclidean2D, &weights, RightstepConfig::default());

        let cluster = routine.find_best_cluster(1.0);
        assert!(!cluster.is_empty());
        assert!(cluster.number_of_vertices() > 0);
    }

    #[test]
    fn tree_intervals_only_still_finds_a_candidate() {
        let store = line_store(8);
        let index = RadiusIndex::build(&store, &Euclidean2D);
        let weights = vec![1.0; store.total_len()];
        let config = RightstepConfig {
            tree_intervals_only: true,
            ..RightstepConfig::default()
        };
        let routine = RightstepRoutine::new(&store, &index, &Euclidean2D, &weights, config);

        let candidate = routine.find_best_cluster_candidate(1.0);
        assert!(candidate.is_some());
    }

    #[test]
    fn no_candidate_when_every_point_is_deleted() {
        let mut store = line_store(3);
        for i in 0..store.total_len() {
            store.delete_point(i);
        }
        let index = RadiusIndex::build(&store, &Euclidean2D);
        let weights = vec![1.0; store.total_len()];
        let routine = RightstepRoutine::new(&store, &index, &Euclidean2D, &weights, RightstepConfig::default());

        assert!(routine.find_best_cluster_candidate(1.0).is_none());
    }
}
