//! C8: curve simplification.
//!
//! Merges runs of consecutive, same-id points that lie within a shrinking
//! tolerance of each other into one representative point, trading
//! reference-range precision for a smaller trajectory to search the
//! right-step routine (C7) over. Deleted points are not skipped: they merge
//! under the same deleted id like any other run, which is what lets
//! [`unsimplify`](CurveSimplification::unsimplify) tell that an original
//! trajectory was split across a group boundary.

use pathlets_distances::SquaredMetric;

use crate::radius_index::{AsXy, RadiusIndex};
use crate::rightstep::ClusterSummary;
use crate::trajectory::{Ix, TrajectoryStore};

/// A curve simplified to within `simplification_factor` of some reference
/// squared distance, together with the bookkeeping needed to map a cluster
/// found on the simplified curve back onto the original trajectory.
pub struct CurveSimplification<P> {
    simplified: TrajectoryStore<P>,
    point_weights: Vec<f64>,
    original_leftmost_index: Vec<Ix>,
    original_sq_distance: f64,
    simplification_factor: f64,
}

impl<P: Clone> CurveSimplification<P> {
    /// Builds the simplified trajectory from `original` at reference squared
    /// distance `sq_distance`, merging runs within `simplification_factor` of
    /// it. A `simplification_factor` of `0.0` performs no merging: every
    /// group ends up with exactly one point.
    #[must_use]
    pub fn new<M: SquaredMetric<P>>(
        original: &TrajectoryStore<P>,
        metric: &M,
        sq_distance: f64,
        simplification_factor: f64,
    ) -> Self {
        // If both curves are simplified by `distance * factor/2`, the
        // maximum total error introduced is `distance * factor`.
        let half_factor = simplification_factor / 2.0;
        let simplification_sq_distance = sq_distance * half_factor * half_factor;

        let are_compatible = |l: Ix, j: Ix| -> bool {
            original.id_at(l) == original.id_at(j)
                && metric.squared_distance(original.point(l), original.point(j)) <= simplification_sq_distance
        };

        let mut simplified = TrajectoryStore::new();
        let mut point_weights = Vec::new();
        let mut original_leftmost_index = Vec::new();

        let total = original.total_len();
        let mut l = 0;
        for i in 0..=total {
            if i == total || !are_compatible(l, i) {
                simplified.push_allow_deleted(original.point(l).clone(), original.id_at(l));
                point_weights.push((i - l) as f64);
                original_leftmost_index.push(l);
                l = i;
            }
        }

        Self {
            simplified,
            point_weights,
            original_leftmost_index,
            original_sq_distance: sq_distance,
            simplification_factor,
        }
    }

    /// The simplified trajectory: one representative point per merged group.
    #[must_use]
    pub const fn trajectory(&self) -> &TrajectoryStore<P> {
        &self.simplified
    }

    /// Number of original points each simplified point replaces, indexed the
    /// same way as [`trajectory`](Self::trajectory).
    #[must_use]
    pub fn point_weights(&self) -> &[f64] {
        &self.point_weights
    }

    /// Builds a radius index over the simplified trajectory.
    #[must_use]
    pub fn build_index<M: SquaredMetric<P>>(&self, metric: &M) -> RadiusIndex
    where
        P: AsXy,
    {
        RadiusIndex::build(&self.simplified, metric)
    }

    /// The squared-distance threshold to search the simplified trajectory
    /// at. Shrunk relative to the original reference distance, because
    /// reconstructing against the original curve only stays within that
    /// distance if the simplified-curve search is tighter.
    #[must_use]
    pub fn sq_distance(&self) -> f64 {
        let remaining = 1.0 - self.simplification_factor;
        self.original_sq_distance * remaining * remaining
    }

    /// Maps a cluster candidate found against the simplified curve back onto
    /// the original trajectory's index space.
    #[must_use]
    pub fn unsimplify(&self, cluster: Option<ClusterSummary>) -> Option<ClusterSummary> {
        cluster.map(|mut c| {
            c.left_column = self.original_leftmost_index[c.left_column];
            c.right_column =
                self.original_leftmost_index[c.right_column] + self.point_weights[c.right_column] as Ix - 1;
            c
        })
    }
}

#[cfg(test)]
mod tests {
    use super::CurveSimplification;
    use crate::trajectory::{Id, TrajectoryStore};
    use pathlets_distances::{Euclidean2D, Point2};

    fn dense_line(n: i64, step: f64) -> TrajectoryStore<Point2> {
        let mut store = TrajectoryStore::new();
        for x in 0..n {
            store.push(Point2::new(x as f64 * step, 0.0), Id(0));
        }
        store
    }

    #[test]
    fn zero_factor_merges_nothing() {
        let store = dense_line(5, 1.0);
        let simplified = CurveSimplification::new(&store, &Euclidean2D, 4.0, 0.0);
        assert_eq!(simplified.trajectory().total_len(), 5);
        assert!(simplified.point_weights().iter().all(|&w| w == 1.0));
    }

    #[test]
    fn close_points_merge_into_one_group() {
        // Points 0.0, 0.1, 0.2, ... are all within a tiny tolerance of each
        // other relative to a large reference distance.
        let store = dense_line(5, 0.1);
        let simplified = CurveSimplification::new(&store, &Euclidean2D, 100.0, 1.0);
        assert!(simplified.trajectory().total_len() < 5);
        assert_eq!(
            simplified.point_weights().iter().sum::<f64>(),
            store.total_len() as f64
        );
    }

    #[test]
    fn different_ids_never_merge() {
        let mut store = TrajectoryStore::new();
        store.push(Point2::new(0.0, 0.0), Id(0));
        store.push(Point2::new(0.0, 0.0), Id(1));
        let simplified = CurveSimplification::new(&store, &Euclidean2D, 100.0, 1.0);
        assert_eq!(simplified.trajectory().total_len(), 2);
    }
}
