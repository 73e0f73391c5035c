//! C2: radius search over the points of a [`TrajectoryStore`].
//!
//! The underlying free-space graph routines only ever need an exact squared
//! range query and a nearest/farthest neighbor pair, so this module provides
//! that contract with a uniform grid bucket index rather than a kd-tree:
//! building and querying it needs no external spatial library, and insertion
//! order never matters for correctness. Deletion is, as with the trajectory
//! store, a tombstone rather than a structural removal, so previously
//! returned indices never dangle.

use std::collections::HashMap;

use pathlets_distances::SquaredMetric;

use crate::trajectory::{Ix, TrajectoryStore};

type Cell = (i64, i64);

/// A grid-bucket index supporting exact squared-radius queries and
/// nearest/farthest neighbor queries over the live points of a
/// [`TrajectoryStore`].
pub struct RadiusIndex {
    cell_size: f64,
    buckets: HashMap<Cell, Vec<Ix>>,
    cell_of: Vec<Cell>,
    alive: Vec<bool>,
}

impl RadiusIndex {
    /// Builds an index over every currently-live point in `store`.
    pub fn build<P, M: SquaredMetric<P>>(store: &TrajectoryStore<P>, metric: &M) -> Self
    where
        P: AsXy + Clone,
    {
        let n = store.total_len();
        let cell_size = Self::estimate_cell_size(store);
        let mut index = Self {
            cell_size,
            buckets: HashMap::new(),
            cell_of: vec![(0, 0); n],
            alive: vec![false; n],
        };
        for i in 0..n {
            if store.is_deleted(i) {
                continue;
            }
            index.insert(i, store.point(i).xy());
        }
        let _ = metric;
        index
    }

    /// A reasonable default cell size: the bounding-box diagonal divided by
    /// `sqrt(n)`, so that each bucket holds roughly one point on average.
    fn estimate_cell_size<P: AsXy + Clone>(store: &TrajectoryStore<P>) -> f64 {
        let n = store.total_len();
        if n == 0 {
            return 1.0;
        }
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for i in 0..n {
            if store.is_deleted(i) {
                continue;
            }
            let (x, y) = store.point(i).xy();
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let diag = ((max_x - min_x).powi(2) + (max_y - min_y).powi(2)).sqrt();
        (diag / (n as f64).sqrt()).max(1e-9)
    }

    fn cell_for(&self, x: f64, y: f64) -> Cell {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    fn insert(&mut self, index: Ix, (x, y): (f64, f64)) {
        let cell = self.cell_for(x, y);
        self.cell_of[index] = cell;
        self.alive[index] = true;
        self.buckets.entry(cell).or_default().push(index);
    }

    /// Tombstones `index`, removing it from future query results.
    pub fn delete_point(&mut self, index: Ix) {
        debug_assert!(self.alive[index], "double deletion at {index}");
        self.alive[index] = false;
    }

    /// Every live point within squared distance `sq_radius` of `store.point(index)`,
    /// sorted ascending, including `index` itself.
    pub fn search<P: AsXy + Clone, M: SquaredMetric<P>>(
        &self,
        store: &TrajectoryStore<P>,
        metric: &M,
        index: Ix,
        sq_radius: f64,
    ) -> Vec<Ix> {
        let center = store.point(index);
        let (cx, cy) = center.xy();
        let radius = sq_radius.sqrt();
        let span = (radius / self.cell_size).ceil() as i64 + 1;
        let (ccx, ccy) = self.cell_for(cx, cy);

        let mut result = Vec::new();
        for dx in -span..=span {
            for dy in -span..=span {
                let Some(bucket) = self.buckets.get(&(ccx + dx, ccy + dy)) else {
                    continue;
                };
                for &candidate in bucket {
                    if !self.alive[candidate] {
                        continue;
                    }
                    let d = metric.squared_distance(center, store.point(candidate));
                    if d <= sq_radius {
                        result.push(candidate);
                    }
                }
            }
        }
        result.sort_unstable();
        result
    }

    /// `(nearest squared distance excluding self, farthest squared distance)`
    /// among all live points, relative to `store.point(index)`.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two points are currently live.
    pub fn nearest_and_farthest_neighbor<P: AsXy + Clone, M: SquaredMetric<P>>(
        &self,
        store: &TrajectoryStore<P>,
        metric: &M,
        index: Ix,
    ) -> (f64, f64) {
        let center = store.point(index);
        let mut nearest = f64::MAX;
        let mut farthest = f64::MIN;
        for (candidate, &alive) in self.alive.iter().enumerate() {
            if !alive || candidate == index {
                continue;
            }
            let d = metric.squared_distance(center, store.point(candidate));
            nearest = nearest.min(d);
            farthest = farthest.max(d);
        }
        assert!(nearest.is_finite(), "fewer than two live points");
        (nearest, farthest)
    }
}

/// Extracts planar coordinates from a point type, needed to bucket it.
pub trait AsXy {
    /// Returns `(x, y)`.
    fn xy(&self) -> (f64, f64);
}

impl AsXy for pathlets_distances::Point2 {
    fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::RadiusIndex;
    use crate::trajectory::{Id, TrajectoryStore};
    use pathlets_distances::{Euclidean2D, Point2};

    fn grid_store() -> TrajectoryStore<Point2> {
        let mut store = TrajectoryStore::new();
        for x in 0..5 {
            store.push(Point2::new(f64::from(x), 0.0), Id(0));
        }
        store
    }

    #[test]
    fn search_includes_self_and_respects_radius() {
        let store = grid_store();
        let index = RadiusIndex::build(&store, &Euclidean2D);
        let hits = index.search(&store, &Euclidean2D, 2, 1.0);
        assert_eq!(hits, vec![1, 2, 3]);
    }

    #[test]
    fn deleted_points_are_excluded_from_search() {
        let store = grid_store();
        let mut index = RadiusIndex::build(&store, &Euclidean2D);
        index.delete_point(1);
        let hits = index.search(&store, &Euclidean2D, 2, 1.0);
        assert_eq!(hits, vec![2, 3]);
    }

    #[test]
    fn nearest_and_farthest_neighbor_excludes_self() {
        let store = grid_store();
        let index = RadiusIndex::build(&store, &Euclidean2D);
        let (nearest, farthest) = index.nearest_and_farthest_neighbor(&store, &Euclidean2D, 0);
        assert!((nearest - 1.0).abs() < 1e-9);
        assert!((farthest - 16.0).abs() < 1e-9);
    }
}
