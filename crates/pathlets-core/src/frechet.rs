//! C3: discrete Frechet distance (Eiter & Mannila, 1994) between two
//! subtrajectories of the same [`TrajectoryStore`].
//!
//! Both variants return *squared* distances, matching the squared-metric
//! contract used throughout this crate.

use pathlets_distances::SquaredMetric;

use crate::trajectory::{Subtrajectory, TrajectoryStore};

/// Computes the discrete Frechet distance between `p` and `q` using the full
/// `|p| x |q|` dynamic-programming table. `O(|p| * |q|)` time and space.
pub fn compute<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    p: Subtrajectory,
    q: Subtrajectory,
) -> f64 {
    if p.start == q.start && p.end == q.end {
        return 0.0;
    }

    let rows = p.len();
    let cols = q.len();
    let mut ca = vec![0.0_f64; rows * cols];
    let at = |row: usize, col: usize| row + rows * col;

    for jq in q.start..=q.end {
        let col = jq - q.start;
        for ip in p.start..=p.end {
            let row = ip - p.start;
            let d_ij = metric.squared_distance(store.point(ip), store.point(jq));
            ca[at(row, col)] = if ip == p.start && jq == q.start {
                d_ij
            } else if ip > p.start && jq == q.start {
                ca[at(row - 1, col)].max(d_ij)
            } else if ip == p.start && jq > q.start {
                ca[at(row, col - 1)].max(d_ij)
            } else {
                ca[at(row - 1, col)]
                    .min(ca[at(row - 1, col - 1)])
                    .min(ca[at(row, col - 1)])
                    .max(d_ij)
            };
        }
    }

    ca[at(rows - 1, cols - 1)]
}

/// Same as [`compute`], but only keeps two rows of the table alive at once.
/// `O(|p| * |q|)` time, `O(|p|)` space.
pub fn compute_light<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    p: Subtrajectory,
    q: Subtrajectory,
) -> f64 {
    if p.start == q.start && p.end == q.end {
        return 0.0;
    }

    let width = p.len();
    let mut current_row = vec![0.0_f64; width];
    let mut next_row = vec![0.0_f64; width];

    current_row[0] = metric.squared_distance(store.point(p.start), store.point(q.start));
    for i in 1..width {
        let p_idx = p.start + i;
        let d_ij = metric.squared_distance(store.point(p_idx), store.point(q.start));
        current_row[i] = current_row[i - 1].max(d_ij);
    }

    for q_idx in (q.start + 1)..=q.end {
        next_row[0] = current_row[0].max(metric.squared_distance(store.point(p.start), store.point(q_idx)));
        for i in 1..width {
            let p_idx = p.start + i;
            let d_ij = metric.squared_distance(store.point(p_idx), store.point(q_idx));
            next_row[i] = next_row[i - 1]
                .min(current_row[i - 1])
                .min(current_row[i])
                .max(d_ij);
        }
        std::mem::swap(&mut current_row, &mut next_row);
    }

    current_row[width - 1]
}

#[cfg(test)]
mod tests {
    use super::{compute, compute_light};
    use crate::trajectory::{Id, Subtrajectory, TrajectoryStore};
    use pathlets_distances::{Euclidean2D, Point2};
    use test_case::test_case;

    fn line_store() -> TrajectoryStore<Point2> {
        let mut store = TrajectoryStore::new();
        for i in 0..5 {
            store.push(Point2::new(f64::from(i), 0.0), Id(0));
        }
        store
    }

    #[test]
    fn identical_subtrajectories_have_zero_distance() {
        let store = line_store();
        let sub = Subtrajectory::new(0, 4);
        assert_eq!(compute(&store, &Euclidean2D, sub, sub), 0.0);
    }

    #[test_case(0, 2, 1, 3; "shifted window")]
    #[test_case(0, 4, 0, 4; "full overlap")]
    fn quadratic_and_light_variants_agree(p0: usize, p1: usize, q0: usize, q1: usize) {
        let store = line_store();
        let p = Subtrajectory::new(p0, p1);
        let q = Subtrajectory::new(q0, q1);
        let full = compute(&store, &Euclidean2D, p, q);
        let light = compute_light(&store, &Euclidean2D, p, q);
        assert!((full - light).abs() < 1e-9);
    }

    #[test]
    fn distance_between_disjoint_points_is_squared_gap() {
        let mut store = TrajectoryStore::new();
        store.push(Point2::new(0.0, 0.0), Id(0));
        store.push(Point2::new(3.0, 4.0), Id(0));
        let p = Subtrajectory::new(0, 0);
        let q = Subtrajectory::new(1, 1);
        assert_eq!(compute(&store, &Euclidean2D, p, q), 25.0);
    }
}
