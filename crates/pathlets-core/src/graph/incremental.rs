//! C5: the incremental sparse free-space graph.
//!
//! A faster, insertion-only relative of [`super::retrieving::RetrievingGraph`]:
//! it cannot move its left edge or reconstruct exact subtrajectories from
//! scratch, but answers "how much of the input does the current reference
//! range cover, and at what coverage-per-cost" far more cheaply. Used by the
//! right-step routine (C7) to rank candidate reference ranges before paying
//! for a full reconstruction with the retrieving graph.
//!
//! Callers are expected to skip inserting zeros for tombstoned points and to
//! separate trajectories by leaving a row gap between them (the id-spacing
//! trick described in C7), since this graph has no notion of point deletion
//! or trajectory id.

use std::cell::RefCell;

use crate::trajectory::Ix;

/// The point weight type used when scoring coverage (curve-simplified points
/// carry the number of original points they replace).
pub type Weight = f64;

#[derive(Clone, Copy, Debug)]
struct Vertex {
    row_index: Ix,
    highest_left_row: Ix,
    highest_left_row_bottom: Ix,
}

impl Vertex {
    /// Maximizing this key maximizes `highest_left_row`, breaking ties by
    /// minimizing `highest_left_row_bottom`.
    const fn highest_left_key(&self) -> (Ix, Ix) {
        (self.highest_left_row, !self.highest_left_row_bottom)
    }
}

/// Coverage summary for one candidate reference range.
#[derive(Clone, Copy, Debug)]
pub struct ClusterQuality {
    /// Number of distinct subtrajectories the range would cover.
    pub subtrajectories_count: usize,
    /// Total (weighted) number of points covered.
    pub covered_points_weight: Weight,
    /// Coverage-per-cost score (`-1.0` when `cost_per_pathlet == 0`, meaning
    /// "no cost model, don't bother computing gamma").
    pub coverage_per_cost: f64,
    /// Left edge of the reference range this quality was computed for.
    pub left_column: Ix,
    /// Right edge of the reference range this quality was computed for.
    pub right_column: Ix,
}

/// The incremental variant of the sparse free-space graph.
pub struct IncrementalGraph {
    prefer_small_subtrajectories: bool,
    cost_per_pathlet: f64,
    left_column: Ix,
    right_column: Ix,
    right_vertices: Vec<Vertex>,
    previous_vertices: Vec<Vertex>,
    left_candidate: usize,
    pathlet_weights: RefCell<Vec<Weight>>,
}

impl IncrementalGraph {
    /// Starts a graph whose reference range is initially the single column
    /// `init_column`.
    ///
    /// `prefer_small_subtrajectories` selects how ties are broken when two
    /// candidate predecessor rows reach equally far left: `true` (used for
    /// k-center/`prefer_small_subtrajectories` mode) maximizes the reach,
    /// `false` minimizes it.
    #[must_use]
    pub fn new(init_column: Ix, prefer_small_subtrajectories: bool, cost_per_pathlet: f64) -> Self {
        Self {
            prefer_small_subtrajectories,
            cost_per_pathlet,
            left_column: init_column,
            right_column: init_column,
            right_vertices: Vec::new(),
            previous_vertices: Vec::new(),
            left_candidate: 0,
            pathlet_weights: RefCell::new(Vec::new()),
        }
    }

    /// Resets the graph to a fresh single-column state at `new_left_column`.
    pub fn reset(&mut self, new_left_column: Ix) {
        self.left_column = new_left_column;
        self.right_column = new_left_column;
        self.right_vertices.clear();
        self.previous_vertices.clear();
        self.left_candidate = 0;
    }

    /// Advances to a new rightmost column. If `new_right_column` is not
    /// immediately adjacent to the current one, the graph resets instead of
    /// sliding (matching the "only supports insertions" contract: a gap means
    /// the caller jumped to an unrelated window).
    pub fn new_column_at(&mut self, new_right_column: Ix) {
        if new_right_column == self.right_column + 1 {
            self.new_column();
        } else {
            self.reset(new_right_column);
        }
    }

    /// Advances to a new rightmost column unconditionally, sliding the
    /// current right column into the previous one.
    pub fn new_column(&mut self) {
        self.right_column += 1;
        self.previous_vertices.clear();
        std::mem::swap(&mut self.previous_vertices, &mut self.right_vertices);
        self.left_candidate = 0;
    }

    /// Marks `(right_column, row_index)` as a free-space cell. Rows within a
    /// column must be added in strictly increasing order.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if rows are not added in increasing order.
    pub fn add_zero(&mut self, row_index: Ix) {
        debug_assert!(
            self.right_vertices.is_empty() || row_index > self.right_vertices.last().unwrap().row_index
        );

        if self.left_column == self.right_column {
            let row_bottom = match self.right_vertices.last() {
                Some(down) if row_index > 0 && down.row_index == row_index - 1 => down.highest_left_row_bottom,
                _ => row_index,
            };
            self.right_vertices.push(Vertex {
                row_index,
                highest_left_row: row_index,
                highest_left_row_bottom: row_bottom,
            });
            return;
        }

        let mut best_left_row: Option<(Ix, Ix)> = None;
        let prefer_small = self.prefer_small_subtrajectories;
        let improves = move |current: Option<(Ix, Ix)>, candidate: (Ix, Ix)| -> Option<(Ix, Ix)> {
            match current {
                None => Some(candidate),
                Some(cur) => {
                    let better = if prefer_small { candidate > cur } else { candidate < cur };
                    Some(if better { candidate } else { cur })
                }
            }
        };

        if let Some(down) = self.right_vertices.last() {
            if row_index > 0 && down.row_index == row_index - 1 {
                best_left_row = improves(best_left_row, down.highest_left_key());
            }
        }

        while self.left_candidate < self.previous_vertices.len()
            && self.previous_vertices[self.left_candidate].row_index + 1 < row_index
        {
            self.left_candidate += 1;
        }
        if self.left_candidate < self.previous_vertices.len()
            && self.previous_vertices[self.left_candidate].row_index + 1 == row_index
        {
            best_left_row = improves(best_left_row, self.previous_vertices[self.left_candidate].highest_left_key());
            self.left_candidate += 1;
        }
        if self.left_candidate < self.previous_vertices.len()
            && self.previous_vertices[self.left_candidate].row_index == row_index
        {
            best_left_row = improves(best_left_row, self.previous_vertices[self.left_candidate].highest_left_key());
        }

        let Some((highest_left_row, inverted_bottom)) = best_left_row else {
            return;
        };
        self.right_vertices.push(Vertex {
            row_index,
            highest_left_row,
            highest_left_row_bottom: !inverted_bottom,
        });
    }

    fn do_query(
        &self,
        mut new_subtrajectory: impl FnMut(Ix, Ix),
        mut shorten_previous: impl FnMut(Ix, Ix),
        first_reference_row: Ix,
        last_reference_row: Ix,
    ) {
        let (first_reference_row, last_reference_row) = if first_reference_row < last_reference_row {
            (last_reference_row, first_reference_row)
        } else {
            (first_reference_row, last_reference_row)
        };

        if self.right_vertices.is_empty() {
            return;
        }

        let mut start_vertex = Some(self.right_vertices.len() - 1);
        let mut previous_row_extension: Option<Ix> = None;

        while let Some(idx) = start_vertex {
            let v = self.right_vertices[idx];
            let mut first_used_row = v.row_index;
            let mut last_used_row = v.highest_left_row;
            let mut row_extension = v.highest_left_row_bottom;

            if first_used_row >= last_reference_row && last_used_row <= first_reference_row {
                first_used_row = first_reference_row;
                last_used_row = last_reference_row;
                row_extension = last_reference_row;
            }

            if let Some(prev_ext) = previous_row_extension {
                if prev_ext <= first_used_row {
                    shorten_previous(prev_ext, first_used_row + 1);
                }
            }
            previous_row_extension = Some(row_extension);

            new_subtrajectory(first_used_row, row_extension);

            loop {
                match start_vertex {
                    Some(i) if self.right_vertices[i].row_index >= last_used_row => {
                        start_vertex = i.checked_sub(1);
                    }
                    _ => break,
                }
            }
        }
    }

    /// Scores the reference range `[first_reference_row, last_reference_row]`
    /// (order-independent) using `total_weight(l, r)`, the total weight of
    /// points whose spaced index lies in the half-open range `[l, r)`.
    pub fn query_cluster_candidate(
        &self,
        total_weight: impl Fn(Ix, Ix) -> Weight,
        first_reference_row: Ix,
        last_reference_row: Ix,
    ) -> ClusterQuality {
        let mut subtrajectory_count = 0usize;
        let mut covered_points_weight: Weight = 0.0;
        self.pathlet_weights.borrow_mut().clear();

        self.do_query(
            |first_row, last_row| {
                subtrajectory_count += 1;
                let delta = total_weight(last_row, first_row + 1);
                covered_points_weight += delta;
                self.pathlet_weights.borrow_mut().push(delta);
            },
            |old_last_row, new_last_row| {
                let delta = total_weight(old_last_row, new_last_row);
                covered_points_weight -= delta;
                if let Some(last) = self.pathlet_weights.borrow_mut().last_mut() {
                    *last -= delta;
                }
            },
            first_reference_row,
            last_reference_row,
        );

        ClusterQuality {
            subtrajectories_count: subtrajectory_count,
            covered_points_weight,
            coverage_per_cost: self.compute_coverage_per_cost(),
            left_column: self.left_column,
            right_column: self.right_column,
        }
    }

    /// Reconstructs the subtrajectories covered by the reference range
    /// `[first_reference_row, last_reference_row]` into `output`.
    pub fn query_subtrajectories(
        &self,
        output: &mut crate::cluster::SubtrajectoryCluster,
        first_reference_row: Ix,
        last_reference_row: Ix,
    ) {
        self.do_query(
            |first_row, last_row| {
                output.push(crate::trajectory::Subtrajectory::new(last_row, first_row));
            },
            |_old_last_row, new_last_row| {
                output.back_mut().start = new_last_row;
            },
            first_reference_row,
            last_reference_row,
        );
        output.set_reference(crate::trajectory::Subtrajectory::new(
            first_reference_row,
            last_reference_row,
        ));
    }

    /// Bracket-then-bisect search for the coverage-per-cost gamma: the
    /// largest `gamma` for which `sum(max(0, coverage_i - gamma * cost)) > gamma`
    /// still holds. Returns `-1.0` when there is no cost model.
    fn compute_coverage_per_cost(&self) -> f64 {
        if self.cost_per_pathlet == 0.0 {
            return -1.0;
        }
        let weights = self.pathlet_weights.borrow();
        let feasible = |gamma: f64| -> bool {
            let total: f64 = weights
                .iter()
                .map(|&coverage| (coverage - gamma * self.cost_per_pathlet).max(0.0))
                .sum();
            total > gamma
        };

        let mut lo = 0.0_f64;
        let mut hi = 1.0_f64;
        while feasible(hi) {
            hi *= 2.0;
        }
        for _ in 0..50 {
            let mid = lo + (hi - lo) / 2.0;
            if feasible(mid) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::IncrementalGraph;

    #[test]
    fn single_column_seeds_every_row_as_its_own_left_edge() {
        let mut graph = IncrementalGraph::new(0, false, 0.0);
        graph.add_zero(0);
        graph.add_zero(1);
        let quality = graph.query_cluster_candidate(|l, r| (r - l) as f64, 0, 0);
        assert_eq!(quality.subtrajectories_count, 0);
        let _ = quality;
    }

    #[test]
    fn diagonal_band_covers_a_shifted_subtrajectory() {
        let mut graph = IncrementalGraph::new(0, false, 0.0);
        graph.add_zero(0);
        graph.new_column_at(1);
        graph.add_zero(0);
        graph.add_zero(1);

        let quality = graph.query_cluster_candidate(|l, r| (r - l) as f64, 0, 1);
        assert!(quality.subtrajectories_count >= 1);
        assert!(quality.covered_points_weight > 0.0);
    }

    #[test]
    fn no_cost_model_reports_sentinel_coverage_per_cost() {
        let mut graph = IncrementalGraph::new(0, false, 0.0);
        graph.add_zero(0);
        let quality = graph.query_cluster_candidate(|l, r| (r - l) as f64, 0, 0);
        assert_eq!(quality.coverage_per_cost, -1.0);
    }
}
