//! C4: the retrieving sparse free-space graph.
//!
//! Built one column at a time via [`RetrievingGraph::new_column`] and
//! [`RetrievingGraph::add_zero`], this graph supports reconstructing the full
//! set of subtrajectories reachable from the reference range
//! `[left_column, right_column]`, and can slide its left edge forward with
//! [`RetrievingGraph::delete_column`].
//!
//! Vertices live in a [`slotmap::SlotMap`] rather than behind raw pointers:
//! each vertex is referenced by a [`VertexKey`], and freeing a column simply
//! removes its vertices from the map, returning their slots to the free
//! list — the same "recycling object pool" discipline as the original, with
//! no `unsafe`.

use std::collections::VecDeque;

use slotmap::{SlotMap, new_key_type};

use crate::cluster::SubtrajectoryCluster;
use crate::trajectory::{Id, Ix, Subtrajectory, TrajectoryStore};

new_key_type! {
    /// A handle to a vertex in a [`RetrievingGraph`].
    pub struct VertexKey;
}

/// Sentinel label meaning "no path to the reference range through this edge".
const NO_EDGE: Ix = Ix::MAX;

#[derive(Clone, Copy, Debug)]
struct Vertex {
    row_index: Ix,
    up: Option<VertexKey>,
    left: Option<VertexKey>,
    below_left: Option<VertexKey>,
    below: Option<VertexKey>,
    label_left: Ix,
    label_below_left: Ix,
    label_below: Ix,
    min_label: Ix,
}

impl Vertex {
    const fn new(row_index: Ix) -> Self {
        Self {
            row_index,
            up: None,
            left: None,
            below_left: None,
            below: None,
            label_left: NO_EDGE,
            label_below_left: NO_EDGE,
            label_below: NO_EDGE,
            min_label: NO_EDGE,
        }
    }
}

/// The retrieving variant of the sparse free-space graph.
pub struct RetrievingGraph {
    pool: SlotMap<VertexKey, Vertex>,
    /// `.front()` is the lowest vertex of `left_column`, `.back()` of `right_column`.
    lowest_vertex_per_column: VecDeque<Option<VertexKey>>,
    left_column: Ix,
    right_column: Ix,
    highest_in_last_col: Option<VertexKey>,
    candidate_for_left: Option<VertexKey>,
    candidate_for_below_left: Option<VertexKey>,
}

impl RetrievingGraph {
    /// Starts a graph whose reference range is initially the single column
    /// `init_right_column`.
    #[must_use]
    pub fn new(init_right_column: Ix) -> Self {
        let mut lowest_vertex_per_column = VecDeque::new();
        lowest_vertex_per_column.push_back(None);
        Self {
            pool: SlotMap::with_key(),
            lowest_vertex_per_column,
            left_column: init_right_column,
            right_column: init_right_column,
            highest_in_last_col: None,
            candidate_for_left: None,
            candidate_for_below_left: None,
        }
    }

    /// The current left edge of the reference range.
    #[must_use]
    pub const fn left_column(&self) -> Ix {
        self.left_column
    }

    /// The current right edge of the reference range.
    #[must_use]
    pub const fn right_column(&self) -> Ix {
        self.right_column
    }

    /// Starts building the column immediately to the right of the current one.
    pub fn new_column(&mut self) {
        self.new_column_at(self.right_column + 1);
    }

    /// Starts building a new rightmost column at `new_right_column`.
    pub fn new_column_at(&mut self, new_right_column: Ix) {
        if let Some(Some(last)) = self.lowest_vertex_per_column.back() {
            self.candidate_for_left = Some(*last);
            self.candidate_for_below_left = self.pool[*last].below;
        } else {
            self.candidate_for_left = None;
            self.candidate_for_below_left = None;
        }
        self.lowest_vertex_per_column.push_back(None);
        self.highest_in_last_col = None;
        self.right_column = new_right_column;
    }

    /// Marks `(right_column, row_idx)` as a free-space cell. Rows within a
    /// column must be added in strictly increasing order.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if rows are not added in increasing order.
    pub fn add_zero(&mut self, row_idx: Ix) {
        if let Some(top) = self.highest_in_last_col {
            debug_assert!(self.pool[top].row_index < row_idx);
        }

        let key = self.pool.insert(Vertex::new(row_idx));

        if let Some(back) = self.lowest_vertex_per_column.back_mut() {
            if back.is_none() {
                *back = Some(key);
            }
        }

        if self.right_column > 0 {
            self.advance_candidate_for_left(row_idx);
            if let Some(cl) = self.candidate_for_left {
                if self.pool[cl].row_index == row_idx {
                    self.pool[key].left = Some(cl);
                    self.pool[key].label_left = self.pool[cl].min_label;
                }
            }
            if let Some(cbl) = self.candidate_for_below_left {
                if row_idx > 0 && self.pool[cbl].row_index == row_idx - 1 {
                    self.pool[key].below_left = Some(cbl);
                    self.pool[key].label_below_left = self.pool[cbl].min_label;
                }
            }
        }

        if let Some(top) = self.highest_in_last_col {
            self.pool[key].below = Some(top);
            self.pool[key].label_below = if row_idx > 0 && self.pool[top].row_index == row_idx - 1 {
                self.pool[top].min_label
            } else {
                NO_EDGE
            };
            self.pool[top].up = Some(key);
        }

        self.highest_in_last_col = Some(key);
        let (label_left, label_below_left, label_below) = {
            let v = &self.pool[key];
            (v.label_left, v.label_below_left, v.label_below)
        };
        self.pool[key].min_label = label_left
            .min(label_below_left)
            .min(label_below)
            .min(self.right_column);
    }

    fn advance_candidate_for_left(&mut self, row: Ix) {
        while let Some(cl) = self.candidate_for_left {
            if self.pool[cl].row_index < row {
                self.candidate_for_below_left = Some(cl);
                self.candidate_for_left = self.pool[cl].up;
            } else {
                break;
            }
        }
    }

    /// Frees every vertex of the current leftmost column and advances
    /// `left_column` by one.
    pub fn delete_column(&mut self) {
        let mut delete_ptr = self.lowest_vertex_per_column.pop_front().flatten();
        while let Some(key) = delete_ptr {
            let next = self.pool[key].up;
            self.pool.remove(key);
            delete_ptr = next;
        }
        self.left_column += 1;
    }

    /// Frees every column except the rightmost, collapsing the reference
    /// range to a single column in one pass.
    pub fn advance_left_column_to_right(&mut self) {
        while self.lowest_vertex_per_column.len() > 1 {
            let mut delete_ptr = self.lowest_vertex_per_column.pop_front().flatten();
            while let Some(key) = delete_ptr {
                let next = self.pool[key].up;
                self.pool.remove(key);
                delete_ptr = next;
            }
        }
        self.left_column = self.right_column;
    }

    fn find_eligible_row(&self, mut current: Option<VertexKey>, below_this: Ix) -> Option<VertexKey> {
        while let Some(key) = current {
            let v = &self.pool[key];
            if v.row_index > below_this || v.min_label > self.left_column {
                current = v.below;
            } else {
                break;
            }
        }
        current
    }

    /// Walks cross-column edges from `start` back to `left_column`, filling
    /// `output` with the discovered `[start, end]` range. Returns the ending
    /// vertex on success, or the row at which the caller should resume the
    /// downward scan on failure (overlap with the reference range, or an id
    /// boundary crossing).
    fn extract_trajectory_respecting_ids<P>(
        &self,
        trajectory: &TrajectoryStore<P>,
        start: VertexKey,
        output: &mut Subtrajectory,
    ) -> Result<(Subtrajectory, VertexKey), Ix> {
        let row0 = self.pool[start].row_index;
        if self.left_column <= row0 && row0 <= self.right_column {
            return Err(self.left_column);
        }
        output.start = row0;
        output.end = row0;

        let mut column = self.right_column;
        let mut cursor = start;
        while column > self.left_column {
            let v = self.pool[cursor];
            if v.label_left <= self.left_column {
                column -= 1;
                cursor = v.left.expect("label_left set implies left edge present");
            } else if v.label_below_left <= self.left_column {
                column -= 1;
                output.start -= 1;
                cursor = v.below_left.expect("label_below_left set implies edge present");
            } else if v.label_below <= self.left_column {
                output.start -= 1;
                cursor = v.below.expect("label_below set implies edge present");
            } else {
                unreachable!("min_label <= left_column guarantees one branch is eligible");
            }

            if self.left_column <= output.start && output.start <= self.right_column {
                return Err(output.start);
            }
            if trajectory.id_at(output.start) != trajectory.id_at(output.end) {
                return Err(output.end);
            }
        }
        Ok((*output, cursor))
    }

    /// Extends `subtrajectory.start` further down through same-id rows of the
    /// current left column, stopping before crossing `next_start`'s row or
    /// re-entering the reference range.
    fn optimize_in_left_column<P>(
        &self,
        trajectory: &TrajectoryStore<P>,
        subtrajectory: &mut Subtrajectory,
        end_vertex: VertexKey,
        next_start: Option<VertexKey>,
    ) {
        let trajectory_id = trajectory.id_at(subtrajectory.start);
        debug_assert_eq!(subtrajectory.start, self.pool[end_vertex].row_index);
        let mut end = Some(end_vertex);
        loop {
            subtrajectory.start -= 1;
            end = end.and_then(|e| self.pool[e].below);
            let Some(e) = end else { break };
            let v = &self.pool[e];
            let row = subtrajectory.start;
            let within_bound = next_start.is_none_or(|n| row > self.pool[n].row_index);
            if !(within_bound
                && v.row_index == row
                && trajectory.id_at(row) == trajectory_id
                && (row < self.left_column || row > self.right_column))
            {
                break;
            }
        }
        subtrajectory.start += 1;
    }

    /// Reconstructs every subtrajectory reachable from the reference range
    /// `[left_column, right_column]`, respecting trajectory-id boundaries,
    /// plus the reference range itself as the final member.
    ///
    /// `target_num_members` caps how many non-reference members are
    /// collected before stopping early.
    ///
    /// # Panics
    ///
    /// Panics if `output` is not empty, or if the graph has no columns yet.
    pub fn query_subtrajectories_respecting_ids<P>(
        &self,
        trajectory: &TrajectoryStore<P>,
        output: &mut SubtrajectoryCluster,
        target_num_members: usize,
    ) {
        assert!(output.is_empty(), "output cluster must start empty");
        let Some(mut start_vertex) = self.highest_in_last_col else {
            output.set_reference(Subtrajectory::new(self.left_column, self.right_column));
            output.push(Subtrajectory::new(self.left_column, self.right_column));
            return;
        };

        let mut end_vertex: Option<VertexKey> = None;
        let mut next_row = self.pool[start_vertex].row_index;

        loop {
            let found = loop {
                if trajectory.id_at(self.pool[start_vertex].row_index) == Id::DELETED {
                    next_row = next_row.wrapping_sub(1);
                }
                match self.find_eligible_row(Some(start_vertex), next_row) {
                    Some(v) if trajectory.id_at(self.pool[v].row_index) == Id::DELETED => {
                        start_vertex = v;
                        continue;
                    }
                    found => break found,
                }
            };
            let Some(found_vertex) = found else { break };
            start_vertex = found_vertex;

            let mut candidate = Subtrajectory::new(0, 0);
            match self.extract_trajectory_respecting_ids(trajectory, start_vertex, &mut candidate) {
                Ok((candidate, next_end_vertex)) => {
                    if let Some(prev_end) = end_vertex {
                        self.optimize_in_left_column(trajectory, output.back_mut(), prev_end, Some(start_vertex));
                    }
                    end_vertex = Some(next_end_vertex);
                    next_row = candidate.start.wrapping_sub(1);
                    output.push(candidate);
                    if candidate.start == 0 || output.len() >= target_num_members {
                        break;
                    }
                }
                Err(resume_row) => {
                    next_row = resume_row;
                }
            }

            if next_row == self.pool[start_vertex].row_index {
                if next_row == 0 {
                    break;
                }
                next_row -= 1;
            }
        }

        if let Some(end) = end_vertex {
            self.optimize_in_left_column(trajectory, output.back_mut(), end, None);
        }
        let reference = Subtrajectory::new(self.left_column, self.right_column);
        output.push(reference);
        output.set_reference(reference);
    }
}

#[cfg(test)]
mod tests {
    use super::RetrievingGraph;
    use crate::cluster::SubtrajectoryCluster;
    use crate::trajectory::{Id, TrajectoryStore};

    /// Builds a graph over a single trajectory of `n` points where the
    /// reference column is `ref_col` and every row in `rows` is free-space
    /// adjacent across the whole window (a diagonal band one row wide).
    fn single_id_store(n: usize) -> TrajectoryStore<()> {
        let mut store = TrajectoryStore::new();
        for _ in 0..n {
            store.push((), Id(0));
        }
        store
    }

    #[test]
    fn empty_graph_reports_only_the_reference_range() {
        let store = single_id_store(3);
        let graph = RetrievingGraph::new(1);
        let mut output = SubtrajectoryCluster::new();
        graph.query_subtrajectories_respecting_ids(&store, &mut output, usize::MAX);
        assert_eq!(output.len(), 1);
        assert_eq!(output.back().start, 1);
        assert_eq!(output.back().end, 1);
        assert_eq!(output.reference().start, 1);
        assert_eq!(output.reference().end, 1);
    }

    #[test]
    fn diagonal_band_reconstructs_shifted_copy() {
        // A 4-point reference `[1, 2]` with a free-space diagonal allowing a
        // single shifted match at rows `[0, 1]`: column 1 has rows {0,1} free,
        // column 2 has rows {1,2} free, forming a one-off diagonal band.
        let store = single_id_store(4);
        let mut graph = RetrievingGraph::new(1);
        graph.add_zero(0);
        graph.add_zero(1);
        graph.new_column();
        graph.add_zero(1);
        graph.add_zero(2);

        let mut output = SubtrajectoryCluster::new();
        graph.query_subtrajectories_respecting_ids(&store, &mut output, usize::MAX);
        assert_eq!(output.reference().start, 1);
        assert_eq!(output.reference().end, 2);
        assert!(output.contains(crate::trajectory::Subtrajectory::new(0, 1)));
    }
}
