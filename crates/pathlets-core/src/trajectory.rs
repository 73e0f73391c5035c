//! C1: the trajectory store.
//!
//! Holds every point of every input trajectory in one flat array, indexed by
//! a global [`Ix`]. Points are never physically removed; deletion is a
//! tombstone write of [`Id::DELETED`] so that every previously issued `Ix`
//! stays valid for the lifetime of the store.

use serde::{Deserialize, Serialize};

/// A global index into the point array of a [`TrajectoryStore`].
pub type Ix = usize;

/// A trajectory identifier, or the reserved tombstone [`Id::DELETED`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id(pub u32);

impl Id {
    /// The sentinel id written over a deleted point. Never a valid live id.
    pub const DELETED: Self = Self(u32::MAX);
}

/// An inclusive range `[a, b]` of global indices that all belong to one live
/// trajectory id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtrajectory {
    /// The first index, inclusive.
    pub start: Ix,
    /// The last index, inclusive.
    pub end: Ix,
}

impl Subtrajectory {
    /// Builds a subtrajectory from an inclusive `[start, end]` range.
    #[must_use]
    pub const fn new(start: Ix, end: Ix) -> Self {
        Self { start, end }
    }

    /// The number of points this subtrajectory spans.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether this subtrajectory is empty. Always `false`: a subtrajectory
    /// always covers at least its single endpoint.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Holds all points of all input trajectories, and tracks per-trajectory
/// bookkeeping needed for index translation and coverage accounting.
#[derive(Clone, Debug, Default)]
pub struct TrajectoryStore<P> {
    points: Vec<P>,
    ids: Vec<Id>,
    original_ids: Vec<Id>,
    trajectory_len: Vec<usize>,
    first_point_of: Vec<Option<Ix>>,
    deleted_of: Vec<usize>,
    live_len: usize,
}

impl<P: Clone> TrajectoryStore<P> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            ids: Vec::new(),
            original_ids: Vec::new(),
            trajectory_len: Vec::new(),
            first_point_of: Vec::new(),
            deleted_of: Vec::new(),
            live_len: 0,
        }
    }

    /// Appends a point belonging to trajectory `id`. `id` must not be
    /// [`Id::DELETED`].
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `id` is [`Id::DELETED`].
    pub fn push(&mut self, point: P, id: Id) {
        debug_assert_ne!(id, Id::DELETED, "cannot push a point with the deleted id");
        self.push_allow_deleted(point, id);
    }

    /// Like [`push`](Self::push), but permits `id == Id::DELETED` — used by
    /// curve simplification to mark where an original trajectory was split
    /// across a group boundary.
    pub fn push_allow_deleted(&mut self, point: P, id: Id) {
        self.points.push(point);
        self.ids.push(id);
        self.original_ids.push(id);
        self.live_len += 1;

        if id == Id::DELETED {
            return;
        }
        let idx = id.0 as usize;
        if self.trajectory_len.len() <= idx {
            self.trajectory_len.resize(idx + 1, 0);
            self.first_point_of.resize(idx + 1, None);
            self.deleted_of.resize(idx + 1, 0);
        }
        self.trajectory_len[idx] += 1;
        if self.first_point_of[idx].is_none() {
            self.first_point_of[idx] = Some(self.ids.len() - 1);
        }
    }

    /// The point stored at `index`, including tombstoned ones.
    #[must_use]
    pub fn point(&self, index: Ix) -> &P {
        &self.points[index]
    }

    /// The live or tombstoned id at `index`.
    #[must_use]
    pub fn id_at(&self, index: Ix) -> Id {
        self.ids[index]
    }

    /// The id this point was originally pushed with, even after deletion.
    #[must_use]
    pub fn original_id_at(&self, index: Ix) -> Id {
        self.original_ids[index]
    }

    /// Whether the point at `index` has been tombstoned.
    #[must_use]
    pub fn is_deleted(&self, index: Ix) -> bool {
        self.id_at(index) == Id::DELETED
    }

    /// The 0-based position of `index` within its own trajectory.
    ///
    /// Only meaningful if the store [`is_sorted_by_id`](Self::is_sorted_by_id).
    #[must_use]
    pub fn index_in_trajectory(&self, index: Ix) -> usize {
        let id = self.original_id_at(index).0 as usize;
        index - self.first_point_of[id].expect("id has at least one point")
    }

    /// Number of live (non-tombstoned) points.
    #[must_use]
    pub const fn live_len(&self) -> usize {
        self.live_len
    }

    /// Total number of points ever pushed, live or tombstoned.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.points.len()
    }

    /// Number of points originally pushed under trajectory `id`.
    #[must_use]
    pub fn trajectory_len(&self, id: Id) -> usize {
        self.trajectory_len[id.0 as usize]
    }

    /// Number of distinct trajectory ids seen so far.
    #[must_use]
    pub fn num_trajectories(&self) -> usize {
        self.trajectory_len.len()
    }

    /// Whether live ids appear in non-decreasing order, ignoring tombstones.
    #[must_use]
    pub fn is_sorted_by_id(&self) -> bool {
        let mut previous = None;
        for &id in &self.ids {
            if id == Id::DELETED {
                continue;
            }
            if let Some(prev) = previous {
                if id < prev {
                    return false;
                }
            }
            previous = Some(id);
        }
        true
    }

    /// The smallest index that has not been tombstoned.
    ///
    /// # Panics
    ///
    /// Panics if the store is empty.
    #[must_use]
    pub fn first_non_deleted(&self) -> Ix {
        assert!(!self.ids.is_empty(), "store is empty");
        self.ids
            .iter()
            .position(|&id| id != Id::DELETED)
            .unwrap_or(self.ids.len())
    }

    /// Tombstones the point at `index`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the point is already deleted.
    pub fn delete_point(&mut self, index: Ix) {
        debug_assert!(!self.is_deleted(index), "double deletion at {index}");
        let id = self.ids[index];
        self.ids[index] = Id::DELETED;
        self.deleted_of[id.0 as usize] += 1;
        self.live_len -= 1;
    }

    /// Tombstones every point in `subtrajectory`.
    pub fn delete_subtrajectory(&mut self, subtrajectory: Subtrajectory) {
        for index in subtrajectory.start..=subtrajectory.end {
            if !self.is_deleted(index) {
                self.delete_point(index);
            }
        }
    }

    /// Fraction of trajectory `id`'s points that remain uncovered.
    #[must_use]
    pub fn uncovered_fraction_of(&self, id: Id) -> f64 {
        let idx = id.0 as usize;
        let deleted = self.deleted_of[idx] as f64;
        let total = self.trajectory_len[idx] as f64;
        1.0 - deleted / total
    }

    /// Sum, over every trajectory, of the fraction of its points that remain
    /// uncovered.
    #[must_use]
    pub fn uncovered_fraction_sum(&self) -> f64 {
        (0..self.trajectory_len.len())
            .map(|id| self.uncovered_fraction_of(Id(id as u32)))
            .sum()
    }

    /// Simplified coverage score for a collection of reconstructed
    /// subtrajectories: `(total − Σ covered points) / total`, counted against
    /// original (pre-deletion) ids so that repeated queries against an
    /// already-pruned store still measure absolute coverage.
    ///
    /// When `ignore_point_clusters` is set, clusters whose reference is a
    /// single point (`subtrajectories` members that collapse to one index)
    /// are skipped, matching the "without point clusters" variant.
    #[must_use]
    pub fn uncovered_fraction_sum_with(
        &self,
        clusters: &[(Subtrajectory, Vec<Subtrajectory>)],
        ignore_point_clusters: bool,
    ) -> f64 {
        let mut covered = vec![0usize; self.trajectory_len.len()];
        for (reference, members) in clusters {
            if ignore_point_clusters && reference.start == reference.end {
                continue;
            }
            for member in members {
                let id = self.original_id_at(member.start).0 as usize;
                covered[id] += member.len();
            }
        }
        let total_covered: usize = covered.iter().sum();
        (self.total_len() - total_covered) as f64 / self.total_len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_tracks_per_trajectory_bookkeeping() {
        let mut store = TrajectoryStore::new();
        store.push(0.0_f64, Id(0));
        store.push(1.0_f64, Id(0));
        store.push(2.0_f64, Id(1));
        assert_eq!(store.trajectory_len(Id(0)), 2);
        assert_eq!(store.trajectory_len(Id(1)), 1);
        assert_eq!(store.index_in_trajectory(1), 1);
        assert_eq!(store.index_in_trajectory(2), 0);
        assert_eq!(store.num_trajectories(), 2);
        assert!(store.is_sorted_by_id());
    }

    #[test]
    fn delete_point_updates_live_len_and_coverage() {
        let mut store = TrajectoryStore::new();
        store.push(0.0_f64, Id(0));
        store.push(1.0_f64, Id(0));
        assert_eq!(store.live_len(), 2);
        store.delete_point(0);
        assert_eq!(store.live_len(), 1);
        assert!(store.is_deleted(0));
        assert!((store.uncovered_fraction_of(Id(0)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn delete_subtrajectory_deletes_every_point_once() {
        let mut store = TrajectoryStore::new();
        for _ in 0..4 {
            store.push(0.0_f64, Id(0));
        }
        store.delete_subtrajectory(Subtrajectory::new(1, 2));
        assert!(!store.is_deleted(0));
        assert!(store.is_deleted(1));
        assert!(store.is_deleted(2));
        assert!(!store.is_deleted(3));
    }

    #[test]
    fn first_non_deleted_skips_tombstones() {
        let mut store = TrajectoryStore::new();
        for _ in 0..3 {
            store.push(0.0_f64, Id(0));
        }
        store.delete_point(0);
        assert_eq!(store.first_non_deleted(), 1);
    }
}
