//! The subtrajectory cluster value type shared by C4 through C9: a reference
//! subtrajectory plus the set of subtrajectories judged close enough to it.

use crate::trajectory::Subtrajectory;

/// A reference subtrajectory together with every subtrajectory (including,
/// conventionally, the reference itself) that matches it.
#[derive(Clone, Debug, Default)]
pub struct SubtrajectoryCluster {
    reference: Option<Subtrajectory>,
    members: Vec<Subtrajectory>,
}

impl SubtrajectoryCluster {
    /// An empty cluster with no reference subtrajectory set yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cluster already pinned to `reference`.
    #[must_use]
    pub fn with_reference(reference: Subtrajectory) -> Self {
        Self {
            reference: Some(reference),
            members: Vec::new(),
        }
    }

    /// Sets (or overwrites) the reference subtrajectory.
    pub fn set_reference(&mut self, reference: Subtrajectory) {
        self.reference = Some(reference);
    }

    /// Appends a member subtrajectory.
    pub fn push(&mut self, member: Subtrajectory) {
        self.members.push(member);
    }

    /// Drops every member. The reference subtrajectory is kept.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Whether this cluster has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// The most recently pushed member.
    ///
    /// # Panics
    ///
    /// Panics if the cluster has no members.
    #[must_use]
    pub fn back(&self) -> &Subtrajectory {
        self.members.last().expect("cluster has no members")
    }

    /// Mutable access to the most recently pushed member.
    ///
    /// # Panics
    ///
    /// Panics if the cluster has no members.
    pub fn back_mut(&mut self) -> &mut Subtrajectory {
        self.members.last_mut().expect("cluster has no members")
    }

    /// Whether `needle` appears among the members.
    #[must_use]
    pub fn contains(&self, needle: Subtrajectory) -> bool {
        self.members
            .iter()
            .any(|m| m.start == needle.start && m.end == needle.end)
    }

    /// The reference subtrajectory.
    ///
    /// # Panics
    ///
    /// Panics if no reference has been set.
    #[must_use]
    pub fn reference(&self) -> Subtrajectory {
        self.reference.expect("reference subtrajectory not set")
    }

    /// The full member list.
    #[must_use]
    pub fn members(&self) -> &[Subtrajectory] {
        &self.members
    }

    /// Mutable access to the full member list.
    pub fn members_mut(&mut self) -> &mut [Subtrajectory] {
        &mut self.members
    }

    /// Retains only members for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Subtrajectory) -> bool) {
        self.members.retain(|m| keep(m));
    }

    /// Total number of points spanned by the members, counting overlaps.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.members.iter().map(Subtrajectory::len).sum()
    }
}
