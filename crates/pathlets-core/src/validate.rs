//! C10: cluster-overlap validation.

use crate::cluster::SubtrajectoryCluster;

/// Scans every member subtrajectory of every cluster and reports whether any
/// two of them cover the same point index. Each offending index is logged at
/// `warn` level as it is found.
#[must_use]
pub fn validate_no_overlap(clusters: &[SubtrajectoryCluster]) -> bool {
    let mut covered = Vec::new();
    let mut found_overlap = false;
    for cluster in clusters {
        for member in cluster.members() {
            for i in member.start..=member.end {
                if i >= covered.len() {
                    covered.resize(i + 1, false);
                }
                if covered[i] {
                    ftlog::warn!("found an overlap at vertex {i}");
                    found_overlap = true;
                }
                covered[i] = true;
            }
        }
    }
    found_overlap
}

#[cfg(test)]
mod tests {
    use super::validate_no_overlap;
    use crate::cluster::SubtrajectoryCluster;
    use crate::trajectory::Subtrajectory;

    #[test]
    fn disjoint_clusters_report_no_overlap() {
        let mut a = SubtrajectoryCluster::with_reference(Subtrajectory::new(0, 2));
        a.push(Subtrajectory::new(0, 2));
        let mut b = SubtrajectoryCluster::with_reference(Subtrajectory::new(3, 5));
        b.push(Subtrajectory::new(3, 5));
        assert!(!validate_no_overlap(&[a, b]));
    }

    #[test]
    fn shared_vertex_is_reported_as_overlap() {
        let mut a = SubtrajectoryCluster::with_reference(Subtrajectory::new(0, 2));
        a.push(Subtrajectory::new(0, 2));
        let mut b = SubtrajectoryCluster::with_reference(Subtrajectory::new(2, 4));
        b.push(Subtrajectory::new(2, 4));
        assert!(validate_no_overlap(&[a, b]));
    }
}
