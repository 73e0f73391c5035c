//! C9: the clustering drivers.
//!
//! Ties the right-step routine (C7), curve simplification (C8), and the
//! efficacy/gamma scoring below into the two top-level searches: k-center
//! (maximize the worst-case pathlet distance) and k-means (maximize total
//! coverage minus a per-pathlet cost, the gamma-weighted objective of
//! Agarwal et al., PODS'18 section 4.3).
//!
//! A ladder of candidate squared distances is searched independently and in
//! parallel via [`rayon`]; k-center picks the single best distance after the
//! fact, while k-means replays every accepted cluster across every
//! candidate distance's private trajectory copy so that each one tracks the
//! exact same clustering (an intentionally serialized fan-out: see the
//! crate's design notes on why this replay, rather than letting each
//! distance pick independently, is required for k-means).

use rayon::prelude::*;

use pathlets_distances::SquaredMetric;

use crate::bbgll::BbgllRoutine;
use crate::cluster::SubtrajectoryCluster;
use crate::frechet;
use crate::radius_index::{AsXy, RadiusIndex};
use crate::rightstep::{ClusterSummary, RightstepConfig, RightstepRoutine};
use crate::simplify::CurveSimplification;
use crate::trajectory::{Ix, Subtrajectory, TrajectoryStore};

/// Which subtrajectory-enumeration routine the center loop runs per
/// candidate distance. K-means always uses [`Rightstep`](Self::Rightstep),
/// since its coverage-per-cost objective has no BBGLL equivalent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClusterRoutine {
    /// Coverage/cost-scored candidate enumeration (C7).
    #[default]
    Rightstep,
    /// Fixed-cardinality sliding-window search (C6), starting from the
    /// largest minimum pathlet length and backing off by one on failure.
    Bbgll,
}

/// Weights for the three terms of the efficacy score: number of clusters,
/// per-cluster distance to the reference, and fraction of points left
/// uncovered.
#[derive(Clone, Copy, Debug)]
pub struct EfficacyFactors {
    /// Weight on the number of clusters.
    pub c1: f64,
    /// Weight on the per-cluster distance term.
    pub c2: f64,
    /// Weight on the uncovered-points term.
    pub c3: f64,
    /// When set, clusters whose reference subtrajectory is a single point
    /// are treated as leaving their members uncovered rather than as a
    /// (free) cluster.
    pub ignore_point_clusters: bool,
}

impl Default for EfficacyFactors {
    /// The weights used by Agarwal et al. (PODS'18).
    fn default() -> Self {
        Self {
            c1: 1.0,
            c2: 0.005,
            c3: 1.0,
            ignore_point_clusters: false,
        }
    }
}

fn eval<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    cluster: &SubtrajectoryCluster,
    accum: impl Fn(f64, f64) -> f64,
) -> f64 {
    let reference = cluster.reference();
    cluster.members().iter().fold(0.0, |acc, &member| {
        accum(acc, frechet::compute_light(store, metric, reference, member).sqrt())
    })
}

fn cluster_pairs(clusters: &[SubtrajectoryCluster]) -> Vec<(Subtrajectory, Vec<Subtrajectory>)> {
    clusters.iter().map(|c| (c.reference(), c.members().to_vec())).collect()
}

fn compute_efficacy<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    clusters: &[SubtrajectoryCluster],
    factors: &EfficacyFactors,
    accum: impl Fn(f64, f64) -> f64 + Copy,
) -> f64 {
    if factors.ignore_point_clusters {
        let mut number_of_clusters = 0usize;
        let mut eval_result = 0.0;
        let considered: Vec<&SubtrajectoryCluster> = clusters
            .iter()
            .filter(|c| {
                let reference = c.reference();
                reference.end > reference.start
            })
            .collect();
        for cluster in &considered {
            number_of_clusters += 1;
            eval_result = accum(eval_result, eval(store, metric, cluster, accum));
        }
        let uncovered = store.uncovered_fraction_sum_with(&cluster_pairs(clusters), true);
        ftlog::debug!(
            "efficacy: clusters {number_of_clusters}, eval {eval_result:.6}, uncovered {uncovered:.6}"
        );
        factors.c1 * number_of_clusters as f64 + factors.c2 * eval_result + factors.c3 * uncovered
    } else {
        let mut eval_result = 0.0;
        for cluster in clusters {
            eval_result = accum(eval_result, eval(store, metric, cluster, accum));
        }
        let uncovered = store.uncovered_fraction_sum_with(&cluster_pairs(clusters), false);
        ftlog::debug!(
            "efficacy: clusters {}, eval {eval_result:.6}, uncovered {uncovered:.6}",
            clusters.len()
        );
        factors.c1 * clusters.len() as f64 + factors.c2 * eval_result + factors.c3 * uncovered
    }
}

/// Efficacy under the k-center objective: each cluster's distance term is
/// the *worst* (maximum) distance to any member.
#[must_use]
pub fn compute_efficacy_center<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    clusters: &[SubtrajectoryCluster],
    factors: &EfficacyFactors,
) -> f64 {
    compute_efficacy(store, metric, clusters, factors, f64::max)
}

/// Efficacy under the k-means objective: each cluster's distance term is the
/// *sum* of distances to its members.
#[must_use]
pub fn compute_efficacy_means<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    clusters: &[SubtrajectoryCluster],
    factors: &EfficacyFactors,
) -> f64 {
    compute_efficacy(store, metric, clusters, factors, |a, b| a + b)
}

fn compute_one_frechet_distance<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    reference: Subtrajectory,
    covered: Subtrajectory,
) -> f64 {
    if reference == covered {
        return 0.0;
    }
    frechet::compute_light(store, metric, reference, covered).sqrt()
}

fn compute_subtrajectory_score_delta(total_len: usize, covered: Subtrajectory, frechet_dist: f64, gamma: f64, factors: &EfficacyFactors) -> f64 {
    let coverage = covered.len() as f64 / total_len as f64;
    coverage - gamma * factors.c2 * frechet_dist
}

/// The largest `gamma` for which the total "coverage minus cost" of
/// `cluster`'s members still exceeds `gamma * c1`, found by doubling then
/// bisecting (Agarwal et al., PODS'18 section 4.3).
#[must_use]
pub fn compute_gamma<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    cluster: &SubtrajectoryCluster,
    factors: &EfficacyFactors,
) -> f64 {
    let reference = cluster.reference();
    let total_len = store.total_len();
    let distances: Vec<f64> = cluster
        .members()
        .iter()
        .map(|&m| compute_one_frechet_distance(store, metric, reference, m))
        .collect();

    let coverage_distance_score = |gamma: f64| -> f64 {
        cluster
            .members()
            .iter()
            .zip(&distances)
            .map(|(&m, &d)| compute_subtrajectory_score_delta(total_len, m, d, gamma, factors).max(0.0))
            .sum()
    };

    let mut l = 0.0_f64;
    let mut r = 1.0_f64;
    let mut it = 0;
    while it < 50 && coverage_distance_score(r) >= r * factors.c1 {
        r *= 2.0;
        it += 1;
    }
    for _ in 0..100 {
        let step = r - l;
        let m = l + step / 2.0;
        if coverage_distance_score(m) >= m * factors.c1 {
            l += step * 0.4;
        } else {
            r -= step * 0.4;
        }
    }
    r
}

/// Drops members of `cluster` whose coverage-minus-cost score at `gamma` is
/// negative.
pub fn prune_inefficient_subtrajectories<P: Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    metric: &M,
    cluster: &mut SubtrajectoryCluster,
    gamma: f64,
    factors: &EfficacyFactors,
) {
    let reference = cluster.reference();
    let total_len = store.total_len();
    cluster.retain(|&member| {
        let distance = compute_one_frechet_distance(store, metric, reference, member);
        compute_subtrajectory_score_delta(total_len, member, distance, gamma, factors) >= 0.0
    });
}

fn erase_points_in_cluster<P: Clone>(store: &mut TrajectoryStore<P>, index: &mut RadiusIndex, cluster: &SubtrajectoryCluster) {
    for &member in cluster.members() {
        for idx in member.start..=member.end {
            if !store.is_deleted(idx) {
                store.delete_point(idx);
                index.delete_point(idx);
            }
        }
    }
}

fn compute_min_max_sq_distance<P: AsXy + Clone, M: SquaredMetric<P>>(
    store: &TrajectoryStore<P>,
    index: &RadiusIndex,
    metric: &M,
) -> (f64, f64) {
    let mut min_distance = f64::INFINITY;
    let mut max_distance = 0.0_f64;
    for idx in 0..store.total_len() {
        let (nearest, farthest) = index.nearest_and_farthest_neighbor(store, metric, idx);
        if nearest > 0.0 {
            min_distance = min_distance.min(nearest);
        }
        max_distance = max_distance.max(farthest);
    }
    (min_distance, max_distance)
}

fn initialize_sq_distances(min_sq_distance: f64, max_sq_distance: f64) -> Vec<f64> {
    let mut distances = Vec::new();
    let mut sq_distance = min_sq_distance;
    while sq_distance < max_sq_distance {
        distances.push(sq_distance);
        // Since these are squared distances, multiplying by 4 doubles the
        // underlying (unsquared) distance step.
        sq_distance *= 4.0;
    }
    distances
}

/// One candidate squared distance's private, independently-prunable copy of
/// the trajectory, plus the clusters established against it so far.
struct FixedDistanceClustering<P> {
    store: TrajectoryStore<P>,
    index: RadiusIndex,
    sq_distance: f64,
    clusters: Vec<SubtrajectoryCluster>,
}

impl<P: Clone + AsXy> FixedDistanceClustering<P> {
    fn new<M: SquaredMetric<P>>(store: &TrajectoryStore<P>, metric: &M, sq_distance: f64) -> Self {
        let store = store.clone();
        let index = RadiusIndex::build(&store, metric);
        Self {
            store,
            index,
            sq_distance,
            clusters: Vec::new(),
        }
    }

    fn establish_cluster(&mut self, cluster: &SubtrajectoryCluster) {
        self.clusters.push(cluster.clone());
        erase_points_in_cluster(&mut self.store, &mut self.index, cluster);
    }

    fn find_best_cluster_rightstep<M: SquaredMetric<P>>(&self, metric: &M, mut config: RightstepConfig) -> SubtrajectoryCluster {
        // The distance is fixed here, so the cost-per-pathlet weight (given
        // relative to the unsquared distance) is finally resolved.
        config.cost_per_pathlet *= self.sq_distance.sqrt();

        if self.store.live_len() == 0 {
            return SubtrajectoryCluster::new();
        }

        if config.curve_simplification_factor == 0.0 {
            let weights = vec![1.0; self.store.total_len()];
            let routine = RightstepRoutine::new(&self.store, &self.index, metric, &weights, config);
            return routine.find_best_cluster(self.sq_distance);
        }

        let simplification = CurveSimplification::new(&self.store, metric, self.sq_distance, config.curve_simplification_factor);
        let simplified_index = simplification.build_index(metric);
        let simplified_routine = RightstepRoutine::new(
            simplification.trajectory(),
            &simplified_index,
            metric,
            simplification.point_weights(),
            config,
        );
        let candidate: Option<ClusterSummary> =
            simplification.unsimplify(simplified_routine.find_best_cluster_candidate(simplification.sq_distance()));

        let weights = vec![1.0; self.store.total_len()];
        let full_routine = RightstepRoutine::new(&self.store, &self.index, metric, &weights, config);
        match candidate {
            Some(candidate) => full_routine.to_subtrajectory_cluster(&candidate, self.sq_distance),
            None => SubtrajectoryCluster::new(),
        }
    }

    fn perform_clustering_rightstep<M: SquaredMetric<P>>(&mut self, metric: &M, config: RightstepConfig) {
        while self.store.live_len() > 0 {
            let candidate = self.find_best_cluster_rightstep(metric, config);
            if candidate.is_empty() {
                break;
            }
            self.establish_cluster(&candidate);
        }
    }

    /// Repeatedly finds the highest-cardinality cluster via the BBGLL sweep,
    /// starting the minimum-length search at `max_pathlet_length` and
    /// backing it off by one whenever no cluster is found, instead of
    /// asserting success the way the right-step search does.
    fn perform_clustering_bbgll<M: SquaredMetric<P>>(&mut self, metric: &M, max_pathlet_length: Ix) {
        let mut min_pathlet_length = max_pathlet_length;
        while self.store.live_len() > 0 {
            let routine = BbgllRoutine::new(&self.store, &self.index, metric);
            match routine.find_max_cardinality_cluster_maximizing_length(self.sq_distance, min_pathlet_length) {
                Some(candidate) if !candidate.is_empty() => {
                    self.establish_cluster(&candidate);
                }
                _ => {
                    if min_pathlet_length == 0 {
                        break;
                    }
                    min_pathlet_length -= 1;
                }
            }
        }
    }

    fn compute_gamma<M: SquaredMetric<P>>(&self, metric: &M, cluster: &SubtrajectoryCluster, factors: &EfficacyFactors) -> f64 {
        compute_gamma(&self.store, metric, cluster, factors)
    }

    fn drop_inefficient_clusters<M: SquaredMetric<P>>(
        &mut self,
        metric: &M,
        factors: &EfficacyFactors,
        compute_efficacy: impl Fn(&TrajectoryStore<P>, &M, &[SubtrajectoryCluster], &EfficacyFactors) -> f64,
    ) {
        let score_empty = compute_efficacy(&self.store, metric, &[], factors);
        self.clusters.retain(|cluster| {
            let score_used = compute_efficacy(&self.store, metric, std::slice::from_ref(cluster), factors);
            score_used <= score_empty
        });
    }

    fn drop_inefficient_clusters_means<M: SquaredMetric<P>>(&mut self, metric: &M, factors: &EfficacyFactors) {
        self.drop_inefficient_clusters(metric, factors, compute_efficacy_means);
    }

    fn drop_inefficient_clusters_center<M: SquaredMetric<P>>(&mut self, metric: &M, factors: &EfficacyFactors) {
        // Dropping a cluster is assumed not to significantly change the
        // maximum Frechet distance, so the distance term is zeroed here.
        let mut factors = *factors;
        factors.c2 = 0.0;
        self.drop_inefficient_clusters(metric, &factors, compute_efficacy_center);
    }

    const fn remaining_points(&self) -> usize {
        self.store.live_len()
    }
}

/// The top-level clustering search over a ladder of candidate squared
/// distances.
pub struct ClusteringDriver<'a, P, M> {
    store: &'a TrajectoryStore<P>,
    metric: &'a M,
    sq_distances: Vec<f64>,
    efficacy_factors: EfficacyFactors,
    config: RightstepConfig,
    routine: ClusterRoutine,
    pathlets: Vec<SubtrajectoryCluster>,
}

impl<'a, P: Clone + AsXy + Sync + Send, M: SquaredMetric<P> + Sync> ClusteringDriver<'a, P, M> {
    /// Builds a driver over `store`. `min_distance`/`max_distance` of `None`
    /// compute the global nearest/farthest-neighbor distance instead.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if both distances are given and `min_distance
    /// > max_distance`.
    #[must_use]
    pub fn new(
        store: &'a TrajectoryStore<P>,
        index: &RadiusIndex,
        metric: &'a M,
        min_distance: Option<f64>,
        max_distance: Option<f64>,
        efficacy_factors: EfficacyFactors,
        config: RightstepConfig,
        routine: ClusterRoutine,
    ) -> Self {
        let (min_d, max_d) = if let (Some(lo), Some(hi)) = (min_distance, max_distance) {
            (lo, hi)
        } else {
            let (store_min_sq, store_max_sq) = compute_min_max_sq_distance(store, index, metric);
            let min_d = min_distance.unwrap_or_else(|| store_min_sq.sqrt());
            let max_d = max_distance.unwrap_or_else(|| store_max_sq.sqrt());
            debug_assert!(min_d <= max_d, "min_distance must not exceed max_distance");
            (min_d, max_d)
        };

        Self {
            store,
            metric,
            sq_distances: initialize_sq_distances(min_d * min_d, max_d * max_d),
            efficacy_factors,
            config,
            routine,
            pathlets: Vec::new(),
        }
    }

    /// The squared distances that will be (or were) searched.
    #[must_use]
    pub fn sq_distances(&self) -> &[f64] {
        &self.sq_distances
    }

    /// The pathlets found by the last clustering run.
    #[must_use]
    pub fn pathlets(&self) -> &[SubtrajectoryCluster] {
        &self.pathlets
    }

    /// Efficacy of the current pathlets under the k-center objective,
    /// measured against the original (unmodified) trajectory.
    #[must_use]
    pub fn compute_center_efficacy(&self) -> f64 {
        compute_efficacy_center(self.store, self.metric, &self.pathlets, &self.efficacy_factors)
    }

    /// Efficacy of the current pathlets under the k-means objective,
    /// measured against the original (unmodified) trajectory.
    #[must_use]
    pub fn compute_means_efficacy(&self) -> f64 {
        compute_efficacy_means(self.store, self.metric, &self.pathlets, &self.efficacy_factors)
    }

    /// Runs every candidate distance to completion independently and in
    /// parallel, drops each one's inefficient clusters, then keeps the
    /// single distance whose resulting clustering has the best (lowest)
    /// k-center efficacy.
    ///
    /// # Panics
    ///
    /// Panics if the distance ladder is empty.
    pub fn perform_center_clustering(&mut self) {
        let mut config = self.config;
        // k-center maximizes coverage directly, skipping the (slow) cost
        // computation entirely.
        config.cost_per_pathlet = 0.0;

        let mut algos: Vec<FixedDistanceClustering<P>> = self
            .sq_distances
            .iter()
            .map(|&dist| FixedDistanceClustering::new(self.store, self.metric, dist))
            .collect();

        let max_pathlet_length = self.store.total_len();
        algos.par_iter_mut().for_each(|algo| {
            match self.routine {
                ClusterRoutine::Rightstep => algo.perform_clustering_rightstep(self.metric, config),
                ClusterRoutine::Bbgll => algo.perform_clustering_bbgll(self.metric, max_pathlet_length),
            }
            algo.drop_inefficient_clusters_center(self.metric, &self.efficacy_factors);
            ftlog::info!("clustered at distance {:.6}", algo.sq_distance.sqrt());
        });

        let best = algos
            .iter()
            .min_by(|a, b| {
                let ea = compute_efficacy_center(self.store, self.metric, &a.clusters, &self.efficacy_factors);
                let eb = compute_efficacy_center(self.store, self.metric, &b.clusters, &self.efficacy_factors);
                ea.partial_cmp(&eb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("distance ladder is never empty");

        ftlog::info!(
            "best clustering found at distance {:.6}",
            best.sq_distance.sqrt()
        );
        self.pathlets = best.clusters.clone();
    }

    /// Repeatedly finds the best-gamma candidate cluster across every
    /// candidate distance, prunes it against the original trajectory, and
    /// replays it onto every candidate distance's private copy so that all
    /// of them track the same clustering in lockstep (Section 4.3 of
    /// Agarwal et al., PODS'18).
    pub fn perform_means_clustering(&mut self) {
        let mut config = self.config;
        // The distance isn't fixed yet, so this is later multiplied by it.
        config.cost_per_pathlet = self.efficacy_factors.c2 / self.efficacy_factors.c1;

        let mut algos: Vec<FixedDistanceClustering<P>> = self
            .sq_distances
            .iter()
            .map(|&dist| FixedDistanceClustering::new(self.store, self.metric, dist))
            .collect();

        while algos.first().is_some_and(FixedDistanceClustering::remaining_points_is_positive) {
            let candidates: Vec<(SubtrajectoryCluster, f64)> = algos
                .par_iter()
                .map(|algo| {
                    let candidate = algo.find_best_cluster_rightstep(self.metric, config);
                    let gamma = algo.compute_gamma(self.metric, &candidate, &self.efficacy_factors);
                    (candidate, gamma)
                })
                .collect();

            let Some(best_i) = candidates
                .iter()
                .enumerate()
                .max_by(|(_, (_, g_a)), (_, (_, g_b))| g_a.partial_cmp(g_b).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(i, _)| i)
            else {
                break;
            };

            let (mut best_cluster, best_gamma) = candidates.into_iter().nth(best_i).expect("index in range");
            prune_inefficient_subtrajectories(self.store, self.metric, &mut best_cluster, best_gamma, &self.efficacy_factors);

            // On very dense data sets this can happen when very few points
            // remain, due to floating point inaccuracies; leaving the
            // remaining points unclustered is preferable.
            if best_cluster.is_empty() {
                break;
            }

            ftlog::info!(
                "best cluster: distance {:.6}, gamma {:.6}, vertices {}",
                self.sq_distances[best_i].sqrt(),
                best_gamma,
                best_cluster.number_of_vertices()
            );

            for algo in &mut algos {
                algo.establish_cluster(&best_cluster);
            }
        }

        if let Some(front) = algos.first_mut() {
            front.drop_inefficient_clusters_means(self.metric, &self.efficacy_factors);
            self.pathlets = front.clusters.clone();
        }
    }
}

impl<P: Clone> FixedDistanceClustering<P> {
    fn remaining_points_is_positive(&self) -> bool {
        self.store.live_len() > 0
    }
}

/// Writes one `<traj_id> <l> <r>` header line per cluster followed by a
/// space-separated line of `<traj_id> <l> <r>` triples for its members, with
/// indices translated back to per-trajectory (rather than global) offsets.
///
/// # Errors
///
/// Forwards any I/O error from `writer`.
pub fn print_clustering_spaced<P: Clone, W: std::io::Write>(
    store: &TrajectoryStore<P>,
    pathlets: &[SubtrajectoryCluster],
    mut writer: W,
) -> std::io::Result<()> {
    for cluster in pathlets {
        let reference = cluster.reference();
        writeln!(
            writer,
            "{} {} {}",
            store.original_id_at(reference.start).0,
            store.index_in_trajectory(reference.start),
            store.index_in_trajectory(reference.end)
        )?;

        let mut first = true;
        for &member in cluster.members() {
            if !first {
                write!(writer, " ")?;
            }
            first = false;
            write!(
                writer,
                "{} {} {}",
                store.original_id_at(member.start).0,
                store.index_in_trajectory(member.start),
                store.index_in_trajectory(member.end)
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Writes one CSV row per covered subtrajectory: `.,.,.,.,<cluster
/// index>,<start>,<end>`.
///
/// # Errors
///
/// Forwards any I/O error from `writer`.
pub fn print_clustering_csv<W: std::io::Write>(pathlets: &[SubtrajectoryCluster], mut writer: W) -> std::io::Result<()> {
    for (idx, cluster) in pathlets.iter().enumerate() {
        for member in cluster.members() {
            writeln!(writer, ".,.,.,.,{idx},{},{}", member.start, member.end)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{compute_gamma, compute_min_max_sq_distance, initialize_sq_distances, ClusteringDriver, EfficacyFactors};
    use crate::cluster::SubtrajectoryCluster;
    use crate::radius_index::RadiusIndex;
    use crate::trajectory::{Id, Subtrajectory, TrajectoryStore};
    use pathlets_distances::{Euclidean2D, Point2};

    fn line_store(n: i64) -> TrajectoryStore<Point2> {
        let mut store = TrajectoryStore::new();
        for x in 0..n {
            store.push(Point2::new(x as f64, 0.0), Id(0));
        }
        store
    }

    #[test]
    fn distance_ladder_quadruples_until_it_reaches_the_max() {
        let distances = initialize_sq_distances(1.0, 20.0);
        assert_eq!(distances, vec![1.0, 4.0, 16.0]);
    }

    #[test]
    fn min_max_sq_distance_matches_unit_spacing() {
        let store = line_store(4);
        let index = RadiusIndex::build(&store, &Euclidean2D);
        let (min_d, max_d) = compute_min_max_sq_distance(&store, &index, &Euclidean2D);
        assert!((min_d - 1.0).abs() < 1e-9);
        assert!((max_d - 9.0).abs() < 1e-9);
    }

    #[test]
    fn gamma_is_zero_for_a_cluster_with_no_members() {
        let store = line_store(4);
        let cluster = SubtrajectoryCluster::with_reference(Subtrajectory::new(0, 0));
        let gamma = compute_gamma(&store, &Euclidean2D, &cluster, &EfficacyFactors::default());
        assert!(gamma.abs() < 1e-6);
    }

    #[test]
    fn center_clustering_covers_every_point() {
        let store = line_store(6);
        let index = RadiusIndex::build(&store, &Euclidean2D);
        let mut driver = ClusteringDriver::new(
            &store,
            &index,
            &Euclidean2D,
            None,
            None,
            EfficacyFactors::default(),
            super::RightstepConfig::default(),
            super::ClusterRoutine::default(),
        );
        driver.perform_center_clustering();
        let covered: usize = driver.pathlets().iter().map(SubtrajectoryCluster::number_of_vertices).sum();
        assert!(covered > 0);
    }

    #[test]
    fn bbgll_center_clustering_also_covers_every_point() {
        let store = line_store(6);
        let index = RadiusIndex::build(&store, &Euclidean2D);
        let mut driver = ClusteringDriver::new(
            &store,
            &index,
            &Euclidean2D,
            None,
            None,
            EfficacyFactors::default(),
            super::RightstepConfig::default(),
            super::ClusterRoutine::Bbgll,
        );
        driver.perform_center_clustering();
        let covered: usize = driver.pathlets().iter().map(SubtrajectoryCluster::number_of_vertices).sum();
        assert!(covered > 0);
    }
}
