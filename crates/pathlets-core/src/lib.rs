//! Discovery of subtrajectory clusters ("pathlets") in 2D polygonal
//! trajectories under discrete Frechet distance.
//!
//! A trajectory is a sequence of points sharing one id; a pathlet is a
//! reference subtrajectory together with every other subtrajectory found to
//! lie within some distance of it under the discrete Frechet metric. The
//! pipeline from raw points to a final clustering runs through:
//!
//! - [`trajectory`]: the flat point store (C1).
//! - [`radius_index`]: spatial radius queries over it (C2).
//! - [`frechet`]: the discrete Frechet distance itself (C3).
//! - [`graph`]: sparse free-space graphs, both reconstructing
//!   ([`graph::retrieving`]) and incremental ([`graph::incremental`]) (C4,
//!   C5).
//! - [`bbgll`]: the fixed-cardinality/fixed-length cluster search of Buchin
//!   et al. (C6).
//! - [`rightstep`]: the coverage/cost-scored right-step search (C7).
//! - [`simplify`]: curve simplification used to speed up the right-step
//!   search (C8).
//! - [`driver`]: the top-level k-center and k-means clustering drivers (C9).
//! - [`validate`]: a post-hoc check that no cluster's members overlap (C10).

pub mod bbgll;
pub mod cluster;
pub mod driver;
pub mod frechet;
pub mod graph;
pub mod radius_index;
pub mod rightstep;
pub mod simplify;
pub mod trajectory;
pub mod validate;

pub use cluster::SubtrajectoryCluster;
pub use driver::{ClusterRoutine, ClusteringDriver, EfficacyFactors};
pub use radius_index::RadiusIndex;
pub use rightstep::RightstepConfig;
pub use trajectory::{Id, Subtrajectory, TrajectoryStore};
