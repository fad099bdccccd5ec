/// Infrastructure clustering
///
/// Groups enriched records that share an infrastructure fingerprint.
/// Clustering is a pure batch function of the current record set: membership
/// is recomputed from scratch on every run.
pub mod engine;
pub mod models;

pub use engine::ClusteringEngine;
pub use models::{Cluster, InfrastructureSignature, PLACEHOLDER};
