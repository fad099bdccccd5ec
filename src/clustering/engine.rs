use crate::clustering::models::{fingerprint_of, Cluster, InfrastructureSignature};
use crate::config::ClusteringConfig;
use crate::models::EnrichedRecord;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Groups records by exact infrastructure-signature equality.
///
/// Single pass: O(records) signature computation plus O(records) bucketing,
/// no pairwise comparison.
pub struct ClusteringEngine {
    config: ClusteringConfig,
}

impl ClusteringEngine {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Cluster a snapshot of records with the configured minimum size
    pub fn cluster(&self, records: &[EnrichedRecord]) -> Vec<Cluster> {
        self.cluster_with_min_size(records, self.config.min_cluster_size)
    }

    pub fn cluster_with_min_size(
        &self,
        records: &[EnrichedRecord],
        min_cluster_size: usize,
    ) -> Vec<Cluster> {
        let mut buckets: HashMap<String, Bucket<'_>> = HashMap::new();

        for record in records {
            if record.domain.is_empty() {
                warn!("Skipping malformed record without a domain");
                continue;
            }
            let InfrastructureSignature {
                value,
                all_placeholder,
            } = InfrastructureSignature::of(record);
            let bucket = buckets.entry(value).or_insert_with(|| Bucket {
                all_placeholder,
                members: Vec::new(),
            });
            bucket.members.push(record);
        }

        let mut clusters: Vec<Cluster> = buckets
            .into_iter()
            .filter(|(_, bucket)| bucket.members.len() >= min_cluster_size)
            .map(|(signature, bucket)| build_cluster(signature, bucket))
            .collect();

        // Largest clusters first, vendor-type diversity breaking ties,
        // signature keeping the order total
        clusters.sort_by(|a, b| {
            b.domain_count
                .cmp(&a.domain_count)
                .then(b.vendor_type_count.cmp(&a.vendor_type_count))
                .then(a.signature.cmp(&b.signature))
        });

        debug!(
            clusters = clusters.len(),
            records = records.len(),
            "Clustering pass complete"
        );
        clusters
    }
}

struct Bucket<'a> {
    all_placeholder: bool,
    members: Vec<&'a EnrichedRecord>,
}

fn build_cluster(signature: String, bucket: Bucket<'_>) -> Cluster {
    let mut domains: Vec<String> = bucket
        .members
        .iter()
        .map(|record| record.domain.clone())
        .collect();
    domains.sort();
    domains.dedup();

    let vendor_types: BTreeSet<String> = bucket
        .members
        .iter()
        .filter_map(|record| record.vendor_type.map(|vt| vt.to_string()))
        .collect();

    let fingerprint = fingerprint_of(&signature);
    let infrastructure = signature.split('|').map(str::to_string).collect();
    let domain_count = domains.len();
    let vendor_types: Vec<String> = vendor_types.into_iter().collect();
    let vendor_type_count = vendor_types.len();

    Cluster {
        signature,
        fingerprint,
        domains,
        domain_count,
        infrastructure,
        vendor_types,
        vendor_type_count,
        low_confidence: bucket.all_placeholder,
    }
}
