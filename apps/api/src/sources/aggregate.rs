//! Aggregation — one concurrent fan-out across all configured connectors,
//! then a merge that dedups by external id.
//!
//! Connector order is priority order: when two providers list the same
//! external id, the first-registered connector's version wins.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::models::job::CanonicalJob;
use crate::models::profile::CandidateProfile;
use crate::sources::{JobSourceConnector, SourceQuery};

/// How many listings to request from each provider per run.
pub const DEFAULT_FETCH_LIMIT: u32 = 50;

/// Derives the one query every connector receives for this run.
pub fn query_for(profile: &CandidateProfile) -> SourceQuery {
    SourceQuery {
        title: profile.preferred_titles.first().cloned(),
        location: profile.locations.first().cloned(),
        contract: profile.preferred_contract(),
        limit: DEFAULT_FETCH_LIMIT,
    }
}

/// Runs every connector concurrently and merges their results.
///
/// Each connector has already absorbed its own failures into an empty vec,
/// so the join can only shrink the merged list, never fail it.
pub async fn fetch_all(
    connectors: &[Arc<dyn JobSourceConnector>],
    query: &SourceQuery,
) -> Vec<CanonicalJob> {
    let results = join_all(connectors.iter().map(|c| c.fetch(query))).await;

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for (connector, jobs) in connectors.iter().zip(results) {
        debug!("{}: {} listings", connector.name(), jobs.len());
        for job in jobs {
            if seen.insert(job.external_id.clone()) {
                merged.push(job);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_job(id: &str, source: &str) -> CanonicalJob {
        CanonicalJob {
            external_id: id.to_string(),
            source: source.to_string(),
            title: "Backend Engineer".to_string(),
            company: "Datawharf".to_string(),
            place: "Lyon".to_string(),
            contact_email: Some("jobs@datawharf.example".to_string()),
            url: format!("https://example.com/{id}"),
            contract: None,
        }
    }

    struct StaticConnector {
        name: &'static str,
        jobs: Vec<CanonicalJob>,
        calls: AtomicUsize,
    }

    impl StaticConnector {
        fn new(name: &'static str, jobs: Vec<CanonicalJob>) -> Arc<Self> {
            Arc::new(Self {
                name,
                jobs,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl JobSourceConnector for StaticConnector {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, _query: &SourceQuery) -> Vec<CanonicalJob> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.jobs.clone()
        }
    }

    /// Stands in for a provider whose failure was absorbed to empty.
    struct BrokenConnector;

    #[async_trait]
    impl JobSourceConnector for BrokenConnector {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn fetch(&self, _query: &SourceQuery) -> Vec<CanonicalJob> {
            vec![]
        }
    }

    fn make_query() -> SourceQuery {
        SourceQuery {
            title: Some("backend".to_string()),
            location: Some("Lyon".to_string()),
            contract: None,
            limit: 10,
        }
    }

    #[tokio::test]
    async fn test_merges_all_connectors() {
        let a = StaticConnector::new("a", vec![make_job("1", "a"), make_job("2", "a")]);
        let b = StaticConnector::new("b", vec![make_job("3", "b")]);
        let connectors: Vec<Arc<dyn JobSourceConnector>> = vec![a.clone(), b.clone()];

        let merged = fetch_all(&connectors, &make_query()).await;
        assert_eq!(merged.len(), 3);
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dedup_keeps_first_connector_version() {
        let a = StaticConnector::new("a", vec![make_job("dup", "a")]);
        let b = StaticConnector::new("b", vec![make_job("dup", "b"), make_job("4", "b")]);
        let connectors: Vec<Arc<dyn JobSourceConnector>> = vec![a, b];

        let merged = fetch_all(&connectors, &make_query()).await;
        assert_eq!(merged.len(), 2);
        let dup = merged.iter().find(|j| j.external_id == "dup").unwrap();
        assert_eq!(dup.source, "a");
    }

    #[tokio::test]
    async fn test_one_empty_connector_does_not_affect_the_rest() {
        let a = StaticConnector::new("a", vec![make_job("1", "a")]);
        let connectors: Vec<Arc<dyn JobSourceConnector>> =
            vec![Arc::new(BrokenConnector), a];

        let merged = fetch_all(&connectors, &make_query()).await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].external_id, "1");
    }

    #[test]
    fn test_query_for_uses_first_preferences() {
        use chrono::Utc;
        use uuid::Uuid;

        let profile = CandidateProfile {
            user_id: Uuid::new_v4(),
            full_name: "Ana Martín".to_string(),
            campaign_email: Some("ana@example.com".to_string()),
            auto_apply: true,
            preferred_titles: vec!["Backend Engineer".to_string(), "SRE".to_string()],
            locations: vec!["Lyon".to_string(), "Paris".to_string()],
            contract_type: Some("cdi".to_string()),
            default_cover_letter: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let query = query_for(&profile);
        assert_eq!(query.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(query.location.as_deref(), Some("Lyon"));
        assert_eq!(
            query.contract,
            Some(crate::models::job::ContractType::Permanent)
        );
        assert_eq!(query.limit, DEFAULT_FETCH_LIMIT);
    }
}
