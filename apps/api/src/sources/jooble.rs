//! Jooble connector — POST search with the API key as a path segment.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::job::{CanonicalJob, ContractType};
use crate::sources::{JobSourceConnector, SourceQuery};

const API_BASE_URL: &str = "https://jooble.org/api/";
const MAX_RESULTS: u32 = 100;

pub struct JoobleConnector {
    client: Client,
    api_key: Option<String>,
}

impl JoobleConnector {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(20))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    keywords: String,
    location: String,
    result_on_page: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs: Vec<RawJob>,
}

/// Jooble's payload is flat; ids are numeric.
#[derive(Debug, Deserialize)]
struct RawJob {
    id: Option<i64>,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    link: Option<String>,
    #[serde(rename = "type")]
    job_type: Option<String>,
    email: Option<String>,
}

/// Jooble `type` tag → canonical contract type.
fn map_type(tag: &str) -> Option<ContractType> {
    match tag.to_lowercase().as_str() {
        "full-time" | "permanent" => Some(ContractType::Permanent),
        "temporary" | "contract" => Some(ContractType::FixedTerm),
        "internship" => Some(ContractType::Internship),
        "apprenticeship" => Some(ContractType::Apprenticeship),
        "part-time" => Some(ContractType::StudentJob),
        _ => None,
    }
}

fn normalize(raw: RawJob) -> Option<CanonicalJob> {
    let external_id = raw.id?.to_string();
    let contract = raw.job_type.as_deref().and_then(map_type);
    Some(CanonicalJob {
        external_id,
        source: "jooble".to_string(),
        title: raw.title.unwrap_or_default(),
        company: raw
            .company
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Unknown company".to_string()),
        place: raw.location.unwrap_or_default(),
        contact_email: raw.email.filter(|e| !e.is_empty()),
        url: raw.link.unwrap_or_default(),
        contract,
    })
}

#[async_trait]
impl JobSourceConnector for JoobleConnector {
    fn name(&self) -> &'static str {
        "jooble"
    }

    async fn fetch(&self, query: &SourceQuery) -> Vec<CanonicalJob> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Jooble API key not configured, skipping");
            return vec![];
        };

        let request = SearchRequest {
            keywords: query.title.clone().unwrap_or_default(),
            location: query.location.clone().unwrap_or_default(),
            result_on_page: query.limit.min(MAX_RESULTS),
        };

        let url = format!("{API_BASE_URL}{api_key}");
        let response = match self.client.post(&url).json(&request).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Jooble fetch failed: {e}");
                return vec![];
            }
        };

        if !response.status().is_success() {
            warn!("Jooble returned {}", response.status());
            return vec![];
        }

        match response.json::<SearchResponse>().await {
            Ok(parsed) => {
                let jobs: Vec<_> = parsed.jobs.into_iter().filter_map(normalize).collect();
                debug!("Jooble returned {} usable listings", jobs.len());
                jobs
            }
            Err(e) => {
                warn!("Jooble response did not parse: {e}");
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_connector_yields_empty() {
        let connector = JoobleConnector::new(None);
        let query = SourceQuery {
            title: Some("engineer".to_string()),
            location: None,
            contract: None,
            limit: 10,
        };
        assert!(connector.fetch(&query).await.is_empty());
    }

    #[test]
    fn test_normalize_flat_payload_with_bare_email() {
        let raw: RawJob = serde_json::from_value(serde_json::json!({
            "id": 8800312345_i64,
            "title": "Backend Engineer",
            "company": "Datawharf",
            "location": "Lyon",
            "link": "https://jooble.example/8800312345",
            "type": "Full-time",
            "email": "jobs@datawharf.example"
        }))
        .unwrap();
        let job = normalize(raw).unwrap();
        assert_eq!(job.external_id, "8800312345");
        assert_eq!(job.contract, Some(ContractType::Permanent));
        assert_eq!(job.contact_email.as_deref(), Some("jobs@datawharf.example"));
        assert_eq!(job.source, "jooble");
    }

    #[test]
    fn test_normalize_drops_listings_without_id() {
        let raw: RawJob =
            serde_json::from_value(serde_json::json!({"title": "No id"})).unwrap();
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn test_type_mapping_table() {
        assert_eq!(map_type("Full-time"), Some(ContractType::Permanent));
        assert_eq!(map_type("Temporary"), Some(ContractType::FixedTerm));
        assert_eq!(map_type("Internship"), Some(ContractType::Internship));
        assert_eq!(map_type("Part-time"), Some(ContractType::StudentJob));
        assert_eq!(map_type("Volunteer"), None);
    }
}
