//! Adzuna connector — REST search with app_id/app_key query-string auth.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::job::{CanonicalJob, ContractType};
use crate::sources::{JobSourceConnector, SourceQuery};

const SEARCH_URL: &str = "https://api.adzuna.com/v1/api/jobs/fr/search/1";
/// Adzuna caps `results_per_page` at 50.
const MAX_RESULTS: u32 = 50;

pub struct AdzunaConnector {
    client: Client,
    app_id: Option<String>,
    app_key: Option<String>,
}

impl AdzunaConnector {
    pub fn new(app_id: Option<String>, app_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(20))
                .build()
                .expect("Failed to build HTTP client"),
            app_id,
            app_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<RawListing>,
}

#[derive(Debug, Deserialize)]
struct RawListing {
    id: Option<serde_json::Value>,
    title: Option<String>,
    company: Option<RawCompany>,
    location: Option<RawLocation>,
    redirect_url: Option<String>,
    contract_type: Option<String>,
    contract_time: Option<String>,
    contact_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCompany {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    display_name: Option<String>,
}

/// Adzuna tag → canonical contract type.
fn map_contract(contract_type: Option<&str>, contract_time: Option<&str>) -> Option<ContractType> {
    match contract_type.map(str::to_lowercase).as_deref() {
        Some("permanent") => Some(ContractType::Permanent),
        Some("contract") => Some(ContractType::FixedTerm),
        Some("internship") => Some(ContractType::Internship),
        Some("apprenticeship") => Some(ContractType::Apprenticeship),
        // Untyped part-time listings read as student jobs.
        None if contract_time.map(str::to_lowercase).as_deref() == Some("part_time") => {
            Some(ContractType::StudentJob)
        }
        _ => None,
    }
}

fn normalize(raw: RawListing) -> Option<CanonicalJob> {
    // Adzuna serves ids as either a string or a number depending on endpoint.
    let external_id = match raw.id? {
        serde_json::Value::String(s) if !s.is_empty() => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let contract = map_contract(raw.contract_type.as_deref(), raw.contract_time.as_deref());
    Some(CanonicalJob {
        external_id,
        source: "adzuna".to_string(),
        title: raw.title.unwrap_or_default(),
        company: raw
            .company
            .and_then(|c| c.display_name)
            .unwrap_or_else(|| "Unknown company".to_string()),
        place: raw
            .location
            .and_then(|l| l.display_name)
            .unwrap_or_default(),
        contact_email: raw.contact_email.filter(|e| !e.is_empty()),
        url: raw.redirect_url.unwrap_or_default(),
        contract,
    })
}

#[async_trait]
impl JobSourceConnector for AdzunaConnector {
    fn name(&self) -> &'static str {
        "adzuna"
    }

    async fn fetch(&self, query: &SourceQuery) -> Vec<CanonicalJob> {
        let (Some(app_id), Some(app_key)) = (self.app_id.as_deref(), self.app_key.as_deref())
        else {
            warn!("Adzuna credentials not configured, skipping");
            return vec![];
        };

        let mut params = vec![
            ("app_id".to_string(), app_id.to_string()),
            ("app_key".to_string(), app_key.to_string()),
            (
                "results_per_page".to_string(),
                query.limit.min(MAX_RESULTS).to_string(),
            ),
            ("content-type".to_string(), "application/json".to_string()),
        ];
        if let Some(title) = &query.title {
            params.push(("what".to_string(), title.clone()));
        }
        if let Some(location) = &query.location {
            params.push(("where".to_string(), location.clone()));
        }
        // Adzuna narrows by flag, not tag; the matcher re-checks contract
        // types it cannot express upstream.
        match query.contract {
            Some(ContractType::Permanent) => params.push(("permanent".to_string(), "1".to_string())),
            Some(ContractType::FixedTerm) => params.push(("contract".to_string(), "1".to_string())),
            Some(ContractType::StudentJob) => params.push(("part_time".to_string(), "1".to_string())),
            _ => {}
        }

        let response = match self.client.get(SEARCH_URL).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Adzuna fetch failed: {e}");
                return vec![];
            }
        };

        if !response.status().is_success() {
            warn!("Adzuna returned {}", response.status());
            return vec![];
        }

        match response.json::<SearchResponse>().await {
            Ok(parsed) => {
                let jobs: Vec<_> = parsed.results.into_iter().filter_map(normalize).collect();
                debug!("Adzuna returned {} usable listings", jobs.len());
                jobs
            }
            Err(e) => {
                warn!("Adzuna response did not parse: {e}");
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
        let connector = AdzunaConnector::new(None, None);
        let query = SourceQuery {
            title: Some("engineer".to_string()),
            location: None,
            contract: None,
            limit: 10,
        };
        assert!(connector.fetch(&query).await.is_empty());
    }

    #[test]
    fn test_normalize_reads_nested_company_and_location() {
        let raw: RawListing = serde_json::from_value(serde_json::json!({
            "id": "4321987",
            "title": "Backend Engineer",
            "company": {"display_name": "Datawharf"},
            "location": {"display_name": "Lyon, Auvergne-Rhône-Alpes"},
            "redirect_url": "https://adzuna.example/4321987",
            "contract_type": "permanent",
            "contact_email": "jobs@datawharf.example"
        }))
        .unwrap();
        let job = normalize(raw).unwrap();
        assert_eq!(job.external_id, "4321987");
        assert_eq!(job.company, "Datawharf");
        assert_eq!(job.place, "Lyon, Auvergne-Rhône-Alpes");
        assert_eq!(job.contract, Some(ContractType::Permanent));
        assert_eq!(job.contact_email.as_deref(), Some("jobs@datawharf.example"));
        assert_eq!(job.source, "adzuna");
    }

    #[test]
    fn test_normalize_accepts_numeric_ids() {
        let raw: RawListing = serde_json::from_value(serde_json::json!({
            "id": 4321987,
            "title": "Backend Engineer"
        }))
        .unwrap();
        assert_eq!(normalize(raw).unwrap().external_id, "4321987");
    }

    #[test]
    fn test_normalize_drops_listings_without_id() {
        let raw: RawListing =
            serde_json::from_value(serde_json::json!({"title": "No id"})).unwrap();
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn test_contract_mapping_table() {
        assert_eq!(
            map_contract(Some("permanent"), None),
            Some(ContractType::Permanent)
        );
        assert_eq!(
            map_contract(Some("contract"), None),
            Some(ContractType::FixedTerm)
        );
        assert_eq!(
            map_contract(Some("internship"), None),
            Some(ContractType::Internship)
        );
        assert_eq!(map_contract(None, Some("part_time")), Some(ContractType::StudentJob));
        assert_eq!(map_contract(Some("zero-hours"), None), None);
        assert_eq!(map_contract(None, None), None);
    }
}
