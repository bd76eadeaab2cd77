//! France Travail connector — the one provider with a real auth flow:
//! an OAuth2 client-credentials exchange for a bearer token precedes every
//! search.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::job::{CanonicalJob, ContractType};
use crate::sources::{JobSourceConnector, SourceQuery};

const TOKEN_URL: &str =
    "https://entreprise.francetravail.fr/connexion/oauth2/access_token?realm=%2Fpartenaire";
const SEARCH_URL: &str =
    "https://api.francetravail.io/partenaire/offresdemploi/v2/offres/search";
const OAUTH_SCOPE: &str = "api_offresdemploiv2 o2dsoffre";
/// The offers API rejects ranges wider than 150.
const MAX_RESULTS: u32 = 150;

pub struct FranceTravailConnector {
    client: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl FranceTravailConnector {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(20))
                .build()
                .expect("Failed to build HTTP client"),
            client_id,
            client_secret,
        }
    }

    /// Exchanges client credentials for a bearer token. Any failure is
    /// absorbed: no token means no results for this run.
    async fn access_token(&self) -> Option<String> {
        let (Some(id), Some(secret)) = (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            warn!("France Travail credentials not configured, skipping");
            return None;
        };

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", id),
            ("client_secret", secret),
            ("scope", OAUTH_SCOPE),
        ];

        let response = match self.client.post(TOKEN_URL).form(&form).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("France Travail token exchange failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("France Travail token endpoint returned {}", response.status());
            return None;
        }

        match response.json::<TokenResponse>().await {
            Ok(token) => Some(token.access_token),
            Err(e) => {
                warn!("France Travail token response did not parse: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    resultats: Vec<RawOffer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOffer {
    id: String,
    intitule: Option<String>,
    entreprise: Option<RawEntreprise>,
    lieu_travail: Option<RawLieuTravail>,
    type_contrat: Option<String>,
    contact: Option<RawContact>,
    origine_offre: Option<RawOrigineOffre>,
}

#[derive(Debug, Deserialize)]
struct RawEntreprise {
    nom: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLieuTravail {
    libelle: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContact {
    courriel: Option<String>,
    url_postulation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrigineOffre {
    url_origine: Option<String>,
}

/// France Travail `typeContrat` code → canonical contract type.
fn map_contrat(code: &str) -> Option<ContractType> {
    match code {
        "CDI" => Some(ContractType::Permanent),
        "CDD" | "MIS" | "SAI" => Some(ContractType::FixedTerm),
        "STG" => Some(ContractType::Internship),
        "APP" => Some(ContractType::Apprenticeship),
        _ => None,
    }
}

fn normalize(raw: RawOffer) -> Option<CanonicalJob> {
    if raw.id.is_empty() {
        return None;
    }
    let contract = raw.type_contrat.as_deref().and_then(map_contrat);
    // Structured contact field first; this provider has no bare email field.
    let contact_email = raw
        .contact
        .as_ref()
        .and_then(|c| c.courriel.clone())
        .filter(|e| !e.is_empty());
    let url = raw
        .origine_offre
        .and_then(|o| o.url_origine)
        .or_else(|| raw.contact.and_then(|c| c.url_postulation))
        .unwrap_or_default();
    Some(CanonicalJob {
        external_id: raw.id,
        source: "france_travail".to_string(),
        title: raw.intitule.unwrap_or_default(),
        company: raw
            .entreprise
            .and_then(|e| e.nom)
            .unwrap_or_else(|| "Unknown company".to_string()),
        place: raw.lieu_travail.and_then(|l| l.libelle).unwrap_or_default(),
        contact_email,
        url,
        contract,
    })
}

#[async_trait]
impl JobSourceConnector for FranceTravailConnector {
    fn name(&self) -> &'static str {
        "france_travail"
    }

    async fn fetch(&self, query: &SourceQuery) -> Vec<CanonicalJob> {
        let Some(token) = self.access_token().await else {
            return vec![];
        };

        // The search API filters location by INSEE commune code, which the
        // free-text profile can't supply; the matcher re-checks place anyway.
        let mut params = vec![(
            "range".to_string(),
            format!("0-{}", query.limit.min(MAX_RESULTS).saturating_sub(1)),
        )];
        if let Some(title) = &query.title {
            params.push(("motsCles".to_string(), title.clone()));
        }

        let response = match self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&token)
            .query(&params)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("France Travail search failed: {e}");
                return vec![];
            }
        };

        if !response.status().is_success() {
            warn!("France Travail search returned {}", response.status());
            return vec![];
        }

        match response.json::<SearchResponse>().await {
            Ok(parsed) => {
                let jobs: Vec<_> = parsed.resultats.into_iter().filter_map(normalize).collect();
                debug!("France Travail returned {} usable listings", jobs.len());
                jobs
            }
            Err(e) => {
                warn!("France Travail response did not parse: {e}");
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
        let connector = FranceTravailConnector::new(None, None);
        let query = SourceQuery {
            title: Some("engineer".to_string()),
            location: None,
            contract: None,
            limit: 10,
        };
        assert!(connector.fetch(&query).await.is_empty());
    }

    #[test]
    fn test_normalize_reads_nested_fields_and_structured_contact() {
        let raw: RawOffer = serde_json::from_value(serde_json::json!({
            "id": "174KZXB",
            "intitule": "Développeur backend H/F",
            "entreprise": {"nom": "Datawharf"},
            "lieuTravail": {"libelle": "69 - LYON 03"},
            "typeContrat": "CDI",
            "contact": {"courriel": "recrutement@datawharf.example"},
            "origineOffre": {"urlOrigine": "https://candidat.example/174KZXB"}
        }))
        .unwrap();
        let job = normalize(raw).unwrap();
        assert_eq!(job.external_id, "174KZXB");
        assert_eq!(job.company, "Datawharf");
        assert_eq!(job.place, "69 - LYON 03");
        assert_eq!(job.contract, Some(ContractType::Permanent));
        assert_eq!(
            job.contact_email.as_deref(),
            Some("recrutement@datawharf.example")
        );
        assert_eq!(job.url, "https://candidat.example/174KZXB");
    }

    #[test]
    fn test_normalize_falls_back_to_application_url() {
        let raw: RawOffer = serde_json::from_value(serde_json::json!({
            "id": "174KZXC",
            "contact": {"urlPostulation": "https://postuler.example/174KZXC"}
        }))
        .unwrap();
        let job = normalize(raw).unwrap();
        assert_eq!(job.url, "https://postuler.example/174KZXC");
        assert!(job.contact_email.is_none());
    }

    #[test]
    fn test_contrat_mapping_table() {
        assert_eq!(map_contrat("CDI"), Some(ContractType::Permanent));
        assert_eq!(map_contrat("CDD"), Some(ContractType::FixedTerm));
        assert_eq!(map_contrat("MIS"), Some(ContractType::FixedTerm));
        assert_eq!(map_contrat("SAI"), Some(ContractType::FixedTerm));
        assert_eq!(map_contrat("STG"), Some(ContractType::Internship));
        assert_eq!(map_contrat("APP"), Some(ContractType::Apprenticeship));
        assert_eq!(map_contrat("LIB"), None);
    }
}
