use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::ContractType;

/// A candidate's application preferences, owned 1:1 by a user.
///
/// Mutated only through the candidate's own profile-update flow; the campaign
/// runner reads it and never writes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateProfile {
    pub user_id: Uuid,
    pub full_name: String,
    /// Address campaign emails are sent on behalf of (reply-to). Must be
    /// present and well-formed for any run to proceed.
    pub campaign_email: Option<String>,
    pub auto_apply: bool,
    /// Ordered by preference; empty means no title constraint.
    pub preferred_titles: Vec<String>,
    /// Free text; may contain "anywhere" wildcards (see `matching`).
    pub locations: Vec<String>,
    pub contract_type: Option<String>,
    /// Candidate-supplied fallback body used when generation fails.
    pub default_cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CandidateProfile {
    pub fn preferred_contract(&self) -> Option<ContractType> {
        self.contract_type.as_deref().and_then(ContractType::parse)
    }
}

/// Minimal well-formedness check for the campaign email: one `@` with a
/// non-empty local part and a dotted domain. Deliverability is the
/// dispatcher's problem.
pub fn is_well_formed_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_emails_pass() {
        assert!(is_well_formed_email("ana@example.com"));
        assert!(is_well_formed_email("first.last@sub.domain.io"));
    }

    #[test]
    fn test_malformed_emails_fail() {
        assert!(!is_well_formed_email(""));
        assert!(!is_well_formed_email("no-at-sign.com"));
        assert!(!is_well_formed_email("@example.com"));
        assert!(!is_well_formed_email("ana@"));
        assert!(!is_well_formed_email("ana@nodot"));
        assert!(!is_well_formed_email("ana b@example.com"));
        assert!(!is_well_formed_email("ana@example.c"));
    }

    #[test]
    fn test_preferred_contract_parses_free_text() {
        let profile = CandidateProfile {
            user_id: Uuid::new_v4(),
            full_name: "Ana Martín".to_string(),
            campaign_email: Some("ana@example.com".to_string()),
            auto_apply: true,
            preferred_titles: vec![],
            locations: vec![],
            contract_type: Some("CDI".to_string()),
            default_cover_letter: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(profile.preferred_contract(), Some(ContractType::Permanent));
    }
}
