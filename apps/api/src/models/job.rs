use serde::{Deserialize, Serialize};

/// Closed set of contract types a listing or a profile preference can carry.
///
/// Every connector maps its provider-specific tags into this enum at
/// normalization time; nothing downstream ever looks at raw provider strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Permanent,
    FixedTerm,
    Internship,
    Apprenticeship,
    StudentJob,
}

impl ContractType {
    /// Parses a candidate's free-text contract preference.
    /// Returns `None` for unrecognized input — treated as "no preference".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "permanent" | "full-time" | "full time" | "cdi" => Some(ContractType::Permanent),
            "fixed-term" | "fixed term" | "contract" | "temporary" | "cdd" => {
                Some(ContractType::FixedTerm)
            }
            "internship" | "intern" | "stage" => Some(ContractType::Internship),
            "apprenticeship" | "apprentice" | "alternance" => Some(ContractType::Apprenticeship),
            "student job" | "student" | "part-time" | "part time" => Some(ContractType::StudentJob),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Permanent => "permanent",
            ContractType::FixedTerm => "fixed_term",
            ContractType::Internship => "internship",
            ContractType::Apprenticeship => "apprenticeship",
            ContractType::StudentJob => "student_job",
        }
    }

    /// Whether a job's contract type satisfies a candidate's preference.
    ///
    /// Absence on either side is permissive. Beyond exact equality, an
    /// internship preference also accepts apprenticeship listings, and a
    /// student-job preference also accepts fixed-term listings.
    pub fn accepts(preference: Option<ContractType>, job: Option<ContractType>) -> bool {
        match (preference, job) {
            (None, _) | (_, None) => true,
            (Some(pref), Some(job)) => {
                pref == job
                    || matches!(
                        (pref, job),
                        (ContractType::Internship, ContractType::Apprenticeship)
                            | (ContractType::StudentJob, ContractType::FixedTerm)
                    )
            }
        }
    }
}

/// A job listing normalized into one provider-independent shape.
///
/// Produced fresh on every run by the connectors; never persisted. Only the
/// outcome of attempting it is stored (see `CampaignApplication`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalJob {
    /// Provider-assigned listing id — the per-campaign dedup key.
    pub external_id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    pub place: String,
    pub contact_email: Option<String>,
    pub url: String,
    pub contract: Option<ContractType>,
}

impl CanonicalJob {
    /// Display name used in application rows and email subjects.
    pub fn target_name(&self) -> String {
        format!("{} - {}", self.company, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognizes_common_aliases() {
        assert_eq!(ContractType::parse("CDI"), Some(ContractType::Permanent));
        assert_eq!(ContractType::parse("full-time"), Some(ContractType::Permanent));
        assert_eq!(ContractType::parse("cdd"), Some(ContractType::FixedTerm));
        assert_eq!(ContractType::parse("Internship"), Some(ContractType::Internship));
        assert_eq!(
            ContractType::parse("alternance"),
            Some(ContractType::Apprenticeship)
        );
        assert_eq!(
            ContractType::parse("student job"),
            Some(ContractType::StudentJob)
        );
    }

    #[test]
    fn test_parse_unknown_input_is_no_preference() {
        assert_eq!(ContractType::parse("freelance gig"), None);
        assert_eq!(ContractType::parse(""), None);
    }

    #[test]
    fn test_accepts_is_permissive_when_either_side_is_absent() {
        assert!(ContractType::accepts(None, Some(ContractType::Permanent)));
        assert!(ContractType::accepts(Some(ContractType::Permanent), None));
        assert!(ContractType::accepts(None, None));
    }

    #[test]
    fn test_accepts_exact_match() {
        assert!(ContractType::accepts(
            Some(ContractType::FixedTerm),
            Some(ContractType::FixedTerm)
        ));
        assert!(!ContractType::accepts(
            Some(ContractType::Permanent),
            Some(ContractType::Internship)
        ));
    }

    #[test]
    fn test_internship_preference_accepts_apprenticeship() {
        assert!(ContractType::accepts(
            Some(ContractType::Internship),
            Some(ContractType::Apprenticeship)
        ));
        // Not symmetric: an apprenticeship preference is exact.
        assert!(!ContractType::accepts(
            Some(ContractType::Apprenticeship),
            Some(ContractType::Internship)
        ));
    }

    #[test]
    fn test_student_job_preference_accepts_fixed_term() {
        assert!(ContractType::accepts(
            Some(ContractType::StudentJob),
            Some(ContractType::FixedTerm)
        ));
        assert!(!ContractType::accepts(
            Some(ContractType::FixedTerm),
            Some(ContractType::StudentJob)
        ));
    }

    #[test]
    fn test_target_name_joins_company_and_title() {
        let job = CanonicalJob {
            external_id: "j1".to_string(),
            source: "adzuna".to_string(),
            title: "Backend Engineer".to_string(),
            company: "Datawharf".to_string(),
            place: "Lyon".to_string(),
            contact_email: None,
            url: "https://example.com/j1".to_string(),
            contract: None,
        };
        assert_eq!(job.target_name(), "Datawharf - Backend Engineer");
    }
}
