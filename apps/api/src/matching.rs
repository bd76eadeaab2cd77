//! Profile/job matching — three independent predicates, AND-ed.
//!
//! The standing rule across all three: absence of a stated preference is
//! permissive, never restrictive. A profile with no locations accepts every
//! place; a job with no contract tag passes every contract preference.

use crate::models::job::{CanonicalJob, ContractType};
use crate::models::profile::CandidateProfile;

/// Location preferences that mean "anywhere" and short-circuit the place check.
const LOCATION_WILDCARDS: [&str; 5] = [
    "remote",
    "full remote",
    "anywhere",
    "everywhere",
    "nationwide",
];

/// Filters canonical jobs down to those compatible with the profile's
/// location, title, and contract-type preferences.
pub fn match_jobs(jobs: Vec<CanonicalJob>, profile: &CandidateProfile) -> Vec<CanonicalJob> {
    let preferred_contract = profile.preferred_contract();
    jobs.into_iter()
        .filter(|job| {
            location_matches(&job.place, &profile.locations)
                && title_matches(&job.title, &profile.preferred_titles)
                && ContractType::accepts(preferred_contract, job.contract)
        })
        .collect()
}

fn location_matches(place: &str, preferences: &[String]) -> bool {
    if preferences.is_empty() {
        return true;
    }
    if preferences
        .iter()
        .any(|p| LOCATION_WILDCARDS.contains(&p.trim().to_lowercase().as_str()))
    {
        return true;
    }
    let place = place.to_lowercase();
    preferences
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .any(|p| place.contains(&p))
}

fn title_matches(title: &str, preferences: &[String]) -> bool {
    if preferences.is_empty() {
        return true;
    }
    let title = title.to_lowercase();
    preferences
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .any(|p| title.contains(&p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_profile(
        titles: Vec<&str>,
        locations: Vec<&str>,
        contract: Option<&str>,
    ) -> CandidateProfile {
        CandidateProfile {
            user_id: Uuid::new_v4(),
            full_name: "Ana Martín".to_string(),
            campaign_email: Some("ana@example.com".to_string()),
            auto_apply: true,
            preferred_titles: titles.into_iter().map(String::from).collect(),
            locations: locations.into_iter().map(String::from).collect(),
            contract_type: contract.map(String::from),
            default_cover_letter: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_job(title: &str, place: &str, contract: Option<ContractType>) -> CanonicalJob {
        CanonicalJob {
            external_id: Uuid::new_v4().to_string(),
            source: "adzuna".to_string(),
            title: title.to_string(),
            company: "Datawharf".to_string(),
            place: place.to_string(),
            contact_email: Some("jobs@datawharf.example".to_string()),
            url: "https://example.com/job".to_string(),
            contract,
        }
    }

    #[test]
    fn test_lyon_job_excluded_for_paris_preference() {
        let profile = make_profile(vec![], vec!["Paris"], None);
        let jobs = vec![make_job("Backend Engineer", "Lyon", None)];
        assert!(match_jobs(jobs, &profile).is_empty());
    }

    #[test]
    fn test_lyon_job_included_without_location_preference() {
        let profile = make_profile(vec![], vec![], None);
        let jobs = vec![make_job("Backend Engineer", "Lyon", None)];
        assert_eq!(match_jobs(jobs, &profile).len(), 1);
    }

    #[test]
    fn test_lyon_job_included_with_anywhere_wildcard() {
        for wildcard in ["Remote", "anywhere", "Everywhere", "nationwide"] {
            let profile = make_profile(vec![], vec![wildcard], None);
            let jobs = vec![make_job("Backend Engineer", "Lyon", None)];
            assert_eq!(match_jobs(jobs, &profile).len(), 1, "wildcard {wildcard}");
        }
    }

    #[test]
    fn test_location_match_is_case_insensitive_substring() {
        let profile = make_profile(vec![], vec!["lyon"], None);
        let jobs = vec![make_job("Backend Engineer", "Lyon 3e Arrondissement", None)];
        assert_eq!(match_jobs(jobs, &profile).len(), 1);
    }

    #[test]
    fn test_title_match_is_case_insensitive_substring() {
        let profile = make_profile(vec!["backend"], vec![], None);
        let matched = match_jobs(
            vec![
                make_job("Senior Backend Engineer", "Paris", None),
                make_job("Data Analyst", "Paris", None),
            ],
            &profile,
        );
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "Senior Backend Engineer");
    }

    #[test]
    fn test_contract_preference_filters_mismatches() {
        let profile = make_profile(vec![], vec![], Some("internship"));
        let matched = match_jobs(
            vec![
                make_job("Engineer", "Paris", Some(ContractType::Permanent)),
                make_job("Engineer Intern", "Paris", Some(ContractType::Internship)),
                make_job("Apprentice Engineer", "Paris", Some(ContractType::Apprenticeship)),
                make_job("Engineer (untagged)", "Paris", None),
            ],
            &profile,
        );
        // Internship preference keeps internship, apprenticeship, and untagged.
        assert_eq!(matched.len(), 3);
        assert!(matched.iter().all(|j| j.title != "Engineer"));
    }

    #[test]
    fn test_all_predicates_are_anded() {
        let profile = make_profile(vec!["backend"], vec!["Paris"], Some("permanent"));
        let matched = match_jobs(
            vec![
                make_job("Backend Engineer", "Paris", Some(ContractType::Permanent)),
                make_job("Backend Engineer", "Lyon", Some(ContractType::Permanent)),
                make_job("Frontend Engineer", "Paris", Some(ContractType::Permanent)),
                make_job("Backend Engineer", "Paris", Some(ContractType::Internship)),
            ],
            &profile,
        );
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].place, "Paris");
    }

    #[test]
    fn test_no_preferences_accepts_everything() {
        let profile = make_profile(vec![], vec![], None);
        let matched = match_jobs(
            vec![
                make_job("Anything", "Nowhere", Some(ContractType::StudentJob)),
                make_job("Other", "Elsewhere", None),
            ],
            &profile,
        );
        assert_eq!(matched.len(), 2);
    }
}
