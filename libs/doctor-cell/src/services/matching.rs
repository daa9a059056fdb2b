// libs/doctor-cell/src/services/matching.rs
use shared_models::Domain;

use crate::models::DoctorProfile;

/// Narrows a doctor list to a domain and a free-text term. The term matches
/// the name or the specialty, case-insensitively.
pub fn filter_doctors(doctors: Vec<DoctorProfile>, domain: Option<Domain>, term: Option<&str>) -> Vec<DoctorProfile> {
    let term = term
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());

    let mut matches: Vec<DoctorProfile> = doctors
        .into_iter()
        .filter(|doctor| domain.is_none() || doctor.specialty == domain)
        .filter(|doctor| match &term {
            Some(term) => matches_term(doctor, term),
            None => true,
        })
        .collect();

    matches.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    matches
}

fn matches_term(doctor: &DoctorProfile, term: &str) -> bool {
    doctor.name.to_lowercase().contains(term)
        || doctor
            .specialty
            .map(|s| s.as_str().to_lowercase().contains(term))
            .unwrap_or(false)
}

/// Parses a specialty from the settings form. Empty clears the specialty;
/// labels outside the domain set are rejected.
pub fn parse_specialty(label: &str) -> Result<Option<Domain>, String> {
    let label = label.trim();
    if label.is_empty() {
        return Ok(None);
    }
    label.parse::<Domain>().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn doctor(name: &str, specialty: Option<Domain>) -> DoctorProfile {
        let mut profile = DoctorProfile::new_default(Uuid::new_v4(), name, "doc@example.com", Utc::now());
        profile.specialty = specialty;
        profile
    }

    fn roster() -> Vec<DoctorProfile> {
        vec![
            doctor("Dr. Zhang", Some(Domain::Neurology)),
            doctor("Dr. Adams", Some(Domain::Neurology)),
            doctor("Dr. Patel", Some(Domain::Cardiology)),
            doctor("Dr. Unset", None),
        ]
    }

    #[test]
    fn domain_filter_keeps_only_matching_specialty() {
        let names: Vec<String> = filter_doctors(roster(), Some(Domain::Neurology), None)
            .into_iter()
            .map(|d| d.name)
            .collect();

        assert_eq!(names, vec!["Dr. Adams", "Dr. Zhang"]);
    }

    #[test]
    fn search_term_matches_name_or_specialty() {
        assert_eq!(filter_doctors(roster(), None, Some("patel")).len(), 1);
        assert_eq!(filter_doctors(roster(), None, Some("NEURO")).len(), 2);
        assert_eq!(filter_doctors(roster(), None, Some("  ")).len(), 4);
        assert!(filter_doctors(roster(), Some(Domain::Cardiology), Some("zhang")).is_empty());
    }

    #[test]
    fn specialty_labels() {
        assert_eq!(parse_specialty("Neurologist"), Ok(Some(Domain::Neurology)));
        assert_eq!(parse_specialty("General Medicine"), Ok(Some(Domain::PrimaryCare)));
        assert_eq!(parse_specialty(""), Ok(None));
        assert!(parse_specialty("Pediatrician").is_err());
    }
}
