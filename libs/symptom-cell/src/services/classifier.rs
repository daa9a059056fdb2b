use shared_models::Domain;

/// Keyword rule for one medical domain.
pub struct DomainRule {
    pub domain: Domain,
    pub keywords: &'static [&'static str],
}

/// Evaluated top to bottom; the first rule with a matching keyword wins.
pub const DOMAIN_RULES: [DomainRule; 6] = [
    DomainRule {
        domain: Domain::Cardiology,
        keywords: &["chest pain", "heart", "palpitation", "shortness of breath", "hypertension"],
    },
    DomainRule {
        domain: Domain::Dermatology,
        keywords: &["rash", "skin", "itching", "acne", "hair loss"],
    },
    DomainRule {
        domain: Domain::Neurology,
        keywords: &["headache", "migraine", "seizure", "dizziness", "stroke"],
    },
    DomainRule {
        domain: Domain::Gastroenterology,
        keywords: &["stomach", "nausea", "vomiting", "diarrhea", "constipation", "abdominal pain"],
    },
    DomainRule {
        domain: Domain::Orthopedics,
        keywords: &["bone", "joint pain", "fracture", "back pain", "knee pain", "arthritis"],
    },
    DomainRule {
        domain: Domain::Psychology,
        keywords: &["anxiety", "depression", "stress", "insomnia", "mental health"],
    },
];

pub const FALLBACK_DOMAIN: Domain = Domain::PrimaryCare;

/// Routes a symptom description to a medical domain.
pub fn classify_domain(main_symptom: &str, additional_symptoms: &str) -> Domain {
    classify_with_keyword(main_symptom, additional_symptoms).0
}

/// Same as [`classify_domain`], also returning the keyword that decided it.
pub fn classify_with_keyword(main_symptom: &str, additional_symptoms: &str) -> (Domain, Option<&'static str>) {
    let combined = format!("{} {}", main_symptom, additional_symptoms).to_lowercase();

    DOMAIN_RULES
        .iter()
        .find_map(|rule| {
            rule.keywords
                .iter()
                .find(|keyword| combined.contains(*keyword))
                .map(|keyword| (rule.domain, Some(*keyword)))
        })
        .unwrap_or((FALLBACK_DOMAIN, None))
}
