use shared_models::{Severity, Urgency};

use crate::models::{Diagnosis, GeneratedReport};

pub const CONFIDENCE: &str = "Medium";

const BASE_RECOMMENDATIONS: [&str; 3] = [
    "Ensure adequate hydration",
    "Get plenty of rest",
    "Monitor your symptoms",
];

/// Builds the diagnosis report for a symptom. Same inputs, same output.
pub fn generate_report(main_symptom: &str, severity: Severity) -> GeneratedReport {
    let symptom = main_symptom.to_lowercase();
    let severe = severity == Severity::Severe;

    GeneratedReport {
        diagnosis: diagnose(&symptom, severe),
        recommendations: recommend(&symptom, severe),
        urgency: Urgency::from(severity),
        follow_up: follow_up(severe).to_string(),
    }
}

fn diagnose(symptom: &str, severe: bool) -> Diagnosis {
    let (primary, differential): (&str, [&str; 4]) = if symptom.contains("headache") {
        (
            if severe { "Migraine" } else { "Tension Headache" },
            ["Tension Headache", "Migraine", "Sinusitis", "Dehydration"],
        )
    } else if symptom.contains("cough") {
        (
            if severe { "Bronchitis" } else { "Common Cold" },
            ["Common Cold", "Allergies", "Bronchitis", "COVID-19"],
        )
    } else if symptom.contains("stomach") || symptom.contains("nausea") {
        (
            "Gastroenteritis",
            ["Gastroenteritis", "Food Poisoning", "Irritable Bowel Syndrome", "Acid Reflux"],
        )
    } else if symptom.contains("fever") {
        (
            "Viral Infection",
            ["Viral Infection", "Bacterial Infection", "COVID-19", "Influenza"],
        )
    } else if symptom.contains("pain") {
        (
            "Musculoskeletal Pain",
            ["Muscle Strain", "Arthritis", "Fibromyalgia", "Nerve Compression"],
        )
    } else {
        (
            "General Malaise",
            ["Stress", "Fatigue", "Viral Infection", "Dehydration"],
        )
    };

    Diagnosis {
        primary: primary.to_string(),
        confidence: CONFIDENCE.to_string(),
        differential: differential.iter().map(|d| d.to_string()).collect(),
    }
}

fn recommend(symptom: &str, severe: bool) -> Vec<String> {
    let advice: [&str; 3] = if symptom.contains("headache") {
        [
            "Over-the-counter pain relievers such as ibuprofen or acetaminophen",
            "Apply a cool compress to your forehead",
            if severe { "Consult with a neurologist" } else { "Reduce screen time and eye strain" },
        ]
    } else if symptom.contains("cough") {
        [
            "Over-the-counter cough suppressants",
            "Honey and warm tea for sore throat",
            if severe { "Consult with a pulmonologist" } else { "Use a humidifier" },
        ]
    } else {
        [
            "Over-the-counter pain relievers if needed",
            "Balanced diet to support recovery",
            if severe {
                "Seek immediate medical attention"
            } else {
                "Follow up with your primary care physician if symptoms persist"
            },
        ]
    };

    BASE_RECOMMENDATIONS
        .iter()
        .chain(advice.iter())
        .map(|r| r.to_string())
        .collect()
}

fn follow_up(severe: bool) -> &'static str {
    if severe {
        "Consult with a healthcare provider immediately"
    } else {
        "Consult with a healthcare provider within the next few days"
    }
}
