use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Medical specialty a symptom report is routed to.
///
/// Doctors store their specialty as a `Domain` as well; the practitioner
/// labels used by the settings form ("Cardiologist", "Neurologist", ...)
/// are accepted as aliases so that both sides compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Domain {
    #[serde(alias = "cardiology", alias = "Cardiologist")]
    Cardiology,

    #[serde(alias = "dermatology", alias = "Dermatologist")]
    Dermatology,

    #[serde(alias = "neurology", alias = "Neurologist")]
    Neurology,

    #[serde(alias = "gastroenterology", alias = "Gastroenterologist")]
    Gastroenterology,

    #[serde(alias = "orthopedics", alias = "Orthopedic")]
    Orthopedics,

    #[serde(alias = "psychology", alias = "Psychiatrist", alias = "Psychologist")]
    Psychology,

    #[serde(
        rename = "Primary Care",
        alias = "primary_care",
        alias = "General Medicine",
        alias = "general"
    )]
    PrimaryCare,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::Cardiology,
        Domain::Dermatology,
        Domain::Neurology,
        Domain::Gastroenterology,
        Domain::Orthopedics,
        Domain::Psychology,
        Domain::PrimaryCare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Cardiology => "Cardiology",
            Domain::Dermatology => "Dermatology",
            Domain::Neurology => "Neurology",
            Domain::Gastroenterology => "Gastroenterology",
            Domain::Orthopedics => "Orthopedics",
            Domain::Psychology => "Psychology",
            Domain::PrimaryCare => "Primary Care",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(value.trim().to_string()))
            .map_err(|_| format!("Unknown medical domain: {}", value))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Mild => write!(f, "mild"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::Severe => write!(f, "severe"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl From<Severity> for Urgency {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Severe => Urgency::High,
            Severity::Moderate => Urgency::Medium,
            Severity::Mild => Urgency::Low,
        }
    }
}
