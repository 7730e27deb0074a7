//! Company inference and interview round mapping.

use serde::{Deserialize, Serialize};

use crate::analysis::skills::{SkillCategory, SkillExtraction};

/// Employer archetype. `Startup` is only produced when no company was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyType {
    Enterprise,
    #[serde(rename = "Startup / Mid-Size")]
    StartupMidSize,
    Startup,
}

/// Inferred employer profile.
///
/// The no-company profile carries neither `size` nor `industry`; those keys are
/// omitted from the serialized form rather than written as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIntel {
    #[serde(rename = "type")]
    pub company_type: CompanyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub focus: String,
}

/// A single interview stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub name: String,
    pub details: String,
    pub why: String,
}

const ENTERPRISE_ROSTER: &[&str] = &[
    "Google",
    "Microsoft",
    "Amazon",
    "TCS",
    "Infosys",
    "Wipro",
    "Accenture",
    "Cognizant",
    "IBM",
    "Oracle",
    "Cisco",
    "Intel",
    "Samsung",
    "Capgemini",
    "HCL",
    "Deloitte",
    "JPMorgan",
    "Goldman Sachs",
    "Flipkart",
    "Walmart",
];

/// Classifies a company name as enterprise or startup by roster substring match.
pub fn infer_company(name: &str) -> CompanyIntel {
    if name.is_empty() {
        return CompanyIntel {
            company_type: CompanyType::Startup,
            size: None,
            industry: None,
            focus: "Practical execution & Speed".to_string(),
        };
    }

    let clean = name.trim().to_lowercase();
    let is_enterprise = ENTERPRISE_ROSTER
        .iter()
        .any(|known| clean.contains(&known.to_lowercase()));

    if is_enterprise {
        CompanyIntel {
            company_type: CompanyType::Enterprise,
            size: Some("2000+ Employees".to_string()),
            industry: Some("Technology / Services".to_string()),
            focus: "DSA, Scalability, and Core CS Fundamentals".to_string(),
        }
    } else {
        CompanyIntel {
            company_type: CompanyType::StartupMidSize,
            size: Some("< 500 Employees".to_string()),
            industry: Some("Product / Tech".to_string()),
            focus: "Practical Building, Framework Depth, and Agility".to_string(),
        }
    }
}

fn round(name: &str, details: &str, why: &str) -> Round {
    Round {
        name: name.to_string(),
        details: details.to_string(),
        why: why.to_string(),
    }
}

/// Maps a company archetype to its expected interview rounds.
///
/// Enterprise output is fixed. For every other archetype only the first round's
/// details depend on whether web skills were detected.
pub fn generate_round_mapping(company_type: CompanyType, skills: &SkillExtraction) -> Vec<Round> {
    if company_type == CompanyType::Enterprise {
        return vec![
            round(
                "Round 1: Online Assessment",
                "Aptitude (Quant/Verbal) + 2 DSA Coding Problems (Easy/Medium)",
                "Filters candidates on raw problem-solving speed and logical ability.",
            ),
            round(
                "Round 2: Technical Interview I",
                "DSA (Medium/Hard) + CS Fundamentals (OS/DBMS)",
                "Validates strong engineering basics required for scale.",
            ),
            round(
                "Round 3: Technical Interview II",
                "System Design (LLD) + Project Deep Dive",
                "Checks ability to write clean, maintainable code in realistic scenarios.",
            ),
            round(
                "Round 4: Managerial / HR",
                "Behavioral Questions + value fit",
                "Ensures cultural alignment and long-term retention.",
            ),
        ];
    }

    let screening_details = if skills.has(SkillCategory::Web) {
        "Build a small feature (React/Node) or Take-home assignment"
    } else {
        "Practical Coding challenge (Logic + API)"
    };

    vec![
        round(
            "Round 1: Screening / Machine Coding",
            screening_details,
            "Proves you can build actual products, not just invert binary trees.",
        ),
        round(
            "Round 2: Technical Deep Dive",
            "Framework internals + Architecture discussion",
            "Ensures you understand the tools you use, not just how to copy-paste.",
        ),
        round(
            "Round 3: Founder / Culture Fit",
            "Product sense + Ownership mentality",
            "Startups need self-starters who care about the product vision.",
        ),
    ]
}
