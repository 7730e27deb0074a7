//! Readiness scoring — additive base score plus confidence adjustment.
//!
//! base  = 35 + 5 × (detected categories) + 10 company + 10 role + 10 long JD, capped at 100
//! final = base + 2 × know − 2 × practice, clamped to [0, 100]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::skills::{Extraction, SkillCategory, SkillExtraction};

const BASE_SCORE: u32 = 35;
const PER_CATEGORY_BONUS: u32 = 5;
const METADATA_BONUS: u32 = 10;
/// JD length (in UTF-16 code units) above which the long-JD bonus applies.
const LONG_JD_THRESHOLD: usize = 800;
const CONFIDENCE_STEP: i64 = 2;
pub const MAX_SCORE: u32 = 100;

/// Self-reported mastery of a single skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Know,
    #[default]
    Practice,
}

pub type ConfidenceMap = BTreeMap<String, ConfidenceLevel>;

/// Inputs to the base score besides the extraction itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisMetadata {
    /// Trimmed company name, empty when absent.
    pub company: String,
    /// Trimmed role, empty when absent.
    pub role: String,
    pub jd_length: usize,
}

impl AnalysisMetadata {
    pub fn new(company: Option<&str>, role: Option<&str>, jd_text: &str) -> Self {
        Self {
            company: company.map(str::trim).unwrap_or_default().to_string(),
            role: role.map(str::trim).unwrap_or_default().to_string(),
            jd_length: jd_text.encode_utf16().count(),
        }
    }
}

pub fn calculate_base_score(extraction: &Extraction, metadata: &AnalysisMetadata) -> u32 {
    let detected = SkillCategory::DETECTED
        .into_iter()
        .filter(|&category| extraction.results.has(category))
        .count() as u32;

    let mut score = BASE_SCORE + detected * PER_CATEGORY_BONUS;

    if !metadata.company.is_empty() {
        score += METADATA_BONUS;
    }
    if !metadata.role.is_empty() {
        score += METADATA_BONUS;
    }
    if metadata.jd_length > LONG_JD_THRESHOLD {
        score += METADATA_BONUS;
    }

    score.min(MAX_SCORE)
}

/// Tags every extracted skill, the `other` bucket included, as `practice`.
///
/// Keyed by skill string, so a keyword seen twice yields one entry.
pub fn initial_confidence_map(skills: &SkillExtraction) -> ConfidenceMap {
    skills
        .all_skills()
        .map(|skill| (skill.clone(), ConfidenceLevel::Practice))
        .collect()
}

pub fn calculate_final_score(base_score: u32, confidence: &ConfidenceMap) -> u32 {
    let adjustment: i64 = confidence
        .values()
        .map(|level| match level {
            ConfidenceLevel::Know => CONFIDENCE_STEP,
            ConfidenceLevel::Practice => -CONFIDENCE_STEP,
        })
        .sum();

    (base_score as i64 + adjustment).clamp(0, MAX_SCORE as i64) as u32
}
