use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::company::{CompanyIntel, Round};
use crate::analysis::plan::{backfill_questions, ChecklistGroup, DayBlock};
use crate::analysis::scoring::ConfidenceMap;
use crate::analysis::skills::SkillExtraction;

/// A persisted JD analysis. Field names follow the stored camelCase layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEntry {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
    pub company: String,
    pub role: String,
    pub jd_text: String,
    pub extracted_skills: SkillExtraction,
    pub round_mapping: Vec<Round>,
    pub checklist: Vec<ChecklistGroup>,
    #[serde(rename = "plan7Days")]
    pub plan_7_days: Vec<DayBlock>,
    /// Histories written by the browser app can hold `null` slots here.
    #[serde(deserialize_with = "deserialize_questions")]
    pub questions: Vec<String>,
    pub base_score: u32,
    pub final_score: u32,
    pub skill_confidence_map: ConfidenceMap,
    pub intel: CompanyIntel,
}

fn deserialize_questions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let slots = Vec::<Option<String>>::deserialize(deserializer)?;
    Ok(backfill_questions(slots))
}

/// ISO-8601 with exactly three fractional digits, e.g. `2024-01-01T00:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        DateTime::<Utc>::deserialize(deserializer)
    }
}
