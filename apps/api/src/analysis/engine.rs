//! Analysis Engine — runs the extraction → intel → rounds → score → plan
//! pipeline and owns the capped history.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::company::{generate_round_mapping, infer_company};
use crate::analysis::plan::generate_plan;
use crate::analysis::scoring::{
    calculate_base_score, calculate_final_score, initial_confidence_map, AnalysisMetadata,
    ConfidenceMap,
};
use crate::analysis::skills::{extract_skills, SkillCategory};
use crate::history::{decode_history, encode_history, push_capped, HistoryStore, StoreError};
use crate::models::analysis::AnalysisEntry;

const ID_PREFIX: &str = "analysis_";

/// How entry ids are generated.
///
/// `Timestamp` reproduces the `analysis_<epoch millis>` ids of existing
/// histories. Two analyses in the same millisecond share an id and lookups then
/// return the newer one. `Uuid` avoids that at the cost of a different id shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdScheme {
    #[default]
    Timestamp,
    Uuid,
}

impl FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp" => Ok(IdScheme::Timestamp),
            "uuid" => Ok(IdScheme::Uuid),
            other => Err(format!("unknown id scheme '{other}' (expected timestamp|uuid)")),
        }
    }
}

impl IdScheme {
    fn generate(&self, now: DateTime<Utc>) -> String {
        match self {
            IdScheme::Timestamp => format!("{ID_PREFIX}{}", now.timestamp_millis()),
            IdScheme::Uuid => format!("{ID_PREFIX}{}", Uuid::new_v4()),
        }
    }
}

/// Timestamps are kept at millisecond precision, like the stored format.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Confidence tags naming skills the entry never extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSkills(pub Vec<String>);

#[derive(Debug, Error)]
pub enum ConfidenceUpdateError {
    #[error("skills not in analysis: {}", .0.join(", "))]
    UnknownSkills(Vec<String>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UnknownSkills> for ConfidenceUpdateError {
    fn from(UnknownSkills(skills): UnknownSkills) -> Self {
        ConfidenceUpdateError::UnknownSkills(skills)
    }
}

/// Merges confidence tags into an entry and recomputes its final score.
///
/// Every tagged skill must already be in the entry's confidence map.
pub fn apply_confidence(
    mut entry: AnalysisEntry,
    updates: &ConfidenceMap,
) -> Result<AnalysisEntry, UnknownSkills> {
    let unknown: Vec<String> = updates
        .keys()
        .filter(|skill| !entry.skill_confidence_map.contains_key(*skill))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(UnknownSkills(unknown));
    }

    for (skill, level) in updates {
        entry.skill_confidence_map.insert(skill.clone(), *level);
    }
    entry.final_score = calculate_final_score(entry.base_score, &entry.skill_confidence_map);
    Ok(entry)
}

pub struct AnalysisEngine {
    store: Arc<dyn HistoryStore>,
    id_scheme: IdScheme,
    /// Serializes read-modify-write cycles on the history record.
    write_lock: Mutex<()>,
}

impl AnalysisEngine {
    pub fn new(store: Arc<dyn HistoryStore>, id_scheme: IdScheme) -> Self {
        Self {
            store,
            id_scheme,
            write_lock: Mutex::new(()),
        }
    }

    /// Analyzes a job description and records the result at the head of history.
    pub async fn analyze(
        &self,
        jd_text: Option<&str>,
        company: Option<&str>,
        role: Option<&str>,
    ) -> Result<AnalysisEntry, StoreError> {
        let entry = self.build_entry(jd_text.unwrap_or_default(), company, role);

        let _guard = self.write_lock.lock().await;
        let mut history = self.load_for_write().await?;
        push_capped(&mut history, entry.clone());
        self.store.save(&encode_history(&history)?).await?;

        info!(
            "Analysis {} stored: type={:?}, base_score={}, final_score={}, skills={}",
            entry.id,
            entry.intel.company_type,
            entry.base_score,
            entry.final_score,
            entry.skill_confidence_map.len()
        );
        Ok(entry)
    }

    fn build_entry(&self, jd_text: &str, company: Option<&str>, role: Option<&str>) -> AnalysisEntry {
        let timestamp = now();
        let id = self.id_scheme.generate(timestamp);

        let extraction = extract_skills(jd_text);
        let metadata = AnalysisMetadata::new(company, role, jd_text);
        let intel = infer_company(&metadata.company);
        let round_mapping = generate_round_mapping(intel.company_type, &extraction.results);
        let base_score = calculate_base_score(&extraction, &metadata);
        let generated = generate_plan(&extraction.results);

        let skill_confidence_map = initial_confidence_map(&extraction.results);
        let final_score = calculate_final_score(base_score, &skill_confidence_map);

        let detected: Vec<&str> = SkillCategory::DETECTED
            .into_iter()
            .filter(|&category| extraction.results.has(category))
            .map(|category| category.as_str())
            .collect();
        debug!(
            "Extracted {} keyword matches for {id} (categories={detected:?}, jd_length={})",
            extraction.total_matches, metadata.jd_length
        );

        AnalysisEntry {
            id,
            created_at: timestamp,
            updated_at: timestamp,
            company: metadata.company,
            role: metadata.role,
            jd_text: jd_text.to_string(),
            extracted_skills: extraction.results,
            round_mapping,
            checklist: generated.checklist.into_groups(),
            plan_7_days: generated.plan,
            questions: generated.questions,
            base_score,
            final_score,
            skill_confidence_map,
            intel,
        }
    }

    /// Replaces the entry with the same id and stamps `updatedAt`.
    ///
    /// An unknown id is a silent no-op. The final score is stored as given.
    pub async fn update_entry(&self, mut entry: AnalysisEntry) -> Result<(), StoreError> {
        entry.updated_at = now();

        let _guard = self.write_lock.lock().await;
        let mut history = self.load_for_write().await?;
        let Some(slot) = history.iter_mut().find(|h| h.id == entry.id) else {
            debug!("Update for unknown analysis {} ignored", entry.id);
            return Ok(());
        };
        *slot = entry;
        self.store.save(&encode_history(&history)?).await
    }

    /// Merges confidence tags into a stored entry, recomputes its final score
    /// and saves it, all under the write lock.
    ///
    /// Returns `None` when no entry has the id.
    pub async fn update_confidence(
        &self,
        id: &str,
        updates: &ConfidenceMap,
    ) -> Result<Option<AnalysisEntry>, ConfidenceUpdateError> {
        let _guard = self.write_lock.lock().await;
        let mut history = self.load_for_write().await?;
        let Some(slot) = history.iter_mut().find(|h| h.id == id) else {
            return Ok(None);
        };

        let mut updated = apply_confidence(slot.clone(), updates)?;
        updated.updated_at = now();
        *slot = updated.clone();
        self.store.save(&encode_history(&history)?).await?;

        debug!(
            "Confidence updated for {id}: final_score={}",
            updated.final_score
        );
        Ok(Some(updated))
    }

    /// Newest-first history with malformed entries removed.
    pub async fn get_history(&self) -> Vec<AnalysisEntry> {
        self.read_history().await
    }

    pub async fn get_analysis(&self, id: &str) -> Option<AnalysisEntry> {
        self.read_history().await.into_iter().find(|h| h.id == id)
    }

    /// Strict load for read-modify-write paths. A store failure aborts the
    /// write instead of saving over history that could not be read.
    async fn load_for_write(&self) -> Result<Vec<AnalysisEntry>, StoreError> {
        let raw = self.store.load().await?;
        Ok(decode_history(raw.as_deref()))
    }

    async fn read_history(&self) -> Vec<AnalysisEntry> {
        match self.store.load().await {
            Ok(raw) => decode_history(raw.as_deref()),
            Err(e) => {
                warn!("Failed to read history from {} store: {e}", self.store.backend());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::analysis::company::CompanyType;
    use crate::analysis::scoring::ConfidenceLevel;
    use crate::analysis::skills::FALLBACK_SKILLS;
    use crate::history::test_support::sample_entry;
    use crate::history::{MemoryHistoryStore, HISTORY_CAP};

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(Arc::new(MemoryHistoryStore::new()), IdScheme::Timestamp)
    }

    struct BrokenStore;

    #[async_trait]
    impl HistoryStore for BrokenStore {
        async fn load(&self) -> Result<Option<String>, StoreError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        async fn save(&self, _raw: &str) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_java_sql_aws_google_scenario() {
        let engine = engine();
        let entry = engine
            .analyze(
                Some("Looking for a Java developer with SQL and AWS experience"),
                Some("Google"),
                Some("Backend Engineer"),
            )
            .await
            .unwrap();

        assert_eq!(entry.extracted_skills.languages, vec!["Java"]);
        assert_eq!(entry.extracted_skills.data, vec!["SQL"]);
        assert_eq!(entry.extracted_skills.cloud, vec!["AWS"]);
        assert_eq!(entry.intel.company_type, CompanyType::Enterprise);
        assert_eq!(entry.round_mapping.len(), 4);
        assert_eq!(entry.base_score, 70);
        assert_eq!(entry.final_score, 64);
        assert_eq!(entry.questions.len(), 10);
        assert_eq!(entry.checklist.len(), 4);
        assert_eq!(entry.plan_7_days.len(), 5);
        assert!(entry.id.starts_with("analysis_"));
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[tokio::test]
    async fn test_empty_input_degrades_gracefully() {
        let engine = engine();
        let entry = engine.analyze(None, None, None).await.unwrap();

        assert_eq!(entry.jd_text, "");
        assert_eq!(entry.company, "");
        assert_eq!(entry.intel.company_type, CompanyType::Startup);
        assert_eq!(entry.round_mapping.len(), 3);
        assert_eq!(entry.extracted_skills.other, FALLBACK_SKILLS.to_vec());
        assert_eq!(entry.base_score, 35);
        // the four filler skills start as "practice"
        assert_eq!(entry.final_score, 27);
        assert_eq!(entry.questions.len(), 10);
    }

    #[tokio::test]
    async fn test_company_and_role_are_trimmed() {
        let entry = engine()
            .analyze(Some("React"), Some("  Acme  "), Some(" SDE "))
            .await
            .unwrap();
        assert_eq!(entry.company, "Acme");
        assert_eq!(entry.role, "SDE");
        assert_eq!(entry.intel.company_type, CompanyType::StartupMidSize);
    }

    #[tokio::test]
    async fn test_analyze_always_persists() {
        let engine = engine();
        let first = engine.analyze(Some("SQL"), None, None).await.unwrap();
        let history = engine.get_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], first);
        assert_eq!(engine.get_analysis(&first.id).await, Some(first));
    }

    #[tokio::test]
    async fn test_history_capped_at_twenty_newest_first() {
        let engine = engine();
        for i in 0..25 {
            engine
                .analyze(Some(&format!("jd {i}")), None, None)
                .await
                .unwrap();
        }
        let history = engine.get_history().await;
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history[0].jd_text, "jd 24");
        assert_eq!(history[HISTORY_CAP - 1].jd_text, "jd 5");
    }

    #[tokio::test]
    async fn test_update_then_get_round_trip() {
        let engine = engine();
        let mut entry = engine.analyze(Some("Java and SQL"), None, None).await.unwrap();
        entry
            .skill_confidence_map
            .insert("Java".to_string(), ConfidenceLevel::Know);

        tokio::time::sleep(Duration::from_millis(5)).await;
        engine.update_entry(entry.clone()).await.unwrap();

        let stored = engine.get_analysis(&entry.id).await.unwrap();
        assert!(stored.updated_at > entry.updated_at);
        assert_eq!(stored.created_at, entry.created_at);

        entry.updated_at = stored.updated_at;
        assert_eq!(stored, entry);
    }

    #[tokio::test]
    async fn test_update_does_not_recompute_final_score() {
        let engine = engine();
        let mut entry = engine.analyze(Some("Java"), None, None).await.unwrap();
        let final_before = entry.final_score;
        entry
            .skill_confidence_map
            .insert("Java".to_string(), ConfidenceLevel::Know);
        engine.update_entry(entry.clone()).await.unwrap();

        let stored = engine.get_analysis(&entry.id).await.unwrap();
        assert_eq!(stored.final_score, final_before);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let engine = engine();
        let entry = engine.analyze(Some("Java"), None, None).await.unwrap();

        let mut stranger = entry.clone();
        stranger.id = "analysis_0".to_string();
        stranger.company = "Changed".to_string();
        engine.update_entry(stranger).await.unwrap();

        let history = engine.get_history().await;
        assert_eq!(history, vec![entry]);
    }

    #[tokio::test]
    async fn test_get_analysis_unknown_is_none() {
        assert!(engine().get_analysis("analysis_missing").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_store_reads_as_empty_and_is_overwritten() {
        let engine = AnalysisEngine::new(
            Arc::new(MemoryHistoryStore::with_raw("not json at all")),
            IdScheme::Timestamp,
        );
        assert!(engine.get_history().await.is_empty());

        engine.analyze(Some("Docker"), None, None).await.unwrap();
        assert_eq!(engine.get_history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_store_fails_soft_on_read_but_errors_on_write() {
        let engine = AnalysisEngine::new(Arc::new(BrokenStore), IdScheme::Timestamp);
        assert!(engine.get_history().await.is_empty());
        assert!(engine.get_analysis("analysis_1").await.is_none());
        assert!(engine.analyze(Some("Java"), None, None).await.is_err());
    }

    #[tokio::test]
    async fn test_uuid_scheme_gives_distinct_ids() {
        let engine = AnalysisEngine::new(Arc::new(MemoryHistoryStore::new()), IdScheme::Uuid);
        let a = engine.analyze(Some("Java"), None, None).await.unwrap();
        let b = engine.analyze(Some("Java"), None, None).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("analysis_"));
    }

    #[test]
    fn test_timestamp_ids_use_epoch_millis() {
        let at = DateTime::parse_from_rfc3339("2024-01-01T00:00:00.123Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(IdScheme::Timestamp.generate(at), "analysis_1704067200123");
    }

    #[test]
    fn test_id_scheme_from_str() {
        assert_eq!("uuid".parse::<IdScheme>(), Ok(IdScheme::Uuid));
        assert_eq!(" Timestamp ".parse::<IdScheme>(), Ok(IdScheme::Timestamp));
        assert!("snowflake".parse::<IdScheme>().is_err());
    }

    #[tokio::test]
    async fn test_apply_confidence_recomputes_final_score() {
        let entry = engine()
            .analyze(
                Some("Looking for a Java developer with SQL and AWS experience"),
                Some("Google"),
                Some("Backend Engineer"),
            )
            .await
            .unwrap();

        let updates: ConfidenceMap = [
            ("Java".to_string(), ConfidenceLevel::Know),
            ("SQL".to_string(), ConfidenceLevel::Know),
        ]
        .into_iter()
        .collect();
        let updated = apply_confidence(entry, &updates).unwrap();
        // 70 + 2 + 2 - 2
        assert_eq!(updated.final_score, 72);
        assert_eq!(updated.skill_confidence_map["AWS"], ConfidenceLevel::Practice);
    }

    #[tokio::test]
    async fn test_apply_confidence_rejects_unknown_skill() {
        let entry = engine().analyze(Some("Java"), None, None).await.unwrap();
        let updates: ConfidenceMap = [("Rust".to_string(), ConfidenceLevel::Know)]
            .into_iter()
            .collect();
        let err = apply_confidence(entry, &updates).unwrap_err();
        assert_eq!(err, UnknownSkills(vec!["Rust".to_string()]));
    }

    /// Wraps the memory store; the next `load` fails once when armed.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryHistoryStore,
        fail_next_load: AtomicBool,
    }

    #[async_trait]
    impl HistoryStore for FlakyStore {
        async fn load(&self) -> Result<Option<String>, StoreError> {
            if self.fail_next_load.swap(false, Ordering::SeqCst) {
                return Err(std::io::Error::other("connection reset").into());
            }
            self.inner.load().await
        }

        async fn save(&self, raw: &str) -> Result<(), StoreError> {
            self.inner.save(raw).await
        }

        fn backend(&self) -> &'static str {
            "flaky"
        }
    }

    /// Memory store with a slow `load`, so overlapping requests interleave.
    #[derive(Default)]
    struct SlowStore {
        inner: MemoryHistoryStore,
    }

    #[async_trait]
    impl HistoryStore for SlowStore {
        async fn load(&self) -> Result<Option<String>, StoreError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.inner.load().await
        }

        async fn save(&self, raw: &str) -> Result<(), StoreError> {
            self.inner.save(raw).await
        }

        fn backend(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_load_error_aborts_analyze_without_overwriting_history() {
        let store = Arc::new(FlakyStore::default());
        let engine = AnalysisEngine::new(store.clone(), IdScheme::Uuid);
        for i in 0..5 {
            engine
                .analyze(Some(&format!("jd {i}")), None, None)
                .await
                .unwrap();
        }

        store.fail_next_load.store(true, Ordering::SeqCst);
        let result = engine.analyze(Some("SQL"), None, None).await;
        assert!(matches!(result, Err(StoreError::Io(_))));

        let history = engine.get_history().await;
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].jd_text, "jd 4");
    }

    #[tokio::test]
    async fn test_load_error_aborts_update_entry() {
        let store = Arc::new(FlakyStore::default());
        let engine = AnalysisEngine::new(store.clone(), IdScheme::Uuid);
        let first = engine.analyze(Some("Java"), None, None).await.unwrap();
        let second = engine.analyze(Some("SQL"), None, None).await.unwrap();

        let mut changed = first.clone();
        changed.role = "Changed".to_string();
        store.fail_next_load.store(true, Ordering::SeqCst);
        assert!(engine.update_entry(changed).await.is_err());

        assert_eq!(engine.get_history().await, vec![second, first]);
    }

    #[tokio::test]
    async fn test_load_error_aborts_update_confidence() {
        let store = Arc::new(FlakyStore::default());
        let engine = AnalysisEngine::new(store.clone(), IdScheme::Uuid);
        let entry = engine.analyze(Some("Java"), None, None).await.unwrap();

        store.fail_next_load.store(true, Ordering::SeqCst);
        let updates: ConfidenceMap = [("Java".to_string(), ConfidenceLevel::Know)]
            .into_iter()
            .collect();
        let result = engine.update_confidence(&entry.id, &updates).await;
        assert!(matches!(result, Err(ConfidenceUpdateError::Store(_))));
        assert_eq!(engine.get_history().await, vec![entry]);
    }

    #[tokio::test]
    async fn test_concurrent_confidence_updates_both_persist() {
        let engine = AnalysisEngine::new(Arc::new(SlowStore::default()), IdScheme::Uuid);
        let entry = engine
            .analyze(Some("Java developer with SQL"), None, None)
            .await
            .unwrap();

        let java: ConfidenceMap = [("Java".to_string(), ConfidenceLevel::Know)]
            .into_iter()
            .collect();
        let sql: ConfidenceMap = [("SQL".to_string(), ConfidenceLevel::Know)]
            .into_iter()
            .collect();

        let (a, b) = tokio::join!(
            engine.update_confidence(&entry.id, &java),
            engine.update_confidence(&entry.id, &sql)
        );
        assert!(a.unwrap().is_some());
        assert!(b.unwrap().is_some());

        let stored = engine.get_analysis(&entry.id).await.unwrap();
        assert_eq!(stored.skill_confidence_map["Java"], ConfidenceLevel::Know);
        assert_eq!(stored.skill_confidence_map["SQL"], ConfidenceLevel::Know);
        // base 45, two skills known
        assert_eq!(stored.final_score, 49);
    }

    #[tokio::test]
    async fn test_update_confidence_unknown_id_and_skill() {
        let engine = engine();
        let entry = engine.analyze(Some("Java"), None, None).await.unwrap();

        let known: ConfidenceMap = [("Java".to_string(), ConfidenceLevel::Know)]
            .into_iter()
            .collect();
        assert!(engine
            .update_confidence("analysis_missing", &known)
            .await
            .unwrap()
            .is_none());

        let unknown: ConfidenceMap = [("Rust".to_string(), ConfidenceLevel::Know)]
            .into_iter()
            .collect();
        let err = engine.update_confidence(&entry.id, &unknown).await.unwrap_err();
        assert!(matches!(
            err,
            ConfidenceUpdateError::UnknownSkills(ref skills) if skills == &vec!["Rust".to_string()]
        ));
        assert_eq!(engine.get_history().await, vec![entry]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_resolve_to_newest_entry() {
        let mut newer = sample_entry("analysis_1700000000000");
        newer.jd_text = "newer".to_string();
        let mut older = sample_entry("analysis_1700000000000");
        older.jd_text = "older".to_string();
        let raw = encode_history(&[newer.clone(), older.clone()]).unwrap();

        let engine = AnalysisEngine::new(
            Arc::new(MemoryHistoryStore::with_raw(raw)),
            IdScheme::Timestamp,
        );
        assert_eq!(
            engine.get_analysis("analysis_1700000000000").await.unwrap().jd_text,
            "newer"
        );

        let mut changed = newer.clone();
        changed.role = "Updated".to_string();
        engine.update_entry(changed).await.unwrap();

        let history = engine.get_history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "Updated");
        assert_eq!(history[1], older);
    }
}
