//! Skill Extractor — case-insensitive whole-word keyword matching against fixed
//! category dictionaries.
//!
//! Word boundaries follow ASCII word characters (`[A-Za-z0-9_]`). A keyword that
//! ends in punctuation (`C++`, `C#`) therefore only matches when a word character
//! follows it, the same rule a browser `\b` applies.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Closed set of skill buckets. Only the first six carry dictionaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "coreCS")]
    CoreCs,
    #[serde(rename = "languages")]
    Languages,
    #[serde(rename = "web")]
    Web,
    #[serde(rename = "data")]
    Data,
    #[serde(rename = "cloud")]
    Cloud,
    #[serde(rename = "testing")]
    Testing,
    #[serde(rename = "other")]
    Other,
}

impl SkillCategory {
    /// Categories with a keyword dictionary, in scoring and extraction order.
    pub const DETECTED: [SkillCategory; 6] = [
        SkillCategory::CoreCs,
        SkillCategory::Languages,
        SkillCategory::Web,
        SkillCategory::Data,
        SkillCategory::Cloud,
        SkillCategory::Testing,
    ];

    pub const ALL: [SkillCategory; 7] = [
        SkillCategory::CoreCs,
        SkillCategory::Languages,
        SkillCategory::Web,
        SkillCategory::Data,
        SkillCategory::Cloud,
        SkillCategory::Testing,
        SkillCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::CoreCs => "coreCS",
            SkillCategory::Languages => "languages",
            SkillCategory::Web => "web",
            SkillCategory::Data => "data",
            SkillCategory::Cloud => "cloud",
            SkillCategory::Testing => "testing",
            SkillCategory::Other => "other",
        }
    }

    /// Keyword dictionary in declared order. `Other` has none.
    pub fn dictionary(&self) -> &'static [&'static str] {
        match self {
            SkillCategory::CoreCs => CORE_CS_KEYWORDS,
            SkillCategory::Languages => LANGUAGE_KEYWORDS,
            SkillCategory::Web => WEB_KEYWORDS,
            SkillCategory::Data => DATA_KEYWORDS,
            SkillCategory::Cloud => CLOUD_KEYWORDS,
            SkillCategory::Testing => TESTING_KEYWORDS,
            SkillCategory::Other => &[],
        }
    }
}

const CORE_CS_KEYWORDS: &[&str] = &[
    "DSA",
    "Data Structures",
    "Algorithms",
    "OOP",
    "Object Oriented",
    "DBMS",
    "Database Management",
    "OS",
    "Operating Systems",
    "Networks",
    "Computer Networks",
    "System Design",
];

const LANGUAGE_KEYWORDS: &[&str] = &[
    "Java",
    "Python",
    "JavaScript",
    "TypeScript",
    "C++",
    "C#",
    "Golang",
    "Go",
    "Ruby",
    "Swift",
    "Kotlin",
    "PHP",
];

const WEB_KEYWORDS: &[&str] = &[
    "React", "Next.js", "NextJS", "Node.js", "NodeJS", "Express", "Vue", "Angular", "HTML", "CSS",
    "REST", "GraphQL", "API",
];

const DATA_KEYWORDS: &[&str] = &[
    "SQL",
    "MySQL",
    "PostgreSQL",
    "Postgres",
    "MongoDB",
    "NoSQL",
    "Redis",
    "ElasticSearch",
    "Kafka",
    "Spark",
    "Hadoop",
];

const CLOUD_KEYWORDS: &[&str] = &[
    "AWS",
    "Amazon Web Services",
    "Azure",
    "GCP",
    "Google Cloud",
    "Docker",
    "Kubernetes",
    "K8s",
    "CI/CD",
    "Jenkins",
    "Terraform",
    "Linux",
    "Bash",
];

const TESTING_KEYWORDS: &[&str] = &[
    "Selenium",
    "Cypress",
    "Playwright",
    "Jest",
    "Mocha",
    "JUnit",
    "PyTest",
    "Manual Testing",
    "Automation",
];

/// Written into `other` when nothing at all was detected.
pub const FALLBACK_SKILLS: [&str; 4] = ["Communication", "Problem solving", "Basic coding", "Projects"];

/// Per-category keyword lists. Every category is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillExtraction {
    #[serde(rename = "coreCS", default)]
    pub core_cs: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub web: Vec<String>,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub cloud: Vec<String>,
    #[serde(default)]
    pub testing: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

impl SkillExtraction {
    pub fn get(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::CoreCs => &self.core_cs,
            SkillCategory::Languages => &self.languages,
            SkillCategory::Web => &self.web,
            SkillCategory::Data => &self.data,
            SkillCategory::Cloud => &self.cloud,
            SkillCategory::Testing => &self.testing,
            SkillCategory::Other => &self.other,
        }
    }

    fn slot_mut(&mut self, category: SkillCategory) -> &mut Vec<String> {
        match category {
            SkillCategory::CoreCs => &mut self.core_cs,
            SkillCategory::Languages => &mut self.languages,
            SkillCategory::Web => &mut self.web,
            SkillCategory::Data => &mut self.data,
            SkillCategory::Cloud => &mut self.cloud,
            SkillCategory::Testing => &mut self.testing,
            SkillCategory::Other => &mut self.other,
        }
    }

    pub fn has(&self, category: SkillCategory) -> bool {
        !self.get(category).is_empty()
    }

    /// All skills flattened in category order. Duplicates are kept.
    pub fn all_skills(&self) -> impl Iterator<Item = &String> {
        SkillCategory::ALL
            .into_iter()
            .flat_map(move |category| self.get(category).iter())
    }
}

/// Result of a single extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub results: SkillExtraction,
    pub total_matches: usize,
}

struct KeywordMatcher {
    keyword: &'static str,
    pattern: Regex,
}

static MATCHERS: LazyLock<Vec<(SkillCategory, Vec<KeywordMatcher>)>> = LazyLock::new(|| {
    SkillCategory::DETECTED
        .into_iter()
        .map(|category| {
            let matchers = category
                .dictionary()
                .iter()
                .map(|&keyword| KeywordMatcher {
                    keyword,
                    pattern: RegexBuilder::new(&boundary_pattern(keyword))
                        .case_insensitive(true)
                        .build()
                        .expect("keyword pattern"),
                })
                .collect();
            (category, matchers)
        })
        .collect()
});

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Builds a whole-word pattern for a literal keyword.
///
/// A boundary sits between a word and a non-word character, so the neighbour
/// required on each side depends on whether the keyword's edge is itself a word
/// character.
fn boundary_pattern(keyword: &str) -> String {
    const WORD: &str = "[A-Za-z0-9_]";
    const NON_WORD_OR_EDGE_START: &str = "(?:^|[^A-Za-z0-9_])";
    const NON_WORD_OR_EDGE_END: &str = "(?:[^A-Za-z0-9_]|$)";

    let starts_with_word = keyword.chars().next().is_some_and(is_word_char);
    let ends_with_word = keyword.chars().last().is_some_and(is_word_char);

    let left = if starts_with_word { NON_WORD_OR_EDGE_START } else { WORD };
    let right = if ends_with_word { NON_WORD_OR_EDGE_END } else { WORD };

    format!("{left}{}{right}", regex::escape(keyword))
}

/// Extracts dictionary keywords from a job description.
pub fn extract_skills(text: &str) -> Extraction {
    let mut results = SkillExtraction::default();
    let mut total_matches = 0;

    if !text.is_empty() {
        let lower = text.to_lowercase();
        for (category, matchers) in MATCHERS.iter() {
            let matched: Vec<String> = matchers
                .iter()
                .filter(|m| m.pattern.is_match(&lower))
                .map(|m| m.keyword.to_string())
                .collect();
            total_matches += matched.len();
            *results.slot_mut(*category) = matched;
        }
    }

    if total_matches == 0 {
        results.other = FALLBACK_SKILLS.iter().map(|s| s.to_string()).collect();
    }

    Extraction {
        results,
        total_matches,
    }
}
