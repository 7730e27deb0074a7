//! Preparation content — round checklist, 7-day plan and interview questions,
//! derived only from which skill categories were detected.

use serde::{Deserialize, Serialize};

use crate::analysis::skills::{SkillCategory, SkillExtraction};

pub const QUESTION_COUNT: usize = 10;

/// Checklist titles, one per interview round, in display order.
pub const CHECKLIST_TITLES: [&str; 4] = [
    "Round 1: Screening & Aptitude",
    "Round 2: Data Structures & Core CS",
    "Round 3: Specialized Tech & Projects",
    "Round 4: Behavioral & HR",
];

/// A titled group of checklist tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistGroup {
    pub round_title: String,
    pub items: Vec<String>,
}

/// One block of the 7-day plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBlock {
    pub day: String,
    pub focus: String,
    pub tasks: Vec<String>,
}

/// Per-round checklist items before they are titled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundChecklist {
    pub round1: Vec<String>,
    pub round2: Vec<String>,
    pub round3: Vec<String>,
    pub round4: Vec<String>,
}

impl RoundChecklist {
    /// Converts into the ordered, titled group form stored on an entry.
    pub fn into_groups(self) -> Vec<ChecklistGroup> {
        [self.round1, self.round2, self.round3, self.round4]
            .into_iter()
            .zip(CHECKLIST_TITLES)
            .map(|(items, title)| ChecklistGroup {
                round_title: title.to_string(),
                items,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPlan {
    pub checklist: RoundChecklist,
    pub plan: Vec<DayBlock>,
    pub questions: Vec<String>,
}

const BASELINE_QUESTIONS: &[&str] = &[
    "Tell me about your most challenging project.",
    "Explain the concept of Polymorphism with a real-world example.",
    "What happens when you type a URL in the browser?",
];

/// Backfill pool. Long enough that baseline plus pool alone reaches the target.
const GENERIC_QUESTIONS: &[&str] = &[
    "Where do you see yourself in 5 years?",
    "Describe a time you demonstrated leadership.",
    "How do you handle tight deadlines?",
    "What is your preferred programming language and why?",
    "Tell me about a time you failed and what you learned from it.",
    "How do you keep your technical skills up to date?",
    "Why should we hire you?",
];

/// Category-gated questions, appended in this order.
const CATEGORY_QUESTIONS: &[(SkillCategory, &[&str])] = &[
    (
        SkillCategory::Data,
        &[
            "Explain Indexing in SQL and when it helps.",
            "SQL vs NoSQL: When to choose which?",
        ],
    ),
    (
        SkillCategory::Web,
        &[
            "Explain the Virtual DOM in React.",
            "What is the difference between specific CSS selectors?",
        ],
    ),
    (
        SkillCategory::Cloud,
        &["What is the difference between Docker and a tailored VM?"],
    ),
    (
        SkillCategory::CoreCs,
        &[
            "Explain Process vs Thread.",
            "How does Garbage Collection work?",
        ],
    ),
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn day(day: &str, focus: &str, tasks: &[&str]) -> DayBlock {
    DayBlock {
        day: day.to_string(),
        focus: focus.to_string(),
        tasks: strings(tasks),
    }
}

fn build_checklist(skills: &SkillExtraction) -> RoundChecklist {
    let mut checklist = RoundChecklist {
        round1: strings(&[
            "Quantitative Aptitude (Speed/Distance, Work/Time)",
            "Logical Reasoning (Puzzles, Blood Relations)",
            "Verbal Ability (Reading Comprehension)",
            "Resume Walkthrough Preparation",
            "Basic behavioral questions (Tell me about yourself)",
        ]),
        round2: strings(&[
            "Data Structures: Arrays, Strings, Linked Lists",
            "Algorithms: Sorting, Searching, Two Pointers",
            "OOP Concepts: Pillars, Interface vs Abstract",
        ]),
        round3: strings(&["Deep dive into Projects listed on Resume"]),
        round4: strings(&[
            "Salary Expectation Negotiation",
            "Why this company?",
            "Strengths and Weaknesses",
            "Handling conflict situations",
        ]),
    };

    if skills.has(SkillCategory::Data) {
        checklist
            .round2
            .push("DBMS: Normalization, ACID properties, Indexing".to_string());
    }
    if skills.has(SkillCategory::Web) {
        checklist
            .round3
            .push("Web: Event Loop, DOM, State Management patterns".to_string());
    }
    if skills.languages.iter().any(|lang| lang == "Java") {
        checklist
            .round3
            .push("Java: Collections Framework, Multithreading".to_string());
    }

    checklist
}

fn build_week_plan(skills: &SkillExtraction) -> Vec<DayBlock> {
    let mut plan = vec![
        day(
            "Day 1-2",
            "Foundation & Aptitude",
            &["Practice 30 Aptitude Qs", "Revise Core CS Theory (OS/DBMS)"],
        ),
        day(
            "Day 3-4",
            "Problem Solving",
            &[
                "Solve 10 LeetCode Easy/Medium",
                "Implement Standard Algos (Merge Sort, BFS/DFS)",
            ],
        ),
        day(
            "Day 5",
            "Tech Stack & Projects",
            &["Review Project Architecture", "Prepare 'Challenges Faced' stories"],
        ),
        day(
            "Day 6",
            "Mock Interviews",
            &["Peer Mock Interview", "Record yourself answering HR Qs"],
        ),
        day(
            "Day 7",
            "Final Revision",
            &["Cheatsheets review", "Rest & Mindset"],
        ),
    ];

    if skills.has(SkillCategory::Web) {
        plan[2]
            .tasks
            .push("Build a mini-feature using React/Node to refresh memory".to_string());
    }

    plan
}

fn build_questions(skills: &SkillExtraction) -> Vec<String> {
    let mut questions = strings(BASELINE_QUESTIONS);

    for (category, extra) in CATEGORY_QUESTIONS {
        if skills.has(*category) {
            questions.extend(extra.iter().map(|q| q.to_string()));
        }
    }

    let missing = QUESTION_COUNT.saturating_sub(questions.len());
    questions.extend(GENERIC_QUESTIONS.iter().take(missing).map(|q| q.to_string()));
    questions.truncate(QUESTION_COUNT);
    questions
}

/// Fills empty question slots from the generic pool, skipping questions
/// already in the list. Slots left over once the pool runs dry are dropped.
pub fn backfill_questions(slots: Vec<Option<String>>) -> Vec<String> {
    let present: Vec<String> = slots.iter().flatten().cloned().collect();
    let mut pool = GENERIC_QUESTIONS
        .iter()
        .filter(|q| !present.iter().any(|p| p == *q));

    slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| pool.next().map(|q| q.to_string())))
        .collect()
}

/// Generates checklist, plan and questions for a set of extracted skills.
pub fn generate_plan(skills: &SkillExtraction) -> GeneratedPlan {
    GeneratedPlan {
        checklist: build_checklist(skills),
        plan: build_week_plan(skills),
        questions: build_questions(skills),
    }
}
