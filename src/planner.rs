// study plan generator: topic parsing, phase allocation, day-by-day schedule

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::models::{DayPlan, Difficulty, Phase, PlanRequest};

const GENERIC_UNITS: [&str; 8] = [
    "Core Concepts & Definitions",
    "Fundamental Theories",
    "Key Formulas & Derivations",
    "Advanced Applications",
    "Case Studies & Examples",
    "Problem Solving Techniques",
    "Critical Analysis",
    "Modern Developments",
];

const FOCUS_VERBS: [&str; 5] = [
    "Master",
    "Understand",
    "Deep dive into",
    "Explore",
    "Deconstruct",
];

const FILLER_TOPICS: [&str; 2] = [
    "Consolidation of previous topics",
    "Buffer day for weak areas",
];

const PRACTICE_TOPICS: [&str; 3] = ["Practice Problems", "Case Studies", "Application Questions"];
const HARD_PRACTICE_TOPIC: &str = "Advanced Drills";
const REVISION_TOPICS: [&str; 3] = [
    "Full Syllabus Review",
    "Mock Test / Past Papers",
    "Key Formulas List",
];

const HARD_PRACTICE_FOCUS: &str = "Intensive problem-solving and speed drills.";
const PRACTICE_FOCUS: &str = "Apply concepts to practical examples and standard problems.";
const FINAL_DAY_FOCUS: &str = "Light review and mental preparation. Relax before the exam.";
const REVISION_FOCUS: &str = "Simulate exam conditions and identify remaining gaps.";

const LONG_DAY_ADVICE: &str = " (Take a 10m break every hour!)";
const SHORT_DAY_ADVICE: &str = " (High-intensity focus required)";

const MIN_FALLBACK_TOPICS: usize = 5;
const MIN_TOPIC_CHARS: usize = 3;
const PANIC_MODE_DAYS: u32 = 3;
const MAX_PLAN_DAYS: u32 = 3650;

static TOPIC_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\n|\r|\t|•|- ").expect("topic separator regex is valid"));

static ENUMERATION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").expect("enumeration prefix regex is valid"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("subjectName must not be empty")]
    MissingSubject,
    #[error("examDate '{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidExamDate(String),
    #[error("examDate {0} is in the past")]
    ExamDateInPast(NaiveDate),
    #[error("hoursPerDay must be a finite number")]
    InvalidHours,
    #[error("examDate is {0} days away, plans cover at most 3650 days")]
    HorizonTooLong(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseAllocation {
    pub learning: u32,
    pub practice: u32,
    pub revision: u32,
}

impl PhaseAllocation {
    pub fn for_days(days_left: u32, difficulty: Difficulty) -> Self {
        // panic mode: not enough time to learn anything new
        if days_left < PANIC_MODE_DAYS {
            return PhaseAllocation {
                learning: 0,
                practice: 0,
                revision: days_left,
            };
        }

        let (learning_pct, practice_pct) = match difficulty {
            Difficulty::Hard => (50, 30),
            Difficulty::Easy => (70, 15),
            Difficulty::Medium => (60, 20),
        };
        let learning = (days_left * learning_pct / 100).max(1);
        let practice = days_left * practice_pct / 100;
        let revision = days_left.saturating_sub(learning + practice).max(1);

        // after clamping, practice gives way so the pools still add up
        let practice = days_left.saturating_sub(learning + revision);
        let revision = days_left - learning - practice;

        PhaseAllocation {
            learning,
            practice,
            revision,
        }
    }

    pub fn total(&self) -> u32 {
        self.learning + self.practice + self.revision
    }

    pub fn phase_for_day(&self, day: u32) -> Phase {
        if day <= self.learning {
            Phase::Learning
        } else if day <= self.learning + self.practice {
            Phase::Practice
        } else {
            Phase::Revision
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudyPlan {
    pub days_left: u32,
    pub allocation: PhaseAllocation,
    pub days: Vec<DayPlan>,
}

pub fn parse_exam_date(raw: &str) -> Result<NaiveDate, PlanError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        .map_err(|_| PlanError::InvalidExamDate(raw.to_string()))
}

// an exam later today still gets one day of revision
pub fn days_until_exam(exam: NaiveDate, today: NaiveDate) -> Result<u32, PlanError> {
    let days = (exam - today).num_days();
    if days < 0 {
        return Err(PlanError::ExamDateInPast(exam));
    }
    match u32::try_from(days) {
        Ok(days) if days <= MAX_PLAN_DAYS => Ok(days.max(1)),
        _ => Err(PlanError::HorizonTooLong(days)),
    }
}

pub fn extract_topics(syllabus: &str) -> Vec<String> {
    TOPIC_SEPARATOR
        .split(syllabus)
        .map(|fragment| ENUMERATION_PREFIX.replace(fragment.trim(), "").into_owned())
        .filter(|topic| topic.chars().count() > MIN_TOPIC_CHARS)
        .collect()
}

pub fn fallback_topics(subject_name: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match GENERIC_UNITS.get(i) {
            Some(unit) => unit.to_string(),
            None => format!("Unit {}: {} Basics", i + 1, subject_name),
        })
        .collect()
}

fn intensity_advice(hours_per_day: f64) -> &'static str {
    if hours_per_day > 6.0 {
        LONG_DAY_ADVICE
    } else if hours_per_day < 2.0 {
        SHORT_DAY_ADVICE
    } else {
        ""
    }
}

fn to_owned_topics(topics: &[&str]) -> Vec<String> {
    topics.iter().map(|topic| topic.to_string()).collect()
}

pub fn generate_plan(request: &PlanRequest, today: NaiveDate) -> Result<StudyPlan, PlanError> {
    let subject_name = request.subject_name.trim();
    if subject_name.is_empty() {
        return Err(PlanError::MissingSubject);
    }
    if !request.hours_per_day.is_finite() {
        return Err(PlanError::InvalidHours);
    }

    let exam_date = parse_exam_date(&request.exam_date)?;
    let days_left = days_until_exam(exam_date, today)?;

    let mut topics = extract_topics(&request.syllabus);
    if topics.is_empty() {
        let count = (days_left as usize).max(MIN_FALLBACK_TOPICS);
        topics = fallback_topics(subject_name, count);
    }

    let allocation = PhaseAllocation::for_days(days_left, request.difficulty);
    let topics_per_day = topics.len().div_ceil(allocation.learning.max(1) as usize);
    let advice = intensity_advice(request.hours_per_day);

    let mut remaining = topics.as_slice();
    let mut days = Vec::with_capacity(days_left as usize);

    for day in 1..=days_left {
        let phase = allocation.phase_for_day(day);
        let (daily_topics, focus) = match phase {
            Phase::Learning => {
                let take = topics_per_day.min(remaining.len());
                let (today_topics, rest) = remaining.split_at(take);
                remaining = rest;

                let daily_topics = if today_topics.is_empty() {
                    to_owned_topics(&FILLER_TOPICS)
                } else {
                    today_topics.to_vec()
                };
                let verb = FOCUS_VERBS[day as usize % FOCUS_VERBS.len()];
                let lead = daily_topics.first().map_or(subject_name, String::as_str);
                let focus = format!("{} the core concepts of {}.", verb, lead);
                (daily_topics, focus)
            }
            Phase::Practice => {
                let mut daily_topics = to_owned_topics(&PRACTICE_TOPICS);
                let focus = if request.difficulty == Difficulty::Hard {
                    daily_topics.push(HARD_PRACTICE_TOPIC.to_string());
                    HARD_PRACTICE_FOCUS
                } else {
                    PRACTICE_FOCUS
                };
                (daily_topics, focus.to_string())
            }
            Phase::Revision => {
                let focus = if day == days_left {
                    FINAL_DAY_FOCUS
                } else {
                    REVISION_FOCUS
                };
                (to_owned_topics(&REVISION_TOPICS), focus.to_string())
            }
        };

        days.push(DayPlan {
            day,
            phase,
            topics: daily_topics,
            focus: format!("{}{}", focus, advice),
        });
    }
    debug_assert_eq!(allocation.total(), days_left);

    Ok(StudyPlan {
        days_left,
        allocation,
        days,
    })
}
