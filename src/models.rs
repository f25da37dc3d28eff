// data models for the study planner api

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

// anything we don't recognise plans like Medium
impl From<String> for Difficulty {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Easy" => Difficulty::Easy,
            "Hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Learning,
    Practice,
    Revision,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub subject_name: String,
    pub syllabus: String,
    pub exam_date: String,
    pub hours_per_day: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub phase: Phase,
    pub topics: Vec<String>,
    pub focus: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan: Vec<DayPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub file_name: String,
    pub file_url: String,
    #[serde(default)]
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub exam_date: NaiveDate,
    #[serde(default)]
    pub syllabus: String,
    pub materials: Vec<Material>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    pub exam_date: String,
    #[serde(default)]
    pub syllabus: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaterial {
    pub file_name: String,
    pub file_url: String,
    #[serde(default)]
    pub file_type: String,
}

#[derive(Debug, Serialize)]
pub struct SubjectCreated {
    pub message: &'static str,
    pub subject: Subject,
}

// uploadthing switched from fileUrl to ufsUrl, accept both
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub ufs_url: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl SummarizeRequest {
    pub fn source_url(&self) -> Option<&str> {
        [self.file_url.as_deref(), self.ufs_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}
