// in-memory subject registry

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Material, NewMaterial, NewSubject, Subject};
use crate::planner::parse_exam_date;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("name must not be empty")]
    MissingName,
    #[error("examDate '{0}' is not a valid date")]
    InvalidExamDate(String),
    #[error("fileName and fileUrl are required")]
    IncompleteMaterial,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectStore {
    subjects: Arc<RwLock<HashMap<String, Subject>>>,
}

impl SubjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    // soonest exam first
    pub async fn list(&self) -> Vec<Subject> {
        let mut subjects: Vec<Subject> = self.subjects.read().await.values().cloned().collect();
        subjects.sort_by(|a, b| {
            a.exam_date
                .cmp(&b.exam_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        subjects
    }

    pub async fn create(&self, new_subject: NewSubject) -> Result<Subject, StoreError> {
        let name = new_subject.name.trim();
        if name.is_empty() {
            return Err(StoreError::MissingName);
        }
        let exam_date = parse_exam_date(&new_subject.exam_date)
            .map_err(|_| StoreError::InvalidExamDate(new_subject.exam_date.clone()))?;

        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            exam_date,
            syllabus: new_subject.syllabus,
            materials: Vec::new(),
            created_at: Utc::now(),
        };

        self.subjects
            .write()
            .await
            .insert(subject.id.clone(), subject.clone());
        Ok(subject)
    }

    pub async fn get(&self, id: &str) -> Option<Subject> {
        self.subjects.read().await.get(id).cloned()
    }

    pub async fn add_material(
        &self,
        id: &str,
        material: NewMaterial,
    ) -> Result<Option<Subject>, StoreError> {
        if material.file_name.trim().is_empty() || material.file_url.trim().is_empty() {
            return Err(StoreError::IncompleteMaterial);
        }

        let mut subjects = self.subjects.write().await;
        let Some(subject) = subjects.get_mut(id) else {
            return Ok(None);
        };
        subject.materials.push(Material {
            file_name: material.file_name,
            file_url: material.file_url,
            file_type: material.file_type,
            uploaded_at: Utc::now(),
        });
        Ok(Some(subject.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio_test::assert_ok;

    fn new_subject(name: &str, exam_date: &str) -> NewSubject {
        NewSubject {
            name: name.to_string(),
            exam_date: exam_date.to_string(),
            syllabus: "Cells, Genetics".to_string(),
        }
    }

    fn new_material(file_name: &str) -> NewMaterial {
        NewMaterial {
            file_name: file_name.to_string(),
            file_url: format!("https://files.example/{}", file_name),
            file_type: "pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn lists_subjects_by_exam_date() {
        let store = SubjectStore::new();
        assert_ok!(store.create(new_subject("History", "2027-06-10")).await);
        assert_ok!(store.create(new_subject("Biology", "2027-01-05")).await);
        assert_ok!(store.create(new_subject("Maths", "2027-03-01T09:00:00Z")).await);

        let names: Vec<String> = store.list().await.into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Biology", "Maths", "History"]);
    }

    #[tokio::test]
    async fn create_validates_input() {
        let store = SubjectStore::new();
        assert_eq!(
            store.create(new_subject("  ", "2027-01-05")).await.unwrap_err(),
            StoreError::MissingName
        );
        assert_eq!(
            store.create(new_subject("Biology", "soon")).await.unwrap_err(),
            StoreError::InvalidExamDate("soon".to_string())
        );
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn created_subject_is_retrievable() {
        let store = SubjectStore::new();
        let created = store
            .create(new_subject(" Biology ", "2027-01-05"))
            .await
            .unwrap();
        assert_eq!(created.name, "Biology");
        assert_eq!(created.exam_date, NaiveDate::from_ymd_opt(2027, 1, 5).unwrap());
        assert!(created.materials.is_empty());

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.syllabus, "Cells, Genetics");
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn materials_are_appended_in_order() {
        let store = SubjectStore::new();
        let subject = store.create(new_subject("Biology", "2027-01-05")).await.unwrap();

        assert_ok!(store.add_material(&subject.id, new_material("cells.pdf")).await);
        let updated = store
            .add_material(&subject.id, new_material("dna.png"))
            .await
            .unwrap()
            .unwrap();

        let files: Vec<&str> = updated
            .materials
            .iter()
            .map(|m| m.file_name.as_str())
            .collect();
        assert_eq!(files, vec!["cells.pdf", "dna.png"]);
        assert_eq!(store.get(&subject.id).await.unwrap().materials.len(), 2);
    }

    #[tokio::test]
    async fn material_for_unknown_subject_or_missing_fields() {
        let store = SubjectStore::new();
        assert!(store
            .add_material("missing", new_material("cells.pdf"))
            .await
            .unwrap()
            .is_none());

        let subject = store.create(new_subject("Biology", "2027-01-05")).await.unwrap();
        let mut incomplete = new_material("cells.pdf");
        incomplete.file_url = String::new();
        assert_eq!(
            store.add_material(&subject.id, incomplete).await.unwrap_err(),
            StoreError::IncompleteMaterial
        );
    }
}
