// http handlers and routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{
    NewMaterial, NewSubject, PlanRequest, PlanResponse, Subject, SubjectCreated,
    SummarizeRequest, SummaryResponse,
};
use crate::planner::generate_plan;
use crate::store::SubjectStore;
use crate::summary::{summarize_material, SummaryError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub subjects: SubjectStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config: Arc::new(config),
            subjects: SubjectStore::new(),
        }
    }
}

async fn generate_plan_handler(
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, ApiError> {
    let Json(request) = payload?;
    let today = Utc::now().date_naive();

    let plan = generate_plan(&request, today).map_err(|e| {
        warn!("Plan generation rejected for {:?}: {}", request.subject_name, e);
        e
    })?;

    info!(
        "Generated study plan for {} ({:?} mode, {} days: {} learning / {} practice / {} revision)",
        request.subject_name,
        request.difficulty,
        plan.days_left,
        plan.allocation.learning,
        plan.allocation.practice,
        plan.allocation.revision
    );
    Ok(Json(PlanResponse { plan: plan.days }))
}

async fn list_subjects_handler(State(state): State<AppState>) -> Json<Vec<Subject>> {
    Json(state.subjects.list().await)
}

async fn create_subject_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewSubject>, JsonRejection>,
) -> Result<(StatusCode, Json<SubjectCreated>), ApiError> {
    let Json(new_subject) = payload?;
    let subject = state.subjects.create(new_subject).await?;
    info!("Created subject {} ({})", subject.name, subject.id);

    Ok((
        StatusCode::CREATED,
        Json(SubjectCreated {
            message: "Subject Created",
            subject,
        }),
    ))
}

async fn get_subject_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Subject>, ApiError> {
    match state.subjects.get(&id).await {
        Some(subject) => Ok(Json(subject)),
        None => {
            info!("Subject {} not found", id);
            Err(ApiError::SubjectNotFound)
        }
    }
}

async fn add_material_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewMaterial>, JsonRejection>,
) -> Result<Json<Subject>, ApiError> {
    let Json(material) = payload?;
    let subject = state
        .subjects
        .add_material(&id, material)
        .await?
        .ok_or(ApiError::SubjectNotFound)?;

    info!(
        "Saved material for subject {}, material count: {}",
        id,
        subject.materials.len()
    );
    Ok(Json(subject))
}

async fn summarize_handler(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, SummaryError> {
    let Json(request) = payload?;
    match summarize_material(&state.config, &request).await {
        Ok(summary) => Ok(Json(SummaryResponse { summary })),
        Err(e) => {
            error!("Summary failed: {}", e);
            Err(e)
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

// setup http routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/generate-plan", post(generate_plan_handler))
        .route(
            "/api/subjects",
            get(list_subjects_handler).post(create_subject_handler),
        )
        .route("/api/subjects/{id}", get(get_subject_handler))
        .route("/api/subjects/{id}/material", post(add_material_handler))
        .route("/api/summarize", post(summarize_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        build_router(AppState::new(AppConfig::default()))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    fn days_from_now(days: i64) -> String {
        (Utc::now().date_naive() + Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    #[tokio::test]
    async fn generate_plan_returns_ten_day_schedule() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/generate-plan",
                json!({
                    "subjectName": "Physics",
                    "syllabus": "Unit1, Unit2, Unit3, Unit4, Unit5",
                    "examDate": days_from_now(10),
                    "hoursPerDay": 3,
                    "difficulty": "Medium"
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let plan = body["plan"].as_array().expect("plan array");
        assert_eq!(plan.len(), 10);
        assert_eq!(plan[0]["day"], 1);
        assert_eq!(plan[0]["phase"], "LEARNING");
        assert_eq!(plan[0]["topics"], json!(["Unit1"]));
        assert_eq!(plan[6]["phase"], "PRACTICE");
        assert_eq!(plan[9]["phase"], "REVISION");
    }

    #[tokio::test]
    async fn generate_plan_rejects_bad_dates() {
        let app = test_app();
        for exam_date in ["not-a-date".to_string(), days_from_now(-4)] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/generate-plan",
                    json!({
                        "subjectName": "Physics",
                        "syllabus": "",
                        "examDate": exam_date,
                        "hoursPerDay": 3,
                        "difficulty": "Hard"
                    }),
                ))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "invalid_plan_request");
        }
    }

    #[tokio::test]
    async fn generate_plan_rejects_missing_fields() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/generate-plan",
                json!({ "subjectName": "Physics", "hoursPerDay": 3 }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "invalid_json");
    }

    #[tokio::test]
    async fn subject_lifecycle() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/subjects",
                json!({ "name": "Biology", "examDate": "2030-05-01", "syllabus": "Cells" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Subject Created");
        let id = body["subject"]["id"].as_str().expect("id").to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/subjects/{}/material", id),
                json!({
                    "fileName": "cells.pdf",
                    "fileUrl": "https://files.example/cells.pdf",
                    "fileType": "pdf"
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["materials"][0]["fileName"], "cells.pdf");

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/subjects/{}", id)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["examDate"], "2030-05-01");
        assert_eq!(body["materials"].as_array().map(Vec::len), Some(1));

        let response = app
            .oneshot(get_request("/api/subjects"))
            .await
            .expect("response");
        let body = body_json(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn unknown_subject_returns_not_found() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(get_request("/api/subjects/does-not-exist"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/subjects/does-not-exist/material",
                json!({ "fileName": "a.pdf", "fileUrl": "https://files.example/a.pdf" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_subject_validates_name() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/subjects",
                json!({ "name": "", "examDate": "2030-05-01" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn summarize_without_url_is_bad_request() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/summarize",
                json!({ "fileName": "notes.pdf", "fileType": "pdf" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["summary"], "Error: File URL is missing.");
    }

    #[tokio::test]
    async fn summarize_malformed_body_answers_with_summary() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/summarize")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let response = test_app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let summary = body["summary"].as_str().expect("summary string");
        assert!(summary.starts_with("Invalid request body:"));
    }

    #[tokio::test]
    async fn summarize_without_api_key_is_unavailable() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/summarize",
                json!({ "fileName": "notes.pdf", "ufsUrl": "https://files.example/notes.pdf" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_check() {
        let response = test_app()
            .oneshot(get_request("/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
