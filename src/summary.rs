// ai summaries of uploaded study materials via gemini

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::{http::StatusCode, response::IntoResponse, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use rig::completion::Prompt;
use rig::completion::message::{
    ContentFormat, DocumentMediaType, ImageMediaType, Message, UserContent,
};
use rig::providers::gemini;
use rig::OneOrMany;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::SummarizeRequest;

// gemini rejects inline payloads above ~20MB
const MAX_MATERIAL_BYTES: usize = 20 * 1024 * 1024;
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

const TUTOR_PREAMBLE: &str = "You are an expert academic tutor helping a student prepare for an exam.";

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),
    #[error("Error: File URL is missing.")]
    MissingUrl,
    #[error("Unsupported file type. Please upload a PDF or Image.")]
    Unsupported,
    #[error("File is too large to summarize ({0} bytes).")]
    TooLarge(usize),
    #[error("AI summaries are not configured on this server.")]
    NotConfigured,
    #[error("Failed to generate summary. Error details: {0}")]
    Fetch(String),
    #[error("AI Service Unavailable: {0}")]
    ModelUnavailable(String),
}

impl SummaryError {
    fn status_code(&self) -> StatusCode {
        match self {
            SummaryError::InvalidRequest(_)
            | SummaryError::MissingUrl
            | SummaryError::Unsupported
            | SummaryError::TooLarge(_) => StatusCode::BAD_REQUEST,
            SummaryError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            SummaryError::Fetch(_) => StatusCode::BAD_GATEWAY,
            SummaryError::ModelUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// the client reads `summary` for both outcomes
impl IntoResponse for SummaryError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = crate::models::SummaryResponse {
            summary: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for SummaryError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        SummaryError::InvalidRequest(rejection.body_text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    // "image/png; charset=binary" -> Png
    fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next()?.trim().to_lowercase();
        match mime.as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    fn media_type(self) -> ImageMediaType {
        match self {
            ImageFormat::Png => ImageMediaType::PNG,
            ImageFormat::Jpeg => ImageMediaType::JPEG,
            ImageFormat::Webp => ImageMediaType::WEBP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Pdf,
    Image(ImageFormat),
    Unsupported,
}

impl MaterialKind {
    pub fn detect(file_name: &str, file_type: &str) -> Self {
        let file_type = file_type.trim().to_lowercase();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if file_type == "pdf" || extension == "pdf" {
            return MaterialKind::Pdf;
        }

        let image_ext = if IMAGE_EXTENSIONS.contains(&file_type.as_str()) {
            file_type
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            extension
        } else {
            return MaterialKind::Unsupported;
        };

        match image_ext.as_str() {
            "png" => MaterialKind::Image(ImageFormat::Png),
            "webp" => MaterialKind::Image(ImageFormat::Webp),
            _ => MaterialKind::Image(ImageFormat::Jpeg),
        }
    }

    // the served content type beats the file name for images
    pub fn with_content_type(self, content_type: Option<&str>) -> Self {
        match (self, content_type.and_then(ImageFormat::from_content_type)) {
            (MaterialKind::Image(_), Some(format)) => MaterialKind::Image(format),
            (kind, _) => kind,
        }
    }
}

#[derive(Debug)]
pub struct FetchedMaterial {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

fn document_prompt(title: &str) -> String {
    format!(
        "Summarize the attached document.\n\n\
         DOCUMENT TITLE: {}\n\n\
         INSTRUCTIONS:\n\
         - Provide a 2-sentence executive summary.\n\
         - List 5 Key Concepts with brief explanations.\n\
         - Provide 1 specific \"Exam Tip\" based on the content.\n\
         - Use Markdown formatting (bolding, headers).",
        title
    )
}

fn image_prompt() -> String {
    "Analyze this study material image. Summarize the key points found in the text or diagrams."
        .to_string()
}

pub fn build_message(kind: MaterialKind, title: &str, bytes: &[u8]) -> anyhow::Result<Message> {
    let data = STANDARD.encode(bytes);
    let parts = match kind {
        MaterialKind::Pdf => vec![
            UserContent::text(document_prompt(title)),
            UserContent::document(data, Some(ContentFormat::Base64), Some(DocumentMediaType::PDF)),
        ],
        MaterialKind::Image(format) => vec![
            UserContent::text(image_prompt()),
            UserContent::image(
                data,
                Some(ContentFormat::Base64),
                Some(format.media_type()),
                None,
            ),
        ],
        MaterialKind::Unsupported => return Err(anyhow!("unsupported material type")),
    };
    let content = OneOrMany::many(parts).map_err(|_| anyhow!("summary prompt has no content"))?;
    Ok(Message::User { content })
}

// helper functions
fn create_http_client(config: &AppConfig) -> Result<Client, SummaryError> {
    Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_seconds))
        .build()
        .map_err(|e| SummaryError::Fetch(format!("Failed to create HTTP client: {}", e)))
}

pub async fn fetch_material(
    client: &Client,
    url: &str,
    max_bytes: usize,
) -> Result<FetchedMaterial, SummaryError> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SummaryError::Fetch(format!("HTTP request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(SummaryError::Fetch(format!(
            "Failed to download file: {}",
            response.status()
        )));
    }

    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            return Err(SummaryError::TooLarge(
                usize::try_from(length).unwrap_or(usize::MAX),
            ));
        }
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    // stream so a missing or lying content-length can't blow past the cap
    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| SummaryError::Fetch(format!("Failed to read file body: {}", e)))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(SummaryError::TooLarge(bytes.len() + chunk.len()));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(FetchedMaterial {
        bytes,
        content_type,
    })
}

// try each model in turn, the last error wins
pub async fn with_model_fallback<F, Fut>(models: &[&str], mut attempt: F) -> Result<String, SummaryError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    let mut last_error = anyhow!("no models configured");
    for model in models {
        match attempt(model.to_string()).await {
            Ok(summary) => return Ok(summary),
            Err(e) => {
                warn!("Model {} failed, trying next: {:#}", model, e);
                last_error = e;
            }
        }
    }
    Err(SummaryError::ModelUnavailable(format!("{:#}", last_error)))
}

async fn prompt_gemini(api_key: &str, model: &str, message: Message) -> anyhow::Result<String> {
    let agent = gemini::Client::new(api_key)
        .agent(model)
        .preamble(TUTOR_PREAMBLE)
        .build();
    agent
        .prompt(message)
        .await
        .with_context(|| format!("{} completion failed", model))
}

pub async fn summarize_material(
    config: &AppConfig,
    request: &SummarizeRequest,
) -> Result<String, SummaryError> {
    let url = request.source_url().ok_or(SummaryError::MissingUrl)?;
    let title = request
        .file_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("Document");
    let kind = MaterialKind::detect(title, request.file_type.as_deref().unwrap_or_default());
    if kind == MaterialKind::Unsupported {
        return Err(SummaryError::Unsupported);
    }
    let api_key = config
        .gemini_api_key
        .as_deref()
        .ok_or(SummaryError::NotConfigured)?;

    info!("Fetching material: {}", title);
    let client = create_http_client(config)?;
    let material = fetch_material(&client, url, MAX_MATERIAL_BYTES).await?;
    let kind = kind.with_content_type(material.content_type.as_deref());

    let message = build_message(kind, title, &material.bytes)
        .map_err(|e| SummaryError::ModelUnavailable(e.to_string()))?;

    info!(
        "Sending {} ({} bytes) to Gemini",
        title,
        material.bytes.len()
    );
    let models = [config.primary_model.as_str(), config.fallback_model.as_str()];
    with_model_fallback(&models, |model| {
        let message = message.clone();
        async move { prompt_gemini(api_key, &model, message).await }
    })
    .await
}
