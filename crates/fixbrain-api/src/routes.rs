//! Request handlers

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use fixbrain_app::DiagnosisRequest;
use fixbrain_types::{Error, TaskResult};
use tracing::info;

use crate::error::ApiError;
use crate::schemas::{AnalyzeResult, HealthResponse};
use crate::AppState;

/// Multipart fields of an analyze request
#[derive(Default)]
struct AnalyzeForm {
    appliance_type: Option<String>,
    problem_description: Option<String>,
    image: Option<(String, Bytes)>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("appliance_type") => form.appliance_type = Some(field.text().await?),
                Some("problem_description") => form.problem_description = Some(field.text().await?),
                Some("image") => {
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    form.image = Some((content_type, bytes));
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

/// `POST /tasks/:task_id/analyze`
pub async fn analyze(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResult>, ApiError> {
    let form = AnalyzeForm::read(multipart?).await?;

    let appliance_type = form
        .appliance_type
        .ok_or_else(|| ApiError::missing_field("appliance_type"))?;
    let problem_description = form
        .problem_description
        .ok_or_else(|| ApiError::missing_field("problem_description"))?;
    let (content_type, image) = form.image.ok_or_else(|| ApiError::missing_field("image"))?;

    if !content_type.starts_with("image/") {
        return Err(Error::InvalidImage(format!(
            "expected an image upload, got content type {:?}",
            content_type
        ))
        .into());
    }

    info!(
        task_id = %task_id,
        content_type = %content_type,
        bytes = image.len(),
        "analyze request"
    );

    let result = state
        .agent
        .run(DiagnosisRequest {
            task_id: &task_id,
            appliance_type: &appliance_type,
            problem_description: &problem_description,
            image_bytes: &image,
        })
        .await?;

    Ok(Json(AnalyzeResult::from(&result)))
}

/// `GET /tasks/:task_id`
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResult>, ApiError> {
    match state.agent.load(&task_id).await? {
        Some(result) => Ok(Json(result)),
        None => Err(Error::TaskNotFound(task_id).into()),
    }
}

/// `GET /health`
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
