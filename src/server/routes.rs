use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    Json,
    http::StatusCode,
};
use serde::Serialize;
use serde_json::Value;
use crate::server::AppState;
use crate::document::{self, HierarchyDocument};
use crate::extract::extract_text;
use crate::Error;
use std::sync::Arc;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into(), raw: None }))
}

/// Client errors map to 400, everything else to 500
fn from_error(err: Error, prefix: &str) -> ApiError {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let raw = match &err {
        Error::Structuring { raw, .. } if !raw.is_empty() => Some(raw.clone()),
        _ => None,
    };

    (status, Json(ErrorResponse { error: format!("{}{}", prefix, err), raw }))
}

fn to_json<T: Serialize>(value: &T) -> Result<Json<Value>, ApiError> {
    serde_json::to_value(value)
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// `POST /read-file` - multipart upload, field `file`
pub async fn read_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<HierarchyDocument>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Error reading upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Error reading upload: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing 'file' field in upload."))?;

    tracing::info!("Received upload '{}' ({} bytes)", file_name, bytes.len());

    let text = tokio::task::spawn_blocking(move || extract_text(&file_name, &bytes))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Extraction task failed: {}", e)))?
        .map_err(|e| from_error(e, ""))?;

    let doc = state
        .structurer
        .structure(&text)
        .await
        .map_err(|e| from_error(e, ""))?;

    Ok(Json(doc))
}

/// `POST /store` - `{"Class", "Topics", "raw_text"?}`, answers `201 {"class_id"}`
pub async fn store_notes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) =
        payload.map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e.body_text())))?;

    let raw_text = document::raw_text(&payload).map_err(|e| from_error(e, ""))?;
    let doc = HierarchyDocument::from_value(&payload).map_err(|e| from_error(e, ""))?;

    let class_id = state
        .writer
        .write_with_audit(&doc, raw_text)
        .await
        .map_err(|e| from_error(e, "DB save failed: "))?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "class_id": class_id }))))
}

pub async fn get_classes(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let classes = state.reader.list_classes().await.map_err(|e| from_error(e, ""))?;
    to_json(&classes)
}

pub async fn get_topics(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let topics = state.reader.list_topics(class_id).await.map_err(|e| from_error(e, ""))?;
    to_json(&topics)
}

pub async fn get_notes(
    State(state): State<Arc<AppState>>,
    Path(topic_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let notes = state.reader.list_notes(topic_id).await.map_err(|e| from_error(e, ""))?;
    to_json(&notes)
}

/// Unknown classes answer `{}`
pub async fn get_class_hierarchy(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    match state.reader.get_hierarchy(class_id).await.map_err(|e| from_error(e, ""))? {
        Some(hierarchy) => to_json(&hierarchy),
        None => Ok(Json(serde_json::json!({}))),
    }
}
