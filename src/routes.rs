use crate::error::{AppError, AppResult};
use crate::service::{parse_entry_id, MessagePayload, MessageService};
use axum::{
    async_trait,
    extract::{FromRequest, Path, Request, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Build the application router with its middleware.
pub fn router(service: MessageService) -> Router {
    Router::new()
        .route(
            "/messages",
            get(list_messages)
                .post(create_message)
                .put(missing_id)
                .delete(missing_id),
        )
        .route(
            "/messages/foreign",
            post(create_foreign_message)
                .get(missing_id)
                .put(missing_id)
                .delete(missing_id),
        )
        .route(
            "/messages/:id",
            get(get_message).put(update_message).delete(delete_message),
        )
        .with_state(service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Message fields from either a JSON or a form-encoded body.
///
/// A body that cannot be read as either is treated as having no fields.
pub struct MessageBody(pub MessagePayload);

#[async_trait]
impl<S> FromRequest<S> for MessageBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        let payload = if is_form {
            Form::<MessagePayload>::from_request(req, state)
                .await
                .map(|Form(payload)| payload)
                .map_err(|e| e.body_text())
        } else {
            Json::<MessagePayload>::from_request(req, state)
                .await
                .map(|Json(payload)| payload)
                .map_err(|e| e.body_text())
        };

        match payload {
            Ok(payload) => Ok(MessageBody(payload)),
            Err(reason) => {
                debug!("Unreadable message body: {}", reason);
                Err(AppError::missing_parameters())
            }
        }
    }
}

async fn list_messages(State(service): State<MessageService>) -> AppResult<impl IntoResponse> {
    let messages = service.list().await?;
    Ok(Json(json!({ "data": messages })))
}

async fn get_message(
    State(service): State<MessageService>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let entry_id = parse_entry_id(&id)?;
    let message = service.get(entry_id).await?;
    Ok(Json(json!({ "messages": [message] })))
}

async fn create_message(
    State(service): State<MessageService>,
    MessageBody(payload): MessageBody,
) -> AppResult<impl IntoResponse> {
    let result = service.create(&payload).await?;
    Ok(Json(json!({ "data": result })))
}

async fn update_message(
    State(service): State<MessageService>,
    Path(id): Path<String>,
    MessageBody(payload): MessageBody,
) -> AppResult<impl IntoResponse> {
    let entry_id = parse_entry_id(&id)?;
    let result = service.update(entry_id, &payload).await?;
    Ok(Json(json!({ "results": result })))
}

async fn delete_message(
    State(service): State<MessageService>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let entry_id = parse_entry_id(&id)?;
    let result = service.delete(entry_id).await?;
    Ok(Json(json!({ "results": result })))
}

async fn create_foreign_message(
    State(service): State<MessageService>,
    MessageBody(payload): MessageBody,
) -> AppResult<impl IntoResponse> {
    let outcome = service.create_foreign(&payload).await?;
    Ok(Json(outcome))
}

/// Answers requests without a usable id, including `foreign` read as an id.
async fn missing_id() -> AppError {
    AppError::missing_parameters()
}
