use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{chat_message, chat_read_state, customer_order, user_profile};
use crate::services::chat::{
    CreateOrderRefRequest, CreateProfileRequest, MessageView, SendMessageRequest,
    ToggleReactionRequest, ToggleReactionResult,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkReadRequest {
    pub user_id: Uuid,
    /// Defaults to now when omitted.
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MessagesQuery {
    pub user_id: Uuid,
    /// Only messages newer than this cursor are returned.
    pub since: Option<DateTime<Utc>>,
}

#[utoipa::path(
    post,
    path = "/api/v1/chat/users",
    summary = "Create user profile",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ApiResponse<user_profile::Model>)
    ),
    tag = "chat"
)]
pub async fn create_profile(
    State(state): State<AppState>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<ApiResponse<user_profile::Model>>), crate::errors::ServiceError> {
    let created = state.chat.create_profile(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/chat/users",
    summary = "List user profiles",
    responses(
        (status = 200, description = "All profiles, ordered by display name", body = ApiResponse<Vec<user_profile::Model>>)
    ),
    tag = "chat"
)]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> ApiResult<Vec<user_profile::Model>> {
    let profiles = state.chat.list_profiles().await?;
    Ok(Json(ApiResponse::success(profiles)))
}

/// Register an order reference so `#ORDER` tokens can resolve to it.
#[utoipa::path(
    post,
    path = "/api/v1/chat/orders",
    summary = "Create order reference",
    request_body = CreateOrderRefRequest,
    responses(
        (status = 201, description = "Order reference created", body = ApiResponse<customer_order::Model>),
        (status = 409, description = "Order number already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "chat"
)]
pub async fn create_order_ref(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRefRequest>,
) -> Result<(StatusCode, Json<ApiResponse<customer_order::Model>>), crate::errors::ServiceError> {
    let created = state.chat.create_order_ref(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Send a chat message. `@Display Name` and `#ORDER-REF` tokens are
/// resolved to mention ids at send time.
#[utoipa::path(
    post,
    path = "/api/v1/chat/messages",
    summary = "Send message",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = ApiResponse<chat_message::Model>),
        (status = 404, description = "Sender not found", body = crate::errors::ErrorResponse)
    ),
    tag = "chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<chat_message::Model>>), crate::errors::ServiceError> {
    let message = state.chat.send_message(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(message))))
}

#[utoipa::path(
    get,
    path = "/api/v1/chat/messages",
    summary = "List messages",
    params(
        ("user_id" = Uuid, Query, description = "Requesting user, used for the reacted flag"),
        ("since" = Option<String>, Query, description = "RFC 3339 cursor; only newer messages are returned"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Messages oldest first with reaction tallies", body = ApiResponse<PaginatedResponse<MessageView>>)
    ),
    tag = "chat"
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
    Query(list): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<MessageView>> {
    let limit = state.config.clamp_page_size(list.limit);
    let (views, total) = state
        .chat
        .list_messages(query.user_id, query.since, list.page, limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        views, total, list.page, limit,
    ))))
}

/// Toggle an emoji reaction: adds it if missing, removes it otherwise.
#[utoipa::path(
    post,
    path = "/api/v1/chat/messages/{id}/reactions",
    summary = "Toggle reaction",
    params(("id" = Uuid, Path, description = "Message id")),
    request_body = ToggleReactionRequest,
    responses(
        (status = 200, description = "Reaction state after the toggle", body = ApiResponse<ToggleReactionResult>),
        (status = 404, description = "Message not found", body = crate::errors::ErrorResponse)
    ),
    tag = "chat"
)]
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Json(request): Json<ToggleReactionRequest>,
) -> ApiResult<ToggleReactionResult> {
    let result = state.chat.toggle_reaction(message_id, request).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Move the caller's read cursor forward. The cursor never moves back.
#[utoipa::path(
    put,
    path = "/api/v1/chat/read-state",
    summary = "Mark chat read",
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Updated read state", body = ApiResponse<chat_read_state::Model>)
    ),
    tag = "chat"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Json(request): Json<MarkReadRequest>,
) -> ApiResult<chat_read_state::Model> {
    let read_at = request.read_at.unwrap_or_else(Utc::now);
    let state_row = state.chat.mark_read(request.user_id, read_at).await?;
    Ok(Json(ApiResponse::success(state_row)))
}

#[utoipa::path(
    get,
    path = "/api/v1/chat/unread-count",
    summary = "Unread message count",
    params(("user_id" = Uuid, Query, description = "User to count unread messages for")),
    responses(
        (status = 200, description = "Messages from others newer than the read cursor", body = ApiResponse<u64>)
    ),
    tag = "chat"
)]
pub async fn unread_count(
    State(state): State<AppState>,
    Query(user): Query<UserQuery>,
) -> ApiResult<u64> {
    let count = state.chat.unread_count(user.user_id).await?;
    Ok(Json(ApiResponse::success(count)))
}
