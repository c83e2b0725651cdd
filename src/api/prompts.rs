//! Prompt endpoints: personal CRUD, community sharing and favorites.
//!
//! Prompts soft-delete and track their net favorite count in
//! `added_count`; the shared browse list is public.

use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{NewPrompt, PromptEdit, SharedOrder};

use super::auth::CustomerId;
use super::types::{
    CopiedResponse, CreatedResponse, ListResponse, MessageResponse, PromptDto, SharedPromptDto,
};
use super::{ApiError, AppState};

const MAX_TITLE_CHARS: usize = 255;
const MAX_CONTENT_CHARS: usize = 5000;

#[derive(Deserialize)]
pub struct SharedListQuery {
    pub porder: Option<String>,
}

/// GET /prompts
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
) -> Result<Json<ListResponse<PromptDto>>, ApiError> {
    let prompts = state.store().list_prompts(customer_id).await?;

    let data = prompts.into_iter().map(PromptDto::from).collect();

    Ok(Json(ListResponse::new(data)))
}

/// GET /prompts/shared
///
/// Public; no favorite annotation because there is no caller to annotate
/// for.
pub async fn list_shared(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SharedListQuery>,
) -> Result<Json<ListResponse<SharedPromptDto>>, ApiError> {
    let order = SharedOrder::parse(query.porder.as_deref().unwrap_or("latest"));

    let rows = state.store().list_shared_prompts(order).await?;

    let data = rows.into_iter().map(SharedPromptDto::from).collect();

    Ok(Json(ListResponse::new(data)))
}

/// POST /prompts
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let (Some(title), Some(content)) = (form_field(&fields, "title"), form_field(&fields, "content"))
    else {
        return Err(ApiError::validation("Missing required fields"));
    };

    validate_title(title)?;
    validate_content(content)?;

    let today = {
        let config = state.config().read().await;
        chrono::Utc::now()
            .with_timezone(&config.timezone())
            .format("%Y-%m-%d")
            .to_string()
    };

    let created = state
        .store()
        .create_prompt(NewPrompt {
            title: title.to_string(),
            content: content.to_string(),
            share_flag: form_field(&fields, "share_flag").unwrap_or("N").to_string(),
            customer_id,
            created_at: Some(today),
        })
        .await?;

    Ok(Json(CreatedResponse {
        id: created.id,
        message: Some("Created".to_string()),
    }))
}

/// POST /prompts/{id}
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let prompt = state
        .store()
        .get_owned_live_prompt(id, customer_id)
        .await?
        .ok_or_else(|| ApiError::prompt_not_found(id))?;

    let title = form_field(&fields, "title");
    let content = form_field(&fields, "content");

    if let Some(title) = title {
        validate_title(title)?;
    }
    if let Some(content) = content {
        validate_content(content)?;
    }

    let edit = PromptEdit {
        title: title.map(str::to_string),
        content: content.map(str::to_string),
    };

    state.store().edit_prompt(prompt, edit).await?;

    Ok(Json(MessageResponse::new("Prompt updated")))
}

/// POST /prompts/{id}/share
pub async fn set_share(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let prompt = state
        .store()
        .get_owned_live_prompt(id, customer_id)
        .await?
        .ok_or_else(|| ApiError::prompt_not_found(id))?;

    let share_flag = match form_field(&fields, "share_flag") {
        Some(flag @ ("Y" | "N")) => flag.to_string(),
        _ => return Err(ApiError::validation("Invalid share flag parameter")),
    };

    state.store().set_prompt_share(prompt, &share_flag).await?;

    Ok(Json(MessageResponse::new("Share status updated")))
}

/// POST /prompts/{id}/copy
pub async fn copy(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
) -> Result<Json<CopiedResponse>, ApiError> {
    let original = state
        .store()
        .get_shared_live_prompt(id)
        .await?
        .ok_or_else(|| ApiError::prompt_not_found(id))?;

    let copied = state.store().copy_prompt(&original, customer_id).await?;

    Ok(Json(CopiedResponse {
        new_id: copied.id,
        message: Some("Copied".to_string()),
    }))
}

/// POST /prompts/{id}/favorite
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let prompt = state
        .store()
        .get_prompt(id)
        .await?
        .ok_or_else(|| ApiError::prompt_not_found(id))?;

    let now_faved = state.store().toggle_prompt_fav(prompt, customer_id).await?;

    let message = if now_faved {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };

    Ok(Json(MessageResponse::new(message)))
}

/// DELETE /prompts/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let prompt = state
        .store()
        .get_owned_prompt(id, customer_id)
        .await?
        .ok_or_else(|| ApiError::prompt_not_found(id))?;

    state.store().soft_delete_prompt(prompt).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::validation("Title too long"));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ApiError> {
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::validation(
            "Content exceeds the 5000 character limit",
        ));
    }
    Ok(())
}

fn form_field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
