//! Glossary endpoints: personal CRUD, community sharing, favorites and
//! spreadsheet import/export.

use axum::{
    Extension, Form, Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono_tz::Tz;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{ComparisonEdit, NewComparison, SharedOrder};
use crate::sheets;
use crate::terms;

use super::auth::CustomerId;
use super::types::{
    ComparisonDto, CopiedResponse, CreatedResponse, ListResponse, MessageResponse,
    SharedComparisonDto,
};
use super::{ApiError, AppState};

#[derive(Deserialize)]
pub struct SharedListQuery {
    pub order: Option<String>,
}

/// GET /glossaries
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
) -> Result<Json<ListResponse<ComparisonDto>>, ApiError> {
    let comparisons = state.store().list_comparisons(customer_id).await?;

    let data = comparisons.into_iter().map(ComparisonDto::from).collect();

    Ok(Json(ListResponse::new(data)))
}

/// GET /glossaries/shared
pub async fn list_shared(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Query(query): Query<SharedListQuery>,
) -> Result<Json<ListResponse<SharedComparisonDto>>, ApiError> {
    let order = SharedOrder::parse(query.order.as_deref().unwrap_or("latest"));

    let rows = state.store().list_shared_comparisons(order).await?;
    let faved = state.store().comparison_fav_ids(customer_id).await?;

    let data = rows
        .into_iter()
        .map(|row| {
            let is_faved = faved.contains(&row.id);
            SharedComparisonDto::from_row(row, is_faved)
        })
        .collect();

    Ok(Json(ListResponse::new(data)))
}

/// POST /glossaries
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let required = ["title", "share_flag", "origin_lang", "target_lang"];
    if !required.iter().all(|key| form_field(&fields, key).is_some()) {
        return Err(ApiError::validation("Missing required fields"));
    }

    let content = terms::encode_form_fields(&fields);
    let now = full_timestamp(timezone(&state).await);

    let created = state
        .store()
        .create_comparison(NewComparison {
            title: form_field(&fields, "title").unwrap_or_default().to_string(),
            origin_lang: form_field(&fields, "origin_lang")
                .unwrap_or_default()
                .to_string(),
            target_lang: form_field(&fields, "target_lang")
                .unwrap_or_default()
                .to_string(),
            content,
            share_flag: form_field(&fields, "share_flag")
                .unwrap_or("N")
                .to_string(),
            customer_id,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        })
        .await?;

    Ok(Json(CreatedResponse {
        id: created.id,
        message: None,
    }))
}

/// POST /glossaries/{id}
///
/// Partial edit; the term list is always rebuilt from the submitted
/// `content[..]` fields, so omitting them empties the glossary.
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let comparison = state
        .store()
        .get_owned_comparison(id, customer_id)
        .await?
        .ok_or_else(|| ApiError::glossary_not_found(id))?;

    let added_count = match form_field(&fields, "added_count") {
        Some(raw) => Some(
            raw.parse::<i32>()
                .map_err(|_| ApiError::validation("Invalid added_count format"))?,
        ),
        None => None,
    };

    let edit = ComparisonEdit {
        title: form_field(&fields, "title").map(str::to_string),
        origin_lang: form_field(&fields, "origin_lang").map(str::to_string),
        target_lang: form_field(&fields, "target_lang").map(str::to_string),
        share_flag: form_field(&fields, "share_flag").map(str::to_string),
        added_count,
        content: terms::encode_form_fields(&fields),
        updated_at: Some(full_timestamp(timezone(&state).await)),
    };

    state.store().edit_comparison(comparison, edit).await?;

    Ok(Json(MessageResponse::new("Glossary updated")))
}

/// POST /glossaries/{id}/share
pub async fn set_share(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let comparison = state
        .store()
        .get_owned_comparison(id, customer_id)
        .await?
        .ok_or_else(|| ApiError::glossary_not_found(id))?;

    let share_flag = match form_field(&fields, "share_flag") {
        Some(flag @ ("Y" | "N")) => flag.to_string(),
        _ => return Err(ApiError::validation("Invalid share_flag parameter")),
    };

    state
        .store()
        .set_comparison_share(comparison, &share_flag)
        .await?;

    Ok(Json(MessageResponse::new("Share status updated")))
}

/// POST /glossaries/{id}/copy
///
/// Only shared glossaries can be copied; the copy lands in the caller's
/// library unshared.
pub async fn copy(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
) -> Result<Json<CopiedResponse>, ApiError> {
    let original = state
        .store()
        .get_shared_comparison(id)
        .await?
        .ok_or_else(|| ApiError::glossary_not_found(id))?;

    let now = full_timestamp(timezone(&state).await);

    let copied = state
        .store()
        .create_comparison(NewComparison {
            title: format!("{} (copy)", original.title),
            origin_lang: original.origin_lang,
            target_lang: original.target_lang,
            content: original.content,
            share_flag: "N".to_string(),
            customer_id,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        })
        .await?;

    Ok(Json(CopiedResponse {
        new_id: copied.id,
        message: None,
    }))
}

/// POST /glossaries/{id}/favorite
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .store()
        .get_comparison(id)
        .await?
        .ok_or_else(|| ApiError::glossary_not_found(id))?;

    let now_faved = state.store().toggle_comparison_fav(id, customer_id).await?;

    let message = if now_faved {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };

    Ok(Json(MessageResponse::new(message)))
}

/// DELETE /glossaries/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let comparison = state
        .store()
        .get_owned_comparison(id, customer_id)
        .await?
        .ok_or_else(|| ApiError::glossary_not_found(id))?;

    state.store().delete_comparison(comparison).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}

/// GET /glossaries/template
///
/// Empty import template; served without authentication.
pub async fn download_template() -> Result<Response, ApiError> {
    let bytes = sheets::template_workbook()
        .map_err(|e| ApiError::internal(format!("Failed to build template: {e}")))?;

    Ok(attachment(bytes, sheets::XLSX_MIME, "glossary_template.xlsx"))
}

/// POST /glossaries/import
pub async fn import(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    mut multipart: Multipart,
) -> Result<Json<CreatedResponse>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid upload: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Invalid upload: {e}")))?;
            upload = Some(bytes);
            break;
        }
    }

    let Some(bytes) = upload else {
        return Err(ApiError::validation("No file selected"));
    };

    let rows = sheets::read_term_rows(&bytes).map_err(|e| match e {
        sheets::SheetReadError::MissingColumns => {
            ApiError::UnsupportedFormat("File does not match the template format".to_string())
        }
        sheets::SheetReadError::Malformed(msg) => {
            ApiError::ImportFailed(format!("Failed to import file: {msg}"))
        }
    })?;

    let content = terms::encode_import_rows(&rows);
    let now = full_timestamp(timezone(&state).await);

    let created = state
        .store()
        .create_comparison(NewComparison {
            title: "Imported glossary".to_string(),
            origin_lang: "unknown".to_string(),
            target_lang: "unknown".to_string(),
            content,
            share_flag: "N".to_string(),
            customer_id,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        })
        .await?;

    Ok(Json(CreatedResponse {
        id: created.id,
        message: None,
    }))
}

/// GET /glossaries/{id}/export
pub async fn export_one(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let comparison = state
        .store()
        .get_comparison(id)
        .await?
        .ok_or_else(|| ApiError::glossary_not_found(id))?;

    if comparison.share_flag == "Y" || comparison.customer_id != customer_id {
        return Err(ApiError::Forbidden(
            "Glossary is not shared or you do not have access".to_string(),
        ));
    }

    let rows = terms::decode_export_rows(&comparison.content);
    let bytes = sheets::glossary_workbook(&rows)
        .map_err(|e| ApiError::internal(format!("Failed to build workbook: {e}")))?;

    let filename = format!("{}.xlsx", comparison.title);
    Ok(attachment(bytes, sheets::XLSX_MIME, &filename))
}

/// GET /glossaries/export
///
/// Every glossary the caller owns, one workbook per glossary, zipped.
pub async fn export_all(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
) -> Result<Response, ApiError> {
    let comparisons = state.store().list_comparisons(customer_id).await?;

    let mut files = Vec::with_capacity(comparisons.len());
    for comparison in comparisons {
        let rows = terms::decode_export_rows(&comparison.content);
        let bytes = sheets::glossary_workbook(&rows)
            .map_err(|e| ApiError::internal(format!("Failed to build workbook: {e}")))?;
        files.push((format!("{}.xlsx", comparison.title), bytes));
    }

    let archive = sheets::bundle_archive(&files)
        .map_err(|e| ApiError::internal(format!("Failed to build archive: {e}")))?;

    let date = chrono::Utc::now()
        .with_timezone(&timezone(&state).await)
        .format("%Y%m%d");
    let filename = format!("glossaries_{date}.zip");

    Ok(attachment(archive, sheets::ZIP_MIME, &filename))
}

/// First value for a form key.
fn form_field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

async fn timezone(state: &Arc<AppState>) -> Tz {
    state.config().read().await.timezone()
}

fn full_timestamp(tz: Tz) -> String {
    chrono::Utc::now()
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub(super) fn attachment(bytes: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
