use serde::Serialize;

use crate::db::{SharedComparisonRow, SharedPromptRow};
use crate::entities::{comparisons, prompts};
use crate::terms::{self, TermPair};

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        let total = data.len();
        Self { data, total }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CopiedResponse {
    pub new_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
}

/// Owner's view of a glossary. Timestamps are truncated to minute
/// precision for display.
#[derive(Debug, Serialize)]
pub struct ComparisonDto {
    pub id: i32,
    pub title: String,
    pub origin_lang: String,
    pub target_lang: String,
    pub share_flag: String,
    pub added_count: i32,
    pub content: Vec<TermPair>,
    pub customer_id: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub deleted_flag: String,
}

impl From<comparisons::Model> for ComparisonDto {
    fn from(model: comparisons::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            origin_lang: model.origin_lang,
            target_lang: model.target_lang,
            share_flag: model.share_flag,
            added_count: model.added_count,
            content: terms::decode_pairs(&model.content),
            customer_id: model.customer_id,
            created_at: model.created_at.as_deref().map(minute_precision),
            updated_at: model.updated_at.as_deref().map(minute_precision),
            deleted_flag: model.deleted_flag,
        }
    }
}

/// Community view of a shared glossary.
#[derive(Debug, Serialize)]
pub struct SharedComparisonDto {
    pub id: i32,
    pub title: String,
    pub origin_lang: String,
    pub target_lang: String,
    pub content: Vec<TermPair>,
    pub email: String,
    pub added_count: i32,
    pub created_at: Option<String>,
    pub faved: bool,
    pub fav_count: i64,
}

impl SharedComparisonDto {
    pub fn from_row(row: SharedComparisonRow, faved: bool) -> Self {
        Self {
            id: row.id,
            title: row.title,
            origin_lang: row.origin_lang,
            target_lang: row.target_lang,
            content: terms::decode_pairs(&row.content),
            email: row.email.unwrap_or_else(|| "anonymous user".to_string()),
            added_count: row.added_count,
            created_at: row.created_at.as_deref().map(minute_precision),
            faved,
            fav_count: row.fav_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PromptDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub share_flag: String,
    pub created_at: Option<String>,
}

impl From<prompts::Model> for PromptDto {
    fn from(model: prompts::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            share_flag: model.share_flag,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SharedPromptDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub email: String,
    pub share_flag: String,
    pub added_count: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub fav_count: i64,
}

impl From<SharedPromptRow> for SharedPromptDto {
    fn from(row: SharedPromptRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            email: row.email.unwrap_or_else(|| "anonymous user".to_string()),
            share_flag: row.share_flag,
            added_count: row.added_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            fav_count: row.fav_count,
        }
    }
}

/// Drop the seconds from a stored `%Y-%m-%d %H:%M:%S` timestamp.
fn minute_precision(ts: &str) -> String {
    ts.get(..16).unwrap_or(ts).to_string()
}

#[cfg(test)]
mod tests {
    use super::minute_precision;

    #[test]
    fn truncates_seconds() {
        assert_eq!(minute_precision("2025-03-01 09:30:45"), "2025-03-01 09:30");
    }

    #[test]
    fn leaves_short_values_alone() {
        assert_eq!(minute_precision("2025-03-01"), "2025-03-01");
    }
}
