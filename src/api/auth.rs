use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState};

/// Authenticated customer id, inserted into request extensions by the
/// middleware so handlers can take it with `Extension(CustomerId(..))`.
#[derive(Debug, Clone, Copy)]
pub struct CustomerId(pub i32);

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub email: String,
    pub api_key: String,
}

#[derive(Serialize)]
pub struct CustomerInfoResponse {
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    // Check session first (fastest path for web UI)
    if let Ok(Some(customer_id)) = session.get::<i32>("customer_id").await {
        tracing::Span::current().record("user_id", customer_id);
        request.extensions_mut().insert(CustomerId(customer_id));
        return Ok(next.run(request).await);
    }

    if let Some(key) = extract_api_key(&headers)
        && let Ok(Some(customer)) = state.store().verify_customer_api_key(&key).await
    {
        tracing::Span::current().record("user_id", customer.id);
        request.extensions_mut().insert(CustomerId(customer.id));
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// POST /auth/login
/// Authenticate with email and password, returns the API key on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let customer = state
        .store()
        .verify_customer_password(&payload.email, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if let Err(e) = session.insert("customer_id", customer.id).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    Ok(Json(LoginResponse {
        email: customer.email,
        api_key: customer.api_key,
    }))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
/// Current customer information (requires authentication)
pub async fn get_current_customer(
    State(state): State<Arc<AppState>>,
    Extension(CustomerId(customer_id)): Extension<CustomerId>,
) -> Result<Json<CustomerInfoResponse>, ApiError> {
    let customer = state
        .store()
        .get_customer(customer_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get customer: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Customer not found".to_string()))?;

    Ok(Json(CustomerInfoResponse {
        email: customer.email,
        created_at: customer.created_at,
        updated_at: customer.updated_at,
    }))
}
