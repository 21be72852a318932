use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    admission::{self, MAX_REFERRALS},
    error::AppError,
    state::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStatus {
    pub count: i64,
    pub limit_reached: bool,
}

/// Shared by the status endpoint and the page render. Always a live read,
/// never cached.
pub async fn fetch_status(state: &AppState) -> Result<ReferralStatus, AppError> {
    let count = state.repo.count().await?;

    Ok(ReferralStatus {
        count,
        limit_reached: count >= MAX_REFERRALS,
    })
}

pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReferralStatus>, AppError> {
    Ok(Json(fetch_status(&state).await?))
}

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let submission = admission::parse_submission(multipart).await?;
    admission::admit(&state, submission).await?;

    Ok(Json(json!({ "success": true })))
}
