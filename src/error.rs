use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Image size exceeds the 2MB limit (current size: {:.2}MB)", mib(.0))]
    ImageTooLarge(usize),

    #[error("Unsupported file type: {0}. Allowed types: JPEG, PNG, GIF, WEBP")]
    UnsupportedImageType(String),

    #[error("You have already submitted a referral. Only one referral per user is allowed.")]
    DuplicateReferral,

    #[error("Maximum number of referrals reached")]
    CapacityExceeded,

    #[error("Storage bucket \"{0}\" does not exist")]
    StorageMisconfigured(String),

    #[error("Failed to upload image: {0}")]
    UploadFailed(String),

    #[error("Failed to save referral: {0}")]
    InsertFailed(String),

    #[error("Internal server error")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

fn mib(bytes: &usize) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields
            | AppError::ImageTooLarge(_)
            | AppError::UnsupportedImageType(_)
            | AppError::DuplicateReferral => StatusCode::BAD_REQUEST,

            AppError::CapacityExceeded => StatusCode::FORBIDDEN,

            AppError::StorageMisconfigured(_)
            | AppError::UploadFailed(_)
            | AppError::InsertFailed(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed: {self:?}");
        } else {
            warn!("Request rejected: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
