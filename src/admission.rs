//! The admission workflow: everything between a raw multipart body and a
//! persisted referral row.
//!
//! Checks run in a fixed order and the first failure wins: field
//! presence, image size, image type, duplicate email, capacity, bucket
//! existence. Only then is the image uploaded and the row inserted. No
//! cross-request lock protects the duplicate and capacity reads; the
//! resulting race is accepted (see DESIGN.md).

use axum::{body::Bytes, extract::Multipart};
use chrono::Utc;
use tracing::info;

use crate::{database::NewReferral, error::AppError, state::AppState};

pub const MAX_REFERRALS: i64 = 5;
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug)]
pub struct Submission {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub image: ImageUpload,
}

/// Pulls the four expected fields out of a multipart body. Unknown parts
/// are skipped. Absent or empty fields are reported as one
/// `MissingFields` error, matching the all-or-nothing presence check.
pub async fn parse_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut fullname = None;
    let mut email = None;
    let mut phone = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Internal(Box::new(e)))?
    {
        match field.name() {
            Some("fullname") => {
                fullname = Some(field.text().await.map_err(internal)?);
            }
            Some("email") => {
                email = Some(field.text().await.map_err(internal)?);
            }
            Some("phone") => {
                phone = Some(field.text().await.map_err(internal)?);
            }
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(internal)?;

                image = Some(ImageUpload {
                    filename,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    match (nonempty(fullname), nonempty(email), nonempty(phone), image) {
        (Some(fullname), Some(email), Some(phone), Some(image)) => Ok(Submission {
            fullname,
            email,
            phone,
            image,
        }),
        _ => Err(AppError::MissingFields),
    }
}

fn internal(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Internal(Box::new(e))
}

fn nonempty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Runs the full admission sequence for one submission.
pub async fn admit(state: &AppState, submission: Submission) -> Result<(), AppError> {
    validate_image(&submission.image)?;

    if state.repo.email_exists(&submission.email).await? {
        return Err(AppError::DuplicateReferral);
    }

    if state.repo.count().await? >= MAX_REFERRALS {
        return Err(AppError::CapacityExceeded);
    }

    let bucket = &state.config.bucket;
    if !state.store.bucket_exists(bucket).await? {
        return Err(AppError::StorageMisconfigured(bucket.clone()));
    }

    let key = object_key(&submission.image.filename);
    info!(
        "Uploading image: {key}, type: {}, size: {}",
        submission.image.content_type,
        submission.image.bytes.len()
    );

    state
        .store
        .upload(
            bucket,
            &key,
            submission.image.bytes.clone(),
            &submission.image.content_type,
        )
        .await?;

    let image_url = state.store.public_url(bucket, &key);

    // If this insert fails the uploaded object stays behind. Accepted
    // leak: there is no cleanup pass.
    state
        .repo
        .insert(NewReferral {
            fullname: submission.fullname,
            email: submission.email.clone(),
            phone: submission.phone,
            image_url,
        })
        .await?;

    info!("Referral accepted for {}", submission.email);

    Ok(())
}

fn validate_image(image: &ImageUpload) -> Result<(), AppError> {
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::ImageTooLarge(image.bytes.len()));
    }

    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Err(AppError::UnsupportedImageType(image.content_type.clone()));
    }

    Ok(())
}

/// Collision-resistant object key: current time in milliseconds, then the
/// original filename. The filename is reduced to characters that are safe
/// in a URL path before it goes into the key.
fn object_key(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{}-{safe}", Utc::now().timestamp_millis())
}
