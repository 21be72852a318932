//! Postgres-backed referral store.
//!
//! The table is append-only: rows are created once by the admission
//! workflow and never updated or deleted. Uniqueness per email and the
//! five-row cap are enforced by pre-insert reads, not by constraints,
//! so two concurrent submissions can race past both checks. That gap is
//! documented in DESIGN.md and left in place.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::error::AppError;

/// One referral as accepted by the admission workflow. The database
/// assigns `id` and `created_at`; nothing in the service reads them back.
#[derive(Debug, Clone)]
pub struct NewReferral {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub image_url: String,
}

#[async_trait]
pub trait ReferralRepo: Send + Sync {
    /// Exact-match lookup, case-sensitive.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    async fn insert(&self, referral: NewReferral) -> Result<(), AppError>;
}

pub struct PgReferralRepo {
    pool: PgPool,
}

impl PgReferralRepo {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ReferralRepo for PgReferralRepo {
    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM referrals WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(Box::new(e)))
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM referrals")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(Box::new(e)))
    }

    async fn insert(&self, referral: NewReferral) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO referrals (fullname, email, phone, image_url) VALUES ($1, $2, $3, $4)",
        )
        .bind(&referral.fullname)
        .bind(&referral.email)
        .bind(&referral.phone)
        .bind(&referral.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::InsertFailed(e.to_string()))?;

        Ok(())
    }
}
