//! Server-side render of the referral form page.
//!
//! The page template carries two tokens: a remaining-spots note and the
//! `limitReached` flag handed to the client script, which switches the
//! form into the terminal "sorry" display when the cap is already hit.

use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::{admission::MAX_REFERRALS, error::AppError, routes::fetch_status, state::AppState};

const TEMPLATE: &str = include_str!("../assets/index.html");

pub async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let status = fetch_status(&state).await?;

    Ok(Html(render(status.count, status.limit_reached)))
}

pub fn render(count: i64, limit_reached: bool) -> String {
    let note = if limit_reached {
        String::new()
    } else {
        let remaining = (MAX_REFERRALS - count).max(0);
        let noun = if remaining == 1 { "spot" } else { "spots" };
        format!("{remaining} {noun} remaining")
    };

    TEMPLATE
        .replace("{{REMAINING_NOTE}}", &note)
        .replace("{{LIMIT_REACHED}}", if limit_reached { "true" } else { "false" })
}
