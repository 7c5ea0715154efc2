use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use crate::db::{clean_optional, numeric_value, round_cents, DonationRequest, DonationResponse};
use crate::AppState;

use super::error::ApiError;
use super::extract::Payload;

/// Record a donation. Every recorded donation is treated as paid.
///
/// POST /api/donate
pub async fn donate(
    State(state): State<Arc<AppState>>,
    Payload(request): Payload<DonationRequest>,
) -> Result<Json<DonationResponse>, ApiError> {
    let user_id = numeric_value(request.user_id.as_ref(), "user_id")?;
    let amount = round_cents(numeric_value(request.amount.as_ref(), "amount")?.unwrap_or(0.0));
    let donor_name = clean_optional(request.donor_name.as_deref());
    let message = clean_optional(request.message.as_deref());

    let result = sqlx::query(
        "INSERT INTO donations (user_id, donor_name, message, amount, paid_at) VALUES (?, ?, ?, ?, datetime('now'))",
    )
    .bind(user_id)
    .bind(&donor_name)
    .bind(&message)
    .bind(amount)
    .execute(&state.db)
    .await?;

    let id = result.last_insert_rowid();
    info!(donation_id = id, user_id = ?user_id, amount, "Donation recorded");

    Ok(Json(DonationResponse {
        message: "Donation recorded. Thank you!".to_string(),
        id,
    }))
}
