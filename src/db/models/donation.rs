use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::{deserialize_optional_amount, deserialize_optional_id, Numeric};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: i64,
    pub user_id: Option<i64>,
    pub donor_name: Option<String>,
    pub message: Option<String>,
    pub amount: f64,
    /// Reserved for a payment QR reference; never written by the API
    pub upi_qr_url: Option<String>,
    pub paid_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DonationRequest {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub user_id: Option<Numeric<i64>>,
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Missing or blank amounts are stored as 0
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<Numeric<f64>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DonationResponse {
    pub message: String,
    pub id: i64,
}
