use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Person {
    pub id: i64,
    pub name: Option<String>,
    pub age_estimate: Option<i64>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub added_by: Option<i64>,
    pub created_at: String,
}

/// Values for a new `persons` row, already cleaned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPerson {
    pub name: Option<String>,
    pub age_estimate: Option<i64>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub added_by: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersonCreatedResponse {
    pub message: String,
    pub id: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}
