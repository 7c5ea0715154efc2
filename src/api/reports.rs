use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::db::{clean_optional, Person, ReportsQuery};
use crate::AppState;

use super::error::ApiError;

/// Failure of a list endpoint. Clients of these endpoints always expect an
/// array, so the body is `[]` and only the status carries the error.
#[derive(Debug)]
pub struct ListError(pub ApiError);

impl<E: Into<ApiError>> From<E> for ListError {
    fn from(err: E) -> Self {
        ListError(err.into())
    }
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        self.0.log();
        (self.0.status(), Json(Vec::<Person>::new())).into_response()
    }
}

/// List the persons reported by one user, newest first
///
/// GET /api/reports?user_id=
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportsQuery>,
) -> Result<Json<Vec<Person>>, ListError> {
    let user_id = clean_optional(query.user_id.as_deref())
        .ok_or_else(|| ApiError::validation_field("user_id", "user_id is required"))?;

    // Bound as text: `added_by` has integer affinity, so numeric text compares
    // as a number and anything else matches no rows
    let persons: Vec<Person> = sqlx::query_as(
        "SELECT * FROM persons WHERE added_by = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(persons))
}

