use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::db::{
    clean_optional, numeric_value, parse_optional_id, parse_optional_integer, NewPerson, NotNumeric,
    PersonCreatedResponse,
};
use crate::AppState;

use super::error::ApiError;

/// Multipart field carrying the photo
const IMAGE_FIELD: &str = "image";

/// Text fields of the report form, keyed by field name
#[derive(Debug, Default)]
struct PersonForm {
    fields: HashMap<String, String>,
}

impl PersonForm {
    fn text(&self, name: &str) -> Option<String> {
        clean_optional(self.fields.get(name).map(String::as_str))
    }

    fn raw(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Map the form onto a row without an image. Category is passed through
    /// for the store to check; numbers that do not parse cannot be written.
    fn into_new_person(self) -> Result<NewPerson, NotNumeric> {
        let age_estimate =
            numeric_value(parse_optional_integer(self.raw("age_estimate")).as_ref(), "age_estimate")?;
        let added_by = numeric_value(parse_optional_id(self.raw("added_by")).as_ref(), "added_by")?;

        Ok(NewPerson {
            name: self.text("person_name"),
            age_estimate,
            color: self.text("color_description"),
            category: self.text("category"),
            image_url: None,
            description: self.text("description"),
            address: self.text("address"),
            added_by,
        })
    }
}

/// Photo part as received, written only once the rest of the form is known good
struct PendingImage {
    file_name: String,
    data: Bytes,
}

/// Report a missing or at-risk person, with an optional photo
///
/// POST /api/upload/person
pub async fn upload_person(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PersonCreatedResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut form = PersonForm::default();
    let mut image: Option<PendingImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD && field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string).unwrap_or_default();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;

            // Browsers send an empty part when no file was picked
            if !file_name.is_empty() && !data.is_empty() && image.is_none() {
                image = Some(PendingImage { file_name, data });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        form.fields.insert(name, value);
    }

    let mut person = form.into_new_person()?;

    if let Some(pending) = image {
        let stored = state
            .uploads
            .save(Some(pending.file_name.as_str()), &pending.data)
            .await?;
        person.image_url = Some(stored.public_url());
    }

    let result = sqlx::query(
        "INSERT INTO persons (name, age_estimate, color, category, image_url, description, address, added_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&person.name)
    .bind(person.age_estimate)
    .bind(&person.color)
    .bind(&person.category)
    .bind(&person.image_url)
    .bind(&person.description)
    .bind(&person.address)
    .bind(person.added_by)
    .execute(&state.db)
    .await?;

    let id = result.last_insert_rowid();
    info!(
        person_id = id,
        added_by = ?person.added_by,
        has_image = person.image_url.is_some(),
        "Person reported"
    );

    Ok(Json(PersonCreatedResponse {
        message: "Person reported successfully".to_string(),
        id,
        image_url: person.image_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> PersonForm {
        PersonForm {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_blank_fields_become_null() {
        let person = form(&[
            ("person_name", "  "),
            ("age_estimate", ""),
            ("added_by", "0"),
            ("category", ""),
        ])
        .into_new_person()
        .unwrap();

        assert_eq!(person, NewPerson::default());
    }

    #[test]
    fn test_fields_are_mapped() {
        let person = form(&[
            ("person_name", " Ravi "),
            ("age_estimate", "70"),
            ("color_description", "grey shirt"),
            ("category", "elderly"),
            ("description", "last seen near the station"),
            ("address", "MG Road"),
            ("added_by", "3"),
        ])
        .into_new_person()
        .unwrap();

        assert_eq!(person.name.as_deref(), Some("Ravi"));
        assert_eq!(person.age_estimate, Some(70));
        assert_eq!(person.color.as_deref(), Some("grey shirt"));
        assert_eq!(person.category.as_deref(), Some("elderly"));
        assert_eq!(person.added_by, Some(3));
        assert_eq!(person.image_url, None);
    }

    #[test]
    fn test_category_is_not_checked_here() {
        let person = form(&[("category", "astronaut")]).into_new_person().unwrap();
        assert_eq!(person.category.as_deref(), Some("astronaut"));
    }

    #[test]
    fn test_zero_age_is_kept() {
        let person = form(&[("age_estimate", "0")]).into_new_person().unwrap();
        assert_eq!(person.age_estimate, Some(0));
    }

    #[test]
    fn test_non_numeric_numbers_cannot_be_written() {
        let err = form(&[("age_estimate", "about seventy")])
            .into_new_person()
            .unwrap_err();
        assert_eq!(err.field, "age_estimate");
        assert_eq!(err.value, "about seventy");

        let err = form(&[("added_by", "me")]).into_new_person().unwrap_err();
        assert_eq!(err.field, "added_by");
        assert!(matches!(ApiError::from(err), ApiError::Column(_)));
    }
}
