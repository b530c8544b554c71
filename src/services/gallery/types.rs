use bytes::Bytes;
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::AppError;
use crate::entities::pictures;
use crate::services::catalog::PictureMetadata;
use crate::services::variant_set::VariantSet;
use crate::utils::validation::validate_date;

/// Picture fields as submitted, before validation.
#[derive(Debug, Clone, Default, Validate)]
pub struct PictureFields {
    #[validate(length(min = 1, max = 100, message = "Creator is required (max 100 characters)"))]
    pub creator: String,
    pub date: String,
    #[validate(length(min = 1, max = 100, message = "Project is required (max 100 characters)"))]
    pub project: String,
    #[validate(length(max = 50, message = "Color must be at most 50 characters"))]
    pub color: Option<String>,
    pub description: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PictureFields {
    /// Trims and validates every field. Blank optional fields become `None`.
    pub fn into_metadata(self) -> Result<PictureMetadata, AppError> {
        let fields = Self {
            creator: self.creator.trim().to_string(),
            date: self.date,
            project: self.project.trim().to_string(),
            color: blank_to_none(self.color),
            description: blank_to_none(self.description),
        };

        fields
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let date = validate_date(&fields.date)?;

        Ok(PictureMetadata {
            creator: fields.creator,
            date,
            project: fields.project,
            color: fields.color,
            description: fields.description,
        })
    }
}

/// Raw uploaded image plus the content type the client declared for it.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub declared_mime: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatedPicture {
    pub picture: pictures::Model,
    pub variants: VariantSet,
}

#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub picture: pictures::Model,
    pub image_replaced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub id: i32,
    pub deleted_files: usize,
    pub expected_files: usize,
}

/// One gallery entry: the stored row plus public URLs of its variants.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PictureRecord {
    pub id: i32,
    pub url_thumb: String,
    pub url_medium: String,
    pub url_original: String,
    pub creator: String,
    pub date: NaiveDate,
    pub project: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> PictureFields {
        PictureFields {
            creator: "  Ana  ".to_string(),
            date: "2024-05-01".to_string(),
            project: "Harbor".to_string(),
            color: Some("   ".to_string()),
            description: Some(String::new()),
        }
    }

    #[test]
    fn test_into_metadata_normalizes_fields() {
        let meta = fields().into_metadata().unwrap();
        assert_eq!(meta.creator, "Ana");
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(meta.color, None);
        assert_eq!(meta.description, None);
    }

    #[test]
    fn test_into_metadata_rejects_bad_fields() {
        let missing_creator = PictureFields {
            creator: " ".to_string(),
            ..fields()
        };
        assert!(matches!(missing_creator.into_metadata(), Err(AppError::Validation(_))));

        let long_project = PictureFields {
            project: "p".repeat(101),
            ..fields()
        };
        assert!(matches!(long_project.into_metadata(), Err(AppError::Validation(_))));

        let long_color = PictureFields {
            color: Some("c".repeat(51)),
            ..fields()
        };
        assert!(matches!(long_color.into_metadata(), Err(AppError::Validation(_))));

        let bad_date = PictureFields {
            date: "2024-02-30".to_string(),
            ..fields()
        };
        match bad_date.into_metadata() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("YYYY-MM-DD")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_length_limits_count_characters() {
        let accented = PictureFields {
            creator: "é".repeat(100),
            ..fields()
        };
        assert!(accented.into_metadata().is_ok());
    }
}
