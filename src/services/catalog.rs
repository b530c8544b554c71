use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

use crate::entities::pictures;
use crate::services::variant_set::VariantSet;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Picture {0} not found")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Persistence(#[from] DbErr),
}

/// Validated, normalized picture fields. Optional strings are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureMetadata {
    pub creator: String,
    pub date: NaiveDate,
    pub project: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Gallery filters; every field is an exact match and absent means "any".
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GalleryFilter {
    /// Exact creator name
    pub creator: Option<String>,
    /// Calendar year of the picture date
    #[serde(default, deserialize_with = "deserialize_optional_year")]
    pub year: Option<i32>,
    /// Exact project name
    pub project: Option<String>,
    /// Exact color label
    pub color: Option<String>,
}

fn deserialize_optional_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(year) => year
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid year: {}", year))),
    }
}

/// Distinct values available for each gallery filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Facets {
    pub creators: Vec<String>,
    /// Newest first
    pub years: Vec<i32>,
    pub projects: Vec<String>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatedPicture {
    pub picture: pictures::Model,
    /// The variant set the row pointed to before, present only when a new
    /// set replaced it.
    pub superseded: Option<VariantSet>,
}

/// Durable record of pictures. Implementations never touch the filesystem.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn create(
        &self,
        variants: &VariantSet,
        metadata: &PictureMetadata,
    ) -> Result<pictures::Model, CatalogError>;

    async fn update(
        &self,
        id: i32,
        variants: Option<&VariantSet>,
        metadata: &PictureMetadata,
    ) -> Result<UpdatedPicture, CatalogError>;

    /// Removes the row and hands back the variant set it referenced.
    async fn delete(&self, id: i32) -> Result<VariantSet, CatalogError>;

    async fn find(&self, id: i32) -> Result<Option<pictures::Model>, CatalogError>;

    /// Ordered newest date first, ties broken by newest id.
    async fn list(&self, filter: &GalleryFilter) -> Result<Vec<pictures::Model>, CatalogError>;

    async fn facets(&self) -> Result<Facets, CatalogError>;
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub struct SeaOrmCatalog {
    db: DatabaseConnection,
}

impl SeaOrmCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Catalog for SeaOrmCatalog {
    async fn create(
        &self,
        variants: &VariantSet,
        metadata: &PictureMetadata,
    ) -> Result<pictures::Model, CatalogError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let picture = pictures::ActiveModel {
            filename_thumb: Set(variants.thumb.clone()),
            filename_medium: Set(variants.medium.clone()),
            filename_original: Set(variants.original.clone()),
            creator: Set(metadata.creator.clone()),
            date: Set(metadata.date),
            project: Set(metadata.project.clone()),
            color: Set(metadata.color.clone()),
            description: Set(metadata.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::debug!("Catalogued picture {} ({})", picture.id, picture.filename_original);
        Ok(picture)
    }

    async fn update(
        &self,
        id: i32,
        variants: Option<&VariantSet>,
        metadata: &PictureMetadata,
    ) -> Result<UpdatedPicture, CatalogError> {
        let txn = self.db.begin().await?;

        let existing = pictures::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        let superseded = variants.map(|_| VariantSet::from(&existing));

        let mut active: pictures::ActiveModel = existing.into();
        if let Some(set) = variants {
            active.filename_thumb = Set(set.thumb.clone());
            active.filename_medium = Set(set.medium.clone());
            active.filename_original = Set(set.original.clone());
        }
        active.creator = Set(metadata.creator.clone());
        active.date = Set(metadata.date);
        active.project = Set(metadata.project.clone());
        active.color = Set(metadata.color.clone());
        active.description = Set(metadata.description.clone());
        active.updated_at = Set(Utc::now());

        let picture = active.update(&txn).await?;
        txn.commit().await?;

        Ok(UpdatedPicture {
            picture,
            superseded,
        })
    }

    async fn delete(&self, id: i32) -> Result<VariantSet, CatalogError> {
        let txn = self.db.begin().await?;

        let existing = pictures::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        let variants = VariantSet::from(&existing);

        pictures::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(variants)
    }

    async fn find(&self, id: i32) -> Result<Option<pictures::Model>, CatalogError> {
        Ok(pictures::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list(&self, filter: &GalleryFilter) -> Result<Vec<pictures::Model>, CatalogError> {
        let mut query = pictures::Entity::find();

        if let Some(creator) = non_empty(&filter.creator) {
            query = query.filter(pictures::Column::Creator.eq(creator));
        }
        if let Some(project) = non_empty(&filter.project) {
            query = query.filter(pictures::Column::Project.eq(project));
        }
        if let Some(color) = non_empty(&filter.color) {
            query = query.filter(pictures::Column::Color.eq(color));
        }
        if let Some(year) = filter.year {
            let (Some(first), Some(last)) = (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year, 12, 31),
            ) else {
                return Ok(Vec::new());
            };
            query = query.filter(pictures::Column::Date.between(first, last));
        }

        Ok(query
            .order_by_desc(pictures::Column::Date)
            .order_by_desc(pictures::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn facets(&self) -> Result<Facets, CatalogError> {
        let creators: Vec<String> = pictures::Entity::find()
            .select_only()
            .column(pictures::Column::Creator)
            .distinct()
            .order_by_asc(pictures::Column::Creator)
            .into_tuple()
            .all(&self.db)
            .await?;

        let projects: Vec<String> = pictures::Entity::find()
            .select_only()
            .column(pictures::Column::Project)
            .distinct()
            .order_by_asc(pictures::Column::Project)
            .into_tuple()
            .all(&self.db)
            .await?;

        let colors: Vec<String> = pictures::Entity::find()
            .select_only()
            .column(pictures::Column::Color)
            .distinct()
            .filter(pictures::Column::Color.is_not_null())
            .filter(pictures::Column::Color.ne(""))
            .order_by_asc(pictures::Column::Color)
            .into_tuple()
            .all(&self.db)
            .await?;

        let dates: Vec<NaiveDate> = pictures::Entity::find()
            .select_only()
            .column(pictures::Column::Date)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await?;
        let years: BTreeSet<i32> = dates.iter().map(|d| d.year()).collect();

        Ok(Facets {
            creators,
            years: years.into_iter().rev().collect(),
            projects,
            colors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::infrastructure::database::setup_database;
    use crate::services::variant_set::BaseIdentifier;

    async fn catalog() -> SeaOrmCatalog {
        let config = GalleryConfig::development(std::env::temp_dir());
        SeaOrmCatalog::new(setup_database(&config).await.unwrap())
    }

    fn metadata(creator: &str, date: &str, project: &str, color: Option<&str>) -> PictureMetadata {
        PictureMetadata {
            creator: creator.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            project: project.to_string(),
            color: color.map(str::to_string),
            description: None,
        }
    }

    fn fresh_set(ext: &str) -> VariantSet {
        VariantSet::new(&BaseIdentifier::generate(), ext)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let catalog = catalog().await;
        let set = fresh_set("jpg");
        let meta = metadata("Ana", "2024-05-01", "Harbor", Some("blue"));

        let created = catalog.create(&set, &meta).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(VariantSet::from(&created), set);
        assert_eq!(created.created_at, created.updated_at);

        let found = catalog.find(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(catalog.find(created.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_returns_superseded_set_only_when_replaced() {
        let catalog = catalog().await;
        let original = fresh_set("png");
        let created = catalog
            .create(&original, &metadata("Ana", "2024-05-01", "Harbor", None))
            .await
            .unwrap();

        let renamed = metadata("Ana", "2024-05-02", "Harbor at night", Some("black"));
        let updated = catalog.update(created.id, None, &renamed).await.unwrap();
        assert!(updated.superseded.is_none());
        assert_eq!(updated.picture.project, "Harbor at night");
        assert_eq!(VariantSet::from(&updated.picture), original);
        assert!(updated.picture.updated_at >= created.updated_at);

        let replacement = fresh_set("png");
        let updated = catalog
            .update(created.id, Some(&replacement), &renamed)
            .await
            .unwrap();
        assert_eq!(updated.superseded, Some(original));
        assert_eq!(VariantSet::from(&updated.picture), replacement);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let catalog = catalog().await;
        let meta = metadata("Ana", "2024-05-01", "Harbor", None);

        assert!(matches!(
            catalog.update(42, Some(&fresh_set("gif")), &meta).await,
            Err(CatalogError::NotFound(42))
        ));
        assert!(matches!(catalog.delete(42).await, Err(CatalogError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_returns_referenced_set() {
        let catalog = catalog().await;
        let set = fresh_set("webp");
        let created = catalog
            .create(&set, &metadata("Ben", "2023-01-09", "Forest", None))
            .await
            .unwrap();

        assert_eq!(catalog.delete(created.id).await.unwrap(), set);
        assert!(catalog.find(created.id).await.unwrap().is_none());
        assert!(matches!(
            catalog.delete(created.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_order_and_filters() {
        let catalog = catalog().await;
        let a = catalog
            .create(&fresh_set("jpg"), &metadata("Ana", "2023-06-01", "Harbor", Some("blue")))
            .await
            .unwrap();
        let b = catalog
            .create(&fresh_set("jpg"), &metadata("Ben", "2024-02-10", "Forest", Some("green")))
            .await
            .unwrap();
        let c = catalog
            .create(&fresh_set("jpg"), &metadata("Ana", "2024-02-10", "Forest", None))
            .await
            .unwrap();

        let ids: Vec<i32> = catalog
            .list(&GalleryFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);

        let by_creator = catalog
            .list(&GalleryFilter {
                creator: Some("Ana".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_creator.iter().map(|p| p.id).collect::<Vec<_>>(), vec![c.id, a.id]);

        let by_year = catalog
            .list(&GalleryFilter {
                year: Some(2023),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_year.len(), 1);
        assert_eq!(by_year[0].id, a.id);

        let combined = catalog
            .list(&GalleryFilter {
                project: Some("Forest".to_string()),
                color: Some("green".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].id, b.id);

        let blank_is_ignored = catalog
            .list(&GalleryFilter {
                creator: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(blank_is_ignored.len(), 3);
    }

    #[test]
    fn test_blank_year_filter_is_ignored() {
        let filter: GalleryFilter =
            serde_json::from_value(serde_json::json!({ "year": "", "creator": "Ana" })).unwrap();
        assert_eq!(filter.year, None);

        let filter: GalleryFilter =
            serde_json::from_value(serde_json::json!({ "year": " 2024 " })).unwrap();
        assert_eq!(filter.year, Some(2024));

        let filter: GalleryFilter = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(filter.year, None);

        let invalid =
            serde_json::from_value::<GalleryFilter>(serde_json::json!({ "year": "soon" }));
        assert!(invalid.is_err());
    }

    #[tokio::test]
    async fn test_facets() {
        let catalog = catalog().await;
        assert_eq!(catalog.facets().await.unwrap(), Facets::default());

        for (creator, date, project, color) in [
            ("Ben", "2022-03-01", "Forest", Some("green")),
            ("Ana", "2024-07-01", "Harbor", Some("blue")),
            ("Ana", "2024-01-01", "Forest", None),
        ] {
            catalog
                .create(&fresh_set("jpg"), &metadata(creator, date, project, color))
                .await
                .unwrap();
        }

        let facets = catalog.facets().await.unwrap();
        assert_eq!(facets.creators, vec!["Ana", "Ben"]);
        assert_eq!(facets.years, vec![2024, 2022]);
        assert_eq!(facets.projects, vec!["Forest", "Harbor"]);
        assert_eq!(facets.colors, vec!["blue", "green"]);
    }
}
