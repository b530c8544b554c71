use chrono::Utc;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::pictures;

/// The three derived sizes every picture carries. The name doubles as the
/// directory name on disk and as the filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantClass {
    Thumb,
    Medium,
    Original,
}

impl VariantClass {
    pub const ALL: [VariantClass; 3] = [Self::Thumb, Self::Medium, Self::Original];

    pub fn name(self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Medium => "medium",
            Self::Original => "original",
        }
    }
}

impl fmt::Display for VariantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Token namespacing one variant set: random UUID plus the unix timestamp of
/// allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseIdentifier(String);

impl BaseIdentifier {
    pub fn generate() -> Self {
        Self(format!("{}_{}", Uuid::new_v4().simple(), Utc::now().timestamp()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn filename(&self, class: VariantClass, extension: &str) -> String {
        format!("{}_{}.{}", self.0, class.name(), extension)
    }
}

impl fmt::Display for BaseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Filenames of one complete variant set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VariantSet {
    pub thumb: String,
    pub medium: String,
    pub original: String,
}

impl VariantSet {
    pub fn new(base: &BaseIdentifier, extension: &str) -> Self {
        Self {
            thumb: base.filename(VariantClass::Thumb, extension),
            medium: base.filename(VariantClass::Medium, extension),
            original: base.filename(VariantClass::Original, extension),
        }
    }

    pub fn filename(&self, class: VariantClass) -> &str {
        match class {
            VariantClass::Thumb => &self.thumb,
            VariantClass::Medium => &self.medium,
            VariantClass::Original => &self.original,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariantClass, &str)> {
        VariantClass::ALL
            .into_iter()
            .map(move |class| (class, self.filename(class)))
    }
}

impl From<&pictures::Model> for VariantSet {
    fn from(row: &pictures::Model) -> Self {
        Self {
            thumb: row.filename_thumb.clone(),
            medium: row.filename_medium.clone(),
            original: row.filename_original.clone(),
        }
    }
}
