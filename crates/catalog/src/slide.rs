use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nilecart_core::{impl_uuid_id, DomainError, DomainResult, Entity};

/// Slide identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(Uuid);

impl_uuid_id!(SlideId, "SlideId");

const DEFAULT_TITLE: &str = "New Arrival";
const DEFAULT_DESCRIPTION: &str = "Shop the collection";

/// Promotional carousel slide on the storefront landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub image: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Slide {
    /// Build a slide. The image is required; title and description fall back
    /// to stock copy when omitted or blank.
    pub fn new(
        image: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let image = image.into();
        if image.trim().is_empty() {
            return Err(DomainError::validation("slide image must not be empty"));
        }

        Ok(Self {
            id: SlideId::new(),
            image,
            title: non_blank(title).unwrap_or_else(|| DEFAULT_TITLE.into()),
            description: non_blank(description).unwrap_or_else(|| DEFAULT_DESCRIPTION.into()),
            created_at: now,
        })
    }
}

impl Entity for Slide {
    type Id = SlideId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
