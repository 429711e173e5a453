use serde::{Deserialize, Serialize};

use super::{de_id, non_blank};
use crate::api::upload::{Attachment, UploadError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(alias = "_id", deserialize_with = "de_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    pub image_name: Option<String>,
    pub created_at: Option<String>,
}

impl NewsItem {
    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// A news post about to be published. The image is optional.
#[derive(Debug, Clone, Default)]
pub struct NewsDraft {
    pub title: String,
    pub description: String,
    pub image: Option<Attachment>,
}

impl NewsDraft {
    pub fn validate(&self) -> Result<(), UploadError> {
        if non_blank(&self.title).is_none() {
            return Err(UploadError::MissingField("title"));
        }
        if non_blank(&self.description).is_none() {
            return Err(UploadError::MissingField("description"));
        }
        Ok(())
    }
}

/// JSON body for `PATCH /news/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsUpdate {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub image_name: String,
}

impl NewsUpdate {
    pub fn from_item(item: &NewsItem) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone().unwrap_or_default(),
            image_name: item.image_name.clone().unwrap_or_default(),
        }
    }
}
