use serde::{Deserialize, Serialize};

use super::{de_id, non_blank};
use crate::api::upload::{Attachment, UploadError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[serde(alias = "_id", deserialize_with = "de_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub pdf_url: Option<String>,
    pub pdf_name: Option<String>,
    pub created_at: Option<String>,
}

/// A notice about to be published. Unlike news, the PDF is mandatory.
#[derive(Debug, Clone)]
pub struct NoticeDraft {
    pub title: String,
    pub description: String,
    pub pdf: Option<Attachment>,
}

impl NoticeDraft {
    /// Check the draft and hand back the attachment to send.
    pub fn validate(&self) -> Result<&Attachment, UploadError> {
        if non_blank(&self.title).is_none() {
            return Err(UploadError::MissingField("title"));
        }
        if non_blank(&self.description).is_none() {
            return Err(UploadError::MissingField("description"));
        }
        self.pdf.as_ref().ok_or(UploadError::MissingFile("notice PDF"))
    }
}

/// JSON body for `PATCH /notices/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeUpdate {
    pub title: String,
    pub description: String,
    pub pdf_name: String,
    pub pdf_url: String,
}

impl NoticeUpdate {
    pub fn from_notice(notice: &Notice) -> Self {
        Self {
            title: notice.title.clone(),
            description: notice.description.clone(),
            pdf_name: notice.pdf_name.clone().unwrap_or_default(),
            pdf_url: notice.pdf_url.clone().unwrap_or_default(),
        }
    }
}
