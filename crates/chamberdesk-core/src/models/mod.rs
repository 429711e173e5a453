//! Data models for association entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `Company` and `CompanyDraft`: member companies and the registration form
//! - `NewsItem`, `NewsDraft`, `NewsUpdate`: news posts with an optional image
//! - `Notice`, `NoticeDraft`, `NoticeUpdate`: notices with a PDF attachment
//! - `Envelope`: the `{"data": ...}` wrapper used by list and detail responses

pub mod company;
pub mod news;
pub mod notice;

use serde::{Deserialize, Deserializer};

pub use company::{
    BusinessNature, Company, CompanyDocuments, CompanyDraft, DocumentSlot, IndustryType,
    LeadershipGender, MembershipType, OrganizationType, RenewStatus, TaxId,
};
pub use news::{NewsDraft, NewsItem, NewsUpdate};
pub use notice::{Notice, NoticeDraft, NoticeUpdate};

/// Wrapper the backend puts around list and detail payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Accept a string, a number, or null, yielding an optional string.
///
/// Ids and numeric form fields come back from the backend in either form.
pub(crate) fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Like [`de_opt_string`] but for required ids; missing becomes empty.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_string(deserializer)?.unwrap_or_default())
}

/// Normalise a free-text form field: trim, and treat blank as absent.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
