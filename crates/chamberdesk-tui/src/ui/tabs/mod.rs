//! Tab-specific content rendering.
//!
//! Each tab renders into the main content area. Tabs are only drawn once the
//! session gate has accepted the stored token.

pub mod companies;
pub mod dashboard;
pub mod news;
pub mod notices;
