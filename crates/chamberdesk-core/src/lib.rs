//! Core library for the chamberdesk association console.
//!
//! This crate holds everything that does not depend on the terminal:
//!
//! - `auth`: the stored bearer token and the session gate that verifies it
//! - `api`: the REST client for companies, news, notices and documents
//! - `models`: backend payloads and the drafts sent back
//! - `config`: persisted settings and directory locations
//! - `stats`: dashboard counts
//! - `utils`: display formatting helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod stats;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{GateState, GateView, SessionGate, TokenStore};
pub use config::Config;
pub use stats::DashboardStats;
