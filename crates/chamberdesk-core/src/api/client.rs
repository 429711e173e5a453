//! API client for the association backend.
//!
//! This module provides the `ApiClient` struct for logging in, verifying the
//! session, and reading or changing companies, news and notices.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::upload::Attachment;
use super::ApiError;
use crate::auth::{Refusal, Verdict, Verifier};
use crate::config::Config;
use crate::models::{
    Company, CompanyDraft, Envelope, NewsDraft, NewsItem, NewsUpdate, Notice, NoticeDraft,
    NoticeUpdate,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for rate-limited (429) reads.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
}

/// API client for the association backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the configured backend
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config.base_url(), config.request_timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .request(Method::GET, path)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", path))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited.into());
                }
                warn!(path = path, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            let response = Self::check_response(response).await?;
            return response
                .json()
                .await
                .with_context(|| format!("Failed to parse JSON response from {}", path));
        }
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let envelope: Envelope<T> = self.get(path).await?;
        Ok(envelope.data)
    }

    /// Send a request whose response body we do not need.
    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<()> {
        let response = builder
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to {}", what))?;
        Self::check_response(response).await?;
        debug!(what, "Request succeeded");
        Ok(())
    }

    // ===== Session =====

    /// Log in and return the bearer token. The caller stores it.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send login request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match ApiError::server_message(&body) {
                Some(message) => ApiError::Rejected(message),
                None if matches!(status.as_u16(), 400 | 401 | 403 | 404) => ApiError::InvalidCredentials,
                None => ApiError::from_status(status, &body),
            }
            .into());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("login response: {}", e)))?;

        extract_token(&body)
            .ok_or_else(|| ApiError::InvalidResponse("login response carried no token".to_string()).into())
    }

    // ===== Companies =====

    /// Member companies from the public listing.
    pub async fn fetch_companies(&self) -> Result<Vec<Company>> {
        self.get_data("/company").await
    }

    /// Member companies as seen by staff; the dashboard counts come from here.
    pub async fn fetch_member_companies(&self) -> Result<Vec<Company>> {
        self.get_data("/company/public").await
    }

    pub async fn fetch_company(&self, id: &str) -> Result<Company> {
        self.get_data(&format!("/company/{}", id)).await
    }

    pub async fn create_company(&self, draft: &CompanyDraft) -> Result<()> {
        draft.validate()?;
        let form = company_form(draft)?;
        self.send(self.request(Method::POST, "/company").multipart(form), "create company")
            .await
    }

    pub async fn update_company(&self, id: &str, draft: &CompanyDraft) -> Result<()> {
        draft.validate()?;
        let form = company_form(draft)?;
        self.send(
            self.request(Method::PATCH, &format!("/company/{}", id)).multipart(form),
            "update company",
        )
        .await
    }

    // ===== News =====

    pub async fn fetch_news(&self) -> Result<Vec<NewsItem>> {
        self.get_data("/news").await
    }

    pub async fn fetch_news_item(&self, id: &str) -> Result<NewsItem> {
        self.get_data(&format!("/news/{}", id)).await
    }

    pub async fn create_news(&self, draft: &NewsDraft) -> Result<()> {
        draft.validate()?;
        let mut form = Form::new()
            .text("title", draft.title.trim().to_string())
            .text("description", draft.description.clone());
        if let Some(ref image) = draft.image {
            form = form.part("file", file_part(image)?);
        }
        self.send(self.request(Method::POST, "/news").multipart(form), "create news")
            .await
    }

    pub async fn update_news(&self, id: &str, update: &NewsUpdate) -> Result<()> {
        self.send(
            self.request(Method::PATCH, &format!("/news/{}", id)).json(update),
            "update news",
        )
        .await
    }

    pub async fn delete_news(&self, id: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/news/{}", id)), "delete news")
            .await
    }

    // ===== Notices =====

    pub async fn fetch_notices(&self) -> Result<Vec<Notice>> {
        self.get_data("/notices").await
    }

    pub async fn fetch_notice(&self, id: &str) -> Result<Notice> {
        self.get_data(&format!("/notices/{}", id)).await
    }

    pub async fn create_notice(&self, draft: &NoticeDraft) -> Result<()> {
        let pdf = draft.validate()?;
        let form = Form::new()
            .text("title", draft.title.trim().to_string())
            .text("description", draft.description.clone())
            .part("file", file_part(pdf)?);
        self.send(self.request(Method::POST, "/notices").multipart(form), "create notice")
            .await
    }

    pub async fn update_notice(&self, id: &str, update: &NoticeUpdate) -> Result<()> {
        self.send(
            self.request(Method::PATCH, &format!("/notices/{}", id)).json(update),
            "update notice",
        )
        .await
    }

    pub async fn delete_notice(&self, id: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/notices/{}", id)), "delete notice")
            .await
    }

    // ===== Documents =====

    /// Save a stored document into `dest_dir` as `<label>.jpg`.
    ///
    /// Document URLs point at file storage, so no bearer token is sent.
    pub async fn download_document(&self, url: &str, dest_dir: &Path, label: &str) -> Result<PathBuf> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to download document")?;
        let response = Self::check_response(response).await?;
        let bytes = response.bytes().await.context("Failed to read document body")?;

        tokio::fs::create_dir_all(dest_dir)
            .await
            .with_context(|| format!("Failed to create {}", dest_dir.display()))?;
        let path = dest_dir.join(format!("{}.jpg", file_stem(label)));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Document saved");
        Ok(path)
    }
}

#[async_trait]
impl Verifier for ApiClient {
    async fn verify(&self, token: &str) -> Verdict {
        let response = match self
            .client
            .get(self.url("/verify"))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Verdict::Refused(Refusal::Transport(e.to_string())),
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Verify endpoint refused token");
            return Verdict::Refused(Refusal::Rejected);
        }

        match response.json::<VerifyResponse>().await {
            Ok(body) if body.success => Verdict::Accepted,
            Ok(_) => Verdict::Refused(Refusal::Rejected),
            Err(e) => Verdict::Refused(Refusal::Transport(format!("malformed verify response: {}", e))),
        }
    }
}

/// Pull the bearer token out of a login response.
///
/// Accepted shapes: `"tok"`, `{"token": "tok"}`, `{"data": "tok"}`,
/// `{"data": {"token": "tok"}}`.
fn extract_token(body: &serde_json::Value) -> Option<String> {
    let token = match body {
        serde_json::Value::String(s) => Some(s.as_str()),
        serde_json::Value::Object(map) => map
            .get("token")
            .and_then(|v| v.as_str())
            .or_else(|| match map.get("data") {
                Some(serde_json::Value::String(s)) => Some(s.as_str()),
                Some(serde_json::Value::Object(data)) => data.get("token").and_then(|v| v.as_str()),
                _ => None,
            }),
        _ => None,
    };
    token.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

fn file_part(file: &Attachment) -> Result<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(file.mime)
        .context("Invalid attachment MIME type")
}

fn company_form(draft: &CompanyDraft) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in draft.form_fields() {
        form = form.text(name, value);
    }
    for (name, file) in draft.uploads() {
        form = form.part(name, file_part(file)?);
    }
    Ok(form)
}

/// Turn a document label into a safe file name stem.
fn file_stem(label: &str) -> String {
    let stem: String = label
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::test_server::{Reply, TestServer};
    use crate::auth::{GateState, SessionGate, TokenStore};
    use crate::api::UploadError;
    use crate::models::{DocumentSlot, TaxId};

    fn client_for(server: &TestServer) -> ApiClient {
        ApiClient::with_base_url(&server.base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_extract_token_shapes() {
        assert_eq!(extract_token(&serde_json::json!("abc")), Some("abc".to_string()));
        assert_eq!(extract_token(&serde_json::json!({"token": "abc"})), Some("abc".to_string()));
        assert_eq!(extract_token(&serde_json::json!({"data": "abc"})), Some("abc".to_string()));
        assert_eq!(
            extract_token(&serde_json::json!({"success": true, "data": {"token": "abc"}})),
            Some("abc".to_string())
        );
        assert_eq!(extract_token(&serde_json::json!({"token": "  "})), None);
        assert_eq!(extract_token(&serde_json::json!({"message": "ok"})), None);
        assert_eq!(extract_token(&serde_json::json!(42)), None);
    }

    #[test]
    fn test_file_stem_sanitizes_labels() {
        assert_eq!(file_stem("Citizenship Front"), "Citizenship_Front");
        assert_eq!(file_stem("../etc/passwd"), "___etc_passwd");
        assert_eq!(file_stem("  "), "document");
    }

    #[tokio::test]
    async fn test_verify_accepts_success_true() {
        let server = TestServer::start(vec![Reply::json(200, r#"{"success":true}"#)]).await;
        let verdict = client_for(&server).verify("abc").await;
        assert_eq!(verdict, Verdict::Accepted);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/verify");
        assert_eq!(requests[0].header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_verify_refuses_success_false() {
        let server = TestServer::start(vec![Reply::json(200, r#"{"success":false}"#)]).await;
        assert_eq!(client_for(&server).verify("expired").await, Verdict::Refused(Refusal::Rejected));
    }

    #[tokio::test]
    async fn test_verify_refuses_non_2xx_without_retry() {
        let server = TestServer::start(vec![Reply::json(401, r#"{"success":true}"#)]).await;
        assert_eq!(client_for(&server).verify("abc").await, Verdict::Refused(Refusal::Rejected));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_verify_malformed_body_is_not_accepted() {
        let server = TestServer::start(vec![Reply::json(200, "<html>gateway</html>")]).await;
        let verdict = client_for(&server).verify("abc").await;
        assert!(matches!(verdict, Verdict::Refused(Refusal::Transport(_))));
        assert!(!verdict.is_accepted());
    }

    #[tokio::test]
    async fn test_verify_unreachable_server_is_not_accepted() {
        let base_url = TestServer::unreachable_url().await;
        let client = ApiClient::with_base_url(&base_url, Duration::from_secs(2)).unwrap();
        let verdict = client.verify("abc").await;
        assert!(matches!(verdict, Verdict::Refused(Refusal::Transport(_))));
    }

    #[tokio::test]
    async fn test_gate_end_to_end_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TokenStore::new(dir.path().to_path_buf());

        // Scenario 1: empty store, nothing sent.
        let server = TestServer::start(vec![Reply::json(200, r#"{"success":true}"#)]).await;
        let mut gate = SessionGate::new(Arc::new(client_for(&server)), Duration::from_secs(2));
        assert_eq!(gate.mount(&store), GateState::Rejected);
        assert!(server.requests().is_empty());

        // Scenario 2: valid token.
        store.set("abc").unwrap();
        gate.mount(&store);
        assert_eq!(gate.settle().await, GateState::Accepted);
        assert_eq!(server.requests().len(), 1);

        // Scenario 3: expired token, store cleared by policy.
        let server = TestServer::start(vec![Reply::json(200, r#"{"success":false}"#)]).await;
        let mut gate = SessionGate::new(Arc::new(client_for(&server)), Duration::from_secs(2));
        store.set("expired").unwrap();
        gate.mount(&store);
        assert_eq!(gate.settle().await, GateState::Rejected);
        let snapshot = gate.snapshot().unwrap().to_string();
        store.clear_if_matches(&snapshot).unwrap();
        assert!(store.get().is_none());

        // Scenario 4: network error.
        let base_url = TestServer::unreachable_url().await;
        let client = ApiClient::with_base_url(&base_url, Duration::from_secs(2)).unwrap();
        let mut gate = SessionGate::new(Arc::new(client), Duration::from_secs(2));
        store.set("abc").unwrap();
        gate.mount(&store);
        assert_eq!(gate.settle().await, GateState::Rejected);
    }

    #[tokio::test]
    async fn test_gate_times_out_slow_verify() {
        let server = TestServer::start(vec![
            Reply::json(200, r#"{"success":true}"#).delayed(Duration::from_secs(3)),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let mut store = TokenStore::new(dir.path().to_path_buf());
        store.set("abc").unwrap();

        let mut gate = SessionGate::new(Arc::new(client_for(&server)), Duration::from_millis(100));
        gate.mount(&store);
        assert_eq!(gate.settle().await, GateState::Rejected);
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let server = TestServer::start(vec![Reply::json(200, r#"{"token":"tok-1"}"#)]).await;
        let token = client_for(&server).login("staff@example.org", "secret").await.unwrap();
        assert_eq!(token, "tok-1");

        let requests = server.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/login");
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["email"], "staff@example.org");
        assert_eq!(body["password"], "secret");
        assert_eq!(requests[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_login_failure_uses_server_message() {
        let server = TestServer::start(vec![Reply::json(401, r#"{"message":"Wrong password"}"#)]).await;
        let err = client_for(&server).login("staff@example.org", "nope").await.unwrap_err();
        let api = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api.user_message(), "Wrong password");
    }

    #[tokio::test]
    async fn test_login_failure_without_message_is_invalid_credentials() {
        let server = TestServer::start(vec![Reply::json(401, "")]).await;
        let err = client_for(&server).login("staff@example.org", "nope").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_fetch_member_companies_unwraps_envelope() {
        let server = TestServer::start(vec![Reply::json(
            200,
            r#"{"data":[{"id":1,"companyNameEng":"A","renewStatus":"Active"},{"id":2,"companyNameEng":"B","renewStatus":"Inactive"}]}"#,
        )])
        .await;
        let client = client_for(&server).with_token("abc");
        let companies = client.fetch_member_companies().await.unwrap();
        assert_eq!(companies.len(), 2);
        assert!(companies[0].is_active());

        let requests = server.requests();
        assert_eq!(requests[0].path, "/api/company/public");
        assert_eq!(requests[0].header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_delete_news_sends_bearer() {
        let server = TestServer::start(vec![Reply::json(200, r#"{"message":"deleted"}"#)]).await;
        client_for(&server).with_token("abc").delete_news("17").await.unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/api/news/17");
        assert_eq!(requests[0].header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_delete_notice_not_found_is_error() {
        let server = TestServer::start(vec![Reply::json(404, r#"{"message":"Notice not found"}"#)]).await;
        let err = client_for(&server).with_token("abc").delete_notice("9").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_company_sends_multipart() {
        let server = TestServer::start(vec![Reply::json(201, r#"{"message":"created"}"#)]).await;
        let mut draft = CompanyDraft {
            company_name_eng: "Himal Traders".to_string(),
            membership_no: "1042".to_string(),
            address: "Bazar".to_string(),
            tax_id: TaxId::Vat("300100200".to_string()),
            ..CompanyDraft::default()
        };
        draft.documents.photo = DocumentSlot::Upload(Attachment {
            file_name: "owner.png".to_string(),
            mime: "image/png",
            bytes: b"PNGDATA".to_vec(),
        });
        draft.documents.registration = DocumentSlot::Keep("https://files.example/reg.jpg".to_string());

        client_for(&server).with_token("abc").create_company(&draft).await.unwrap();

        let requests = server.requests();
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/company");
        assert!(request
            .header("content-type")
            .is_some_and(|ct| ct.starts_with("multipart/form-data")));
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("name=\"companyNameEng\""));
        assert!(body.contains("Himal Traders"));
        assert!(body.contains("name=\"photo\"; filename=\"owner.png\""));
        assert!(body.contains("name=\"registrationUrl\""));
        assert!(body.contains("PNGDATA"));
    }

    #[tokio::test]
    async fn test_create_company_rejects_incomplete_draft_locally() {
        let server = TestServer::start(vec![Reply::json(201, "{}")]).await;
        let draft = CompanyDraft {
            company_name_eng: "Himal Traders".to_string(),
            ..CompanyDraft::default()
        };
        let err = client_for(&server).with_token("abc").create_company(&draft).await.unwrap_err();
        assert!(err.downcast_ref::<UploadError>().is_some());
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_company_unwraps_detail() {
        let server = TestServer::start(vec![Reply::json(
            200,
            r#"{"data":{"_id":7,"companyNameEng":"Himal Traders","renewStatus":"Inactive","registrationUrl":"https://files.example/reg.jpg"}}"#,
        )])
        .await;
        let company = client_for(&server).with_token("abc").fetch_company("7").await.unwrap();
        assert_eq!(company.id, "7");
        assert_eq!(company.display_name(), "Himal Traders");
        assert!(!company.is_active());

        let requests = server.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/company/7");
        assert_eq!(requests[0].header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_update_company_keeps_documents_and_one_tax_id() {
        let server = TestServer::start(vec![Reply::json(200, r#"{"message":"updated"}"#)]).await;
        let company = Company {
            id: "7".to_string(),
            company_name_eng: Some("Himal Traders".to_string()),
            membership_no: Some("1042".to_string()),
            address: Some("Bazar".to_string()),
            vat: Some("300100200".to_string()),
            pan: Some("601234567".to_string()),
            registration_url: Some("https://files.example/reg.jpg".to_string()),
            ..Company::default()
        };
        let draft = CompanyDraft::from_company(&company);

        client_for(&server).with_token("abc").update_company("7", &draft).await.unwrap();

        let requests = server.requests();
        let request = &requests[0];
        assert_eq!(request.method, "PATCH");
        assert_eq!(request.path, "/api/company/7");
        assert!(request
            .header("content-type")
            .is_some_and(|ct| ct.starts_with("multipart/form-data")));
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("name=\"registrationUrl\"\r\n\r\nhttps://files.example/reg.jpg\r\n"));
        assert!(body.contains("name=\"vat\"\r\n\r\n300100200\r\n"));
        assert!(body.contains("name=\"pan\"\r\n\r\n\r\n"));
        assert!(!body.contains("filename="));
    }

    #[tokio::test]
    async fn test_fetch_news_item_unwraps_detail() {
        let server = TestServer::start(vec![Reply::json(
            200,
            r#"{"data":{"id":3,"title":"AGM 2081","description":"Annual general meeting"}}"#,
        )])
        .await;
        let item = client_for(&server).with_token("abc").fetch_news_item("3").await.unwrap();
        assert_eq!(item.id, "3");
        assert_eq!(item.title, "AGM 2081");

        let requests = server.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/news/3");
    }

    #[tokio::test]
    async fn test_create_news_image_is_optional() {
        let server = TestServer::start(vec![Reply::json(201, r#"{"message":"created"}"#)]).await;
        let client = client_for(&server).with_token("abc");

        let mut draft = NewsDraft {
            title: " AGM 2081 ".to_string(),
            description: "Annual general meeting".to_string(),
            image: None,
        };
        client.create_news(&draft).await.unwrap();

        draft.image = Some(Attachment {
            file_name: "agm.jpg".to_string(),
            mime: "image/jpeg",
            bytes: b"JPEGDATA".to_vec(),
        });
        client.create_news(&draft).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.method, "POST");
            assert_eq!(request.path, "/api/news");
            assert_eq!(request.header("authorization"), Some("Bearer abc"));
        }

        let without = String::from_utf8_lossy(&requests[0].body);
        assert!(without.contains("name=\"title\"\r\n\r\nAGM 2081\r\n"));
        assert!(without.contains("name=\"description\""));
        assert!(!without.contains("name=\"file\""));

        let with = String::from_utf8_lossy(&requests[1].body);
        assert!(with.contains("name=\"file\"; filename=\"agm.jpg\""));
        assert!(with.contains("JPEGDATA"));
    }

    #[tokio::test]
    async fn test_create_news_rejects_blank_title_locally() {
        let server = TestServer::start(vec![Reply::json(201, "{}")]).await;
        let draft = NewsDraft {
            title: "  ".to_string(),
            description: "body".to_string(),
            image: None,
        };
        assert!(client_for(&server).with_token("abc").create_news(&draft).await.is_err());
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_news_sends_json() {
        let server = TestServer::start(vec![Reply::json(200, "{}")]).await;
        let update = NewsUpdate {
            title: "AGM".to_string(),
            description: "Moved to Friday".to_string(),
            image_url: "https://cdn.example/agm.jpg".to_string(),
            image_name: "agm.jpg".to_string(),
        };
        client_for(&server).with_token("abc").update_news("3", &update).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].method, "PATCH");
        assert_eq!(requests[0].path, "/api/news/3");
        assert!(requests[0]
            .header("content-type")
            .is_some_and(|ct| ct.starts_with("application/json")));
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["description"], "Moved to Friday");
        assert_eq!(body["imageUrl"], "https://cdn.example/agm.jpg");
        assert_eq!(body["imageName"], "agm.jpg");
    }

    #[tokio::test]
    async fn test_fetch_notice_unwraps_detail() {
        let server = TestServer::start(vec![Reply::json(
            200,
            r#"{"data":{"_id":"n5","title":"Holiday","pdfUrl":"https://cdn.example/n.pdf"}}"#,
        )])
        .await;
        let notice = client_for(&server).with_token("abc").fetch_notice("n5").await.unwrap();
        assert_eq!(notice.id, "n5");
        assert_eq!(notice.pdf_url.as_deref(), Some("https://cdn.example/n.pdf"));

        let requests = server.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/notices/n5");
    }

    #[tokio::test]
    async fn test_create_notice_rejects_missing_pdf_locally() {
        let server = TestServer::start(vec![Reply::json(201, "{}")]).await;
        let draft = NoticeDraft {
            title: "Holiday".to_string(),
            description: "Office closed".to_string(),
            pdf: None,
        };
        assert!(client_for(&server).with_token("abc").create_notice(&draft).await.is_err());
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_notice_sends_json() {
        let server = TestServer::start(vec![Reply::json(200, "{}")]).await;
        let update = NoticeUpdate {
            title: "Holiday".to_string(),
            description: "Office closed".to_string(),
            pdf_name: "n.pdf".to_string(),
            pdf_url: "https://cdn.example/n.pdf".to_string(),
        };
        client_for(&server).with_token("abc").update_notice("5", &update).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].method, "PATCH");
        assert_eq!(requests[0].path, "/api/notices/5");
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["pdfUrl"], "https://cdn.example/n.pdf");
    }

    #[tokio::test]
    async fn test_download_document_writes_file() {
        let server = TestServer::start(vec![Reply::raw(200, "image/jpeg", "JPEGBYTES")]).await;
        let dir = tempfile::tempdir().unwrap();
        let url = format!("{}/files/reg.jpg", server.base_url);

        let path = client_for(&server)
            .download_document(&url, dir.path(), "Registration")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("Registration.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"JPEGBYTES");
    }
}
