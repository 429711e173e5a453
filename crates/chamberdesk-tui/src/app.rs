//! Application state management for chamberdesk.
//!
//! This module contains the core `App` struct that manages all application
//! state: UI state, fetched data, the stored session token and the gate that
//! verifies it, and background task coordination.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use chamberdesk_core::api::{ApiClient, ApiError};
use chamberdesk_core::auth::{GateState, GateView, SessionGate, TokenStore, Verifier};
use chamberdesk_core::config::Config;
use chamberdesk_core::models::{Company, NewsItem, Notice};
use chamberdesk_core::stats::DashboardStats;
use chamberdesk_core::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Environment variable prefilling the login email.
pub const EMAIL_ENV: &str = "CHAMBERDESK_EMAIL";

/// Environment variable prefilling the login password.
pub const PASSWORD_ENV: &str = "CHAMBERDESK_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Companies,
    News,
    Notices,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Companies => "Companies",
            Tab::News => "News",
            Tab::Notices => "Notices",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Companies,
            Tab::Companies => Tab::News,
            Tab::News => Tab::Notices,
            Tab::Notices => Tab::Dashboard,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Notices,
            Tab::Companies => Tab::Dashboard,
            Tab::News => Tab::Companies,
            Tab::Notices => Tab::News,
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    ConfirmingDelete,
    ConfirmingLogout,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteKind {
    News,
    Notice,
}

impl DeleteKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeleteKind::News => "news",
            DeleteKind::Notice => "notice",
        }
    }
}

/// A delete waiting for the user to confirm it.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub kind: DeleteKind,
    pub id: String,
    pub title: String,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned fetch tasks back to the main loop.
enum RefreshResult {
    Companies(Vec<Company>),
    Stats(DashboardStats),
    News(Vec<NewsItem>),
    Notices(Vec<Notice>),
    CompanyDetail(Company),
    Deleted(DeleteKind, String),
    Downloaded(PathBuf),
    /// Signal that all refresh tasks have completed
    RefreshComplete,
    /// The backend answered 401 to a request made with the tagged token
    SessionExpired,
    Error(String),
}

/// A background result and the session token it was produced under.
struct TaggedResult {
    token: String,
    result: RefreshResult,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub store: TokenStore,
    pub api: ApiClient,
    pub gate: SessionGate,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Selection indices
    pub company_selection: usize,
    pub document_selection: usize,
    pub news_selection: usize,
    pub notice_selection: usize,

    // Fetched data
    pub companies: Vec<Company>,
    pub company_detail: Option<Company>,
    pub stats: Option<DashboardStats>,
    pub news: Vec<NewsItem>,
    pub notices: Vec<Notice>,
    pub pending_delete: Option<PendingDelete>,

    // Background task channel
    refresh_rx: mpsc::Receiver<TaggedResult>,
    refresh_tx: mpsc::Sender<TaggedResult>,

    pub status_message: Option<String>,
    pub refreshing: bool,
}

impl App {
    /// Create a new application instance from the user's config and data dir.
    pub fn new(config: Config) -> Result<Self> {
        debug!(api_url = %config.base_url(), "Config loaded");

        let data_dir = config.data_dir().unwrap_or_else(|_| PathBuf::from("./data"));
        let store = match TokenStore::load(data_dir.clone()) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "Failed to load stored token, starting logged out");
                TokenStore::new(data_dir)
            }
        };

        let api = ApiClient::new(&config)?;
        let verifier: Arc<dyn Verifier> = Arc::new(api.clone());
        Ok(Self::with_parts(config, store, api, verifier))
    }

    /// Assemble an app from already-built services.
    pub fn with_parts(
        config: Config,
        store: TokenStore,
        api: ApiClient,
        verifier: Arc<dyn Verifier>,
    ) -> Self {
        let gate = SessionGate::new(verifier, config.verify_timeout());
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = std::env::var(EMAIL_ENV)
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = std::env::var(PASSWORD_ENV).unwrap_or_default();

        Self {
            config,
            store,
            api,
            gate,

            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::List,
            search_query: String::new(),

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            company_selection: 0,
            document_selection: 0,
            news_selection: 0,
            notice_selection: 0,

            companies: Vec::new(),
            company_detail: None,
            stats: None,
            news: Vec::new(),
            notices: Vec::new(),
            pending_delete: None,

            refresh_rx: rx,
            refresh_tx: tx,

            status_message: None,
            refreshing: false,
        }
    }

    // =========================================================================
    // Session gate
    // =========================================================================

    /// Mount the gate in front of the protected views.
    ///
    /// Called at startup and after every login or logout.
    pub fn enter_protected(&mut self) {
        let state = self.gate.mount(&self.store);
        self.apply_gate_state(state);
    }

    pub fn gate_view(&self) -> GateView {
        self.gate.view()
    }

    fn apply_gate_state(&mut self, state: GateState) {
        match state {
            GateState::Unknown => {
                self.status_message = Some("Verifying session...".to_string());
            }
            GateState::Accepted => {
                info!("Session verified");
                self.status_message = None;
                if self.state == AppState::LoggingIn {
                    self.state = AppState::Normal;
                }
                self.refresh_all_background();
            }
            GateState::Rejected => {
                if let Some(snapshot) = self.gate.snapshot().map(str::to_string) {
                    match self.store.clear_if_matches(&snapshot) {
                        Ok(true) => info!("Cleared rejected session token"),
                        Ok(false) => debug!("Stored token changed since verification, keeping it"),
                        Err(e) => warn!(error = %e, "Failed to clear rejected session token"),
                    }
                }
                self.clear_data();
                self.status_message = None;
                self.start_login();
            }
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self.api.login(&email, &password).await {
            Ok(token) => {
                if let Err(e) = self.store.set(token) {
                    error!(error = %e, "Failed to save session token");
                    self.login_error = Some("Could not save the session. Check disk permissions.".to_string());
                    return Err(e);
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                self.enter_protected();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
                Err(e)
            }
        }
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Forget the session and route back to login through the gate.
    pub fn logout(&mut self) {
        info!("Logging out");
        self.gate.unmount();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session token");
        }
        self.login_password.clear();
        self.enter_protected();
    }

    fn clear_data(&mut self) {
        self.companies.clear();
        self.company_detail = None;
        self.stats = None;
        self.news.clear();
        self.notices.clear();
        self.pending_delete = None;
        self.company_selection = 0;
        self.document_selection = 0;
        self.news_selection = 0;
        self.notice_selection = 0;
        self.refreshing = false;
    }

    /// A client carrying the mounted session's token, plus that token for
    /// tagging results.
    fn authed_api(&self) -> Option<(ApiClient, String)> {
        let token = self.gate.snapshot()?.to_string();
        Some((self.api.with_token(token.clone()), token))
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task to refresh all lists and the dashboard.
    pub fn refresh_all_background(&mut self) {
        if self.gate.view() != GateView::Protected {
            debug!("Refresh skipped, session not verified");
            return;
        }
        let Some((api, token)) = self.authed_api() else {
            self.start_login();
            return;
        };

        info!("Starting background refresh of all data");
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            Self::execute_background_refresh(tx, api, token).await;
        });

        self.refreshing = true;
        self.status_message = Some("Refreshing data...".to_string());
    }

    async fn execute_background_refresh(tx: mpsc::Sender<TaggedResult>, api: ApiClient, token: String) {
        let (companies, members, news, notices) = futures::join!(
            api.fetch_companies(),
            api.fetch_member_companies(),
            api.fetch_news(),
            api.fetch_notices(),
        );

        let stats = members.map(|list| DashboardStats::from_companies(&list));

        Self::send_fetch_result(&tx, &token, "Companies", companies, RefreshResult::Companies).await;
        Self::send_fetch_result(&tx, &token, "Dashboard", stats, RefreshResult::Stats).await;
        Self::send_fetch_result(&tx, &token, "News", news, RefreshResult::News).await;
        Self::send_fetch_result(&tx, &token, "Notices", notices, RefreshResult::Notices).await;

        info!("Background refresh complete");
        Self::send_result(&tx, &token, RefreshResult::RefreshComplete).await;
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaggedResult>, token: &str, result: RefreshResult) {
        let tagged = TaggedResult {
            token: token.to_string(),
            result,
        };
        if let Err(e) = tx.send(tagged).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Helper to send a successful fetch result or an error
    async fn send_fetch_result<T, F>(
        tx: &mpsc::Sender<TaggedResult>,
        token: &str,
        name: &str,
        result: Result<T>,
        wrapper: F,
    ) where
        F: FnOnce(T) -> RefreshResult,
    {
        match result {
            Ok(data) => {
                debug!("{} fetched successfully", name);
                Self::send_result(tx, token, wrapper(data)).await;
            }
            Err(e) => Self::send_error(tx, token, name, &e).await,
        }
    }

    async fn send_error(tx: &mpsc::Sender<TaggedResult>, token: &str, name: &str, e: &anyhow::Error) {
        if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)) {
            warn!("{} refused with 401, session expired", name);
            Self::send_result(tx, token, RefreshResult::SessionExpired).await;
        } else {
            error!(error = %e, "{} failed", name);
            Self::send_result(tx, token, RefreshResult::Error(format!("{}: {}", name, api_message(e)))).await;
        }
    }

    /// Check for completed background tasks and gate verification.
    pub fn check_background_tasks(&mut self) {
        if let Some(state) = self.gate.poll() {
            self.apply_gate_state(state);
        }

        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_refresh_result(result);
        }
    }

    fn process_refresh_result(&mut self, tagged: TaggedResult) {
        // Only results produced under the currently verified session apply.
        if self.gate.view() != GateView::Protected || self.gate.snapshot() != Some(tagged.token.as_str()) {
            debug!("Dropping background result from another session");
            return;
        }
        let token = tagged.token;

        match tagged.result {
            RefreshResult::Companies(data) => {
                self.companies = data;
                self.company_selection = clamp_selection(self.company_selection, self.filtered_companies().len());
            }
            RefreshResult::Stats(stats) => {
                self.stats = Some(stats);
            }
            RefreshResult::News(data) => {
                self.news = data;
                self.news_selection = clamp_selection(self.news_selection, self.news.len());
            }
            RefreshResult::Notices(data) => {
                self.notices = data;
                self.notice_selection = clamp_selection(self.notice_selection, self.notices.len());
            }
            RefreshResult::CompanyDetail(company) => {
                self.company_detail = Some(company);
            }
            RefreshResult::Deleted(kind, id) => {
                match kind {
                    DeleteKind::News => {
                        self.news.retain(|n| n.id != id);
                        self.news_selection = clamp_selection(self.news_selection, self.news.len());
                    }
                    DeleteKind::Notice => {
                        self.notices.retain(|n| n.id != id);
                        self.notice_selection = clamp_selection(self.notice_selection, self.notices.len());
                    }
                }
                self.status_message = Some(format!("Deleted {}", kind.label()));
            }
            RefreshResult::Downloaded(path) => {
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            RefreshResult::RefreshComplete => {
                self.refreshing = false;
                if self.status_message.as_deref() == Some("Refreshing data...") {
                    self.status_message = None;
                }
            }
            RefreshResult::SessionExpired => {
                if self.store.get() == Some(token.as_str()) {
                    info!("Session expired, returning to login");
                    self.gate.unmount();
                    if let Err(e) = self.store.clear_if_matches(&token) {
                        warn!(error = %e, "Failed to clear expired session token");
                    }
                    self.enter_protected();
                }
            }
            RefreshResult::Error(msg) => {
                self.refreshing = false;
                self.status_message = Some(msg);
            }
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Load the full record for the selected company into the detail panel.
    pub fn open_company_detail(&mut self) {
        let Some(id) = self.selected_company().map(|c| c.id.clone()) else {
            return;
        };
        self.focus = Focus::Detail;
        self.document_selection = 0;
        if id.is_empty() {
            return;
        }
        let Some((api, token)) = self.authed_api() else {
            return;
        };

        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.fetch_company(&id).await {
                Ok(company) => Self::send_result(&tx, &token, RefreshResult::CompanyDetail(company)).await,
                Err(e) => Self::send_error(&tx, &token, "Company", &e).await,
            }
        });
    }

    /// Save the highlighted document of the shown company to the download directory.
    pub fn download_selected_document(&mut self) {
        let target = self.displayed_company().and_then(|company| {
            company
                .documents()
                .get(self.document_selection)
                .map(|(label, url)| (format!("{} {}", company.display_name(), label), url.to_string()))
        });
        let Some((label, url)) = target else {
            self.status_message = Some("No document selected".to_string());
            return;
        };
        let Some(token) = self.gate.snapshot().map(str::to_string) else {
            return;
        };

        let dest = download_dir();
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        debug!(%label, "Downloading document");
        tokio::spawn(async move {
            match api.download_document(&url, &dest, &label).await {
                Ok(path) => Self::send_result(&tx, &token, RefreshResult::Downloaded(path)).await,
                Err(e) => {
                    error!(error = %e, "Document download failed");
                    let message = format!("Download failed: {}", api_message(&e));
                    Self::send_result(&tx, &token, RefreshResult::Error(message)).await;
                }
            }
        });
        self.status_message = Some("Downloading...".to_string());
    }

    /// Ask for confirmation before deleting the selected news item or notice.
    pub fn request_delete(&mut self) {
        let pending = match self.current_tab {
            Tab::News => self.news.get(self.news_selection).map(|n| PendingDelete {
                kind: DeleteKind::News,
                id: n.id.clone(),
                title: n.title.clone(),
            }),
            Tab::Notices => self.notices.get(self.notice_selection).map(|n| PendingDelete {
                kind: DeleteKind::Notice,
                id: n.id.clone(),
                title: n.title.clone(),
            }),
            Tab::Dashboard | Tab::Companies => None,
        };
        if let Some(pending) = pending {
            self.pending_delete = Some(pending);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(pending) = self.pending_delete.take() else {
            return;
        };
        let Some((api, token)) = self.authed_api() else {
            self.start_login();
            return;
        };

        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let result = match pending.kind {
                DeleteKind::News => api.delete_news(&pending.id).await,
                DeleteKind::Notice => api.delete_notice(&pending.id).await,
            };
            match result {
                Ok(()) => Self::send_result(&tx, &token, RefreshResult::Deleted(pending.kind, pending.id)).await,
                Err(e) => Self::send_error(&tx, &token, "Delete", &e).await,
            }
        });
        self.status_message = Some("Deleting...".to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Views and selection
    // =========================================================================

    pub fn filtered_companies(&self) -> Vec<&Company> {
        let query = self.search_query.trim();
        self.companies
            .iter()
            .filter(|c| company_matches(c, query))
            .collect()
    }

    pub fn selected_company(&self) -> Option<&Company> {
        self.filtered_companies().get(self.company_selection).copied()
    }

    /// The company shown in the detail panel: the fetched record when it
    /// belongs to the selection, otherwise the list entry.
    pub fn displayed_company(&self) -> Option<&Company> {
        let selected = self.selected_company()?;
        match self.company_detail {
            Some(ref detail) if detail.id == selected.id => Some(detail),
            _ => Some(selected),
        }
    }

    /// Move the selection of the focused list by `delta` rows.
    pub fn move_selection(&mut self, delta: isize) {
        match (self.current_tab, self.focus) {
            (Tab::Companies, Focus::List) => {
                let len = self.filtered_companies().len();
                let next = step(self.company_selection, len, delta);
                if next != self.company_selection {
                    self.company_selection = next;
                    self.document_selection = 0;
                }
            }
            (Tab::Companies, Focus::Detail) => {
                let len = self.displayed_company().map(|c| c.documents().len()).unwrap_or(0);
                self.document_selection = step(self.document_selection, len, delta);
            }
            (Tab::News, _) => self.news_selection = step(self.news_selection, self.news.len(), delta),
            (Tab::Notices, _) => self.notice_selection = step(self.notice_selection, self.notices.len(), delta),
            (Tab::Dashboard, _) => {}
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.focus = Focus::List;
    }

    pub fn signed_in_as(&self) -> Option<&str> {
        match self.gate_view() {
            GateView::Protected => self.config.last_email.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn company_matches(company: &Company, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let field = |v: &Option<String>| v.as_deref().is_some_and(|s| contains_ignore_case(s, query));
    contains_ignore_case(company.display_name(), query)
        || field(&company.company_name_nep)
        || field(&company.registration_no)
        || field(&company.email)
        || field(&company.contact_person)
}

/// Move `current` by `delta` within `0..len`, saturating at both ends.
fn step(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

fn clamp_selection(current: usize, len: usize) -> usize {
    current.min(len.saturating_sub(1))
}

/// User-facing text for an error coming out of the API client.
fn api_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<ApiError>() {
        Some(api) => api.user_message(),
        None => e.to_string(),
    }
}

fn login_error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<ApiError>() {
        Some(api) => api.user_message(),
        None => format!("Login failed: {}", e),
    }
}

fn download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
