use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DashboardConfig;
use crate::export::CsvExport;
use crate::filter::{AdminFilter, ComplaintFilter, Criteria};
use crate::render::DisplayOrder;
use crate::validation::ValidationError;
use crate::{AppError, DEFAULT_PAGE_SIZE};

// --- Typed IDs ---

/// Complaint identifier as issued by the backend (`CMP-1234`).
///
/// Older records carry numeric ids, so both JSON strings and numbers are
/// accepted and held as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawComplaintId", into = "String")]
pub struct ComplaintId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawComplaintId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawComplaintId> for ComplaintId {
    fn from(raw: RawComplaintId) -> Self {
        match raw {
            RawComplaintId::Text(s) => Self(s),
            RawComplaintId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<ComplaintId> for String {
    fn from(id: ComplaintId) -> Self {
        id.0
    }
}

impl ComplaintId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Complaint status ---

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    /// Anything else the API sent, kept verbatim.
    Unrecognized(String),
}

impl ComplaintStatus {
    pub const SELECTABLE: [Self; 3] = [Self::Pending, Self::InProgress, Self::Resolved];

    /// Exact match on the wire labels; used for the edit form, which only
    /// offers the three workflow states.
    pub fn parse_selectable(s: &str) -> Result<Self, ValidationError> {
        match Self::from(s.to_string()) {
            Self::Unrecognized(other) => Err(ValidationError::UnknownStatus(other)),
            status => Ok(status),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Unrecognized(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for ComplaintStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pending" => Self::Pending,
            "In Progress" => Self::InProgress,
            "Resolved" => Self::Resolved,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<ComplaintStatus> for String {
    fn from(status: ComplaintStatus) -> Self {
        match status {
            ComplaintStatus::Unrecognized(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Records ---

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    #[serde(rename = "Patient_Name", default)]
    pub patient_name: String,
    #[serde(rename = "Complaint_Type", default)]
    pub complaint_type: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Date_Submitted", default)]
    pub date_submitted: String,
    #[serde(rename = "Status", default)]
    pub status: ComplaintStatus,
    #[serde(rename = "Admin_Comment", default)]
    pub admin_comment: Option<String>,
}

impl Complaint {
    /// Missing and empty comments both mean nobody has answered yet.
    #[must_use]
    pub fn is_unanswered(&self) -> bool {
        self.admin_comment.as_deref().map_or(true, str::is_empty)
    }

    #[must_use]
    pub fn submitted_on(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date_submitted)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub username: String,
    #[serde(default)]
    pub is_super_admin: bool,
    /// RFC 3339 timestamp, or the `"system"` sentinel for seeded accounts.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl Admin {
    #[must_use]
    pub fn is_bootstrap(&self) -> bool {
        self.username == crate::BOOTSTRAP_ADMIN
    }
}

/// Parses the date part of an ISO 8601 value.
///
/// Accepts plain `YYYY-MM-DD` as the API stores it, and full timestamps whose
/// first ten characters are such a date.
#[must_use]
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, crate::DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.date_naive());
    }
    let prefix = trimmed.get(..10)?;
    let rest = &trimmed[10..];
    if rest.starts_with('T') || rest.starts_with(' ') {
        NaiveDate::parse_from_str(prefix, crate::DATE_FORMAT).ok()
    } else {
        None
    }
}

// --- Record store ---

/// Last accepted list fetch, plus the generation bookkeeping that keeps a
/// slow, older reply from overwriting a newer one.
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    records: Vec<R>,
    issued: u64,
    pending: Option<u64>,
    loaded: bool,
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            issued: 0,
            pending: None,
            loaded: false,
        }
    }
}

impl<R> RecordStore<R> {
    /// Starts a fetch and returns its generation.
    pub fn begin_fetch(&mut self) -> u64 {
        self.issued += 1;
        self.pending = Some(self.issued);
        self.issued
    }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.issued
    }

    /// Replaces the records wholesale if `generation` is the latest issued.
    pub fn accept(&mut self, generation: u64, records: Vec<R>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.records = records;
        self.pending = None;
        self.loaded = true;
        true
    }

    /// Settles a failed fetch. Returns false for a stale generation.
    pub fn reject(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.pending = None;
        true
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    #[must_use]
    pub fn latest_generation(&self) -> u64 {
        self.issued
    }
}

// --- List view: store + criteria + pagination ---

#[derive(Debug, Clone)]
pub struct ListView<R, C> {
    store: RecordStore<R>,
    criteria: C,
    filtered: Vec<usize>,
    page: usize,
    page_size: usize,
}

impl<R, C: Default> Default for ListView<R, C> {
    fn default() -> Self {
        Self {
            store: RecordStore::default(),
            criteria: C::default(),
            filtered: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl<R, C> ListView<R, C>
where
    R: DisplayOrder,
    C: Criteria<R>,
{
    #[must_use]
    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<R> {
        &mut self.store
    }

    #[must_use]
    pub fn criteria(&self) -> &C {
        &self.criteria
    }

    /// Accepts a fetch result and re-applies the current criteria to it.
    /// Criteria and page survive a reload; the page is clamped on render.
    pub fn accept(&mut self, generation: u64, records: Vec<R>) -> bool {
        if !self.store.accept(generation, records) {
            return false;
        }
        self.refilter();
        true
    }

    pub fn set_criteria(&mut self, criteria: C) {
        self.criteria = criteria;
        self.refilter();
        self.page = 1;
    }

    fn refilter(&mut self) {
        self.filtered = crate::filter::matching_indices(self.store.records(), &self.criteria);
    }

    #[must_use]
    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    /// Filtered records in display order.
    #[must_use]
    pub fn ordered(&self) -> Vec<&R> {
        let records = self.store.records();
        let mut rows: Vec<&R> = self.filtered.iter().map(|&i| &records[i]).collect();
        rows.sort_by(|a, b| a.display_cmp(b));
        rows
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        crate::pagination::total_pages(self.filtered.len(), self.page_size)
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), ValidationError> {
        if page_size == 0 {
            return Err(ValidationError::InvalidPageSize(page_size));
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(())
    }

    pub fn next_page(&mut self) -> bool {
        let current = self.page.min(self.total_pages());
        if current < self.total_pages() {
            self.page = current + 1;
            true
        } else {
            self.page = current;
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        let current = self.page.min(self.total_pages());
        if current > 1 {
            self.page = current - 1;
            true
        } else {
            self.page = 1;
            false
        }
    }
}

impl ListView<Complaint, ComplaintFilter> {
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Complaint> {
        let wanted = id.trim();
        self.store
            .records()
            .iter()
            .find(|c| c.id.as_str() == wanted)
    }
}

// --- Session & workflows ---

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub is_super_admin: bool,
}

impl Session {
    /// Bootstrap account and the logged-in account are never deletable.
    #[must_use]
    pub fn may_delete(&self, username: &str) -> bool {
        username != crate::BOOTSTRAP_ADMIN && username != self.username
    }
}

/// Edit-complaint dialog: `Closed -> Open -> Submitting -> Closed`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Closed,
    Open {
        id: ComplaintId,
        status: ComplaintStatus,
        comment: String,
    },
    Submitting {
        id: ComplaintId,
    },
}

/// Delete-admin confirmation: `Idle -> Confirming -> Deleting -> Idle`.
/// A rejected delete goes back to `Confirming`, keeping the dialog up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DeleteState {
    #[default]
    Idle,
    Confirming {
        username: String,
    },
    Deleting {
        username: String,
    },
}

impl DeleteState {
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Confirming { username } | Self::Deleting { username } => Some(username),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackedComplaint {
    Found(ComplaintId),
    NotFound(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub code: Option<&'static str>,
}

impl Alert {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Info,
            message: message.into(),
            code: None,
        }
    }

    #[must_use]
    pub fn error(error: &AppError) -> Self {
        Self {
            kind: AlertKind::Error,
            message: error.user_facing_message(),
            code: Some(error.code()),
        }
    }
}

// --- Model ---

#[derive(Debug, Default)]
pub struct Model {
    pub config: DashboardConfig,
    pub sidebar_collapsed: bool,
    pub session: Option<Session>,
    pub complaints: ListView<Complaint, ComplaintFilter>,
    pub admins: ListView<Admin, AdminFilter>,
    pub edit: EditState,
    pub admin_delete: DeleteState,
    pub tracked: Option<TrackedComplaint>,
    pub alert: Option<Alert>,
    pub export: Option<CsvExport>,
}

impl Model {
    pub fn show_error(&mut self, error: &AppError) {
        self.alert = Some(Alert::error(error));
    }

    pub fn show_info(&mut self, message: impl Into<String>) {
        self.alert = Some(Alert::info(message));
    }

    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_super_admin)
    }

    /// Applies a validated configuration; list page sizes follow the new
    /// default.
    pub fn apply_config(&mut self, config: DashboardConfig) -> Result<(), ValidationError> {
        self.complaints.set_page_size(config.default_page_size)?;
        self.admins.set_page_size(config.default_page_size)?;
        self.config = config;
        Ok(())
    }
}
