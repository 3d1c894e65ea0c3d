use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;

use crate::config::DashboardConfig;
use crate::filter::{AdminFilter, ComplaintFilterInput};
use crate::gateway::GatewayReply;

/// A password typed into one of the admin forms. Redacted in `Debug`,
/// zeroized on drop.
#[derive(Deserialize)]
#[serde(transparent)]
pub struct Password(pub(crate) SecretString);

impl Password {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::new(raw.into()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ListKind {
    Complaints,
    Admins,
}

#[derive(Debug, Deserialize)]
pub enum Event {
    Noop,

    // --- lifecycle ---
    AppStarted,
    Configure(Box<DashboardConfig>),
    SidebarToggled,
    SidebarStateLoaded {
        value: Option<Vec<u8>>,
    },
    AlertDismissed,

    // --- complaints ---
    RefreshComplaints,
    ComplaintsFetched {
        generation: u64,
        reply: GatewayReply,
    },
    ComplaintFilterChanged(ComplaintFilterInput),
    ComplaintFiltersCleared,
    EditComplaintOpened {
        id: String,
    },
    EditComplaintCancelled,
    EditComplaintSubmitted {
        status: String,
        comment: String,
    },
    ComplaintUpdated {
        reply: GatewayReply,
    },
    ExportRequested,
    ExportDelivered,
    TrackComplaintRequested {
        id: String,
    },
    TrackComplaintCleared,
    ChatComplaintSubmitted {
        patient_name: String,
        complaint_type: String,
        description: String,
    },
    ChatComplaintAcknowledged {
        reply: GatewayReply,
    },

    // --- paging, shared by both tables ---
    PageSizeChanged {
        list: ListKind,
        page_size: usize,
    },
    NextPage {
        list: ListKind,
    },
    PreviousPage {
        list: ListKind,
    },

    // --- admins ---
    SessionChecked {
        reply: GatewayReply,
    },
    RefreshAdmins,
    AdminsFetched {
        generation: u64,
        reply: GatewayReply,
    },
    AdminFilterChanged(AdminFilter),
    AdminFiltersCleared,
    CreateAdminSubmitted {
        username: String,
        password: Password,
    },
    AdminCreated {
        reply: GatewayReply,
    },
    DeleteAdminRequested {
        username: String,
    },
    DeleteAdminCancelled,
    DeleteAdminConfirmed,
    AdminDeleted {
        reply: GatewayReply,
    },
    PasswordChangeSubmitted {
        current: Password,
        new: Password,
        confirm: Password,
    },
    PasswordChanged {
        reply: GatewayReply,
    },
}

impl Event {
    /// Variant name for log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::SidebarToggled => "sidebar_toggled",
            Self::SidebarStateLoaded { .. } => "sidebar_state_loaded",
            Self::AlertDismissed => "alert_dismissed",
            Self::RefreshComplaints => "refresh_complaints",
            Self::ComplaintsFetched { .. } => "complaints_fetched",
            Self::ComplaintFilterChanged(_) => "complaint_filter_changed",
            Self::ComplaintFiltersCleared => "complaint_filters_cleared",
            Self::EditComplaintOpened { .. } => "edit_complaint_opened",
            Self::EditComplaintCancelled => "edit_complaint_cancelled",
            Self::EditComplaintSubmitted { .. } => "edit_complaint_submitted",
            Self::ComplaintUpdated { .. } => "complaint_updated",
            Self::ExportRequested => "export_requested",
            Self::ExportDelivered => "export_delivered",
            Self::TrackComplaintRequested { .. } => "track_complaint_requested",
            Self::TrackComplaintCleared => "track_complaint_cleared",
            Self::ChatComplaintSubmitted { .. } => "chat_complaint_submitted",
            Self::ChatComplaintAcknowledged { .. } => "chat_complaint_acknowledged",
            Self::PageSizeChanged { .. } => "page_size_changed",
            Self::NextPage { .. } => "next_page",
            Self::PreviousPage { .. } => "previous_page",
            Self::SessionChecked { .. } => "session_checked",
            Self::RefreshAdmins => "refresh_admins",
            Self::AdminsFetched { .. } => "admins_fetched",
            Self::AdminFilterChanged(_) => "admin_filter_changed",
            Self::AdminFiltersCleared => "admin_filters_cleared",
            Self::CreateAdminSubmitted { .. } => "create_admin_submitted",
            Self::AdminCreated { .. } => "admin_created",
            Self::DeleteAdminRequested { .. } => "delete_admin_requested",
            Self::DeleteAdminCancelled => "delete_admin_cancelled",
            Self::DeleteAdminConfirmed => "delete_admin_confirmed",
            Self::AdminDeleted { .. } => "admin_deleted",
            Self::PasswordChangeSubmitted { .. } => "password_change_submitted",
            Self::PasswordChanged { .. } => "password_changed",
        }
    }
}
