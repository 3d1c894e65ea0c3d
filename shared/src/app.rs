use crate::capabilities::http::{self, HttpCapability};
use crate::capabilities::kv::{self, KvKey};
use crate::capabilities::{CapabilityError, Capabilities};
use crate::event::{Event, ListKind};
use crate::export::export_csv;
use crate::filter::{AdminFilter, ComplaintFilter};
use crate::gateway::{self, ApiRequest, ChatReply, GatewayReply, SessionReply};
use crate::model::{
    Admin, Complaint, ComplaintStatus, DeleteState, EditState, Model, Session, TrackedComplaint,
};
use crate::validation::{self, ValidationError};
use crate::view::ViewModel;
use crate::{local_today, AppError, ErrorKind};

#[derive(Default)]
pub struct App;

impl App {
    /// Sends `request`, surfacing a refusal to build it as an alert.
    fn send<F>(model: &mut Model, http: &HttpCapability, request: ApiRequest, make_event: F) -> bool
    where
        F: FnOnce(GatewayReply) -> Event + Send + 'static,
    {
        match http::send(http, &model.config, request, make_event) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "request not sent");
                model.show_error(&CapabilityError::from(e).into());
                false
            }
        }
    }

    fn fetch_complaints(model: &mut Model, caps: &Capabilities) {
        let generation = model.complaints.store_mut().begin_fetch();
        tracing::debug!(generation, "fetching complaints");
        let sent = Self::send(model, &caps.http, gateway::list_complaints(), move |reply| {
            Event::ComplaintsFetched { generation, reply }
        });
        if !sent {
            model.complaints.store_mut().reject(generation);
        }
    }

    fn fetch_admins(model: &mut Model, caps: &Capabilities) {
        let generation = model.admins.store_mut().begin_fetch();
        tracing::debug!(generation, "fetching admins");
        let sent = Self::send(model, &caps.http, gateway::list_admins(), move |reply| {
            Event::AdminsFetched { generation, reply }
        });
        if !sent {
            model.admins.store_mut().reject(generation);
        }
    }

    fn sidebar_key(model: &Model) -> Result<KvKey, AppError> {
        KvKey::new(model.config.sidebar_storage_key.clone())
            .map_err(|e| CapabilityError::from(e).into())
    }

    fn require_super_admin(model: &Model) -> Result<(), AppError> {
        if model.is_super_admin() {
            Ok(())
        } else {
            Err(AppError::new(
                ErrorKind::Authorization,
                "Admin management requires a super admin",
            ))
        }
    }

    fn handle_complaints_fetched(model: &mut Model, generation: u64, reply: GatewayReply) {
        if !model.complaints.store().is_current(generation) {
            tracing::debug!(
                generation,
                latest = model.complaints.store().latest_generation(),
                "discarding stale complaint list"
            );
            return;
        }

        match reply.into_json::<Vec<Complaint>>() {
            Ok(records) => {
                tracing::info!(generation, count = records.len(), "complaints loaded");
                model.complaints.accept(generation, records);
            }
            Err(e) => {
                tracing::error!(generation, error = %e, "failed to load complaints");
                model.complaints.store_mut().reject(generation);
                model.show_error(&e.into());
            }
        }
    }

    fn handle_admins_fetched(model: &mut Model, generation: u64, reply: GatewayReply) {
        if !model.admins.store().is_current(generation) {
            tracing::debug!(
                generation,
                latest = model.admins.store().latest_generation(),
                "discarding stale admin list"
            );
            return;
        }

        match reply.into_json::<Vec<Admin>>() {
            Ok(records) => {
                tracing::info!(generation, count = records.len(), "admins loaded");
                model.admins.accept(generation, records);
            }
            Err(e) => {
                tracing::error!(generation, error = %e, "failed to load admins");
                model.admins.store_mut().reject(generation);
                model.show_error(&e.into());
            }
        }
    }

    fn submit_edit(model: &mut Model, caps: &Capabilities, status: &str, comment: &str) {
        let EditState::Open { id, .. } = &model.edit else {
            tracing::debug!("edit submitted while no dialog is open; ignoring");
            return;
        };
        let id = id.clone();

        let status = match ComplaintStatus::parse_selectable(status) {
            Ok(status) => status,
            Err(e) => {
                model.show_error(&e.into());
                return;
            }
        };

        let request = match gateway::update_complaint(&id, &status, comment) {
            Ok(request) => request,
            Err(e) => {
                model.show_error(&e.into());
                return;
            }
        };

        if Self::send(model, &caps.http, request, |reply| Event::ComplaintUpdated { reply }) {
            tracing::info!(complaint_id = %id, status = %status, "updating complaint");
            model.edit = EditState::Submitting { id };
        }
    }

    fn handle_write_reply(
        model: &mut Model,
        reply: GatewayReply,
        fallback: &str,
        action: &'static str,
    ) -> bool {
        match reply.into_message(fallback) {
            Ok(message) => {
                tracing::info!(action, "write succeeded");
                model.show_info(message);
                true
            }
            Err(e) => {
                tracing::warn!(action, error = %e, "write failed");
                model.show_error(&e.into());
                false
            }
        }
    }

    fn change_page_size(model: &mut Model, list: ListKind, page_size: usize) {
        let result = match list {
            ListKind::Complaints => model.complaints.set_page_size(page_size),
            ListKind::Admins => model.admins.set_page_size(page_size),
        };
        if let Err(e) = result {
            model.show_error(&e.into());
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let _span = tracing::debug_span!("update", event = event.name()).entered();

        match event {
            Event::Noop => return,

            Event::AppStarted => {
                match Self::sidebar_key(model) {
                    Ok(key) => kv::load_sidebar(&caps.kv, &key),
                    Err(e) => tracing::warn!(error = %e, "sidebar preference unavailable"),
                }
                Self::send(model, &caps.http, gateway::check_super_admin(), |reply| {
                    Event::SessionChecked { reply }
                });
                Self::fetch_complaints(model, caps);
            }

            Event::Configure(config) => {
                let applied = config
                    .validate()
                    .map_err(AppError::from)
                    .and_then(|()| model.apply_config(*config).map_err(AppError::from));
                match applied {
                    Ok(()) => {
                        tracing::info!(api_base = %model.config.api_base, "configuration applied");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "rejected configuration");
                        model.show_error(&e);
                    }
                }
            }

            Event::SidebarToggled => {
                model.sidebar_collapsed = !model.sidebar_collapsed;
                match Self::sidebar_key(model) {
                    Ok(key) => kv::store_sidebar(&caps.kv, &key, model.sidebar_collapsed),
                    Err(e) => tracing::warn!(error = %e, "sidebar preference not saved"),
                }
            }

            Event::SidebarStateLoaded { value } => {
                let Some(bytes) = value else {
                    return;
                };
                let decoded = Self::sidebar_key(model).and_then(|key| {
                    kv::decode_flag(&key, &bytes).map_err(|e| CapabilityError::from(e).into())
                });
                match decoded {
                    Ok(collapsed) => model.sidebar_collapsed = collapsed,
                    Err(e) => tracing::warn!(error = %e, "ignoring stored sidebar preference"),
                }
            }

            Event::AlertDismissed => model.alert = None,

            Event::RefreshComplaints => Self::fetch_complaints(model, caps),

            Event::ComplaintsFetched { generation, reply } => {
                Self::handle_complaints_fetched(model, generation, reply);
            }

            Event::ComplaintFilterChanged(input) => match ComplaintFilter::try_from(input) {
                Ok(criteria) => model.complaints.set_criteria(criteria),
                Err(e) => model.show_error(&e.into()),
            },

            Event::ComplaintFiltersCleared => {
                model.complaints.set_criteria(ComplaintFilter::default());
            }

            Event::EditComplaintOpened { id } => {
                let opened = model.complaints.find(&id).map(|c| EditState::Open {
                    id: c.id.clone(),
                    status: c.status.clone(),
                    comment: c.admin_comment.clone().unwrap_or_default(),
                });
                match opened {
                    Some(state) if !matches!(model.edit, EditState::Submitting { .. }) => {
                        model.edit = state;
                    }
                    Some(_) => tracing::debug!("edit already in flight; ignoring"),
                    None => model.show_error(&AppError::new(
                        ErrorKind::NotFound,
                        format!("Complaint ID {} not found.", id.trim()),
                    )),
                }
            }

            Event::EditComplaintCancelled => {
                if matches!(model.edit, EditState::Open { .. }) {
                    model.edit = EditState::Closed;
                }
            }

            Event::EditComplaintSubmitted { status, comment } => {
                Self::submit_edit(model, caps, &status, &comment);
            }

            Event::ComplaintUpdated { reply } => {
                if !matches!(model.edit, EditState::Submitting { .. }) {
                    tracing::debug!("unexpected complaint update reply");
                }
                model.edit = EditState::Closed;
                if Self::handle_write_reply(
                    model,
                    reply,
                    "Complaint updated successfully",
                    "update_complaint",
                ) {
                    Self::fetch_complaints(model, caps);
                }
            }

            Event::ExportRequested => {
                let result = {
                    let rows = model.complaints.ordered();
                    export_csv(&rows, local_today()).map(|export| (rows.len(), export))
                };
                match result {
                    Ok((rows, export)) => {
                        tracing::info!(rows, filename = %export.filename, "export ready");
                        model.export = Some(export);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "export failed");
                        model.show_error(&e.into());
                    }
                }
            }

            Event::ExportDelivered => model.export = None,

            Event::TrackComplaintRequested { id } => {
                let id = id.trim();
                if id.is_empty() {
                    model.show_error(&ValidationError::EmptyComplaintId.into());
                } else {
                    model.tracked = Some(match model.complaints.find(id) {
                        Some(c) => TrackedComplaint::Found(c.id.clone()),
                        None => TrackedComplaint::NotFound(id.to_string()),
                    });
                }
            }

            Event::TrackComplaintCleared => model.tracked = None,

            Event::ChatComplaintSubmitted {
                patient_name,
                complaint_type,
                description,
            } => {
                if description.trim().is_empty() {
                    model.show_error(&ValidationError::EmptyDescription.into());
                } else {
                    match gateway::submit_chat_complaint(
                        patient_name.trim(),
                        complaint_type.trim(),
                        description.trim(),
                        local_today(),
                    ) {
                        Ok(request) => {
                            Self::send(model, &caps.http, request, |reply| {
                                Event::ChatComplaintAcknowledged { reply }
                            });
                        }
                        Err(e) => model.show_error(&e.into()),
                    }
                }
            }

            Event::ChatComplaintAcknowledged { reply } => match reply.into_json::<ChatReply>() {
                Ok(chat) => {
                    model.show_info(chat.fulfillment_text);
                    Self::fetch_complaints(model, caps);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "chat complaint failed");
                    model.show_error(&e.into());
                }
            },

            Event::PageSizeChanged { list, page_size } => {
                Self::change_page_size(model, list, page_size);
            }

            Event::NextPage { list } => {
                let moved = match list {
                    ListKind::Complaints => model.complaints.next_page(),
                    ListKind::Admins => model.admins.next_page(),
                };
                if !moved {
                    tracing::debug!(?list, "already on the last page");
                }
            }

            Event::PreviousPage { list } => {
                let moved = match list {
                    ListKind::Complaints => model.complaints.previous_page(),
                    ListKind::Admins => model.admins.previous_page(),
                };
                if !moved {
                    tracing::debug!(?list, "already on the first page");
                }
            }

            Event::SessionChecked { reply } => match reply.into_json::<SessionReply>() {
                Ok(reply) => {
                    tracing::info!(
                        username = %reply.username,
                        is_super_admin = reply.is_super_admin,
                        "session established"
                    );
                    model.session = Some(Session {
                        username: reply.username,
                        is_super_admin: reply.is_super_admin,
                    });
                    if reply.is_super_admin {
                        Self::fetch_admins(model, caps);
                    }
                }
                Err(e) => {
                    // Admin panels stay hidden; no alert for a background check.
                    tracing::error!(error = %e, "session check failed");
                    model.session = None;
                }
            },

            Event::RefreshAdmins => match Self::require_super_admin(model) {
                Ok(()) => Self::fetch_admins(model, caps),
                Err(e) => model.show_error(&e),
            },

            Event::AdminsFetched { generation, reply } => {
                Self::handle_admins_fetched(model, generation, reply);
            }

            Event::AdminFilterChanged(criteria) => model.admins.set_criteria(criteria),

            Event::AdminFiltersCleared => model.admins.set_criteria(AdminFilter::default()),

            Event::CreateAdminSubmitted { username, password } => {
                let request = Self::require_super_admin(model)
                    .and_then(|()| {
                        validation::validate_new_admin(&username, &password).map_err(AppError::from)
                    })
                    .and_then(|username| {
                        gateway::create_admin(&username, &password).map_err(AppError::from)
                    });
                match request {
                    Ok(request) => {
                        Self::send(model, &caps.http, request, |reply| {
                            Event::AdminCreated { reply }
                        });
                    }
                    Err(e) => model.show_error(&e),
                }
            }

            Event::AdminCreated { reply } => {
                if Self::handle_write_reply(
                    model,
                    reply,
                    "Admin added successfully",
                    "create_admin",
                ) {
                    Self::fetch_admins(model, caps);
                }
            }

            Event::DeleteAdminRequested { username } => {
                if matches!(model.admin_delete, DeleteState::Deleting { .. }) {
                    tracing::debug!("delete already in flight; ignoring");
                    return;
                }
                let checked = Self::require_super_admin(model).and_then(|()| {
                    validation::validate_deletion(model.session.as_ref(), &username)
                        .map_err(AppError::from)
                });
                match checked {
                    Ok(()) => model.admin_delete = DeleteState::Confirming { username },
                    Err(e) => model.show_error(&e),
                }
            }

            Event::DeleteAdminCancelled => {
                if matches!(model.admin_delete, DeleteState::Confirming { .. }) {
                    model.admin_delete = DeleteState::Idle;
                }
            }

            Event::DeleteAdminConfirmed => {
                let DeleteState::Confirming { username } = &model.admin_delete else {
                    tracing::debug!("delete confirmed with nothing pending; ignoring");
                    return;
                };
                let username = username.clone();
                match validation::validate_deletion(model.session.as_ref(), &username) {
                    Ok(()) => {
                        tracing::info!(username = %username, "deleting admin");
                        let request = gateway::delete_admin(&username);
                        if Self::send(model, &caps.http, request, |reply| {
                            Event::AdminDeleted { reply }
                        }) {
                            model.admin_delete = DeleteState::Deleting { username };
                        }
                    }
                    Err(e) => {
                        model.admin_delete = DeleteState::Idle;
                        model.show_error(&e.into());
                    }
                }
            }

            Event::AdminDeleted { reply } => {
                let previous = std::mem::take(&mut model.admin_delete);
                if Self::handle_write_reply(
                    model,
                    reply,
                    "Admin deleted successfully",
                    "delete_admin",
                ) {
                    Self::fetch_admins(model, caps);
                } else if let DeleteState::Deleting { username } = previous {
                    model.admin_delete = DeleteState::Confirming { username };
                }
            }

            Event::PasswordChangeSubmitted {
                current,
                new,
                confirm,
            } => {
                let request = validation::validate_password_change(&current, &new, &confirm)
                    .map_err(AppError::from)
                    .and_then(|()| {
                        gateway::update_password(&current, &new).map_err(AppError::from)
                    });
                match request {
                    Ok(request) => {
                        Self::send(model, &caps.http, request, |reply| {
                            Event::PasswordChanged { reply }
                        });
                    }
                    Err(e) => model.show_error(&e),
                }
            }

            Event::PasswordChanged { reply } => {
                Self::handle_write_reply(
                    model,
                    reply,
                    "Password updated successfully",
                    "update_password",
                );
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::build(model)
    }
}
