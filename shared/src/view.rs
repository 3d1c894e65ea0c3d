//! What the shell renders. Everything here is derived from the model on
//! every `view` call; nothing is cached.

use serde::Serialize;

use crate::export::CsvExport;
use crate::filter::Criteria;
use crate::local_today;
use crate::metrics::{compute_metrics, Metrics};
use crate::model::{
    Alert, AlertKind, ComplaintStatus, DeleteState, EditState, ListView, Model, TrackedComplaint,
};
use crate::pagination::{paginate, Page};
use crate::render::{AdminRow, ComplaintRow, DisplayOrder};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PagerView {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub info: String,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> From<(&Page<'_, T>, usize)> for PagerView {
    fn from((page, page_size): (&Page<'_, T>, usize)) -> Self {
        Self {
            page: page.page,
            total_pages: page.total_pages,
            page_size,
            info: page.info(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableView<Row> {
    pub rows: Vec<Row>,
    pub results_count: usize,
    pub total_count: usize,
    pub filtered: bool,
    /// False until the first successful fetch.
    pub loaded: bool,
    pub loading: bool,
    pub pager: PagerView,
}

impl<Row> TableView<Row> {
    fn build<R, C>(list: &ListView<R, C>, to_row: impl Fn(&R) -> Row) -> Self
    where
        R: DisplayOrder,
        C: Criteria<R>,
    {
        let ordered = list.ordered();
        let page = paginate(&ordered, list.page(), list.page_size());
        Self {
            rows: page.items.iter().map(|&r| to_row(r)).collect(),
            results_count: list.filtered_count(),
            total_count: list.store().records().len(),
            filtered: !list.criteria().is_match_all(),
            loaded: list.store().is_loaded(),
            loading: list.store().is_loading(),
            pager: PagerView::from((&page, list.page_size())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub username: String,
    pub is_super_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditDialogView {
    pub id: String,
    pub status: String,
    pub comment: String,
    pub submitting: bool,
    pub status_options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TrackedView {
    Found(ComplaintRow),
    NotFound { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub kind: AlertKind,
    pub message: String,
    pub code: Option<String>,
}

impl From<&Alert> for AlertView {
    fn from(alert: &Alert) -> Self {
        Self {
            kind: alert.kind,
            message: alert.message.clone(),
            code: alert.code.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub sidebar_collapsed: bool,
    pub session: Option<SessionView>,
    pub metrics: Metrics,
    pub complaints: TableView<ComplaintRow>,
    /// Present only for a super admin.
    pub admins: Option<TableView<AdminRow>>,
    pub edit: Option<EditDialogView>,
    /// Username awaiting delete confirmation.
    pub confirm_delete: Option<String>,
    pub deleting: bool,
    pub tracked: Option<TrackedView>,
    pub alert: Option<AlertView>,
    pub export: Option<CsvExport>,
    pub page_size_options: Vec<usize>,
}

fn not_found(id: &str) -> TrackedView {
    TrackedView::NotFound {
        message: format!("Complaint ID {id} not found."),
    }
}

impl ViewModel {
    #[must_use]
    pub fn build(model: &Model) -> Self {
        let session = model.session.as_ref();

        let edit = match &model.edit {
            EditState::Closed => None,
            EditState::Open {
                id,
                status,
                comment,
            } => Some(EditDialogView {
                id: id.to_string(),
                status: status.label().to_string(),
                comment: comment.clone(),
                submitting: false,
                status_options: status_options(),
            }),
            EditState::Submitting { id } => {
                let current = model.complaints.find(id.as_str());
                Some(EditDialogView {
                    id: id.to_string(),
                    status: current.map(|c| c.status.label().to_string()).unwrap_or_default(),
                    comment: current
                        .and_then(|c| c.admin_comment.clone())
                        .unwrap_or_default(),
                    submitting: true,
                    status_options: status_options(),
                })
            }
        };

        // A tracked complaint that vanished on reload reads as not found.
        let tracked = model.tracked.as_ref().map(|t| match t {
            TrackedComplaint::Found(id) => model.complaints.find(id.as_str()).map_or_else(
                || not_found(id.as_str()),
                |c| TrackedView::Found(ComplaintRow::from(c)),
            ),
            TrackedComplaint::NotFound(id) => not_found(id),
        });

        Self {
            sidebar_collapsed: model.sidebar_collapsed,
            session: session.map(|s| SessionView {
                username: s.username.clone(),
                is_super_admin: s.is_super_admin,
            }),
            metrics: compute_metrics(model.complaints.store().records(), Some(local_today())),
            complaints: TableView::build(&model.complaints, |c| ComplaintRow::from(c)),
            admins: model
                .is_super_admin()
                .then(|| TableView::build(&model.admins, |a| AdminRow::new(a, session))),
            edit,
            confirm_delete: model.admin_delete.username().map(str::to_string),
            deleting: matches!(model.admin_delete, DeleteState::Deleting { .. }),
            tracked,
            alert: model.alert.as_ref().map(AlertView::from),
            export: model.export.clone(),
            page_size_options: model.config.page_size_options.clone(),
        }
    }
}

fn status_options() -> Vec<String> {
    ComplaintStatus::SELECTABLE
        .iter()
        .map(|s| s.label().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Admin, Complaint, ComplaintId, Session};

    fn complaint(id: &str, date: &str, status: ComplaintStatus) -> Complaint {
        Complaint {
            id: ComplaintId::new(id),
            patient_name: format!("Patient {id}"),
            complaint_type: "Service Delay".into(),
            description: "Waited".into(),
            date_submitted: date.into(),
            status,
            admin_comment: None,
        }
    }

    fn model_with(records: Vec<Complaint>) -> Model {
        let mut model = Model::default();
        let generation = model.complaints.store_mut().begin_fetch();
        model.complaints.accept(generation, records);
        model
    }

    #[test]
    fn test_two_record_scenario() {
        let model = model_with(vec![
            complaint("1", "2024-01-01", ComplaintStatus::Pending),
            complaint("2", "2024-01-02", ComplaintStatus::Resolved),
        ]);
        let view = ViewModel::build(&model);
        assert_eq!(view.complaints.results_count, 2);
        assert_eq!(view.complaints.pager.info, "Page 1 of 1");
        assert!(!view.complaints.pager.has_previous);
        assert!(!view.complaints.pager.has_next);
        let ids: Vec<_> = view.complaints.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert!(!view.complaints.filtered);
        assert!(view.complaints.loaded);
    }

    #[test]
    fn test_ordering_spans_pages() {
        let mut model = model_with(
            (1..=12)
                .map(|d| {
                    complaint(&d.to_string(), &format!("2024-01-{d:02}"), ComplaintStatus::Pending)
                })
                .collect(),
        );
        model.complaints.set_page_size(5).unwrap();
        let view = ViewModel::build(&model);
        assert_eq!(view.complaints.rows[0].id, "12");
        assert_eq!(view.complaints.pager.info, "Page 1 of 3");
        assert!(view.complaints.pager.has_next);
    }

    #[test]
    fn test_admin_table_requires_super_admin() {
        let mut model = Model::default();
        assert!(ViewModel::build(&model).admins.is_none());

        model.session = Some(Session {
            username: "alice".into(),
            is_super_admin: true,
        });
        let generation = model.admins.store_mut().begin_fetch();
        model.admins.accept(
            generation,
            vec![
                Admin {
                    username: "zoe".into(),
                    is_super_admin: false,
                    created_at: None,
                    created_by: Some("admin".into()),
                },
                Admin {
                    username: "admin".into(),
                    is_super_admin: true,
                    created_at: Some("system".into()),
                    created_by: None,
                },
            ],
        );
        let admins = ViewModel::build(&model).admins.unwrap();
        assert_eq!(admins.rows[0].username, "admin");
        assert!(!admins.rows[0].deletable);
        assert!(admins.rows[1].deletable);
    }

    #[test]
    fn test_tracked_complaint_missing_after_reload() {
        let mut model =
            model_with(vec![complaint("CMP-1", "2024-01-01", ComplaintStatus::Pending)]);
        model.tracked = Some(TrackedComplaint::Found(ComplaintId::new("CMP-1")));
        assert!(matches!(ViewModel::build(&model).tracked, Some(TrackedView::Found(_))));

        let generation = model.complaints.store_mut().begin_fetch();
        model.complaints.accept(generation, vec![]);
        assert_eq!(
            ViewModel::build(&model).tracked,
            Some(TrackedView::NotFound {
                message: "Complaint ID CMP-1 not found.".into()
            })
        );
    }

    #[test]
    fn test_today_metric_uses_current_date_without_reload() {
        let today = local_today().format(crate::DATE_FORMAT).to_string();
        let model = model_with(vec![
            complaint("1", &today, ComplaintStatus::Pending),
            complaint("2", "2001-01-01", ComplaintStatus::Pending),
        ]);
        assert_eq!(ViewModel::build(&model).metrics.today, 1);
    }

    #[test]
    fn test_edit_dialog_offers_three_statuses() {
        let mut model = model_with(vec![]);
        model.edit = EditState::Open {
            id: ComplaintId::new("CMP-1"),
            status: ComplaintStatus::Pending,
            comment: String::new(),
        };
        let edit = ViewModel::build(&model).edit.unwrap();
        assert_eq!(edit.status_options, vec!["Pending", "In Progress", "Resolved"]);
        assert!(!edit.submitting);
    }
}
