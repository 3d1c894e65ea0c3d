//! Table renderer: ordering and escaped display rows.

use serde::Serialize;
use std::cmp::Ordering;

use crate::model::{parse_calendar_date, Admin, Complaint, Session};
use crate::{SYSTEM_LABEL, UNANSWERED_COMMENT_LABEL};

/// Order in which records are shown in their table.
pub trait DisplayOrder {
    fn display_cmp(&self, other: &Self) -> Ordering;
}

/// Newest first; undated records after every dated one.
impl DisplayOrder for Complaint {
    fn display_cmp(&self, other: &Self) -> Ordering {
        match (self.submitted_on(), other.submitted_on()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Bootstrap account first, then case-insensitive by username.
impl DisplayOrder for Admin {
    fn display_cmp(&self, other: &Self) -> Ordering {
        match (self.is_bootstrap(), other.is_bootstrap()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self
                .username
                .to_lowercase()
                .cmp(&other.username.to_lowercase())
                .then_with(|| self.username.cmp(&other.username)),
        }
    }
}

/// `"In Progress"` -> `"in-progress"`.
#[must_use]
pub fn status_token(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_html`] for the five entities it produces.
#[must_use]
pub fn unescape_html(input: &str) -> String {
    const ENTITIES: [(&str, char); 5] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
    ];

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComplaintRow {
    pub id: String,
    pub patient_name: String,
    pub complaint_type: String,
    pub description: String,
    pub date_submitted: String,
    pub status: String,
    pub status_token: String,
    pub admin_comment: String,
    pub unanswered: bool,
    /// Escaped id/status/comment for the edit button's callback attributes.
    pub edit_args: EditArgs,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditArgs {
    pub id: String,
    pub status: String,
    pub comment: String,
}

impl From<&Complaint> for ComplaintRow {
    fn from(c: &Complaint) -> Self {
        let comment = c.admin_comment.as_deref().unwrap_or_default();
        let unanswered = c.is_unanswered();
        Self {
            id: escape_html(c.id.as_str()),
            patient_name: escape_html(&c.patient_name),
            complaint_type: escape_html(&c.complaint_type),
            description: escape_html(&c.description),
            date_submitted: escape_html(&c.date_submitted),
            status: escape_html(c.status.label()),
            status_token: escape_html(&status_token(c.status.label())),
            admin_comment: if unanswered {
                UNANSWERED_COMMENT_LABEL.to_string()
            } else {
                escape_html(comment)
            },
            unanswered,
            edit_args: EditArgs {
                id: escape_html(c.id.as_str()),
                status: escape_html(c.status.label()),
                comment: escape_html(comment),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdminRow {
    pub username: String,
    pub role: &'static str,
    pub is_super_admin: bool,
    pub created_at: String,
    pub created_by: String,
    pub deletable: bool,
}

impl AdminRow {
    #[must_use]
    pub fn new(admin: &Admin, session: Option<&Session>) -> Self {
        Self {
            username: escape_html(&admin.username),
            role: if admin.is_super_admin { "Super Admin" } else { "Admin" },
            is_super_admin: admin.is_super_admin,
            created_at: created_at_display(admin.created_at.as_deref()),
            created_by: admin
                .created_by
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map_or_else(|| SYSTEM_LABEL.to_string(), escape_html),
            deletable: session.map_or(!admin.is_bootstrap(), |s| s.may_delete(&admin.username)),
        }
    }
}

fn created_at_display(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => SYSTEM_LABEL.to_string(),
        Some(s) if s.eq_ignore_ascii_case("system") => SYSTEM_LABEL.to_string(),
        Some(s) => parse_calendar_date(s)
            .map_or_else(|| escape_html(s), |d| d.format(crate::DATE_FORMAT).to_string()),
    }
}
