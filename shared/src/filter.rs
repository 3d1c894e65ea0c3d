//! Filter engine: user-entered predicates over the record store.
//!
//! Every criterion left empty matches everything; the populated ones are
//! ANDed together.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{parse_calendar_date, Admin, Complaint, ComplaintStatus};
use crate::validation::ValidationError;

pub trait Criteria<R> {
    fn matches(&self, record: &R) -> bool;

    fn is_match_all(&self) -> bool;
}

/// `applyFilters`: the records that satisfy `criteria`, in store order.
pub fn apply_filters<'a, R, C: Criteria<R>>(records: &'a [R], criteria: &C) -> Vec<&'a R> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

pub(crate) fn matching_indices<R, C: Criteria<R>>(records: &[R], criteria: &C) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Case-folded, trimmed substring match. An empty needle always matches.
#[must_use]
pub fn text_matches(field: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || field.trim().to_lowercase().contains(&needle)
}

/// Inclusive range check on a raw record date.
///
/// With no bound at all every record passes, even one whose date does not
/// parse. With any bound, an unparseable date fails.
#[must_use]
pub fn date_in_range(raw: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(date) = parse_calendar_date(raw) else {
        return false;
    };
    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintFilter {
    pub complaint_id: String,
    pub patient_name: String,
    pub complaint_type: String,
    pub description: String,
    pub status: Option<ComplaintStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Criteria<Complaint> for ComplaintFilter {
    fn matches(&self, c: &Complaint) -> bool {
        text_matches(c.id.as_str(), &self.complaint_id)
            && text_matches(&c.patient_name, &self.patient_name)
            && text_matches(&c.complaint_type, &self.complaint_type)
            && text_matches(&c.description, &self.description)
            && self.status.as_ref().map_or(true, |s| *s == c.status)
            && date_in_range(&c.date_submitted, self.date_from, self.date_to)
    }

    fn is_match_all(&self) -> bool {
        self.complaint_id.trim().is_empty()
            && self.patient_name.trim().is_empty()
            && self.complaint_type.trim().is_empty()
            && self.description.trim().is_empty()
            && self.status.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

/// Raw values as typed into the complaint filter panel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplaintFilterInput {
    pub complaint_id: String,
    pub patient_name: String,
    pub complaint_type: String,
    pub description: String,
    pub status: String,
    pub date_from: String,
    pub date_to: String,
}

impl TryFrom<ComplaintFilterInput> for ComplaintFilter {
    type Error = ValidationError;

    fn try_from(input: ComplaintFilterInput) -> Result<Self, Self::Error> {
        let status = match input.status.trim() {
            "" => None,
            raw => Some(ComplaintStatus::from(raw.to_string())),
        };
        let date_from = parse_bound(&input.date_from)?;
        let date_to = parse_bound(&input.date_to)?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(ValidationError::InvertedDateRange { from, to });
            }
        }

        Ok(Self {
            complaint_id: input.complaint_id,
            patient_name: input.patient_name,
            complaint_type: input.complaint_type,
            description: input.description,
            status,
            date_from,
            date_to,
        })
    }
}

fn parse_bound(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, crate::DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFilter {
    #[default]
    Any,
    #[serde(rename = "super")]
    SuperAdmin,
    Admin,
}

impl RoleFilter {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "super" => Self::SuperAdmin,
            "admin" => Self::Admin,
            _ => Self::Any,
        }
    }

    #[must_use]
    pub const fn accepts(self, is_super_admin: bool) -> bool {
        match self {
            Self::Any => true,
            Self::SuperAdmin => is_super_admin,
            Self::Admin => !is_super_admin,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminFilter {
    pub username: String,
    pub role: RoleFilter,
}

impl Criteria<Admin> for AdminFilter {
    fn matches(&self, a: &Admin) -> bool {
        text_matches(&a.username, &self.username) && self.role.accepts(a.is_super_admin)
    }

    fn is_match_all(&self) -> bool {
        self.username.trim().is_empty() && self.role == RoleFilter::Any
    }
}
