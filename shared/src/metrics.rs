//! Summary counts over the full complaint set.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::model::{Complaint, ComplaintStatus};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total_patients: usize,
    pub total_complaints: usize,
    pub pending: usize,
    pub resolved: usize,
    pub in_progress: usize,
    pub today: usize,
    /// Unanswered complaints, shown on the urgent card.
    pub urgent: usize,
    /// Same count as `urgent`, shown on the needs-comment card.
    pub needs_comment: usize,
}

/// Counts over every loaded record, independent of any filter.
///
/// `today` compares the raw submission date with `today` formatted as
/// `YYYY-MM-DD`; with no date known it is zero.
#[must_use]
pub fn compute_metrics(records: &[Complaint], today: Option<NaiveDate>) -> Metrics {
    let today = today.map(|d| d.format(crate::DATE_FORMAT).to_string());
    let mut patients = HashSet::new();
    let mut m = Metrics {
        total_complaints: records.len(),
        ..Metrics::default()
    };

    for c in records {
        patients.insert(c.patient_name.as_str());
        match c.status {
            ComplaintStatus::Pending => m.pending += 1,
            ComplaintStatus::InProgress => m.in_progress += 1,
            ComplaintStatus::Resolved => m.resolved += 1,
            ComplaintStatus::Unrecognized(_) => {}
        }
        if today.as_deref() == Some(c.date_submitted.as_str()) {
            m.today += 1;
        }
        if c.is_unanswered() {
            m.urgent += 1;
        }
    }

    m.total_patients = patients.len();
    m.needs_comment = m.urgent;
    m
}
