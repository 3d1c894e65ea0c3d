//! CSV export of the current filtered view.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::model::Complaint;
use crate::{AppError, ErrorKind};

const HEADER: [&str; 7] = [
    "Complaint ID",
    "Patient Name",
    "Complaint Type",
    "Description",
    "Date Submitted",
    "Status",
    "Admin Comment",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("failed to finish CSV: {0}")]
    Flush(String),
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::new(ErrorKind::Serialization, e.to_string())
    }
}

/// A finished file the shell offers as a download.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
}

/// Every cell, header included, is quoted; embedded quotes are doubled.
pub fn export_csv(rows: &[&Complaint], date: NaiveDate) -> Result<CsvExport, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for c in rows {
        writer.write_record([
            c.id.as_str(),
            c.patient_name.as_str(),
            c.complaint_type.as_str(),
            c.description.as_str(),
            c.date_submitted.as_str(),
            c.status.label(),
            c.admin_comment.as_deref().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;

    Ok(CsvExport {
        filename: format!("complaints-{}.csv", date.format(crate::DATE_FORMAT)),
        contents: String::from_utf8(bytes)?,
    })
}
