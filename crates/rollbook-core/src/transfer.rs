//! JSON and CSV codecs for export and import.
//!
//! Export writes the collection exactly as stored. Import is strict: the
//! payload must be a JSON array and every element must decode as a record,
//! otherwise nothing is imported.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::model::{Gender, Record};
use crate::store::{check_invariants, generate_internal_id};
use crate::thumbnail::Thumbnail;

/// Published CSV column order.
pub const CSV_HEADERS: [&str; 9] = [
    "Student ID",
    "Name",
    "Gender",
    "Email",
    "Phone",
    "Course",
    "Year",
    "GPA",
    "Enrollment Date",
];

/// Downloadable export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Artifact name for an export taken on `date`, e.g. `students_2024-05-01.csv`.
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("students_{}.{}", date.format("%Y-%m-%d"), self.extension())
    }

    /// Encode `records` in this format.
    pub fn encode(&self, records: &[Record]) -> Result<String> {
        match self {
            ExportFormat::Json => encode_json(records),
            ExportFormat::Csv => encode_csv(records),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Serialize the collection as a pretty-printed JSON array.
pub fn encode_json(records: &[Record]) -> Result<String> {
    serde_json::to_string_pretty(records)
        .map_err(|e| StoreError::Storage(format!("failed to serialize records: {e}")))
}

/// Serialize the collection as CSV. An empty collection yields an empty string.
///
/// Every field, header included, is double-quoted with embedded quotes doubled.
pub fn encode_csv(records: &[Record]) -> Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let csv_err = |e: csv::Error| StoreError::Storage(format!("failed to write CSV: {e}"));

    writer.write_record(CSV_HEADERS).map_err(csv_err)?;
    for r in records {
        let year = r.year.to_string();
        let gpa = r.gpa.to_string();
        let enrolled = r.enrollment_date.format("%Y-%m-%d").to_string();
        writer
            .write_record([
                r.record_id.as_str(),
                r.name.as_str(),
                r.gender.map(|g| g.as_str()).unwrap_or(""),
                r.email.as_str(),
                r.phone.as_str(),
                r.course.as_str(),
                year.as_str(),
                gpa.as_str(),
                enrolled.as_str(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Storage(format!("failed to flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Storage(format!("CSV is not UTF-8: {e}")))
}

/// Import-side record shape: identity and creation time may be missing and
/// are filled in on decode.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedRecord {
    #[serde(default)]
    id: Option<String>,
    student_id: String,
    name: String,
    #[serde(default)]
    gender: Option<Gender>,
    email: String,
    phone: String,
    course: String,
    year: u8,
    gpa: f64,
    enrollment_date: NaiveDate,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    attendance: Option<f64>,
    #[serde(default)]
    photo: Option<Thumbnail>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl ImportedRecord {
    fn into_record(self, now: DateTime<Utc>) -> Record {
        Record {
            internal_id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(generate_internal_id),
            record_id: self.student_id,
            name: self.name,
            gender: self.gender,
            email: self.email,
            phone: self.phone,
            course: self.course,
            year: self.year,
            gpa: self.gpa,
            enrollment_date: self.enrollment_date,
            date_of_birth: self.date_of_birth,
            attendance: self.attendance,
            photo: self.photo,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at,
        }
    }
}

/// Decode a JSON import payload into a full, validated collection.
pub fn decode_json(text: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| StoreError::ImportFormat(format!("not valid JSON: {e}")))?;

    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(StoreError::ImportFormat(format!(
                "expected an array of records, found {}",
                json_kind(&other)
            )))
        }
    };

    let now = Utc::now();
    let mut records = Vec::with_capacity(elements.len());
    let mut internal_ids = HashSet::new();
    let mut record_ids = HashSet::new();

    for (index, element) in elements.into_iter().enumerate() {
        let imported: ImportedRecord = serde_json::from_value(element)
            .map_err(|e| StoreError::ImportFormat(format!("element {index}: {e}")))?;
        let record = imported.into_record(now);

        check_invariants(&record)?;
        if !record_ids.insert(record.record_id.clone()) {
            return Err(StoreError::DuplicateKey {
                record_id: record.record_id,
            });
        }
        if !internal_ids.insert(record.internal_id.clone()) {
            return Err(StoreError::ImportFormat(format!(
                "element {index}: duplicate id {}",
                record.internal_id
            )));
        }
        records.push(record);
    }

    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
