//! Core data model types for rollbook.
//!
//! A [`Record`] is one student. Callers never build a `Record` directly:
//! they hand a [`NewRecord`] to the store, which assigns identity and
//! timestamps, and later send a [`RecordPatch`] to change it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::thumbnail::Thumbnail;

/// A stored student record.
///
/// Field order here is the persisted JSON field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Store-generated identity. Immutable, never reused.
    #[serde(rename = "id")]
    pub internal_id: String,
    /// Caller-supplied business key, unique among stored records.
    #[serde(rename = "studentId")]
    pub record_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub email: String,
    pub phone: String,
    pub course: String,
    /// Year of study, 1 through 4.
    pub year: u8,
    /// Grade point average on a 0–10 scale.
    pub gpa: f64,
    pub enrollment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Attendance percentage, 0–100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Thumbnail>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Gender as captured by the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Field values for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub record_id: String,
    pub name: String,
    pub gender: Option<Gender>,
    pub email: String,
    pub phone: String,
    pub course: String,
    pub year: u8,
    pub gpa: f64,
    pub enrollment_date: NaiveDate,
    pub date_of_birth: Option<NaiveDate>,
    pub attendance: Option<f64>,
    pub photo: Option<Thumbnail>,
}

/// What an update does to an optional field.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    /// Leave the stored value as it is.
    Keep,
    /// Store a new value.
    Set(T),
    /// Drop the stored value.
    Clear,
}

impl<T> Default for Change<T> {
    fn default() -> Self {
        Change::Keep
    }
}

impl<T> Change<T> {
    /// The new value, if this change sets one.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Change::Set(v) => Some(v),
            _ => None,
        }
    }

    /// `Set` when `value` is given, else `Clear` when `clear`, else `Keep`.
    pub fn from_parts(value: Option<T>, clear: bool) -> Self {
        match (value, clear) {
            (Some(v), _) => Change::Set(v),
            (None, true) => Change::Clear,
            (None, false) => Change::Keep,
        }
    }

    fn apply(self, slot: &mut Option<T>) {
        match self {
            Change::Keep => {}
            Change::Set(v) => *slot = Some(v),
            Change::Clear => *slot = None,
        }
    }
}

/// A partial update. `None` fields keep their stored value; optional
/// fields take a [`Change`] so they can also be cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub record_id: Option<String>,
    pub name: Option<String>,
    pub gender: Change<Gender>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub year: Option<u8>,
    pub gpa: Option<f64>,
    pub enrollment_date: Option<NaiveDate>,
    pub date_of_birth: Change<NaiveDate>,
    pub attendance: Change<f64>,
    pub photo: Change<Thumbnail>,
}

impl RecordPatch {
    /// Returns `true` if applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == RecordPatch::default()
    }

    /// Merge this patch over `record`, field by field.
    pub(crate) fn apply_to(self, record: &mut Record) {
        if let Some(v) = self.record_id {
            record.record_id = v;
        }
        if let Some(v) = self.name {
            record.name = v;
        }
        self.gender.apply(&mut record.gender);
        if let Some(v) = self.email {
            record.email = v;
        }
        if let Some(v) = self.phone {
            record.phone = v;
        }
        if let Some(v) = self.course {
            record.course = v;
        }
        if let Some(v) = self.year {
            record.year = v;
        }
        if let Some(v) = self.gpa {
            record.gpa = v;
        }
        if let Some(v) = self.enrollment_date {
            record.enrollment_date = v;
        }
        self.date_of_birth.apply(&mut record.date_of_birth);
        self.attendance.apply(&mut record.attendance);
        self.photo.apply(&mut record.photo);
    }
}

/// Exact-match filter over course and year. `None` or an empty course means
/// "no constraint on that field".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub course: Option<String>,
    pub year: Option<u8>,
}

impl RecordFilter {
    pub fn matches(&self, record: &Record) -> bool {
        let course_ok = match self.course.as_deref() {
            None | Some("") => true,
            Some(course) => record.course == course,
        };
        let year_ok = self.year.map_or(true, |year| record.year == year);
        course_ok && year_ok
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self.course.as_deref(), None | Some("")) && self.year.is_none()
    }
}

/// Field the canonical collection can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Gpa,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "gpa" => Ok(SortKey::Gpa),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortOrder::Ascending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            internal_id: "id-1".into(),
            record_id: "S1".into(),
            name: "Ada Lovelace".into(),
            gender: Some(Gender::Female),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            course: "Computer Science".into(),
            year: 2,
            gpa: 9.5,
            enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            date_of_birth: None,
            attendance: Some(92.0),
            photo: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn gender_display_and_parse() {
        assert_eq!(Gender::Female.to_string(), "female");
        assert_eq!("MALE".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn record_json_uses_published_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], "id-1");
        assert_eq!(json["studentId"], "S1");
        assert_eq!(json["enrollmentDate"], "2024-09-01");
        assert_eq!(json["gender"], "female");
        assert!(json.get("photo").is_none());
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn patch_keeps_unset_fields_and_photo() {
        let mut record = sample();
        record.photo = Some(Thumbnail::from_data_url("data:image/png;base64,AAAA").unwrap());
        let before_photo = record.photo.clone();

        let patch = RecordPatch {
            name: Some("Ada King".into()),
            gpa: Some(8.0),
            ..Default::default()
        };
        patch.apply_to(&mut record);

        assert_eq!(record.name, "Ada King");
        assert_eq!(record.gpa, 8.0);
        assert_eq!(record.email, "ada@example.com");
        assert_eq!(record.photo, before_photo);
    }

    #[test]
    fn patch_can_remove_photo() {
        let mut record = sample();
        record.photo = Some(Thumbnail::from_data_url("data:image/png;base64,AAAA").unwrap());
        RecordPatch {
            photo: Change::Clear,
            ..Default::default()
        }
        .apply_to(&mut record);
        assert!(record.photo.is_none());
    }

    #[test]
    fn patch_can_clear_optional_fields() {
        let mut record = sample();
        record.date_of_birth = NaiveDate::from_ymd_opt(2004, 3, 2);
        assert!(record.gender.is_some());
        assert!(record.attendance.is_some());

        let patch = RecordPatch {
            gender: Change::Clear,
            date_of_birth: Change::Clear,
            attendance: Change::Clear,
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut record);

        assert!(record.gender.is_none());
        assert!(record.date_of_birth.is_none());
        assert!(record.attendance.is_none());
        assert_eq!(record.name, "Ada Lovelace");
    }

    #[test]
    fn change_from_parts() {
        assert_eq!(Change::from_parts(Some(3), true), Change::Set(3));
        assert_eq!(Change::<u8>::from_parts(None, true), Change::Clear);
        assert_eq!(Change::<u8>::from_parts(None, false), Change::Keep);
    }

    #[test]
    fn empty_patch() {
        assert!(RecordPatch::default().is_empty());
        let patch = RecordPatch {
            year: Some(3),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn filter_treats_empty_course_as_unconstrained() {
        let record = sample();
        let filter = RecordFilter {
            course: Some(String::new()),
            year: None,
        };
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&record));

        let filter = RecordFilter {
            course: Some("Computer Science".into()),
            year: Some(3),
        };
        assert!(!filter.matches(&record));

        let filter = RecordFilter {
            course: Some("Computer Science".into()),
            year: Some(2),
        };
        assert!(filter.matches(&record));
    }

    #[test]
    fn sort_key_parse() {
        assert_eq!("Name".parse::<SortKey>().unwrap(), SortKey::Name);
        assert_eq!("gpa".parse::<SortKey>().unwrap(), SortKey::Gpa);
        assert!("email".parse::<SortKey>().is_err());
        assert_eq!(SortOrder::from_descending(true), SortOrder::Descending);
    }
}
