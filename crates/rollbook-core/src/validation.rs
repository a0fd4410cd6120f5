//! Field checks the presentation layer runs before calling the store.
//!
//! The store only enforces uniqueness, existence and numeric ranges. Shape
//! checks such as email format, required text and course membership live
//! here so every front end applies the same rules.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::{NewRecord, RecordPatch};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // local@domain.tld, no whitespace, exactly one @
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("invalid email regex: {e}"))
});

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Rules that depend on configuration.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    /// Allowed course names. Empty means any course is accepted.
    pub courses: Vec<String>,
    /// Dates of birth after this day are rejected.
    pub today: Option<NaiveDate>,
}

impl Validator {
    pub fn new(courses: Vec<String>, today: NaiveDate) -> Self {
        Self {
            courses,
            today: Some(today),
        }
    }

    /// Check every field of a new record. Returns all violations at once.
    pub fn check_new(&self, record: &NewRecord) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        required(&mut out, "studentId", &record.record_id);
        required(&mut out, "name", &record.name);
        required(&mut out, "phone", &record.phone);
        self.email(&mut out, &record.email);
        self.course(&mut out, &record.course);
        year(&mut out, record.year);
        gpa(&mut out, record.gpa);
        if let Some(a) = record.attendance {
            attendance(&mut out, a);
        }
        if let Some(dob) = record.date_of_birth {
            self.birthdate(&mut out, dob);
        }
        out
    }

    /// Check only the fields a patch supplies.
    pub fn check_patch(&self, patch: &RecordPatch) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        if let Some(v) = &patch.record_id {
            required(&mut out, "studentId", v);
        }
        if let Some(v) = &patch.name {
            required(&mut out, "name", v);
        }
        if let Some(v) = &patch.phone {
            required(&mut out, "phone", v);
        }
        if let Some(v) = &patch.email {
            self.email(&mut out, v);
        }
        if let Some(v) = &patch.course {
            self.course(&mut out, v);
        }
        if let Some(v) = patch.year {
            year(&mut out, v);
        }
        if let Some(v) = patch.gpa {
            gpa(&mut out, v);
        }
        if let Some(&v) = patch.attendance.as_set() {
            attendance(&mut out, v);
        }
        if let Some(&v) = patch.date_of_birth.as_set() {
            self.birthdate(&mut out, v);
        }
        out
    }

    fn email(&self, out: &mut Vec<FieldViolation>, email: &str) {
        if !is_valid_email(email) {
            out.push(FieldViolation::new("email", "must look like name@domain.tld"));
        }
    }

    fn course(&self, out: &mut Vec<FieldViolation>, course: &str) {
        if course.trim().is_empty() {
            out.push(FieldViolation::new("course", "is required"));
        } else if !self.courses.is_empty() && !self.courses.iter().any(|c| c == course) {
            out.push(FieldViolation::new(
                "course",
                format!("must be one of: {}", self.courses.join(", ")),
            ));
        }
    }

    fn birthdate(&self, out: &mut Vec<FieldViolation>, dob: NaiveDate) {
        if let Some(today) = self.today {
            if dob > today {
                out.push(FieldViolation::new("dateOfBirth", "is in the future"));
            }
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

fn required(out: &mut Vec<FieldViolation>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        out.push(FieldViolation::new(field, "is required"));
    }
}

fn year(out: &mut Vec<FieldViolation>, year: u8) {
    if !(1..=4).contains(&year) {
        out.push(FieldViolation::new("year", "must be between 1 and 4"));
    }
}

fn gpa(out: &mut Vec<FieldViolation>, gpa: f64) {
    if !gpa.is_finite() || !(0.0..=10.0).contains(&gpa) {
        out.push(FieldViolation::new("gpa", "must be between 0 and 10"));
    }
}

fn attendance(out: &mut Vec<FieldViolation>, attendance: f64) {
    if !attendance.is_finite() || !(0.0..=100.0).contains(&attendance) {
        out.push(FieldViolation::new("attendance", "must be between 0 and 100"));
    }
}
