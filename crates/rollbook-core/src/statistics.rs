//! Summary statistics and chart distributions.
//!
//! Everything here is a pure function of a record snapshot: no store
//! access, no persistence, no hidden state. Values that cannot be read as
//! numbers (a missing attendance figure, a missing birthdate, a non-finite
//! GPA) are skipped by distributions rather than reported as errors.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::model::Record;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    /// Mean GPA rounded to two decimals. Non-finite GPAs count as 0.
    pub average_gpa: f64,
    /// Highest GPA, 0 on an empty snapshot.
    pub max_gpa: f64,
    pub distinct_course_count: usize,
}

impl Summary {
    pub fn average_gpa_label(&self) -> String {
        format!("{:.2}", self.average_gpa)
    }

    pub fn max_gpa_label(&self) -> String {
        format!("{:.2}", self.max_gpa)
    }
}

/// Compute the headline numbers. An empty snapshot yields all zeros.
pub fn summarize(records: &[Record]) -> Summary {
    if records.is_empty() {
        return Summary {
            count: 0,
            average_gpa: 0.0,
            max_gpa: 0.0,
            distinct_course_count: 0,
        };
    }

    let gpas = records.iter().map(|r| finite_or_zero(r.gpa));
    let total: f64 = gpas.clone().sum();
    let max = gpas.fold(0.0_f64, f64::max);
    let courses: HashSet<&str> = records.iter().map(|r| r.course.as_str()).collect();

    Summary {
        count: records.len(),
        average_gpa: round2(total / records.len() as f64),
        max_gpa: round2(max),
        distinct_course_count: courses.len(),
    }
}

// ---------------------------------------------------------------------------
// Field selection
// ---------------------------------------------------------------------------

/// A numeric record field that can be bucketed or averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Gpa,
    Year,
    Attendance,
    /// Age in whole years on the given day.
    Age { as_of: NaiveDate },
}

impl NumericField {
    /// The field's value, or `None` if it is missing or not a usable number.
    pub fn value(&self, record: &Record) -> Option<f64> {
        match self {
            NumericField::Gpa => Some(record.gpa).filter(|v| v.is_finite()),
            NumericField::Year => Some(f64::from(record.year)),
            NumericField::Attendance => record.attendance.filter(|v| v.is_finite()),
            NumericField::Age { as_of } => {
                age_from_birthdate(record.date_of_birth, *as_of).map(f64::from)
            }
        }
    }
}

/// A record field tallied by exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Course,
    Gender,
    Year,
}

impl CategoryField {
    pub fn value(&self, record: &Record) -> String {
        match self {
            CategoryField::Course => record.course.clone(),
            CategoryField::Gender => record
                .gender
                .map(|g| g.to_string())
                .unwrap_or_else(|| "unspecified".to_string()),
            CategoryField::Year => record.year.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Ordered label → count mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    entries: Vec<(String, usize)>,
}

impl Distribution {
    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest single count, 0 when empty.
    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }

    fn with_labels(labels: &[String]) -> Self {
        Self {
            entries: labels.iter().map(|l| (l.clone(), 0)).collect(),
        }
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(label, count)| (label, count)))
    }
}

/// Fixed histogram buckets built from ascending boundaries.
///
/// `[a, b, c]` yields buckets `[a, b)` and `[b, c]`: every bucket is
/// half-open except the last, which includes its upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets {
    bounds: Vec<f64>,
    labels: Vec<String>,
}

impl Buckets {
    pub fn new(boundaries: &[f64]) -> Result<Self, ReportError> {
        if boundaries.len() < 2 {
            return Err(ReportError::InvalidBuckets(format!(
                "need at least 2 boundaries, got {}",
                boundaries.len()
            )));
        }
        if boundaries.iter().any(|b| !b.is_finite()) {
            return Err(ReportError::InvalidBuckets(
                "boundaries must be finite".to_string(),
            ));
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ReportError::InvalidBuckets(
                "boundaries must be strictly increasing".to_string(),
            ));
        }

        let labels = boundaries
            .windows(2)
            .map(|w| format!("{}-{}", w[0], w[1]))
            .collect();
        Ok(Self {
            bounds: boundaries.to_vec(),
            labels,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of the bucket holding `value`, or `None` if it falls outside.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        let last = self.labels.len() - 1;
        self.bounds.windows(2).enumerate().find_map(|(i, w)| {
            let inside = value >= w[0] && (value < w[1] || (i == last && value <= w[1]));
            inside.then_some(i)
        })
    }
}

/// Histogram of `field` over `buckets`. Every bucket is present, possibly
/// with a zero count; out-of-range and unreadable values are left out.
pub fn distribution_by_bucket(
    records: &[Record],
    field: NumericField,
    buckets: &Buckets,
) -> Distribution {
    let mut dist = Distribution::with_labels(buckets.labels());
    for value in records.iter().filter_map(|r| field.value(r)) {
        if let Some(i) = buckets.index_of(value) {
            dist.entries[i].1 += 1;
        }
    }
    dist
}

/// Tally of each distinct value of `field`, in first-seen order.
pub fn distribution_by_category(records: &[Record], field: CategoryField) -> Distribution {
    let mut dist = Distribution::default();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let label = field.value(record);
        match index.get(&label) {
            Some(&i) => dist.entries[i].1 += 1,
            None => {
                index.insert(label.clone(), dist.entries.len());
                dist.entries.push((label, 1));
            }
        }
    }
    dist
}

/// Mean of one category's numeric values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverage {
    pub category: String,
    /// Rounded to two decimals.
    pub average: f64,
}

/// Average of `numeric` grouped by `category`, in first-seen order.
/// Categories whose values are all unreadable are omitted.
pub fn average_by_category(
    records: &[Record],
    numeric: NumericField,
    category: CategoryField,
) -> Vec<CategoryAverage> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();

    for record in records {
        let Some(value) = numeric.value(record) else {
            continue;
        };
        let key = category.value(record);
        let entry = sums.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (0.0, 0)
        });
        entry.0 += value;
        entry.1 += 1;
    }

    order
        .into_iter()
        .filter_map(|category| {
            let (sum, n) = sums.get(&category).copied()?;
            Some(CategoryAverage {
                category,
                average: round2(sum / n as f64),
            })
        })
        .collect()
}

/// Whole years between `birthdate` and `as_of`, or `None` without a birthdate.
pub fn age_from_birthdate(birthdate: Option<NaiveDate>, as_of: NaiveDate) -> Option<i32> {
    let born = birthdate?;
    let mut age = as_of.year() - born.year();
    if (as_of.month(), as_of.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    Some(age)
}

// ---------------------------------------------------------------------------
// Dashboard bundle
// ---------------------------------------------------------------------------

/// Band boundaries used for the dashboard histograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_gpa_bands")]
    pub gpa_bands: Vec<f64>,
    #[serde(default = "default_attendance_bands")]
    pub attendance_bands: Vec<f64>,
    #[serde(default = "default_age_bands")]
    pub age_bands: Vec<f64>,
}

fn default_gpa_bands() -> Vec<f64> {
    vec![0.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
}

fn default_attendance_bands() -> Vec<f64> {
    vec![0.0, 50.0, 75.0, 90.0, 100.0]
}

fn default_age_bands() -> Vec<f64> {
    vec![15.0, 18.0, 21.0, 25.0, 30.0, 60.0]
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            gpa_bands: default_gpa_bands(),
            attendance_bands: default_attendance_bands(),
            age_bands: default_age_bands(),
        }
    }
}

/// Everything the dashboard charts, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub summary: Summary,
    pub gpa_bands: Distribution,
    pub attendance_bands: Distribution,
    pub age_bands: Distribution,
    pub by_course: Distribution,
    pub by_gender: Distribution,
    pub by_year: Distribution,
    pub average_gpa_by_course: Vec<CategoryAverage>,
}

impl Dashboard {
    pub fn build(
        records: &[Record],
        config: &ReportConfig,
        as_of: NaiveDate,
    ) -> Result<Self, ReportError> {
        let gpa = Buckets::new(&config.gpa_bands)?;
        let attendance = Buckets::new(&config.attendance_bands)?;
        let age = Buckets::new(&config.age_bands)?;

        Ok(Self {
            as_of,
            summary: summarize(records),
            gpa_bands: distribution_by_bucket(records, NumericField::Gpa, &gpa),
            attendance_bands: distribution_by_bucket(records, NumericField::Attendance, &attendance),
            age_bands: distribution_by_bucket(records, NumericField::Age { as_of }, &age),
            by_course: distribution_by_category(records, CategoryField::Course),
            by_gender: distribution_by_category(records, CategoryField::Gender),
            by_year: distribution_by_category(records, CategoryField::Year),
            average_gpa_by_course: average_by_category(
                records,
                NumericField::Gpa,
                CategoryField::Course,
            ),
        })
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
