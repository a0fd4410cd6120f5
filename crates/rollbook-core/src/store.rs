//! The record store.
//!
//! [`RecordStore`] owns the canonical record collection and is the only
//! thing allowed to change it. Every successful mutation is followed by a
//! synchronous write of the full collection to the backing
//! [`KeyValueStore`]. If that write fails the mutation stays applied in
//! memory and the caller gets the persistence error; the next mutation
//! that persists successfully brings durable state back in line.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Utc;
use deunicode::deunicode;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{NewRecord, Record, RecordFilter, RecordPatch, SortKey, SortOrder};
use crate::storage::{KeyValueStore, STUDENTS_KEY};
use crate::thumbnail::DEFAULT_PHOTO_BUDGET;
use crate::transfer::{self, ExportFormat};

/// Canonical, persisted collection of student records.
#[derive(Debug)]
pub struct RecordStore<S: KeyValueStore> {
    records: Vec<Record>,
    storage: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Load the collection from `storage`. An absent key is an empty collection.
    pub fn open(storage: S) -> Result<Self> {
        let records = match storage.get(STUDENTS_KEY)? {
            None => Vec::new(),
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| StoreError::Corrupt(format!("not UTF-8: {e}")))?;
                transfer::decode_json(&text).map_err(|e| StoreError::Corrupt(e.to_string()))?
            }
        };
        info!(count = records.len(), "opened record store");
        Ok(Self { records, storage })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Create a record. Fails with `DuplicateKey` if the student ID is taken.
    pub fn add(&mut self, new: NewRecord) -> Result<Record> {
        if self.get_by_record_id(&new.record_id).is_some() {
            return Err(StoreError::DuplicateKey {
                record_id: new.record_id,
            });
        }

        let record = Record {
            internal_id: self.fresh_internal_id(),
            record_id: new.record_id,
            name: new.name,
            gender: new.gender,
            email: new.email,
            phone: new.phone,
            course: new.course,
            year: new.year,
            gpa: new.gpa,
            enrollment_date: new.enrollment_date,
            date_of_birth: new.date_of_birth,
            attendance: new.attendance,
            photo: new.photo,
            created_at: Utc::now(),
            updated_at: None,
        };
        check_invariants(&record)?;

        self.records.push(record.clone());
        info!(id = %record.internal_id, student_id = %record.record_id, "added record");
        self.persist()?;
        Ok(record)
    }

    /// Merge `patch` over the record with `internal_id`.
    pub fn update(&mut self, internal_id: &str, patch: RecordPatch) -> Result<Record> {
        let index = self.position(internal_id)?;

        if let Some(record_id) = patch.record_id.as_deref() {
            let taken = self
                .records
                .iter()
                .any(|r| r.record_id == record_id && r.internal_id != internal_id);
            if taken {
                return Err(StoreError::DuplicateKey {
                    record_id: record_id.to_string(),
                });
            }
        }

        let mut updated = self.records[index].clone();
        patch.apply_to(&mut updated);
        updated.updated_at = Some(Utc::now());
        check_invariants(&updated)?;

        self.records[index] = updated.clone();
        info!(id = %internal_id, student_id = %updated.record_id, "updated record");
        self.persist()?;
        Ok(updated)
    }

    /// Remove and return the record with `internal_id`.
    pub fn delete(&mut self, internal_id: &str) -> Result<Record> {
        let index = self.position(internal_id)?;
        let removed = self.records.remove(index);
        info!(id = %internal_id, student_id = %removed.record_id, "deleted record");
        self.persist()?;
        Ok(removed)
    }

    /// Remove every record whose internal ID is listed. Unknown IDs are
    /// ignored. Returns the number of records removed; persists once.
    pub fn bulk_delete<I, T>(&mut self, internal_ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let targets: HashSet<String> = internal_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();

        let before = self.records.len();
        self.records.retain(|r| !targets.contains(&r.internal_id));
        let removed = before - self.records.len();

        info!(requested = targets.len(), removed, "bulk delete");
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Replace the whole collection with the records in a JSON array.
    ///
    /// Nothing changes unless every element decodes.
    pub fn import_json(&mut self, text: &str) -> Result<usize> {
        let records = transfer::decode_json(text)?;
        let count = records.len();
        self.records = records;
        info!(count, "imported records");
        self.persist()?;
        Ok(count)
    }

    /// Reorder the canonical collection by name. Stable.
    pub fn sort_by_name(&mut self, ascending: bool) -> Result<()> {
        self.records.sort_by(|a, b| {
            let ord = collate(&a.name, &b.name);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        debug!(ascending, "sorted by name");
        self.persist()
    }

    /// Reorder the canonical collection by GPA. Non-finite GPAs sort as 0.
    pub fn sort_by_gpa(&mut self, ascending: bool) -> Result<()> {
        self.records.sort_by(|a, b| {
            let ord = gpa_or_zero(a.gpa).total_cmp(&gpa_or_zero(b.gpa));
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        debug!(ascending, "sorted by gpa");
        self.persist()
    }

    pub fn sort(&mut self, key: SortKey, order: SortOrder) -> Result<()> {
        match key {
            SortKey::Name => self.sort_by_name(order.is_ascending()),
            SortKey::Gpa => self.sort_by_gpa(order.is_ascending()),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Owned snapshot of the collection in its current order.
    pub fn all(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Borrowed view of the collection, for read-only consumers such as
    /// the report engine.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, internal_id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.internal_id == internal_id)
    }

    pub fn get_by_record_id(&self, record_id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.record_id == record_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct courses in first-seen order.
    pub fn courses(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.course.as_str()))
            .map(|r| r.course.clone())
            .collect()
    }

    /// Records whose name, student ID or email contains `query` ignoring
    /// case, or whose phone contains it verbatim. A blank query matches all.
    pub fn search(&self, query: &str) -> Vec<Record> {
        let needle = SearchNeedle::new(query);
        let hits: Vec<Record> = self
            .records
            .iter()
            .filter(|r| needle.matches(r))
            .cloned()
            .collect();
        debug!(query, hits = hits.len(), "search");
        hits
    }

    pub fn filter(&self, filter: &RecordFilter) -> Vec<Record> {
        self.records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Search and filter combined: the list view the UI renders.
    pub fn query(&self, search: &str, filter: &RecordFilter) -> Vec<Record> {
        let needle = SearchNeedle::new(search);
        self.records
            .iter()
            .filter(|r| needle.matches(r) && filter.matches(r))
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    pub fn export_json(&self) -> Result<String> {
        transfer::encode_json(&self.records)
    }

    pub fn export_csv(&self) -> Result<String> {
        transfer::encode_csv(&self.records)
    }

    pub fn export(&self, format: ExportFormat) -> Result<String> {
        format.encode(&self.records)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn position(&self, internal_id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.internal_id == internal_id)
            .ok_or_else(|| StoreError::NotFound {
                internal_id: internal_id.to_string(),
            })
    }

    fn fresh_internal_id(&self) -> String {
        loop {
            let id = generate_internal_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.records)
            .map_err(|e| StoreError::Storage(format!("failed to serialize records: {e}")))?;
        match self.storage.set(STUDENTS_KEY, &bytes) {
            Ok(()) => {
                debug!(bytes = bytes.len(), count = self.records.len(), "persisted");
                Ok(())
            }
            Err(e) => {
                let err = StoreError::from(e);
                warn!(error = %err, "persist failed; in-memory state kept");
                Err(err)
            }
        }
    }
}

/// New internal ID: a time-ordered UUID (v7) string.
pub(crate) fn generate_internal_id() -> String {
    Uuid::now_v7().to_string()
}

/// Invariants every stored record satisfies.
pub(crate) fn check_invariants(record: &Record) -> Result<()> {
    if record.record_id.trim().is_empty() {
        return Err(StoreError::InvalidField {
            field: "studentId",
            reason: "must not be blank".into(),
        });
    }
    if !(1..=4).contains(&record.year) {
        return Err(StoreError::InvalidField {
            field: "year",
            reason: format!("{} is outside 1-4", record.year),
        });
    }
    if !record.gpa.is_finite() || !(0.0..=10.0).contains(&record.gpa) {
        return Err(StoreError::InvalidField {
            field: "gpa",
            reason: format!("{} is outside 0-10", record.gpa),
        });
    }
    if let Some(attendance) = record.attendance {
        if !attendance.is_finite() || !(0.0..=100.0).contains(&attendance) {
            return Err(StoreError::InvalidField {
                field: "attendance",
                reason: format!("{attendance} is outside 0-100"),
            });
        }
    }
    if let Some(photo) = &record.photo {
        if photo.encoded_len() > DEFAULT_PHOTO_BUDGET {
            return Err(StoreError::InvalidField {
                field: "photo",
                reason: format!(
                    "{} bytes exceeds the {DEFAULT_PHOTO_BUDGET} byte budget",
                    photo.encoded_len()
                ),
            });
        }
    }
    Ok(())
}

/// Name collation: accents and case are ignored at the primary level
/// ("Émile" sorts with "Emile"), then lowercase text, then raw text break ties.
fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn primary_key(s: &str) -> String {
    deunicode(s).to_lowercase()
}

fn gpa_or_zero(gpa: f64) -> f64 {
    if gpa.is_finite() {
        gpa
    } else {
        0.0
    }
}

struct SearchNeedle {
    raw: String,
    folded: String,
}

impl SearchNeedle {
    fn new(query: &str) -> Self {
        let raw = query.trim().to_string();
        let folded = raw.to_lowercase();
        Self { raw, folded }
    }

    fn matches(&self, r: &Record) -> bool {
        if self.raw.is_empty() {
            return true;
        }
        r.name.to_lowercase().contains(&self.folded)
            || r.record_id.to_lowercase().contains(&self.folded)
            || r.email.to_lowercase().contains(&self.folded)
            || r.phone.contains(&self.raw)
    }
}
