//! In-process record of upload attempts.
//!
//! [`UploadHistory`] owns every [`UploadRecord`] plus a pointer to the
//! upload currently in flight. All changes go through its methods; nothing
//! else holds the records. Nothing is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{HistoryError, HistoryResult};
use crate::guard::FileDescriptor;

/// Identity of one upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UploadId(Uuid);

impl UploadId {
    /// A fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UploadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Lifecycle of an upload.
///
/// `Pending → Processing → Completed`, with `Error` reachable from either
/// non-terminal state. `Completed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Created, not yet sent.
    Pending,
    /// Sent, waiting on the analysis service.
    Processing,
    /// Finished successfully.
    Completed,
    /// Rejected or failed.
    Error,
}

impl UploadStatus {
    /// Returns the status as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Whether no further transitions are allowed.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    const fn can_move_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending | Self::Processing, Self::Error)
                | (Self::Processing, Self::Completed)
        )
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upload attempt as shown in the recent-uploads list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRecord {
    /// Identity, stable across updates.
    pub id: UploadId,
    /// Display name (the file name).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Current lifecycle state.
    pub status: UploadStatus,
    /// When the attempt started.
    pub created_at: DateTime<Utc>,
    /// Data rows in the file, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    /// Why the attempt failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UploadRecord {
    /// A pending record for a file whose row count is not known yet.
    pub fn pending(descriptor: &FileDescriptor) -> Self {
        Self {
            id: UploadId::new(),
            name: descriptor.name.clone(),
            size: descriptor.size,
            status: UploadStatus::Pending,
            created_at: Utc::now(),
            record_count: None,
            error_message: None,
        }
    }

    /// A pending record pre-populated with the parsed row count.
    pub fn with_record_count(descriptor: &FileDescriptor, record_count: usize) -> Self {
        Self {
            record_count: Some(record_count),
            ..Self::pending(descriptor)
        }
    }

    /// `Pending → Processing`.
    pub fn start_processing(&mut self) -> HistoryResult<()> {
        self.transition(UploadStatus::Processing)
    }

    /// `Processing → Completed`.
    pub fn complete(&mut self) -> HistoryResult<()> {
        self.transition(UploadStatus::Completed)
    }

    /// Move to `Error`, keeping `message` for display.
    pub fn fail(&mut self, message: impl Into<String>) -> HistoryResult<()> {
        self.transition(UploadStatus::Error)?;
        self.error_message = Some(message.into());
        Ok(())
    }

    fn transition(&mut self, next: UploadStatus) -> HistoryResult<()> {
        if !self.status.can_move_to(next) {
            return Err(HistoryError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::debug!(id = %self.id, from = %self.status, to = %next, "upload transition");
        self.status = next;
        Ok(())
    }
}

/// Counts by status across a history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    /// All records.
    pub total: usize,
    /// Records still pending.
    pub pending: usize,
    /// Records being processed.
    pub processing: usize,
    /// Records that completed.
    pub completed: usize,
    /// Records that failed.
    pub failed: usize,
    /// Sum of known record counts.
    pub records: usize,
}

/// Ordered collection of upload records, newest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadHistory {
    records: Vec<UploadRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<UploadId>,
}

impl UploadHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record at the front.
    pub fn add(&mut self, record: UploadRecord) -> UploadId {
        let id = record.id;
        self.records.insert(0, record);
        id
    }

    /// Replace the record with the same identity in place, or add it at the front.
    pub fn upsert(&mut self, record: UploadRecord) -> UploadId {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                let id = record.id;
                *existing = record;
                id
            }
            None => self.add(record),
        }
    }

    /// Run `f` on the record with `id`. Returns `None` if there is no such record.
    pub fn update<T>(&mut self, id: UploadId, f: impl FnOnce(&mut UploadRecord) -> T) -> Option<T> {
        self.records.iter_mut().find(|r| r.id == id).map(f)
    }

    /// Apply a lifecycle transition to the record with `id`.
    pub fn transition(
        &mut self,
        id: UploadId,
        f: impl FnOnce(&mut UploadRecord) -> HistoryResult<()>,
    ) -> HistoryResult<()> {
        self.update(id, f)
            .unwrap_or(Err(HistoryError::UnknownUpload(id)))
    }

    /// Look up a record.
    pub fn get(&self, id: UploadId) -> Option<&UploadRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Remove a record, clearing the current pointer if it pointed there.
    pub fn remove(&mut self, id: UploadId) -> Option<UploadRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        if self.current == Some(id) {
            self.current = None;
        }
        Some(self.records.remove(index))
    }

    /// Drop every record and the current pointer.
    pub fn clear(&mut self) {
        self.records.clear();
        self.current = None;
    }

    /// Mark `id` as the upload in flight.
    pub fn set_current(&mut self, id: UploadId) -> HistoryResult<()> {
        if self.get(id).is_none() {
            return Err(HistoryError::UnknownUpload(id));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Forget which upload is in flight.
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// The upload in flight, if any.
    pub fn current(&self) -> Option<&UploadRecord> {
        self.current.and_then(|id| self.get(id))
    }

    /// Records, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &UploadRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Totals by status.
    pub fn summary(&self) -> HistorySummary {
        let mut summary = HistorySummary {
            total: self.records.len(),
            ..HistorySummary::default()
        };
        for record in &self.records {
            match record.status {
                UploadStatus::Pending => summary.pending += 1,
                UploadStatus::Processing => summary.processing += 1,
                UploadStatus::Completed => summary.completed += 1,
                UploadStatus::Error => summary.failed += 1,
            }
            summary.records += record.record_count.unwrap_or(0);
        }
        summary
    }
}
