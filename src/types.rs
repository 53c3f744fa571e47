use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery state of one extracted event. `Success` and `Failed` are
/// terminal; the orchestrator never picks a record up again once it
/// leaves `ReadyToSync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum SyncStatus {
    ReadyToSync,
    Success,
    Failed(String),
}

impl SyncStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncStatus::ReadyToSync)
    }
}

/// One event lifted off a flyer, as held by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: Uuid,
    pub main_artist: String,
    /// Comma-separated lineup as printed on the flyer; may repeat the
    /// main artist or be empty.
    pub full_lineup: String,
    /// `YYYY-MM-DD`; passed through verbatim, not validated as a real
    /// calendar date at this layer.
    pub date: String,
    /// `"Venue, City, State"`; only the part before the first comma is
    /// treated as the venue name.
    pub location: String,
    pub status: SyncStatus,
    pub page_id: Option<String>,
    pub extracted_at: DateTime<Utc>,
}

impl EventRecord {
    /// Venue name: text before the first comma of `location`, or the
    /// whole string when no comma is present.
    pub fn venue(&self) -> &str {
        self.location
            .split(',')
            .next()
            .unwrap_or(&self.location)
            .trim()
    }

    /// Lineup members other than the main artist: split on commas,
    /// trimmed, empties dropped, main artist excluded (case-insensitive).
    pub fn other_lineup_members(&self) -> Vec<&str> {
        self.full_lineup
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| !name.eq_ignore_ascii_case(&self.main_artist))
            .collect()
    }

    pub fn mark_synced(&mut self, page_id: String) {
        self.status = SyncStatus::Success;
        self.page_id = Some(page_id);
    }

    pub fn mark_failed(&mut self, reason: String) {
        self.status = SyncStatus::Failed(reason);
    }
}

/// One event element exactly as the AI service returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEvent {
    pub main_artist: String,
    #[serde(default)]
    pub full_lineup: String,
    pub date: String,
    pub location: String,
}

impl ExtractedEvent {
    pub fn into_record(self, extracted_at: DateTime<Utc>) -> EventRecord {
        EventRecord {
            id: Uuid::new_v4(),
            main_artist: self.main_artist,
            full_lineup: self.full_lineup,
            date: self.date,
            location: self.location,
            status: SyncStatus::ReadyToSync,
            page_id: None,
            extracted_at,
        }
    }
}

/// Booking contact for one artist. Display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub artist: String,
    pub manager: String,
    pub email: String,
    pub phone: String,
}

/// Aggregate outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub success_count: usize,
    pub fail_count: usize,
}
