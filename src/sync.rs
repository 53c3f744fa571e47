use crate::contacts::ContactSource;
use crate::description;
use crate::error::{PipelineError, Result};
use crate::transport::RetryingClient;
use crate::types::{EventRecord, SyncReport, SyncStatus};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageCreated {
    notion_page_id: Option<String>,
}

/// Pushes pending event records to the page-creation proxy, strictly one
/// at a time. Remote writes stay sequential so the calendar store sees
/// them in collection order and every failure maps to exactly one record.
pub struct SyncOrchestrator {
    transport: RetryingClient,
    endpoint: String,
    contacts: Arc<dyn ContactSource>,
}

impl SyncOrchestrator {
    pub fn new(transport: RetryingClient, endpoint: String, contacts: Arc<dyn ContactSource>) -> Self {
        Self { transport, endpoint, contacts }
    }

    /// Sync every `ReadyToSync` record in `records`, mutating statuses in
    /// place. A record that fails is marked `Failed` and the batch moves
    /// on; nothing here aborts the loop.
    #[instrument(skip(self, records), fields(total = records.len()))]
    pub async fn sync_all(&self, records: &mut [EventRecord]) -> SyncReport {
        if records.is_empty() {
            info!("No events to sync");
            return SyncReport::default();
        }

        let mut report = SyncReport::default();
        for record in records.iter_mut() {
            if record.status != SyncStatus::ReadyToSync {
                continue;
            }
            match self.sync_one(record).await {
                Ok(page_id) => {
                    info!(artist = %record.main_artist, page_id, "event synced");
                    record.mark_synced(page_id);
                    report.success_count += 1;
                }
                Err(e) => {
                    warn!(artist = %record.main_artist, error = %e, "event failed to sync");
                    record.mark_failed(e.to_string());
                    report.fail_count += 1;
                }
            }
        }

        info!(
            success = report.success_count,
            failed = report.fail_count,
            "sync pass finished"
        );
        report
    }

    async fn sync_one(&self, record: &EventRecord) -> Result<String> {
        let payload = json!({
            "subject": format!("{}: {}", record.main_artist, record.venue()),
            "date": record.date,
            "location": record.location,
            "description": description::compose(record, self.contacts.as_ref()),
        });

        let response = self.transport.post_json(&self.endpoint, &payload).await?;
        let created: PageCreated = response
            .json()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;
        created.notion_page_id.ok_or_else(|| {
            PipelineError::Protocol("Sync endpoint did not return a page id".to_string())
        })
    }
}
