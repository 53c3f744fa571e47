use crate::error::{PipelineError, Result};
use crate::transport::RetryingClient;
use crate::types::{EventRecord, ExtractedEvent};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

const INSTRUCTION: &str = "Extract every concert or event from this flyer image. \
Return ONLY a JSON array. Each element must have exactly these fields: \
\"mainArtist\" (the headliner), \"fullLineup\" (comma-separated artist names), \
\"date\" (YYYY-MM-DD), \"location\" (\"Venue, City, State\"). \
No prose, no markdown, just the JSON array.";

/// Turns a flyer photograph into event records by way of a multimodal
/// AI endpoint. A parse failure aborts the whole batch; there are no
/// partial results.
pub struct FlyerExtractor {
    transport: RetryingClient,
    endpoint: String,
    api_key: String,
}

impl FlyerExtractor {
    pub fn new(transport: RetryingClient, endpoint: String, api_key: String) -> Self {
        Self { transport, endpoint, api_key }
    }

    #[instrument(skip(self, image_bytes), fields(image_len = image_bytes.len()))]
    pub async fn extract(&self, image_bytes: &[u8]) -> Result<Vec<EventRecord>> {
        let request = build_request(image_bytes);
        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let response = self.transport.post_json(&url, &request).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        let events = parse_response(&body)?;
        let extracted_at = Utc::now();
        let records: Vec<EventRecord> = events
            .into_iter()
            .map(|event| event.into_record(extracted_at))
            .collect();
        info!(count = records.len(), "extracted events from flyer");
        Ok(records)
    }
}

fn build_request(image_bytes: &[u8]) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": INSTRUCTION },
                { "inlineData": { "mimeType": "image/jpeg", "data": BASE64.encode(image_bytes) } }
            ]
        }],
        "generationConfig": { "responseMimeType": "application/json" }
    })
}

/// Pull the event list out of a generateContent response body.
pub fn parse_response(body: &Value) -> Result<Vec<ExtractedEvent>> {
    let text = body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| {
            PipelineError::ExtractionParse("AI did not return structured data".to_string())
        })?;

    let payload = strip_code_fences(text);
    serde_json::from_str::<Vec<ExtractedEvent>>(payload).map_err(|e| {
        warn!(raw = text, error = %e, "AI response was not a parseable JSON list");
        PipelineError::ExtractionParse(
            "Failed to parse AI response into a structured JSON list".to_string(),
        )
    })
}

/// Drop a leading ```json (or bare ```) fence line and a trailing ```
/// fence, leaving anything in between untouched.
fn strip_code_fences(text: &str) -> &str {
    let mut payload = text.trim();
    if let Some(rest) = payload.strip_prefix("```") {
        payload = match rest.split_once('\n') {
            Some((_info, body)) => body,
            None => rest,
        };
    }
    if let Some(rest) = payload.trim_end().strip_suffix("```") {
        payload = rest;
    }
    payload.trim()
}
