//! Extraction stream protocol.
//!
//! The extraction service answers an upload with a server-sent-events body:
//! blank-line separated events, each `data: {json}` with a `type` discriminator.
//! Only `final_data` carries the record; the rest report progress.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ingest::normalize::IngestPayload;
use crate::ingest::IngestError;

const EVENT_SEPARATOR: &[u8] = b"\n\n";
const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Connection {
        #[serde(default)]
        message: Option<String>,
    },
    Progress {
        #[serde(default)]
        progress: Option<f64>,
        #[serde(default)]
        message: Option<String>,
    },
    SectionsDetected {
        #[serde(default)]
        sections: Vec<String>,
        #[serde(default)]
        progress: Option<f64>,
        #[serde(default)]
        message: Option<String>,
    },
    SectionProcessing {
        #[serde(default)]
        section: Option<String>,
        #[serde(default)]
        progress: Option<f64>,
        #[serde(default)]
        message: Option<String>,
    },
    SectionSkip {
        #[serde(default)]
        section: String,
        #[serde(default)]
        message: Option<String>,
    },
    SectionComplete {
        #[serde(default)]
        section: String,
        #[serde(default)]
        data: Value,
        #[serde(default)]
        progress: Option<f64>,
        #[serde(default)]
        message: Option<String>,
    },
    FinalData {
        #[serde(default)]
        data: Value,
        #[serde(default, rename = "missingPoints")]
        missing_points: Option<Value>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

// ────────────────────────────────────────────────────────────────────────────
// SSE decoding
// ────────────────────────────────────────────────────────────────────────────

/// Incremental decoder for the event-stream body.
///
/// Chunks may split events (and UTF-8 sequences) anywhere; bytes are buffered
/// until a full event is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one body chunk and returns every message completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamMessage> {
        self.buffer.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some(pos) = find_separator(&self.buffer) {
            let event: Vec<u8> = self.buffer.drain(..pos + EVENT_SEPARATOR.len()).collect();
            let event = String::from_utf8_lossy(&event[..pos]);
            if let Some(message) = parse_event(&event) {
                messages.push(message);
            }
        }
        messages
    }

    /// Ends the stream. A trailing event without its separator is incomplete
    /// and dropped.
    pub fn finish(self) {
        if !self.buffer.iter().all(u8::is_ascii_whitespace) {
            debug!(
                "Discarding {} bytes of incomplete trailing event",
                self.buffer.len()
            );
        }
    }
}

fn find_separator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(EVENT_SEPARATOR.len())
        .position(|w| w == EVENT_SEPARATOR)
}

fn parse_event(event: &str) -> Option<StreamMessage> {
    let json = event.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str(json) {
        Ok(message) => Some(message),
        Err(e) => {
            debug!("Ignoring malformed stream event: {e}");
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Progress tracking
// ────────────────────────────────────────────────────────────────────────────

/// Folds stream messages into progress state and the final payload.
#[derive(Debug, Default)]
pub struct IngestionTracker {
    pub progress: f64,
    pub message: String,
    pub detected_sections: Vec<String>,
    pub completed_sections: Vec<String>,
    error: Option<String>,
    payload: Option<IngestPayload>,
}

/// Result of a completed extraction stream.
#[derive(Debug)]
pub struct IngestOutcome {
    pub payload: IngestPayload,
    pub detected_sections: Vec<String>,
    pub completed_sections: Vec<String>,
}

impl IngestionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, message: StreamMessage) {
        match message {
            StreamMessage::Connection { message } => {
                self.message =
                    message.unwrap_or_else(|| "Connected to streaming server".to_string());
            }
            StreamMessage::Progress { progress, message } => {
                self.update(progress.unwrap_or(0.0), message);
            }
            StreamMessage::SectionsDetected {
                sections,
                progress,
                message,
            } => {
                info!("Extraction detected sections: {}", sections.join(", "));
                self.detected_sections = sections;
                self.update(progress.unwrap_or(40.0), message);
            }
            StreamMessage::SectionProcessing {
                section,
                progress,
                message,
            } => {
                debug!("Extraction processing section {:?}", section);
                self.update(progress.unwrap_or(50.0), message);
            }
            StreamMessage::SectionSkip { section, message } => {
                self.message = format!(
                    "Skipping {section} section - {}",
                    message.unwrap_or_default()
                );
                if section == "certifications" {
                    self.completed_sections.push(section);
                }
            }
            StreamMessage::SectionComplete {
                section,
                data,
                progress,
                message,
            } => {
                if !data.is_null() {
                    debug!("Extraction delivered partial data for {section}");
                }
                self.completed_sections.push(section);
                self.update(progress.unwrap_or(70.0), message);
            }
            StreamMessage::FinalData {
                data,
                missing_points,
            } => {
                if data.is_null() {
                    warn!("Ignoring final_data message without data");
                    return;
                }
                self.progress = 100.0;
                self.message = "Processing complete".to_string();
                self.payload = Some(IngestPayload {
                    data,
                    missing_points,
                });
            }
            StreamMessage::Error { message } => {
                let message = message.unwrap_or_else(|| "Unknown streaming error".to_string());
                warn!("Extraction stream reported an error: {message}");
                self.error.get_or_insert(message);
            }
            StreamMessage::Unknown => {}
        }
    }

    /// Final data wins over an earlier reported error.
    pub fn finish(self) -> Result<IngestOutcome, IngestError> {
        match (self.payload, self.error) {
            (Some(payload), _) => Ok(IngestOutcome {
                payload,
                detected_sections: self.detected_sections,
                completed_sections: self.completed_sections,
            }),
            (None, Some(message)) => Err(IngestError::Upstream(message)),
            (None, None) => Err(IngestError::IncompleteStream),
        }
    }

    fn update(&mut self, progress: f64, message: Option<String>) {
        self.progress = progress;
        if let Some(message) = message {
            self.message = message;
        }
    }
}
