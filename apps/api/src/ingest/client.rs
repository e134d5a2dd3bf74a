//! Extraction client, the single point of entry for the upstream extraction
//! service that turns an uploaded résumé into raw JSON.
//!
//! The service streams progress as server-sent events and finishes with a
//! `final_data` message; see `ingest::stream` for the protocol.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info};

use crate::ingest::stream::{IngestOutcome, IngestionTracker, SseDecoder};
use crate::ingest::upload::ResumeUpload;
use crate::ingest::IngestError;

const STREAM_PATH: &str = "/api/stream-resume-processing";
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Seam between the upload handler and the extraction service.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, upload: ResumeUpload) -> Result<IngestOutcome, IngestError>;
}

#[derive(Clone)]
pub struct HttpExtractionClient {
    client: Client,
    base_url: String,
}

impl HttpExtractionClient {
    pub fn new(base_url: &str) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, STREAM_PATH)
    }
}

#[async_trait]
impl ExtractionService for HttpExtractionClient {
    async fn extract(&self, upload: ResumeUpload) -> Result<IngestOutcome, IngestError> {
        info!(
            "Forwarding {} ({} bytes) to extraction service",
            upload.file_name,
            upload.bytes.len()
        );

        let part = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status(status.as_u16()));
        }

        let mut decoder = SseDecoder::new();
        let mut tracker = IngestionTracker::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for message in decoder.push(&chunk) {
                tracker.apply(message);
                debug!("Extraction progress {}%: {}", tracker.progress, tracker.message);
            }
        }
        decoder.finish();

        tracker.finish()
    }
}
