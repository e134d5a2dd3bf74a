use bytes::Bytes;

use crate::ingest::IngestError;

/// Extensions the extraction service can read.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt"];

/// A validated résumé file ready to forward to the extraction service.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ResumeUpload {
    /// Validates extension and size. `content_type` falls back to the MIME type
    /// implied by the extension when the client did not send one.
    pub fn new(
        file_name: String,
        content_type: Option<String>,
        bytes: Bytes,
        max_bytes: u64,
    ) -> Result<Self, IngestError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or(IngestError::InvalidFileType)?;
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(IngestError::InvalidFileType);
        }
        if bytes.is_empty() {
            return Err(IngestError::EmptyFile);
        }
        if bytes.len() as u64 > max_bytes {
            return Err(IngestError::file_too_large(max_bytes));
        }

        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| mime_for_extension(&extension).to_string());

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        _ => "text/plain",
    }
}
