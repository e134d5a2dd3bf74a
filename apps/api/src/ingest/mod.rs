// Ingestion boundary. Uploads go to the external extraction service through
// ExtractionService; its final payload is normalized into a ResumeRecord.

pub mod client;
pub mod handlers;
pub mod normalize;
pub mod stream;
pub mod upload;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid file type. Please upload PDF, DOCX, DOC, or TXT files.")]
    InvalidFileType,

    #[error("File size exceeds {limit_mb}MB limit.")]
    FileTooLarge { limit_mb: u64 },

    #[error("Please select a file to upload.")]
    EmptyFile,

    #[error("Extraction service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Extraction service returned status {0}")]
    Status(u16),

    #[error("Extraction failed: {0}")]
    Upstream(String),

    #[error("Extraction stream ended before the final data arrived")]
    IncompleteStream,
}

impl IngestError {
    pub fn file_too_large(max_bytes: u64) -> Self {
        IngestError::FileTooLarge {
            limit_mb: max_bytes / (1024 * 1024),
        }
    }

    /// Upload problems the user can fix, as opposed to extraction failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestError::InvalidFileType | IngestError::FileTooLarge { .. } | IngestError::EmptyFile
        )
    }
}
