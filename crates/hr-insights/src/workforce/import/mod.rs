//! Bulk CSV uploads: local validation plus the raw bytes forwarded to the remote services.

mod parser;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use super::domain::EmployeeProfile;

pub use parser::MAX_REPORTED_ROWS;

/// A validated upload. `bytes` is sent unchanged as the multipart file.
#[derive(Debug, Clone)]
pub struct BulkUpload {
    bytes: Vec<u8>,
    profiles: Vec<EmployeeProfile>,
}

impl BulkUpload {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, BulkImportError> {
        let bytes = bytes.into();
        let profiles = parser::parse_profiles(bytes.as_slice())?;
        Ok(Self { bytes, profiles })
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, BulkImportError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BulkImportError> {
        Self::from_bytes(fs::read(path)?)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn profiles(&self) -> &[EmployeeProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BulkImportError {
    #[error("failed to read upload: {0}")]
    Io(#[from] io::Error),
    #[error("upload is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("{total} validation problem(s): {}", .messages.join(" "))]
    InvalidRows { messages: Vec<String>, total: usize },
    #[error("upload contains no employee rows")]
    Empty,
}

impl BulkImportError {
    /// Individual messages suitable for a `details` list.
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::MissingColumns(columns) => columns
                .iter()
                .map(|column| format!("Missing required column: {column}"))
                .collect(),
            Self::InvalidRows { messages, .. } => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
