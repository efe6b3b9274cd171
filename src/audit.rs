//! Audit trail of signed documents: which source became which output, and when.

use crate::field::{Field, FieldType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Lowercase hex SHA-256 of `bytes`
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("failed to write audit record: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode audit record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("audit store is unavailable")]
    Unavailable,
}

/// One signed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub source_hash: String,
    pub output_hash: String,
    pub source_file_name: String,
    pub output_file_name: String,
    /// Each field type used, in order of first use
    pub field_types: Vec<FieldType>,
    pub signature_count: usize,
    pub signed_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        source: &[u8],
        output: &[u8],
        source_file_name: &str,
        output_file_name: &str,
        fields: &[Field],
    ) -> AuditRecord {
        let mut field_types: Vec<FieldType> = Vec::new();
        for field in fields {
            if !field_types.contains(&field.field_type()) {
                field_types.push(field.field_type());
            }
        }

        AuditRecord {
            source_hash: hash_bytes(source),
            output_hash: hash_bytes(output),
            source_file_name: source_file_name.to_string(),
            output_file_name: output_file_name.to_string(),
            field_types,
            signature_count: fields
                .iter()
                .filter(|f| f.field_type() == FieldType::Signature)
                .count(),
            signed_at: Utc::now(),
        }
    }
}

/// Somewhere audit records are kept
pub trait AuditStore: Send + Sync {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Appends each record as one line of JSON
#[derive(Debug)]
pub struct JsonLinesAuditStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesAuditStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> JsonLinesAuditStore {
        JsonLinesAuditStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record in the log
    pub fn read_all(&self) -> Result<Vec<AuditRecord>, AuditError> {
        let text = std::fs::read_to_string(&self.path)?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AuditError::from))
            .collect()
    }
}

impl AuditStore for JsonLinesAuditStore {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.lock.lock().map_err(|_| AuditError::Unavailable)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        Ok(())
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> MemoryAuditStore {
        MemoryAuditStore::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl AuditStore for MemoryAuditStore {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records
            .lock()
            .map_err(|_| AuditError::Unavailable)?
            .push(record.clone());
        Ok(())
    }
}
