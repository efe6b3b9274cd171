//! Storage for signed documents until they are downloaded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// The name a signed document is stored and downloaded under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputId(String);

impl OutputId {
    /// `signed_<millis>.pdf`
    pub fn from_timestamp(millis: u64) -> OutputId {
        OutputId(format!("signed_{millis}.pdf"))
    }

    /// Accept a client-supplied name. Only plain file names are valid ids: anything that
    /// could address another directory is refused.
    pub fn parse(name: &str) -> Result<OutputId, StoreError> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if plain {
            Ok(OutputId(name.to_string()))
        } else {
            Err(StoreError::NotFound(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no stored document named `{0}`")]
    NotFound(String),

    #[error("output storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored document, ready to be sent as an attachment
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

impl Download {
    fn pdf(id: &OutputId, bytes: Vec<u8>) -> Download {
        Download {
            bytes,
            content_type: PDF_CONTENT_TYPE,
            file_name: id.to_string(),
        }
    }

    /// The `Content-Disposition` header value
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

/// Somewhere signed documents are kept
pub trait OutputStore: Send + Sync {
    /// Store `bytes` under `id`
    fn save(&self, id: &OutputId, bytes: &[u8]) -> Result<(), StoreError>;

    fn fetch(&self, id: &OutputId) -> Result<Download, StoreError>;
}

/// Keeps each document as a file in one directory
#[derive(Debug, Clone)]
pub struct FsOutputStore {
    dir: PathBuf,
}

impl FsOutputStore {
    /// The directory is created when the first document is saved
    pub fn new<P: Into<PathBuf>>(dir: P) -> FsOutputStore {
        FsOutputStore { dir: dir.into() }
    }

    fn path(&self, id: &OutputId) -> PathBuf {
        self.dir.join(id.as_str())
    }
}

impl OutputStore for FsOutputStore {
    fn save(&self, id: &OutputId, bytes: &[u8]) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(id), bytes)?;
        Ok(())
    }

    fn fetch(&self, id: &OutputId) -> Result<Download, StoreError> {
        match std::fs::read(self.path(id)) {
            Ok(bytes) => Ok(Download::pdf(id, bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps documents in memory
#[derive(Debug, Default)]
pub struct MemoryOutputStore {
    documents: Mutex<HashMap<OutputId, Vec<u8>>>,
}

impl MemoryOutputStore {
    pub fn new() -> MemoryOutputStore {
        MemoryOutputStore::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|d| d.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutputStore for MemoryOutputStore {
    fn save(&self, id: &OutputId, bytes: &[u8]) -> Result<(), StoreError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| std::io::Error::other("output store lock poisoned"))?;
        documents.insert(id.clone(), bytes.to_vec());
        Ok(())
    }

    fn fetch(&self, id: &OutputId) -> Result<Download, StoreError> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| std::io::Error::other("output store lock poisoned"))?;
        documents
            .get(id)
            .map(|bytes| Download::pdf(id, bytes.clone()))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
