//! The signing service: validates a request, renders it, stores the result and leaves
//! an audit trail.

use crate::audit::{AuditRecord, AuditStore, JsonLinesAuditStore};
use crate::config::ServiceConfig;
use crate::document::sign_pdf;
use crate::error::RenderError;
use crate::field::{next_timestamp, Field, FieldId};
use crate::output::{Download, FsOutputStore, OutputId, OutputStore, StoreError};
use crate::page::RenderReport;
use crate::preview::Viewport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("no PDF document was uploaded")]
    EmptyDocument,

    #[error("document is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("invalid fields: {0}")]
    Fields(#[source] serde_json::Error),

    #[error("invalid viewport: {0}")]
    Viewport(#[source] serde_json::Error),

    #[error("{} signature field(s) have no signature", .0.len())]
    UnsignedSignatures(Vec<FieldId>),
}

#[derive(Error, Debug)]
pub enum SignError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything needed to sign one document
#[derive(Debug, Clone)]
pub struct SignRequest {
    pub source: Vec<u8>,
    pub file_name: String,
    pub fields: Vec<Field>,
    /// Size of the preview the fields were placed in. Kept for reference only: fields
    /// are positioned relative to each page, so the final render doesn't need it.
    pub viewport: Viewport,
}

impl SignRequest {
    pub fn new<S: Into<String>>(
        source: Vec<u8>,
        file_name: S,
        fields: Vec<Field>,
        viewport: Viewport,
    ) -> SignRequest {
        SignRequest {
            source,
            file_name: file_name.into(),
            fields,
            viewport,
        }
    }

    /// Build a request from form values: the uploaded file, and the `fields` and
    /// `viewport` JSON strings. Missing fields mean no fields; a missing viewport means
    /// the default 800x600.
    pub fn from_form(
        source: Vec<u8>,
        file_name: &str,
        fields_json: Option<&str>,
        viewport_json: Option<&str>,
    ) -> Result<SignRequest, RequestError> {
        let fields = match fields_json {
            Some(json) => serde_json::from_str(json).map_err(RequestError::Fields)?,
            None => Vec::new(),
        };
        let viewport = match viewport_json {
            Some(json) => serde_json::from_str(json).map_err(RequestError::Viewport)?,
            None => Viewport::default(),
        };
        Ok(SignRequest::new(source, file_name, fields, viewport))
    }

    /// Check the request can be signed: there is a document no larger than `limit`
    /// bytes, and every signature field has been signed.
    pub fn validate(&self, limit: usize) -> Result<(), RequestError> {
        if self.source.is_empty() {
            return Err(RequestError::EmptyDocument);
        }
        if self.source.len() > limit {
            return Err(RequestError::TooLarge {
                size: self.source.len(),
                limit,
            });
        }
        let unsigned: Vec<FieldId> = self
            .fields
            .iter()
            .filter(|f| f.is_unsigned_signature())
            .map(|f| f.id)
            .collect();
        if !unsigned.is_empty() {
            return Err(RequestError::UnsignedSignatures(unsigned));
        }
        Ok(())
    }
}

/// Hashes tying the output back to its source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    #[serde(rename = "originalHash")]
    pub source_hash: String,
    #[serde(rename = "signedHash")]
    pub output_hash: String,
    pub timestamp: DateTime<Utc>,
    /// Set when the audit record could not be kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub success: bool,
    pub output_id: OutputId,
    #[serde(rename = "signedPdfUrl")]
    pub download_url: String,
    #[serde(rename = "auditTrail")]
    pub audit: AuditSummary,
    pub report: RenderReport,
}

pub struct SignService {
    config: ServiceConfig,
    outputs: Arc<dyn OutputStore>,
    audit: Option<Arc<dyn AuditStore>>,
    last_output: Mutex<u64>,
}

impl SignService {
    pub fn new(config: ServiceConfig, outputs: Arc<dyn OutputStore>) -> SignService {
        SignService {
            config,
            outputs,
            audit: None,
            last_output: Mutex::new(0),
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditStore>) -> SignService {
        self.audit = Some(audit);
        self
    }

    /// A service storing documents under `config.output_dir`, with a JSON-lines audit
    /// log if `config.audit_log` is set
    pub fn from_config(config: ServiceConfig) -> SignService {
        let outputs = Arc::new(FsOutputStore::new(config.output_dir.clone()));
        let audit = config
            .audit_log
            .clone()
            .map(|path| Arc::new(JsonLinesAuditStore::new(path)) as Arc<dyn AuditStore>);
        SignService {
            audit,
            ..SignService::new(config, outputs)
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Sign `request` and store the result. The output is stored only once it has been
    /// fully rendered. Failing to keep an audit record does not fail the request; the
    /// response carries a note instead.
    pub fn sign(&self, request: SignRequest) -> Result<SignResponse, SignError> {
        request.validate(self.config.max_document_bytes)?;
        log::debug!(
            "signing {} with {} fields (preview {}x{})",
            request.file_name,
            request.fields.len(),
            request.viewport.width,
            request.viewport.height
        );

        let rendered = sign_pdf(&request.source, &request.fields, &self.config.render)?;

        let id = OutputId::from_timestamp(self.next_output_millis());
        self.outputs.save(&id, &rendered.bytes)?;

        let record = AuditRecord::new(
            &request.source,
            &rendered.bytes,
            &request.file_name,
            id.as_str(),
            &request.fields,
        );
        let note = match &self.audit {
            Some(store) => match store.record(&record) {
                Ok(()) => None,
                Err(e) => {
                    log::warn!("audit trail for {id} not saved: {e}");
                    Some(format!("Audit trail not saved ({e})"))
                }
            },
            None => Some("Audit trail not saved (no audit store configured)".to_string()),
        };

        log::info!(
            "signed {} as {id}: {} fields drawn, {} skipped",
            request.file_name,
            rendered.report.fields_drawn,
            rendered.report.skipped.len()
        );

        Ok(SignResponse {
            success: true,
            download_url: format!("{}{}", self.config.download_prefix, id),
            output_id: id,
            audit: AuditSummary {
                source_hash: record.source_hash,
                output_hash: record.output_hash,
                timestamp: record.signed_at,
                note,
            },
            report: rendered.report,
        })
    }

    /// Fetch a stored document by its file name
    pub fn download(&self, name: &str) -> Result<Download, StoreError> {
        let id = OutputId::parse(name)?;
        self.outputs.fetch(&id)
    }

    fn next_output_millis(&self) -> u64 {
        match self.last_output.lock() {
            Ok(mut last) => next_timestamp(&mut last),
            Err(poisoned) => next_timestamp(&mut poisoned.into_inner()),
        }
    }
}
