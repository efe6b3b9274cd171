//! Editing state for one document: the loaded source, the fields placed on it, which
//! page is being looked at, and which signature field (if any) is being signed.

use crate::document::Document;
use crate::error::RenderError;
use crate::field::{next_timestamp, Field, FieldId, FieldKind, FieldType, ImageData};
use crate::geometry::PercentRect;
use crate::preview::Viewport;
use crate::service::SignRequest;
use crate::store::{FieldStore, FieldUpdate};
use thiserror::Error;

/// Where new fields are dropped, as percentages from the page's top-left corner
const DROP_POINT: (f64, f64) = (40.0, 45.0);

/// Reasons the session can't be submitted for signing yet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("no document has been opened")]
    NoDocument,

    #[error("no fields have been placed")]
    NoFields,

    #[error("{} signature field(s) still need a signature", .0.len())]
    UnsignedSignatures(Vec<FieldId>),
}

/// The document being worked on
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[derive(Debug, Clone)]
pub struct AppState {
    document: Option<SourceDocument>,
    fields: FieldStore,
    current_page: u32,
    viewport: Viewport,
    pending_signature: Option<FieldId>,
    last_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            document: None,
            fields: FieldStore::new(),
            current_page: 1,
            viewport: Viewport::default(),
            pending_signature: None,
            last_id: 0,
        }
    }
}

/// Today's date as pre-filled into new date fields
pub fn today() -> String {
    chrono::Local::now().format("%-m/%-d/%Y").to_string()
}

impl AppState {
    pub fn new() -> AppState {
        AppState::default()
    }

    /// Replace the working document. Everything placed on the previous document is
    /// discarded and the view returns to the first page. Returns the page count.
    pub fn open_document<S: Into<String>>(
        &mut self,
        file_name: S,
        bytes: Vec<u8>,
    ) -> Result<usize, RenderError> {
        let page_count = Document::load(&bytes)?.page_count();
        self.document = Some(SourceDocument {
            file_name: file_name.into(),
            bytes,
            page_count,
        });
        self.fields.clear();
        self.current_page = 1;
        self.pending_signature = None;
        Ok(page_count)
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    pub fn page_count(&self) -> usize {
        self.document.as_ref().map_or(0, |d| d.page_count)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pending_signature(&self) -> Option<FieldId> {
        self.pending_signature
    }

    /// Place a new field of type `field_type` on the current page, with its type's
    /// default size and content. Nothing is placed while no document is open.
    pub fn add_field(&mut self, field_type: FieldType) -> Option<FieldId> {
        self.document.as_ref()?;

        let id = FieldId(next_timestamp(&mut self.last_id));
        let (width, height) = field_type.default_size();
        self.fields.insert(Field::new(
            id,
            self.current_page,
            PercentRect::new(DROP_POINT.0, DROP_POINT.1, width, height),
            FieldKind::placeholder(field_type, &today()),
        ));
        Some(id)
    }

    pub fn update_field(&mut self, id: FieldId, update: FieldUpdate) -> bool {
        self.fields.update(id, update)
    }

    pub fn delete_field(&mut self, id: FieldId) -> Option<Field> {
        if self.pending_signature == Some(id) {
            self.pending_signature = None;
        }
        self.fields.remove(id)
    }

    /// Show page `page`, if the document has it
    pub fn set_page(&mut self, page: u32) -> bool {
        if page >= 1 && page as usize <= self.page_count() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.current_page.saturating_sub(1))
    }

    /// Record the measured size of the page preview
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn fields_on_current_page(&self) -> impl Iterator<Item = &Field> {
        self.fields.on_page(self.current_page)
    }

    /// Start capturing a signature for the signature field `id`
    pub fn begin_signature(&mut self, id: FieldId) -> bool {
        let is_signature = self
            .fields
            .get(id)
            .is_some_and(|f| f.field_type() == FieldType::Signature);
        if is_signature {
            self.pending_signature = Some(id);
        }
        is_signature
    }

    /// Attach a captured signature to the field being signed. Returns the field that
    /// was signed, or `None` if no signature capture was in progress.
    pub fn save_signature(&mut self, image: ImageData) -> Option<FieldId> {
        let id = self.pending_signature.take()?;
        self.fields.update(id, FieldUpdate::image(image)).then_some(id)
    }

    pub fn cancel_signature(&mut self) {
        self.pending_signature = None;
    }

    /// Whether the session can be submitted: a document is open, at least one field is
    /// placed, and every signature field has been signed.
    pub fn check_ready(&self) -> Result<(), ReadinessError> {
        if self.document.is_none() {
            return Err(ReadinessError::NoDocument);
        }
        if self.fields.is_empty() {
            return Err(ReadinessError::NoFields);
        }
        let unsigned = self.fields.unsigned_signatures();
        if !unsigned.is_empty() {
            return Err(ReadinessError::UnsignedSignatures(unsigned));
        }
        Ok(())
    }

    /// Snapshot the session into a sign request. Later edits don't affect the request.
    pub fn to_request(&self) -> Result<SignRequest, ReadinessError> {
        self.check_ready()?;
        let document = self.document.as_ref().ok_or(ReadinessError::NoDocument)?;
        Ok(SignRequest::new(
            document.bytes.clone(),
            document.file_name.clone(),
            self.fields.snapshot(),
            self.viewport,
        ))
    }
}
