use crate::field::{Field, FieldId, FieldKind, FieldType, ImageData};
use serde::{Deserialize, Serialize};

/// A partial edit to a field, as produced by dragging, resizing, typing or signing.
/// Components that don't apply to the field's kind (e.g. `checked` on a text field) are
/// ignored.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text: Option<String>,
    pub date: Option<String>,
    pub checked: Option<bool>,
    pub image_data: Option<ImageData>,
}

impl FieldUpdate {
    pub fn position(x: f64, y: f64) -> FieldUpdate {
        FieldUpdate {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn image(image_data: ImageData) -> FieldUpdate {
        FieldUpdate {
            image_data: Some(image_data),
            ..Default::default()
        }
    }

    fn apply_to(self, field: &mut Field) {
        let rect = &mut field.rect;
        rect.x = self.x.unwrap_or(rect.x);
        rect.y = self.y.unwrap_or(rect.y);
        rect.width = self.width.unwrap_or(rect.width);
        rect.height = self.height.unwrap_or(rect.height);

        match &mut field.kind {
            FieldKind::Signature { image_data } | FieldKind::Image { image_data } => {
                if let Some(data) = self.image_data {
                    *image_data = Some(data);
                }
            }
            FieldKind::Text { text } => {
                if let Some(t) = self.text {
                    *text = t;
                }
            }
            FieldKind::Date { date } => {
                if let Some(d) = self.date {
                    *date = d;
                }
            }
            FieldKind::Checkbox { checked } | FieldKind::Radio { checked } => {
                if let Some(c) = self.checked {
                    *checked = c;
                }
            }
        }
    }
}

/// The ordered set of fields placed on a document. Order is placement order, and is the
/// order in which fields are drawn.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldStore {
    fields: Vec<Field>,
}

impl FieldStore {
    pub fn new() -> FieldStore {
        FieldStore::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Add a field at the end. A field with an id that's already present replaces the
    /// existing one in place instead.
    pub fn insert(&mut self, field: Field) {
        match self.position(field.id) {
            Some(i) => self.fields[i] = field,
            None => self.fields.push(field),
        }
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Replace the field with the same id, returning the previous version. Returns `None`
    /// and leaves the store untouched if there is no such field.
    pub fn replace(&mut self, field: Field) -> Option<Field> {
        let i = self.position(field.id)?;
        Some(std::mem::replace(&mut self.fields[i], field))
    }

    /// Patch the field with the given id. Returns whether a field was found.
    pub fn update(&mut self, id: FieldId, update: FieldUpdate) -> bool {
        match self.fields.iter_mut().find(|f| f.id == id) {
            Some(field) => {
                update.apply_to(field);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: FieldId) -> Option<Field> {
        let i = self.position(id)?;
        Some(self.fields.remove(i))
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }

    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.page == page)
    }

    pub fn of_type(&self, field_type: FieldType) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(move |f| f.field_type() == field_type)
    }

    /// Signature fields that don't have an image yet
    pub fn unsigned_signatures(&self) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|f| f.is_unsigned_signature())
            .map(|f| f.id)
            .collect()
    }

    /// A copy of the current fields, for rendering while the store keeps changing
    pub fn snapshot(&self) -> Vec<Field> {
        self.fields.clone()
    }

    fn position(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }
}

impl From<Vec<Field>> for FieldStore {
    fn from(fields: Vec<Field>) -> Self {
        let mut store = FieldStore::new();
        for field in fields {
            store.insert(field);
        }
        store
    }
}

impl<'a> IntoIterator for &'a FieldStore {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
