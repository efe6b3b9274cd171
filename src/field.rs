//! The field data model and its JSON wire format.
//!
//! Fields arrive as flat JSON objects, one per placed annotation:
//!
//! ```json
//! {"id": 1700000000000, "type": "text", "page": 1,
//!  "x": 10, "y": 10, "width": 30, "height": 5, "text": "Jane Doe"}
//! ```
//!
//! Signature and image fields carry their payload as a `data:` URL in `imageData`.

use crate::error::FieldError;
use crate::geometry::PercentRect;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Identifies a field for as long as it exists. Fresh ids are creation timestamps in
/// milliseconds, bumped when needed so they are strictly increasing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a field, without its payload
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Signature,
    Text,
    Date,
    Image,
    Checkbox,
    Radio,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Signature,
        FieldType::Text,
        FieldType::Date,
        FieldType::Image,
        FieldType::Checkbox,
        FieldType::Radio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Signature => "signature",
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Image => "image",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
        }
    }

    /// Size of a freshly placed field, as `(width, height)` percentages of the page
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            FieldType::Signature | FieldType::Image => (25.0, 10.0),
            FieldType::Text | FieldType::Date => (25.0, 5.0),
            FieldType::Checkbox | FieldType::Radio => (3.0, 3.0),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The image formats that can be embedded into a PDF
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

#[derive(Error, Debug)]
pub enum DataUrlError {
    #[error("image data is not a `data:` URL")]
    NotDataUrl,

    #[error("image data URL is not base64 encoded")]
    NotBase64,

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

/// An embedded image payload: the raw bytes plus the media type they were tagged with.
/// The tag is kept even when it names a format that can't be embedded; that is only
/// an error once the field is rendered.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    media_type: String,
    bytes: Vec<u8>,
}

impl ImageData {
    pub fn new<S: Into<String>>(media_type: S, bytes: Vec<u8>) -> ImageData {
        ImageData {
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn png(bytes: Vec<u8>) -> ImageData {
        ImageData::new("image/png", bytes)
    }

    pub fn jpeg(bytes: Vec<u8>) -> ImageData {
        ImageData::new("image/jpeg", bytes)
    }

    /// Parse a `data:<media-type>;base64,<payload>` URL
    pub fn from_data_url(url: &str) -> Result<ImageData, DataUrlError> {
        let rest = url.trim().strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotDataUrl)?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim().to_string();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(DataUrlError::NotBase64);
        }

        let bytes = B64.decode(payload.trim())?;
        Ok(ImageData { media_type, bytes })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, B64.encode(&self.bytes))
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The embeddable format named by the media type
    pub fn format(&self) -> Result<ImageFormat, FieldError> {
        match self.media_type.to_ascii_lowercase().as_str() {
            "image/png" => Ok(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
            _ => Err(FieldError::UnsupportedImageFormat(self.media_type.clone())),
        }
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for ImageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        ImageData::from_data_url(&url).map_err(de::Error::custom)
    }
}

/// What a field draws, with only the data that kind of field needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Signature {
        #[serde(rename = "imageData", default, deserialize_with = "blank_as_none")]
        image_data: Option<ImageData>,
    },
    Text {
        #[serde(default, deserialize_with = "null_as_default")]
        text: String,
    },
    Date {
        #[serde(default, deserialize_with = "null_as_default")]
        date: String,
    },
    Image {
        #[serde(rename = "imageData", default, deserialize_with = "blank_as_none")]
        image_data: Option<ImageData>,
    },
    Checkbox {
        #[serde(default, deserialize_with = "null_as_default")]
        checked: bool,
    },
    Radio {
        #[serde(default, deserialize_with = "null_as_default")]
        checked: bool,
    },
}

impl FieldKind {
    /// The content a freshly placed field starts with. Date fields are pre-filled with
    /// `today`.
    pub fn placeholder(field_type: FieldType, today: &str) -> FieldKind {
        match field_type {
            FieldType::Signature => FieldKind::Signature { image_data: None },
            FieldType::Image => FieldKind::Image { image_data: None },
            FieldType::Text => FieldKind::Text {
                text: "Type here...".to_string(),
            },
            FieldType::Date => FieldKind::Date {
                date: today.to_string(),
            },
            FieldType::Checkbox => FieldKind::Checkbox { checked: false },
            FieldType::Radio => FieldKind::Radio { checked: false },
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Signature { .. } => FieldType::Signature,
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Date { .. } => FieldType::Date,
            FieldKind::Image { .. } => FieldType::Image,
            FieldKind::Checkbox { .. } => FieldType::Checkbox,
            FieldKind::Radio { .. } => FieldType::Radio,
        }
    }
}

/// A field placed on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    /// 1-based page number
    #[serde(default = "first_page", deserialize_with = "page_or_first")]
    pub page: u32,
    #[serde(flatten)]
    pub rect: PercentRect,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    pub fn new(id: FieldId, page: u32, rect: PercentRect, kind: FieldKind) -> Field {
        Field {
            id,
            page,
            rect,
            kind,
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn image_data(&self) -> Option<&ImageData> {
        match &self.kind {
            FieldKind::Signature { image_data } | FieldKind::Image { image_data } => {
                image_data.as_ref()
            }
            _ => None,
        }
    }

    /// A signature field that has not been signed yet
    pub fn is_unsigned_signature(&self) -> bool {
        matches!(self.kind, FieldKind::Signature { image_data: None })
    }
}

fn first_page() -> u32 {
    1
}

fn page_or_first<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(1))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An empty `imageData` string means nothing has been drawn yet
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<ImageData>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(url) if !url.trim().is_empty() => {
            ImageData::from_data_url(&url).map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Hand out millisecond timestamps that never repeat or go backwards, even when asked
/// for several within the same millisecond.
pub(crate) fn next_timestamp(last: &mut u64) -> u64 {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let next = now.max(*last + 1);
    *last = next;
    next
}
