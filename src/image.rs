use crate::error::FieldError;
use crate::field::{ImageData, ImageFormat};
use ::image::{ColorType, DynamicImage, GenericImageView};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};

/// How the pixel data will be stored in the PDF
enum Encoded {
    /// Baseline JPEGs can be embedded as-is and decoded by the reader
    Dct {
        bytes: Vec<u8>,
        colour_space: &'static str,
    },
    /// Everything else is stored as zlib-compressed 8-bit RGB, with the alpha channel
    /// (if any) split out into a soft mask
    Flate { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A decoded signature or image payload, ready to be embedded as an image XObject
pub struct Image {
    pub width: u32,
    pub height: u32,
    encoded: Encoded,
}

impl Image {
    /// Decode a field's payload. The media type decides which decoder is used; payloads
    /// that are neither PNG nor JPEG, or that don't decode, are rejected.
    pub fn decode(data: &ImageData) -> Result<Image, FieldError> {
        let format = match data.format()? {
            ImageFormat::Png => ::image::ImageFormat::Png,
            ImageFormat::Jpeg => ::image::ImageFormat::Jpeg,
        };
        let image = ::image::load_from_memory_with_format(data.bytes(), format)
            .map_err(|e| FieldError::ImageDecode(e.to_string()))?;

        // the decoder reports CMYK JPEGs as RGB, so go by the frame's component count
        let direct_colour_space = match (format, image.color(), jpeg_components(data.bytes())) {
            (::image::ImageFormat::Jpeg, ColorType::Rgb8, Some(3)) => Some("DeviceRGB"),
            (::image::ImageFormat::Jpeg, ColorType::L8, Some(1)) => Some("DeviceGray"),
            _ => None,
        };

        match direct_colour_space {
            // we can embed it directly!
            Some(colour_space) => Ok(Image {
                width: image.width(),
                height: image.height(),
                encoded: Encoded::Dct {
                    bytes: data.bytes().to_vec(),
                    colour_space,
                },
            }),
            None => Ok(Self::from_raster(&image)),
        }
    }

    /// Encode already-decoded pixels
    pub fn from_raster(image: &DynamicImage) -> Image {
        let level = CompressionLevel::DefaultLevel as u8;

        let alpha = image.color().has_alpha().then(|| {
            let alphas: Vec<u8> = image.pixels().map(|p| (p.2).0[3]).collect();
            compress_to_vec_zlib(&alphas, level)
        });
        let rgb = compress_to_vec_zlib(image.to_rgb8().as_raw(), level);

        Image {
            width: image.width(),
            height: image.height(),
            encoded: Encoded::Flate { rgb, alpha },
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self.encoded, Encoded::Flate { alpha: Some(_), .. })
    }

    /// Add the image (and its soft mask) to `doc`, returning the image XObject's id
    pub(crate) fn write(&self, doc: &mut Document) -> ObjectId {
        let width = self.width as i64;
        let height = self.height as i64;

        match &self.encoded {
            Encoded::Dct {
                bytes,
                colour_space,
            } => doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => *colour_space,
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                bytes.clone(),
            )),
            Encoded::Flate { rgb, alpha } => {
                let mut dict = dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                };

                // add a transparency mask if we have one
                if let Some(alpha) = alpha {
                    let mask_id = doc.add_object(Stream::new(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Image",
                            "Width" => width,
                            "Height" => height,
                            "ColorSpace" => "DeviceGray",
                            "BitsPerComponent" => 8,
                            "Filter" => "FlateDecode",
                        },
                        alpha.clone(),
                    ));
                    dict.set("SMask", Object::Reference(mask_id));
                }

                doc.add_object(Stream::new(dict, rgb.clone()))
            }
        }
    }
}

/// Number of colour components declared by a JPEG's start-of-frame header
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        // skip fill bytes
        while *bytes.get(pos + 1)? == 0xFF {
            pos += 1;
        }
        let marker = *bytes.get(pos + 1)?;
        pos += 2;

        match marker {
            0x01 | 0xD0..=0xD7 => continue,
            // end of image or start of scan without a frame header
            0xD9 | 0xDA => return None,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                // length, precision, height, width, then the component count
                return bytes.get(pos + 7).copied();
            }
            _ => {
                let length = u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]);
                pos += length as usize;
            }
        }
    }
}
