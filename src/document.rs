use crate::config::RenderOptions;
use crate::content::render_plan;
use crate::error::RenderError;
use crate::field::Field;
use crate::font::HELVETICA;
use crate::geometry::PageGeometry;
use crate::page::{plan_pages, PagePlan, RenderReport};
use crate::refs::{resolve_dict, ResourceNames};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use std::thread::JoinHandle;

/// How far up the page tree inherited attributes are looked for
const MAX_INHERITANCE_DEPTH: usize = 32;

/// An existing PDF document, opened for stamping.
///
/// Stamping only ever adds: every page keeps its content, resources and annotations,
/// and gets the fields drawn on top of it. Pages are never added, removed or reordered.
pub struct Document {
    inner: lopdf::Document,
    page_ids: Vec<ObjectId>,
}

/// The output of a successful render
#[derive(Debug)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub report: RenderReport,
}

impl Document {
    /// Parse a PDF. Encrypted documents are refused, as their content can't be extended.
    pub fn load(bytes: &[u8]) -> Result<Document, RenderError> {
        let inner = lopdf::Document::load_mem(bytes).map_err(RenderError::Load)?;
        if inner.is_encrypted() {
            return Err(RenderError::Encrypted);
        }
        let page_ids = inner.get_pages().into_values().collect();
        Ok(Document { inner, page_ids })
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// The geometry of every page, in order. Pages without a usable MediaBox, either
    /// their own or inherited from the page tree, are assumed to be US Letter.
    pub fn pages(&self) -> Vec<PageGeometry> {
        self.page_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let number = i as u32 + 1;
                match self.media_box(id) {
                    Some(media_box) => PageGeometry::from_media_box(number, media_box),
                    None => {
                        log::warn!("page {number} has no usable MediaBox, assuming US Letter");
                        PageGeometry::fallback(number)
                    }
                }
            })
            .collect()
    }

    /// Draw `fields` onto their pages.
    ///
    /// Fields that can't be drawn are skipped and listed in the returned report; only a
    /// structurally broken page aborts the whole stamp.
    pub fn stamp(
        &mut self,
        fields: &[Field],
        options: &RenderOptions,
    ) -> Result<RenderReport, RenderError> {
        let (plans, report) = plan_pages(fields, &self.pages(), options);

        for plan in plans.iter() {
            let index = plan.page.number as usize - 1;
            if let Some(&page_id) = self.page_ids.get(index) {
                self.apply(page_id, plan, options)?;
            }
        }

        Ok(report)
    }

    /// Serialize the document
    pub fn save(mut self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        self.inner
            .save_to(&mut bytes)
            .map_err(|e| RenderError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Register the plan's resources on the page and append its overlay
    fn apply(
        &mut self,
        page_id: ObjectId,
        plan: &PagePlan,
        options: &RenderOptions,
    ) -> Result<(), RenderError> {
        let mut resources = self
            .inherited(page_id, b"Resources")
            .and_then(|o| resolve_dict(&self.inner, &o))
            .unwrap_or_else(Dictionary::new);
        let mut names = ResourceNames::collect(&self.inner, &resources);

        let font = if plan.uses_text() {
            let name = names.allocate("StF");
            let id = self.inner.add_object(HELVETICA.dictionary());
            add_resource(&self.inner, &mut resources, b"Font", &name, id);
            Some(name)
        } else {
            None
        };

        let mut images = Vec::with_capacity(plan.images.len());
        for image in plan.images.iter() {
            let name = names.allocate("StIm");
            let id = image.write(&mut self.inner);
            add_resource(&self.inner, &mut resources, b"XObject", &name, id);
            images.push(name);
        }

        log::debug!(
            "page {}: registered font {:?} and images {:?}",
            plan.page.number,
            font,
            images
        );

        // the existing content is fenced in q/Q so it can't leave a transformation or
        // colour behind for the overlay
        let mut overlay = b"Q\n".to_vec();
        overlay.extend(render_plan(plan, font.as_deref(), &images, options));
        let open_id = self.inner.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let overlay_id = self.inner.add_object(Stream::new(Dictionary::new(), overlay));

        let mut contents = vec![Object::Reference(open_id)];
        contents.extend(self.existing_contents(page_id));
        contents.push(Object::Reference(overlay_id));

        let page = self
            .inner
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(RenderError::Load)?;
        page.set("Resources", resources);
        page.set("Contents", contents);

        Ok(())
    }

    /// Look up a page attribute, walking up the page tree for inheritable ones
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut id = page_id;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.inner.get_object(id).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value.clone());
            }
            id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn media_box(&self, page_id: ObjectId) -> Option<[f64; 4]> {
        let value = match self.inherited(page_id, b"MediaBox")? {
            Object::Reference(id) => self.inner.get_object(id).ok()?.clone(),
            value => value,
        };
        let items = value.as_array().ok()?;
        if items.len() != 4 {
            return None;
        }

        let mut media_box = [0.0; 4];
        for (slot, item) in media_box.iter_mut().zip(items) {
            *slot = match item {
                Object::Integer(i) => *i as f64,
                Object::Real(r) => *r as f64,
                _ => return None,
            };
        }
        let [x1, y1, x2, y2] = media_box;
        (x1 != x2 && y1 != y2).then_some(media_box)
    }

    /// The page's content streams, as references in drawing order
    fn existing_contents(&self, page_id: ObjectId) -> Vec<Object> {
        let contents = self
            .inner
            .get_object(page_id)
            .and_then(Object::as_dict)
            .and_then(|page| page.get(b"Contents"));
        match contents {
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Reference(id)) => match self.inner.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            _ => Vec::new(),
        }
    }
}

/// Add `name => id` to one of the resource category dictionaries. The category is copied
/// into `resources` as a direct dictionary so other pages sharing it are unaffected.
fn add_resource(
    doc: &lopdf::Document,
    resources: &mut Dictionary,
    category: &[u8],
    name: &str,
    id: ObjectId,
) {
    let mut entries = resources
        .get(category)
        .ok()
        .and_then(|o| resolve_dict(doc, o))
        .unwrap_or_else(Dictionary::new);
    entries.set(name, Object::Reference(id));
    resources.set(category.to_vec(), entries);
}

/// Load `source`, draw `fields` onto it and serialize the result
pub fn sign_pdf(
    source: &[u8],
    fields: &[Field],
    options: &RenderOptions,
) -> Result<Rendered, RenderError> {
    let mut document = Document::load(source)?;
    let report = document.stamp(fields, options)?;
    let bytes = document.save()?;
    Ok(Rendered { bytes, report })
}

/// Run [sign_pdf] on its own thread. The fields are moved in, so later edits to the
/// caller's store don't affect the render.
pub fn spawn_sign(
    source: Vec<u8>,
    fields: Vec<Field>,
    options: RenderOptions,
) -> JoinHandle<Result<Rendered, RenderError>> {
    std::thread::spawn(move || sign_pdf(&source, &fields, &options))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::field::{FieldId, FieldKind};
    use crate::geometry::PercentRect;
    use lopdf::dictionary;

    /// A document with `count` pages sharing a resource dictionary that already uses the
    /// names a stamp would pick first. The MediaBox lives on the page tree root.
    pub(crate) fn fixture(count: usize, media_box: [i64; 4]) -> Vec<u8> {
        save(fixture_document(count, media_box))
    }

    /// A single page document whose trailer points at a standard security handler
    pub(crate) fn encrypted_fixture() -> Vec<u8> {
        let mut doc = fixture_document(1, [0, 0, 612, 792]);
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "Length" => 40,
            "P" => -44,
            "O" => Object::string_literal(vec![0u8; 32]),
            "U" => Object::string_literal(vec![0u8; 32]),
        });
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer.set(
            "ID",
            vec![
                Object::string_literal(vec![1u8; 16]),
                Object::string_literal(vec![1u8; 16]),
            ],
        );
        save(doc)
    }

    fn save(mut doc: lopdf::Document) -> Vec<u8> {
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn fixture_document(count: usize, media_box: [i64; 4]) -> lopdf::Document {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "StF0" => font_id },
        });

        let kids: Vec<Object> = (0..count)
            .map(|i| {
                let content = format!(
                    "1 0 0 1 50 50 cm BT /StF0 12 Tf 72 720 Td (page {}) Tj ET",
                    i + 1
                );
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "Resources" => resources_id,
                })
                .into()
            })
            .collect();

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
            "MediaBox" => media_box.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn text(id: u64, page: u32, s: &str) -> Field {
        Field::new(
            FieldId(id),
            page,
            PercentRect::new(10.0, 10.0, 30.0, 5.0),
            FieldKind::Text { text: s.into() },
        )
    }

    fn page_dict(doc: &lopdf::Document, number: u32) -> Dictionary {
        let id = doc.get_pages()[&number];
        doc.get_object(id).unwrap().as_dict().unwrap().clone()
    }

    #[test]
    fn inherited_media_box_and_origin() {
        let doc = Document::load(&fixture(2, [10, 20, 622, 812])).unwrap();
        assert_eq!(doc.page_count(), 2);
        let pages = doc.pages();
        assert_eq!(pages[1].number, 2);
        assert_eq!(*pages[0].width, 612.0);
        assert_eq!(*pages[0].height, 792.0);
        assert_eq!((*pages[0].origin.0, *pages[0].origin.1), (10.0, 20.0));
    }

    #[test]
    fn degenerate_media_box_falls_back_to_letter() {
        let doc = Document::load(&fixture(1, [0, 0, 0, 0])).unwrap();
        assert_eq!(doc.pages()[0], PageGeometry::fallback(1));
    }

    #[test]
    fn garbage_is_a_load_error() {
        let err = Document::load(b"definitely not a pdf").err().unwrap();
        assert!(err.is_load_error());
    }

    #[test]
    fn encrypted_documents_are_refused() {
        let err = Document::load(&encrypted_fixture()).err().unwrap();
        assert!(matches!(err, RenderError::Encrypted));
        assert!(err.is_load_error());

        let err = sign_pdf(&encrypted_fixture(), &[text(1, 1, "x")], &RenderOptions::default())
            .unwrap_err();
        assert!(err.is_load_error());
    }

    #[test]
    fn stamped_page_gets_fresh_font_name_and_fenced_content() {
        let rendered = sign_pdf(
            &fixture(2, [0, 0, 612, 792]),
            &[text(1, 1, "Jane Doe")],
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(rendered.report.fields_drawn, 1);

        let doc = lopdf::Document::load_mem(&rendered.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let page = page_dict(&doc, 1);
        let fonts = page
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Font")
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(fonts.has(b"StF0"));
        assert!(fonts.has(b"StF1"));

        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);
        let stream = |o: &Object| {
            let id = o.as_reference().unwrap();
            doc.get_object(id).unwrap().as_stream().unwrap().content.clone()
        };
        assert_eq!(stream(&contents[0]), b"q\n".to_vec());
        let overlay = String::from_utf8(stream(&contents[2])).unwrap();
        assert!(overlay.starts_with("Q\nq\n"));
        assert!(overlay.contains("/StF1 10 Tf"));
        assert!(overlay.contains("(Jane Doe) Tj"));

        // the untouched page still shares the original resources
        let untouched = page_dict(&doc, 2);
        assert!(untouched.get(b"Resources").unwrap().as_reference().is_ok());
        assert!(untouched.get(b"Contents").unwrap().as_reference().is_ok());
    }

    #[test]
    fn media_box_origin_shifts_the_overlay() {
        let rendered = sign_pdf(
            &fixture(1, [100, 100, 712, 892]),
            &[Field::new(
                FieldId(1),
                1,
                PercentRect::new(0.0, 0.0, 10.0, 10.0),
                FieldKind::Checkbox { checked: false },
            )],
            &RenderOptions::default(),
        )
        .unwrap();
        let doc = lopdf::Document::load_mem(&rendered.bytes).unwrap();
        let page = page_dict(&doc, 1);
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        let overlay_id = contents.last().unwrap().as_reference().unwrap();
        let overlay = doc.get_object(overlay_id).unwrap().as_stream().unwrap();
        let overlay = String::from_utf8(overlay.content.clone()).unwrap();
        assert!(overlay.contains("100 812.8 61.2 79.2 re"), "{overlay}");
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let source = fixture(1, [0, 0, 612, 792]);
        let fields = vec![text(1, 1, "same"), text(2, 1, "again")];
        let a = sign_pdf(&source, &fields, &RenderOptions::default()).unwrap();
        let b = sign_pdf(&source, &fields, &RenderOptions::default()).unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn spawned_render_matches_inline_render() {
        let source = fixture(1, [0, 0, 612, 792]);
        let fields = vec![text(1, 1, "threaded")];
        let inline = sign_pdf(&source, &fields, &RenderOptions::default()).unwrap();
        let spawned = spawn_sign(source, fields, RenderOptions::default())
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(inline.bytes, spawned.bytes);
    }
}
