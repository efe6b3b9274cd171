use lopdf::{Dictionary, Document, Object};
use std::collections::HashSet;

/// Resource categories whose names share the page's resource namespace
const CATEGORIES: [&[u8]; 6] = [
    b"Font",
    b"XObject",
    b"ExtGState",
    b"ColorSpace",
    b"Pattern",
    b"Shading",
];

/// Hands out resource names that are not already used by a page, so that fonts and
/// images added for fields never shadow what the page's own content refers to.
pub(crate) struct ResourceNames {
    taken: HashSet<Vec<u8>>,
}

impl ResourceNames {
    /// Collect every name already defined in `resources`
    pub fn collect(doc: &Document, resources: &Dictionary) -> ResourceNames {
        let mut taken = HashSet::new();
        for category in CATEGORIES {
            if let Some(dict) = resources.get(category).ok().and_then(|o| resolve_dict(doc, o)) {
                taken.extend(dict.iter().map(|(name, _)| name.clone()));
            }
        }
        ResourceNames { taken }
    }

    /// The first free name of the form `{prefix}{n}`
    pub fn allocate(&mut self, prefix: &str) -> String {
        let mut n = 0usize;
        loop {
            let candidate = format!("{prefix}{n}");
            if self.taken.insert(candidate.as_bytes().to_vec()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Resolve `object` to a dictionary, following at most one indirect reference
pub(crate) fn resolve_dict(doc: &Document, object: &Object) -> Option<Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok().cloned(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn skips_names_the_page_already_uses() {
        let mut doc = Document::with_version("1.5");
        let xobjects = doc.add_object(dictionary! {
            "StIm0" => Object::Null,
            "StIm2" => Object::Null,
        });
        let resources = dictionary! {
            "Font" => dictionary! { "StF0" => Object::Null },
            "XObject" => xobjects,
        };

        let mut names = ResourceNames::collect(&doc, &resources);
        assert_eq!(names.allocate("StF"), "StF1");
        assert_eq!(names.allocate("StIm"), "StIm1");
        assert_eq!(names.allocate("StIm"), "StIm3");
        assert_eq!(names.allocate("StIm"), "StIm4");
    }

    #[test]
    fn empty_resources_start_at_zero() {
        let doc = Document::with_version("1.5");
        let mut names = ResourceNames::collect(&doc, &Dictionary::new());
        assert_eq!(names.allocate("StF"), "StF0");
    }
}
