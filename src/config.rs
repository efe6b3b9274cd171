use crate::colour::{colours, Colour};
use crate::units::Pt;
use std::path::PathBuf;

/// How fields are drawn. The defaults reproduce the standard look: 10pt black Helvetica
/// inset 2pt from the left edge of the field with its baseline 12pt below the top edge,
/// 1pt outlines for checkboxes and radio buttons and a 1.5pt checkmark.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub font_size: Pt,
    /// Distance from the field's left edge to the start of the text
    pub text_inset: Pt,
    /// Distance from the field's top edge down to the text baseline
    pub text_drop: Pt,
    pub border_width: Pt,
    pub check_width: Pt,
    pub ink: Colour,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            font_size: Pt(10.0),
            text_inset: Pt(2.0),
            text_drop: Pt(12.0),
            border_width: Pt(1.0),
            check_width: Pt(1.5),
            ink: colours::BLACK,
        }
    }
}

impl RenderOptions {
    pub fn new() -> RenderOptions {
        RenderOptions::default()
    }

    pub fn font_size<P: Into<Pt>>(&mut self, size: P) -> &mut Self {
        self.font_size = size.into();
        self
    }

    pub fn text_inset<P: Into<Pt>>(&mut self, inset: P) -> &mut Self {
        self.text_inset = inset.into();
        self
    }

    pub fn text_drop<P: Into<Pt>>(&mut self, drop: P) -> &mut Self {
        self.text_drop = drop.into();
        self
    }

    pub fn border_width<P: Into<Pt>>(&mut self, width: P) -> &mut Self {
        self.border_width = width.into();
        self
    }

    pub fn check_width<P: Into<Pt>>(&mut self, width: P) -> &mut Self {
        self.check_width = width.into();
        self
    }

    pub fn ink<C: Into<Colour>>(&mut self, ink: C) -> &mut Self {
        self.ink = ink.into();
        self
    }
}

/// Environment variable naming the directory signed documents are written to
pub const ENV_OUTPUT_DIR: &str = "PDF_STAMP_OUTPUT_DIR";
/// Environment variable naming the JSON-lines audit log; auditing is off when unset
pub const ENV_AUDIT_LOG: &str = "PDF_STAMP_AUDIT_LOG";
/// Environment variable overriding the largest accepted source document, in bytes
pub const ENV_MAX_BYTES: &str = "PDF_STAMP_MAX_BYTES";

/// Settings for [SignService](crate::SignService)
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub output_dir: PathBuf,
    pub audit_log: Option<PathBuf>,
    pub max_document_bytes: usize,
    /// Prefix of the download URL handed back for each signed document
    pub download_prefix: String,
    pub render: RenderOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            output_dir: PathBuf::from("uploads"),
            audit_log: None,
            max_document_bytes: 50 * 1024 * 1024,
            download_prefix: "/api/download/".to_string(),
            render: RenderOptions::default(),
        }
    }
}

impl ServiceConfig {
    /// The defaults, overridden by whichever of the `PDF_STAMP_*` variables are set.
    /// An unparseable size limit is ignored with a warning.
    pub fn from_env() -> ServiceConfig {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(ENV_AUDIT_LOG).filter(|v| !v.is_empty()) {
            config.audit_log = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_MAX_BYTES) {
            match raw.trim().parse() {
                Ok(limit) => config.max_document_bytes = limit,
                Err(e) => log::warn!("ignoring {ENV_MAX_BYTES}={raw:?}: {e}"),
            }
        }
        config
    }

    pub fn output_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.output_dir = dir.into();
        self
    }

    pub fn audit_log<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.audit_log = Some(path.into());
        self
    }

    pub fn max_document_bytes(&mut self, limit: usize) -> &mut Self {
        self.max_document_bytes = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn builder_setters_chain() {
        let options = RenderOptions::new()
            .font_size(12.0)
            .ink((0.0f32, 0.0f32, 0.5f32))
            .clone();
        assert_eq!(options.font_size, Pt(12.0));
        assert_eq!(options.text_drop, Pt(12.0));
        assert_eq!(
            options.ink,
            Colour::RGB {
                r: 0.0,
                g: 0.0,
                b: 0.5
            }
        );
    }

    #[test]
    fn environment_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            (ENV_OUTPUT_DIR, "/tmp/signed"),
            (ENV_AUDIT_LOG, "/tmp/audit.jsonl"),
            (ENV_MAX_BYTES, "1024"),
        ]
        .into_iter()
        .collect();
        let config = ServiceConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/signed"));
        assert_eq!(config.audit_log, Some(PathBuf::from("/tmp/audit.jsonl")));
        assert_eq!(config.max_document_bytes, 1024);
    }

    #[test]
    fn bad_size_limit_keeps_the_default() {
        let config =
            ServiceConfig::from_lookup(|k| (k == ENV_MAX_BYTES).then(|| "lots".to_string()));
        assert_eq!(config.max_document_bytes, 50 * 1024 * 1024);
        assert_eq!(config.audit_log, None);
        assert_eq!(config.output_dir, PathBuf::from("uploads"));
    }
}
