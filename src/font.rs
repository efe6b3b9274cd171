use lopdf::{dictionary, Dictionary};

/// One of the standard 14 PDF fonts. These are never embedded: every conforming reader
/// ships them, so a font resource is just a small dictionary naming the font.
///
/// Text is written in WinAnsiEncoding. Characters outside of that encoding can't be
/// shown with a standard font and are replaced with `?`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StandardFont {
    base_font: &'static str,
}

/// Helvetica, used for text and date fields
pub const HELVETICA: StandardFont = StandardFont {
    base_font: "Helvetica",
};

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        self.base_font
    }

    /// Encode `text` for a `Tj` operator. Line breaks and tabs become spaces, other
    /// control characters are dropped.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .filter_map(|ch| match ch {
                '\n' | '\r' | '\t' => Some(b' '),
                c if c.is_control() => None,
                c => Some(win_ansi(c).unwrap_or(b'?')),
            })
            .collect()
    }

    /// The font resource dictionary
    pub(crate) fn dictionary(&self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font,
            "Encoding" => "WinAnsiEncoding",
        }
    }
}

/// The WinAnsiEncoding byte for `ch`. This is Latin-1, except that 0x80..=0x9F hold
/// typographic characters instead of C1 controls.
fn win_ansi(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => Some(match ch {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => return None,
        }),
    }
}
