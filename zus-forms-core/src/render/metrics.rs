//! Built-in Helvetica metrics and the single-byte encoding used when no
//! TrueType font is available
//!
//! WinAnsiEncoding lacks most Polish letters, so codes 0x80..=0x8F are
//! redefined through `/Differences` with the standard glyph names from the
//! Adobe Glyph List. Ó and ó are already part of WinAnsi.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Ascender and descender of Helvetica, 1/1000 em
pub const HELVETICA_ASCENT: i16 = 718;
pub const HELVETICA_DESCENT: i16 = -207;

/// First code redefined by [`POLISH_DIFFERENCES`]
pub const DIFFERENCES_START: u8 = 0x80;

/// Polish letters in code order from [`DIFFERENCES_START`]
pub const POLISH_DIFFERENCES: [(char, &str); 16] = [
    ('Ą', "Aogonek"),
    ('Ć', "Cacute"),
    ('Ę', "Eogonek"),
    ('Ł', "Lslash"),
    ('Ń', "Nacute"),
    ('Ś', "Sacute"),
    ('Ź', "Zacute"),
    ('Ż', "Zdotaccent"),
    ('ą', "aogonek"),
    ('ć', "cacute"),
    ('ę', "eogonek"),
    ('ł', "lslash"),
    ('ń', "nacute"),
    ('ś', "sacute"),
    ('ź', "zacute"),
    ('ż', "zdotaccent"),
];

/// Character width information for a standard PDF font.
/// All widths are in 1/1000 of a unit (font size 1.0)
pub struct FontMetrics {
    widths: HashMap<char, u16>,
    default_width: u16,
}

impl FontMetrics {
    fn new(default_width: u16) -> Self {
        Self {
            widths: HashMap::new(),
            default_width,
        }
    }

    fn with_widths(mut self, widths: &[(char, u16)]) -> Self {
        for &(ch, width) in widths {
            self.widths.insert(ch, width);
        }
        self
    }

    pub fn char_width(&self, ch: char) -> u16 {
        self.widths.get(&ch).copied().unwrap_or(self.default_width)
    }
}

lazy_static! {
    pub(crate) static ref HELVETICA: FontMetrics = FontMetrics::new(556).with_widths(&[
        (' ', 278), ('!', 278), ('"', 355), ('#', 556), ('$', 556), ('%', 889),
        ('&', 667), ('\'', 191), ('(', 333), (')', 333), ('*', 389), ('+', 584),
        (',', 278), ('-', 333), ('.', 278), ('/', 278), ('0', 556), ('1', 556),
        ('2', 556), ('3', 556), ('4', 556), ('5', 556), ('6', 556), ('7', 556),
        ('8', 556), ('9', 556), (':', 278), (';', 278), ('<', 584), ('=', 584),
        ('>', 584), ('?', 556), ('@', 1015), ('A', 667), ('B', 667), ('C', 722),
        ('D', 722), ('E', 667), ('F', 611), ('G', 778), ('H', 722), ('I', 278),
        ('J', 500), ('K', 667), ('L', 556), ('M', 833), ('N', 722), ('O', 778),
        ('P', 667), ('Q', 778), ('R', 722), ('S', 667), ('T', 611), ('U', 722),
        ('V', 667), ('W', 944), ('X', 667), ('Y', 667), ('Z', 611), ('[', 278),
        ('\\', 278), (']', 278), ('^', 469), ('_', 556), ('`', 333), ('a', 556),
        ('b', 556), ('c', 500), ('d', 556), ('e', 556), ('f', 278), ('g', 556),
        ('h', 556), ('i', 222), ('j', 222), ('k', 500), ('l', 222), ('m', 833),
        ('n', 556), ('o', 556), ('p', 556), ('q', 556), ('r', 333), ('s', 500),
        ('t', 278), ('u', 556), ('v', 500), ('w', 722), ('x', 500), ('y', 500),
        ('z', 500), ('{', 334), ('|', 260), ('}', 334), ('~', 584),
        // Latin-1 letters likely in Polish documents
        ('Ó', 778), ('ó', 556), ('Ö', 778), ('ö', 556), ('Ü', 722), ('ü', 556),
        ('É', 667), ('é', 556), ('§', 556), ('°', 400), ('«', 556), ('»', 556),
        // Glyphs placed by /Differences
        ('Ą', 667), ('Ć', 722), ('Ę', 667), ('Ł', 556), ('Ń', 722), ('Ś', 667),
        ('Ź', 611), ('Ż', 611), ('ą', 556), ('ć', 500), ('ę', 556), ('ł', 222),
        ('ń', 556), ('ś', 500), ('ź', 500), ('ż', 500),
    ]);
}

/// Byte for `ch` in the fallback encoding, `None` when it has no glyph
pub fn standard_code(ch: char) -> Option<u8> {
    if let Some(index) = POLISH_DIFFERENCES.iter().position(|(c, _)| *c == ch) {
        return Some(DIFFERENCES_START + index as u8);
    }
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(ch as u8),
        _ => None,
    }
}

/// Width of `text` in Helvetica at `font_size`
pub fn measure_text(text: &str, font_size: f64) -> f64 {
    text.chars()
        .map(|ch| HELVETICA.char_width(ch) as f64)
        .sum::<f64>()
        * font_size
        / 1000.0
}
