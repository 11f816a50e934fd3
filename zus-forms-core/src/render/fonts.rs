//! Fonts for drawn field text
//!
//! A TrueType font with Polish coverage is embedded as a Type0 /
//! CIDFontType2 font (Identity-H, glyph ids as codes). Without one, text is
//! drawn in standard Helvetica with the `/Differences` encoding from
//! [`super::metrics`].

use super::metrics::{
    measure_text, standard_code, DIFFERENCES_START, HELVETICA, HELVETICA_ASCENT,
    HELVETICA_DESCENT, POLISH_DIFFERENCES,
};
use crate::error::{FormError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use ttf_parser::{name_id, Face, GlyphId};

/// Parsed TrueType font kept as raw bytes; the face is re-parsed on use
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    path: Option<PathBuf>,
    data: Vec<u8>,
    postscript_name: String,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    cap_height: i16,
    bbox: [i16; 4],
}

impl EmbeddedFont {
    /// Parse font bytes; `fallback_name` is used when the font has no
    /// PostScript name
    pub fn from_bytes(data: Vec<u8>, fallback_name: &str) -> Result<Self> {
        let face = Face::parse(&data, 0)
            .map_err(|e| FormError::Font(format!("cannot parse font: {e}")))?;

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .unwrap_or_else(|| fallback_name.to_string())
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect::<String>();

        let units_per_em = face.units_per_em().max(1);
        let bbox = face.global_bounding_box();
        let ascent = face.ascender();
        let descent = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascent);

        let font = Self {
            path: None,
            postscript_name,
            units_per_em,
            ascent,
            descent,
            cap_height,
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            data,
        };
        Ok(font)
    }

    /// Read and parse a font file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "EmbeddedFont".to_string());
        let mut font = Self::from_bytes(data, &stem)?;
        font.path = Some(path.to_path_buf());
        Ok(font)
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    fn scale(&self, units: i32) -> i64 {
        i64::from(units) * 1000 / i64::from(self.units_per_em)
    }

    /// Glyph id for `ch`; 0 (.notdef) when the font lacks it
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.face()
            .and_then(|face| face.glyph_index(ch))
            .map(|g| g.0)
            .unwrap_or(0)
    }

    /// Advance width of `ch` in 1/1000 em
    pub fn char_width(&self, ch: char) -> f64 {
        let Some(face) = self.face() else {
            return 500.0;
        };
        let advance = face
            .glyph_index(ch)
            .and_then(|g| face.glyph_hor_advance(g))
            .unwrap_or(self.units_per_em / 2);
        f64::from(advance) * 1000.0 / f64::from(self.units_per_em)
    }

    fn glyph_width(face: &Face<'_>, gid: u16, units_per_em: u16) -> i64 {
        let advance = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0);
        i64::from(advance) * 1000 / i64::from(units_per_em)
    }

    fn font_file(&self, doc: &mut Document) -> Result<ObjectId> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.data)?;
        let compressed = encoder.finish()?;

        let mut dict = Dictionary::new();
        dict.set("Length1", Object::Integer(self.data.len() as i64));
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        Ok(doc.add_object(Stream::new(dict, compressed)))
    }

    fn descriptor(&self, doc: &mut Document, font_file: ObjectId) -> ObjectId {
        let [x_min, y_min, x_max, y_max] = self.bbox;
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        dict.set("FontName", Object::Name(self.postscript_name.as_bytes().to_vec()));
        // Nonsymbolic
        dict.set("Flags", Object::Integer(32));
        dict.set(
            "FontBBox",
            Object::Array(
                [x_min, y_min, x_max, y_max]
                    .iter()
                    .map(|v| Object::Integer(self.scale(i32::from(*v))))
                    .collect(),
            ),
        );
        dict.set("ItalicAngle", Object::Integer(0));
        dict.set("Ascent", Object::Integer(self.scale(i32::from(self.ascent))));
        dict.set("Descent", Object::Integer(self.scale(i32::from(self.descent))));
        dict.set("CapHeight", Object::Integer(self.scale(i32::from(self.cap_height))));
        dict.set("StemV", Object::Integer(80));
        dict.set("FontFile2", Object::Reference(font_file));
        doc.add_object(dict)
    }

    /// `(glyph id, char)` for every used character the font covers
    fn glyphs(&self, used: &BTreeSet<char>) -> Vec<(u16, char)> {
        let Some(face) = self.face() else {
            return Vec::new();
        };
        let mut glyphs: Vec<(u16, char)> = used
            .iter()
            .filter_map(|&ch| face.glyph_index(ch).map(|g| (g.0, ch)))
            .collect();
        glyphs.sort();
        glyphs.dedup_by_key(|(gid, _)| *gid);
        glyphs
    }

    fn to_unicode(glyphs: &[(u16, char)]) -> Vec<u8> {
        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        for chunk in glyphs.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, ch) in chunk {
                let mut units = [0u16; 2];
                let hex: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap.into_bytes()
    }

    fn add_to_document(&self, doc: &mut Document, used: &BTreeSet<char>) -> Result<ObjectId> {
        let font_id = doc.new_object_id();
        let font_file = self.font_file(doc)?;
        let descriptor = self.descriptor(doc, font_file);

        let glyphs = self.glyphs(used);
        let widths: Vec<Object> = match self.face() {
            Some(face) => glyphs
                .iter()
                .flat_map(|(gid, _)| {
                    let width = Self::glyph_width(&face, *gid, self.units_per_em);
                    [
                        Object::Integer(i64::from(*gid)),
                        Object::Array(vec![Object::Integer(width)]),
                    ]
                })
                .collect(),
            None => Vec::new(),
        };
        let to_unicode = doc.add_object(Stream::new(Dictionary::new(), Self::to_unicode(&glyphs)));

        let mut system_info = Dictionary::new();
        system_info.set("Registry", Object::string_literal("Adobe"));
        system_info.set("Ordering", Object::string_literal("Identity"));
        system_info.set("Supplement", Object::Integer(0));

        let mut cid_font = Dictionary::new();
        cid_font.set("Type", Object::Name(b"Font".to_vec()));
        cid_font.set("Subtype", Object::Name(b"CIDFontType2".to_vec()));
        cid_font.set("BaseFont", Object::Name(self.postscript_name.as_bytes().to_vec()));
        cid_font.set("CIDSystemInfo", Object::Dictionary(system_info));
        cid_font.set("FontDescriptor", Object::Reference(descriptor));
        cid_font.set("DW", Object::Integer(1000));
        cid_font.set("W", Object::Array(widths));
        cid_font.set("CIDToGIDMap", Object::Name(b"Identity".to_vec()));
        let cid_font_id = doc.add_object(cid_font);

        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type0".to_vec()));
        font.set("BaseFont", Object::Name(self.postscript_name.as_bytes().to_vec()));
        font.set("Encoding", Object::Name(b"Identity-H".to_vec()));
        font.set("DescendantFonts", Object::Array(vec![Object::Reference(cid_font_id)]));
        font.set("ToUnicode", Object::Reference(to_unicode));
        doc.objects.insert(font_id, Object::Dictionary(font));
        Ok(font_id)
    }
}

/// Font used to draw flattened field text
#[derive(Debug, Clone)]
pub enum FontSource {
    Embedded(Box<EmbeddedFont>),
    /// Helvetica with the Polish `/Differences` encoding
    Standard,
}

impl FontSource {
    /// Embed `preferred` when it exists and parses, otherwise fall back to
    /// Helvetica. Never fails.
    pub fn load(preferred: Option<&Path>) -> Self {
        let Some(path) = preferred else {
            return FontSource::Standard;
        };
        if !path.is_file() {
            tracing::warn!(font = %path.display(), "font not found, falling back to Helvetica");
            return FontSource::Standard;
        }
        match EmbeddedFont::from_file(path) {
            Ok(font) => {
                tracing::info!(font = %path.display(), name = font.postscript_name(), "using font");
                FontSource::Embedded(Box::new(font))
            }
            Err(e) => {
                tracing::warn!(font = %path.display(), error = %e, "unusable font, falling back to Helvetica");
                FontSource::Standard
            }
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, FontSource::Embedded(_))
    }

    pub fn name(&self) -> &str {
        match self {
            FontSource::Embedded(font) => font.postscript_name(),
            FontSource::Standard => "Helvetica",
        }
    }

    /// Ascender in 1/1000 em
    pub fn ascent(&self) -> f64 {
        match self {
            FontSource::Embedded(font) => font.scale(i32::from(font.ascent)) as f64,
            FontSource::Standard => f64::from(HELVETICA_ASCENT),
        }
    }

    /// Descender in 1/1000 em, negative below the baseline
    pub fn descent(&self) -> f64 {
        match self {
            FontSource::Embedded(font) => font.scale(i32::from(font.descent)) as f64,
            FontSource::Standard => f64::from(HELVETICA_DESCENT),
        }
    }

    /// Distance between baselines at `font_size`
    pub fn line_height(&self, font_size: f64) -> f64 {
        (self.ascent() - self.descent()) / 1000.0 * font_size
    }

    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match self {
            FontSource::Embedded(font) => font.char_width(ch),
            FontSource::Standard => f64::from(HELVETICA.char_width(ch)),
        };
        units * font_size / 1000.0
    }

    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        match self {
            FontSource::Embedded(_) => text.chars().map(|ch| self.char_width(ch, font_size)).sum(),
            FontSource::Standard => measure_text(text, font_size),
        }
    }

    /// Operand for `Tj`. Characters the font cannot show become `?` in
    /// Helvetica and .notdef in embedded fonts.
    pub fn encode(&self, text: &str) -> Object {
        match self {
            FontSource::Embedded(font) => {
                let bytes = text
                    .chars()
                    .flat_map(|ch| font.glyph_id(ch).to_be_bytes())
                    .collect();
                Object::String(bytes, StringFormat::Hexadecimal)
            }
            FontSource::Standard => {
                let bytes = text
                    .chars()
                    .map(|ch| standard_code(ch).unwrap_or(b'?'))
                    .collect();
                Object::String(bytes, StringFormat::Literal)
            }
        }
    }

    /// Add the font object(s) to `doc`; `used` drives widths and ToUnicode
    pub fn add_to_document(&self, doc: &mut Document, used: &BTreeSet<char>) -> Result<ObjectId> {
        match self {
            FontSource::Embedded(font) => font.add_to_document(doc, used),
            FontSource::Standard => Ok(Self::add_standard(doc)),
        }
    }

    fn add_standard(doc: &mut Document) -> ObjectId {
        let mut differences = vec![Object::Integer(i64::from(DIFFERENCES_START))];
        differences.extend(
            POLISH_DIFFERENCES
                .iter()
                .map(|(_, glyph)| Object::Name(glyph.as_bytes().to_vec())),
        );

        let mut encoding = Dictionary::new();
        encoding.set("Type", Object::Name(b"Encoding".to_vec()));
        encoding.set("BaseEncoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        encoding.set("Differences", Object::Array(differences));

        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        font.set("Encoding", Object::Dictionary(encoding));
        doc.add_object(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_falls_back() {
        let font = FontSource::load(Some(Path::new("/nonexistent/DejaVuSans.ttf")));
        assert!(!font.is_embedded());
        assert_eq!(font.name(), "Helvetica");
        assert!(!FontSource::load(None).is_embedded());
    }

    #[test]
    fn test_garbage_font_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(!FontSource::load(Some(&path)).is_embedded());
        assert!(matches!(
            EmbeddedFont::from_file(&path),
            Err(FormError::Font(_))
        ));
    }

    #[test]
    fn test_standard_metrics() {
        let font = FontSource::Standard;
        assert_eq!(font.ascent(), 718.0);
        assert!((font.line_height(10.0) - 9.25).abs() < 1e-9);
        assert!((font.text_width("ł", 9.0) - 1.998).abs() < 1e-9);
    }

    #[test]
    fn test_standard_encoding() {
        let encoded = FontSource::Standard.encode("Żółć€");
        assert_eq!(
            encoded,
            Object::String(vec![0x87, 0xF3, 0x8B, 0x89, b'?'], StringFormat::Literal)
        );
    }

    #[test]
    fn test_standard_font_object() {
        let mut doc = Document::with_version("1.7");
        let id = FontSource::Standard
            .add_to_document(&mut doc, &BTreeSet::new())
            .unwrap();
        let font = doc.get_dictionary(id).unwrap();
        let encoding = font.get(b"Encoding").unwrap().as_dict().unwrap();
        let differences = encoding.get(b"Differences").unwrap().as_array().unwrap();
        assert_eq!(differences.len(), 17);
        assert_eq!(differences[0], Object::Integer(0x80));
        assert_eq!(differences[4], Object::Name(b"Lslash".to_vec()));
    }

    #[test]
    fn test_to_unicode_lists_glyphs() {
        let cmap = EmbeddedFont::to_unicode(&[(36, 'A'), (402, 'ł')]);
        let text = String::from_utf8(cmap).unwrap();
        assert!(text.contains("2 beginbfchar"));
        assert!(text.contains("<0024> <0041>"));
        assert!(text.contains("<0192> <0142>"));
    }
}
