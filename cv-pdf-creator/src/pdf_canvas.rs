//! PDF canvas backed by lopdf
//!
//! Draw calls become content-stream operations on the current page. The
//! document objects (pages tree, fonts, catalog) are only built in
//! [`Canvas::output`], so a canvas can be reset and reused cheaply.
//!
//! Standard faces are written as Type1 fonts with WinAnsiEncoding. Custom
//! faces become Type0 composite fonts whose CIDs are glyph ids, with a `W`
//! array and a ToUnicode CMap covering the glyphs actually drawn.

use crate::canvas::{
    Canvas, CanvasError, FontResource, FontSpec, FontStyle, PageFormat, TextDimensions,
    TextOptions,
};
use crate::fonts::{win_ansi_byte, CustomFace, FontContext, FontFace};
use crate::typography::FormattedLine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::{info, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::io::Write;

/// Stroke width of rules, in points.
const RULE_WIDTH_PT: f32 = 0.567;

/// A font referenced by at least one draw call.
struct UsedFont {
    /// Resource name, `F1`, `F2`, ... in first-use order.
    name: String,
    key: String,
    face: FontFace,
    /// Glyph id -> (character, advance in 1/1000 em), custom faces only.
    glyphs: BTreeMap<u16, (char, f32)>,
}

pub struct PdfCanvas {
    format: PageFormat,
    fonts: FontContext,
    pages: Vec<Vec<Operation>>,
    current: usize,
    used_fonts: Vec<UsedFont>,
    compress: bool,
}

impl PdfCanvas {
    pub fn new(format: PageFormat) -> Self {
        Self {
            format,
            fonts: FontContext::new(format.unit),
            pages: vec![Vec::new()],
            current: 0,
            used_fonts: Vec::new(),
            compress: true,
        }
    }

    pub fn a4() -> Self {
        Self::new(PageFormat::A4)
    }

    /// Writes plain content streams, handy when inspecting output by hand.
    pub fn uncompressed(mut self) -> Self {
        self.compress = false;
        self
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    fn to_pdf_x(&self, x: f32) -> f32 {
        x * self.format.unit.scale()
    }

    fn to_pdf_y(&self, y: f32) -> f32 {
        (self.format.height - y) * self.format.unit.scale()
    }

    /// Index into `used_fonts` for the active face, registering it on first use.
    fn font_slot(&mut self) -> usize {
        let key = self.fonts.face().key();
        if let Some(index) = self.used_fonts.iter().position(|used| used.key == key) {
            return index;
        }
        self.used_fonts.push(UsedFont {
            name: format!("F{}", self.used_fonts.len() + 1),
            key,
            face: self.fonts.face().clone(),
            glyphs: BTreeMap::new(),
        });
        self.used_fonts.len() - 1
    }

    fn stream(&self, dict: Dictionary, data: Vec<u8>) -> Result<Stream, CanvasError> {
        if self.compress {
            compressed_stream(dict, data)
        } else {
            Ok(Stream::new(dict, data))
        }
    }

    fn add_font_to_document(&self, doc: &mut Document, used: &UsedFont) -> Result<ObjectId, CanvasError> {
        match &used.face {
            FontFace::Standard(face) => {
                let mut font_dict = Dictionary::new();
                font_dict.set("Type", Object::Name(b"Font".to_vec()));
                font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
                font_dict.set("BaseFont", Object::Name(face.base_font().as_bytes().to_vec()));
                font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
                Ok(doc.add_object(font_dict))
            }
            FontFace::Custom(face) => self.add_composite_font(doc, face, &used.glyphs),
        }
    }

    fn add_composite_font(
        &self,
        doc: &mut Document,
        face: &CustomFace,
        glyphs: &BTreeMap<u16, (char, f32)>,
    ) -> Result<ObjectId, CanvasError> {
        let base_font_name = pdf_font_name(face);
        let (ascent, descent) = face.vertical_metrics();
        let cff = face.is_cff();

        let mut file_dict = Dictionary::new();
        if cff {
            file_dict.set("Subtype", Object::Name(b"OpenType".to_vec()));
        } else {
            file_dict.set("Length1", Object::Integer(face.data.len() as i64));
        }
        let font_file = self.stream(file_dict, face.data.to_vec())?;
        let font_file_id = doc.add_object(font_file);

        let mut font_descriptor = Dictionary::new();
        font_descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        font_descriptor.set("FontName", Object::Name(base_font_name.clone().into_bytes()));
        font_descriptor.set("Flags", Object::Integer(4));
        font_descriptor.set(
            "FontBBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(descent.round() as i64),
                Object::Integer(1000),
                Object::Integer(ascent.round() as i64),
            ]),
        );
        font_descriptor.set("ItalicAngle", Object::Integer(0));
        font_descriptor.set("Ascent", Object::Integer(ascent.round() as i64));
        font_descriptor.set("Descent", Object::Integer(descent.round() as i64));
        font_descriptor.set("CapHeight", Object::Integer(700));
        font_descriptor.set("StemV", Object::Integer(80));
        let file_key = if cff { "FontFile3" } else { "FontFile2" };
        font_descriptor.set(file_key, Object::Reference(font_file_id));
        let font_descriptor_id = doc.add_object(font_descriptor);

        let mut cidfont = Dictionary::new();
        cidfont.set("Type", Object::Name(b"Font".to_vec()));
        let subtype: &[u8] = if cff { b"CIDFontType0" } else { b"CIDFontType2" };
        cidfont.set("Subtype", Object::Name(subtype.to_vec()));
        cidfont.set("BaseFont", Object::Name(base_font_name.clone().into_bytes()));
        cidfont.set("CIDSystemInfo", Object::Dictionary({
            let mut d = Dictionary::new();
            d.set("Registry", Object::string_literal("Adobe"));
            d.set("Ordering", Object::string_literal("Identity"));
            d.set("Supplement", Object::Integer(0));
            d
        }));
        cidfont.set("FontDescriptor", Object::Reference(font_descriptor_id));
        cidfont.set("DW", Object::Integer(1000));
        cidfont.set("W", Object::Array(glyph_widths(glyphs)));
        if !cff {
            cidfont.set("CIDToGIDMap", Object::Name(b"Identity".to_vec()));
        }
        let cidfont_id = doc.add_object(cidfont);

        let to_unicode = self.stream(Dictionary::new(), to_unicode_cmap(glyphs).into_bytes())?;
        let to_unicode_id = doc.add_object(to_unicode);

        let mut type0 = Dictionary::new();
        type0.set("Type", Object::Name(b"Font".to_vec()));
        type0.set("Subtype", Object::Name(b"Type0".to_vec()));
        type0.set("BaseFont", Object::Name(base_font_name.into_bytes()));
        type0.set("Encoding", Object::Name(b"Identity-H".to_vec()));
        type0.set("DescendantFonts", Object::Array(vec![Object::Reference(cidfont_id)]));
        type0.set("ToUnicode", Object::Reference(to_unicode_id));
        Ok(doc.add_object(type0))
    }
}

fn compressed_stream(mut dict: Dictionary, data: Vec<u8>) -> Result<Stream, CanvasError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data)?;
    let compressed = encoder.finish()?;
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    Ok(Stream::new(dict, compressed))
}

fn sanitize_pdf_font_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else if ch.is_whitespace() {
            out.push('-');
        }
    }
    if out.is_empty() {
        "CustomFont".to_string()
    } else {
        out
    }
}

fn pdf_font_name(face: &CustomFace) -> String {
    let name = sanitize_pdf_font_name(&face.id);
    match face.style {
        FontStyle::Normal => name,
        FontStyle::Bold => format!("{}-Bold", name),
    }
}

// [gid [width] gid [width] ...]
fn glyph_widths(glyphs: &BTreeMap<u16, (char, f32)>) -> Vec<Object> {
    let mut widths = Vec::with_capacity(glyphs.len() * 2);
    for (gid, (_, width)) in glyphs {
        widths.push(Object::Integer(*gid as i64));
        widths.push(Object::Array(vec![Object::Real(*width)]));
    }
    widths
}

fn to_unicode_cmap(glyphs: &BTreeMap<u16, (char, f32)>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo\n\
         << /Registry (Adobe)\n\
         /Ordering (UCS)\n\
         /Supplement 0\n\
         >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let entries: Vec<(&u16, &(char, f32))> = glyphs.iter().collect();
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, (ch, _)) in chunk {
            let utf16: String = ch
                .encode_utf16(&mut [0; 2])
                .iter()
                .map(|unit| format!("{:04X}", unit))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, utf16));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end",
    );
    cmap
}

/// Builds the `TJ` operand for one line: encoded runs separated by kerning
/// and word-spacing adjustments (in 1/1000 em, negative moves right).
fn build_tj_array(
    face: &FontFace,
    glyphs: &mut BTreeMap<u16, (char, f32)>,
    line: &FormattedLine,
    size: f32,
) -> Vec<Object> {
    let chars: Vec<char> = line.text.chars().collect();
    let mut tj = Vec::new();
    let mut run: Vec<u8> = Vec::new();

    for (i, &ch) in chars.iter().enumerate() {
        match face {
            FontFace::Standard(_) => {
                let byte = win_ansi_byte(ch).unwrap_or_else(|| {
                    warn!("character {:?} is not WinAnsi encodable, drawing '?'", ch);
                    b'?'
                });
                run.push(byte);
            }
            FontFace::Custom(custom) => {
                let gid = custom.glyph_id(ch);
                if gid == 0 && !ch.is_whitespace() {
                    warn!("font `{}` has no glyph for {:?}", custom.id, ch);
                }
                glyphs.entry(gid).or_insert((ch, custom.char_width(ch)));
                run.extend_from_slice(&gid.to_be_bytes());
            }
        }

        let mut adjust = 0.0;
        if let Some(&next) = chars.get(i + 1) {
            adjust -= face.kern(ch, next);
        }
        if ch == ' ' && line.word_spacing > 0.0 {
            adjust -= line.word_spacing * 1000.0 / size;
        }
        if adjust.abs() > 0.001 {
            tj.push(Object::String(std::mem::take(&mut run), StringFormat::Hexadecimal));
            tj.push(Object::Real(adjust));
        }
    }

    if !run.is_empty() {
        tj.push(Object::String(run, StringFormat::Hexadecimal));
    }
    tj
}

impl Canvas for PdfCanvas {
    fn reset(&mut self) -> Result<(), CanvasError> {
        self.fonts.reset();
        self.pages = vec![Vec::new()];
        self.current = 0;
        self.used_fonts.clear();
        Ok(())
    }

    fn add_page(&mut self) -> Result<usize, CanvasError> {
        self.pages.push(Vec::new());
        Ok(self.pages.len() - 1)
    }

    fn set_page(&mut self, index: usize) -> Result<(), CanvasError> {
        if index >= self.pages.len() {
            return Err(CanvasError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn set_font(&mut self, font: &FontSpec) -> Result<(), CanvasError> {
        self.fonts.set_font(font)
    }

    fn text_dimensions(&self, text: &str, max_width: Option<f32>) -> TextDimensions {
        self.fonts.dimensions(text, max_width)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        options: TextOptions,
    ) -> Result<(), CanvasError> {
        let lines = self.fonts.layout(text, options.max_width, options.align);
        if lines.iter().all(|line| line.text.is_empty()) {
            return Ok(());
        }

        let slot = self.font_slot();
        let face = self.fonts.face().clone();
        let size = self.fonts.size();
        let leading = self.fonts.line_height();
        let pdf_x = self.to_pdf_x(x);

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![
                Object::Name(self.used_fonts[slot].name.as_bytes().to_vec()),
                Object::Real(size),
            ]),
        ];

        for (i, line) in lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            let pdf_y = self.to_pdf_y(y + i as f32 * leading);
            operations.push(Operation::new("Tm", vec![
                Object::Real(1.0), Object::Real(0.0),
                Object::Real(0.0), Object::Real(1.0),
                Object::Real(pdf_x), Object::Real(pdf_y),
            ]));
            let tj = build_tj_array(&face, &mut self.used_fonts[slot].glyphs, line, size);
            operations.push(Operation::new("TJ", vec![Object::Array(tj)]));
        }

        operations.push(Operation::new("ET", vec![]));
        self.pages[self.current].extend(operations);
        Ok(())
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<(), CanvasError> {
        let operations = [
            Operation::new("w", vec![Object::Real(RULE_WIDTH_PT)]),
            Operation::new("m", vec![Object::Real(self.to_pdf_x(x1)), Object::Real(self.to_pdf_y(y1))]),
            Operation::new("l", vec![Object::Real(self.to_pdf_x(x2)), Object::Real(self.to_pdf_y(y2))]),
            Operation::new("S", vec![]),
        ];
        self.pages[self.current].extend(operations);
        Ok(())
    }

    fn register_font(&mut self, resource: &FontResource) -> Result<(), CanvasError> {
        self.fonts.register(resource)
    }

    fn page_width(&self) -> f32 {
        self.format.width
    }

    fn page_height(&self) -> f32 {
        self.format.height
    }

    fn output(&mut self) -> Result<Vec<u8>, CanvasError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font_dict = Dictionary::new();
        for used in &self.used_fonts {
            let font_id = self.add_font_to_document(&mut doc, used)?;
            font_dict.set(used.name.as_str(), Object::Reference(font_id));
        }
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_dict));
        let resources_id = doc.add_object(resources);

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in &self.pages {
            let content = Content {
                operations: operations.clone(),
            };
            let content_stream = self.stream(Dictionary::new(), content.encode()?)?;
            let content_id = doc.add_object(content_stream);

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name(b"Page".to_vec()));
            page_dict.set("Parent", Object::Reference(pages_id));
            page_dict.set("Resources", Object::Reference(resources_id));
            page_dict.set("MediaBox", Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.format.width_pt()),
                Object::Real(self.format.height_pt()),
            ]));
            page_dict.set("Contents", Object::Reference(content_id));
            kids.push(Object::Reference(doc.add_object(page_dict)));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(kids.len() as i64));
        pages_dict.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut info_dict = Dictionary::new();
        info_dict.set("Producer", Object::string_literal("CV PDF Creator"));
        let info_id = doc.add_object(info_dict);

        let mut catalog_dict = Dictionary::new();
        catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog_dict.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog_dict);

        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.trailer.set("Info", Object::Reference(info_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        info!(
            "PDF written: {} page(s), {} font(s), {} bytes",
            self.pages.len(),
            self.used_fonts.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn media_type(&self) -> &'static str {
        "application/pdf"
    }
}
