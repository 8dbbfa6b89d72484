/*!
 * Builds the translated output document.
 *
 * Each output page copies the source page's size and rotation, paints every
 * source image over the whole page rectangle and writes the translated text
 * at a fixed anchor, upright in the displayed orientation. Text is not fitted or wrapped and images are not placed at their
 * original positions.
 */

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use log::debug;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use super::document::{SourceDocument, SourcePage};
use crate::errors::DocumentError;

/// Distance of the first baseline from the left page edge, in points
pub const ANCHOR_X: f32 = 72.0;
/// Distance of the first baseline from the top page edge, in points
pub const ANCHOR_Y_FROM_TOP: f32 = 72.0;
/// Text size in points
pub const FONT_SIZE: f32 = 11.0;
/// Baseline-to-baseline distance as a multiple of the font size
pub const LEADING_FACTOR: f32 = 1.2;

const FONT_RESOURCE: &[u8] = b"F1";
const PRODUCER: &str = "indic-pdf-translator";

/// Output document under construction
#[derive(Debug)]
pub struct Reassembler {
    document: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<ObjectId>,
    // source object id -> output object id, so shared images are copied once
    imported: HashMap<ObjectId, ObjectId>,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    /// Start an empty output document
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let font_id = document.add_object(Object::Dictionary(font));

        let mut info = Dictionary::new();
        info.set("Producer", Object::string_literal(PRODUCER));
        let info_id = document.add_object(Object::Dictionary(info));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = document.add_object(Object::Dictionary(catalog));

        document.trailer.set("Root", Object::Reference(catalog_id));
        document.trailer.set("Info", Object::Reference(info_id));

        let mut reassembler = Self {
            document,
            pages_id,
            font_id,
            kids: Vec::new(),
            imported: HashMap::new(),
        };
        reassembler.write_page_tree();
        reassembler
    }

    /// Append a rebuilt copy of `page` carrying `translated_text`
    ///
    /// Text from pages without a native text layer is drawn in red.
    pub fn rebuild(
        &mut self,
        source: &SourceDocument,
        page: &SourcePage,
        translated_text: &str,
    ) -> Result<ObjectId, DocumentError> {
        let mut xobjects = Dictionary::new();
        let mut content = Content { operations: Vec::new() };
        let (media_width, media_height) = page.media_size();

        for (index, image) in source.page_images(page).iter().enumerate() {
            let copied = import_object(&mut self.document, source.document(), image.id, &mut self.imported)?;
            let name = format!("Im{}", index);
            xobjects.set(name.as_str(), Object::Reference(copied));

            content.operations.push(Operation::new("q", vec![]));
            content.operations.push(Operation::new(
                "cm",
                vec![
                    Object::Real(media_width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(media_height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ));
            content
                .operations
                .push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
            content.operations.push(Operation::new("Q", vec![]));
        }

        if !translated_text.is_empty() {
            push_text(&mut content, page, translated_text, !page.has_native_text());
        }

        let encoded = content.encode().map_err(|e| DocumentError::InvalidPage {
            page: page.number,
            message: e.to_string(),
        })?;
        let content_id = self.document.add_object(Stream::new(Dictionary::new(), encoded));

        let mut fonts = Dictionary::new();
        fonts.set(FONT_RESOURCE, Object::Reference(self.font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        if !xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(media_width),
                Object::Real(media_height),
            ]),
        );
        if page.rotation != 0 {
            page_dict.set("Rotate", Object::Integer(page.rotation));
        }
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Reference(content_id));

        let page_id = self.document.add_object(Object::Dictionary(page_dict));
        self.kids.push(page_id);
        self.write_page_tree();

        debug!("Rebuilt page {} as {:?}", page.number, page_id);
        Ok(page_id)
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Finished document
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Write the document to `path`
    ///
    /// The file only appears once it has been written completely.
    pub fn save<P: AsRef<Path>>(mut self, path: P) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };

        let mut staging = tempfile::NamedTempFile::new_in(&parent)?;
        self.document
            .save_to(&mut staging)
            .map_err(|e| DocumentError::Write(e.to_string()))?;
        staging.flush()?;
        staging
            .persist(path)
            .map_err(|e| DocumentError::Write(format!("{}: {}", path.display(), e.error)))?;
        Ok(())
    }

    fn write_page_tree(&mut self) {
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set(
            "Kids",
            Object::Array(self.kids.iter().map(|id| Object::Reference(*id)).collect()),
        );
        pages.set("Count", Object::Integer(self.kids.len() as i64));
        self.document.objects.insert(self.pages_id, Object::Dictionary(pages));
    }
}

fn push_text(content: &mut Content, page: &SourcePage, text: &str, highlight: bool) {
    let ops = &mut content.operations;
    ops.push(Operation::new("q", vec![]));
    if let Some(matrix) = display_matrix(page) {
        ops.push(Operation::new("cm", matrix.into_iter().map(Object::Real).collect()));
    }
    if highlight {
        ops.push(Operation::new(
            "rg",
            vec![Object::Integer(1), Object::Integer(0), Object::Integer(0)],
        ));
    }
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(FONT_RESOURCE.to_vec()), Object::Real(FONT_SIZE)],
    ));
    ops.push(Operation::new("TL", vec![Object::Real(FONT_SIZE * LEADING_FACTOR)]));
    ops.push(Operation::new(
        "Td",
        vec![Object::Real(ANCHOR_X), Object::Real(page.height - ANCHOR_Y_FROM_TOP)],
    ));

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            ops.push(Operation::new("T*", vec![]));
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
        ));
    }

    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

/// Maps displayed coordinates to user space on rotated pages
fn display_matrix(page: &SourcePage) -> Option<[f32; 6]> {
    let (width, height) = page.media_size();
    match page.rotation {
        90 => Some([0.0, 1.0, -1.0, 0.0, width, 0.0]),
        180 => Some([-1.0, 0.0, 0.0, -1.0, width, height]),
        270 => Some([0.0, -1.0, 1.0, 0.0, 0.0, height]),
        _ => None,
    }
}

/// Encode text for the standard Helvetica font
///
/// Characters with no WinAnsi code become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\t' => b' ',
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
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
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Copy an object and everything it references into `target`
fn import_object(
    target: &mut Document,
    source: &Document,
    id: ObjectId,
    imported: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId, DocumentError> {
    if let Some(existing) = imported.get(&id) {
        return Ok(*existing);
    }

    let new_id = target.new_object_id();
    imported.insert(id, new_id);

    let object = source
        .get_object(id)
        .map_err(|e| DocumentError::Write(format!("missing object {:?}: {}", id, e)))?
        .clone();
    let object = rewrite_references(target, source, object, imported)?;
    target.objects.insert(new_id, object);
    Ok(new_id)
}

fn rewrite_references(
    target: &mut Document,
    source: &Document,
    object: Object,
    imported: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object, DocumentError> {
    Ok(match object {
        Object::Reference(id) => Object::Reference(import_object(target, source, id, imported)?),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| rewrite_references(target, source, item, imported))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Object::Dictionary(dict) => Object::Dictionary(rewrite_dictionary(target, source, &dict, imported)?),
        Object::Stream(mut stream) => {
            stream.dict = rewrite_dictionary(target, source, &stream.dict, imported)?;
            Object::Stream(stream)
        }
        other => other,
    })
}

fn rewrite_dictionary(
    target: &mut Document,
    source: &Document,
    dict: &Dictionary,
    imported: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary, DocumentError> {
    let mut rewritten = Dictionary::new();
    for (key, value) in dict.iter() {
        rewritten.set(key.clone(), rewrite_references(target, source, value.clone(), imported)?);
    }
    Ok(rewritten)
}
