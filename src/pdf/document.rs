/*!
 * Read-only view of a source PDF.
 *
 * Pages are enumerated once at open time in document order. Geometry and
 * resources are resolved through the page tree, so attributes inherited
 * from a parent `Pages` node are honoured.
 *
 * Text held inside Form XObjects is not part of the extracted text layer.
 */

use bytes::Bytes;
use lopdf::{Dictionary, Document, Object, ObjectId};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::errors::DocumentError;

/// US Letter, used when a page carries no usable box
const FALLBACK_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Guards against cyclic `Parent` chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// Where the document bytes came from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Opened from a file on disk
    File(PathBuf),
    /// Opened from an in-memory byte stream
    Memory(Bytes),
}

/// One page of a source document
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// 1-based page number
    pub number: u32,
    /// Page object id inside the source document
    pub id: ObjectId,
    /// Displayed page width in points, after `/Rotate`
    pub width: f32,
    /// Displayed page height in points, after `/Rotate`
    pub height: f32,
    /// Clockwise display rotation: 0, 90, 180 or 270
    pub rotation: i64,
    native_text: String,
}

impl SourcePage {
    /// Text layer as extracted from the content stream (possibly empty)
    pub fn native_text(&self) -> &str {
        &self.native_text
    }

    /// Whether the text layer holds anything besides whitespace
    pub fn has_native_text(&self) -> bool {
        !self.native_text.trim().is_empty()
    }

    /// Page size in unrotated user space
    pub fn media_size(&self) -> (f32, f32) {
        match self.rotation {
            90 | 270 => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }
}

/// A raster image drawn by a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Resource name on the source page
    pub name: Vec<u8>,
    /// Image stream object id
    pub id: ObjectId,
}

/// A loaded source document and its pages
#[derive(Debug)]
pub struct SourceDocument {
    document: Document,
    source: DocumentSource,
    pages: Vec<SourcePage>,
}

impl SourceDocument {
    /// Open a PDF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let document = Document::load(path)
            .map_err(|e| DocumentError::Open(format!("{}: {}", path.display(), e)))?;
        Self::from_document(document, DocumentSource::File(path.to_path_buf()))
    }

    /// Open a PDF held in memory
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self, DocumentError> {
        let bytes = bytes.into();
        let document = Document::load_mem(&bytes)?;
        Self::from_document(document, DocumentSource::Memory(bytes))
    }

    fn from_document(document: Document, source: DocumentSource) -> Result<Self, DocumentError> {
        let mut pages = Vec::new();

        for (number, id) in document.get_pages() {
            let rotation = page_rotation(&document, id);
            let (media_width, media_height) = page_size(&document, id);
            let (width, height) = match rotation {
                90 | 270 => (media_height, media_width),
                _ => (media_width, media_height),
            };
            let native_text = match document.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Could not read text layer of page {}: {}", number, e);
                    String::new()
                }
            };

            debug!(
                "Page {}: {}x{} pt, rotated {}, {} chars of native text",
                number,
                width,
                height,
                rotation,
                native_text.trim().chars().count()
            );

            pages.push(SourcePage {
                number,
                id,
                width,
                height,
                rotation,
                native_text,
            });
        }

        Ok(Self {
            document,
            source,
            pages,
        })
    }

    pub fn pages(&self) -> &[SourcePage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Underlying PDF object graph
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Image XObjects used by a page, in resource dictionary order
    ///
    /// Images drawn by a Form XObject of the page are listed in place of the
    /// form, one level deep. Each image appears once.
    pub fn page_images(&self, page: &SourcePage) -> Vec<PageImage> {
        let Some(resources) = inherited_attribute(&self.document, page.id, b"Resources")
            .and_then(|object| object.as_dict().ok())
        else {
            return Vec::new();
        };

        let mut images: Vec<PageImage> = Vec::new();
        for (name, id) in xobject_refs(&self.document, resources) {
            match xobject_subtype(&self.document, id) {
                Some(b"Image") => push_unique(&mut images, PageImage { name, id }),
                Some(b"Form") => {
                    let nested = self
                        .document
                        .get_object(id)
                        .and_then(Object::as_stream)
                        .ok()
                        .and_then(|form| form.dict.get(b"Resources").ok())
                        .map(|object| resolve(&self.document, object))
                        .and_then(|object| object.as_dict().ok());
                    for (name, id) in nested.map(|r| xobject_refs(&self.document, r)).unwrap_or_default() {
                        if matches!(xobject_subtype(&self.document, id), Some(b"Image")) {
                            push_unique(&mut images, PageImage { name, id });
                        }
                    }
                }
                _ => {}
            }
        }
        images
    }
}

fn push_unique(images: &mut Vec<PageImage>, image: PageImage) {
    if !images.iter().any(|existing| existing.id == image.id) {
        images.push(image);
    }
}

/// Named XObject references of a resource dictionary
fn xobject_refs(document: &Document, resources: &Dictionary) -> Vec<(Vec<u8>, ObjectId)> {
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .map(|object| resolve(document, object))
        .and_then(|object| object.as_dict().ok())
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(name, object)| match object {
            Object::Reference(id) => Some((name.clone(), *id)),
            _ => None,
        })
        .collect()
}

/// Clockwise `/Rotate` of a page, normalised to 0, 90, 180 or 270
fn page_rotation(document: &Document, page_id: ObjectId) -> i64 {
    let Some(Object::Integer(value)) = inherited_attribute(document, page_id, b"Rotate") else {
        return 0;
    };
    let rotation = value.rem_euclid(360);
    if rotation % 90 != 0 {
        warn!("Page {:?} has invalid /Rotate {}, ignoring it", page_id, value);
        return 0;
    }
    rotation
}

/// Visible page size: CropBox when present, MediaBox otherwise
fn page_size(document: &Document, page_id: ObjectId) -> (f32, f32) {
    let rect = inherited_attribute(document, page_id, b"CropBox")
        .and_then(|object| rectangle(document, object))
        .or_else(|| {
            inherited_attribute(document, page_id, b"MediaBox").and_then(|object| rectangle(document, object))
        });

    match rect {
        Some([x0, y0, x1, y1]) => ((x1 - x0).abs(), (y1 - y0).abs()),
        None => {
            warn!("Page {:?} has no usable MediaBox, assuming US Letter", page_id);
            FALLBACK_PAGE_SIZE
        }
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys
fn inherited_attribute<'a>(document: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current: &Dictionary = document.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(resolve(document, value));
        }
        let parent = match current.get(b"Parent").ok()? {
            Object::Reference(id) => *id,
            _ => return None,
        };
        current = document.get_dictionary(parent).ok()?;
    }

    None
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

fn rectangle(document: &Document, object: &Object) -> Option<[f32; 4]> {
    let Object::Array(items) = object else {
        return None;
    };
    if items.len() != 4 {
        return None;
    }

    let mut rect = [0.0f32; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = as_number(resolve(document, item))?;
    }
    Some(rect)
}

pub(crate) fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

fn xobject_subtype(document: &Document, id: ObjectId) -> Option<&[u8]> {
    match document.get_object(id) {
        Ok(Object::Stream(stream)) => match stream.dict.get(b"Subtype") {
            Ok(Object::Name(subtype)) => Some(subtype.as_slice()),
            _ => None,
        },
        _ => None,
    }
}
