/*!
 * PDF input and output.
 *
 * - `document`: read-only source document and page model
 * - `render`: page rasterisation for OCR
 * - `reassembler`: construction of the translated output document
 */

pub use self::document::{DocumentSource, PageImage, SourceDocument, SourcePage};
pub use self::reassembler::Reassembler;
pub use self::render::{PageRenderer, PdftoppmRenderer, RenderedPage};

pub mod document;
pub mod reassembler;
pub mod render;
