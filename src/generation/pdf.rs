//! Single-page PDF rendering with `lopdf`.
//!
//! Lays out a sequence of text lines top-down on an A4 page using the
//! standard Helvetica fonts, so no font files need to ship with the binary.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use super::common::{pdf_safe_text, wrap_text};
use super::GenerationError;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: i64 = 56;
const MARGIN_TOP: i64 = 60;
const MARGIN_BOTTOM: i64 = 56;
const LINE_GAP: i64 = 6;
const WRAP_WIDTH: usize = 80;

/// One line of document text.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLine {
    pub text: String,
    pub size: i64,
    pub bold: bool,
}

impl DocumentLine {
    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 16,
            bold: true,
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 11,
            bold: false,
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 11,
            bold: true,
        }
    }

    pub fn blank() -> Self {
        Self::body("")
    }
}

/// Stateless engine for rendering text lines to PDF.
pub struct PdfRenderEngine;

impl PdfRenderEngine {
    /// Render `lines` onto one page. Lines that would run past the bottom
    /// margin are dropped with a warning.
    pub fn render(
        title: &str,
        lines: &[DocumentLine],
        watermark: Option<&str>,
    ) -> Result<Vec<u8>, GenerationError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut operations = Vec::new();
        if let Some(text) = watermark.filter(|w| !w.trim().is_empty()) {
            push_watermark(&mut operations, text);
        }

        let mut y = PAGE_HEIGHT - MARGIN_TOP;
        'lines: for line in lines {
            for segment in wrap_text(&line.text, WRAP_WIDTH) {
                if y < MARGIN_BOTTOM {
                    log::warn!("Document '{}' overflowed its page, truncating", title);
                    break 'lines;
                }
                push_text(&mut operations, &segment, line.size, line.bold, MARGIN_LEFT, y);
                y -= line.size + LINE_GAP;
            }
        }

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| GenerationError::Pdf(format!("content encoding failed: {}", e)))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
            "Contents" => content_id,
            "Resources" => resources_id,
        });

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(pdf_safe_text(title), StringFormat::Literal),
            "Producer" => Object::String(b"DHA Document Portal".to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| GenerationError::Pdf(format!("save failed: {}", e)))?;
        Ok(buffer)
    }
}

fn push_text(operations: &mut Vec<Operation>, text: &str, size: i64, bold: bool, x: i64, y: i64) {
    let font: &[u8] = if bold { b"F2" } else { b"F1" };
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![Object::Name(font.to_vec()), Object::Integer(size)],
    ));
    operations.push(Operation::new(
        "Td",
        vec![Object::Integer(x), Object::Integer(y)],
    ));
    operations.push(Operation::new(
        "Tj",
        vec![Object::String(pdf_safe_text(text), StringFormat::Literal)],
    ));
    operations.push(Operation::new("ET", vec![]));
}

fn push_watermark(operations: &mut Vec<Operation>, text: &str) {
    operations.push(Operation::new("q", vec![]));
    operations.push(Operation::new("g", vec![Object::Real(0.85)]));
    push_text(operations, text, 64, true, 120, PAGE_HEIGHT / 2);
    operations.push(Operation::new("Q", vec![]));
}
