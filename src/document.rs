//! Read-only text layer of a PDF document
//!
//! The whole document is read once when it is opened. Each page keeps its
//! size in points and its text lines, with line boxes stored as
//! percentages of the page so the viewer can lay them out at any size.

use std::path::{Path, PathBuf};

#[cfg(feature = "pdf")]
use log::{debug, info};

use crate::engine::PercentRect;

/// Errors from opening a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("{} has no pages", path.display())]
    Empty { path: PathBuf },

    #[error("{}: built without PDF support", path.display())]
    Unsupported { path: PathBuf },
}

/// One line of text with its box on the page
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub rect: PercentRect,
}

impl TextLine {
    pub fn new(text: impl Into<String>, rect: PercentRect) -> Self {
        Self {
            text: text.into(),
            rect,
        }
    }
}

/// Text layer of a single page
#[derive(Clone, Debug, PartialEq)]
pub struct PageText {
    pub width_pt: f32,
    pub height_pt: f32,
    /// Sorted top to bottom, then left to right
    pub lines: Vec<TextLine>,
}

impl PageText {
    pub fn new(width_pt: f32, height_pt: f32, mut lines: Vec<TextLine>) -> Self {
        sort_reading_order(&mut lines);
        Self {
            width_pt,
            height_pt,
            lines,
        }
    }
}

fn sort_reading_order(lines: &mut [TextLine]) {
    lines.sort_by(|a, b| {
        a.rect
            .top
            .total_cmp(&b.rect.top)
            .then(a.rect.left.total_cmp(&b.rect.left))
    });
}

#[derive(Clone, Debug)]
pub struct PdfDocument {
    path: Option<PathBuf>,
    title: Option<String>,
    pages: Vec<PageText>,
}

impl PdfDocument {
    /// Build a document from pages already in memory
    pub fn from_pages(title: Option<String>, pages: Vec<PageText>) -> Self {
        Self {
            path: None,
            title,
            pages,
        }
    }

    #[cfg(feature = "pdf")]
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        use mupdf::Document;

        info!("Opening PDF: {}", path.display());
        let doc = Document::open(path.to_string_lossy().as_ref())?;
        let page_count = doc.page_count()?.max(0) as usize;
        if page_count == 0 {
            return Err(DocumentError::Empty {
                path: path.to_path_buf(),
            });
        }

        let title = doc
            .metadata(mupdf::MetadataName::Title)
            .ok()
            .filter(|t| !t.trim().is_empty());

        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            let page = doc.load_page(index as i32)?;
            pages.push(extract_page_text(&page)?);
        }

        let line_count: usize = pages.iter().map(|p| p.lines.len()).sum();
        info!("Loaded {page_count} pages with {line_count} text lines");

        Ok(Self {
            path: Some(path.to_path_buf()),
            title,
            pages,
        })
    }

    #[cfg(not(feature = "pdf"))]
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        Err(DocumentError::Unsupported {
            path: path.to_path_buf(),
        })
    }

    /// Title from the document metadata, falling back to the file name
    pub fn display_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&PageText> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }
}

#[cfg(feature = "pdf")]
fn extract_page_text(page: &mupdf::Page) -> Result<PageText, DocumentError> {
    use mupdf::TextPageFlags;
    use mupdf::text_page::TextBlockType;

    let pb = page.bounds()?;
    let width = (pb.x1 - pb.x0).max(1.0);
    let height = (pb.y1 - pb.y0).max(1.0);

    let text_page = page.to_text_page(TextPageFlags::empty())?;
    let mut lines = Vec::new();
    for block in text_page.blocks() {
        if block.r#type() != TextBlockType::Text {
            continue;
        }
        for line in block.lines() {
            let text: String = line.chars().filter_map(|ch| ch.char()).collect();
            if text.trim().is_empty() {
                continue;
            }
            let bbox = line.bounds();
            let rect = PercentRect::new(
                (bbox.x0 - pb.x0) / width * 100.0,
                (bbox.y0 - pb.y0) / height * 100.0,
                (bbox.x1 - bbox.x0) / width * 100.0,
                (bbox.y1 - bbox.y0) / height * 100.0,
            );
            lines.push(TextLine::new(text, rect));
        }
    }

    debug!("Extracted {} lines from page", lines.len());
    Ok(PageText::new(width, height, lines))
}
