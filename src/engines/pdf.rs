//! pdfium-backed document engines: PDF text extraction and PDF rendering.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is synchronous and
//! CPU-bound. Every pdfium call runs on the blocking pool so Tokio worker
//! threads never stall while a long document is parsed or laid out.

use crate::capability::{DocumentFormat, DocumentReader, DocumentRenderer};
use crate::engines::docx::read_docx_text;
use crate::engines::layout::{paginate, wrap_text, PageLayout};
use crate::error::{CapabilityError, MediaDocError};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bind to libpdfium in `lib_dir`, or to the system library.
pub fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, MediaDocError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| MediaDocError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// `pdfium_lib_path` from config, else `PDFIUM_LIB_PATH`.
pub fn pdfium_lib_dir(configured: Option<&Path>) -> Option<PathBuf> {
    configured.map(Path::to_path_buf).or_else(|| {
        std::env::var_os("PDFIUM_LIB_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

async fn blocking<T, F>(f: F) -> Result<T, CapabilityError>
where
    F: FnOnce() -> Result<T, CapabilityError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CapabilityError::failed(format!("pdfium task panicked: {}", e)))?
}

// ── Reading ──────────────────────────────────────────────────────────────

/// Reads `.pdf` text with pdfium and `.docx` text from the archive XML.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentReader {
    lib_dir: Option<PathBuf>,
}

impl FileDocumentReader {
    pub fn new(lib_dir: Option<PathBuf>) -> Self {
        Self { lib_dir }
    }
}

#[async_trait]
impl DocumentReader for FileDocumentReader {
    async fn read_text(&self, path: &Path, format: DocumentFormat) -> Result<String, CapabilityError> {
        let path = path.to_path_buf();
        match format {
            DocumentFormat::Docx => {
                blocking(move || read_docx_text(&path).map_err(CapabilityError::Failed)).await
            }
            DocumentFormat::Pdf => {
                let lib_dir = self.lib_dir.clone();
                blocking(move || read_pdf_text(&path, lib_dir.as_deref())).await
            }
        }
    }
}

/// Text of every page, joined with a newline.
fn read_pdf_text(path: &Path, lib_dir: Option<&Path>) -> Result<String, CapabilityError> {
    let pdfium = bind_pdfium(lib_dir).map_err(CapabilityError::unavailable)?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| CapabilityError::failed(format!("cannot open PDF: {:?}", e)))?;

    let mut pages = Vec::new();
    for (i, page) in document.pages().iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| CapabilityError::failed(format!("page {}: {:?}", i + 1, e)))?;
        pages.push(text.all());
    }
    info!("PDF loaded: {} pages", pages.len());
    Ok(pages.join("\n"))
}

// ── Rendering ────────────────────────────────────────────────────────────

/// Renders text into an A4 PDF with an embedded TrueType font.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    font_path: PathBuf,
    lib_dir: Option<PathBuf>,
    layout: PageLayout,
}

impl PdfRenderer {
    pub fn new(font_path: impl Into<PathBuf>, lib_dir: Option<PathBuf>) -> Self {
        Self {
            font_path: font_path.into(),
            lib_dir,
            layout: PageLayout::default(),
        }
    }
}

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    fn preflight(&self) -> Result<(), MediaDocError> {
        if self.font_path.is_file() {
            Ok(())
        } else {
            Err(MediaDocError::FontNotFound {
                path: self.font_path.clone(),
            })
        }
    }

    async fn render(&self, text: &str, output: &Path) -> Result<(), CapabilityError> {
        let layout = self.layout;
        let pages = paginate(wrap_text(text, layout.chars_per_line), layout.lines_per_page());
        let font_path = self.font_path.clone();
        let lib_dir = self.lib_dir.clone();
        let output = output.to_path_buf();

        blocking(move || write_pdf(&pages, &layout, &font_path, lib_dir.as_deref(), &output)).await
    }
}

fn write_pdf(
    pages: &[Vec<String>],
    layout: &PageLayout,
    font_path: &Path,
    lib_dir: Option<&Path>,
    output: &Path,
) -> Result<(), CapabilityError> {
    let pdf_err = |what: &str, e: PdfiumError| CapabilityError::failed(format!("{}: {:?}", what, e));

    let pdfium = bind_pdfium(lib_dir).map_err(CapabilityError::unavailable)?;
    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| pdf_err("create document", e))?;
    // CID font so scripts beyond Latin-1 (Devanagari, Tamil, ...) are encoded.
    let font = document
        .fonts_mut()
        .load_true_type_from_file(font_path, true)
        .map_err(|e| pdf_err("load font", e))?;

    for lines in pages {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(|e| pdf_err("add page", e))?;
        for (n, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(layout.margin),
                    PdfPoints::new(layout.baseline(n)),
                    line,
                    font,
                    PdfPoints::new(layout.font_size),
                )
                .map_err(|e| pdf_err("place text", e))?;
        }
    }

    document
        .save_to_file(output)
        .map_err(|e| pdf_err("save", e))?;
    debug!("Wrote {} page(s) to {}", pages.len(), output.display());
    Ok(())
}
