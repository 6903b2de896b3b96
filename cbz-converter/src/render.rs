use camino::Utf8Path;
#[cfg(feature = "render")]
use mupdf::{Colorspace, Document, ImageFormat, Matrix};

use crate::{staging::ImageSink, ExtractionError, Result};

/// Pages are rasterised at twice their natural size
#[cfg(feature = "render")]
pub static RENDER_SCALE: f32 = 2.0;

#[cfg(feature = "render")]
pub static RENDER_EXTENSION: &str = "png";

/// Rasterises the pages of a PDF or MOBI/AZW3 document into PNG images
#[cfg(feature = "render")]
pub struct PageRenderer {
    document: Document,
}

#[cfg(feature = "render")]
impl PageRenderer {
    /// ## Errors
    ///
    /// Fails if the document can't be opened
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let document = Document::open(path.as_str()).map_err(ExtractionError::from)?;

        Ok(Self { document })
    }

    /// Opens an ebook as MOBI whatever its extension (`.azw3` is unknown to the renderer)
    ///
    /// ## Errors
    ///
    /// Fails if the file can't be read or isn't a valid ebook
    pub fn open_mobi(path: &Utf8Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let document = Document::from_bytes(&bytes, "mobi").map_err(ExtractionError::from)?;

        Ok(Self { document })
    }

    /// ## Errors
    ///
    /// Fails if the document layout can't be computed
    pub fn page_count(&self) -> Result<usize> {
        let count = self
            .document
            .page_count()
            .map_err(ExtractionError::from)?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Renders the page at `index` (0-based) and writes it into `sink` at `ordinal`
    ///
    /// ## Errors
    ///
    /// Fails if the page doesn't exist or can't be rendered, or if the image can't be written
    pub fn render_page(&self, index: usize, ordinal: usize, sink: &mut ImageSink<'_>) -> Result<()> {
        let page_number = i32::try_from(index).map_err(|_| ExtractionError::PageIndex(index))?;
        let page = self
            .document
            .load_page(page_number)
            .map_err(ExtractionError::from)?;
        let matrix = Matrix::new_scale(RENDER_SCALE, RENDER_SCALE);
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), 0.0, true)
            .map_err(ExtractionError::from)?;

        sink.insert_with(ordinal, RENDER_EXTENSION, |path| {
            pixmap
                .save_as(path.as_str(), ImageFormat::PNG)
                .map_err(|err| ExtractionError::from(err).into())
        })?;

        Ok(())
    }
}

/// Stand-in used when the crate is built without a renderer, every operation fails
#[cfg(not(feature = "render"))]
pub struct PageRenderer;

#[cfg(not(feature = "render"))]
impl PageRenderer {
    /// ## Errors
    ///
    /// Always fails with `ExtractionError::RenderUnavailable`
    pub fn open(_path: &Utf8Path) -> Result<Self> {
        Err(ExtractionError::RenderUnavailable.into())
    }

    /// ## Errors
    ///
    /// Always fails with `ExtractionError::RenderUnavailable`
    pub fn open_mobi(_path: &Utf8Path) -> Result<Self> {
        Err(ExtractionError::RenderUnavailable.into())
    }

    /// ## Errors
    ///
    /// Always fails with `ExtractionError::RenderUnavailable`
    pub fn page_count(&self) -> Result<usize> {
        Err(ExtractionError::RenderUnavailable.into())
    }

    /// ## Errors
    ///
    /// Always fails with `ExtractionError::RenderUnavailable`
    pub fn render_page(&self, _index: usize, _ordinal: usize, _sink: &mut ImageSink<'_>) -> Result<()> {
        Err(ExtractionError::RenderUnavailable.into())
    }
}
