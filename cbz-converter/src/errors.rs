use std::{fmt, io, path::PathBuf};

use pdf::error::PdfError;

/// Failure while reading a source container or producing its page images
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("pdf error: {0}")]
    Pdf(#[from] PdfError),

    #[error("zip error: {0}")]
    Cbz(#[from] cbz::Error),

    #[error("rar error: {0}")]
    Rar(String),

    #[error("mobi error: {0}")]
    Mobi(String),

    #[error("invalid mobi version {0}")]
    MobiVersion(u32),

    #[error("epub error: {0}")]
    Epub(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "render")]
    #[error("render error: {0}")]
    Render(#[from] mupdf::Error),

    #[error("page index {0} is out of range")]
    PageIndex(usize),

    #[error("page rendering is not available, enable the `render` feature")]
    RenderUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported format `{0}`")]
    UnsupportedFormat(String),

    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("pack error: {0}")]
    Pack(#[from] cbz_pack::Error),

    #[error("{0:?} is not a valid utf-8 path")]
    NonUtf8Path(PathBuf),

    #[error("page {0} is missing from the extracted images")]
    MissingPage(usize),

    #[error("job config error: {0}")]
    JobConfig(#[from] serde_json::Error),

    #[error("unknown job `{0}`")]
    UnknownJob(String),

    #[error("no job configured")]
    NoJob,

    #[error("unknown pipeline `{0}`")]
    UnknownPipeline(String),

    #[error("run cancelled")]
    Cancelled,
}

/// Coarse classification of an `Error`, reported alongside every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedFormat,
    Extraction,
    Io,
    Cancelled,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::UnsupportedFormat => "unsupported format",
                Self::Extraction => "extraction error",
                Self::Io => "io error",
                Self::Cancelled => "cancelled",
                Self::Config => "configuration error",
            }
        )
    }
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::Extraction(_) | Self::MissingPage(_) => ErrorKind::Extraction,
            Self::Io(_) | Self::NonUtf8Path(_) | Self::Pack(_) => ErrorKind::Io,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::JobConfig(_) | Self::UnknownJob(_) | Self::NoJob | Self::UnknownPipeline(_) => {
                ErrorKind::Config
            }
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
