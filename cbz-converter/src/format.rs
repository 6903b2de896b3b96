use std::fmt::Display;

use camino::Utf8Path;

use crate::{archive, epub, mobi, pdf, staging::ImageSink, Error, Result};

/// Extensions, compared case-insensitively, of the files a target directory is scanned for
pub static SUPPORTED_EXTENSIONS: [&str; 6] = ["pdf", "mobi", "azw3", "epub", "cbz", "cbr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Pdf,
    MobiAzw3,
    Epub,
    Cbz,
    Cbr,
}

impl Format {
    /// Maps an extension, without its leading dot, to a format.
    /// Only the extension is considered, contents are never sniffed.
    ///
    /// ## Errors
    ///
    /// Fails with `Error::UnsupportedFormat` if the extension isn't one of `SUPPORTED_EXTENSIONS`
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "mobi" | "azw3" => Ok(Self::MobiAzw3),
            "epub" => Ok(Self::Epub),
            "cbz" => Ok(Self::Cbz),
            "cbr" => Ok(Self::Cbr),
            _ => Err(Error::UnsupportedFormat(extension.to_string())),
        }
    }

    /// ## Errors
    ///
    /// Fails with `Error::UnsupportedFormat` if the path has no extension or an unsupported one
    pub fn from_path(path: &Utf8Path) -> Result<Self> {
        match path.extension() {
            Some(extension) => Self::from_extension(extension),
            None => Err(Error::UnsupportedFormat(
                path.file_name().unwrap_or_default().to_string(),
            )),
        }
    }

    /// Extracts the page images of `source` into `sink`, in reading order
    ///
    /// ## Errors
    ///
    /// Fails with `Error::Extraction` if the container can't be read,
    /// with `Error::Io` if an image can't be persisted
    pub fn extract(self, source: &Utf8Path, sink: &mut ImageSink<'_>) -> Result<()> {
        match self {
            Self::Pdf => pdf::extract_images(source, sink),
            Self::MobiAzw3 => mobi::extract_images(source, sink),
            Self::Epub => epub::extract_images(source, sink),
            Self::Cbz => archive::extract_cbz_images(source, sink),
            Self::Cbr => archive::extract_cbr_images(source, sink),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Pdf => "PDF",
                Self::MobiAzw3 => "MOBI/AZW3",
                Self::Epub => "EPUB",
                Self::Cbz => "CBZ",
                Self::Cbr => "CBR",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_extension_is_detected() {
        for extension in SUPPORTED_EXTENSIONS {
            assert!(Format::from_extension(extension).is_ok(), "{extension}");
        }
    }

    #[test]
    fn detection_ignores_case() {
        assert_eq!(Format::from_extension("PDF").unwrap(), Format::Pdf);
        assert_eq!(Format::from_extension("Azw3").unwrap(), Format::MobiAzw3);
        assert_eq!(
            Format::from_path(Utf8Path::new("dir/Book.CBR")).unwrap(),
            Format::Cbr
        );
    }

    #[test]
    fn unknown_extensions_are_unsupported() {
        assert!(matches!(
            Format::from_extension("txt"),
            Err(Error::UnsupportedFormat(extension)) if extension == "txt"
        ));
        assert!(matches!(
            Format::from_path(Utf8Path::new("dir/README")),
            Err(Error::UnsupportedFormat(name)) if name == "README"
        ));
        assert!(matches!(
            Format::from_path(Utf8Path::new("archive.cbz.bak")),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
