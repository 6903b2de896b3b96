use camino::{Utf8Path, Utf8PathBuf};

use crate::{Format, Result};

/// A convertible file found in the target directory, with the format its extension maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: Utf8PathBuf,
    format: Format,
}

impl SourceFile {
    /// ## Errors
    ///
    /// Fails with `Error::UnsupportedFormat` if the extension isn't a supported one
    pub fn detect(path: impl Into<Utf8PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = Format::from_path(&path)?;

        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }

    /// Name shared by the staging directory and the output archive
    pub fn stem(&self) -> &str {
        self.path.file_stem().unwrap_or_else(|| self.file_name())
    }
}

/// A page image persisted in a staging directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    /// 1-based position of the page in the final archive
    pub ordinal: usize,
    pub extension: String,
    pub path: Utf8PathBuf,
}
