use std::{collections::BTreeMap, fs, io};

use camino::{Utf8Path, Utf8PathBuf};
use cbz::{entry_name, COUNTER_SIZE};
use tracing::debug;

use crate::{CancelHandle, Error, ExtractedImage, Result, SourceFile};

/// Directory, inside the target directory, where sources and their images are staged
pub static STAGING_DIR_NAME: &str = "Fonte";

/// Per-file working directory: `<target>/Fonte/<stem>/`, holding the relocated source
/// and the images extracted from it
#[derive(Debug)]
pub struct StagingArea {
    dir: Utf8PathBuf,
    source: Utf8PathBuf,
}

impl StagingArea {
    /// Creates the staging directory of `source` and moves the source into it.
    /// The source is never deleted, it stays in the staging directory whatever happens next.
    ///
    /// ## Errors
    ///
    /// Fails if the directory can't be created or the source can't be moved
    pub fn prepare(target_dir: &Utf8Path, source: &SourceFile) -> Result<Self> {
        let dir = target_dir.join(STAGING_DIR_NAME).join(source.stem());
        fs::create_dir_all(&dir)?;

        let relocated = dir.join(source.file_name());
        move_file(source.path(), &relocated)?;
        debug!("{} staged at {relocated}", source.path());

        Ok(Self {
            dir,
            source: relocated,
        })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Location of the source file once relocated
    pub fn source(&self) -> &Utf8Path {
        &self.source
    }

    pub fn image_sink(&self, cancel: &CancelHandle) -> ImageSink<'_> {
        ImageSink::new(&self.dir, cancel.clone())
    }
}

/// Renames `from` to `to`, copying then removing when a rename isn't possible (across filesystems)
fn move_file(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) => {
            debug!("couldn't rename {from} ({err}), copying it instead");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

/// Persists page images as `NNN.<ext>` in a staging directory, one at a time,
/// and records them by ordinal
#[derive(Debug)]
pub struct ImageSink<'a> {
    dir: &'a Utf8Path,
    cancel: CancelHandle,
    images: BTreeMap<usize, ExtractedImage>,
}

impl<'a> ImageSink<'a> {
    pub fn new(dir: &'a Utf8Path, cancel: CancelHandle) -> Self {
        Self {
            dir,
            cancel,
            images: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Ordinal following the highest one recorded so far
    pub fn next_ordinal(&self) -> usize {
        self.images.keys().next_back().map_or(1, |last| last + 1)
    }

    /// Writes the next page
    ///
    /// ## Errors
    ///
    /// Fails with `Error::Cancelled` if the run was cancelled, or if the image can't be written
    pub fn push(&mut self, extension: &str, bytes: &[u8]) -> Result<usize> {
        self.insert(self.next_ordinal(), extension, bytes)
    }

    /// Writes the page at `ordinal`, replacing any image previously recorded there
    ///
    /// ## Errors
    ///
    /// Fails with `Error::Cancelled` if the run was cancelled, or if the image can't be written
    pub fn insert(&mut self, ordinal: usize, extension: &str, bytes: &[u8]) -> Result<usize> {
        self.insert_with(ordinal, extension, |path| Ok(fs::write(path, bytes)?))
    }

    /// Lets `write` produce the page at `ordinal` from its final path
    ///
    /// ## Errors
    ///
    /// Fails with `Error::Cancelled` if the run was cancelled, or with whatever `write` fails with
    pub fn insert_with<F>(&mut self, ordinal: usize, extension: &str, write: F) -> Result<usize>
    where
        F: FnOnce(&Utf8Path) -> Result<()>,
    {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let path = self.dir.join(entry_name(ordinal, COUNTER_SIZE, extension));
        write(&path)?;
        debug!("page {ordinal} written to {path}");

        self.images.insert(
            ordinal,
            ExtractedImage {
                ordinal,
                extension: extension.to_string(),
                path,
            },
        );

        Ok(ordinal)
    }

    /// The recorded images, in page order
    ///
    /// ## Errors
    ///
    /// Fails with `Error::MissingPage` if the ordinals aren't exactly `1..=n`
    pub fn into_images(self) -> Result<Vec<ExtractedImage>> {
        if let Some(missing) = (1..)
            .zip(self.images.keys())
            .find_map(|(expected, &ordinal)| (expected != ordinal).then_some(expected))
        {
            return Err(Error::MissingPage(missing));
        }

        Ok(self.images.into_values().collect())
    }
}
