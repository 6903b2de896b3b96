#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::{
    borrow::Cow,
    fs::File,
    io::{Cursor, Read, Seek, Write},
    ops::Deref,
    path::Path,
};

use bytes::Bytes;
use tracing::debug;
use zip::{read::ZipFile, result::ZipError, write::FileOptions, ZipArchive, ZipWriter};

pub use zip::CompressionMethod;

pub use crate::errors::{Error, Result};

pub mod errors;

/// We artificially limit the amount of accepted files to 65535 files per Cbz
/// First as it'd be rather impractical for the user to read such enormous Cbz
/// Also, this size has been chosen as it was the limit of the very first zip spec
pub static MAX_FILE_NUMBER: usize = u16::MAX as usize;

/// Minimum width of the zero-padded counter used to name entries (`001.png`)
pub static COUNTER_SIZE: usize = 3;

/// Raster extensions recognized as pages when reading a comic archive
pub static IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Returns `true` when `name` ends with one of the `IMAGE_EXTENSIONS`, ignoring case
#[must_use]
pub fn is_image_name(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|extension| {
        name.strip_suffix(extension)
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

/// The suffix of an entry name, without the dot and with its case preserved.
/// Only the last path component is considered.
#[must_use]
pub fn extension_of(name: &str) -> Option<&str> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension)
        .filter(|extension| !extension.is_empty())
}

/// Width of the counter needed to name `len` entries so that their
/// lexicographic order equals their numeric order, never less than `COUNTER_SIZE`
#[must_use]
pub fn counter_width(len: usize) -> usize {
    COUNTER_SIZE.max(len.to_string().len())
}

/// Builds the `NNN.ext` name of the entry at `index` (1-based)
#[must_use]
pub fn entry_name(index: usize, width: usize, extension: &str) -> String {
    format!("{index:0>width$}.{extension}")
}

/// File options used for every entry written to a Cbz: stored, never compressed
#[must_use]
pub fn stored_file_options() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Stored)
}

pub trait Cbz {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait CbzRead: Cbz {
    fn file_names(&self) -> Vec<&str>;

    /// Lookup the file by `name` in Cbz and returns a `CbzFile`
    ///
    /// ## Errors
    ///
    /// Fails if no file is named `name` or if the archive can't be read
    fn read_by_name(&mut self, name: &str) -> Result<CbzFile<'_>>;

    /// Names of the entries that look like pages, sorted lexicographically.
    /// Sorting is purely by name: `10.png` comes before `2.png`.
    fn image_names(&self) -> Vec<String> {
        let mut names = self
            .file_names()
            .into_iter()
            .filter(|name| is_image_name(name))
            .map(Into::into)
            .collect::<Vec<String>>();
        names.sort();
        names.dedup();

        names
    }
}

pub trait CbzWrite {
    fn size(&self) -> usize;

    /// Width used to zero-pad the generated entry names
    fn counter_width(&self) -> usize;

    /// Inserts the file right after the last one, named after its position
    ///
    /// ## Errors
    ///
    /// Same behavior as `insert_from_bytes_slice_with_options`
    fn insert(&mut self, insertion: CbzWriterInsertion<'_, '_, Auto>) -> Result<()> {
        let filename = entry_name(
            self.size() + 1,
            self.counter_width(),
            &insertion.extension,
        );

        self.insert_from_bytes_slice_with_options(
            filename,
            &insertion.bytes,
            stored_file_options(),
        )
    }

    /// Inserts the file named after the index it was built with
    ///
    /// ## Errors
    ///
    /// Same behavior as `insert_from_bytes_slice_with_options`
    fn insert_at(&mut self, insertion: CbzWriterInsertion<'_, '_, Indexed>) -> Result<()> {
        let filename = entry_name(
            *insertion.type_,
            self.counter_width(),
            &insertion.extension,
        );

        self.insert_from_bytes_slice_with_options(
            filename,
            &insertion.bytes,
            stored_file_options(),
        )
    }

    /// This is the method ultimately called to insert the bytes into the Cbz
    ///
    /// ## Errors
    ///
    /// This fails if the Cbz writer can't be written or if it's full (i.e. its size equals `MAX_FILE_NUMBER`)
    fn insert_from_bytes_slice_with_options(
        &mut self,
        filename: impl Into<String>,
        bytes: &[u8],
        file_options: FileOptions,
    ) -> Result<()>;
}

pub struct CbzFile<'a>(ZipFile<'a>);

impl<'a> CbzFile<'a> {
    pub fn size(&self) -> u64 {
        self.0.size()
    }

    pub fn compression(&self) -> CompressionMethod {
        self.0.compression()
    }

    /// Convert the file content to `Bytes`
    ///
    /// ## Errors
    ///
    /// Fails if file size is too large to fit a `usize` on host machine
    /// or if the content can't be read
    pub fn to_bytes(&mut self) -> Result<Bytes> {
        let mut buf = Vec::with_capacity(
            self.size()
                .try_into()
                .map_err(|_| Error::CbzFileSizeConversion)?,
        );

        self.0.read_to_end(&mut buf)?;

        Ok(buf.into())
    }
}

impl<'a> From<ZipFile<'a>> for CbzFile<'a> {
    fn from(zip_file: ZipFile<'a>) -> Self {
        Self(zip_file)
    }
}

#[derive(Debug)]
pub struct CbzReader<R> {
    archive: ZipArchive<R>,
}

impl<R> CbzReader<R> {
    pub fn new(archive: ZipArchive<R>) -> Self {
        Self { archive }
    }
}

impl<R> CbzReader<R>
where
    R: Read + Seek,
{
    /// Creates `CbzReader` from a `Read`
    ///
    /// ## Errors
    ///
    /// Fails if the underlying `ZipArchive` can't be created
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;

        Ok(Self::new(archive))
    }
}

impl CbzReader<File> {
    /// Creates `CbzReader` from a path
    ///
    /// ## Errors
    ///
    /// Fails if the file can't be open or the underlying `ZipArchive` can't be created
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;

        Self::from_reader(file)
    }
}

impl<'b> CbzReader<Cursor<&'b [u8]>> {
    /// Creates `CbzReader` from a bytes slice
    ///
    /// ## Errors
    ///
    /// Fails if the underlying `ZipArchive` can't be created
    pub fn from_bytes_slice(bytes: &'b [u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }
}

impl<R> Cbz for CbzReader<R>
where
    R: Read + Seek,
{
    fn len(&self) -> usize {
        self.archive.len()
    }
}

impl<R> CbzRead for CbzReader<R>
where
    R: Read + Seek,
{
    fn file_names(&self) -> Vec<&str> {
        self.archive.file_names().collect()
    }

    fn read_by_name(&mut self, name: &str) -> Result<CbzFile<'_>> {
        let archive_file = self.archive.by_name(name).map_err(|err| match err {
            ZipError::FileNotFound => Error::CbzNotFound(name.to_string()),
            err => err.into(),
        })?;

        Ok(archive_file.into())
    }
}

pub struct CbzWriter<W: Write + Seek> {
    archive: ZipWriter<W>,
    size: usize,
    counter_width: usize,
}

impl<W> CbzWriter<W>
where
    W: Write + Seek,
{
    pub fn new(archive: ZipWriter<W>) -> Self {
        Self {
            archive,
            size: 0,
            counter_width: COUNTER_SIZE,
        }
    }

    /// Creates a `CbzWriter` from a `Write`
    pub fn from_writer(writer: W) -> Self {
        Self::new(ZipWriter::new(writer))
    }

    /// Widens the zero-padded counter, typically to `counter_width(expected_len)`.
    /// Never narrower than `COUNTER_SIZE`.
    #[must_use]
    pub fn with_counter_width(mut self, counter_width: usize) -> Self {
        self.counter_width = counter_width.max(COUNTER_SIZE);
        self
    }

    /// Terminates the Cbz archiving and hands the underlying writer back,
    /// called on drop anyway but error can't be handled
    ///
    /// ## Errors
    ///
    /// Same errors as the underlying `ZipWriter::finish` method
    pub fn finish(mut self) -> Result<W> {
        let writer = self.archive.finish()?;
        debug!("cbz finished with {} files", self.size);

        Ok(writer)
    }
}

impl Default for CbzWriter<Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::from_writer(Cursor::new(Vec::new()))
    }
}

impl<W> Cbz for CbzWriter<W>
where
    W: Write + Seek,
{
    fn len(&self) -> usize {
        self.size
    }
}

impl<W> CbzWrite for CbzWriter<W>
where
    W: Write + Seek,
{
    fn size(&self) -> usize {
        self.size
    }

    fn counter_width(&self) -> usize {
        self.counter_width
    }

    fn insert_from_bytes_slice_with_options(
        &mut self,
        filename: impl Into<String>,
        bytes: &[u8],
        file_options: FileOptions,
    ) -> Result<()> {
        if self.size >= MAX_FILE_NUMBER {
            return Err(Error::CbzTooLarge(MAX_FILE_NUMBER));
        }

        self.archive.start_file(filename, file_options)?;

        self.archive.write_all(bytes)?;

        self.size += 1;

        Ok(())
    }
}

pub struct Indexed(usize);

impl Deref for Indexed {
    type Target = usize;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct Auto;

pub struct CbzWriterInsertion<'a, 'b, T> {
    extension: Cow<'a, str>,
    bytes: Cow<'b, [u8]>,
    type_: T,
}

#[derive(Debug, PartialEq, Eq)]
enum InsertionTypeDescriber<'a> {
    Filename(&'a str),
    Extension(&'a str),
}

pub struct CbzWriterInsertionBuilder<'a, 'b> {
    type_describer: InsertionTypeDescriber<'a>,
    bytes: Option<Cow<'b, [u8]>>,
}

impl<'a, 'b> CbzWriterInsertionBuilder<'a, 'b> {
    pub fn from_filename(filename: &'a (impl AsRef<str> + ?Sized)) -> Self {
        Self {
            type_describer: InsertionTypeDescriber::Filename(filename.as_ref()),
            bytes: None,
        }
    }

    pub fn from_extension(extension: &'a (impl AsRef<str> + ?Sized)) -> Self {
        Self {
            type_describer: InsertionTypeDescriber::Extension(extension.as_ref()),
            bytes: None,
        }
    }

    #[must_use]
    pub fn set_bytes_ref(mut self, bytes: &'b impl AsRef<[u8]>) -> Self {
        self.bytes = Some(bytes.as_ref().into());

        self
    }

    #[must_use]
    pub fn set_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.bytes = Some(bytes.into().into());

        self
    }

    /// Set the `bytes` field from the provided `Read`
    ///
    /// ## Errors
    ///
    /// Can fail when reading the provided `Read`
    pub fn set_bytes_from_reader(mut self, mut reader: impl Read) -> Result<Self> {
        let mut buf = Vec::new();

        reader.read_to_end(&mut buf)?;

        self.bytes = Some(buf.into());

        Ok(self)
    }

    /// Builds a `CbzWriterInsertion` appended after the last inserted file
    ///
    /// ## Errors
    ///
    /// Fails if the `bytes` field hasn't been populated or if the extension is empty
    pub fn build(self) -> Result<CbzWriterInsertion<'a, 'b, Auto>> {
        self.inner_build(Auto)
    }

    /// Builds a `CbzWriterInsertion` named after `index` (1-based)
    ///
    /// ## Errors
    ///
    /// Fails if the `bytes` field hasn't been populated or if the extension is empty
    pub fn build_indexed(self, index: usize) -> Result<CbzWriterInsertion<'a, 'b, Indexed>> {
        self.inner_build(Indexed(index))
    }

    fn inner_build<T>(self, type_: T) -> Result<CbzWriterInsertion<'a, 'b, T>> {
        let Some(bytes) = self.bytes else {
            return Err(Error::CbzInsertionNoBytes);
        };

        let extension = match self.type_describer {
            InsertionTypeDescriber::Extension(extension) => {
                if extension.is_empty() {
                    return Err(Error::CbzInsertionNoExtension);
                }

                extension
            }
            InsertionTypeDescriber::Filename(filename) => {
                let Some(extension) = extension_of(filename) else {
                    return Err(Error::CbzInsertionNoExtension);
                };

                extension
            }
        };

        Ok(CbzWriterInsertion {
            extension: extension.into(),
            bytes,
            type_,
        })
    }
}
