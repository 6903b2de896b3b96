#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fs::File;

use camino::Utf8Path;
use cbz::{counter_width, CbzWrite, CbzWriter, CbzWriterInsertionBuilder};
use tempfile::Builder as TempFileBuilder;
use tracing::{debug, warn};

pub use crate::errors::{Error, Result};

pub mod errors;

/// Packs the image files, in the given order, into a Cbz written at `output_path`.
/// The `n`th file becomes the entry named `n` (1-based, zero-padded) followed by its own extension,
/// every entry is stored uncompressed.
///
/// The archive is written under a temporary name in the output directory
/// and renamed to `output_path` once complete, an existing archive is replaced.
///
/// ## Errors
///
/// Fails if `output_path` has no file name, if a file can't be read or has no extension,
/// or if the archive can't be written
pub fn pack_files_to_cbz<P>(files: &[P], output_path: &Utf8Path) -> Result<usize>
where
    P: AsRef<Utf8Path>,
{
    let Some(file_name) = output_path.file_name() else {
        return Err(Error::InvalidOutputPath(
            output_path.to_string(),
            "no file name",
        ));
    };
    let outdir = match output_path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    if files.is_empty() {
        warn!("{output_path} will not contain any image");
    }

    let prefix = format!(".{file_name}.");
    let mut builder = TempFileBuilder::new();
    builder.prefix(&prefix).suffix(".part");
    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::fs::PermissionsExt};

        builder.permissions(Permissions::from_mode(0o644));
    }
    let mut temp_file = builder.tempfile_in(outdir)?;
    debug!("packing {} images into {}", files.len(), temp_file.path().display());

    let mut cbz_writer = CbzWriter::from_writer(temp_file.as_file_mut())
        .with_counter_width(counter_width(files.len()));
    for (index, path) in files.iter().enumerate() {
        let path = path.as_ref();
        let insertion = CbzWriterInsertionBuilder::from_filename(path.as_str())
            .set_bytes_from_reader(File::open(path)?)?
            .build_indexed(index + 1)?;
        cbz_writer.insert_at(insertion)?;
        debug!("packed {path}");
    }
    cbz_writer.finish()?;

    temp_file.persist(output_path).map_err(|err| err.error)?;
    debug!("cbz written to {output_path}");

    Ok(files.len())
}
