use std::collections::HashMap;

use camino::Utf8Path;
use cbz::{extension_of, is_image_name, CbzRead, CbzReader};
use tracing::debug;
use unrar::{Archive, FileHeader};

use crate::{staging::ImageSink, ExtractionError, Result};

/// Copies the images of a Cbz, sorted by entry name, with their bytes and extension untouched
pub fn extract_cbz_images(path: &Utf8Path, sink: &mut ImageSink<'_>) -> Result<()> {
    let mut archive = CbzReader::from_path(path).map_err(ExtractionError::from)?;
    let names = archive.image_names();
    debug!("{} image(s) in {path}", names.len());

    for name in names {
        let bytes = archive
            .read_by_name(&name)
            .and_then(|mut file| file.to_bytes())
            .map_err(ExtractionError::from)?;
        sink.push(page_extension(&name), &bytes)?;
    }

    Ok(())
}

/// Copies the images of a Cbr, sorted by entry name, with their bytes and extension untouched.
///
/// Rar entries can only be read in archive order: names are listed and sorted first,
/// then each entry is written at its sorted position while the archive is walked.
pub fn extract_cbr_images(path: &Utf8Path, sink: &mut ImageSink<'_>) -> Result<()> {
    let names = rar_image_names(path)?;
    debug!("{} image(s) in {path}", names.len());
    let ordinals = names
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_str(), index + 1))
        .collect::<HashMap<_, _>>();

    let mut archive = Archive::new(path.as_std_path())
        .open_for_processing()
        .map_err(rar_error)?;
    while let Some(header) = archive.read_header().map_err(rar_error)? {
        let name = entry_name(header.entry());
        archive = match ordinals.get(name.as_str()) {
            Some(&ordinal) if header.entry().is_file() => {
                let (bytes, rest) = header.read().map_err(rar_error)?;
                sink.insert(ordinal, page_extension(&name), &bytes)?;
                rest
            }
            _ => header.skip().map_err(rar_error)?,
        };
    }

    Ok(())
}

fn rar_image_names(path: &Utf8Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for header in Archive::new(path.as_std_path())
        .open_for_listing()
        .map_err(rar_error)?
    {
        let header = header.map_err(rar_error)?;
        let name = entry_name(&header);
        if header.is_file() && is_image_name(&name) {
            names.push(name);
        }
    }
    names.sort();
    names.dedup();

    Ok(names)
}

/// Rar entries may use `\` as separator
fn entry_name(header: &FileHeader) -> String {
    header.filename.to_string_lossy().replace('\\', "/")
}

fn page_extension(name: &str) -> &str {
    extension_of(name).unwrap_or_default()
}

fn rar_error(err: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Rar(err.to_string())
}
