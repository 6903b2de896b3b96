use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use cbz_pack::pack_files_to_cbz;
use tracing::{debug, warn};

use crate::{
    staging::StagingArea, Error, Event, Result, RunContext, SourceFile, Summary,
};

/// Lists the convertible files directly inside `target_dir`, sorted by name.
/// Subdirectories (the staging directory included) and files with an unsupported
/// extension are left out without being reported.
///
/// ## Errors
///
/// Fails if `target_dir` can't be read
pub fn scan(target_dir: &Utf8Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(target_dir)? {
        let path = match Utf8PathBuf::from_path_buf(entry?.path()) {
            Ok(path) => path,
            Err(path) => {
                warn!("{}", Error::NonUtf8Path(path));
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        match SourceFile::detect(path) {
            Ok(source) => files.push(source),
            Err(err) => debug!("skipping: {err}"),
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(b.file_name()));

    Ok(files)
}

/// Stages, extracts and packs a single source, returning the path of the new archive,
/// `<target_dir>/<stem>.cbz`.
/// Whatever the outcome, the source ends up in its staging directory.
///
/// ## Errors
///
/// Fails if the source can't be staged, its images can't be extracted or the archive can't be written
pub fn convert_file(
    target_dir: &Utf8Path,
    source: &SourceFile,
    ctx: &RunContext,
) -> Result<Utf8PathBuf> {
    let name = source.file_name().to_string();
    let staging = StagingArea::prepare(target_dir, source)?;
    ctx.emit(Event::Staged {
        name: name.clone(),
        dir: staging.dir().to_path_buf(),
    });

    let mut sink = staging.image_sink(ctx.cancel_handle());
    source.format().extract(staging.source(), &mut sink)?;
    let images = sink.into_images()?;
    if images.is_empty() {
        warn!("no image found in {name}");
    }
    ctx.emit(Event::Extracted {
        name: name.clone(),
        count: images.len(),
    });

    let output = target_dir.join(sanitize_filename::sanitize(format!("{}.cbz", source.stem())));
    let paths = images
        .iter()
        .map(|image| image.path.as_path())
        .collect::<Vec<_>>();
    pack_files_to_cbz(&paths, &output)?;
    ctx.emit(Event::Packed {
        name,
        output: output.clone(),
    });

    Ok(output)
}

/// Converts every supported file of `target_dir`, one after the other.
/// A failing file is reported and the run carries on with the next one.
///
/// ## Errors
///
/// Fails if `target_dir` can't be scanned, or with `Error::Cancelled` once the run is cancelled
pub fn convert_dir(target_dir: &Utf8Path, ctx: &RunContext) -> Result<Summary> {
    let files = scan(target_dir)?;
    let mut summary = Summary::default();

    if files.is_empty() {
        ctx.emit(Event::NothingToDo);
        ctx.emit(Event::Finished(summary));
        return Ok(summary);
    }

    let total = files.len();
    ctx.emit(Event::Scanned { count: total });

    for (index, source) in files.iter().enumerate() {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        ctx.emit(Event::FileStarted {
            index: index + 1,
            total,
            name: source.file_name().to_string(),
        });

        match convert_file(target_dir, source, ctx) {
            Ok(_) => summary.succeeded += 1,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(err) => {
                summary.failed += 1;
                ctx.emit(Event::FileFailed {
                    name: source.file_name().to_string(),
                    kind: err.kind(),
                    reason: err.to_string(),
                });
            }
        }
    }

    ctx.emit(Event::Finished(summary));

    Ok(summary)
}
