use camino::Utf8Path;
use mobi::Mobi;
use tracing::{debug, warn};

use crate::{render::PageRenderer, staging::ImageSink, ExtractionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MobiVersion {
    Mobi6,
    Mobi8,
}

impl TryFrom<u32> for MobiVersion {
    type Error = ExtractionError;

    fn try_from(version: u32) -> Result<Self, Self::Error> {
        match version {
            6 => Ok(Self::Mobi6),
            8 => Ok(Self::Mobi8),
            _ => Err(ExtractionError::MobiVersion(version)),
        }
    }
}

/// Renders every page of a MOBI/AZW3 ebook, in order.
/// The container is validated first so a corrupt file fails before anything is rendered.
pub fn extract_images(path: &Utf8Path, sink: &mut ImageSink<'_>) -> Result<()> {
    let mobi = Mobi::from_path(path).map_err(|err| ExtractionError::Mobi(err.to_string()))?;
    match MobiVersion::try_from(mobi.metadata.mobi.format_version) {
        Ok(version) => debug!("{path} is a {version:?} ebook"),
        Err(err) => warn!("{path}: {err}"),
    }
    debug!("{path} holds {} image record(s)", mobi.image_records().len());
    drop(mobi);

    let renderer = PageRenderer::open_mobi(path)?;
    let page_count = renderer.page_count()?;
    debug!("rendering {page_count} page(s) of {path}");
    for index in 0..page_count {
        renderer.render_page(index, index + 1, sink)?;
    }

    Ok(())
}
