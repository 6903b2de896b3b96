use std::{
    borrow::Cow,
    io::{Read, Seek},
};

use camino::Utf8Path;
use cbz::{extension_of, CbzRead, CbzReader};
use mime::Mime;
use tl::{HTMLTag, Node, ParserOptions, VDom};
use tracing::{debug, warn};

use crate::{staging::ImageSink, ExtractionError, Result};

static CONTAINER_PATH: &str = "META-INF/container.xml";

/// Used when a manifest href carries no extension
static DEFAULT_IMAGE_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ManifestImage {
    path: String,
    extension: String,
}

/// Copies every image of the package manifest, in manifest order
pub fn extract_images(path: &Utf8Path, sink: &mut ImageSink<'_>) -> Result<()> {
    let mut archive = CbzReader::from_path(path).map_err(ExtractionError::from)?;
    let container = read_to_string(&mut archive, CONTAINER_PATH)?;
    let package_path = package_path(&container)?;
    let package = read_to_string(&mut archive, &package_path)?;
    let images = manifest_images(&package, &package_path)?;
    debug!("{} image(s) in the manifest of {path}", images.len());

    for image in images {
        let bytes = archive
            .read_by_name(&image.path)
            .and_then(|mut file| file.to_bytes())
            .map_err(ExtractionError::from)?;
        sink.push(&image.extension, &bytes)?;
    }

    Ok(())
}

fn read_to_string<R: Read + Seek>(archive: &mut CbzReader<R>, name: &str) -> Result<String> {
    let bytes = archive
        .read_by_name(name)
        .and_then(|mut file| file.to_bytes())
        .map_err(ExtractionError::from)?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn parse(xml: &str) -> Result<VDom<'_>, ExtractionError> {
    tl::parse(xml, ParserOptions::default()).map_err(|err| ExtractionError::Epub(err.to_string()))
}

/// Location of the OPF package document inside the archive
fn package_path(container: &str) -> Result<String, ExtractionError> {
    let dom = parse(container)?;

    tags_named(&dom, "rootfile")
        .into_iter()
        .find_map(|tag| attribute(tag, "full-path"))
        .ok_or_else(|| ExtractionError::Epub(format!("no rootfile in {CONTAINER_PATH}")))
}

fn manifest_images(package: &str, package_path: &str) -> Result<Vec<ManifestImage>, ExtractionError> {
    let dom = parse(package)?;
    let base = package_path.rsplit_once('/').map_or("", |(dir, _)| dir);

    let mut images = Vec::new();
    for tag in tags_named(&dom, "item") {
        let Some(media_type) = attribute(tag, "media-type") else {
            continue;
        };
        let mime = match media_type.parse::<Mime>() {
            Ok(mime) => mime,
            Err(err) => {
                warn!("invalid media type {media_type:?}: {err}");
                continue;
            }
        };
        if mime.type_() != mime::IMAGE {
            continue;
        }
        let Some(href) = attribute(tag, "href") else {
            warn!("manifest image without href");
            continue;
        };

        let path = resolve_href(base, &href);
        let extension = extension_of(&path)
            .unwrap_or(DEFAULT_IMAGE_EXTENSION)
            .to_string();
        images.push(ManifestImage { path, extension });
    }

    Ok(images)
}

/// Tags in document order, matched on their local name (`opf:item` is an `item`)
fn tags_named<'a, 'b>(dom: &'a VDom<'b>, local_name: &str) -> Vec<&'a HTMLTag<'b>> {
    dom.nodes()
        .iter()
        .filter_map(Node::as_tag)
        .filter(|tag| {
            let name = tag.name().as_utf8_str();
            let name = name.rsplit(':').next().unwrap_or_default();
            name.eq_ignore_ascii_case(local_name)
        })
        .collect()
}

fn attribute(tag: &HTMLTag<'_>, name: &'static str) -> Option<String> {
    tag.attributes()
        .get(name)
        .flatten()
        .map(|value| value.as_utf8_str().into_owned())
}

/// Resolves a percent-encoded href relative to the package directory into an archive entry name
fn resolve_href(base: &str, href: &str) -> String {
    let href = href.split(['#', '?']).next().unwrap_or_default();
    let href = urlencoding::decode(href).unwrap_or(Cow::Borrowed(href));

    let mut segments = Vec::new();
    if !href.starts_with('/') {
        segments.extend(base.split('/').filter(|segment| !segment.is_empty()));
    }
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    segments.join("/")
}
