use camino::Utf8Path;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use pdf::{
    enc::StreamFilter,
    file::FileOptions as PdfFileOptions,
    object::{ColorSpace, ImageXObject, Page, Resolve, XObject},
};
use tracing::{debug, warn};

use crate::{render::PageRenderer, staging::ImageSink, ExtractionError, Result};

/// Extension given to DCT (JPEG) streams copied out of a page
static JPEG_EXTENSION: &str = "jpeg";

/// Extension given to JPX (JPEG 2000) streams copied out of a page
static JP2_EXTENSION: &str = "jp2";

/// Extension of the images decoded from raw or Flate samples
static PNG_EXTENSION: &str = "png";

/// What the first image of a page becomes in the archive
enum PageImage {
    /// A stream that is a standalone image file as is
    Verbatim {
        extension: &'static str,
        bytes: Vec<u8>,
    },
    /// Samples with no file form of their own, written out as PNG
    Decoded(DynamicImage),
}

/// Produces one image per page, in page order.
///
/// A page whose first image is a DCT or JPX stream contributes that stream untouched,
/// one whose first image is made of plain 8-bit samples contributes them as a PNG.
/// Any other page (no image, or an image that can't be decoded) is rendered.
/// Images are walked in resource name order, so "first" is stable from one run to another.
pub fn extract_images(path: &Utf8Path, sink: &mut ImageSink<'_>) -> Result<()> {
    let pdf = PdfFileOptions::cached()
        .open(path)
        .map_err(ExtractionError::from)?;
    let mut to_render = Vec::new();

    for (index, page) in pdf.pages().enumerate() {
        let page = page.map_err(ExtractionError::from)?;
        match first_image(&pdf, &page, index) {
            Some(PageImage::Verbatim { extension, bytes }) => {
                sink.insert(index + 1, extension, &bytes)?;
            }
            Some(PageImage::Decoded(image)) => {
                sink.insert_with(index + 1, PNG_EXTENSION, |path| {
                    image
                        .save_with_format(path, ImageFormat::Png)
                        .map_err(|err| ExtractionError::from(err).into())
                })?;
            }
            None => to_render.push(index),
        }
    }

    if to_render.is_empty() {
        return Ok(());
    }

    debug!("{} page(s) of {path} have to be rendered", to_render.len());
    let renderer = PageRenderer::open(path)?;
    for index in to_render {
        renderer.render_page(index, index + 1, sink)?;
    }

    Ok(())
}

fn first_image(pdf: &impl Resolve, page: &Page, index: usize) -> Option<PageImage> {
    let resources = match page.resources() {
        Ok(resources) => resources,
        Err(err) => {
            debug!("page {} has no resources: {err}", index + 1);
            return None;
        }
    };

    let mut xobjects = resources.xobjects.iter().collect::<Vec<_>>();
    xobjects.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));

    for (name, resource) in xobjects {
        let resource = match pdf.get(*resource) {
            Ok(resource) => resource,
            Err(err) => {
                warn!("failed to get resource {} of page {}: {err}", name.as_str(), index + 1);
                continue;
            }
        };
        let XObject::Image(image) = &*resource else {
            continue;
        };

        return match image.raw_image_data(pdf) {
            Ok((data, Some(StreamFilter::DCTDecode(_)))) => Some(PageImage::Verbatim {
                extension: JPEG_EXTENSION,
                bytes: data.to_vec(),
            }),
            Ok((data, Some(StreamFilter::JPXDecode))) => Some(PageImage::Verbatim {
                extension: JP2_EXTENSION,
                bytes: data.to_vec(),
            }),
            Ok((data, None)) => {
                let decoded = decode_samples(image, &data).map(PageImage::Decoded);
                if decoded.is_none() {
                    debug!("samples of the first image of page {} can't be decoded", index + 1);
                }
                decoded
            }
            Ok((_, Some(filter))) => {
                debug!("first image of page {} is a {filter:?} stream", index + 1);
                None
            }
            Err(err) => {
                warn!("failed to get image data of page {}: {err}", index + 1);
                None
            }
        };
    }

    None
}

#[derive(Debug, Clone, Copy)]
enum Samples {
    Gray,
    Rgb,
    Cmyk,
}

impl Samples {
    fn of(color_space: &ColorSpace) -> Option<Self> {
        match color_space {
            ColorSpace::DeviceGray | ColorSpace::CalGray(_) => Some(Self::Gray),
            ColorSpace::DeviceRGB | ColorSpace::CalRGB(_) => Some(Self::Rgb),
            ColorSpace::DeviceCMYK | ColorSpace::CalCMYK(_) => Some(Self::Cmyk),
            ColorSpace::Icc(icc) => match icc.components {
                1 => Some(Self::Gray),
                3 => Some(Self::Rgb),
                4 => Some(Self::Cmyk),
                _ => None,
            },
            _ => None,
        }
    }

    fn components(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }

    /// `None` when `data` holds fewer samples than `width` x `height` pixels need
    fn into_image(self, width: u32, height: u32, data: Vec<u8>) -> Option<DynamicImage> {
        match self {
            Self::Gray => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
            Self::Rgb => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
            Self::Cmyk => {
                let rgb = data
                    .chunks_exact(4)
                    .flat_map(|cmyk| {
                        let key = 255 - u16::from(cmyk[3]);
                        [cmyk[0], cmyk[1], cmyk[2]].map(|ink| {
                            u8::try_from((255 - u16::from(ink)) * key / 255).unwrap_or(u8::MAX)
                        })
                    })
                    .collect();
                RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
            }
        }
    }
}

/// Only 8-bit gray, RGB, CMYK and indexed samples are understood
fn decode_samples(image: &ImageXObject, data: &[u8]) -> Option<DynamicImage> {
    if image.image_mask || image.bits_per_component.unwrap_or(8) != 8 {
        return None;
    }
    let (width, height) = (image.width, image.height);

    match image.color_space.as_ref()? {
        ColorSpace::Indexed(base, lookup) => {
            let samples = Samples::of(base)?;
            let step = samples.components();
            let pixels = usize::try_from(u64::from(width) * u64::from(height)).ok()?;
            let mut expanded = Vec::with_capacity(pixels * step);
            for &entry in data.get(..pixels)? {
                let start = usize::from(entry) * step;
                expanded.extend_from_slice(lookup.get(start..start + step)?);
            }

            samples.into_image(width, height, expanded)
        }
        color_space => Samples::of(color_space)?.into_image(width, height, data.to_vec()),
    }
}
