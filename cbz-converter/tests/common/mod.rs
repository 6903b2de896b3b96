#![allow(dead_code)]

use std::{
    fs::{self, File},
    io::{Cursor, Write},
};

use camino::{Utf8Path, Utf8PathBuf};
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use tempfile::TempDir;
use zip::{write::FileOptions, ZipArchive, ZipWriter};

pub fn target_dir() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();

    (temp, path)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 30, 30]),
    ));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageOutputFormat::Jpeg(80))
        .unwrap();

    bytes.into_inner()
}

pub fn write_zip(path: &Utf8Path, entries: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// An epub whose manifest lists `images` (percent-encoded href, media type, bytes) in order,
/// with the package document under `OEBPS/`
pub fn write_epub(path: &Utf8Path, images: &[(&str, &str, &[u8])]) {
    let container = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    let mut items = String::from(
        r#"<item id="nav" href="nav.xhtml" media-type="application/xhtml+xml"/>"#,
    );
    for (index, (href, media_type, _)) in images.iter().enumerate() {
        items.push_str(&format!(
            r#"<item id="img{index}" href="{href}" media-type="{media_type}"/>"#
        ));
    }
    let package = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <manifest>{items}</manifest>
  <spine><itemref idref="nav"/></spine>
</package>"#
    );

    let mut entries = vec![
        ("mimetype".to_string(), b"application/epub+zip".to_vec()),
        ("META-INF/container.xml".to_string(), container.as_bytes().to_vec()),
        ("OEBPS/content.opf".to_string(), package.into_bytes()),
        ("OEBPS/nav.xhtml".to_string(), b"<html/>".to_vec()),
    ];
    for (href, _, bytes) in images {
        let name = urlencoding::decode(href).unwrap();
        entries.push((format!("OEBPS/{name}"), bytes.to_vec()));
    }

    let entries = entries
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
        .collect::<Vec<_>>();
    write_zip(path, &entries);
}

/// A Rar4 archive with stored (uncompressed) entries, in this archive order:
/// `b.png`, `readme.txt`, `a.png`, `c10.png` and `c2.png`. Each `X.png` holds `page X`.
pub static STORED_CBR: &[u8] = &[
    0x52, 0x61, 0x72, 0x21, 0x1a, 0x07, 0x00, 0xcf, 0x90, 0x73, 0x00, 0x00,
    0x0d, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0xc4, 0x74, 0x00,
    0x80, 0x25, 0x00, 0x06, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x02,
    0x38, 0x10, 0x67, 0xc0, 0x00, 0x00, 0x21, 0x56, 0x14, 0x30, 0x05, 0x00,
    0x20, 0x00, 0x00, 0x00, 0x62, 0x2e, 0x70, 0x6e, 0x67, 0x70, 0x61, 0x67,
    0x65, 0x20, 0x62, 0xf5, 0x87, 0x74, 0x00, 0x80, 0x2a, 0x00, 0x04, 0x00,
    0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x02, 0x7d, 0x55, 0x76, 0xf8, 0x00,
    0x00, 0x21, 0x56, 0x14, 0x30, 0x0a, 0x00, 0x20, 0x00, 0x00, 0x00, 0x72,
    0x65, 0x61, 0x64, 0x6d, 0x65, 0x2e, 0x74, 0x78, 0x74, 0x73, 0x6b, 0x69,
    0x70, 0x94, 0x13, 0x74, 0x00, 0x80, 0x25, 0x00, 0x06, 0x00, 0x00, 0x00,
    0x06, 0x00, 0x00, 0x00, 0x02, 0x82, 0x41, 0x6e, 0x59, 0x00, 0x00, 0x21,
    0x56, 0x14, 0x30, 0x05, 0x00, 0x20, 0x00, 0x00, 0x00, 0x61, 0x2e, 0x70,
    0x6e, 0x67, 0x70, 0x61, 0x67, 0x65, 0x20, 0x61, 0x83, 0xcd, 0x74, 0x00,
    0x80, 0x27, 0x00, 0x08, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x02,
    0x2e, 0x23, 0xb7, 0xaa, 0x00, 0x00, 0x21, 0x56, 0x14, 0x30, 0x07, 0x00,
    0x20, 0x00, 0x00, 0x00, 0x63, 0x31, 0x30, 0x2e, 0x70, 0x6e, 0x67, 0x70,
    0x61, 0x67, 0x65, 0x20, 0x63, 0x31, 0x30, 0x84, 0xfa, 0x74, 0x00, 0x80,
    0x26, 0x00, 0x07, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x02, 0xc2,
    0x50, 0x0c, 0x2b, 0x00, 0x00, 0x21, 0x56, 0x14, 0x30, 0x06, 0x00, 0x20,
    0x00, 0x00, 0x00, 0x63, 0x32, 0x2e, 0x70, 0x6e, 0x67, 0x70, 0x61, 0x67,
    0x65, 0x20, 0x63, 0x32, 0xc4, 0x3d, 0x7b, 0x00, 0x40, 0x07, 0x00,
];

/// An image XObject of a generated pdf, `filter` is the stream's `/Filter` if any.
/// It is registered as `name`, or as `Im<position>` when unnamed.
pub struct PdfImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filter: Option<&'static str>,
    pub name: Option<&'static str>,
}

impl PdfImage {
    pub fn jpeg(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
            filter: Some("DCTDecode"),
            name: None,
        }
    }

    pub fn jpx(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
            filter: Some("JPXDecode"),
            name: None,
        }
    }

    /// Unfiltered 8-bit RGB samples
    pub fn rgb(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
            filter: None,
            name: None,
        }
    }

    pub fn named(self, name: &'static str) -> Self {
        Self {
            name: Some(name),
            ..self
        }
    }

    fn resource_name(&self, index: usize) -> String {
        self.name
            .map_or_else(|| format!("Im{index}"), ToString::to_string)
    }
}

/// A page of a generated pdf: its size in points and the images drawn on it
pub struct PdfPage {
    pub width: u32,
    pub height: u32,
    pub images: Vec<PdfImage>,
}

/// Assembles a minimal pdf, with a cross-reference table, out of `pages`
pub fn write_pdf(path: &Utf8Path, pages: &[PdfPage]) {
    // 1: catalog, 2: page tree, then per page: page, contents, images
    let mut page_ids = Vec::new();
    let mut next_id = 3;
    for page in pages {
        page_ids.push(next_id);
        next_id += 2 + page.images.len();
    }

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    let mut objects = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).into_bytes(),
    ];

    for (page, id) in pages.iter().zip(page_ids) {
        let resources = if page.images.is_empty() {
            "<< >>".to_string()
        } else {
            let xobjects = page
                .images
                .iter()
                .enumerate()
                .map(|(index, image)| {
                    format!("/{} {} 0 R", image.resource_name(index), id + 2 + index)
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!("<< /XObject << {xobjects} >> >>")
        };
        let contents = if page.images.is_empty() {
            "0 0 1 rg 10 10 50 50 re f".to_string()
        } else {
            page.images
                .iter()
                .enumerate()
                .map(|(index, image)| {
                    format!(
                        "q {} 0 0 {} 0 0 cm /{} Do Q",
                        page.width,
                        page.height,
                        image.resource_name(index)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources {resources} /Contents {} 0 R >>",
                page.width,
                page.height,
                id + 1
            )
            .into_bytes(),
        );
        objects.push(stream(&format!("<< /Length {} >>", contents.len()), contents.as_bytes()));
        for image in &page.images {
            let filter = image
                .filter
                .map(|filter| format!(" /Filter /{filter}"))
                .unwrap_or_default();
            objects.push(stream(
                &format!(
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8{filter} /Length {} >>",
                    image.width,
                    image.height,
                    image.bytes.len()
                ),
                &image.bytes,
            ));
        }
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (index, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        pdf.extend_from_slice(object);
        pdf.extend_from_slice(b"\nendobj\n");
    }
    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );

    fs::write(path, pdf).unwrap();
}

fn stream(dict: &str, bytes: &[u8]) -> Vec<u8> {
    let mut object = format!("{dict}\nstream\n").into_bytes();
    object.extend_from_slice(bytes);
    object.extend_from_slice(b"\nendstream");

    object
}

/// A MOBI 6 ebook made of a single uncompressed utf-8 text record holding `html`
pub fn write_mobi(path: &Utf8Path, html: &str) {
    const TITLE: &[u8] = b"Fixture";
    const MOBI_HEADER_LENGTH: usize = 232;

    // palmdoc header: no compression, one text record, no encryption
    let mut record0 = Vec::new();
    record0.extend_from_slice(&1u16.to_be_bytes());
    record0.extend_from_slice(&[0; 2]);
    record0.extend_from_slice(&u32::try_from(html.len()).unwrap().to_be_bytes());
    record0.extend_from_slice(&1u16.to_be_bytes());
    record0.extend_from_slice(&4096u16.to_be_bytes());
    record0.extend_from_slice(&[0; 4]);

    let mut mobi = vec![0; MOBI_HEADER_LENGTH];
    put_u32(&mut mobi, 0, u32::from_be_bytes(*b"MOBI"));
    put_u32(&mut mobi, 4, MOBI_HEADER_LENGTH as u32);
    put_u32(&mut mobi, 8, 2);
    put_u32(&mut mobi, 12, 65001);
    put_u32(&mut mobi, 64, 2);
    put_u32(&mut mobi, 68, (16 + MOBI_HEADER_LENGTH) as u32);
    put_u32(&mut mobi, 72, TITLE.len() as u32);
    put_u32(&mut mobi, 88, 6);
    put_u32(&mut mobi, 92, 2);
    mobi[176..178].copy_from_slice(&1u16.to_be_bytes());
    mobi[178..180].copy_from_slice(&1u16.to_be_bytes());
    put_u32(&mut mobi, 228, u32::MAX);
    record0.extend_from_slice(&mobi);
    record0.extend_from_slice(TITLE);
    record0.resize(record0.len().next_multiple_of(4) + 4, 0);

    // palm database header, then the two record entries and their 2 bytes gap
    let mut book = b"Fixture".to_vec();
    book.resize(32, 0);
    book.extend_from_slice(&[0; 28]);
    book.extend_from_slice(b"BOOKMOBI");
    book.extend_from_slice(&[0; 8]);
    book.extend_from_slice(&2u16.to_be_bytes());
    let first_offset = book.len() + 2 * 8 + 2;
    for (id, offset) in [(0u32, first_offset), (1, first_offset + record0.len())] {
        book.extend_from_slice(&u32::try_from(offset).unwrap().to_be_bytes());
        book.extend_from_slice(&id.to_be_bytes());
    }
    book.extend_from_slice(&[0; 2]);
    book.extend_from_slice(&record0);
    book.extend_from_slice(html.as_bytes());

    fs::write(path, book).unwrap();
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// Entry names, in archive order, and whether every entry is stored uncompressed
pub fn cbz_entries(path: &Utf8Path) -> (Vec<String>, bool) {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names = Vec::new();
    let mut stored = true;
    for index in 0..archive.len() {
        let file = archive.by_index(index).unwrap();
        names.push(file.name().to_string());
        stored &= file.compression() == zip::CompressionMethod::Stored;
    }

    (names, stored)
}

pub fn cbz_entry(path: &Utf8Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut file, &mut bytes).unwrap();

    bytes
}
