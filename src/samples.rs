//! Sample requests and fixture images for tests and demos.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};

use crate::record::{ReportRequest, Upload, UploadSource};

/// 1x1 RGBA PNG, carries an alpha channel.
const PNG_RGBA_1X1_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// 2x2 palette PNG (red, green, blue entries), indexed color.
const PNG_INDEXED_2X2_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAIAAAACCAMAAABFaP0WAAAACVBMVEX/AAAA/wAAAP8tSs2KAAAADklEQVR4nGNgYGRgYgAAAA4ABMaIfPgAAAAASUVORK5CYII=";

/// Raw bytes of a PNG with an alpha channel.
pub fn tiny_png_rgba() -> Vec<u8> {
    BASE64_STD
        .decode(PNG_RGBA_1X1_B64)
        .expect("embedded png is valid base64")
}

/// Raw bytes of an indexed-palette PNG.
pub fn tiny_png_indexed() -> Vec<u8> {
    BASE64_STD
        .decode(PNG_INDEXED_2X2_B64)
        .expect("embedded png is valid base64")
}

/// Encode a small RGB gradient as JPEG bytes, for photo fixtures.
pub fn fixture_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .expect("jpeg encoding of an in-memory fixture");
    bytes
}

/// Wrap raw bytes in a base64 `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64_STD.encode(bytes))
}

/// A complete single-page submission: all fields, an invitation, two
/// captioned photos, and a description mixing paragraphs and a list.
pub fn basic_request() -> ReportRequest {
    ReportRequest {
        organization: "Meridian Institute of Technology".to_string(),
        division: "School of Engineering".to_string(),
        department: "Department of Computer Science".to_string(),
        event_type: "Workshop".to_string(),
        title: "Rust Systems Workshop".to_string(),
        venue: "Seminar Hall A".to_string(),
        date: "2025-11-14".to_string(),
        participant: "Second-year undergraduates".to_string(),
        resource_person: "Dr. Asha Verma".to_string(),
        participant_count: "85".to_string(),
        description: "<p>A full-day workshop introducing <b>systems programming</b> in Rust \
                      to second-year students.</p>\
                      <ul><li>Memory safety without garbage collection</li>\
                      <li>Fearless concurrency <i>in practice</i></li></ul>\
                      <p>Feedback collected at the close of the day was overwhelmingly \
                      positive.</p>"
            .to_string(),
        photo_captions: "Inauguration, Hands-on session".to_string(),
        invitation: Some(Upload {
            name: "invitation.png".to_string(),
            source: UploadSource::DataUri {
                data: data_uri("image/png", &tiny_png_rgba()),
            },
        }),
        photos: vec![
            Upload {
                name: "photo1.jpg".to_string(),
                source: UploadSource::DataUri {
                    data: data_uri("image/jpeg", &fixture_jpeg(32, 24)),
                },
            },
            Upload {
                name: "photo2.jpg".to_string(),
                source: UploadSource::DataUri {
                    data: data_uri("image/jpeg", &fixture_jpeg(24, 24)),
                },
            },
        ],
    }
}

/// A submission whose description is long enough to force pagination.
pub fn multi_page_request() -> ReportRequest {
    let mut description = String::new();
    for i in 1..=30 {
        description.push_str(&format!(
            "<p>Session {i} walked through ownership, borrowing and error handling \
             with worked examples from the exercises.</p>"
        ));
    }
    description.push_str("<ul><li>Morning lab block</li><li>Afternoon lab block</li></ul>");

    ReportRequest {
        organization: "Meridian Institute of Technology".to_string(),
        division: "School of Engineering".to_string(),
        department: "Department of Computer Science".to_string(),
        event_type: "Lecture Series".to_string(),
        title: "Winter Lecture Series".to_string(),
        venue: "Auditorium".to_string(),
        date: "2026-01-20".to_string(),
        participant: "All years".to_string(),
        resource_person: "Prof. K. Raman".to_string(),
        participant_count: "240".to_string(),
        description,
        photo_captions: String::new(),
        invitation: None,
        photos: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_pngs_decode() {
        let rgba = image::load_from_memory(&tiny_png_rgba()).unwrap();
        assert_eq!((rgba.width(), rgba.height()), (1, 1));
        assert!(rgba.color().has_alpha());

        let indexed = image::load_from_memory(&tiny_png_indexed()).unwrap();
        assert_eq!((indexed.width(), indexed.height()), (2, 2));
    }

    #[test]
    fn fixture_jpeg_decodes_at_requested_size() {
        let img = image::load_from_memory(&fixture_jpeg(9, 5)).unwrap();
        assert_eq!((img.width(), img.height()), (9, 5));
    }

    #[test]
    fn sample_requests_carry_their_uploads() {
        let basic = basic_request();
        assert!(basic.invitation.is_some());
        assert_eq!(basic.photos.len(), 2);

        let multi = multi_page_request();
        assert!(multi.invitation.is_none());
        assert!(multi.description.len() > 2000);
    }
}
