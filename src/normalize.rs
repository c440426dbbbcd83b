//! Image normalization – decodes an uploaded image and re-encodes it as
//! baseline RGB JPEG, the one raster format the rest of the pipeline deals
//! in. Alpha channels and palettes are flattened here so placement and
//! embedding never see them.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::error::{BuildError, BuildResult};

/// An upload decoded and re-encoded into the pipeline's canonical form.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Canonical JPEG bytes.
    pub jpeg: Vec<u8>,
    /// Pixel width of the decoded image.
    pub px_width: u32,
    /// Pixel height of the decoded image.
    pub px_height: u32,
    /// Name the upload arrived under, kept for diagnostics and the
    /// canonical file name.
    pub origin: String,
}

impl NormalizedImage {
    /// File name the canonical bytes are stored under: the origin's stem
    /// with a `.jpg` extension.
    pub fn canonical_name(&self) -> String {
        let stem = match self.origin.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => self.origin.as_str(),
        };
        format!("{stem}.jpg")
    }

    /// Width over height of the decoded pixels.
    pub fn aspect_ratio(&self) -> f32 {
        self.px_width as f32 / self.px_height.max(1) as f32
    }
}

/// Decode `bytes` as any supported raster format and re-encode as RGB JPEG.
///
/// Fails with [`BuildError::InvalidImage`] when the bytes do not decode;
/// a failed upload aborts the whole build rather than producing a report
/// with a hole in it.
pub fn normalize(bytes: &[u8], origin: &str) -> BuildResult<NormalizedImage> {
    let decoded = image::load_from_memory(bytes).map_err(|source| BuildError::InvalidImage {
        name: origin.to_string(),
        source,
    })?;
    let rgb = decoded.to_rgb8();
    let (px_width, px_height) = (rgb.width(), rgb.height());

    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .map_err(|source| BuildError::InvalidImage {
            name: origin.to_string(),
            source,
        })?;

    log::debug!(
        "normalized '{}': {}x{} px, {} byte jpeg",
        origin,
        px_width,
        px_height,
        jpeg.len()
    );

    Ok(NormalizedImage {
        jpeg,
        px_width,
        px_height,
        origin: origin.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;
    use image::ColorType;

    fn decoded_color(norm: &NormalizedImage) -> ColorType {
        image::load_from_memory(&norm.jpeg).unwrap().color()
    }

    #[test]
    fn jpeg_input_stays_rgb() {
        let bytes = samples::fixture_jpeg(8, 6);
        let norm = normalize(&bytes, "photo.jpg").unwrap();
        assert_eq!(norm.px_width, 8);
        assert_eq!(norm.px_height, 6);
        assert_eq!(decoded_color(&norm), ColorType::Rgb8);
    }

    #[test]
    fn png_with_alpha_is_flattened_to_rgb() {
        let bytes = samples::tiny_png_rgba();
        let norm = normalize(&bytes, "invite.png").unwrap();
        assert_eq!(norm.px_width, 1);
        assert_eq!(norm.px_height, 1);
        assert_eq!(decoded_color(&norm), ColorType::Rgb8);
    }

    #[test]
    fn indexed_png_is_expanded_to_rgb() {
        let bytes = samples::tiny_png_indexed();
        let norm = normalize(&bytes, "banner.png").unwrap();
        assert_eq!(norm.px_width, 2);
        assert_eq!(norm.px_height, 2);
        assert_eq!(decoded_color(&norm), ColorType::Rgb8);
    }

    #[test]
    fn undecodable_bytes_are_an_invalid_image() {
        let err = normalize(b"not an image at all", "bogus.png").unwrap_err();
        match err {
            BuildError::InvalidImage { name, .. } => assert_eq!(name, "bogus.png"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn canonical_name_swaps_extension_for_jpg() {
        let norm = normalize(&samples::tiny_png_rgba(), "invite.png").unwrap();
        assert_eq!(norm.canonical_name(), "invite.jpg");
    }

    #[test]
    fn canonical_name_appends_jpg_when_no_extension() {
        let norm = normalize(&samples::tiny_png_rgba(), "invite").unwrap();
        assert_eq!(norm.canonical_name(), "invite.jpg");
    }

    #[test]
    fn canonical_name_keeps_leading_dot_names_whole() {
        let norm = normalize(&samples::tiny_png_rgba(), ".hidden").unwrap();
        assert_eq!(norm.canonical_name(), ".hidden.jpg");
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        let bytes = samples::fixture_jpeg(4, 2);
        let norm = normalize(&bytes, "wide.jpg").unwrap();
        assert!((norm.aspect_ratio() - 2.0).abs() < f32::EPSILON);
    }
}
