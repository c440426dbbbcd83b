//! Pipeline – ties together intake, image normalization, description
//! flattening, composition, and rendering into a single build call.

use std::fs;
use std::path::PathBuf;

use crate::document::DocumentLayout;
use crate::error::BuildResult;
use crate::flatten::flatten;
use crate::fonts::{FontManager, FontVariant};
use crate::layout::{compose, PageGeometry, MM};
use crate::normalize::{normalize, NormalizedImage};
use crate::record::{artifact_name, ReportRequest, Upload};
use crate::remote::{offer, RemoteStore};
use crate::render::render_pdf;
use crate::storage::RequestStore;

/// Photo uploads beyond this count are ignored.
pub const MAX_PHOTOS: usize = 4;

/// Configuration for one report build.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Title embedded in the PDF metadata; defaults to the event title.
    pub title: Option<String>,
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points (default: 10 mm).
    pub page_margin: f32,
    /// Footer counter start; fixed so identical inputs give identical
    /// documents.
    pub first_page_number: usize,
    /// Optional TTF/OTF file used for text measurement. Rendering always
    /// uses the builtin Helvetica family; a real face only sharpens
    /// wrapping. Unreadable or unparsable files degrade to the heuristic
    /// metrics with a warning.
    pub font: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title: None,
            page_width: 595.28,
            page_height: 841.89,
            page_margin: 10.0 * MM,
            first_page_number: 1,
            font: None,
        }
    }
}

impl PipelineConfig {
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            page_width: self.page_width,
            page_height: self.page_height,
            margin: self.page_margin,
        }
    }
}

/// Everything a finished build hands back to its caller.
#[derive(Debug)]
pub struct BuildOutput {
    /// Artifact file name, `{title}_{date}.pdf`; also the retrieval key
    /// for [`RequestStore::read_artifact`].
    pub artifact: String,
    /// The finished PDF.
    pub pdf: Vec<u8>,
    /// The frozen layout the PDF was rendered from.
    pub layout: DocumentLayout,
}

/// Build one report: normalize uploads into `store`, compose and render
/// the document, persist it, then offer the results to `remote`.
///
/// Any failure aborts the build with no artifact written and nothing
/// offered to the remote store. Remote failures after a successful build
/// are logged and ignored.
pub fn build_report(
    request: &ReportRequest,
    store: &RequestStore,
    remote: Option<&dyn RemoteStore>,
    config: &PipelineConfig,
) -> BuildResult<BuildOutput> {
    let record = request.record();

    // 1. Normalize the invitation, when present.
    let (invitation, invitation_path) = match &request.invitation {
        Some(upload) => {
            let (image, path) = stage_and_normalize(store, upload)?;
            (Some(image), Some(path))
        }
        None => (None, None),
    };

    // 2. Normalize photos, capped.
    if request.photos.len() > MAX_PHOTOS {
        log::debug!(
            "ignoring {} photo uploads beyond the cap of {MAX_PHOTOS}",
            request.photos.len() - MAX_PHOTOS
        );
    }
    let mut photos = Vec::new();
    let mut photo_paths = Vec::new();
    for upload in request.photos.iter().take(MAX_PHOTOS) {
        let (image, path) = stage_and_normalize(store, upload)?;
        photos.push(image);
        photo_paths.push(path);
    }
    if record.photo_captions.len() > photos.len() {
        log::warn!(
            "{} captions for {} photos; extra captions are unused",
            record.photo_captions.len(),
            photos.len()
        );
    }

    // 3. Flatten the description markup.
    let description = flatten(&record.description);

    // 4. Compose the page layout.
    let mut fonts = FontManager::default();
    if let Some(path) = &config.font {
        load_measurement_font(&mut fonts, path);
    }
    let mut layout = compose(
        &record,
        invitation.as_ref(),
        &photos,
        &description,
        config.geometry(),
        config.first_page_number,
        &fonts,
    );
    if let Some(title) = &config.title {
        layout.title = title.clone();
    }

    // 5. Render and persist the artifact.
    let mut images = Vec::with_capacity(photos.len() + 1);
    images.extend(invitation);
    images.extend(photos);
    let pdf = render_pdf(&layout, &images)?;
    let artifact = artifact_name(&record);
    let artifact_path = store.write_artifact(&artifact, &pdf)?;

    // 6. Offer everything to the remote store, best-effort.
    if let Some(remote) = remote {
        for path in invitation_path.iter().chain(photo_paths.iter()) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                offer(remote, name, path);
            }
        }
        offer(remote, &artifact, &artifact_path);
    }

    Ok(BuildOutput {
        artifact,
        pdf,
        layout,
    })
}

/// Stage an upload, normalize it, and promote the canonical JPEG into the
/// store. Returns the image and the canonical path (kept for the remote
/// offer). On failure the canonical file is never written.
fn stage_and_normalize(
    store: &RequestStore,
    upload: &Upload,
) -> BuildResult<(NormalizedImage, PathBuf)> {
    let bytes = upload.read_bytes()?;
    let staged = store.stage_original(&upload.name, &bytes)?;
    let image = normalize(&bytes, &upload.name)?;
    let canonical = store.promote(&staged, &image.canonical_name(), &image.jpeg)?;
    Ok((image, canonical))
}

fn load_measurement_font(fonts: &mut FontManager, path: &std::path::Path) {
    match fs::read(path) {
        Ok(bytes) => {
            if let Err(e) = fonts.load_font(FontVariant::Regular, bytes) {
                log::warn!("ignoring unusable font {}: {e}", path.display());
            }
        }
        Err(e) => log::warn!("cannot read font {}: {e}", path.display()),
    }
}
