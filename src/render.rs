//! PDF renderer – takes a [`DocumentLayout`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use printpdf::*;

use crate::document::{BoxContent, DocumentLayout, PlacedBox};
use crate::error::{BuildError, BuildResult};
use crate::fonts::FontVariant;
use crate::normalize::NormalizedImage;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a frozen layout into PDF bytes.
///
/// `images` is the build's image list in the order the layout indexed it
/// (invitation first, then photos). Every image is registered once as a
/// reusable XObject; a box whose index falls outside the list is skipped
/// with a `log::warn`, since it can only come from a composition defect.
pub fn render_pdf(layout: &DocumentLayout, images: &[NormalizedImage]) -> BuildResult<Vec<u8>> {
    let page_w = Mm(layout.page_width_pt * 0.352778); // pt -> mm
    let page_h = Mm(layout.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&layout.title);

    // Pre-register every normalized image. These are JPEGs this pipeline
    // produced itself, so a decode failure here is not a user error.
    let mut img_warnings: Vec<PdfWarnMsg> = Vec::new();
    let mut resources: Vec<ImageResource> = Vec::with_capacity(images.len());
    for img in images {
        let raw = RawImage::decode_from_bytes(&img.jpeg, &mut img_warnings)
            .map_err(|e| BuildError::Pdf(format!("embedding '{}': {e}", img.origin)))?;
        resources.push(ImageResource {
            xobj_id: doc.add_image(&raw),
            px_width: img.px_width,
            px_height: img.px_height,
        });
    }

    let mut pages = Vec::new();
    for page_layout in &layout.pages {
        let mut ops = Vec::new();
        for pbox in &page_layout.boxes {
            render_box(&mut ops, pbox, layout.page_height_pt, &resources);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    // An empty layout still produces a single blank page; zero-page PDFs
    // trip up some viewers.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    Ok(bytes)
}

fn builtin_font(variant: FontVariant) -> BuiltinFont {
    match variant {
        FontVariant::Regular => BuiltinFont::Helvetica,
        FontVariant::Bold => BuiltinFont::HelveticaBold,
        FontVariant::Italic => BuiltinFont::HelveticaOblique,
        FontVariant::BoldItalic => BuiltinFont::HelveticaBoldOblique,
    }
}

/// Render one placed box into PDF ops.
fn render_box(ops: &mut Vec<Op>, pbox: &PlacedBox, page_height: f32, resources: &[ImageResource]) {
    // Layout y grows downward from the top edge; PDF's origin sits at the
    // bottom-left corner.
    let pdf_y = page_height - pbox.y;

    match &pbox.content {
        BoxContent::Text(text) => {
            let font = builtin_font(text.variant);
            for line in &text.lines {
                if line.text.is_empty() {
                    continue;
                }
                let text_x = pbox.x + line.x_offset;
                // y_offset already points at the baseline.
                let text_y = pdf_y - line.y_offset;

                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(text_x),
                        y: Pt(text_y),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(text.size),
                    font,
                });
                ops.push(Op::SetLineHeight {
                    lh: Pt(text.line_height),
                });
                ops.push(Op::SetFillColor {
                    col: Color::Rgb(Rgb {
                        r: text.color[0],
                        g: text.color[1],
                        b: text.color[2],
                        icc_profile: None,
                    }),
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(to_winlatin(&line.text))],
                    font,
                });
                ops.push(Op::EndTextSection);
            }
        }
        BoxContent::Image { index } => {
            let Some(res) = resources.get(*index) else {
                log::warn!(
                    "layout references image {} but only {} were registered; skipping",
                    index,
                    resources.len()
                );
                return;
            };

            // translate_y addresses the bottom edge of the image.
            let bottom_y = page_height - pbox.y - pbox.height;

            // printpdf renders 1 px = 1 pt at dpi 72, so the factor is the
            // placed size in pt over the pixel dimension.
            let scale = |px: u32, placed_pt: f32| {
                if px > 0 {
                    placed_pt / px as f32
                } else {
                    1.0
                }
            };

            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(pbox.x)),
                    translate_y: Some(Pt(bottom_y)),
                    dpi: Some(72.0),
                    scale_x: Some(scale(res.px_width, pbox.width)),
                    scale_y: Some(scale(res.px_height, pbox.height)),
                    rotate: None,
                },
            });
        }
    }
}

/// Map one Unicode scalar onto its Windows-1252 byte.
///
/// Builtin PDF fonts are served with WinAnsiEncoding, where the glyphs the
/// form text actually produces beyond Latin-1 (curly quotes, dashes, the
/// euro sign) live in the 0x80–0x9F range. Anything unmappable becomes '?'.
fn winansi_byte(c: char) -> u8 {
    match c {
        '\u{00A0}' => 0x20, // no-break space, collapse to a plain space
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201A}' => 0x82,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{201E}' => 0x84,
        '\u{2022}' => 0x95,
        '\u{2026}' => 0x85,
        '\u{20AC}' => 0x80,
        '\u{2122}' => 0x99,
        c if (c as u32) < 256 => c as u8,
        _ => b'?',
    }
}

/// Re-encode a UTF-8 string so each char occupies one Windows-1252 byte.
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s.chars().map(winansi_byte).collect();
    // SAFETY: the result is deliberately not valid UTF-8 in the 0x80-0x9F
    // range. It is only ever handed to printpdf, which copies the raw bytes
    // into the content stream where the viewer applies WinAnsiEncoding;
    // nothing inspects it as text.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}
