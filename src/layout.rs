//! Document layout engine – one top-to-bottom composition pass.
//!
//! A `LayoutCursor` walks down the page placing boxes: header lines, the
//! optional invitation image, the field block, the wrapped description, and
//! the photo gallery. Whenever the next element would cross the break limit
//! the cursor closes the page (stamping its footer) and continues on a
//! fresh one. Images and headings are placed whole; wrapped text may split
//! across pages at a line boundary. The output is a frozen
//! [`DocumentLayout`] with every coordinate resolved, ready for rendering.

use crate::document::{BoxContent, DocumentLayout, PageLayout, PlacedBox, TextContent, TextLine};
use crate::flatten::{BlockKind, TextBlock};
use crate::fonts::{wrap_text, FontManager, FontVariant};
use crate::normalize::NormalizedImage;
use crate::record::EventRecord;

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

/// Cursor reaching this far above the bottom edge forces a page break.
const BREAK_MARGIN: f32 = 20.0 * MM;
/// The footer band starts this far above the bottom edge.
const FOOTER_RISE: f32 = 15.0 * MM;
const FOOTER_BAND: f32 = 10.0 * MM;

/// Height of one header, field, body or caption line slot.
const LINE: f32 = 6.0 * MM;
const DESC_HEADING_H: f32 = 8.0 * MM;
const PHOTOS_HEADING_H: f32 = 10.0 * MM;
/// Gallery photos are stretched into a box this tall.
const PHOTO_BOX_H: f32 = 90.0 * MM;

const HEADER_GAP: f32 = 5.0 * MM;
const INVITATION_GAP: f32 = 10.0 * MM;
const SECTION_GAP: f32 = 5.0 * MM;
/// Extra space after a description block, by block kind (pt).
const PARAGRAPH_GAP: f32 = 6.0;
const LIST_ITEM_GAP: f32 = 2.0;

const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];

/// Fixed page geometry for one build.
#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    /// Page width in points.
    pub page_width: f32,
    /// Page height in points.
    pub page_height: f32,
    /// Margin on all four sides, in points.
    pub margin: f32,
}

impl PageGeometry {
    /// A4 portrait with the standard 10 mm margin.
    pub fn a4() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 10.0 * MM,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn break_limit(&self) -> f32 {
        self.page_height - BREAK_MARGIN
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
}

/// Mutable composition state for one build: current page, vertical offset
/// and text style. Never reused across builds.
struct LayoutCursor<'a> {
    fonts: &'a FontManager,
    geom: PageGeometry,
    pages: Vec<PageLayout>,
    boxes: Vec<PlacedBox>,
    page_number: usize,
    y: f32,
    variant: FontVariant,
    size: f32,
    color: [f32; 3],
}

impl<'a> LayoutCursor<'a> {
    fn new(fonts: &'a FontManager, geom: PageGeometry, first_page_number: usize) -> Self {
        Self {
            fonts,
            geom,
            pages: Vec::new(),
            boxes: Vec::new(),
            page_number: first_page_number,
            y: geom.margin,
            variant: FontVariant::Regular,
            size: 11.0,
            color: BLACK,
        }
    }

    fn set_font(&mut self, variant: FontVariant, size: f32) {
        self.variant = variant;
        self.size = size;
    }

    fn set_color(&mut self, color: [f32; 3]) {
        self.color = color;
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= self.geom.break_limit()
    }

    /// Break to a new page if `height` does not fit below the cursor. An
    /// element taller than a whole page is placed at the top of a fresh
    /// page anyway and logged as a defect; it must never loop.
    fn ensure_room(&mut self, height: f32) {
        if self.fits(height) {
            return;
        }
        if self.y > self.geom.margin {
            self.close_page();
        }
        if !self.fits(height) {
            log::error!(
                "element {:.0} pt tall exceeds the usable page height; placing at top of page {}",
                height,
                self.page_number
            );
        }
    }

    /// Stamp the running footer, emit the page, and reset to a fresh one.
    fn close_page(&mut self) {
        let text = format!("Page {}", self.page_number);
        let width = self.fonts.measure_text_width(&text, 8.0, FontVariant::Italic);
        let x_offset = ((self.geom.content_width() - width) / 2.0).max(0.0);
        self.boxes.push(PlacedBox {
            x: self.geom.margin,
            y: self.geom.page_height - FOOTER_RISE,
            width: self.geom.content_width(),
            height: FOOTER_BAND,
            content: BoxContent::Text(TextContent {
                lines: vec![TextLine {
                    text,
                    x_offset,
                    y_offset: self.fonts.ascender_pt(8.0, FontVariant::Italic),
                }],
                variant: FontVariant::Italic,
                size: 8.0,
                color: BLACK,
                line_height: FOOTER_BAND,
            }),
        });
        self.pages.push(PageLayout {
            page_number: self.page_number,
            boxes: std::mem::take(&mut self.boxes),
        });
        self.page_number += 1;
        self.y = self.geom.margin;
    }

    fn x_offset_for(&self, text: &str, align: Align) -> f32 {
        match align {
            Align::Left => 0.0,
            Align::Center => {
                let width = self.fonts.measure_text_width(text, self.size, self.variant);
                ((self.geom.content_width() - width) / 2.0).max(0.0)
            }
        }
    }

    /// Place one full-width line slot of the given height.
    fn line(&mut self, text: &str, height: f32, align: Align) {
        self.ensure_room(height);
        let line = TextLine {
            text: text.to_string(),
            x_offset: self.x_offset_for(text, align),
            y_offset: self.fonts.ascender_pt(self.size, self.variant),
        };
        self.boxes.push(PlacedBox {
            x: self.geom.margin,
            y: self.y,
            width: self.geom.content_width(),
            height,
            content: BoxContent::Text(TextContent {
                lines: vec![line],
                variant: self.variant,
                size: self.size,
                color: self.color,
                line_height: height,
            }),
        });
        self.y += height;
    }

    /// Place wrapped text at a fixed line height, splitting across pages at
    /// line boundaries when it runs past the break limit.
    fn multi_line(&mut self, text: &str, line_height: f32, align: Align) {
        let wrapped = wrap_text(
            text,
            self.size,
            self.variant,
            self.geom.content_width(),
            self.fonts,
        );

        let mut idx = 0;
        while idx < wrapped.len() {
            self.ensure_room(line_height);
            let avail = self.geom.break_limit() - self.y;
            let fit = ((avail / line_height).floor() as usize).max(1);
            let take = fit.min(wrapped.len() - idx);

            let lines: Vec<TextLine> = wrapped[idx..idx + take]
                .iter()
                .enumerate()
                .map(|(i, text)| TextLine {
                    text: text.clone(),
                    x_offset: self.x_offset_for(text, align),
                    y_offset: i as f32 * line_height
                        + self.fonts.ascender_pt(self.size, self.variant),
                })
                .collect();
            let height = take as f32 * line_height;
            self.boxes.push(PlacedBox {
                x: self.geom.margin,
                y: self.y,
                width: self.geom.content_width(),
                height,
                content: BoxContent::Text(TextContent {
                    lines,
                    variant: self.variant,
                    size: self.size,
                    color: self.color,
                    line_height,
                }),
            });
            self.y += height;
            idx += take;
        }
    }

    /// Place an image box by index into the build's image list.
    fn image(&mut self, index: usize, width: f32, height: f32) {
        self.ensure_room(height);
        self.boxes.push(PlacedBox {
            x: self.geom.margin,
            y: self.y,
            width,
            height,
            content: BoxContent::Image { index },
        });
        self.y += height;
    }

    /// Move the cursor down without placing anything. Gaps never force a
    /// break on their own; the next placement does.
    fn advance(&mut self, height: f32) {
        self.y += height;
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.close_page();
        self.pages
    }
}

/// Compose one report into a frozen page layout.
///
/// Image indices in the result refer to the build's image list: the
/// invitation (when present) is index 0, photos follow in order.
pub fn compose(
    record: &EventRecord,
    invitation: Option<&NormalizedImage>,
    photos: &[NormalizedImage],
    description: &[TextBlock],
    geom: PageGeometry,
    first_page_number: usize,
    fonts: &FontManager,
) -> DocumentLayout {
    let mut cur = LayoutCursor::new(fonts, geom, first_page_number);

    // Letterhead.
    cur.set_font(FontVariant::Bold, 14.0);
    cur.set_color(BLUE);
    cur.line(&record.organization, LINE, Align::Center);
    cur.set_font(FontVariant::Bold, 13.0);
    cur.set_color(BLACK);
    cur.line(&record.division, LINE, Align::Center);
    cur.line(&record.department, LINE, Align::Center);
    cur.advance(HEADER_GAP);

    // Invitation at full content width, aspect preserved.
    if let Some(img) = invitation {
        let width = geom.content_width();
        let height = width / img.aspect_ratio();
        cur.image(0, width, height);
        cur.advance(INVITATION_GAP);
    }

    // Field block. Empty values still render their label line.
    cur.set_font(FontVariant::Regular, 11.0);
    for (label, value) in [
        ("Event", record.title.as_str()),
        ("Type", record.event_type.as_str()),
        ("Venue", record.venue.as_str()),
        ("Date", record.date.as_str()),
        ("Participant Count", record.participant_count.as_str()),
        ("Participant", record.participant.as_str()),
        ("Resource Person", record.resource_person.as_str()),
    ] {
        cur.line(&format!("{label}: {value}"), LINE, Align::Left);
    }
    cur.advance(SECTION_GAP);

    // Description.
    cur.set_font(FontVariant::Bold, 12.0);
    cur.line("About the Event:", DESC_HEADING_H, Align::Left);
    cur.set_font(FontVariant::Regular, 11.0);
    for block in description {
        cur.multi_line(&block.text, LINE, Align::Left);
        cur.advance(match block.kind {
            BlockKind::Paragraph => PARAGRAPH_GAP,
            BlockKind::ListItem => LIST_ITEM_GAP,
        });
    }
    cur.advance(SECTION_GAP);

    // Gallery. Photos are stretched into a fixed box; a caption renders
    // only when one exists at the photo's index.
    if !photos.is_empty() {
        cur.set_font(FontVariant::Bold, 12.0);
        cur.line("Event Photos", PHOTOS_HEADING_H, Align::Left);
        let first_index = if invitation.is_some() { 1 } else { 0 };
        for (i, _) in photos.iter().enumerate() {
            cur.image(first_index + i, geom.content_width(), PHOTO_BOX_H);
            if let Some(caption) = record.photo_captions.get(i) {
                cur.set_font(FontVariant::Regular, 10.0);
                cur.multi_line(&format!("({caption})"), LINE, Align::Center);
            }
            cur.advance(SECTION_GAP);
        }
    }

    DocumentLayout {
        title: record.title.clone(),
        page_width_pt: geom.page_width,
        page_height_pt: geom.page_height,
        pages: cur.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_image(px_width: u32, px_height: u32, origin: &str) -> NormalizedImage {
        NormalizedImage {
            jpeg: Vec::new(),
            px_width,
            px_height,
            origin: origin.to_string(),
        }
    }

    fn paragraphs(n: usize) -> Vec<TextBlock> {
        (0..n)
            .map(|i| TextBlock {
                kind: BlockKind::Paragraph,
                text: format!("Paragraph {i} of the report body"),
            })
            .collect()
    }

    fn footer_of(page: &PageLayout) -> &TextContent {
        match &page.boxes.last().expect("page has boxes").content {
            BoxContent::Text(t) => t,
            other => panic!("footer should be text, got {other:?}"),
        }
    }

    #[test]
    fn empty_record_fits_one_page() {
        let fonts = FontManager::default();
        let layout = compose(
            &EventRecord::default(),
            None,
            &[],
            &[],
            PageGeometry::a4(),
            1,
            &fonts,
        );
        assert_eq!(layout.pages.len(), 1);
        // 3 header lines, 7 field lines, the description heading, the footer.
        assert_eq!(layout.pages[0].boxes.len(), 12);
        assert_eq!(footer_of(&layout.pages[0]).lines[0].text, "Page 1");
    }

    #[test]
    fn header_lines_are_centered() {
        let fonts = FontManager::default();
        let record = EventRecord {
            organization: "Meridian Institute".to_string(),
            ..EventRecord::default()
        };
        let layout = compose(&record, None, &[], &[], PageGeometry::a4(), 1, &fonts);
        let first = &layout.pages[0].boxes[0];
        match &first.content {
            BoxContent::Text(t) => {
                assert_eq!(t.size, 14.0);
                assert_eq!(t.color, BLUE);
                assert!(t.lines[0].x_offset > 0.0, "header should be centered");
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn field_lines_render_labels_for_empty_values() {
        let fonts = FontManager::default();
        let layout = compose(
            &EventRecord::default(),
            None,
            &[],
            &[],
            PageGeometry::a4(),
            1,
            &fonts,
        );
        let texts: Vec<String> = layout.pages[0]
            .boxes
            .iter()
            .filter_map(|b| match &b.content {
                BoxContent::Text(t) if t.size == 11.0 => Some(t.lines[0].text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                "Event: ",
                "Type: ",
                "Venue: ",
                "Date: ",
                "Participant Count: ",
                "Participant: ",
                "Resource Person: ",
            ]
        );
    }

    #[test]
    fn long_description_breaks_pages_and_numbers_footers() {
        let fonts = FontManager::default();
        let layout = compose(
            &EventRecord::default(),
            None,
            &[],
            &paragraphs(60),
            PageGeometry::a4(),
            1,
            &fonts,
        );
        assert!(layout.pages.len() >= 2, "expected a page break");
        for (i, page) in layout.pages.iter().enumerate() {
            assert_eq!(page.page_number, i + 1);
            let footer = footer_of(page);
            assert_eq!(footer.lines[0].text, format!("Page {}", i + 1));
            assert_eq!(footer.size, 8.0);
            assert_eq!(footer.variant, FontVariant::Italic);
        }
    }

    #[test]
    fn first_page_number_is_configurable() {
        let fonts = FontManager::default();
        let layout = compose(
            &EventRecord::default(),
            None,
            &[],
            &[],
            PageGeometry::a4(),
            5,
            &fonts,
        );
        assert_eq!(layout.pages[0].page_number, 5);
        assert_eq!(footer_of(&layout.pages[0]).lines[0].text, "Page 5");
    }

    #[test]
    fn invitation_keeps_aspect_while_photos_stretch() {
        let fonts = FontManager::default();
        let record = EventRecord {
            photo_captions: vec!["Opening".to_string()],
            ..EventRecord::default()
        };
        let geom = PageGeometry::a4();
        let invitation = fake_image(4, 2, "invite.jpg");
        let photos = vec![fake_image(10, 1, "wide.jpg")];
        let layout = compose(&record, Some(&invitation), &photos, &[], geom, 1, &fonts);

        let image_boxes: Vec<&PlacedBox> = layout
            .pages
            .iter()
            .flat_map(|p| p.boxes.iter())
            .filter(|b| matches!(b.content, BoxContent::Image { .. }))
            .collect();
        assert_eq!(image_boxes.len(), 2);
        // Invitation: full width, height follows the 2:1 aspect.
        assert!((image_boxes[0].height - geom.content_width() / 2.0).abs() < 0.1);
        // Photo: fixed 90 mm box regardless of its 10:1 aspect.
        assert!((image_boxes[1].height - PHOTO_BOX_H).abs() < 0.01);
    }

    #[test]
    fn image_indices_offset_by_invitation() {
        let fonts = FontManager::default();
        let invitation = fake_image(1, 1, "invite.jpg");
        let photos = vec![fake_image(1, 1, "a.jpg"), fake_image(1, 1, "b.jpg")];
        let layout = compose(
            &EventRecord::default(),
            Some(&invitation),
            &photos,
            &[],
            PageGeometry::a4(),
            1,
            &fonts,
        );
        let indices: Vec<usize> = layout
            .pages
            .iter()
            .flat_map(|p| p.boxes.iter())
            .filter_map(|b| match b.content {
                BoxContent::Image { index } => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn caption_renders_centered_under_its_photo() {
        let fonts = FontManager::default();
        let record = EventRecord {
            photo_captions: vec!["Opening".to_string()],
            ..EventRecord::default()
        };
        let photos = vec![fake_image(3, 2, "a.jpg")];
        let layout = compose(&record, None, &photos, &[], PageGeometry::a4(), 1, &fonts);

        let boxes: Vec<&PlacedBox> = layout.pages.iter().flat_map(|p| p.boxes.iter()).collect();
        let photo_at = boxes
            .iter()
            .position(|b| matches!(b.content, BoxContent::Image { .. }))
            .expect("photo placed");
        match &boxes[photo_at + 1].content {
            BoxContent::Text(t) => {
                assert_eq!(t.lines[0].text, "(Opening)");
                assert_eq!(t.size, 10.0);
                assert!(t.lines[0].x_offset > 0.0, "caption should be centered");
            }
            other => panic!("expected caption after photo, got {other:?}"),
        }
    }

    #[test]
    fn uncaptioned_photo_has_no_trailing_text() {
        let fonts = FontManager::default();
        let photos = vec![fake_image(3, 2, "a.jpg")];
        let layout = compose(
            &EventRecord::default(),
            None,
            &photos,
            &[],
            PageGeometry::a4(),
            1,
            &fonts,
        );
        let boxes = &layout.pages.last().unwrap().boxes;
        let photo_at = boxes
            .iter()
            .position(|b| matches!(b.content, BoxContent::Image { .. }))
            .unwrap();
        // Next box is the footer, not a caption.
        match &boxes[photo_at + 1].content {
            BoxContent::Text(t) => assert!(t.lines[0].text.starts_with("Page ")),
            other => panic!("expected footer, got {other:?}"),
        }
    }

    #[test]
    fn oversized_invitation_lands_on_a_fresh_page() {
        let fonts = FontManager::default();
        let geom = PageGeometry::a4();
        // 1:20 aspect at full width is several pages tall.
        let invitation = fake_image(2, 40, "tall.png");
        let layout = compose(
            &EventRecord::default(),
            Some(&invitation),
            &[],
            &[],
            geom,
            1,
            &fonts,
        );
        assert!(layout.pages.len() >= 2);
        let second = &layout.pages[1];
        let first_box = &second.boxes[0];
        assert!(matches!(first_box.content, BoxContent::Image { index: 0 }));
        assert!((first_box.y - geom.margin).abs() < 0.01);
    }

    #[test]
    fn wrapped_text_splits_at_line_boundaries() {
        let fonts = FontManager::default();
        let huge = TextBlock {
            kind: BlockKind::Paragraph,
            text: "lorem ".repeat(900).trim_end().to_string(),
        };
        let geom = PageGeometry::a4();
        let layout = compose(
            &EventRecord::default(),
            None,
            &[],
            &[huge],
            geom,
            1,
            &fonts,
        );
        assert!(layout.pages.len() >= 2, "expected the block to split");
        for page in &layout.pages {
            for pbox in &page.boxes {
                // Nothing except the footer may sit past the break limit.
                if pbox.y + pbox.height > geom.page_height - BREAK_MARGIN + 0.01 {
                    match &pbox.content {
                        BoxContent::Text(t) => {
                            assert!(t.lines[0].text.starts_with("Page "))
                        }
                        other => panic!("content past break limit: {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn trailing_gap_does_not_open_an_empty_page() {
        let fonts = FontManager::default();
        // Sized so the section gap after the description runs past the
        // break limit with nothing left to place.
        let layout = compose(
            &EventRecord::default(),
            None,
            &[],
            &paragraphs(28),
            PageGeometry::a4(),
            1,
            &fonts,
        );
        for page in &layout.pages {
            // Every page carries real content besides its footer.
            assert!(page.boxes.len() > 1);
        }
    }
}
