//! Grid label text.
//!
//! Labels are written out as an SVG text layer and rasterised with resvg
//! straight onto the composite surface. The face is compiled in, so browser
//! builds need no system fonts.

use std::sync::{Arc, OnceLock};

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use super::RenderError;
use crate::grid::GridDrawing;

/// Family name of the embedded label face.
pub const LABEL_FONT_FAMILY: &str = "DejaVu Sans";

const LABEL_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Digit height of the embedded face, in em.
const DIGIT_HEIGHT_EM: f64 = 0.729;

fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut fontdb = fontdb::Database::new();
            fontdb.load_font_data(LABEL_FONT.to_vec());
            fontdb.set_sans_serif_family(LABEL_FONT_FAMILY);
            tracing::debug!(
                font_count = fontdb.len(),
                family = LABEL_FONT_FAMILY,
                "Loaded label font"
            );
            Arc::new(fontdb)
        })
        .clone()
}

/// SVG document holding every label of `drawing`, or `None` when there is
/// nothing to draw.
///
/// Anchors are the top-left corner of the digits: the baseline is pushed
/// down by one digit height.
pub fn labels_svg(drawing: &GridDrawing, width: u32, height: u32) -> Option<String> {
    let font_size = f64::from(drawing.font_size);
    if !font_size.is_finite() || font_size <= 0.0 {
        return None;
    }

    let baseline = font_size * DIGIT_HEIGHT_EM;
    let mut body = String::new();
    for (text, at) in drawing.labels() {
        body.push_str(&format!(
            r#"<text x="{}" y="{}">{}</text>"#,
            at.x,
            at.y + baseline,
            escape(text)
        ));
    }
    if body.is_empty() {
        return None;
    }

    Some(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><g font-family="{LABEL_FONT_FAMILY}" font-size="{font_size}" fill="{color}">{body}</g></svg>"#,
        color = drawing.color,
    ))
}

/// Rasterise the labels of `drawing` onto `pixmap`.
pub(super) fn paint_labels(pixmap: &mut Pixmap, drawing: &GridDrawing) -> Result<(), RenderError> {
    let Some(svg) = labels_svg(drawing, pixmap.width(), pixmap.height()) else {
        return Ok(());
    };

    let options = usvg::Options {
        fontdb: font_database(),
        ..Default::default()
    };
    let tree =
        usvg::Tree::from_str(&svg, &options).map_err(|e| RenderError::Labels(e.to_string()))?;

    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{DrawCommand, Point, Rgb};
    use tiny_skia::Color;

    fn drawing(labels: &[(&str, f64, f64)], font_size: f32) -> GridDrawing {
        GridDrawing {
            commands: labels
                .iter()
                .map(|&(text, x, y)| DrawCommand::Label {
                    text: text.to_string(),
                    at: Point::new(x, y),
                })
                .collect(),
            color: Rgb::new(0, 0, 0),
            line_width: 1.0,
            font_size,
        }
    }

    fn white_pixmap(width: u32, height: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(Color::WHITE);
        pixmap
    }

    fn inked(pixmap: &Pixmap, x: u32, y: u32) -> bool {
        pixmap
            .pixel(x, y)
            .map(|px| px.demultiply())
            .is_some_and(|c| c.red() < 200)
    }

    fn columns_with_ink(pixmap: &Pixmap) -> Vec<u32> {
        (0..pixmap.width())
            .filter(|&x| (0..pixmap.height()).any(|y| inked(pixmap, x, y)))
            .collect()
    }

    fn rows_with_ink(pixmap: &Pixmap) -> Vec<u32> {
        (0..pixmap.height())
            .filter(|&y| (0..pixmap.width()).any(|x| inked(pixmap, x, y)))
            .collect()
    }

    #[test]
    fn test_embedded_font_is_registered() {
        let fontdb = font_database();
        assert!(fontdb
            .faces()
            .any(|face| face.families.iter().any(|(name, _)| name == LABEL_FONT_FAMILY)));
    }

    #[test]
    fn test_labels_svg_shape() {
        let svg = labels_svg(&drawing(&[("1", 5.0, 5.0), ("12", 45.0, 5.0)], 12.0), 80, 40)
            .unwrap();
        assert_eq!(svg.matches("<text ").count(), 2);
        assert!(svg.contains(r#"x="45""#));
        assert!(svg.contains(">12</text>"));
        assert!(svg.contains(r##"fill="#000000""##));
        assert!(svg.contains(r#"font-size="12""#));
        assert!(svg.contains(r#"viewBox="0 0 80 40""#));
    }

    #[test]
    fn test_labels_svg_empty_cases() {
        assert!(labels_svg(&drawing(&[], 12.0), 10, 10).is_none());
        assert!(labels_svg(&drawing(&[("1", 0.0, 0.0)], 0.0), 10, 10).is_none());
        assert!(labels_svg(&drawing(&[("1", 0.0, 0.0)], f32::NAN), 10, 10).is_none());
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn test_label_ink_stays_near_anchor() {
        let mut pixmap = white_pixmap(60, 40);
        paint_labels(&mut pixmap, &drawing(&[("10", 3.0, 4.0)], 14.0)).unwrap();

        let cols = columns_with_ink(&pixmap);
        let rows = rows_with_ink(&pixmap);
        assert!(!cols.is_empty());
        // Two digits at 14 px are well under 24 px wide and 14 px tall
        assert!(*cols.first().unwrap() >= 3);
        assert!(*cols.last().unwrap() < 3 + 24);
        assert!(*rows.first().unwrap() >= 3);
        assert!(*rows.last().unwrap() < 4 + 14);
    }

    #[test]
    fn test_leading_side_bearing_is_blank() {
        // At 14 px the "1" starts 1.5 px right of its anchor, the "0" 0.9 px
        let untouched = |pixmap: &Pixmap, x: u32| {
            (0..30).all(|y| pixmap.pixel(x, y).is_some_and(|px| px.demultiply().red() == 255))
        };

        let mut one = white_pixmap(30, 30);
        paint_labels(&mut one, &drawing(&[("1", 3.0, 4.0)], 14.0)).unwrap();
        assert!(untouched(&one, 3));
        assert!((0..30).any(|y| inked(&one, 5, y)));

        let mut zero = white_pixmap(30, 30);
        paint_labels(&mut zero, &drawing(&[("0", 3.0, 4.0)], 14.0)).unwrap();
        assert!(!untouched(&zero, 3));
    }

    #[test]
    fn test_label_uses_drawing_color() {
        let mut d = drawing(&[("8", 2.0, 2.0)], 20.0);
        d.color = Rgb::new(0, 0, 255);
        let mut pixmap = white_pixmap(30, 30);
        paint_labels(&mut pixmap, &d).unwrap();

        let blue = pixmap
            .pixels()
            .iter()
            .map(|px| px.demultiply())
            .any(|c| c.red() < 64 && c.green() < 64 && c.blue() > 192);
        assert!(blue);
    }
}
