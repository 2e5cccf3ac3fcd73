//! Selection border and corner handles drawn over the active overlay.

use resvg::tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use super::element::OverlayElement;
use crate::config::{CornerStyle, Rgba8};

fn paint(color: Rgba8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    paint
}

/// Draws the handle chrome of `overlay` onto `pixmap`.
pub(crate) fn draw_handles(pixmap: &mut Pixmap, overlay: &OverlayElement) {
    let handles = overlay.handles();
    let corners = overlay.corners();
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };

    let mut border = PathBuilder::new();
    border.move_to(corners[0].x, corners[0].y);
    for corner in &corners[1..] {
        border.line_to(corner.x, corner.y);
    }
    border.close();
    if let Some(path) = border.finish() {
        pixmap.stroke_path(&path, &paint(handles.border), &stroke, Transform::identity(), None);
    }

    let size = handles.style.corner_size;
    let corner_paint = paint(handles.corner);
    for corner in corners {
        let path = match handles.style.corner_style {
            CornerStyle::Rect => Rect::from_xywh(corner.x - size / 2.0, corner.y - size / 2.0, size, size)
                .map(PathBuilder::from_rect),
            CornerStyle::Circle => PathBuilder::from_circle(corner.x, corner.y, size / 2.0),
        };
        let Some(path) = path else {
            continue;
        };

        if handles.style.transparent_corners {
            pixmap.stroke_path(&path, &corner_paint, &stroke, Transform::identity(), None);
        } else {
            pixmap.fill_path(
                &path,
                &corner_paint,
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }
}
