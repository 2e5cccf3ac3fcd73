//! Scene objects: the fixed base layer and the interactive overlays.

use image::RgbaImage;
use resvg::tiny_skia::Transform;

use crate::config::{HandleStyle, Rgba8, parse_color};
use crate::error::EditorError;
use crate::geometry::{Point, Rect, SizePx};
use crate::graphic::Graphic;
use crate::tone::ToneFilter;
use crate::tone::filter::apply_chain;

/// Identifies an object on a surface. Ids are never reused within a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u64);

impl ElementId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

// ============================================================================
// BaseLayer
// ============================================================================

/// The background image, fit to the surface and centered.
///
/// Only its tone filter chain can change after placement.
#[derive(Debug, Clone)]
pub struct BaseLayer {
    source: RgbaImage,
    filtered: RgbaImage,
    filters: Vec<ToneFilter>,
    scale: f32,
    center: Point,
}

impl BaseLayer {
    /// Places `source` so it fits inside `surface` with its aspect ratio kept.
    pub fn fit(source: RgbaImage, surface: SizePx) -> Self {
        let scale = Self::fit_scale(SizePx::new(source.width(), source.height()), surface);
        Self {
            filtered: source.clone(),
            source,
            filters: Vec::new(),
            scale,
            center: surface.center(),
        }
    }

    /// `min(surface_w / image_w, surface_h / image_h)`.
    pub fn fit_scale(image: SizePx, surface: SizePx) -> f32 {
        let sx = surface.width as f32 / image.width.max(1) as f32;
        let sy = surface.height as f32 / image.height.max(1) as f32;
        sx.min(sy)
    }

    /// Unfiltered pixels.
    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    /// Pixels with the current filter chain applied.
    pub fn filtered(&self) -> &RgbaImage {
        &self.filtered
    }

    pub fn filters(&self) -> &[ToneFilter] {
        &self.filters
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Displayed footprint on the surface.
    pub fn bounds(&self) -> Rect {
        Rect::centered(
            self.center,
            self.source.width() as f32 * self.scale,
            self.source.height() as f32 * self.scale,
        )
    }

    /// Replaces the filter chain and recomputes the filtered pixels.
    pub fn set_filters(&mut self, chain: &[ToneFilter]) {
        self.filters.clear();
        self.filters.extend_from_slice(chain);
        self.filtered = apply_chain(&self.source, &self.filters);
    }

    /// Surface transform for drawing the pixels.
    pub fn transform(&self) -> Transform {
        let bounds = self.bounds();
        Transform::from_translate(bounds.x, bounds.y).pre_scale(self.scale, self.scale)
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Handle style with its colors parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Handles {
    pub style: HandleStyle,
    pub corner: Rgba8,
    pub border: Rgba8,
}

impl Handles {
    pub fn resolve(style: &HandleStyle) -> Result<Self, EditorError> {
        Ok(Self {
            corner: parse_color(&style.corner_color)?,
            border: parse_color(&style.border_color)?,
            style: style.clone(),
        })
    }
}

// ============================================================================
// OverlayElement
// ============================================================================

/// A placed graphic, positioned by its center.
#[derive(Debug, Clone)]
pub struct OverlayElement {
    graphic: Graphic,
    center: Point,
    scale: f32,
    rotation: f32,
    handles: Handles,
}

impl OverlayElement {
    /// Creates an overlay `width` units wide, height following the graphic's
    /// aspect ratio through a uniform scale.
    pub fn new(graphic: Graphic, center: Point, width: f32, handles: Handles) -> Self {
        let (natural_width, _) = graphic.natural_size();
        let scale = if natural_width > 0.0 {
            width / natural_width
        } else {
            1.0
        };
        Self {
            graphic,
            center,
            scale,
            rotation: 0.0,
            handles,
        }
    }

    pub fn graphic(&self) -> &Graphic {
        &self.graphic
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rotation in degrees, in [0, 360).
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn handles(&self) -> &Handles {
        &self.handles
    }

    /// Scaled size before rotation.
    pub fn size(&self) -> (f32, f32) {
        let (w, h) = self.graphic.natural_size();
        (w * self.scale, h * self.scale)
    }

    /// Unrotated footprint around the center.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::centered(self.center, w, h)
    }

    /// Corners of the rotated footprint, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        let b = self.bounds();
        [
            Point::new(b.x, b.y),
            Point::new(b.right(), b.y),
            Point::new(b.right(), b.bottom()),
            Point::new(b.x, b.bottom()),
        ]
        .map(|p| rotate_around(p, self.center, self.rotation))
    }

    /// Returns true if `point` falls inside the rotated footprint.
    pub fn contains(&self, point: Point) -> bool {
        let local = rotate_around(point, self.center, -self.rotation);
        self.bounds().contains(local)
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.center = self.center.offset(dx, dy);
    }

    pub fn move_to(&mut self, center: Point) {
        self.center = center;
    }

    /// Multiplies the uniform scale. Non-positive or non-finite factors are ignored.
    pub fn scale_by(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.scale *= factor;
        }
    }

    pub fn rotate_by(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.rotation = (self.rotation + degrees).rem_euclid(360.0);
        }
    }

    /// Surface transform mapping SVG user units onto the surface.
    pub fn transform(&self) -> Transform {
        let (w, h) = self.graphic.natural_size();
        Transform::from_translate(self.center.x, self.center.y)
            .pre_concat(Transform::from_rotate(self.rotation))
            .pre_scale(self.scale, self.scale)
            .pre_translate(-w / 2.0, -h / 2.0)
    }
}

fn rotate_around(point: Point, center: Point, degrees: f32) -> Point {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

// ============================================================================
// SceneObject
// ============================================================================

/// What a scene object is.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Base(BaseLayer),
    Overlay(OverlayElement),
}

/// An entry in the surface's z-ordered object list.
#[derive(Debug, Clone)]
pub struct SceneObject {
    id: ElementId,
    interactive: bool,
    kind: ObjectKind,
}

impl SceneObject {
    pub(crate) fn base(id: ElementId, layer: BaseLayer) -> Self {
        Self {
            id,
            interactive: false,
            kind: ObjectKind::Base(layer),
        }
    }

    pub(crate) fn overlay(id: ElementId, overlay: OverlayElement) -> Self {
        Self {
            id,
            interactive: true,
            kind: ObjectKind::Overlay(overlay),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Whether the object can be selected, moved and deleted.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn is_base(&self) -> bool {
        matches!(self.kind, ObjectKind::Base(_))
    }

    pub fn as_base(&self) -> Option<&BaseLayer> {
        match &self.kind {
            ObjectKind::Base(base) => Some(base),
            ObjectKind::Overlay(_) => None,
        }
    }

    pub fn as_overlay(&self) -> Option<&OverlayElement> {
        match &self.kind {
            ObjectKind::Overlay(overlay) => Some(overlay),
            ObjectKind::Base(_) => None,
        }
    }

    pub(crate) fn as_base_mut(&mut self) -> Option<&mut BaseLayer> {
        match &mut self.kind {
            ObjectKind::Base(base) => Some(base),
            ObjectKind::Overlay(_) => None,
        }
    }

    pub(crate) fn as_overlay_mut(&mut self) -> Option<&mut OverlayElement> {
        match &mut self.kind {
            ObjectKind::Overlay(overlay) => Some(overlay),
            ObjectKind::Base(_) => None,
        }
    }
}
