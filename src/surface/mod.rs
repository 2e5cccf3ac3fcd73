//! The retained scene: one base layer plus interactive overlays.
//!
//! Objects live in a single list whose index is their z-order (index 0 is
//! drawn first). Every mutation bumps a revision counter, and the composite
//! produced by [`Surface::render`] is cached per revision.
//!
//! # Z-order
//!
//! ```text
//! index n   ┌──────────────┐  most recently placed overlay
//!   ...     │   overlays   │
//! index 1   └──────────────┘
//! index 0   ┌──────────────┐  base layer (non-interactive)
//!           └──────────────┘
//!           background fill
//! ```
//!
//! [`Surface::send_to_back`] is a generic primitive and will happily put an
//! overlay below the base layer; callers restore the invariant by sending
//! the base layer back afterwards.

mod controls;
pub mod element;
pub mod selection;

pub use element::{BaseLayer, ElementId, Handles, ObjectKind, OverlayElement, SceneObject};
pub use selection::{SelectionEvent, SelectionState, SubscriptionId};

use image::RgbaImage;
use resvg::tiny_skia::{Color, FilterQuality, PixmapPaint};

use crate::config::{Rgba8, SurfaceConfig, parse_color};
use crate::error::EditorError;
use crate::geometry::{Point, SizePx};
use crate::preprocess::ImageSource;
use crate::raster::{new_pixmap, pixmap_to_rgba_image, rgba_image_to_pixmap};
use crate::tone::ToneFilter;
use selection::Subscribers;

/// A fixed-size drawing surface.
#[derive(Debug)]
pub struct Surface {
    size: SizePx,
    background: Rgba8,
    objects: Vec<SceneObject>,
    next_id: u64,
    selection: SelectionState,
    subscribers: Subscribers,
    revision: u64,
    composite: Option<(u64, RgbaImage)>,
    disposed: bool,
}

impl Surface {
    /// Creates an empty surface.
    pub fn new(config: &SurfaceConfig) -> Result<Self, EditorError> {
        if config.width == 0 || config.height == 0 {
            return Err(EditorError::Encode(format!(
                "surface size {}x{} is empty",
                config.width, config.height
            )));
        }
        Ok(Self {
            size: config.size(),
            background: parse_color(&config.background)?,
            objects: Vec::new(),
            next_id: 0,
            selection: SelectionState::default(),
            subscribers: Subscribers::default(),
            revision: 0,
            composite: None,
            disposed: false,
        })
    }

    /// Creates a surface and installs `base` as its fitted, centered,
    /// non-interactive base layer at the back.
    ///
    /// If `base` cannot be decoded the surface starts with only its
    /// background fill. Fails only for an invalid surface configuration.
    pub fn initialize(config: &SurfaceConfig, base: &ImageSource) -> Result<Self, EditorError> {
        let mut surface = Self::new(config)?;
        let image = match base.load() {
            Ok(image) => image,
            Err(e) => {
                log::warn!("base image could not be loaded, continuing without it: {e}");
                surface.request_render();
                return Ok(surface);
            }
        };
        let layer = BaseLayer::fit(image, surface.size);
        log::debug!(
            "base layer {}x{} fit at scale {:.4}",
            layer.source().width(),
            layer.source().height(),
            layer.scale()
        );

        let id = surface.allocate_id();
        surface.objects.push(SceneObject::base(id, layer));
        surface.send_to_back(id);
        surface.request_render();
        Ok(surface)
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Marks the composite stale so the next [`render`](Self::render) redraws.
    pub fn request_render(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn size(&self) -> SizePx {
        self.size
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ---- Queries ----

    /// All objects in z-order, back to front.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn get(&self, id: ElementId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    /// Index of `id` in the z-order.
    pub fn z_index(&self, id: ElementId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    /// Overlays in z-order, back to front.
    pub fn overlays(&self) -> impl Iterator<Item = (ElementId, &OverlayElement)> {
        self.objects
            .iter()
            .filter_map(|o| o.as_overlay().map(|overlay| (o.id(), overlay)))
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays().count()
    }

    pub fn base(&self) -> Option<&BaseLayer> {
        self.objects.iter().find_map(SceneObject::as_base)
    }

    pub fn base_id(&self) -> Option<ElementId> {
        self.objects.iter().find(|o| o.is_base()).map(SceneObject::id)
    }

    pub fn active(&self) -> Option<ElementId> {
        self.selection.active()
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    /// Topmost interactive object under `point`.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.objects
            .iter()
            .rev()
            .filter(|o| o.is_interactive())
            .find(|o| o.as_overlay().is_some_and(|overlay| overlay.contains(point)))
            .map(SceneObject::id)
    }

    // ---- Mutations ----

    /// Adds an overlay on top of everything else. Returns `None` once disposed.
    pub fn add_overlay(&mut self, overlay: OverlayElement) -> Option<ElementId> {
        if self.disposed {
            return None;
        }
        let id = self.allocate_id();
        self.objects.push(SceneObject::overlay(id, overlay));
        self.request_render();
        Some(id)
    }

    /// Removes an interactive object. The base layer is never removed.
    ///
    /// Removing the active object clears the selection.
    pub fn remove(&mut self, id: ElementId) -> Option<SceneObject> {
        let index = self.z_index(id)?;
        if !self.objects[index].is_interactive() {
            return None;
        }
        let removed = self.objects.remove(index);
        if self.selection.active() == Some(id) {
            self.set_selection(None);
        }
        self.request_render();
        Some(removed)
    }

    /// Sets the active object.
    ///
    /// Unknown or non-interactive ids are ignored and leave the selection as is.
    pub fn set_active(&mut self, id: Option<ElementId>) -> bool {
        if self.disposed {
            return false;
        }
        if let Some(id) = id {
            if !self.get(id).is_some_and(SceneObject::is_interactive) {
                return false;
            }
        }
        self.set_selection(id);
        true
    }

    fn set_selection(&mut self, next: Option<ElementId>) {
        if let Some(event) = self.selection.transition(next) {
            log::debug!("selection {event:?}");
            self.subscribers.dispatch(&event);
            self.request_render();
        }
    }

    /// Moves an object to index 0, whatever it is.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        let Some(index) = self.z_index(id) else {
            return false;
        };
        if index != 0 {
            let object = self.objects.remove(index);
            self.objects.insert(0, object);
            self.request_render();
        }
        true
    }

    /// Mutates an overlay in place. Returns false if `id` is not an overlay.
    pub fn update_overlay(&mut self, id: ElementId, f: impl FnOnce(&mut OverlayElement)) -> bool {
        if self.disposed {
            return false;
        }
        let Some(overlay) = self
            .objects
            .iter_mut()
            .find(|o| o.id() == id)
            .and_then(SceneObject::as_overlay_mut)
        else {
            return false;
        };
        f(overlay);
        self.request_render();
        true
    }

    /// Replaces the base layer's filter chain. Overlays are untouched.
    pub fn set_base_filters(&mut self, chain: &[ToneFilter]) -> bool {
        let Some(base) = self.objects.iter_mut().find_map(SceneObject::as_base_mut) else {
            return false;
        };
        base.set_filters(chain);
        self.request_render();
        true
    }

    // ---- Events ----

    /// Registers a listener called synchronously on every selection change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SelectionEvent) + 'static,
    ) -> Option<SubscriptionId> {
        if self.disposed {
            return None;
        }
        Some(self.subscribers.subscribe(Box::new(listener)))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // ---- Rendering ----

    /// Composites background, base layer and overlays in z-order.
    ///
    /// This is the single render path used for both display and export.
    /// Fails with [`EditorError::EmptySurface`] once disposed.
    pub fn render(&mut self) -> Result<RgbaImage, EditorError> {
        if let Some((revision, image)) = &self.composite {
            if *revision == self.revision {
                return Ok(image.clone());
            }
        }

        let image = pixmap_to_rgba_image(&self.draw()?);
        self.composite = Some((self.revision, image.clone()));
        Ok(image)
    }

    /// Renders like [`render`](Self::render) with selection handles drawn
    /// around the active overlay.
    pub fn render_with_controls(&mut self) -> Result<RgbaImage, EditorError> {
        let mut pixmap = self.draw()?;
        if let Some(overlay) = self
            .active()
            .and_then(|id| self.get(id))
            .and_then(SceneObject::as_overlay)
        {
            controls::draw_handles(&mut pixmap, overlay);
        }
        Ok(pixmap_to_rgba_image(&pixmap))
    }

    fn draw(&self) -> Result<resvg::tiny_skia::Pixmap, EditorError> {
        if self.disposed {
            return Err(EditorError::EmptySurface);
        }
        let mut pixmap = new_pixmap(self.size.width, self.size.height)?;
        let [r, g, b, a] = self.background;
        pixmap.fill(Color::from_rgba8(r, g, b, a));

        for object in &self.objects {
            match object.kind() {
                ObjectKind::Base(base) => {
                    let layer = rgba_image_to_pixmap(base.filtered())?;
                    let quality = if base.scale() == 1.0 {
                        FilterQuality::Nearest
                    } else {
                        FilterQuality::Bicubic
                    };
                    let paint = PixmapPaint {
                        quality,
                        ..PixmapPaint::default()
                    };
                    pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, base.transform(), None);
                }
                ObjectKind::Overlay(overlay) => {
                    resvg::render(overlay.graphic().tree(), overlay.transform(), &mut pixmap.as_mut());
                }
            }
        }
        Ok(pixmap)
    }

    // ---- Teardown ----

    /// Releases every object and subscription. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.subscribers.clear();
        self.objects.clear();
        self.selection = SelectionState::default();
        self.composite = None;
        self.disposed = true;
        log::debug!("surface disposed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandleStyle;
    use crate::export::encode_png;
    use crate::graphic::{Graphic, SvgSource};
    use image::Rgba;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SQUARE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#0000ff"/></svg>"##;

    fn config() -> SurfaceConfig {
        SurfaceConfig {
            width: 120,
            height: 80,
            background: "#ffffff".into(),
        }
    }

    fn base_source(width: u32, height: u32) -> ImageSource {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 0, 0, 255]));
        ImageSource::Bytes(encode_png(&img).unwrap())
    }

    fn square(center: Point) -> OverlayElement {
        let graphic = Graphic::load(SvgSource::from_svg(SQUARE_SVG)).unwrap();
        OverlayElement::new(
            graphic,
            center,
            20.0,
            Handles::resolve(&HandleStyle::default()).unwrap(),
        )
    }

    fn surface() -> Surface {
        Surface::initialize(&config(), &base_source(60, 40)).unwrap()
    }

    #[test]
    fn initialize_places_single_centered_base() {
        let surface = surface();
        assert_eq!(surface.objects().len(), 1);
        let object = &surface.objects()[0];
        assert!(object.is_base());
        assert!(!object.is_interactive());

        let base = surface.base().unwrap();
        assert_eq!(base.scale(), 2.0);
        assert_eq!(base.center(), Point::new(60.0, 40.0));
        assert_eq!(surface.active(), None);
    }

    #[test]
    fn empty_surface_size_is_rejected() {
        let config = SurfaceConfig {
            width: 0,
            ..config()
        };
        assert!(Surface::new(&config).is_err());
    }

    #[test]
    fn undecodable_base_leaves_background_only_surface() {
        let mut surface = Surface::initialize(&config(), &ImageSource::Bytes(vec![0, 1, 2])).unwrap();
        assert!(surface.objects().is_empty());
        assert!(surface.base_id().is_none());
        assert!(!surface.set_base_filters(&[ToneFilter::Brightness(0.5)]));

        let id = surface.add_overlay(square(Point::new(60.0, 40.0))).unwrap();
        assert!(surface.set_active(Some(id)));
        let image = surface.render().unwrap();
        assert_eq!(image.get_pixel(2, 2).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(60, 40).0, [0, 0, 255, 255]);
    }

    #[test]
    fn base_cannot_be_selected_or_removed() {
        let mut surface = surface();
        let base = surface.base_id().unwrap();
        assert!(!surface.set_active(Some(base)));
        assert!(surface.remove(base).is_none());
        assert_eq!(surface.objects().len(), 1);
    }

    #[test]
    fn send_to_back_is_a_raw_primitive() {
        let mut surface = surface();
        let base = surface.base_id().unwrap();
        let a = surface.add_overlay(square(Point::new(10.0, 10.0))).unwrap();
        let b = surface.add_overlay(square(Point::new(30.0, 30.0))).unwrap();

        assert!(surface.send_to_back(b));
        assert_eq!(surface.z_index(b), Some(0));
        assert_eq!(surface.z_index(base), Some(1));

        assert!(surface.send_to_back(base));
        assert_eq!(surface.z_index(base), Some(0));
        assert_eq!(surface.z_index(b), Some(1));
        assert_eq!(surface.z_index(a), Some(2));
    }

    #[test]
    fn removing_active_clears_selection() {
        let mut surface = surface();
        let id = surface.add_overlay(square(Point::new(60.0, 40.0))).unwrap();
        surface.set_active(Some(id));
        assert!(surface.remove(id).is_some());
        assert!(surface.selection().is_empty());
        assert!(surface.remove(id).is_none());
    }

    #[test]
    fn listeners_see_selection_changes_synchronously() {
        let mut surface = surface();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = surface.subscribe(move |e| sink.borrow_mut().push(*e)).unwrap();

        let a = surface.add_overlay(square(Point::new(10.0, 10.0))).unwrap();
        let b = surface.add_overlay(square(Point::new(50.0, 50.0))).unwrap();
        surface.set_active(Some(a));
        surface.set_active(Some(b));
        surface.set_active(None);

        assert_eq!(
            *events.borrow(),
            vec![
                SelectionEvent::Created(a),
                SelectionEvent::Updated {
                    previous: a,
                    current: b
                },
                SelectionEvent::Cleared(b),
            ]
        );

        assert!(surface.unsubscribe(subscription));
        surface.set_active(Some(a));
        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn element_at_prefers_topmost() {
        let mut surface = surface();
        let lower = surface.add_overlay(square(Point::new(60.0, 40.0))).unwrap();
        let upper = surface.add_overlay(square(Point::new(65.0, 40.0))).unwrap();

        assert_eq!(surface.element_at(Point::new(66.0, 40.0)), Some(upper));
        assert_eq!(surface.element_at(Point::new(52.0, 40.0)), Some(lower));
        assert_eq!(surface.element_at(Point::new(2.0, 2.0)), None);
    }

    #[test]
    fn render_draws_layers_in_order() {
        let mut surface = Surface::initialize(&config(), &base_source(120, 80)).unwrap();
        let image = surface.render().unwrap();
        assert_eq!((image.width(), image.height()), (120, 80));
        assert_eq!(image.get_pixel(60, 40).0, [200, 0, 0, 255]);

        surface.add_overlay(square(Point::new(60.0, 40.0))).unwrap();
        let image = surface.render().unwrap();
        assert_eq!(image.get_pixel(60, 40).0, [0, 0, 255, 255]);
    }

    #[test]
    fn background_shows_outside_base() {
        let mut surface = Surface::initialize(&config(), &base_source(40, 40)).unwrap();
        let image = surface.render().unwrap();
        assert_eq!(image.get_pixel(2, 40).0, [255, 255, 255, 255]);
        let [r, g, b, a] = image.get_pixel(60, 40).0;
        assert!(r > 190 && g < 10 && b < 10 && a == 255);
    }

    #[test]
    fn render_is_cached_per_revision() {
        let mut surface = surface();
        surface.render().unwrap();
        let revision = surface.revision();
        surface.render().unwrap();
        assert_eq!(surface.revision(), revision);
        assert!(surface.composite.as_ref().is_some_and(|(r, _)| *r == revision));
    }

    #[test]
    fn controls_only_appear_in_control_render() {
        let mut surface = surface();
        let id = surface.add_overlay(square(Point::new(60.0, 40.0))).unwrap();
        surface.set_active(Some(id));

        let plain = surface.render().unwrap();
        let with_controls = surface.render_with_controls().unwrap();
        // top-left corner handle of the 20x20 overlay sits at (50, 30)
        assert_ne!(plain.get_pixel(50, 30), with_controls.get_pixel(50, 30));
    }

    #[test]
    fn base_filters_leave_overlays_alone() {
        let mut surface = surface();
        let id = surface.add_overlay(square(Point::new(60.0, 40.0))).unwrap();
        surface.set_base_filters(&[ToneFilter::Brightness(-1.0)]);

        let image = surface.render().unwrap();
        assert_eq!(image.get_pixel(30, 20).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(60, 40).0, [0, 0, 255, 255]);
        assert!(surface.get(id).is_some());
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut surface = surface();
        surface.subscribe(|_| {});
        surface.add_overlay(square(Point::new(60.0, 40.0))).unwrap();

        surface.dispose();
        surface.dispose();
        assert!(surface.is_disposed());
        assert!(surface.objects().is_empty());
        assert_eq!(surface.subscriber_count(), 0);
    }

    #[test]
    fn disposed_surface_ignores_late_calls() {
        let mut surface = surface();
        let id = surface.add_overlay(square(Point::new(60.0, 40.0))).unwrap();
        surface.dispose();
        let revision = surface.revision();

        assert_eq!(surface.add_overlay(square(Point::new(10.0, 10.0))), None);
        assert!(!surface.set_active(Some(id)));
        assert!(!surface.set_active(None));
        assert!(!surface.update_overlay(id, |o| o.move_by(1.0, 1.0)));
        assert!(surface.subscribe(|_| {}).is_none());
        assert!(matches!(surface.render(), Err(EditorError::EmptySurface)));
        assert!(matches!(
            surface.render_with_controls(),
            Err(EditorError::EmptySurface)
        ));

        assert!(surface.objects().is_empty());
        assert_eq!(surface.revision(), revision);
    }
}
