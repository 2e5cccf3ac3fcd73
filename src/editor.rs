//! The editing session facade that UI bindings drive.

use std::sync::Arc;

use image::RgbaImage;

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::export::{SaveSink, encode_png, to_data_uri};
use crate::geometry::Point;
use crate::graphic::SvgSource;
use crate::placement::{self, LoadedGraphic, PlacementRequest, SurfaceToken};
use crate::preprocess::{ImageSource, preprocess};
use crate::surface::{
    ElementId, Handles, OverlayElement, SelectionEvent, SelectionState, SubscriptionId, Surface,
};
use crate::tone::{ToneParameter, ToneParameters, TonePipeline};

// ============================================================================
// UI state
// ============================================================================

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Character(char),
    Other,
}

/// Panel tabs of the editor shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Contextual controls for the selected overlay.
    #[default]
    Edit,
    /// The four tone sliders plus reset.
    Tone,
}

/// What the UI shell should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelState {
    pub tab: Tab,
    /// Whether the delete / send-to-back pair is visible.
    pub element_actions_visible: bool,
    pub tone: ToneParameters,
}

// ============================================================================
// Editor
// ============================================================================

/// One editing session: a surface, its tone pipeline and the UI shell state.
///
/// The editor owns its surface exclusively. [`dispose`](Self::dispose)
/// tears it down (also run on drop); afterwards every action is a no-op.
///
/// # Example
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use livery_studio::{Editor, EditorConfig, ImageSource, SvgSource, ToneParameter, encode_png};
///
/// let car = RgbaImage::from_pixel(64, 48, Rgba([180, 20, 20, 255]));
/// let base = ImageSource::Bytes(encode_png(&car).unwrap());
///
/// let mut editor = Editor::open(EditorConfig::default(), &base).unwrap();
/// let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><circle cx="5" cy="5" r="5"/></svg>"#;
/// let id = editor.place_overlay(SvgSource::from_svg(svg)).unwrap();
/// assert_eq!(editor.selection().active(), Some(id));
///
/// editor.set_tone(ToneParameter::Brightness, 0.2);
/// let png = editor.export_png().unwrap();
/// assert!(!png.is_empty());
/// ```
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    handles: Handles,
    surface: Option<Surface>,
    token: Option<Arc<SurfaceToken>>,
    tone: TonePipeline,
    tab: Tab,
}

impl Editor {
    /// Preprocesses `base` and builds the surface around it.
    ///
    /// Preprocess failures fall back to the original source. A base image
    /// that still cannot be decoded leaves a surface without a base layer.
    /// Fails only if the configuration is invalid.
    pub fn open(config: EditorConfig, base: &ImageSource) -> Result<Self, EditorError> {
        let handles = Handles::resolve(&config.overlay.handles)?;
        let prepared = preprocess(base, config.max_base_dimension);
        let surface = Surface::initialize(&config.surface, &prepared)?;
        log::info!(
            "editor opened on {}x{} surface",
            config.surface.width,
            config.surface.height
        );
        Ok(Self {
            config,
            handles,
            surface: Some(surface),
            token: Some(Arc::new(SurfaceToken)),
            tone: TonePipeline::new(),
            tab: Tab::default(),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The live surface, or `None` after disposal.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.surface.is_none()
    }

    pub fn selection(&self) -> SelectionState {
        self.surface
            .as_ref()
            .map(Surface::selection)
            .unwrap_or_default()
    }

    // ---- Shell ----

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn panel(&self) -> PanelState {
        PanelState {
            tab: self.tab,
            element_actions_visible: !self.selection().is_empty(),
            tone: self.tone.params(),
        }
    }

    /// Registers a selection listener on the live surface.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SelectionEvent) + 'static,
    ) -> Option<SubscriptionId> {
        self.surface.as_mut().and_then(|s| s.subscribe(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.surface.as_mut().is_some_and(|s| s.unsubscribe(id))
    }

    // ---- Placement ----

    /// Starts a placement. The returned request can be loaded anywhere and
    /// completed later with [`complete_placement`](Self::complete_placement).
    pub fn request_placement(&self, source: impl Into<SvgSource>) -> PlacementRequest {
        let surface = self
            .token
            .as_ref()
            .map(Arc::downgrade)
            .unwrap_or_default();
        PlacementRequest::new(surface, source.into())
    }

    /// Finishes a placement.
    ///
    /// Returns `None` without touching anything when the load failed or when
    /// the request belongs to a disposed (or different) surface.
    pub fn complete_placement(&mut self, loaded: LoadedGraphic) -> Option<ElementId> {
        let token = self.token.as_ref()?;
        if !loaded.targets(token) {
            log::debug!("dropping placement for a surface that is gone");
            return None;
        }
        let surface = self.surface.as_mut()?;

        let (label, result) = loaded.into_parts();
        match result {
            Ok(graphic) => {
                let id = placement::place(surface, graphic, &self.config.overlay, &self.handles)?;
                log::debug!("placed {label} as {id:?}");
                Some(id)
            }
            Err(e) => {
                log::error!("failed to load overlay {label}: {e}");
                None
            }
        }
    }

    /// Loads and places a graphic in one step.
    pub fn place_overlay(&mut self, source: impl Into<SvgSource>) -> Option<ElementId> {
        let loaded = self.request_placement(source).load();
        self.complete_placement(loaded)
    }

    /// Places the gallery entry at `index`.
    pub fn place_from_gallery(&mut self, index: usize) -> Option<ElementId> {
        let path = self.config.gallery.get(index)?.path.clone();
        self.place_overlay(SvgSource::File(path))
    }

    // ---- Selection actions ----

    /// Selects the topmost overlay under `point`, or clears the selection.
    pub fn pointer_down(&mut self, point: Point) -> Option<ElementId> {
        let surface = self.surface.as_mut()?;
        let hit = surface.element_at(point);
        surface.set_active(hit);
        hit
    }

    /// Deletes the active overlay. No-op when nothing (or the base layer) is selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let Some(id) = surface.active() else {
            return false;
        };
        if surface.get(id).is_none_or(|o| o.is_base()) {
            return false;
        }

        // also clears the selection
        surface.remove(id);
        log::debug!("deleted {id:?}");
        true
    }

    /// Delete and Backspace delete the selection; all other keys are ignored.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Delete | Key::Backspace => self.delete_selected(),
            Key::Character(_) | Key::Other => false,
        }
    }

    /// Puts the active overlay directly above the base layer, or at the
    /// very back when there is no base layer.
    pub fn send_selected_to_back(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let Some(id) = surface.active() else {
            return false;
        };
        surface.send_to_back(id);
        if let Some(base) = surface.base_id() {
            surface.send_to_back(base);
        }
        true
    }

    pub fn move_selected(&mut self, dx: f32, dy: f32) -> bool {
        self.update_selected(|o| o.move_by(dx, dy))
    }

    pub fn scale_selected(&mut self, factor: f32) -> bool {
        self.update_selected(|o| o.scale_by(factor))
    }

    pub fn rotate_selected(&mut self, degrees: f32) -> bool {
        self.update_selected(|o| o.rotate_by(degrees))
    }

    fn update_selected(&mut self, f: impl FnOnce(&mut OverlayElement)) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let Some(id) = surface.active() else {
            return false;
        };
        surface.update_overlay(id, f)
    }

    // ---- Tone ----

    pub fn tone(&self) -> ToneParameters {
        self.tone.params()
    }

    /// Sets one tone value and reapplies the full chain to the base layer.
    pub fn set_tone(&mut self, parameter: ToneParameter, value: f32) {
        let chain = self.tone.set(parameter, value);
        if let Some(surface) = self.surface.as_mut() {
            surface.set_base_filters(&chain);
        }
    }

    /// Zeroes all tone values through the same recompute path.
    pub fn reset_tone(&mut self) {
        let chain = self.tone.reset();
        if let Some(surface) = self.surface.as_mut() {
            surface.set_base_filters(&chain);
        }
    }

    // ---- Rendering & export ----

    /// The composited surface as shown on screen, without handles.
    pub fn render(&mut self) -> Result<RgbaImage, EditorError> {
        self.surface
            .as_mut()
            .ok_or(EditorError::EmptySurface)?
            .render()
    }

    /// The composited surface with the active overlay's handles drawn.
    pub fn render_with_controls(&mut self) -> Result<RgbaImage, EditorError> {
        self.surface
            .as_mut()
            .ok_or(EditorError::EmptySurface)?
            .render_with_controls()
    }

    /// Encodes exactly what [`render`](Self::render) shows as PNG.
    pub fn export_png(&mut self) -> Result<Vec<u8>, EditorError> {
        encode_png(&self.render()?)
    }

    pub fn export_data_uri(&mut self) -> Result<String, EditorError> {
        Ok(to_data_uri(&self.export_png()?))
    }

    /// Exports and hands the PNG to `sink` under the configured file name.
    pub fn download(&mut self, sink: &mut impl SaveSink) -> Result<(), EditorError> {
        let png = self.export_png()?;
        sink.save(&self.config.export.file_name, &png)
    }

    // ---- Teardown ----

    /// Releases the surface and its subscriptions. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.token = None;
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
            log::info!("editor disposed");
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ============================================================================
// Tests
// ============================================================================
