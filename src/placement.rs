//! Loading overlay graphics and placing them on a surface.
//!
//! Placement is split in two so the load can happen away from the surface:
//!
//! 1. [`Editor::request_placement`](crate::Editor::request_placement) hands
//!    out a [`PlacementRequest`] holding a weak handle to the live surface.
//! 2. [`PlacementRequest::load`] resolves and parses the SVG. It owns all of
//!    its data and never touches the surface.
//! 3. [`Editor::complete_placement`](crate::Editor::complete_placement) adds
//!    the graphic if the handle still points at the editor's live surface,
//!    and silently drops it otherwise.

use std::sync::{Arc, Weak};

use crate::config::OverlayDefaults;
use crate::error::EditorError;
use crate::graphic::{Graphic, SvgSource};
use crate::surface::{ElementId, Handles, OverlayElement, Surface};

/// Liveness marker of one surface. Dropped when the surface is disposed.
#[derive(Debug)]
pub(crate) struct SurfaceToken;

/// A pending placement, not yet loaded.
#[derive(Debug, Clone)]
pub struct PlacementRequest {
    surface: Weak<SurfaceToken>,
    source: SvgSource,
}

impl PlacementRequest {
    pub(crate) fn new(surface: Weak<SurfaceToken>, source: SvgSource) -> Self {
        Self { surface, source }
    }

    pub fn source(&self) -> &SvgSource {
        &self.source
    }

    /// Resolves and parses the graphic.
    pub fn load(self) -> LoadedGraphic {
        let label = self.source.label();
        LoadedGraphic {
            surface: self.surface,
            label,
            result: Graphic::load(self.source),
        }
    }
}

/// Outcome of [`PlacementRequest::load`], ready to be completed.
#[derive(Debug)]
pub struct LoadedGraphic {
    surface: Weak<SurfaceToken>,
    label: String,
    result: Result<Graphic, EditorError>,
}

impl LoadedGraphic {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns true if this load targets the surface marked by `token`.
    pub(crate) fn targets(&self, token: &Arc<SurfaceToken>) -> bool {
        self.surface
            .upgrade()
            .is_some_and(|live| Arc::ptr_eq(&live, token))
    }

    pub(crate) fn into_parts(self) -> (String, Result<Graphic, EditorError>) {
        (self.label, self.result)
    }
}

/// Adds `graphic` at the surface center with the default footprint and
/// handle style, and makes it the active element.
pub(crate) fn place(
    surface: &mut Surface,
    graphic: Graphic,
    defaults: &OverlayDefaults,
    handles: &Handles,
) -> Option<ElementId> {
    let center = surface.size().center();
    let overlay = OverlayElement::new(graphic, center, defaults.width, handles.clone());
    let id = surface.add_overlay(overlay)?;
    surface.set_active(Some(id));
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20"/></svg>"##;

    #[test]
    fn load_survives_dropped_surface() {
        let token = Arc::new(SurfaceToken);
        let request = PlacementRequest::new(Arc::downgrade(&token), SvgSource::from_svg(SVG));
        drop(token);

        let loaded = request.load();
        assert!(loaded.is_ok());
        let other = Arc::new(SurfaceToken);
        assert!(!loaded.targets(&other));
    }

    #[test]
    fn targets_only_its_own_surface() {
        let token = Arc::new(SurfaceToken);
        let other = Arc::new(SurfaceToken);
        let loaded = PlacementRequest::new(Arc::downgrade(&token), SvgSource::from_svg(SVG)).load();
        assert!(loaded.targets(&token));
        assert!(!loaded.targets(&other));
    }

    #[test]
    fn failed_load_keeps_error() {
        let token = Arc::new(SurfaceToken);
        let loaded =
            PlacementRequest::new(Arc::downgrade(&token), SvgSource::from_svg("<nope")).load();
        assert!(!loaded.is_ok());
        let (label, result) = loaded.into_parts();
        assert!(label.starts_with("inline svg"));
        assert!(result.is_err());
    }
}
