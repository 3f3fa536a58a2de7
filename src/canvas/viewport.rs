//! Screen to canvas coordinate transform.

use serde::{Deserialize, Serialize};

use crate::model::Position;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;

/// Pan offset and zoom factor of the rendered canvas.
///
/// Zoom always stays within [`MIN_ZOOM`, `MAX_ZOOM`], also when deserialized.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "RawViewport")]
pub struct Viewport {
    x: f64,
    y: f64,
    zoom: f64,
}

#[derive(Deserialize)]
struct RawViewport {
    x: f64,
    y: f64,
    zoom: f64,
}

impl From<RawViewport> for Viewport {
    fn from(raw: RawViewport) -> Self {
        Viewport::new(raw.x, raw.y, raw.zoom)
    }
}

/// Top-left corner of the canvas element in screen coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 }
}

impl Viewport {
    pub fn new(
        x: f64,
        y: f64,
        zoom: f64,
    ) -> Self {
        Self {
            x,
            y,
            zoom: clamp_zoom(zoom),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn screen_to_canvas(
        &self,
        screen: Position,
        bounds: Bounds,
    ) -> Position {
        Position::new((screen.x - bounds.left - self.x) / self.zoom, (screen.y - bounds.top - self.y) / self.zoom)
    }

    pub fn canvas_to_screen(
        &self,
        point: Position,
        bounds: Bounds,
    ) -> Position {
        Position::new(point.x * self.zoom + self.x + bounds.left, point.y * self.zoom + self.y + bounds.top)
    }

    pub fn pan(
        &mut self,
        dx: f64,
        dy: f64,
    ) {
        self.x += dx;
        self.y += dy;
    }

    /// Zoom around `anchor` (canvas-relative screen point), keeping it fixed on screen.
    pub fn zoom_at(
        &mut self,
        zoom: f64,
        anchor: Position,
    ) {
        let zoom = clamp_zoom(zoom);
        let ratio = zoom / self.zoom;
        self.x = anchor.x - (anchor.x - self.x) * ratio;
        self.y = anchor.y - (anchor.y - self.y) * ratio;
        self.zoom = zoom;
    }
}
