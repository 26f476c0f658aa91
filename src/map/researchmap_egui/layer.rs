use egui::{Pos2, Rect, Ui};

use crate::map::coordinates::Transform;

/// Draws the country boundaries.
mod boundary_layer;
/// Draws one marker per researcher location.
mod marker_layer;

pub use boundary_layer::BoundaryLayer;
pub use marker_layer::MarkerLayer;

/// A layer represents everything that can be summarized as a logical unit on
/// the map, e.g. the country boundaries or the researcher markers.
pub trait Layer {
  fn draw(&mut self, ui: &mut Ui, transform: &Transform, rect: Rect);
  fn name(&self) -> &str;
  fn visible(&self) -> bool;
  fn visible_mut(&mut self) -> &mut bool;
  /// Pointer moved; `None` means the pointer left the map.
  fn handle_hover(&mut self, _pos: Option<Pos2>, _transform: &Transform) {}
  /// Returns true if the layer consumed the click.
  fn handle_click(&mut self, _pos: Pos2, _transform: &Transform) -> bool {
    false
  }
}

/// Common properties for all layers.
pub struct LayerProperties {
  pub visible: bool,
}

impl Default for LayerProperties {
  fn default() -> Self {
    Self { visible: true }
  }
}
