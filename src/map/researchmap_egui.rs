use egui::{InputState, PointerButton, Rect, Response, Sense, Ui, Widget};
use log::debug;

use crate::config::Config;
use crate::dataset::{self, ActiveCountrySet, ResearcherLocation};
use crate::map::coordinates::{CANVAS_SIZE, PixelCoordinate, PixelPosition, Transform, WGS84Coordinate};

use layer::{BoundaryLayer, Layer, MarkerLayer};

mod layer;

pub const MAX_ZOOM: f32 = 64.;

/// Initial viewport center of the reference deployment.
const INITIAL_CENTER: WGS84Coordinate = WGS84Coordinate { lat: 20., lon: 0. };

/// The map widget. Owns the viewport and composes the boundary and marker
/// layers; its only public surface is construction and drop.
pub struct Map {
  transform: Transform,
  layers: Vec<Box<dyn Layer>>,
  marker_count: usize,
  background: egui::Color32,
  ctx: egui::Context,
}

impl Map {
  #[must_use]
  pub fn new(
    ctx: egui::Context,
    locations: Vec<ResearcherLocation>,
    active: ActiveCountrySet,
    config: &Config,
  ) -> Self {
    dataset::log_contract_violations(&locations, &active);

    let boundary_layer = BoundaryLayer::new(
      ctx.clone(),
      config.boundary_url.clone(),
      locations.clone(),
      active,
      config.theme.clone(),
    );
    let marker_layer = MarkerLayer::new(locations, config.theme.clone());
    let marker_count = marker_layer.marker_count();

    Self {
      transform: Transform::invalid(),
      layers: vec![Box::new(boundary_layer), Box::new(marker_layer)],
      marker_count,
      background: config.theme.background,
      ctx,
    }
  }

  /// Number of institution markers on the map. Markers never depend on the
  /// boundary load, so this is stable from the first frame on.
  #[must_use]
  pub fn marker_count(&self) -> usize {
    self.marker_count
  }

  fn handle_mouse_wheel(&mut self, ui: &Ui, response: &Response, rect: Rect) {
    if response.hovered() {
      let delta = ui
        .input(|i| {
          i.events
            .iter()
            .find_map(move |e| match e {
              egui::Event::MouseWheel {
                unit: _,
                delta,
                modifiers: _,
              } => Some(delta),
              _ => None,
            })
            .copied()
        })
        .map(|d| (d.y / 1. + 1.).clamp(0.8, 1.4).sqrt());
      if let Some(delta) = delta {
        let cursor = response.hover_pos().unwrap_or_default().into();
        self.zoom_with_center(delta, cursor, rect);
      }
    }
  }

  fn zoom_with_center(&mut self, delta: f32, center: PixelPosition, rect: Rect) {
    let zoomed = self.transform.zoom * delta;
    if zoomed < min_zoom(&rect) || zoomed > MAX_ZOOM {
      return;
    }
    let hover_coord = self.transform.unapply(center);
    self.transform.zoom(delta);
    self.transform.set_coordinate_to_pixel(hover_coord, center);
  }

  fn handle_keys(&mut self, events: impl Iterator<Item = egui::Event>, rect: Rect) {
    for event in events {
      if let egui::Event::Key {
        key,
        pressed: true,
        modifiers,
        ..
      } = event
      {
        match key {
          egui::Key::ArrowDown => {
            self.transform.translate(PixelPosition { x: 0., y: -10. });
          }
          egui::Key::ArrowLeft => {
            self.transform.translate(PixelPosition { x: 10., y: 0. });
          }
          egui::Key::ArrowRight => {
            self.transform.translate(PixelPosition { x: -10., y: 0. });
          }
          egui::Key::ArrowUp => {
            self.transform.translate(PixelPosition { x: 0., y: 10. });
          }
          egui::Key::Minus => {
            self.zoom_with_center(0.9, rect.center().into(), rect);
          }
          egui::Key::Plus | egui::Key::Equals => {
            self.zoom_with_center(1. / 0.9, rect.center().into(), rect);
          }
          _ => {
            debug!("Unhandled key pressed: {key:?} {modifiers:?}");
          }
        }
      }
    }
  }

  fn initial_view(&mut self, rect: Rect) {
    self.transform = Transform::default();
    self.transform.zoom = min_zoom(&rect);
    self
      .transform
      .set_coordinate_to_pixel(PixelCoordinate::from(INITIAL_CENTER), rect.center().into());
  }
}

fn min_zoom(rect: &Rect) -> f32 {
  (rect.width() / CANVAS_SIZE).max(rect.height() / CANVAS_SIZE)
}

/// Clamps zoom and translation so the viewport never leaves the world
/// canvas (lat in [-90, 90], lon in [-180, 180]).
fn clamp_to_world(transform: &mut Transform, rect: &Rect) {
  transform.zoom = transform.zoom.clamp(min_zoom(rect), MAX_ZOOM);

  let top_left = transform.unapply(rect.min.into());
  if top_left.x < 0. || top_left.y < 0. {
    transform.translate(
      PixelPosition {
        x: top_left.x.min(0.),
        y: top_left.y.min(0.),
      } * transform.zoom,
    );
  }

  let bottom_right = transform.unapply(rect.max.into());
  if bottom_right.x > CANVAS_SIZE || bottom_right.y > CANVAS_SIZE {
    transform.translate(
      PixelPosition {
        x: (bottom_right.x - CANVAS_SIZE).max(0.),
        y: (bottom_right.y - CANVAS_SIZE).max(0.),
      } * transform.zoom,
    );
  }
}

impl Widget for &mut Map {
  fn ui(self, ui: &mut Ui) -> Response {
    let size = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

    if self.transform.is_invalid() {
      self.initial_view(rect);
    }

    self.handle_mouse_wheel(ui, &response, rect);

    let events = ui.input(|i: &InputState| {
      i.events
        .iter()
        .filter(|e| matches!(e, egui::Event::Key { .. }))
        .cloned()
        .collect::<Vec<_>>()
    });
    self.handle_keys(events.into_iter(), rect);

    if response.dragged() && response.dragged_by(PointerButton::Primary) {
      self.transform.translate(PixelPosition {
        x: response.drag_delta().x,
        y: response.drag_delta().y,
      });
    }

    clamp_to_world(&mut self.transform, &rect);

    // Hover drives the highlight table; it must be processed before drawing
    // so the restyle is visible in the same frame.
    let hover_pos = response.hover_pos();
    for layer in &mut self.layers {
      layer.handle_hover(hover_pos, &self.transform);
    }

    if response.clicked()
      && let Some(pos) = response.hover_pos()
    {
      // Layers later in the draw order get the click first.
      for layer in self.layers.iter_mut().rev() {
        if layer.handle_click(pos, &self.transform) {
          self.ctx.request_repaint();
          break;
        }
      }
    }

    if ui.is_rect_visible(rect) {
      ui.painter_at(rect)
        .rect_filled(rect, egui::CornerRadius::ZERO, self.background);
      for layer in &mut self.layers {
        layer.draw(ui, &self.transform, rect);
      }
    }

    response
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;

  fn world_rect() -> Rect {
    Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1024., 512.))
  }

  #[test]
  fn min_zoom_shows_the_whole_world() {
    let rect = world_rect();
    let zoom = min_zoom(&rect);
    // The larger viewport dimension determines the zoom floor.
    assert_approx_eq!(zoom, 0.5, 0.001);
  }

  #[test]
  fn clamp_keeps_viewport_on_the_canvas() {
    let rect = world_rect();
    let mut transform = Transform {
      zoom: 1.,
      trans: PixelPosition::default(),
    };
    // Pan far off the west edge.
    transform.translate(PixelPosition { x: 5000., y: 0. });
    clamp_to_world(&mut transform, &rect);

    let top_left = transform.unapply(rect.min.into());
    let bottom_right = transform.unapply(rect.max.into());
    assert!(top_left.x >= -0.01 && top_left.y >= -0.01);
    assert!(bottom_right.x <= CANVAS_SIZE + 0.01);
    assert!(bottom_right.y <= CANVAS_SIZE + 0.01);
  }

  #[test]
  fn clamp_raises_too_small_zoom() {
    let rect = world_rect();
    let mut transform = Transform {
      zoom: 0.01,
      trans: PixelPosition::default(),
    };
    clamp_to_world(&mut transform, &rect);
    assert_approx_eq!(transform.zoom, min_zoom(&rect), 0.001);
  }
}
