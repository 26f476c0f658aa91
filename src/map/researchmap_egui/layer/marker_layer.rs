use egui::{Color32, Pos2, Rect, RichText, Shape, Stroke, Ui};

use super::{Layer, LayerProperties};
use crate::config::MapTheme;
use crate::dataset::ResearcherLocation;
use crate::map::coordinates::{PixelCoordinate, Transform};
use crate::map::popup::build_marker_popup;

const PIN_HEAD_RADIUS: f32 = 6.;
const PIN_HEIGHT: f32 = 16.;
const HIT_RADIUS: f32 = 12.;

/// One marker per researcher location. Markers render as soon as the dataset
/// is available; they never wait for boundary data.
pub struct MarkerLayer {
  locations: Vec<ResearcherLocation>,
  theme: MapTheme,
  open: Option<u32>,
  layer_properties: LayerProperties,
}

const NAME: &str = "Marker Layer";

impl MarkerLayer {
  #[must_use]
  pub fn new(locations: Vec<ResearcherLocation>, theme: MapTheme) -> Self {
    Self {
      locations,
      theme,
      open: None,
      layer_properties: LayerProperties::default(),
    }
  }

  #[must_use]
  pub fn marker_count(&self) -> usize {
    self.locations.len()
  }

  fn tip_position(location: &ResearcherLocation, transform: &Transform) -> Pos2 {
    transform
      .apply(PixelCoordinate::from(location.coordinates))
      .into()
  }

  /// The topmost marker hit by a click, if any. Later records draw on top.
  fn marker_at(&self, pos: Pos2, transform: &Transform) -> Option<&ResearcherLocation> {
    self.locations.iter().rev().find(|location| {
      let tip = Self::tip_position(location, transform);
      let head = Pos2::new(tip.x, tip.y - PIN_HEIGHT + PIN_HEAD_RADIUS);
      tip.distance(pos) <= HIT_RADIUS || head.distance(pos) <= HIT_RADIUS
    })
  }

  fn draw_pin(&self, painter: &egui::Painter, tip: Pos2) {
    let head = Pos2::new(tip.x, tip.y - PIN_HEIGHT + PIN_HEAD_RADIUS);
    painter.add(Shape::convex_polygon(
      vec![
        Pos2::new(tip.x - PIN_HEAD_RADIUS * 0.8, head.y + 2.),
        tip,
        Pos2::new(tip.x + PIN_HEAD_RADIUS * 0.8, head.y + 2.),
      ],
      self.theme.accent,
      Stroke::NONE,
    ));
    painter.circle(
      head,
      PIN_HEAD_RADIUS,
      self.theme.accent,
      Stroke::new(1.5, Color32::WHITE),
    );
  }

  fn show_popup(&mut self, ui: &Ui, transform: &Transform) {
    let Some(id) = self.open else { return };
    let Some(location) = self.locations.iter().find(|l| l.id == id) else {
      self.open = None;
      return;
    };

    let entry = build_marker_popup(location);
    let tip = Self::tip_position(location, transform);
    let mut close_requested = false;

    egui::Window::new(RichText::new(&entry.name).strong())
      .id(egui::Id::new("marker_popup"))
      .collapsible(false)
      .resizable(false)
      .fixed_pos(Pos2::new(tip.x, tip.y - PIN_HEIGHT))
      .show(ui.ctx(), |ui| {
        ui.set_min_width(200.);

        if ui
          .link(RichText::new(format!("{} 🔗", entry.name)).color(self.theme.accent))
          .clicked()
        {
          ui.ctx().open_url(egui::OpenUrl::new_tab(&entry.website));
        }
        ui.small(format!("📍 {}", entry.city));

        ui.separator();
        if ui.button("Close").clicked() {
          close_requested = true;
        }
      });

    if close_requested {
      self.open = None;
    }
  }
}

impl Layer for MarkerLayer {
  fn draw(&mut self, ui: &mut Ui, transform: &Transform, rect: Rect) {
    if !self.visible() {
      return;
    }

    let painter = ui.painter_at(rect);
    for location in &self.locations {
      self.draw_pin(&painter, Self::tip_position(location, transform));
    }

    self.show_popup(ui, transform);
  }

  fn name(&self) -> &str {
    NAME
  }

  fn visible(&self) -> bool {
    self.layer_properties.visible
  }

  fn visible_mut(&mut self) -> &mut bool {
    &mut self.layer_properties.visible
  }

  fn handle_click(&mut self, pos: Pos2, transform: &Transform) -> bool {
    if let Some(location) = self.marker_at(pos, transform) {
      self.open = Some(location.id);
      true
    } else {
      self.open = None;
      false
    }
  }
}
