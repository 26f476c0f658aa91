use std::sync::mpsc::{Receiver, Sender};

use egui::epaint::PathStroke;
use egui::{Pos2, Rect, RichText, Shape, Stroke, Ui};
use log::{debug, error, info};

use super::{Layer, LayerProperties};
use crate::config::MapTheme;
use crate::dataset::{ActiveCountrySet, ResearcherLocation};
use crate::map::boundary::{self, BoundaryError, CountryFeature, LoadState};
use crate::map::coordinates::{PixelCoordinate, Transform};
use crate::map::highlight::HighlightTable;
use crate::map::popup::{PopupContent, build_popup};
use crate::map::style::{RenderState, resolve_style};

type FetchResult = Result<Vec<CountryFeature>, BoundaryError>;

/// The country popup currently open, anchored to a canvas coordinate so it
/// follows the map while panning.
struct OpenPopup {
  content: PopupContent,
  anchor: PixelCoordinate,
}

/// Draws the country boundaries and owns the hover/highlight state. Starts
/// exactly one boundary fetch on construction; a failed fetch leaves the
/// layer empty while the rest of the map stays usable.
pub struct BoundaryLayer {
  recv: Receiver<FetchResult>,
  load_state: LoadState,
  features: Vec<CountryFeature>,
  highlight: HighlightTable,
  locations: Vec<ResearcherLocation>,
  active: ActiveCountrySet,
  theme: MapTheme,
  popup: Option<OpenPopup>,
  layer_properties: LayerProperties,
}

const NAME: &str = "Boundary Layer";

impl BoundaryLayer {
  #[must_use]
  pub fn new(
    ctx: egui::Context,
    boundary_url: String,
    locations: Vec<ResearcherLocation>,
    active: ActiveCountrySet,
    theme: MapTheme,
  ) -> Self {
    let (send, recv) = std::sync::mpsc::channel();
    spawn_fetch(ctx, boundary_url, send);
    Self::from_channel(recv, locations, active, theme)
  }

  fn from_channel(
    recv: Receiver<FetchResult>,
    locations: Vec<ResearcherLocation>,
    active: ActiveCountrySet,
    theme: MapTheme,
  ) -> Self {
    Self {
      recv,
      load_state: LoadState::Pending,
      features: Vec::new(),
      highlight: HighlightTable::default(),
      locations,
      active,
      theme,
      popup: None,
      layer_properties: LayerProperties::default(),
    }
  }

  #[must_use]
  pub fn load_state(&self) -> LoadState {
    self.load_state
  }

  fn poll_fetch(&mut self) {
    for result in self.recv.try_iter() {
      match result {
        Ok(features) => {
          info!("Boundary data ready: {} features", features.len());
          self.highlight = HighlightTable::new(&features, &self.active);
          self.features = features;
          self.load_state = LoadState::Ready;
        }
        Err(e) => {
          error!("Boundary data unavailable, map degrades to markers only: {e}");
          self.load_state = LoadState::Failed;
        }
      }
    }
  }

  /// The interactive feature under `coord`. Features without a country code
  /// are not interactive and never match.
  fn feature_at(&self, coord: PixelCoordinate) -> Option<&CountryFeature> {
    self
      .features
      .iter()
      .find(|f| f.code.is_some() && f.contains(coord))
  }

  fn draw_feature(&self, painter: &egui::Painter, feature: &CountryFeature, transform: &Transform) {
    let state = feature
      .code
      .as_ref()
      .map_or_else(RenderState::default, |c| self.highlight.state_of(c));
    let style = resolve_style(state, &self.theme);
    for ring in &feature.polygons {
      let points: Vec<Pos2> = ring.iter().map(|c| transform.apply(*c).into()).collect();
      if points.len() < 3 {
        continue;
      }

      painter.add(Shape::Path(egui::epaint::PathShape {
        points: points.clone(),
        closed: true,
        fill: style.fill,
        stroke: PathStroke::new(0., egui::Color32::TRANSPARENT),
      }));

      let stroke = Stroke::new(style.weight, style.border);
      if let Some((dash, gap)) = style.dash {
        let mut outline = points;
        if let Some(first) = outline.first().copied() {
          outline.push(first);
        }
        painter.extend(Shape::dashed_line(&outline, stroke, dash, gap));
      } else {
        painter.add(Shape::closed_line(points, stroke));
      }
    }
  }

  fn show_popup(&mut self, ui: &Ui, transform: &Transform) {
    let Some(popup) = &self.popup else { return };
    let mut close_requested = false;
    let anchor: Pos2 = transform.apply(popup.anchor).into();

    egui::Window::new(RichText::new(&popup.content.country).strong())
      .id(egui::Id::new("country_popup"))
      .collapsible(false)
      .resizable(false)
      .fixed_pos(anchor)
      .show(ui.ctx(), |ui| {
        ui.set_min_width(220.);

        if popup.content.active {
          ui.label(
            RichText::new("Research Institutions:")
              .color(self.theme.accent)
              .strong(),
          );
          for entry in &popup.content.institutions {
            if ui
              .link(RichText::new(&entry.name).color(self.theme.accent))
              .clicked()
            {
              ui.ctx().open_url(egui::OpenUrl::new_tab(&entry.website));
            }
            ui.small(format!("📍 {}", entry.city));
          }
        }

        ui.separator();
        if ui.button("Close").clicked() {
          close_requested = true;
        }
      });

    if close_requested {
      self.popup = None;
    }
  }
}

/// Runs the one-shot boundary fetch. The layer owns the receiving end; once
/// the map is dropped the send fails and the late result is discarded, so
/// nothing mutates state after teardown.
fn spawn_fetch(ctx: egui::Context, url: String, send: Sender<FetchResult>) {
  tokio::spawn(async move {
    let result = boundary::fetch(&url).await;
    if send.send(result).is_err() {
      debug!("Map torn down before boundary data arrived, dropping result");
      return;
    }
    ctx.request_repaint();
  });
}

impl Layer for BoundaryLayer {
  fn draw(&mut self, ui: &mut Ui, transform: &Transform, rect: Rect) {
    self.poll_fetch();

    if !self.visible() {
      return;
    }

    let painter = ui.painter_at(rect);
    let hovered = self.highlight.hovered().cloned();
    for feature in &self.features {
      if hovered.is_none() || feature.code != hovered {
        self.draw_feature(&painter, feature, transform);
      }
    }
    // The hovered feature is drawn last to raise it above its siblings.
    if let Some(code) = hovered
      && let Some(feature) = self.features.iter().find(|f| f.code.as_ref() == Some(&code))
    {
      self.draw_feature(&painter, feature, transform);
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

  fn handle_hover(&mut self, pos: Option<Pos2>, transform: &Transform) {
    let target = pos
      .map(|p| transform.unapply(p.into()))
      .and_then(|coord| self.feature_at(coord).and_then(|f| f.code.clone()));

    match target {
      Some(code) => {
        for change in self.highlight.hover(&code) {
          debug!("Hover transition: {} -> {:?}", change.code, change.state);
        }
      }
      None => {
        if let Some(change) = self.highlight.clear() {
          debug!("Hover cleared: {} -> {:?}", change.code, change.state);
        }
      }
    }
  }

  fn handle_click(&mut self, pos: Pos2, transform: &Transform) -> bool {
    let coord = transform.unapply(pos.into());
    if let Some(feature) = self.feature_at(coord) {
      self.popup = Some(OpenPopup {
        content: build_popup(feature, &self.locations, &self.active),
        anchor: coord,
      });
      true
    } else {
      self.popup = None;
      false
    }
  }
}
