use egui::Widget as _;

use crate::map::researchmap_egui::Map;

/// Holds the UI data of researchmap.
pub struct MapApp {
  map: Map,
}

impl MapApp {
  #[must_use]
  pub fn new(map: Map) -> Self {
    Self { map }
  }

  #[must_use]
  pub fn marker_count(&self) -> usize {
    self.map.marker_count()
  }
}

impl eframe::App for MapApp {
  fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
    egui::TopBottomPanel::top("heading").show(ctx, |ui| {
      ui.vertical_centered(|ui| {
        ui.heading("Global Research Network");
        ui.small(format!(
          "{} partner institutions in cancer research worldwide",
          self.map.marker_count()
        ));
      });
    });

    egui::CentralPanel::default()
      .frame(egui::Frame::NONE)
      .show(ctx, |ui| {
        (&mut self.map).ui(ui);
      });
  }
}
