use researchmap::{
  config::Config,
  dataset::{ActiveCountrySet, sample_locations},
  map::researchmap_egui::Map,
  researchmap_ui::MapApp,
};

fn main() -> eframe::Result {
  env_logger::init();

  // Tokio runtime for the boundary fetch.
  let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
  let _enter = rt.enter();

  let options = eframe::NativeOptions {
    viewport: egui::ViewportBuilder {
      inner_size: Some(egui::vec2(1200.0, 800.0)),
      clamp_size_to_monitor_size: Some(true),
      ..Default::default()
    },
    ..Default::default()
  };

  eframe::run_native(
    "researchmap",
    options,
    Box::new(|cc| {
      let config = Config::new();
      let locations = sample_locations();
      let active = ActiveCountrySet::from_locations(&locations);
      let map = Map::new(cc.egui_ctx.clone(), locations, active, &config);
      Ok(Box::new(MapApp::new(map)))
    }),
  )
}
