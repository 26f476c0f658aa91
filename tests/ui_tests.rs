use eframe::App;
use egui_kittest::Harness;
use egui_kittest::kittest::Queryable;
use researchmap::{
  config::Config,
  dataset::{ActiveCountrySet, sample_locations},
  map::researchmap_egui::Map,
  researchmap_ui::MapApp,
};

fn create_test_app() -> MapApp {
  let config = Config::new();
  let ctx = egui::Context::default();
  let locations = sample_locations();
  let active = ActiveCountrySet::from_locations(&locations);
  MapApp::new(Map::new(ctx, locations, active, &config))
}

fn harness(app: MapApp) -> Harness<'static, MapApp> {
  Harness::new_state(
    |ctx, app: &mut MapApp| {
      let mut frame = eframe::Frame::_new_kittest();
      app.update(ctx, &mut frame);
    },
    app,
  )
}

#[tokio::test]
async fn heading_is_shown() {
  let mut harness = harness(create_test_app());
  harness.run();

  harness.get_by_label("Global Research Network");
  harness.get_by_label("10 partner institutions in cancer research worldwide");
}

#[tokio::test]
async fn map_renders_multiple_frames() {
  let mut harness = harness(create_test_app());

  // The boundary fetch resolves (or fails) in the background; the map has to
  // stay renderable through pending, ready and failed states alike.
  for _ in 0..5 {
    harness.run();
  }
}

#[tokio::test]
async fn map_renders_without_boundary_data() {
  // An unreachable boundary source leaves the map in marker-only mode
  // instead of breaking the UI.
  let mut config = Config::new();
  config.boundary_url = "http://127.0.0.1:1/unreachable.geo.json".to_string();

  let ctx = egui::Context::default();
  let locations = sample_locations();
  let active = ActiveCountrySet::from_locations(&locations);
  let app = MapApp::new(Map::new(ctx, locations, active, &config));

  let mut harness = harness(app);
  for _ in 0..5 {
    harness.run();
  }
  harness.get_by_label("Global Research Network");
  // All ten markers are still on the map after the failed fetch.
  harness.get_by_label("10 partner institutions in cancer research worldwide");
  assert_eq!(harness.state().marker_count(), 10);
}
