use std::path::PathBuf;

use dirs::home_dir;
use egui::Color32;
use log::error;

const DEFAULT_BOUNDARY_URL: &str =
  "https://raw.githubusercontent.com/johan/world.geo.json/master/countries.geo.json";

/// Declarative style configuration for the map. Passed into the widget at
/// construction and dropped with it; there is no shared style registry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapTheme {
  /// Country fill, shared by every render state.
  pub fill: Color32,
  /// Border of countries without researchers.
  pub border_default: Color32,
  /// Accent border of countries hosting researchers.
  pub border_active: Color32,
  /// Border of a hovered non-active country.
  pub border_hover: Color32,
  /// Marker and popup accent color.
  pub accent: Color32,
  /// Window background behind the countries.
  pub background: Color32,
  pub weight_default: f32,
  pub weight_active: f32,
  pub weight_hover: f32,
  pub fill_opacity_default: f32,
  pub fill_opacity_active: f32,
  pub fill_opacity_default_hover: f32,
  pub fill_opacity_active_hover: f32,
  /// Border opacity of non-hovered default countries.
  pub border_opacity_default: f32,
  /// Dash and gap length of the default border.
  pub dash_pattern: (f32, f32),
}

impl Default for MapTheme {
  fn default() -> Self {
    Self {
      fill: Color32::from_rgb(0x45, 0x45, 0x45),
      border_default: Color32::from_rgb(0x33, 0x33, 0x33),
      border_active: Color32::from_rgb(0x9c, 0x27, 0xb0),
      border_hover: Color32::from_rgb(0x66, 0x66, 0x66),
      accent: Color32::from_rgb(0x9c, 0x27, 0xb0),
      background: Color32::from_rgb(0x14, 0x14, 0x14),
      weight_default: 1.,
      weight_active: 3.,
      weight_hover: 4.,
      fill_opacity_default: 0.2,
      fill_opacity_active: 0.3,
      fill_opacity_default_hover: 0.4,
      fill_opacity_active_hover: 0.5,
      border_opacity_default: 0.7,
      dash_pattern: (3., 3.),
    }
  }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
  pub boundary_url: String,
  pub theme: MapTheme,
}

impl Config {
  /// Loads the config file if one exists, otherwise the compiled-in defaults.
  #[must_use]
  pub fn new() -> Self {
    Self::from_file().unwrap_or_default()
  }

  fn from_file() -> Option<Self> {
    let config_path = home_dir()?
      .join(".config")
      .join("researchmap")
      .join("config.json");

    serde_json::from_str(&std::fs::read_to_string(&config_path).ok()?)
      .inspect_err(|e| error!("Failed to read config file {}: {e}", config_path.display()))
      .ok()
  }

  #[must_use]
  pub fn config_dir() -> Option<PathBuf> {
    home_dir().map(|p| p.join(".config").join("researchmap"))
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      boundary_url: DEFAULT_BOUNDARY_URL.to_string(),
      theme: MapTheme::default(),
    }
  }
}
