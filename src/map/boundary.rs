use std::time::Duration;

use log::warn;
use serde_json::Value;
use surf::http::Method;
use surf::{Request, Url};
use thiserror::Error;

use crate::dataset::CountryCode;
use crate::map::coordinates::{PixelCoordinate, WGS84Coordinate};

/// Failure modes of the boundary pipeline. Both are non-fatal: the map
/// degrades to a marker-only view.
#[derive(Error, Debug)]
pub enum BoundaryError {
  #[error("failed to fetch boundary data: {0}")]
  Fetch(String),
  #[error("boundary data is not a GeoJSON FeatureCollection: {0}")]
  Parse(String),
}

/// One country's boundary: code, display name and the exterior rings of its
/// polygons, already projected onto the canvas. Read-only reference data.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
  /// `None` when the source feature carried no usable `iso_a2`. Such
  /// features still render with the default style but are not interactive.
  pub code: Option<CountryCode>,
  pub name: String,
  pub polygons: Vec<Vec<PixelCoordinate>>,
}

impl CountryFeature {
  /// Even-odd point-in-polygon test over all rings.
  #[must_use]
  pub fn contains(&self, coord: PixelCoordinate) -> bool {
    self.polygons.iter().any(|ring| ring_contains(ring, coord))
  }
}

fn ring_contains(ring: &[PixelCoordinate], p: PixelCoordinate) -> bool {
  if ring.len() < 3 {
    return false;
  }
  let mut inside = false;
  let mut j = ring.len() - 1;
  for i in 0..ring.len() {
    let (a, b) = (ring[i], ring[j]);
    if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
      inside = !inside;
    }
    j = i;
  }
  inside
}

/// Progress of the one-shot boundary fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
  #[default]
  Pending,
  Ready,
  Failed,
}

/// Fetches the boundary dataset once. Not retried; callers decide what a
/// failure means (here: an empty feature layer).
pub async fn fetch(url: &str) -> Result<Vec<CountryFeature>, BoundaryError> {
  let client: surf::Client = surf::Config::new()
    .set_timeout(Some(Duration::from_secs(10)))
    .try_into()
    .expect("client");

  let parsed_url = Url::parse(url).map_err(|e| BoundaryError::Fetch(e.to_string()))?;
  let request = Request::new(Method::Get, parsed_url);
  let mut response = client
    .send(request)
    .await
    .map_err(|e| BoundaryError::Fetch(e.to_string()))?;
  if response.status() != 200 {
    return Err(BoundaryError::Fetch(format!(
      "unexpected status {} from {url}",
      response.status()
    )));
  }
  let body = response
    .body_string()
    .await
    .map_err(|e| BoundaryError::Fetch(e.to_string()))?;

  parse_feature_collection(&body)
}

/// Parses a GeoJSON `FeatureCollection` into typed country features.
/// Features without a usable `iso_a2` or `name` degrade to non-interactive
/// default styling; only features without usable geometry are skipped.
/// Neither case fails the whole load.
pub fn parse_feature_collection(data: &str) -> Result<Vec<CountryFeature>, BoundaryError> {
  let value: Value =
    serde_json::from_str(data).map_err(|e| BoundaryError::Parse(e.to_string()))?;

  let obj = value
    .as_object()
    .ok_or_else(|| BoundaryError::Parse("not an object".to_string()))?;
  if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
    return Err(BoundaryError::Parse("missing FeatureCollection type".to_string()));
  }
  let features = obj
    .get("features")
    .and_then(Value::as_array)
    .ok_or_else(|| BoundaryError::Parse("missing features array".to_string()))?;

  Ok(features.iter().filter_map(parse_feature).collect())
}

fn parse_feature(feature: &Value) -> Option<CountryFeature> {
  let obj = feature.as_object()?;
  let properties = obj.get("properties").and_then(Value::as_object);

  let name = properties
    .and_then(|p| p.get("name"))
    .and_then(Value::as_str)
    .unwrap_or_default();
  let code = properties
    .and_then(|p| p.get("iso_a2"))
    .and_then(Value::as_str)
    .and_then(CountryCode::new);
  if code.is_none() {
    warn!("Boundary feature {name:?} has no usable iso_a2, rendering it non-interactive");
  }

  let polygons = parse_polygons(obj.get("geometry")?);
  if polygons.is_empty() {
    warn!("Skipping boundary feature {name:?} without usable geometry");
    return None;
  }

  Some(CountryFeature {
    code,
    name: name.to_string(),
    polygons,
  })
}

/// Extracts the exterior rings of a `Polygon` or `MultiPolygon` geometry.
/// Interior rings are irrelevant at world zoom and are ignored.
fn parse_polygons(geometry: &Value) -> Vec<Vec<PixelCoordinate>> {
  let Some(obj) = geometry.as_object() else {
    return Vec::new();
  };
  let geom_type = obj.get("type").and_then(Value::as_str);
  let coordinates = obj.get("coordinates");

  match (geom_type, coordinates) {
    (Some("Polygon"), Some(rings)) => parse_exterior_ring(rings).into_iter().collect(),
    (Some("MultiPolygon"), Some(polygons)) => polygons
      .as_array()
      .map(|polygons| {
        polygons
          .iter()
          .filter_map(parse_exterior_ring)
          .collect()
      })
      .unwrap_or_default(),
    _ => Vec::new(),
  }
}

fn parse_exterior_ring(rings: &Value) -> Option<Vec<PixelCoordinate>> {
  let ring = rings.as_array()?.first()?.as_array()?;
  let coords: Vec<PixelCoordinate> = ring
    .iter()
    .filter_map(|position| {
      let position = position.as_array()?;
      // GeoJSON positions are [lon, lat].
      let lon = position.first()?.as_f64()?;
      let lat = position.get(1)?.as_f64()?;
      #[allow(clippy::cast_possible_truncation)]
      Some(PixelCoordinate::from(WGS84Coordinate::new(
        lat as f32, lon as f32,
      )))
    })
    .collect();
  (coords.len() >= 3).then_some(coords)
}
