use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Deserializer, Serialize};

/// The fixed canvas size for ``PixelCoordinate``s. The whole world projects
/// onto `[0, CANVAS_SIZE] x [0, CANVAS_SIZE]`.
pub const CANVAS_SIZE: f32 = 1024. * 2.;

const PI: f32 = std::f32::consts::PI;

/// The standard WGS84 coordinate system.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize)]
pub struct WGS84Coordinate {
  pub lat: f32,
  pub lon: f32,
}

/// Accepts both the object form `{"lat": .., "lon": ..}` (long field names
/// included) and the wire form `[latitude, longitude]` used by upstream
/// researcher records.
impl<'de> Deserialize<'de> for WGS84Coordinate {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
      Pair(f32, f32),
      Object {
        #[serde(alias = "latitude")]
        lat: f32,
        #[serde(alias = "longitude")]
        lon: f32,
      },
    }

    match Repr::deserialize(deserializer)? {
      Repr::Pair(lat, lon) | Repr::Object { lat, lon } => Ok(Self { lat, lon }),
    }
  }
}

impl WGS84Coordinate {
  #[must_use]
  pub fn new(lat: f32, lon: f32) -> Self {
    Self { lat, lon }
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
  }

  /// Clamps into the valid range. Used to keep out-of-contract records on
  /// the canvas instead of dropping them.
  #[must_use]
  pub fn clamped(&self) -> Self {
    Self {
      lat: self.lat.clamp(-90., 90.),
      lon: self.lon.clamp(-180., 180.),
    }
  }
}

impl Eq for WGS84Coordinate {}

/// A coordinate system used in this application to draw on an imaginary
/// canvas. Equivalent to Web Mercator on a fixed zoom level.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct PixelCoordinate {
  pub x: f32,
  pub y: f32,
}

impl Eq for PixelCoordinate {}

impl PixelCoordinate {
  #[must_use]
  pub fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  #[must_use]
  pub fn sq_dist(&self, p: &Self) -> f32 {
    let dx = p.x - self.x;
    let dy = p.y - self.y;
    dx * dx + dy * dy
  }
}

impl From<WGS84Coordinate> for PixelCoordinate {
  fn from(coord: WGS84Coordinate) -> Self {
    let coord = coord.clamped();
    let lat_rad = coord.lat * PI / 180.;
    // Mercator diverges at the poles, the clamp keeps the canvas finite.
    let y_norm = ((lat_rad.tan() + 1. / lat_rad.cos()).ln() / PI).clamp(-1., 1.);
    PixelCoordinate {
      x: (coord.lon + 180.) / 360. * CANVAS_SIZE,
      y: (1. - y_norm) / 2. * CANVAS_SIZE,
    }
  }
}

impl Add for PixelCoordinate {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Self {
      x: self.x + rhs.x,
      y: self.y + rhs.y,
    }
  }
}

impl Mul<f32> for PixelCoordinate {
  type Output = Self;

  fn mul(self, rhs: f32) -> Self {
    Self {
      x: self.x * rhs,
      y: self.y * rhs,
    }
  }
}

/// Meant for actual pixels in the UI. Handled equivalently to an ``egui::Pos2``.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct PixelPosition {
  pub x: f32,
  pub y: f32,
}

impl Eq for PixelPosition {}

impl From<egui::Pos2> for PixelPosition {
  fn from(pos: egui::Pos2) -> Self {
    PixelPosition { x: pos.x, y: pos.y }
  }
}

impl From<PixelPosition> for egui::Pos2 {
  fn from(pp: PixelPosition) -> Self {
    egui::Pos2::new(pp.x, pp.y)
  }
}

impl Add for PixelPosition {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Self {
      x: self.x + rhs.x,
      y: self.y + rhs.y,
    }
  }
}

impl AddAssign for PixelPosition {
  fn add_assign(&mut self, other: Self) {
    self.x += other.x;
    self.y += other.y;
  }
}

impl Mul<f32> for PixelPosition {
  type Output = Self;

  fn mul(self, rhs: f32) -> Self {
    Self {
      x: self.x * rhs,
      y: self.y * rhs,
    }
  }
}

/// Keeps track of the transform between canvas coordinates and UI pixels.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Transform {
  pub zoom: f32,
  pub trans: PixelPosition,
}

impl Default for Transform {
  fn default() -> Self {
    Self {
      zoom: 1.,
      trans: PixelPosition::default(),
    }
  }
}

impl Transform {
  /// Returns an invalid transform, used before the first frame sized the map.
  #[must_use]
  pub fn invalid() -> Self {
    Self {
      zoom: 0.,
      trans: PixelPosition::default(),
    }
  }

  #[must_use]
  pub fn is_invalid(&self) -> bool {
    self.zoom == 0. || self.zoom.is_nan() || self.trans.x.is_nan() || self.trans.y.is_nan()
  }

  pub fn zoom(&mut self, factor: f32) -> &mut Self {
    self.zoom *= factor;
    self
  }

  pub fn translate(&mut self, delta: PixelPosition) -> &mut Self {
    self.trans += delta;
    self
  }

  /// Canvas coordinate to UI pixel.
  #[must_use]
  pub fn apply(&self, coord: PixelCoordinate) -> PixelPosition {
    PixelPosition {
      x: coord.x * self.zoom + self.trans.x,
      y: coord.y * self.zoom + self.trans.y,
    }
  }

  /// UI pixel back to canvas coordinate.
  #[must_use]
  pub fn unapply(&self, pos: PixelPosition) -> PixelCoordinate {
    PixelCoordinate {
      x: (pos.x - self.trans.x) / self.zoom,
      y: (pos.y - self.trans.y) / self.zoom,
    }
  }

  /// Moves the transform so that `coord` lands on the UI pixel `pos`.
  pub fn set_coordinate_to_pixel(&mut self, coord: PixelCoordinate, pos: PixelPosition) {
    let current = self.apply(coord);
    self.translate(current * (-1.) + pos);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;

  #[test]
  fn coordinate_to_pixel_zero() {
    let pp = PixelCoordinate::from(WGS84Coordinate::new(0., 0.));
    assert_approx_eq!(pp.x, CANVAS_SIZE / 2., 0.01);
    assert_approx_eq!(pp.y, CANVAS_SIZE / 2., 0.01);
  }

  #[test]
  fn coordinate_to_pixel_corners() {
    let west = PixelCoordinate::from(WGS84Coordinate::new(0., -180.));
    assert_approx_eq!(west.x, 0., 0.01);
    let east = PixelCoordinate::from(WGS84Coordinate::new(0., 180.));
    assert_approx_eq!(east.x, CANVAS_SIZE, 0.01);
  }

  #[test]
  fn transform_round_trip() {
    let mut transform = Transform::default();
    transform.zoom(4.);
    transform.translate(PixelPosition { x: 13., y: -7. });

    let coord = PixelCoordinate::new(100., 200.);
    let back = transform.unapply(transform.apply(coord));
    assert_approx_eq!(back.x, coord.x, 0.001);
    assert_approx_eq!(back.y, coord.y, 0.001);
  }

  #[test]
  fn set_coordinate_to_pixel_centers() {
    let mut transform = Transform::default();
    transform.zoom(2.);
    let coord = PixelCoordinate::new(1024., 1024.);
    let target = PixelPosition { x: 400., y: 300. };
    transform.set_coordinate_to_pixel(coord, target);
    let landed = transform.apply(coord);
    assert_approx_eq!(landed.x, target.x, 0.001);
    assert_approx_eq!(landed.y, target.y, 0.001);
  }

  #[test]
  fn deserializes_object_and_pair_forms() {
    let object: WGS84Coordinate = serde_json::from_str(r#"{"lat": 42.3376, "lon": -71.1037}"#).unwrap();
    let long_form: WGS84Coordinate =
      serde_json::from_str(r#"{"latitude": 42.3376, "longitude": -71.1037}"#).unwrap();
    let pair: WGS84Coordinate = serde_json::from_str("[42.3376, -71.1037]").unwrap();
    assert_eq!(object, WGS84Coordinate::new(42.3376, -71.1037));
    assert_eq!(long_form, object);
    assert_eq!(pair, object);

    // Serialization stays in the object form and round-trips.
    let json = serde_json::to_string(&object).unwrap();
    let back: WGS84Coordinate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, object);
  }

  #[test]
  fn out_of_range_coordinates_clamp() {
    let off_canvas = WGS84Coordinate::new(123., -500.);
    assert!(!off_canvas.is_valid());
    let pp = PixelCoordinate::from(off_canvas);
    assert!(pp.x >= 0. && pp.x <= CANVAS_SIZE);
    assert!(pp.y >= 0. && pp.y <= CANVAS_SIZE);
  }
}
