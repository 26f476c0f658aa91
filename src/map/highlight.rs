use std::collections::HashMap;

use crate::dataset::{ActiveCountrySet, CountryCode};
use crate::map::boundary::CountryFeature;
use crate::map::style::RenderState;

/// A state change produced by a hover transition, telling the layer which
/// feature needs restyling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restyle {
  pub code: CountryCode,
  pub state: RenderState,
}

/// Explicit per-feature hover state, keyed by country code. Transitions are
/// pure table updates, decoupled from egui's event plumbing. At most one
/// feature is hovered at a time (single pointer).
#[derive(Debug, Default)]
pub struct HighlightTable {
  states: HashMap<CountryCode, RenderState>,
  hovered: Option<CountryCode>,
}

impl HighlightTable {
  /// Features without a country code carry no state; they always resolve to
  /// `Default` and cannot be hovered.
  #[must_use]
  pub fn new(features: &[CountryFeature], active: &ActiveCountrySet) -> Self {
    Self {
      states: features
        .iter()
        .filter_map(|f| {
          let code = f.code.clone()?;
          let state = RenderState::new(active.contains(&code));
          Some((code, state))
        })
        .collect(),
      hovered: None,
    }
  }

  /// Current state of a feature. Unknown codes degrade to `Default`.
  #[must_use]
  pub fn state_of(&self, code: &CountryCode) -> RenderState {
    self.states.get(code).copied().unwrap_or_default()
  }

  #[must_use]
  pub fn hovered(&self) -> Option<&CountryCode> {
    self.hovered.as_ref()
  }

  /// Moves the pointer onto `code`. Hovering the already-hovered feature is
  /// a no-op; hovering a new one implicitly unhovers the previous feature.
  /// Returns the restyles this transition caused, in apply order.
  pub fn hover(&mut self, code: &CountryCode) -> Vec<Restyle> {
    if self.hovered.as_ref() == Some(code) {
      return Vec::new();
    }

    let mut changes = Vec::new();
    if let Some(restyle) = self.clear() {
      changes.push(restyle);
    }

    if let Some(state) = self.states.get_mut(code) {
      *state = state.hovered();
      self.hovered = Some(code.clone());
      changes.push(Restyle {
        code: code.clone(),
        state: *state,
      });
    }
    changes
  }

  /// Moves the pointer off `code`. Unhovering an idle feature is a no-op.
  pub fn unhover(&mut self, code: &CountryCode) -> Option<Restyle> {
    if self.hovered.as_ref() != Some(code) {
      return None;
    }
    self.clear()
  }

  /// Pointer left the map entirely.
  pub fn clear(&mut self) -> Option<Restyle> {
    let code = self.hovered.take()?;
    let state = self.states.get_mut(&code)?;
    *state = state.idle();
    Some(Restyle {
      code,
      state: *state,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::map::boundary::CountryFeature;
  use crate::map::coordinates::PixelCoordinate;

  fn feature(code: &str) -> CountryFeature {
    CountryFeature {
      code: CountryCode::new(code),
      name: code.to_string(),
      polygons: vec![vec![
        PixelCoordinate::new(0., 0.),
        PixelCoordinate::new(1., 0.),
        PixelCoordinate::new(1., 1.),
      ]],
    }
  }

  fn table() -> HighlightTable {
    let features = vec![feature("US"), feature("GB"), feature("BR")];
    let active = ActiveCountrySet::from_codes(["US", "GB", "DE", "FR", "AU", "JP", "SG"]);
    HighlightTable::new(&features, &active)
  }

  fn code(c: &str) -> CountryCode {
    CountryCode::new(c).unwrap()
  }

  #[test]
  fn hover_transitions_only_the_target() {
    let mut table = table();
    let changes = table.hover(&code("US"));
    assert_eq!(
      changes,
      vec![Restyle {
        code: code("US"),
        state: RenderState::ActiveHovered
      }]
    );
    assert_eq!(table.state_of(&code("US")), RenderState::ActiveHovered);
    assert_eq!(table.state_of(&code("GB")), RenderState::Active);
    assert_eq!(table.state_of(&code("BR")), RenderState::Default);
  }

  #[test]
  fn hover_then_unhover_round_trips() {
    let mut table = table();
    let before = table.state_of(&code("US"));
    table.hover(&code("US"));
    table.unhover(&code("US"));
    assert_eq!(table.state_of(&code("US")), before);
    assert_eq!(table.hovered(), None);
  }

  #[test]
  fn inactive_country_cycles_default_states() {
    let mut table = table();
    table.hover(&code("BR"));
    assert_eq!(table.state_of(&code("BR")), RenderState::DefaultHovered);
    table.unhover(&code("BR"));
    assert_eq!(table.state_of(&code("BR")), RenderState::Default);
  }

  #[test]
  fn transitions_are_idempotent() {
    let mut table = table();
    table.hover(&code("US"));
    assert!(table.hover(&code("US")).is_empty());
    table.unhover(&code("US"));
    assert!(table.unhover(&code("US")).is_none());
    assert!(table.clear().is_none());
  }

  #[test]
  fn moving_between_features_unhovers_the_previous() {
    let mut table = table();
    table.hover(&code("US"));
    let changes = table.hover(&code("GB"));
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].code, code("US"));
    assert_eq!(changes[0].state, RenderState::Active);
    assert_eq!(changes[1].code, code("GB"));
    assert_eq!(changes[1].state, RenderState::ActiveHovered);
    assert_eq!(table.hovered(), Some(&code("GB")));
  }

  #[test]
  fn codeless_features_are_not_tracked() {
    let features = vec![
      feature("US"),
      CountryFeature {
        code: None,
        name: "Nowhere".to_string(),
        polygons: vec![vec![
          PixelCoordinate::new(0., 0.),
          PixelCoordinate::new(1., 0.),
          PixelCoordinate::new(1., 1.),
        ]],
      },
    ];
    let active = ActiveCountrySet::from_codes(["US"]);
    let table = HighlightTable::new(&features, &active);
    assert_eq!(table.state_of(&code("US")), RenderState::Active);
    assert_eq!(table.hovered(), None);
  }

  #[test]
  fn unknown_code_is_ignored() {
    let mut table = table();
    assert!(table.hover(&code("XX")).is_empty());
    assert_eq!(table.hovered(), None);
    assert_eq!(table.state_of(&code("XX")), RenderState::Default);
  }
}
