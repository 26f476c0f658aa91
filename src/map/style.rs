use egui::Color32;

use crate::config::MapTheme;

/// Transient interaction status of one boundary feature. This is the only
/// mutable state in the map core; it lives exactly as long as the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderState {
  #[default]
  Default,
  Active,
  DefaultHovered,
  ActiveHovered,
}

impl RenderState {
  #[must_use]
  pub fn new(active: bool) -> Self {
    if active {
      RenderState::Active
    } else {
      RenderState::Default
    }
  }

  /// The hovered variant of this state. Idempotent.
  #[must_use]
  pub fn hovered(self) -> Self {
    match self {
      RenderState::Default | RenderState::DefaultHovered => RenderState::DefaultHovered,
      RenderState::Active | RenderState::ActiveHovered => RenderState::ActiveHovered,
    }
  }

  /// The non-hovered variant of this state. Idempotent.
  #[must_use]
  pub fn idle(self) -> Self {
    match self {
      RenderState::Default | RenderState::DefaultHovered => RenderState::Default,
      RenderState::Active | RenderState::ActiveHovered => RenderState::Active,
    }
  }

  #[must_use]
  pub fn is_hovered(self) -> bool {
    matches!(self, RenderState::DefaultHovered | RenderState::ActiveHovered)
  }

  #[must_use]
  pub fn is_active(self) -> bool {
    matches!(self, RenderState::Active | RenderState::ActiveHovered)
  }
}

/// The resolved visual style of one country.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryStyle {
  pub fill: Color32,
  pub border: Color32,
  pub weight: f32,
  /// Dash and gap length; `None` draws a solid border.
  pub dash: Option<(f32, f32)>,
}

fn with_opacity(color: Color32, opacity: f32) -> Color32 {
  color.gamma_multiply(opacity)
}

/// Maps a render state to a style. Pure and deterministic so that
/// hover/unhover cycles are idempotent and replayable.
#[must_use]
pub fn resolve_style(state: RenderState, theme: &MapTheme) -> CountryStyle {
  match state {
    RenderState::Default => CountryStyle {
      fill: with_opacity(theme.fill, theme.fill_opacity_default),
      border: with_opacity(theme.border_default, theme.border_opacity_default),
      weight: theme.weight_default,
      dash: Some(theme.dash_pattern),
    },
    RenderState::Active => CountryStyle {
      fill: with_opacity(theme.fill, theme.fill_opacity_active),
      border: theme.border_active,
      weight: theme.weight_active,
      dash: None,
    },
    RenderState::DefaultHovered => CountryStyle {
      fill: with_opacity(theme.fill, theme.fill_opacity_default_hover),
      border: theme.border_hover,
      weight: theme.weight_hover,
      dash: None,
    },
    RenderState::ActiveHovered => CountryStyle {
      fill: with_opacity(theme.fill, theme.fill_opacity_active_hover),
      border: theme.border_active,
      weight: theme.weight_hover,
      dash: None,
    },
  }
}
