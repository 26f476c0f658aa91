use crate::dataset::{ActiveCountrySet, ResearcherLocation};
use crate::map::boundary::CountryFeature;

/// One institution line inside a country popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupEntry {
  pub name: String,
  pub website: String,
  pub city: String,
}

/// The content of a country popup: the country header and, for active
/// countries, the institutions hosted there in dataset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
  pub country: String,
  pub active: bool,
  pub institutions: Vec<PopupEntry>,
}

/// Escapes user-supplied text before it is inserted into any markup sink and
/// strips control characters. Keeps malformed dataset entries from injecting
/// markup into popups.
#[must_use]
pub fn sanitize(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c if c.is_control() => {}
      c => out.push(c),
    }
  }
  out
}

/// Builds the popup for a boundary feature. Pure: the same feature, dataset
/// and active set always produce the same content. An active country with no
/// matching researchers yields the header with an empty list; a feature
/// without a country code is never active.
#[must_use]
pub fn build_popup(
  feature: &CountryFeature,
  researchers: &[ResearcherLocation],
  active: &ActiveCountrySet,
) -> PopupContent {
  let is_active = feature.code.as_ref().is_some_and(|c| active.contains(c));
  let institutions = if is_active {
    researchers
      .iter()
      .filter(|r| Some(&r.country_code) == feature.code.as_ref())
      .map(|r| PopupEntry {
        name: sanitize(&r.name),
        website: r.website.clone(),
        city: sanitize(&r.city),
      })
      .collect()
  } else {
    Vec::new()
  };

  PopupContent {
    country: sanitize(&feature.name),
    active: is_active,
    institutions,
  }
}

/// Builds the popup of a single marker, independent of country popups.
#[must_use]
pub fn build_marker_popup(location: &ResearcherLocation) -> PopupEntry {
  PopupEntry {
    name: sanitize(&location.name),
    website: location.website.clone(),
    city: sanitize(&location.city),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::{CountryCode, sample_locations};
  use crate::map::coordinates::PixelCoordinate;

  fn feature(code: &str, name: &str) -> CountryFeature {
    CountryFeature {
      code: CountryCode::new(code),
      name: name.to_string(),
      polygons: vec![vec![
        PixelCoordinate::new(0., 0.),
        PixelCoordinate::new(1., 0.),
        PixelCoordinate::new(1., 1.),
      ]],
    }
  }

  fn active() -> ActiveCountrySet {
    ActiveCountrySet::from_locations(&sample_locations())
  }

  #[test]
  fn every_researcher_appears_exactly_once_in_their_country() {
    let locations = sample_locations();
    let active = active();
    for location in &locations {
      let popup = build_popup(
        &feature(location.country_code.as_str(), &location.country),
        &locations,
        &active,
      );
      let matching: Vec<_> = popup
        .institutions
        .iter()
        .filter(|e| e.name == sanitize(&location.name))
        .collect();
      assert_eq!(matching.len(), 1, "{}", location.name);
      assert_eq!(matching[0].website, location.website);
      assert_eq!(matching[0].city, sanitize(&location.city));
    }
  }

  #[test]
  fn institutions_keep_dataset_order() {
    let locations = sample_locations();
    let popup = build_popup(&feature("US", "United States"), &locations, &active());
    let names: Vec<_> = popup.institutions.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
      names,
      vec![
        "Dana-Farber Cancer Institute",
        "MD Anderson Cancer Center",
        "National Cancer Institute – NIH",
        "Memorial Sloan Kettering Cancer Center",
      ]
    );
  }

  #[test]
  fn active_country_without_researchers_gets_empty_list() {
    let locations = sample_locations();
    let active = ActiveCountrySet::from_codes(["US", "CA"]);
    let popup = build_popup(&feature("CA", "Canada"), &locations, &active);
    assert!(popup.active);
    assert!(popup.institutions.is_empty());
    assert_eq!(popup.country, "Canada");
  }

  #[test]
  fn inactive_country_gets_name_only() {
    let popup = build_popup(&feature("BR", "Brazil"), &sample_locations(), &active());
    assert!(!popup.active);
    assert!(popup.institutions.is_empty());
    assert_eq!(popup.country, "Brazil");
  }

  #[test]
  fn codeless_feature_is_never_active() {
    let mut codeless = feature("US", "Nowhere");
    codeless.code = None;
    let popup = build_popup(&codeless, &sample_locations(), &active());
    assert!(!popup.active);
    assert!(popup.institutions.is_empty());
    assert_eq!(popup.country, "Nowhere");
  }

  #[test]
  fn popup_building_is_deterministic() {
    let locations = sample_locations();
    let active = active();
    let f = feature("GB", "United Kingdom");
    assert_eq!(
      build_popup(&f, &locations, &active),
      build_popup(&f, &locations, &active)
    );
  }

  #[test]
  fn sanitize_escapes_markup_and_strips_control_chars() {
    assert_eq!(
      sanitize("<script>alert('x')</script>"),
      "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
    );
    assert_eq!(sanitize("a\u{0}b\r\nc"), "abc");
    assert_eq!(sanitize("Fish & Chips"), "Fish &amp; Chips");
  }

  #[test]
  fn malicious_dataset_text_is_escaped_in_popups() {
    let mut locations = sample_locations();
    locations[0].name = "<img src=x onerror=alert(1)>".to_string();
    let popup = build_popup(&feature("US", "United States"), &locations, &active());
    assert!(popup.institutions[0].name.starts_with("&lt;img"));
  }
}
