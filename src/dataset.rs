use std::collections::HashSet;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::map::coordinates::WGS84Coordinate;

/// An ISO 3166-1 alpha-2 country code, the join key between researcher
/// records and boundary features.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
  /// Accepts exactly two ASCII letters, normalized to upper case.
  #[must_use]
  pub fn new(code: &str) -> Option<Self> {
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
      Some(Self(code.to_ascii_uppercase()))
    } else {
      None
    }
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CountryCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl TryFrom<String> for CountryCode {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    CountryCode::new(&value).ok_or_else(|| format!("not an ISO alpha-2 country code: {value:?}"))
  }
}

impl From<CountryCode> for String {
  fn from(code: CountryCode) -> Self {
    code.0
  }
}

/// One partner institution. Immutable input for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherLocation {
  pub id: u32,
  pub name: String,
  pub country: String,
  pub coordinates: WGS84Coordinate,
  pub country_code: CountryCode,
  pub website: String,
  pub city: String,
}

/// The set of country codes rendered with the accent styling. Read-only
/// after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveCountrySet {
  codes: HashSet<CountryCode>,
}

impl ActiveCountrySet {
  /// Derives the set from the researcher dataset.
  #[must_use]
  pub fn from_locations(locations: &[ResearcherLocation]) -> Self {
    Self {
      codes: locations.iter().map(|l| l.country_code.clone()).collect(),
    }
  }

  /// Builds the set from explicit codes, skipping malformed entries.
  #[must_use]
  pub fn from_codes<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
    Self {
      codes: codes
        .into_iter()
        .filter_map(|c| {
          let parsed = CountryCode::new(c);
          if parsed.is_none() {
            warn!("Ignoring malformed country code {c:?} in active set");
          }
          parsed
        })
        .collect(),
    }
  }

  #[must_use]
  pub fn contains(&self, code: &CountryCode) -> bool {
    self.codes.contains(code)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.codes.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.codes.is_empty()
  }
}

/// Logs data-contract violations. Nothing here is fatal: offending records
/// still render as far as possible.
pub fn log_contract_violations(locations: &[ResearcherLocation], active: &ActiveCountrySet) {
  for location in locations {
    if !location.coordinates.is_valid() {
      warn!(
        "Researcher record {} ({}) has out-of-range coordinates {:?}",
        location.id, location.name, location.coordinates
      );
    }
    if !active.contains(&location.country_code) {
      warn!(
        "Researcher record {} ({}) has country code {} outside the active set",
        location.id, location.name, location.country_code
      );
    }
  }
}

#[allow(clippy::too_many_arguments)]
fn location(
  id: u32,
  name: &str,
  country: &str,
  lat: f32,
  lon: f32,
  code: &str,
  website: &str,
  city: &str,
) -> ResearcherLocation {
  ResearcherLocation {
    id,
    name: name.to_string(),
    country: country.to_string(),
    coordinates: WGS84Coordinate::new(lat, lon),
    country_code: CountryCode::new(code).expect("static country code"),
    website: website.to_string(),
    city: city.to_string(),
  }
}

/// The partner institutions shown in the reference deployment.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn sample_locations() -> Vec<ResearcherLocation> {
  vec![
    location(
      1,
      "Dana-Farber Cancer Institute",
      "USA",
      42.3376,
      -71.1037,
      "US",
      "https://www.dana-farber.org",
      "Boston, Massachusetts, USA",
    ),
    location(
      2,
      "MD Anderson Cancer Center",
      "USA",
      29.7604,
      -95.3698,
      "US",
      "https://www.mdanderson.org",
      "Houston, Texas, USA",
    ),
    location(
      3,
      "National Cancer Institute – NIH",
      "USA",
      39.0029,
      -77.1043,
      "US",
      "https://www.cancer.gov",
      "Bethesda, Maryland, USA",
    ),
    location(
      4,
      "Memorial Sloan Kettering Cancer Center",
      "USA",
      40.7645,
      -73.9565,
      "US",
      "https://www.mskcc.org",
      "New York City, New York, USA",
    ),
    location(
      5,
      "Cancer Research UK",
      "United Kingdom",
      51.5259,
      -0.1289,
      "GB",
      "https://www.cancerresearchuk.org",
      "London, England, United Kingdom",
    ),
    location(
      6,
      "German Cancer Research Center – DKFZ",
      "Germany",
      49.4142,
      8.6750,
      "DE",
      "https://www.dkfz.de",
      "Heidelberg, Germany",
    ),
    location(
      7,
      "Institut Curie",
      "France",
      48.8453,
      2.3434,
      "FR",
      "https://institut-curie.org",
      "Paris, France",
    ),
    location(
      8,
      "Peter MacCallum Cancer Centre",
      "Australia",
      -37.8136,
      144.9631,
      "AU",
      "https://www.petermac.org",
      "Melbourne, Victoria, Australia",
    ),
    location(
      9,
      "RIKEN Center for Integrative Medical Sciences",
      "Japan",
      35.2288,
      139.1027,
      "JP",
      "https://www.riken.jp/en/research/labs/ims",
      "Yokohama, Kanagawa, Japan",
    ),
    location(
      10,
      "A*STAR Institute of Molecular and Cell Biology",
      "Singapore",
      1.2956,
      103.7877,
      "SG",
      "https://www.a-star.edu.sg/imcb",
      "Singapore, Singapore",
    ),
  ]
}
