/// Country boundary data model and loader.
pub mod boundary;
/// Contains everything needed to handle coordinates.
pub mod coordinates;
/// Tracks which country is hovered.
pub mod highlight;
/// Builds popup content from the researcher dataset.
pub mod popup;
/// The map widget.
pub mod researchmap_egui;
/// Resolves per-country styles.
pub mod style;
