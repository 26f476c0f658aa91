pub mod config;
pub mod dataset;
pub mod map;
pub mod researchmap_ui;
