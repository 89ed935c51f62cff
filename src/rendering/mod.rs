pub mod asset_graph;
pub mod common;
pub mod importer;
pub mod loader;
pub mod scene;

#[cfg(test)]
pub(crate) mod fixtures;
