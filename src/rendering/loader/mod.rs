/// Contrasting to the importers, that convert already resolved records into our scene IR,
/// loaders turn raw archive bytes into data. Only textures need this, records are decoded by
/// holocron-files.
pub mod texture_loader;
