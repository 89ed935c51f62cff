/// Assets and scenes don't agree on a coordinate system, this module converts between them.
/// Assets are left-handed with +Y up, the OBJ export mirrors X to become right-handed.
pub mod coordinate_systems;
/// basic types (e.g. geometry) to abstract away from both the asset format and the scene builder.
pub mod types;
