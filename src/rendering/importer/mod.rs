/// This module converts the records from holocron-files into the intermediate representation of
/// [`crate::rendering::common::types`], which is what scene builders consume. Importers are pure
/// functions of already resolved data, they never touch the archives.
pub mod mesh_importer;
pub mod terrain_importer;
