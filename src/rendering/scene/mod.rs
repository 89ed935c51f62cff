//! Turns resolved asset graphs into scenes. [`assembler::SceneAssembler`] walks the graph and
//! drives any [`assembler::SceneBuilder`], [`graph::SceneGraph`] is the builder used by the CLI.
pub mod assembler;
pub mod graph;
pub mod obj_export;
