//! This module contains the directed acyclic graph that is built while resolving an asset and
//! everything it references, and the caches that deduplicate it.
//!
//! Records only name their dependencies by logical path (a compound names its parts, a mesh names
//! one shader per primitive set, a shader names its textures). Resolving a path means fetching its
//! bytes from the archives, sniffing and decoding the record and then resolving every referenced
//! path in turn, depth-first. The result is an [`nodes::AssetNode`] behind an [`std::sync::Arc`].
//!
//! Deduplication is the main goal: whoever requests a path first generates it, every later request
//! gets a clone of the same [`std::sync::Arc`] without touching the archives again. A child that is
//! referenced from multiple parents (the same crate mesh in dozens of compounds, the same shader
//! on hundreds of meshes) exists exactly once. There are three caches in an
//! [`repository::AssetRepository`]: scene nodes, shaders and textures.
//!
//! Resolution is thread-safe. Every cache entry carries its own lock that is held while the entry
//! is generated, so concurrent first requests for the same path block on that lock instead of
//! racing, and the path is decoded once. Entries of different paths don't contend.
//!
//! Note: Failures are never cached. A path that is missing from the archives or fails to decode
//! leaves its entry empty and the next request tries again. Within one resolution the failing
//! child is logged and left out of its parent, the parent itself still resolves.
//!
//! Note: The data is not guaranteed to be acyclic. The repository tracks the paths that are being
//! generated on the current call stack and a path that references itself (directly or through
//! other files) resolves to no child at the point where the cycle closes.
//! Cycles that only close across two threads resolving different entry points would block both
//! threads on each other's entry lock, this is not detected.
//!
//! Nothing here knows about rendering. Turning the graph into a scene is the job of
//! [`crate::rendering::scene`], which walks the graph and hands it to a scene builder.
pub mod error;
pub mod nodes;
pub mod repository;
pub mod resolver;

#[cfg(test)]
mod tests;
