use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use holocron_files::Record;
use holocron_files::shader::types::ShaderAsset;
use holocron_files::sniff::{DecoderRegistry, RecordKind};
use holocron_files::world::types::WorldNode;
use itertools::Itertools;
use log::{debug, error, warn};

use crate::io::common::loader::{RawAssetLoader, normalize_path};
use crate::rendering::asset_graph::error::AssetError;
use crate::rendering::asset_graph::nodes::{
    AssetNode, CompoundNode, GroupNode, InteriorChild, InteriorLayoutNode, LodLevelNode, LodNode, MeshNode,
    PlacedChild, ShaderNode, SkeletalMeshNode, SkeletonNode, TerrainNode, WorldObjectNode, WorldSnapshotNode,
};
use crate::rendering::asset_graph::resolver::Resolver;
use crate::rendering::common::coordinate_systems;
use crate::rendering::common::types::TextureImage;
use crate::rendering::loader::texture_loader::TextureDecoder;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RepositoryStats {
    pub nodes: usize,
    pub shaders: usize,
    pub textures: usize,
    /// Requests to the loader, every cache miss is one
    pub fetches: usize,
}

/// The paths currently being generated on this call stack, outermost first.
#[derive(Default)]
struct ResolveChain {
    paths: Vec<String>,
}

impl ResolveChain {
    fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Owns the load caches of one session and resolves logical paths into shared [`AssetNode`]s.
///
/// Every path is generated at most once, repeated and concurrent requests share the same `Arc`.
/// Children that fail to load are logged and left out of their parent, only the requested path
/// itself reports errors (see [`AssetRepository::try_load_file`]).
pub struct AssetRepository<L: RawAssetLoader> {
    loader: L,
    registry: DecoderRegistry,
    texture_decoder: Box<dyn TextureDecoder>,
    nodes: Resolver<AssetNode>,
    shaders: Resolver<ShaderNode>,
    textures: Resolver<TextureImage>,
    fetches: AtomicUsize,
}

impl<L: RawAssetLoader> AssetRepository<L> {
    pub fn new(loader: L, texture_decoder: Box<dyn TextureDecoder>) -> Self {
        AssetRepository {
            loader,
            registry: DecoderRegistry::default(),
            texture_decoder,
            nodes: Resolver::new(),
            shaders: Resolver::new(),
            textures: Resolver::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn stats(&self) -> RepositoryStats {
        RepositoryStats {
            nodes: self.nodes.len(),
            shaders: self.shaders.len(),
            textures: self.textures.len(),
            fetches: self.fetches.load(Ordering::Relaxed),
        }
    }

    /// Resolves `path` and everything it references. Failures are logged and yield `None`.
    pub fn load_file(&self, path: &str) -> Option<Arc<AssetNode>> {
        self.resolve_node(path, &mut ResolveChain::default())
    }

    /// Like [`AssetRepository::load_file`], but reports why `path` itself could not be loaded.
    /// `Ok(None)` for record types that are deliberately ignored.
    pub fn try_load_file(&self, path: &str) -> Result<Option<Arc<AssetNode>>, AssetError> {
        self.try_resolve_node(path, &mut ResolveChain::default())
    }

    pub fn load_shader(&self, path: &str) -> Option<Arc<ShaderNode>> {
        self.try_load_shader(path).unwrap_or_else(|err| {
            report(&err);
            None
        })
    }

    pub fn try_load_shader(&self, path: &str) -> Result<Option<Arc<ShaderNode>>, AssetError> {
        profiling::scope!("AssetRepository::load_shader");
        let path = normalize_path(path);
        self.shaders.resolve(&path, || match self.decode(&path)? {
            Some((_, Record::Shader(shader))) => Ok(Some(self.build_shader(&path, shader))),
            Some((kind, _)) => Err(AssetError::NotAShader {
                path: path.to_string(),
                kind,
            }),
            None => Ok(None),
        })
    }

    pub fn load_texture(&self, path: &str) -> Option<Arc<TextureImage>> {
        profiling::scope!("AssetRepository::load_texture");
        let path = normalize_path(path);
        self.textures
            .resolve(&path, || {
                let bytes = self.fetch(&path)?;
                Ok(self.texture_decoder.decode(&path, &bytes))
            })
            .unwrap_or_else(|err| {
                report(&err);
                None
            })
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.loader
            .load_raw_owned(path)
            .ok_or_else(|| AssetError::EntryNotFound { path: path.to_owned() })
    }

    fn decode(&self, path: &str) -> Result<Option<(RecordKind, Record)>, AssetError> {
        profiling::scope!("AssetRepository::decode");
        let bytes = self.fetch(path)?;
        self.registry
            .decode(Cursor::new(bytes))
            .map_err(|err| AssetError::from_parser(path, err))
    }

    fn resolve_node(&self, path: &str, chain: &mut ResolveChain) -> Option<Arc<AssetNode>> {
        self.try_resolve_node(path, chain).unwrap_or_else(|err| {
            report(&err);
            None
        })
    }

    fn try_resolve_node(&self, path: &str, chain: &mut ResolveChain) -> Result<Option<Arc<AssetNode>>, AssetError> {
        let path = normalize_path(path);
        if chain.contains(&path) {
            warn!("Cyclic reference to {} via {}", path, chain.paths.iter().join(" -> "));
            return Ok(None);
        }

        self.nodes.resolve(&path, || self.generate_node(&path, chain))
    }

    fn generate_node(&self, path: &str, chain: &mut ResolveChain) -> Result<Option<AssetNode>, AssetError> {
        profiling::scope!("AssetRepository::generate_node");
        let Some((kind, record)) = self.decode(path)? else {
            debug!("Ignoring {}", path);
            return Ok(None);
        };
        debug!(
            "Decoded {} as {:?}, referencing {} files",
            path,
            kind,
            record.references().len()
        );

        chain.paths.push(path.to_owned());
        let node = self.build_node(path, kind, record, chain);
        chain.paths.pop();
        Ok(Some(node))
    }

    fn build_node(&self, path: &str, kind: RecordKind, record: Record, chain: &mut ResolveChain) -> AssetNode {
        let path_owned = path.to_owned();
        match record {
            Record::Mesh(mesh) => {
                if mesh.violations() > 0 {
                    warn!("{} has {} out of range indices", path, mesh.violations());
                }
                let shaders = mesh
                    .tables
                    .iter()
                    .map(|table| self.load_shader(&table.shader))
                    .collect_vec();
                AssetNode::Mesh(MeshNode {
                    path: path_owned,
                    mesh,
                    shaders,
                })
            }
            Record::SkeletalMesh(mesh) => {
                let skeletons = mesh
                    .skeletons
                    .iter()
                    .filter_map(|skeleton| self.resolve_node(skeleton, chain))
                    .filter(|node| {
                        let is_skeleton = matches!(node.as_ref(), AssetNode::Skeleton(_));
                        if !is_skeleton {
                            warn!("{} references {}, which is not a skeleton", path, node.path());
                        }
                        is_skeleton
                    })
                    .collect_vec();
                let shaders = mesh
                    .primitives
                    .iter()
                    .map(|psdt| self.load_shader(&psdt.shader))
                    .collect_vec();
                AssetNode::SkeletalMesh(SkeletalMeshNode {
                    path: path_owned,
                    mesh,
                    skeletons,
                    shaders,
                })
            }
            Record::Compound(compound) => {
                let children = compound
                    .parts
                    .iter()
                    .filter_map(|part| {
                        self.resolve_node(&part.path, chain).map(|node| PlacedChild {
                            transform: coordinate_systems::affine(&part.transform),
                            node,
                        })
                    })
                    .collect_vec();
                AssetNode::Compound(CompoundNode {
                    path: path_owned,
                    children,
                })
            }
            Record::LevelOfDetail(lod) => {
                let levels = lod
                    .levels
                    .iter()
                    .filter_map(|level| {
                        self.resolve_node(&level.path, chain).map(|node| LodLevelNode {
                            near: level.near,
                            far: level.far,
                            node,
                        })
                    })
                    .collect_vec();
                AssetNode::LevelOfDetail(LodNode {
                    path: path_owned,
                    levels,
                })
            }
            Record::Skeleton(skeleton) => AssetNode::Skeleton(SkeletonNode {
                path: path_owned,
                skeleton,
            }),
            Record::Terrain(terrain) => AssetNode::Terrain(TerrainNode {
                path: path_owned,
                terrain,
            }),
            Record::WorldSnapshot(snapshot) => {
                let roots = snapshot
                    .roots
                    .iter()
                    .map(|object| self.world_object(object, chain))
                    .collect_vec();
                AssetNode::WorldSnapshot(WorldSnapshotNode {
                    path: path_owned,
                    roots,
                })
            }
            Record::InteriorLayout(layout) => {
                let children = layout
                    .nodes
                    .iter()
                    .filter_map(|node| {
                        self.resolve_node(&node.object, chain).map(|child| InteriorChild {
                            cell: node.cell.clone(),
                            transform: coordinate_systems::affine(&node.transform),
                            node: child,
                        })
                    })
                    .collect_vec();
                AssetNode::InteriorLayout(InteriorLayoutNode {
                    path: path_owned,
                    children,
                })
            }
            Record::Shader(shader) => {
                let node = self
                    .shaders
                    .get_or_insert_with(path, || self.build_shader(path, shader));
                AssetNode::Shader(node)
            }
            other => {
                let children = other
                    .references()
                    .into_iter()
                    .filter_map(|child| self.resolve_node(child, chain))
                    .collect_vec();
                AssetNode::Group(GroupNode {
                    path: path_owned,
                    kind,
                    children,
                })
            }
        }
    }

    fn world_object(&self, object: &WorldNode, chain: &mut ResolveChain) -> WorldObjectNode {
        WorldObjectNode {
            object_id: object.object_id,
            template: object.template.clone(),
            transform: coordinate_systems::placement(&object.rotation, &object.position),
            node: self.resolve_node(&object.template, chain),
            children: object
                .children
                .iter()
                .map(|child| self.world_object(child, chain))
                .collect_vec(),
        }
    }

    fn build_shader(&self, path: &str, shader: ShaderAsset) -> ShaderNode {
        let main_texture = shader
            .main_texture()
            .and_then(|binding| self.load_texture(&binding.path));
        let normal_texture = shader
            .normal_texture()
            .and_then(|binding| self.load_texture(&binding.path));

        ShaderNode {
            path: path.to_owned(),
            shader,
            main_texture,
            normal_texture,
        }
    }
}

fn report(err: &AssetError) {
    match err {
        AssetError::EntryNotFound { .. } | AssetError::UnrecognizedType { .. } | AssetError::NotAShader { .. } => {
            warn!("Skipping {}: {}", err.path(), err)
        }
        AssetError::Decode { .. } => error!("{}", err),
    }
}
