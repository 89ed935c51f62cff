//! In-memory archives and record builders for the tests of the asset graph and the scene adapter.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use holocron_files::ParserError;
use holocron_files::common::types::{C2Vector, C3Vector, C4Quaternion, CTransform, Tag};
use holocron_files::common::writer::{IffWriter, Writable, write_cstring};
use holocron_files::mesh::types::{IndexData, IndexWidth, MeshAsset, ShaderPrimitiveSet, VertexData, VertexFormat};
use holocron_files::mesh::writer::MeshWriter;

use crate::io::common::loader::RawAssetLoader;
use crate::rendering::asset_graph::repository::AssetRepository;
use crate::rendering::common::types::TextureImage;
use crate::rendering::loader::texture_loader::TextureDecoder;

#[derive(Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemoryLoader {
    pub fn with(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_owned(), bytes);
        self
    }

    /// How often `path` was requested, found or not.
    pub fn fetches(&self, path: &str) -> usize {
        let fetches = self.fetches.lock().unwrap_or_else(PoisonError::into_inner);
        fetches.get(path).copied().unwrap_or(0)
    }
}

impl RawAssetLoader for MemoryLoader {
    fn load_raw_owned(&self, path: &str) -> Option<Vec<u8>> {
        *self
            .fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_owned())
            .or_default() += 1;
        self.files.get(path).cloned()
    }
}

/// Every non-empty texture becomes a single pixel made of its first bytes.
pub struct PixelDecoder {}

impl TextureDecoder for PixelDecoder {
    fn decode(&self, _path: &str, bytes: &[u8]) -> Option<TextureImage> {
        let mut pixel = [0u8; 4];
        let len = bytes.len().min(4);
        pixel[..len].copy_from_slice(&bytes[..len]);
        (len > 0).then(|| TextureImage {
            width: 1,
            height: 1,
            data: pixel.to_vec(),
        })
    }
}

pub fn repository(loader: MemoryLoader) -> AssetRepository<MemoryLoader> {
    AssetRepository::new(loader, Box::new(PixelDecoder {}))
}

fn floats(c: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        c.extend_from_slice(&v.to_le_bytes());
    }
}

fn translation(offset: [f32; 3]) -> CTransform {
    let mut transform = CTransform::IDENTITY;
    for (row, value) in offset.into_iter().enumerate() {
        transform.rows[row][3] = value;
    }
    transform
}

pub fn empty_form(form_type: &Tag) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(form_type).end_form()?;
    iff.finish()
}

/// A single primitive set with positions, normals pointing up and one texture coordinate set.
pub fn mesh(shader: &str, positions: &[[f32; 3]], indices: &[u32]) -> Result<Vec<u8>, ParserError> {
    let count = positions.len();
    let asset = MeshAsset {
        appearance: None,
        tables: vec![ShaderPrimitiveSet {
            shader: shader.to_owned(),
            primitive_type: 9,
            vertices: VertexData {
                format: VertexFormat::from_bits_retain(0x1 | 0x4 | 0x100),
                count,
                positions: positions
                    .iter()
                    .map(|&[x, y, z]| C3Vector { x, y, z })
                    .collect(),
                normals: vec![C3Vector { x: 0.0, y: 1.0, z: 0.0 }; count],
                colors: Vec::new(),
                tex_coords: vec![
                    (0..count)
                        .map(|i| C2Vector {
                            x: i as f32,
                            y: 0.25,
                        })
                        .collect(),
                ],
            },
            indices: IndexData {
                width: IndexWidth::U16,
                indices: indices.to_vec(),
            },
            violations: Vec::new(),
        }],
    };

    let mut bytes = Vec::new();
    MeshWriter::write_asset(&asset, &mut bytes)?;
    Ok(bytes)
}

pub fn triangle(shader: &str) -> Result<Vec<u8>, ParserError> {
    mesh(shader, &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[0, 1, 2])
}

pub fn shader(main_texture: &str) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"SSHT").begin_form(b"0000");
    iff.begin_form(b"TXMS");
    iff.begin_form(b"TXM ").begin_form(b"0001");
    iff.chunk_with(b"DATA", |c| {
        c.extend_from_slice(b"MAIN");
        c.push(0);
        Ok(())
    })?;
    iff.chunk_with(b"NAME", |c| write_cstring(c, main_texture))?;
    iff.end_form()?.end_form()?;
    iff.end_form()?;
    iff.end_form()?.end_form()?;
    iff.finish()
}

pub fn compound(parts: &[(&str, [f32; 3])]) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"CMPA").begin_form(b"0005");
    for (path, offset) in parts {
        iff.chunk_with(b"PART", |c| {
            write_cstring(c, path)?;
            translation(*offset).write(c)
        })?;
    }
    iff.end_form()?.end_form()?;
    iff.finish()
}

/// (path, near, far)
pub fn detail(levels: &[(&str, f32, f32)]) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"DTLA").begin_form(b"0007");
    iff.chunk_with(b"INFO", |c| {
        for (id, (_, near, far)) in levels.iter().enumerate() {
            c.extend_from_slice(&(id as i32).to_le_bytes());
            floats(c, &[*near, *far]);
        }
        Ok(())
    })?;
    iff.begin_form(b"DATA");
    for (id, (path, _, _)) in levels.iter().enumerate() {
        iff.chunk_with(b"CHLD", |c| {
            c.extend_from_slice(&(id as i32).to_le_bytes());
            write_cstring(c, path)
        })?;
    }
    iff.end_form()?;
    iff.end_form()?.end_form()?;
    iff.finish()
}

/// (name, parent index or -1), every bone is rotated by 90 degrees around Y before and after.
pub fn skeleton(bones: &[(&str, i32)]) -> Result<Vec<u8>, ParserError> {
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let quarter_turn = C4Quaternion {
        x: 0.0,
        y: half,
        z: 0.0,
        w: half,
    };

    let mut iff = IffWriter::new();
    iff.begin_form(b"SKTM").begin_form(b"0002");
    iff.chunk_with(b"INFO", |c| {
        c.extend_from_slice(&(bones.len() as u32).to_le_bytes());
        Ok(())
    })?;
    iff.chunk_with(b"NAME", |c| bones.iter().try_for_each(|(name, _)| write_cstring(c, name)))?;
    iff.chunk_with(b"PRNT", |c| {
        for (_, parent) in bones {
            c.extend_from_slice(&parent.to_le_bytes());
        }
        Ok(())
    })?;
    iff.chunk_with(b"RPRE", |c| bones.iter().try_for_each(|_| quarter_turn.write(c)))?;
    iff.chunk_with(b"RPST", |c| bones.iter().try_for_each(|_| quarter_turn.write(c)))?;
    iff.chunk_with(b"BPTR", |c| {
        for (i, _) in bones.iter().enumerate() {
            floats(c, &[0.0, i as f32, 0.0]);
        }
        Ok(())
    })?;
    iff.end_form()?.end_form()?;
    iff.finish()
}

/// A skinned triangle using the first three positions of the pool.
pub fn skeletal_mesh(skeleton: &str, shader: &str) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"SKMG").begin_form(b"0004");
    iff.chunk_with(b"INFO", |c| {
        for v in [1u32, 3, 1, 1] {
            c.extend_from_slice(&v.to_le_bytes());
        }
        Ok(())
    })?;
    iff.chunk_with(b"SKTM", |c| write_cstring(c, skeleton))?;
    iff.chunk_with(b"POSN", |c| {
        floats(c, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        Ok(())
    })?;
    iff.chunk_with(b"NORM", |c| {
        floats(c, &[0.0, 0.0, 1.0]);
        Ok(())
    })?;

    iff.begin_form(b"PSDT");
    iff.chunk_with(b"NAME", |c| write_cstring(c, shader))?;
    iff.chunk_with(b"PIDX", |c| {
        c.extend_from_slice(&3u32.to_le_bytes());
        for idx in [0i32, 1, 2] {
            c.extend_from_slice(&idx.to_le_bytes());
        }
        Ok(())
    })?;
    iff.chunk_with(b"NIDX", |c| {
        for _ in 0..3 {
            c.extend_from_slice(&0i32.to_le_bytes());
        }
        Ok(())
    })?;
    iff.begin_form(b"PRIM");
    iff.chunk_with(b"INFO", |c| {
        c.extend_from_slice(&1u32.to_le_bytes());
        Ok(())
    })?;
    iff.chunk_with(b"ITL ", |c| {
        c.extend_from_slice(&1u32.to_le_bytes());
        for idx in [0i32, 1, 2] {
            c.extend_from_slice(&idx.to_le_bytes());
        }
        Ok(())
    })?;
    iff.end_form()?;
    iff.end_form()?;

    iff.end_form()?.end_form()?;
    iff.finish()
}

pub fn appearance(path: &str) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"APT ").begin_form(b"0000");
    iff.chunk_with(b"NAME", |c| write_cstring(c, path))?;
    iff.end_form()?.end_form()?;
    iff.finish()
}

/// (object id, parent id, template index), every object sits at x = object id.
pub fn snapshot(nodes: &[(u32, u32, u32)], templates: &[&str]) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"WSNP").begin_form(b"0001");
    iff.begin_form(b"NODS");
    for (object_id, parent_id, name_index) in nodes {
        iff.begin_form(b"NODE").begin_form(b"0000");
        iff.chunk_with(b"DATA", |c| {
            for v in [*object_id, *parent_id, *name_index, 0] {
                c.extend_from_slice(&v.to_le_bytes());
            }
            C4Quaternion::IDENTITY.write(c)?;
            floats(c, &[*object_id as f32, 0.0, 0.0, 1.0]);
            c.extend_from_slice(&0u32.to_le_bytes());
            Ok(())
        })?;
        iff.end_form()?.end_form()?;
    }
    iff.end_form()?;
    iff.chunk_with(b"OTNL", |c| {
        c.extend_from_slice(&(templates.len() as u32).to_le_bytes());
        templates.iter().try_for_each(|name| write_cstring(c, name))
    })?;
    iff.end_form()?.end_form()?;
    iff.finish()
}

/// A terrain without layers, flat at the water table. `None` clears the water flag and puts the
/// table at 0.
pub fn terrain(map_size: f32, water_height: Option<f32>) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"PTAT").begin_form(b"0001");
    iff.chunk_with(b"INFO", |c| {
        floats(c, &[map_size, water_height.unwrap_or(0.0)]);
        c.extend_from_slice(&(water_height.is_some() as u32).to_le_bytes());
        Ok(())
    })?;
    iff.end_form()?.end_form()?;
    iff.finish()
}
