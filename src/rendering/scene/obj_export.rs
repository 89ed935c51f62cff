use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use glam::{Affine3A, Vec3};
use itertools::Itertools;

use crate::rendering::common::coordinate_systems::{map_to_world, world_to_obj};
use crate::rendering::common::types::{GeometryDescription, HeightfieldDescription};
use crate::rendering::scene::graph::{SceneGraph, SceneNode};

/// Flattens scene nodes into a single Wavefront OBJ stream. Shared nodes are written once per
/// instance with their accumulated transform. Only the first (closest) detail level is exported and
/// skeletons are skipped.
pub struct ObjWriter<W: Write> {
    out: W,
    /// OBJ indices are 1-based and global to the file
    next_vertex: u32,
    objects: usize,
}

impl<W: Write> ObjWriter<W> {
    pub fn new(out: W) -> Self {
        ObjWriter {
            out,
            next_vertex: 1,
            objects: 0,
        }
    }

    pub fn objects(&self) -> usize {
        self.objects
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_node(&mut self, node: &SceneNode, transform: Affine3A) -> std::io::Result<()> {
        match node {
            SceneNode::Geometry(geometry) => self.write_geometry(geometry, transform),
            SceneNode::Group { children, .. } => children
                .iter()
                .try_for_each(|(local, child)| self.write_node(child, transform * *local)),
            SceneNode::LevelOfDetail { levels, .. } => match levels.first() {
                Some((_, _, closest)) => self.write_node(closest, transform),
                None => Ok(()),
            },
            SceneNode::Skeleton { .. } => Ok(()),
            SceneNode::Heightfield { name, heightfield } => self.write_heightfield(name, heightfield, transform),
        }
    }

    fn begin_object(&mut self, name: &str) -> std::io::Result<()> {
        self.objects += 1;
        // OBJ names end at the first whitespace
        writeln!(self.out, "o {}", name.split_whitespace().join("_"))
    }

    fn write_position(&mut self, position: Vec3, transform: Affine3A) -> std::io::Result<()> {
        let v = world_to_obj(transform.transform_point3(position));
        writeln!(self.out, "v {} {} {}", v.x, v.y, v.z)
    }

    /// Mirroring into OBJ space flips the winding, so every triangle is written reversed.
    fn write_faces(&mut self, indices: &[u32], with_uv: bool, with_normal: bool) -> std::io::Result<()> {
        let base = self.next_vertex;
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[2], tri[1]].map(|idx| idx + base);
            match (with_uv, with_normal) {
                (true, true) => writeln!(self.out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?,
                (true, false) => writeln!(self.out, "f {a}/{a} {b}/{b} {c}/{c}")?,
                (false, true) => writeln!(self.out, "f {a}//{a} {b}//{b} {c}//{c}")?,
                (false, false) => writeln!(self.out, "f {a} {b} {c}")?,
            }
        }
        Ok(())
    }

    fn write_geometry(&mut self, geometry: &GeometryDescription, transform: Affine3A) -> std::io::Result<()> {
        let buffers = &geometry.vertex_buffers;
        let count = buffers.vertex_count();
        // Attribute indices follow the position indices, so partial attributes can't be written
        let with_uv = buffers.texcoords(0).len() == count;
        let with_normal = buffers.normals_buffer.len() == count;

        self.begin_object(&geometry.name)?;
        for position in &buffers.position_buffer {
            self.write_position(*position, transform)?;
        }
        if with_uv {
            for uv in buffers.texcoords(0) {
                writeln!(self.out, "vt {} {}", uv.x, 1.0 - uv.y)?;
            }
        }
        if with_normal {
            for normal in &buffers.normals_buffer {
                let n = world_to_obj(transform.transform_vector3(*normal).normalize_or_zero());
                writeln!(self.out, "vn {} {} {}", n.x, n.y, n.z)?;
            }
        }

        self.write_faces(&geometry.index_buffer, with_uv, with_normal)?;
        self.next_vertex += count as u32;
        Ok(())
    }

    fn write_heightfield(
        &mut self,
        name: &str,
        heightfield: &HeightfieldDescription,
        transform: Affine3A,
    ) -> std::io::Result<()> {
        let (rows, cols) = (heightfield.rows, heightfield.cols);
        self.begin_object(name)?;
        for row in 0..rows {
            for col in 0..cols {
                let height = heightfield.height(row, col).unwrap_or(0.0);
                let position = map_to_world(heightfield.position(row, col), height);
                self.write_position(position, transform)?;
            }
        }

        let mut indices = Vec::with_capacity(rows.saturating_sub(1) * cols.saturating_sub(1) * 6);
        for row in 1..rows {
            for col in 1..cols {
                let [a, b, c, d] = [
                    (row - 1) * cols + col - 1,
                    (row - 1) * cols + col,
                    row * cols + col - 1,
                    row * cols + col,
                ]
                .map(|idx| idx as u32);
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        self.write_faces(&indices, false, false)?;
        self.next_vertex += (rows * cols) as u32;
        Ok(())
    }
}

/// Writes every root of `graph` into a new OBJ file at `path`.
pub fn export_obj(path: &Path, graph: &SceneGraph) -> Result<usize, anyhow::Error> {
    profiling::scope!("export_obj");
    let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
    let mut writer = ObjWriter::new(BufWriter::new(file));
    writeln!(writer.out, "# holocron {}", env!("CARGO_PKG_VERSION"))?;

    for root in graph.roots() {
        writer
            .write_node(root, Affine3A::IDENTITY)
            .with_context(|| format!("Writing {} to {}", root.name(), path.display()))?;
    }

    let objects = writer.objects();
    writer
        .into_inner()
        .flush()
        .with_context(|| format!("Writing {}", path.display()))?;
    log::info!("Exported {} objects to {}", objects, path.display());
    Ok(objects)
}
