use glam::Vec4;
use holocron_files::common::types::{CArgb, CRgba};
use holocron_files::mesh::types::ShaderPrimitiveSet;
use holocron_files::skeletal_mesh::types::{PerShaderData, SkeletalMeshAsset};
use holocron_files::skeleton::types::SkeletonAsset;
use itertools::Itertools;

use crate::rendering::asset_graph::nodes::ShaderNode;
use crate::rendering::common::coordinate_systems;
use crate::rendering::common::types::{BoneDescription, GeometryDescription, MaterialDescription, VertexBuffers};

pub struct MeshImporter {}

impl MeshImporter {
    pub fn create_geometry(name: String, table: &ShaderPrimitiveSet, shader: Option<&ShaderNode>) -> GeometryDescription {
        let vertices = &table.vertices;
        let position_buffer = vertices.positions.iter().map(coordinate_systems::vec3).collect_vec();
        let normals_buffer = vertices.normals.iter().map(coordinate_systems::vec3).collect_vec();
        let texcoord_buffers = vertices
            .tex_coords
            .iter()
            .map(|set| set.iter().map(coordinate_systems::vec2).collect_vec())
            .collect_vec();

        GeometryDescription {
            name,
            vertex_buffers: VertexBuffers {
                position_buffer,
                normals_buffer,
                texcoord_buffers,
                vertex_color_0: vertices.colors.iter().map(rgba).collect_vec(),
            },
            index_buffer: table.valid_triangles().flatten().collect_vec(),
            material: shader.map(Self::create_material),
        }
    }

    /// Skinned vertices are indirections into the pools of the mesh, they are flattened here. Bone
    /// weights are not carried over.
    pub fn create_skinned_geometry(
        name: String,
        mesh: &SkeletalMeshAsset,
        primitive: &PerShaderData,
        shader: Option<&ShaderNode>,
    ) -> GeometryDescription {
        let position_buffer = mesh
            .vertex_positions(primitive)
            .map(|position| coordinate_systems::vec3(&position))
            .collect_vec();
        let count = position_buffer.len();

        // Attributes with dangling pool indices would misalign, those are dropped as a whole
        let normals_buffer = mesh
            .vertex_normals(primitive)
            .map(|normal| coordinate_systems::vec3(&normal))
            .collect_vec();
        let normals_buffer = if normals_buffer.len() == count { normals_buffer } else { Vec::new() };
        // Skinned meshes carry a single set
        let texcoord_buffers = if count > 0 && primitive.tex_coords.len() == count {
            vec![primitive.tex_coords.iter().map(coordinate_systems::vec2).collect_vec()]
        } else {
            Vec::new()
        };

        let index_buffer = primitive
            .valid_triangles()
            .filter(|tri| tri.iter().all(|&idx| (idx as usize) < count))
            .flatten()
            .collect_vec();

        GeometryDescription {
            name,
            vertex_buffers: VertexBuffers {
                position_buffer,
                normals_buffer,
                texcoord_buffers,
                vertex_color_0: Vec::new(),
            },
            index_buffer,
            material: shader.map(Self::create_material),
        }
    }

    pub fn create_material(shader: &ShaderNode) -> MaterialDescription {
        let material = &shader.shader.material;
        MaterialDescription {
            shader: shader.path.clone(),
            ambient: color(&material.ambient),
            diffuse: color(&material.diffuse),
            emissive: color(&material.emissive),
            specular: color(&material.specular),
            shininess: material.shininess,
            main_texture: shader.main_texture.clone(),
            main_texture_unit: shader.shader.main_texture().map(|binding| binding.unit),
            normal_texture: shader.normal_texture.clone(),
            normal_texture_unit: shader.shader.normal_texture().map(|binding| binding.unit),
        }
    }

    pub fn create_bones(skeleton: &SkeletonAsset) -> Vec<BoneDescription> {
        skeleton
            .bones
            .iter()
            .map(|bone| BoneDescription {
                name: bone.name.clone(),
                parent: bone.parent,
                rotation: coordinate_systems::quat(&bone.rotation()).normalize(),
                translation: coordinate_systems::vec3(&bone.translation),
            })
            .collect_vec()
    }
}

#[inline]
fn rgba(source: &CArgb) -> [u8; 4] {
    [source.r, source.g, source.b, source.a]
}

#[inline]
fn color(source: &CRgba) -> Vec4 {
    Vec4::new(source.r, source.g, source.b, source.a)
}
