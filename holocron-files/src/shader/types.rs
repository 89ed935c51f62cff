use holocron_files_derive_parseable::Parse;

use crate::common::types::{CRgba, Tag};

pub const MAIN_TEXTURE: Tag = *b"MAIN";
pub const NORMAL_TEXTURE: Tag = *b"NRML";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderVariant {
    /// SWTS, a texture flip book on top of a base shader
    Animated,
    /// SSHT
    Static,
    /// CSHD, a static shader plus per object tint data
    Compiled,
}

#[derive(Debug, Copy, Clone, PartialEq, Parse)]
pub struct Material {
    pub ambient: CRgba,
    pub diffuse: CRgba,
    pub emissive: CRgba,
    pub specular: CRgba,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            ambient: CRgba::default(),
            diffuse: CRgba::default(),
            emissive: CRgba {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            specular: CRgba::default(),
            shininess: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    pub tag: Tag,
    pub unit: u8,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub time: f32,
    pub texture: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderAsset {
    pub variant: ShaderVariant,
    /// Only animated shaders name a base shader, it is not followed.
    pub base_shader: Option<String>,
    pub material: Material,
    pub textures: Vec<TextureBinding>,
    pub frames: Vec<AnimationFrame>,
}

impl ShaderAsset {
    pub fn texture(&self, tag: &Tag) -> Option<&TextureBinding> {
        self.textures.iter().find(|binding| &binding.tag == tag)
    }

    pub fn main_texture(&self) -> Option<&TextureBinding> {
        self.texture(&MAIN_TEXTURE)
    }

    pub fn normal_texture(&self) -> Option<&TextureBinding> {
        self.texture(&NORMAL_TEXTURE)
    }
}
