use std::io::Read;

use byteorder::ReadBytesExt;

use crate::ParserError;
use crate::common::iff::{IffForm, IffNode};
use crate::common::reader::{Parseable, read_cstring};
use crate::common::types::{Tag, tag_str};
use crate::shader::types::{AnimationFrame, MAIN_TEXTURE, Material, ShaderAsset, ShaderVariant, TextureBinding};

pub(crate) const SWTS: Tag = *b"SWTS";
pub(crate) const SSHT: Tag = *b"SSHT";
pub(crate) const CSHD: Tag = *b"CSHD";

type Recognizer = fn(&IffForm) -> Result<ShaderAsset, ParserError>;

/// Tried in this order, the first recognizer that claims the form wins.
const RECOGNIZERS: [(Tag, Recognizer); 3] = [
    (SWTS, parse_animated),
    (SSHT, parse_static),
    (CSHD, parse_compiled),
];

pub struct ShaderReader {}

impl ShaderReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<ShaderAsset, ParserError> {
        let root = match IffNode::read(rdr)? {
            IffNode::Form(form) => form,
            IffNode::Chunk(chunk) => {
                return Err(ParserError::InvalidMagicValue {
                    expected: "FORM".into(),
                    found: chunk.tag_str(),
                });
            }
        };

        let (_, recognizer) = RECOGNIZERS
            .iter()
            .find(|(form_type, _)| *form_type == root.form_type)
            .ok_or_else(|| ParserError::InvalidMagicValue {
                expected: "SWTS, SSHT or CSHD".into(),
                found: tag_str(&root.form_type),
            })?;

        recognizer(&root)
    }
}

fn parse_static(form: &IffForm) -> Result<ShaderAsset, ParserError> {
    let version = form.version(&[*b"0000"])?;

    let material = match version.form(b"MATS") {
        Some(mats) => mats
            .version(&[*b"0000"])?
            .get_optional_chunk_by_name::<Material>(b"MATL")?
            .unwrap_or_default(),
        None => Material::default(),
    };

    let mut textures = Vec::new();
    if let Some(txms) = version.form(b"TXMS") {
        for txm in txms.forms_named(b"TXM ") {
            let txm = txm.version(&[*b"0001"])?;
            let mut data = txm.mandatory_chunk(b"DATA")?.reader();
            let tag = <[u8; 4]>::parse(&mut data)?;
            let unit = data.read_u8()?;
            textures.push(TextureBinding {
                tag,
                unit,
                path: txm.get_mandatory_chunk_by_name::<String>(b"NAME")?,
            });
        }
    }

    Ok(ShaderAsset {
        variant: ShaderVariant::Static,
        base_shader: None,
        material,
        textures,
        frames: Vec::new(),
    })
}

fn parse_compiled(form: &IffForm) -> Result<ShaderAsset, ParserError> {
    let version = form.version(&[*b"0001"])?;
    let mut shader = parse_static(version.mandatory_form(&SSHT)?)?;
    shader.variant = ShaderVariant::Compiled;
    Ok(shader)
}

fn parse_animated(form: &IffForm) -> Result<ShaderAsset, ParserError> {
    let version = form.version(&[*b"0000"])?;
    let base_shader = version.get_optional_chunk_by_name::<String>(b"NAME")?;

    let frames = version
        .chunks_named(b"TEXT")
        .map(|chunk| {
            let mut rdr = chunk.reader();
            let _tag = <[u8; 4]>::parse(&mut rdr)?;
            Ok(AnimationFrame {
                time: f32::parse(&mut rdr)?,
                texture: read_cstring(&mut rdr)?,
            })
        })
        .collect::<Result<Vec<_>, ParserError>>()?;

    let textures = frames
        .first()
        .map(|frame| TextureBinding {
            tag: MAIN_TEXTURE,
            unit: 0,
            path: frame.texture.clone(),
        })
        .into_iter()
        .collect();

    Ok(ShaderAsset {
        variant: ShaderVariant::Animated,
        base_shader,
        material: Material::default(),
        textures,
        frames,
    })
}
