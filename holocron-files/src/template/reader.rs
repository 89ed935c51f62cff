use std::collections::HashMap;
use std::io::Read;

use byteorder::ReadBytesExt;

use crate::ParserError;
use crate::common::iff::{IffForm, IffNode};
use crate::common::reader::read_cstring;
use crate::common::types::{Tag, tag_str};
use crate::template::types::{AppearanceAsset, ObjectTemplateAsset, TemplateKind};

const APT: Tag = *b"APT ";
const APT_VERSION: Tag = *b"0000";

pub struct AppearanceReader {}

impl AppearanceReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<AppearanceAsset, ParserError> {
        let root = IffForm::read_root(rdr, &APT)?;
        let path = root
            .version(&[APT_VERSION])?
            .get_mandatory_chunk_by_name::<String>(b"NAME")?;
        Ok(AppearanceAsset { path })
    }
}

pub struct ObjectTemplateReader {}

impl ObjectTemplateReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<ObjectTemplateAsset, ParserError> {
        let root = match IffNode::read(rdr)? {
            IffNode::Form(form) => form,
            IffNode::Chunk(chunk) => {
                return Err(ParserError::InvalidMagicValue {
                    expected: "FORM".into(),
                    found: chunk.tag_str(),
                });
            }
        };

        let kind = match &root.form_type {
            b"STAT" => TemplateKind::Static,
            b"STOT" => TemplateKind::Tangible,
            b"SBOT" => TemplateKind::Building,
            other => {
                return Err(ParserError::InvalidMagicValue {
                    expected: "STAT, STOT or SBOT".into(),
                    found: tag_str(other),
                });
            }
        };

        let mut asset = ObjectTemplateAsset {
            kind,
            base_template: None,
            parameters: HashMap::new(),
        };
        collect_parameters(&root, &mut asset)?;
        Ok(asset)
    }
}

/// Walks the whole tree in document order, later assignments replace earlier ones.
fn collect_parameters(form: &IffForm, asset: &mut ObjectTemplateAsset) -> Result<(), ParserError> {
    for node in &form.children {
        match node {
            IffNode::Form(sub) => collect_parameters(sub, asset)?,
            IffNode::Chunk(chunk) if &chunk.tag == b"XXXX" => {
                let mut rdr = chunk.reader();
                let key = read_cstring(&mut rdr)?;
                let value = match rdr.read_u8()? {
                    0 => None,
                    _ => Some(read_cstring(&mut rdr)?).filter(|value| !value.is_empty()),
                };
                asset.parameters.insert(key, value);
            }
            IffNode::Chunk(chunk) if &chunk.tag == b"DERV" => {
                let base = chunk.parse::<String>()?;
                asset.base_template = Some(base).filter(|base| !base.is_empty());
            }
            IffNode::Chunk(_) => {}
        }
    }
    Ok(())
}
