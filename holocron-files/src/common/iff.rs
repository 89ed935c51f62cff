use std::io::{Cursor, Read};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use crate::ParserError;
use crate::common::reader::Parseable;
use crate::common::types::{Tag, tag_str};

pub const FORM: Tag = *b"FORM";

/// Deepest FORM nesting accepted when reading. Real records stay well below ten levels.
pub const MAX_DEPTH: usize = 64;

/// A leaf node: tag plus opaque, little-endian payload.
#[derive(Debug, Clone, PartialEq)]
pub struct IffChunk {
    pub tag: Tag,
    pub data: Vec<u8>,
}

impl IffChunk {
    pub fn tag_str(&self) -> String {
        tag_str(&self.tag)
    }

    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.data)
    }

    pub fn parse<T: Parseable<T>>(&self) -> Result<T, ParserError> {
        T::parse(&mut self.reader())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IffForm {
    pub form_type: Tag,
    pub children: Vec<IffNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IffNode {
    Form(IffForm),
    Chunk(IffChunk),
}

impl IffNode {
    /// Reads exactly one node (recursively, when it is a FORM) from the stream. The size field is
    /// big-endian, contrary to everything inside of the chunks.
    pub fn read<R: Read>(rdr: &mut R) -> Result<IffNode, ParserError> {
        let tag = <[u8; 4]>::parse(rdr)?;
        let size = rdr.read_u32::<BigEndian>()? as u64;

        let mut data = Vec::new();
        rdr.take(size).read_to_end(&mut data)?;
        if (data.len() as u64) < size {
            return Err(ParserError::FormatError {
                reason: "Node overruns the end of the stream",
            });
        }

        IffNode::from_payload(tag, data, 0)
    }

    fn from_payload(tag: Tag, data: Vec<u8>, depth: usize) -> Result<IffNode, ParserError> {
        if tag != FORM {
            return Ok(IffNode::Chunk(IffChunk { tag, data }));
        }

        if depth >= MAX_DEPTH {
            return Err(ParserError::FormatError {
                reason: "FORMs are nested too deeply",
            });
        }

        if data.len() < 4 {
            return Err(ParserError::FormatError {
                reason: "FORM is too small to carry its type",
            });
        }

        let mut form_type = [0u8; 4];
        form_type.copy_from_slice(&data[..4]);
        Ok(IffNode::Form(IffForm {
            form_type,
            children: parse_children(&data[4..], depth + 1)?,
        }))
    }

    /// The chunk tag, or the form type for FORMs.
    pub fn tag(&self) -> Tag {
        match self {
            IffNode::Form(form) => form.form_type,
            IffNode::Chunk(chunk) => chunk.tag,
        }
    }

    pub fn as_form(&self) -> Option<&IffForm> {
        match self {
            IffNode::Form(form) => Some(form),
            IffNode::Chunk(_) => None,
        }
    }

    pub fn as_chunk(&self) -> Option<&IffChunk> {
        match self {
            IffNode::Chunk(chunk) => Some(chunk),
            IffNode::Form(_) => None,
        }
    }
}

fn parse_children(mut data: &[u8], depth: usize) -> Result<Vec<IffNode>, ParserError> {
    let mut children = Vec::new();
    while !data.is_empty() {
        if data.len() < 8 {
            return Err(ParserError::FormatError {
                reason: "Truncated node header",
            });
        }

        let mut tag = [0u8; 4];
        tag.copy_from_slice(&data[..4]);
        let size = BigEndian::read_u32(&data[4..8]) as usize;
        let end = size.checked_add(8).filter(|end| *end <= data.len()).ok_or(
            ParserError::FormatError {
                reason: "Node overruns its parent",
            },
        )?;

        children.push(IffNode::from_payload(tag, data[8..end].to_vec(), depth)?);
        data = &data[end..];
    }

    Ok(children)
}

impl IffForm {
    /// Reads the outermost FORM of a record and checks its type.
    pub fn read_root<R: Read>(rdr: &mut R, form_type: &Tag) -> Result<IffForm, ParserError> {
        match IffNode::read(rdr)? {
            IffNode::Form(form) if &form.form_type == form_type => Ok(form),
            IffNode::Form(form) => Err(ParserError::InvalidMagicValue {
                expected: tag_str(form_type),
                found: tag_str(&form.form_type),
            }),
            IffNode::Chunk(chunk) => Err(ParserError::InvalidMagicValue {
                expected: tag_str(&FORM),
                found: chunk.tag_str(),
            }),
        }
    }

    pub fn form_type_str(&self) -> String {
        tag_str(&self.form_type)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &IffChunk> {
        self.children.iter().filter_map(IffNode::as_chunk)
    }

    pub fn forms(&self) -> impl Iterator<Item = &IffForm> {
        self.children.iter().filter_map(IffNode::as_form)
    }

    pub fn chunks_named(&self, tag: &Tag) -> impl Iterator<Item = &IffChunk> {
        let tag = *tag;
        self.chunks().filter(move |chunk| chunk.tag == tag)
    }

    pub fn forms_named(&self, form_type: &Tag) -> impl Iterator<Item = &IffForm> {
        let form_type = *form_type;
        self.forms().filter(move |form| form.form_type == form_type)
    }

    pub fn chunk(&self, tag: &Tag) -> Option<&IffChunk> {
        self.chunks_named(tag).next()
    }

    pub fn form(&self, form_type: &Tag) -> Option<&IffForm> {
        self.forms_named(form_type).next()
    }

    pub fn mandatory_chunk(&self, tag: &Tag) -> Result<&IffChunk, ParserError> {
        self.chunk(tag).ok_or_else(|| ParserError::MissingChunk { tag: tag_str(tag) })
    }

    pub fn mandatory_form(&self, form_type: &Tag) -> Result<&IffForm, ParserError> {
        self.form(form_type).ok_or_else(|| ParserError::MissingChunk {
            tag: format!("FORM {}", tag_str(form_type)),
        })
    }

    pub fn get_mandatory_chunk_by_name<T: Parseable<T>>(&self, tag: &Tag) -> Result<T, ParserError> {
        self.mandatory_chunk(tag)?.parse::<T>()
    }

    pub fn get_optional_chunk_by_name<T: Parseable<T>>(&self, tag: &Tag) -> Result<Option<T>, ParserError> {
        self.chunk(tag).map(|chunk| chunk.parse::<T>()).transpose()
    }

    /// Records wrap their content into a FORM named after the version, e.g. `0005`. Returns that
    /// form when it is one of the `supported` versions.
    pub fn version(&self, supported: &[Tag]) -> Result<&IffForm, ParserError> {
        let version = self
            .forms()
            .find(|form| form.form_type.iter().all(u8::is_ascii_digit))
            .ok_or_else(|| ParserError::MissingChunk {
                tag: format!("version FORM inside {}", self.form_type_str()),
            })?;

        if !supported.contains(&version.form_type) {
            return Err(ParserError::UnexpectedForm {
                parent: self.form_type_str(),
                found: version.form_type_str(),
            });
        }

        Ok(version)
    }
}
