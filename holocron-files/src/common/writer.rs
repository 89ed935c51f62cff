use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::ParserError;
use crate::common::iff::{FORM, IffNode};
use crate::common::types::{C2Vector, C3Vector, C4Quaternion, CArgb, CRgba, CTransform, Tag};

/// Counterpart of [`crate::common::reader::Parseable`] for the few types we encode again.
pub trait Writable {
    fn write<W: Write>(&self, w: &mut W) -> Result<(), ParserError>;
}

impl Writable for C3Vector {
    fn write<W: Write>(&self, w: &mut W) -> Result<(), ParserError> {
        w.write_f32::<LittleEndian>(self.x)?;
        w.write_f32::<LittleEndian>(self.y)?;
        w.write_f32::<LittleEndian>(self.z)?;
        Ok(())
    }
}

impl Writable for C2Vector {
    fn write<W: Write>(&self, w: &mut W) -> Result<(), ParserError> {
        w.write_f32::<LittleEndian>(self.x)?;
        w.write_f32::<LittleEndian>(self.y)?;
        Ok(())
    }
}

impl Writable for C4Quaternion {
    fn write<W: Write>(&self, w: &mut W) -> Result<(), ParserError> {
        for v in [self.w, self.x, self.y, self.z] {
            w.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}

impl Writable for CArgb {
    fn write<W: Write>(&self, w: &mut W) -> Result<(), ParserError> {
        w.write_all(&[self.a, self.r, self.g, self.b])?;
        Ok(())
    }
}

impl Writable for CRgba {
    fn write<W: Write>(&self, w: &mut W) -> Result<(), ParserError> {
        for v in [self.r, self.g, self.b, self.a] {
            w.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}

impl Writable for CTransform {
    fn write<W: Write>(&self, w: &mut W) -> Result<(), ParserError> {
        for v in self.rows.iter().flatten() {
            w.write_f32::<LittleEndian>(*v)?;
        }
        Ok(())
    }
}

pub fn write_cstring<W: Write>(w: &mut W, value: &str) -> Result<(), ParserError> {
    w.write_all(value.as_bytes())?;
    w.write_u8(0)?;
    Ok(())
}

/// Builds IFF trees in memory. FORMs are opened and closed explicitly, their sizes are patched in
/// when they are closed.
#[derive(Default)]
pub struct IffWriter {
    out: Vec<u8>,
    open_forms: Vec<(Tag, Vec<u8>)>,
}

impl IffWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn target(&mut self) -> &mut Vec<u8> {
        match self.open_forms.last_mut() {
            Some((_, buf)) => buf,
            None => &mut self.out,
        }
    }

    pub fn begin_form(&mut self, form_type: &Tag) -> &mut Self {
        self.open_forms.push((*form_type, Vec::new()));
        self
    }

    pub fn end_form(&mut self) -> Result<&mut Self, ParserError> {
        let (form_type, body) = self.open_forms.pop().ok_or(ParserError::FormatError {
            reason: "end_form without a matching begin_form",
        })?;

        let target = self.target();
        target.extend_from_slice(&FORM);
        target.write_u32::<BigEndian>(body.len() as u32 + 4)?;
        target.extend_from_slice(&form_type);
        target.extend_from_slice(&body);
        Ok(self)
    }

    pub fn chunk(&mut self, tag: &Tag, data: &[u8]) -> Result<&mut Self, ParserError> {
        let target = self.target();
        target.extend_from_slice(tag);
        target.write_u32::<BigEndian>(data.len() as u32)?;
        target.extend_from_slice(data);
        Ok(self)
    }

    /// Emits a chunk whose payload is produced by `f`.
    pub fn chunk_with<F>(&mut self, tag: &Tag, f: F) -> Result<&mut Self, ParserError>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), ParserError>,
    {
        let mut data = Vec::new();
        f(&mut data)?;
        self.chunk(tag, &data)
    }

    /// Re-emits an already parsed node unchanged.
    pub fn node(&mut self, node: &IffNode) -> Result<&mut Self, ParserError> {
        match node {
            IffNode::Chunk(chunk) => self.chunk(&chunk.tag, &chunk.data),
            IffNode::Form(form) => {
                self.begin_form(&form.form_type);
                for child in &form.children {
                    self.node(child)?;
                }
                self.end_form()
            }
        }
    }

    pub fn finish(self) -> Result<Vec<u8>, ParserError> {
        if !self.open_forms.is_empty() {
            return Err(ParserError::FormatError {
                reason: "Unbalanced FORM nesting",
            });
        }
        Ok(self.out)
    }
}
