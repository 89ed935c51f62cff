use std::io::ErrorKind::UnexpectedEof;
use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::types::{C4Quaternion, CArgb, CRgba, CTransform};

pub trait Parseable<T> {
    fn parse<R: Read>(rdr: &mut R) -> Result<T, ParserError>;
}

impl Parseable<C4Quaternion> for C4Quaternion {
    fn parse<R: Read>(rdr: &mut R) -> Result<C4Quaternion, ParserError> {
        // stored scalar first
        let w = rdr.read_f32::<LittleEndian>()?;
        Ok(C4Quaternion {
            x: rdr.read_f32::<LittleEndian>()?,
            y: rdr.read_f32::<LittleEndian>()?,
            z: rdr.read_f32::<LittleEndian>()?,
            w,
        })
    }
}

impl Parseable<CArgb> for CArgb {
    fn parse<R: Read>(rdr: &mut R) -> Result<CArgb, ParserError> {
        Ok(CArgb {
            a: rdr.read_u8()?,
            r: rdr.read_u8()?,
            g: rdr.read_u8()?,
            b: rdr.read_u8()?,
        })
    }
}

impl Parseable<CRgba> for CRgba {
    fn parse<R: Read>(rdr: &mut R) -> Result<CRgba, ParserError> {
        Ok(CRgba {
            r: rdr.read_f32::<LittleEndian>()?,
            g: rdr.read_f32::<LittleEndian>()?,
            b: rdr.read_f32::<LittleEndian>()?,
            a: rdr.read_f32::<LittleEndian>()?,
        })
    }
}

impl Parseable<CTransform> for CTransform {
    fn parse<R: Read>(rdr: &mut R) -> Result<CTransform, ParserError> {
        let mut rows = [[0.0f32; 4]; 3];
        for row in rows.iter_mut() {
            rdr.read_f32_into::<LittleEndian>(row)?;
        }
        Ok(CTransform { rows })
    }
}

impl Parseable<u8> for u8 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u8, ParserError> {
        Ok(rdr.read_u8()?)
    }
}

impl Parseable<u16> for u16 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u16, ParserError> {
        Ok(rdr.read_u16::<LittleEndian>()?)
    }
}

impl Parseable<i16> for i16 {
    fn parse<R: Read>(rdr: &mut R) -> Result<i16, ParserError> {
        Ok(rdr.read_i16::<LittleEndian>()?)
    }
}

impl Parseable<u32> for u32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u32, ParserError> {
        Ok(rdr.read_u32::<LittleEndian>()?)
    }
}

impl Parseable<i32> for i32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<i32, ParserError> {
        Ok(rdr.read_i32::<LittleEndian>()?)
    }
}

impl Parseable<f32> for f32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<f32, ParserError> {
        Ok(rdr.read_f32::<LittleEndian>()?)
    }
}

/// Four raw tag bytes, e.g. the texture tags inside shaders.
impl Parseable<[u8; 4]> for [u8; 4] {
    fn parse<R: Read>(rdr: &mut R) -> Result<[u8; 4], ParserError> {
        let mut tag = [0u8; 4];
        rdr.read_exact(&mut tag)?;
        Ok(tag)
    }
}

/// Strings are always NUL-terminated inside of chunks.
impl Parseable<String> for String {
    fn parse<R: Read>(rdr: &mut R) -> Result<String, ParserError> {
        read_cstring(rdr)
    }
}

pub fn read_cstring<R: Read>(rdr: &mut R) -> Result<String, ParserError> {
    let mut buf = Vec::new();
    loop {
        let c = rdr.read_u8()?;
        if c == 0 {
            return Ok(String::from_utf8(buf)?);
        }
        buf.push(c);
    }
}

/// Reads elements until the chunk is exhausted.
pub fn read_chunk_array<T: Parseable<T>, R: Read>(rdr: &mut R) -> Result<Vec<T>, ParserError> {
    let mut list = Vec::<T>::new();
    let mut element = T::parse(rdr);
    while element.is_ok() {
        list.push(element?);
        element = T::parse(rdr);
    }

    // weird error handling because when EoF, we get that inside a parser error.
    match element {
        Err(ParserError::IOError(internal)) if internal.kind() == UnexpectedEof => (),
        err => return err.map(|_| Vec::with_capacity(0)),
    };
    Ok(list)
}

/// Reads exactly `count` elements, a short read is an error.
pub fn read_array<T: Parseable<T>, R: Read>(rdr: &mut R, count: usize) -> Result<Vec<T>, ParserError> {
    // the count comes from the file, so don't trust it for the allocation
    let mut list = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        list.push(T::parse(rdr)?);
    }
    Ok(list)
}

/// Reads a `u32` element count followed by that many elements.
pub fn read_counted_array<T: Parseable<T>, R: Read>(rdr: &mut R) -> Result<Vec<T>, ParserError> {
    let count = rdr.read_u32::<LittleEndian>()?;
    read_array(rdr, count as usize)
}

/// Fails when a chunk carries more data than its parser consumed.
pub(crate) fn expect_exhausted<R: Read>(rdr: &mut R, reason: &'static str) -> Result<(), ParserError> {
    let mut rest = [0u8; 1];
    match rdr.read(&mut rest)? {
        0 => Ok(()),
        _ => Err(ParserError::FormatError { reason }),
    }
}
