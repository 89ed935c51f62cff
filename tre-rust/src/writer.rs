use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::archive::{HEADER_SIZE, RECORD_SIZE, TRE_MAGIC, TRE_VERSION};
use crate::compression::{COMPRESSION_NONE, COMPRESSION_ZLIB, deflate};
use crate::error::Error;

struct PendingFile {
    name: String,
    data: Vec<u8>,
    compress: bool,
}

/// Packs files into a TRE archive. Used to build patch archives and test fixtures; entry data is laid
/// out first, then the record table and the name block, the same order the client archives use.
#[derive(Default)]
pub struct ArchiveWriter {
    files: Vec<PendingFile>,
    compress_tables: bool,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compress_tables(mut self, compress: bool) -> Self {
        self.compress_tables = compress;
        self
    }

    pub fn add_file(&mut self, name: &str, data: &[u8], compress: bool) -> &mut Self {
        self.files.push(PendingFile {
            name: name.into(),
            data: data.to_vec(),
            compress,
        });
        self
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        let mut body = Vec::new();
        let mut toc = Vec::with_capacity(self.files.len() * RECORD_SIZE as usize);
        let mut names = Vec::new();

        for file in &self.files {
            let offset = HEADER_SIZE as usize + body.len();
            let (compression, stored) = match file.compress {
                true => (COMPRESSION_ZLIB, deflate(&file.data)?),
                false => (COMPRESSION_NONE, file.data.clone()),
            };

            toc.write_u32::<LittleEndian>(crc_of(&file.name))?;
            toc.write_u32::<LittleEndian>(file.data.len() as u32)?;
            toc.write_u32::<LittleEndian>(offset as u32)?;
            toc.write_u32::<LittleEndian>(compression)?;
            toc.write_u32::<LittleEndian>(stored.len() as u32)?;
            toc.write_u32::<LittleEndian>(names.len() as u32)?;

            names.extend_from_slice(file.name.as_bytes());
            names.push(0);
            body.extend_from_slice(&stored);
        }

        let (table_compression, toc_stored, names_stored) = match self.compress_tables {
            true => (COMPRESSION_ZLIB, deflate(&toc)?, deflate(&names)?),
            false => (COMPRESSION_NONE, toc, names.clone()),
        };

        w.write_all(&TRE_MAGIC)?;
        w.write_all(&TRE_VERSION)?;
        w.write_u32::<LittleEndian>(self.files.len() as u32)?;
        w.write_u32::<LittleEndian>(HEADER_SIZE + body.len() as u32)?;
        w.write_u32::<LittleEndian>(table_compression)?;
        w.write_u32::<LittleEndian>(toc_stored.len() as u32)?;
        w.write_u32::<LittleEndian>(table_compression)?;
        w.write_u32::<LittleEndian>(names_stored.len() as u32)?;
        w.write_u32::<LittleEndian>(names.len() as u32)?;
        w.write_all(&body)?;
        w.write_all(&toc_stored)?;
        w.write_all(&names_stored)?;
        Ok(())
    }
}

// The client hashes names with its own CRC variant; nothing on the reading side validates it.
fn crc_of(name: &str) -> u32 {
    name.bytes()
        .fold(0xFFFF_FFFFu32, |crc, b| crc.rotate_left(5) ^ b as u32)
}
