use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::compression::decompress;
use crate::error::Error;

pub(crate) const TRE_MAGIC: [u8; 4] = *b"EERT";
pub(crate) const TRE_VERSION: [u8; 4] = *b"5000";
pub(crate) const HEADER_SIZE: u32 = 36;
pub(crate) const RECORD_SIZE: u32 = 24;

#[derive(Debug)]
struct Header {
    record_count: u32,
    toc_offset: u32,
    toc_compression: u32,
    toc_stored_size: u32,
    names_compression: u32,
    names_stored_size: u32,
    names_size: u32,
}

impl Header {
    fn read<R: Read>(rdr: &mut R) -> Result<Header, Error> {
        let mut magic = [0u8; 4];
        rdr.read_exact(&mut magic)?;
        if magic != TRE_MAGIC {
            return Err(Error::InvalidMagic { magic });
        }

        let mut version = [0u8; 4];
        rdr.read_exact(&mut version)?;
        if version != TRE_VERSION {
            return Err(Error::UnsupportedVersion { version });
        }

        Ok(Header {
            record_count: rdr.read_u32::<LittleEndian>()?,
            toc_offset: rdr.read_u32::<LittleEndian>()?,
            toc_compression: rdr.read_u32::<LittleEndian>()?,
            toc_stored_size: rdr.read_u32::<LittleEndian>()?,
            names_compression: rdr.read_u32::<LittleEndian>()?,
            names_stored_size: rdr.read_u32::<LittleEndian>()?,
            names_size: rdr.read_u32::<LittleEndian>()?,
        })
    }
}

/// A single entry of an [`Archive`]. Cheap to clone, it only carries the table of contents data.
#[derive(Debug, Clone)]
pub struct File {
    name: String,
    crc: u32,
    size: u32,
    offset: u32,
    compression: u32,
    compressed_size: u32,
}

impl File {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Uncompressed size in bytes
    pub fn size(&self) -> u64 {
        self.size as u64
    }

    pub fn is_compressed(&self) -> bool {
        self.compression != 0
    }

    /// Reads the complete (decompressed) contents into `buf`, which has to be at least [`File::size`] long.
    pub fn read(&self, archive: &Archive, buf: &mut [u8]) -> Result<usize, Error> {
        let data = archive.read_entry(self)?;
        if buf.len() < data.len() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "buffer is smaller than the file",
            )));
        }

        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

/// One opened TRE file. The table of contents is read eagerly, entry contents only on request.
pub struct Archive {
    path: PathBuf,
    /// Size of the archive on disk, every stored block has to end before it
    size: u64,
    reader: Mutex<BufReader<fs::File>>,
    files: HashMap<String, File>,
}

impl Archive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Archive, Error> {
        let path = path.as_ref().to_path_buf();
        let mut reader = BufReader::new(fs::File::open(&path)?);
        let size = reader.get_ref().metadata()?.len();
        let files = Archive::read_table_of_contents(&mut reader, size)?;

        Ok(Archive {
            path,
            size,
            reader: Mutex::new(reader),
            files,
        })
    }

    fn read_table_of_contents<R: Read + Seek>(
        rdr: &mut R,
        archive_size: u64,
    ) -> Result<HashMap<String, File>, Error> {
        let header = Header::read(rdr)?;
        if header.toc_offset < HEADER_SIZE {
            return Err(Error::Corrupt {
                reason: "Record table overlaps the header",
            });
        }

        // sizes come straight from the header, nothing is allocated before they are checked
        let tables_end = header.toc_offset as u64
            + header.toc_stored_size as u64
            + header.names_stored_size as u64;
        if tables_end > archive_size {
            return Err(Error::Corrupt {
                reason: "Tables extend past the end of the archive",
            });
        }

        let toc_size = header
            .record_count
            .checked_mul(RECORD_SIZE)
            .ok_or(Error::Corrupt {
                reason: "Record count overflows",
            })?;

        rdr.seek(SeekFrom::Start(header.toc_offset as u64))?;
        let toc_raw = read_block(rdr, header.toc_stored_size)?;
        let toc = decompress(header.toc_compression, &toc_raw, toc_size as usize)?;

        // the name block follows the record table directly
        let names_raw = read_block(rdr, header.names_stored_size)?;
        let names = decompress(
            header.names_compression,
            &names_raw,
            header.names_size as usize,
        )?;

        let mut files = HashMap::with_capacity(toc.len() / RECORD_SIZE as usize);
        let mut toc_rdr = Cursor::new(toc);
        for _ in 0..header.record_count {
            let crc = toc_rdr.read_u32::<LittleEndian>()?;
            let size = toc_rdr.read_u32::<LittleEndian>()?;
            let offset = toc_rdr.read_u32::<LittleEndian>()?;
            let compression = toc_rdr.read_u32::<LittleEndian>()?;
            let compressed_size = toc_rdr.read_u32::<LittleEndian>()?;
            let name_offset = toc_rdr.read_u32::<LittleEndian>()?;

            let name = name_at(&names, name_offset as usize)?;
            files.insert(
                name.clone(),
                File {
                    name,
                    crc,
                    size,
                    offset,
                    compression,
                    compressed_size,
                },
            );
        }

        Ok(files)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn open_file(&self, name: &str) -> Result<File, Error> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| Error::FileNotFound { name: name.into() })
    }

    pub fn read_file(&self, name: &str) -> Result<Vec<u8>, Error> {
        let file = self.open_file(name)?;
        self.read_entry(&file)
    }

    pub(crate) fn read_entry(&self, file: &File) -> Result<Vec<u8>, Error> {
        let stored_size = match file.compression {
            0 => file.size,
            _ => file.compressed_size,
        };
        if file.offset as u64 + stored_size as u64 > self.size {
            return Err(Error::Corrupt {
                reason: "Entry extends past the end of the archive",
            });
        }

        let stored = {
            // the seek and the read have to happen under the same lock
            let mut reader = self.reader.lock().unwrap_or_else(PoisonError::into_inner);
            reader.seek(SeekFrom::Start(file.offset as u64))?;
            read_block(&mut *reader, stored_size)?
        };

        decompress(file.compression, &stored, file.size as usize)
    }
}

fn read_block<R: Read>(rdr: &mut R, size: u32) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0; size as usize];
    rdr.read_exact(&mut buf)?;
    Ok(buf)
}

fn name_at(names: &[u8], offset: usize) -> Result<String, Error> {
    let tail = names.get(offset..).ok_or(Error::Corrupt {
        reason: "Name offset outside of the name block",
    })?;
    let end = tail.iter().position(|&c| c == 0).ok_or(Error::Corrupt {
        reason: "Unterminated name in the name block",
    })?;

    String::from_utf8(tail[..end].to_vec()).map_err(|_| Error::Corrupt {
        reason: "Name is not valid UTF-8",
    })
}
