use std::io::{Read, Write};

use flate2::Compression as Level;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::Error;

pub(crate) const COMPRESSION_NONE: u32 = 0;
pub(crate) const COMPRESSION_ZLIB: u32 = 2;

/// Upper bound of what deflate can achieve, limits the preallocation for claimed sizes.
const MAX_INFLATE_RATIO: usize = 1032;

/// Turns a stored block back into its raw bytes. `expected` is the uncompressed size the
/// archive claims, anything else is treated as corruption.
pub(crate) fn decompress(compression: u32, input: &[u8], expected: usize) -> Result<Vec<u8>, Error> {
    match compression {
        COMPRESSION_NONE => {
            if input.len() != expected {
                return Err(Error::Corrupt {
                    reason: "Stored size does not match the uncompressed size",
                });
            }
            Ok(input.to_vec())
        }
        COMPRESSION_ZLIB => {
            let capacity = expected.min(input.len().saturating_mul(MAX_INFLATE_RATIO));
            let mut out = Vec::with_capacity(capacity);
            // one byte past the claim is enough to detect a mismatch
            ZlibDecoder::new(input)
                .take((expected as u64).saturating_add(1))
                .read_to_end(&mut out)?;
            if out.len() != expected {
                return Err(Error::Corrupt {
                    reason: "Inflated size does not match the uncompressed size",
                });
            }
            Ok(out)
        }
        compression => Err(Error::UnsupportedCompression { compression }),
    }
}

pub(crate) fn deflate(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Level::default());
    encoder.write_all(input)?;
    Ok(encoder.finish()?)
}
