use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not a TRE archive (magic {magic:?})")]
    InvalidMagic { magic: [u8; 4] },

    #[error("Unsupported TRE version {version:?}")]
    UnsupportedVersion { version: [u8; 4] },

    #[error("Unsupported compression type {compression}")]
    UnsupportedCompression { compression: u32 },

    #[error("The archive is corrupt, because: {reason}")]
    Corrupt { reason: &'static str },

    #[error("File {name} is not part of the archive")]
    FileNotFound { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
