use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("The file's magic value does not match the expectation: expected {expected}, found {found}")]
    InvalidMagicValue { expected: String, found: String },

    #[error("The file is violating the expected format, because: {reason}")]
    FormatError { reason: &'static str },

    #[error("Missing mandatory {tag} node")]
    MissingChunk { tag: String },

    #[error("Unexpected FORM {found} inside {parent}")]
    UnexpectedForm { parent: String, found: String },

    #[error("Unrecognized record type {tag}")]
    UnrecognizedType { tag: String },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    UTF8ConversationError(#[from] std::string::FromUtf8Error),
}

pub mod common;
pub mod component;
pub mod layout;
pub mod lod;
pub mod mesh;
pub mod record;
pub mod shader;
pub mod skeletal_mesh;
pub mod skeleton;
pub mod sniff;
pub mod template;
pub mod terrain;
pub mod world;

pub use record::Record;
