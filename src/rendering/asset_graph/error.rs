use holocron_files::ParserError;
use holocron_files::sniff::RecordKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("{path} is not part of any archive")]
    EntryNotFound { path: String },

    #[error("{path} has the unrecognized record type {tag}")]
    UnrecognizedType { path: String, tag: String },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: ParserError,
    },

    #[error("{path} is a {kind:?} record, not a shader")]
    NotAShader { path: String, kind: RecordKind },
}

impl AssetError {
    pub fn from_parser(path: &str, source: ParserError) -> Self {
        match source {
            ParserError::UnrecognizedType { tag } => AssetError::UnrecognizedType {
                path: path.to_owned(),
                tag,
            },
            source => AssetError::Decode {
                path: path.to_owned(),
                source,
            },
        }
    }

    pub fn path(&self) -> &str {
        match self {
            AssetError::EntryNotFound { path }
            | AssetError::UnrecognizedType { path, .. }
            | AssetError::Decode { path, .. }
            | AssetError::NotAShader { path, .. } => path,
        }
    }
}
