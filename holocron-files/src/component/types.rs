use holocron_files_derive_parseable::Parse;

use crate::common::types::CTransform;

#[derive(Debug, Clone, PartialEq, Parse)]
pub struct ComponentPart {
    pub path: String,
    pub transform: CTransform,
}

/// A compound appearance: other appearances placed relative to this one.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentAsset {
    pub parts: Vec<ComponentPart>,
}
