use holocron_files_derive_parseable::Parse;

use crate::common::types::CTransform;

/// An object placed inside of a named cell.
#[derive(Debug, Clone, PartialEq, Parse)]
pub struct InteriorNode {
    pub object: String,
    pub cell: String,
    pub transform: CTransform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteriorLayoutAsset {
    pub nodes: Vec<InteriorNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortalCell {
    pub name: String,
    pub portal_count: u32,
    pub can_see_parent: bool,
    pub appearance: String,
    pub floor: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortalLayoutAsset {
    pub portal_count: u32,
    pub cells: Vec<PortalCell>,
}
