use holocron_files_derive_parseable::Parse;

#[derive(Debug, Copy, Clone, PartialEq, Parse)]
pub struct LodInfoEntry {
    pub id: i32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Parse)]
pub struct LodChild {
    pub id: i32,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LodLevel {
    pub path: String,
    pub near: f32,
    pub far: f32,
}

/// Detail levels in file order. Ranges are neither sorted nor checked for overlaps.
#[derive(Debug, Clone, PartialEq)]
pub struct LodAsset {
    pub levels: Vec<LodLevel>,
}
