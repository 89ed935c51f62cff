use std::ops::Mul;

use holocron_files_derive_parseable::Parse;

/// The four byte identifier of IFF nodes and of most other tagged values.
pub type Tag = [u8; 4];

pub fn tag_str(tag: &Tag) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse)]
pub struct C3Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse)]
pub struct C2Vector {
    pub x: f32,
    pub y: f32,
}

/// Vertex colours are stored alpha first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CArgb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Floating point material colour.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for CRgba {
    fn default() -> Self {
        CRgba {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct C4Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl C4Quaternion {
    pub const IDENTITY: C4Quaternion = C4Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for C4Quaternion {
    fn default() -> Self {
        C4Quaternion::IDENTITY
    }
}

/// Hamilton product, `self` is the left hand side.
impl Mul for C4Quaternion {
    type Output = C4Quaternion;

    fn mul(self, rhs: C4Quaternion) -> C4Quaternion {
        C4Quaternion {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }
}

/// A row-major 3x4 matrix: each row holds three rotation/scale values followed by the translation
/// along that axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CTransform {
    pub rows: [[f32; 4]; 3],
}

impl CTransform {
    pub const IDENTITY: CTransform = CTransform {
        rows: [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
    };

    pub fn translation(&self) -> C3Vector {
        C3Vector {
            x: self.rows[0][3],
            y: self.rows[1][3],
            z: self.rows[2][3],
        }
    }

    /// The 3x3 rotation/scale part, row-major.
    pub fn rotation(&self) -> [[f32; 3]; 3] {
        self.rows.map(|row| [row[0], row[1], row[2]])
    }
}

impl Default for CTransform {
    fn default() -> Self {
        CTransform::IDENTITY
    }
}
