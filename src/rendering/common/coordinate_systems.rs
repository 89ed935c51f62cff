use glam::{Affine3A, Mat3A, Quat, Vec2, Vec3, Vec3A};
use holocron_files::common::types::{C2Vector, C3Vector, C4Quaternion, CTransform};

/// Assets are LH, Up: +Y, Forward: +Z. The terrain map plane spans X and Z, its "y" is world Z.
#[inline]
pub fn vec3(source: &C3Vector) -> Vec3 {
    Vec3::new(source.x, source.y, source.z)
}

#[inline]
pub fn vec2(source: &C2Vector) -> Vec2 {
    Vec2::new(source.x, source.y)
}

#[inline]
pub fn quat(source: &C4Quaternion) -> Quat {
    Quat::from_xyzw(source.x, source.y, source.z, source.w)
}

/// Row-major 3x4 to a column based affine transform.
#[inline]
pub fn affine(source: &CTransform) -> Affine3A {
    let [r0, r1, r2] = source.rows;
    Affine3A {
        matrix3: Mat3A::from_cols(
            Vec3A::new(r0[0], r1[0], r2[0]),
            Vec3A::new(r0[1], r1[1], r2[1]),
            Vec3A::new(r0[2], r1[2], r2[2]),
        ),
        translation: Vec3A::new(r0[3], r1[3], r2[3]),
    }
}

#[inline]
pub fn placement(rotation: &C4Quaternion, position: &C3Vector) -> Affine3A {
    Affine3A::from_rotation_translation(quat(rotation).normalize(), vec3(position))
}

/// Terrain map plane coordinates plus height to a world position.
#[inline]
pub fn map_to_world(map: Vec2, height: f32) -> Vec3 {
    Vec3::new(map.x, height, map.y)
}

/// OBJ consumers expect RH, so X is mirrored. Mirroring flips the winding order of triangles too.
#[inline]
pub fn world_to_obj(source: Vec3) -> Vec3 {
    Vec3::new(-source.x, source.y, source.z)
}
