//! Math aliases and the conversions between `nalgebra` types and the plain
//! arrays stored on nodes and keyframes.
//!
//! Quaternion arrays are `[x, y, z, w]`, matching glTF.

pub use nalgebra;

use nalgebra::{Matrix3, Rotation3, UnitQuaternion};

pub type Vec3 = nalgebra::Vector3<f32>;
pub type Mat4 = nalgebra::Matrix4<f32>;
pub type Quat = nalgebra::Quaternion<f32>;

/// Local matrix `T * R * S`. The rotation is normalized first.
pub fn compose(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Mat4 {
    let [x, y, z, w] = rotation;
    let rotation = UnitQuaternion::new_normalize(Quat::new(w, x, y, z));
    Mat4::new_translation(&Vec3::from(translation))
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(&Vec3::from(scale))
}

/// Split an affine matrix into `(translation, rotation, scale)`.
///
/// Mirroring (negative determinant) is carried by the X scale. A degenerate
/// axis leaves the rotation at identity.
pub fn decompose(m: &Mat4) -> ([f32; 3], [f32; 4], [f32; 3]) {
    let translation = [m[(0, 3)], m[(1, 3)], m[(2, 3)]];
    let basis: Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).into_owned();

    let mut scale = [
        basis.column(0).norm(),
        basis.column(1).norm(),
        basis.column(2).norm(),
    ];
    if basis.determinant() < 0.0 {
        scale[0] = -scale[0];
    }
    if scale.contains(&0.0) {
        return (translation, [0.0, 0.0, 0.0, 1.0], scale);
    }

    let unscaled = Matrix3::from_columns(&[
        basis.column(0) / scale[0],
        basis.column(1) / scale[1],
        basis.column(2) / scale[2],
    ]);
    let q = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(unscaled));
    (translation, [q.i, q.j, q.k, q.w], scale)
}
