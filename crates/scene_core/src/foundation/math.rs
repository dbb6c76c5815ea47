//! Math utilities and types
//!
//! Provides the vector and matrix aliases used by the transform engine, plus
//! TRS composition and decomposition helpers.
//!
//! Rotations are Euler angles `(x, y, z)` in radians, applied as
//! `Rz * Ry * Rx` (nalgebra's roll/pitch/yaw convention).

pub use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Rotation matrix type
pub type Rot3 = Rotation3<f32>;

/// Smallest scale component treated as non-degenerate when dividing by scale.
const SCALE_EPSILON: f32 = 1e-8;

/// Build a rotation from Euler angles in radians.
pub fn euler_rotation(radians: &Vec3) -> Rot3 {
    Rot3::from_euler_angles(radians.x, radians.y, radians.z)
}

/// Euler angles in radians of a rotation, inverse of [`euler_rotation`].
pub fn euler_angles(rotation: &Rot3) -> Vec3 {
    let (roll, pitch, yaw) = rotation.euler_angles();
    Vec3::new(roll, pitch, yaw)
}

/// Compose a translation, Euler rotation (radians) and scale into an affine
/// matrix (`T * R * S`).
pub fn affine_transformation(position: &Vec3, rotation: &Vec3, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * euler_rotation(rotation).to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Translation part of an affine matrix.
pub fn translation(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Per-axis scale of an affine matrix (length of each basis column).
pub fn scale(matrix: &Mat4) -> Vec3 {
    Vec3::new(
        Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude(),
        Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude(),
        Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude(),
    )
}

/// Rotation part of an affine matrix with the scale removed.
pub fn rotation(matrix: &Mat4) -> Rot3 {
    let scale = scale(matrix);
    let safe = |s: f32| if s.abs() < SCALE_EPSILON { 1.0 } else { s };
    let linear = matrix.fixed_view::<3, 3>(0, 0);
    let basis = Mat3::from_columns(&[
        linear.column(0) / safe(scale.x),
        linear.column(1) / safe(scale.y),
        linear.column(2) / safe(scale.z),
    ]);
    Rot3::from_matrix(&basis)
}

/// Inverse of an affine matrix, or identity when the matrix is singular
/// (e.g. a zero scale axis).
pub fn inverse_or_identity(matrix: &Mat4) -> Mat4 {
    matrix.try_inverse().unwrap_or_else(Mat4::identity)
}

/// Component-wise division that leaves degenerate divisor axes untouched.
pub fn divide_scale(value: &Vec3, divisor: &Vec3) -> Vec3 {
    value.zip_map(divisor, |v, d| if d.abs() < SCALE_EPSILON { v } else { v / d })
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Convert every component of a vector from degrees to radians
    pub fn vec_to_radians(degrees: &Vec3) -> Vec3 {
        degrees.map(deg_to_rad)
    }

    /// Convert every component of a vector from radians to degrees
    pub fn vec_to_degrees(radians: &Vec3) -> Vec3 {
        radians.map(rad_to_deg)
    }
}
