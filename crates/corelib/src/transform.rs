//! Matrix builders and composition helpers.
//!
//! Column-major, column-vector convention (glam). Composition is plain
//! right-multiplication: `acc * step` applies `step` first, so calling
//! `rotate_y` and then `translate` on the same accumulator reads
//! "translate, then rotate around the origin" when the matrix is applied
//! to a point. Order of calls is significant.

use glam::{Mat3, Mat4, vec2, vec3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    /// Determinant is (near) zero or not finite; the matrix has no usable inverse.
    #[error("matrix is singular (det = {det})")]
    Singular { det: f32 },
}

/// Below this, a determinant is treated as zero.
const DET_EPSILON: f32 = 1e-12;

// ---------- 3x3 builders (2D scenes) ----------

/// Pixel space to clip space. Y is flipped so the origin sits top-left,
/// matching how the 2D demos address the surface.
pub fn projection_2d(width: f32, height: f32) -> Mat3 {
    Mat3::from_cols_array(&[
        2.0 / width, 0.0, 0.0,
        0.0, -2.0 / height, 0.0,
        -1.0, 1.0, 1.0,
    ])
}

pub fn translation_2d(tx: f32, ty: f32) -> Mat3 {
    Mat3::from_translation(vec2(tx, ty))
}

pub fn rotation_2d(angle: f32) -> Mat3 {
    Mat3::from_angle(angle)
}

pub fn scaling_2d(sx: f32, sy: f32) -> Mat3 {
    Mat3::from_scale(vec2(sx, sy))
}

pub fn translate_2d(m: &mut Mat3, tx: f32, ty: f32) {
    *m *= translation_2d(tx, ty);
}

pub fn rotate_2d(m: &mut Mat3, angle: f32) {
    *m *= rotation_2d(angle);
}

pub fn scale_2d(m: &mut Mat3, sx: f32, sy: f32) {
    *m *= scaling_2d(sx, sy);
}

pub fn invert_2d(m: &Mat3) -> Result<Mat3, MatrixError> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() <= DET_EPSILON {
        return Err(MatrixError::Singular { det });
    }
    Ok(m.inverse())
}

// ---------- 4x4 builders ----------

pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
    Mat4::from_translation(vec3(tx, ty, tz))
}

pub fn rotation_x(angle: f32) -> Mat4 {
    Mat4::from_rotation_x(angle)
}

pub fn rotation_y(angle: f32) -> Mat4 {
    Mat4::from_rotation_y(angle)
}

pub fn rotation_z(angle: f32) -> Mat4 {
    Mat4::from_rotation_z(angle)
}

pub fn scaling(sx: f32, sy: f32, sz: f32) -> Mat4 {
    Mat4::from_scale(vec3(sx, sy, sz))
}

/// Symmetric-frustum perspective, `f = cot(fov_y / 2)`.
///
/// Maps view-space `z = -near` to NDC `-1` and `z = -far` to `+1` (GL clip
/// convention; the GPU backend remaps depth to `[0, 1]` at the pipeline
/// boundary). `aspect` scales X only.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    debug_assert!(fov_y > 0.0 && fov_y < std::f32::consts::PI);
    debug_assert!(aspect > 0.0);
    debug_assert!(0.0 < near && near < far);

    let f = 1.0 / (fov_y * 0.5).tan();
    let range_inv = 1.0 / (near - far);
    Mat4::from_cols_array(&[
        f / aspect, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, (near + far) * range_inv, -1.0,
        0.0, 0.0, near * far * range_inv * 2.0, 0.0,
    ])
}

/// Orthographic volume. Y is flipped, same screen convention as
/// [`projection_2d`].
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::from_cols_array(&[
        2.0 / (right - left), 0.0, 0.0, 0.0,
        0.0, -2.0 / (top - bottom), 0.0, 0.0,
        0.0, 0.0, 2.0 / (near - far), 0.0,
        (left + right) / (left - right),
        (bottom + top) / (bottom - top),
        (near + far) / (near - far),
        1.0,
    ])
}

/// Pixel space to clip space with a depth range, the 3D analogue of
/// [`projection_2d`]. Z is scaled but not offset, so `z = 0` stays at the
/// middle of the volume.
pub fn projection(width: f32, height: f32, depth: f32) -> Mat4 {
    Mat4::from_cols_array(&[
        2.0 / width, 0.0, 0.0, 0.0,
        0.0, -2.0 / height, 0.0, 0.0,
        0.0, 0.0, 2.0 / depth, 0.0,
        -1.0, 1.0, 0.0, 1.0,
    ])
}

pub fn translate(m: &mut Mat4, tx: f32, ty: f32, tz: f32) {
    *m *= translation(tx, ty, tz);
}

pub fn rotate_x(m: &mut Mat4, angle: f32) {
    *m *= rotation_x(angle);
}

pub fn rotate_y(m: &mut Mat4, angle: f32) {
    *m *= rotation_y(angle);
}

pub fn rotate_z(m: &mut Mat4, angle: f32) {
    *m *= rotation_z(angle);
}

pub fn scale(m: &mut Mat4, sx: f32, sy: f32, sz: f32) {
    *m *= scaling(sx, sy, sz);
}

/// Checked inversion. Callers deriving a view matrix treat `Singular` as
/// fatal for the frame (skip drawing) rather than propagating garbage.
pub fn invert(m: &Mat4) -> Result<Mat4, MatrixError> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() <= DET_EPSILON {
        return Err(MatrixError::Singular { det });
    }
    Ok(m.inverse())
}

/// Local transform parameters of a scene object (Euler angles in radians).
///
/// `matrix()` composes in the fixed order translate, rotate X, rotate Y,
/// rotate Z, scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: glam::Vec3,
    pub rotation: glam::Vec3,
    pub scale: glam::Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            translation: glam::Vec3::ZERO,
            rotation: glam::Vec3::ZERO,
            scale: glam::Vec3::ONE,
        }
    }

    #[inline]
    pub fn from_translation(translation: glam::Vec3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let mut m = translation(self.translation.x, self.translation.y, self.translation.z);
        rotate_x(&mut m, self.rotation.x);
        rotate_y(&mut m, self.rotation.y);
        rotate_z(&mut m, self.rotation.z);
        scale(&mut m, self.scale.x, self.scale.y, self.scale.z);
        m
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
