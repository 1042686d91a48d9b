//! Camera state and the per-frame view-projection derivation.

use glam::Mat4;

use crate::transform::{self, MatrixError};

/// Orbit camera: yaw around the scene at a fixed radius, looking slightly
/// down. Mutated only by the engine's own update step.
#[derive(Clone, Copy, Debug)]
pub struct OrbitCamera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Yaw around the world Y axis.
    pub angle: f32,
    /// Orbit radius; also sets camera height.
    pub radius: f32,
    /// Fixed downward pitch applied after placement.
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            fov_y: 60f32.to_radians(),
            near: 1.0,
            far: 3000.0,
            angle: 0.1 * std::f32::consts::PI,
            radius: 500.0,
            pitch: -0.4,
        }
    }
}

impl OrbitCamera {
    /// Camera placement in world space: yaw, then move up and back along
    /// the orbit, then pitch down toward the scene.
    pub fn placement(&self) -> Mat4 {
        let mut m = transform::rotation_y(self.angle);
        transform::translate(&mut m, 0.0, self.radius, self.radius * 2.0);
        transform::rotate_x(&mut m, self.pitch);
        m
    }

    /// Perspective projection times the inverted placement.
    pub fn view_projection(&self, aspect: f32) -> Result<Mat4, MatrixError> {
        let proj = transform::perspective(self.fov_y, aspect, self.near, self.far);
        let view = transform::invert(&self.placement())?;
        Ok(proj * view)
    }
}

/// How world coordinates reach clip space. One engine serves both the 2D
/// and the 3D demo presets by switching this out.
#[derive(Clone, Copy, Debug)]
pub enum Projection {
    /// Perspective orbit camera (3D scenes).
    Orbit(OrbitCamera),
    /// Pixel-space projection with a depth range (2D scenes, origin
    /// top-left).
    Pixel { depth: f32 },
    /// Orthographic volume of the given world height, width following the
    /// aspect ratio.
    Ortho { height: f32, near: f32, far: f32 },
}

impl Projection {
    /// View-projection for the current surface size. Aspect ratio is derived
    /// here, so the surface must be resized before this is called.
    pub fn view_projection(&self, width: f32, height: f32) -> Result<Mat4, MatrixError> {
        match self {
            Projection::Orbit(camera) => camera.view_projection(width / height),
            Projection::Pixel { depth } => Ok(transform::projection(width, height, *depth)),
            Projection::Ortho { height: h, near, far } => {
                let half_h = h * 0.5;
                let half_w = half_h * width / height;
                Ok(transform::orthographic(
                    -half_w, half_w, -half_h, half_h, *near, *far,
                ))
            }
        }
    }
}
