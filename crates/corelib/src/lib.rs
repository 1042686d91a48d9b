//! Core types: math re-exports, matrix builders, camera, entity, clock.

pub use glam::{Mat3, Mat4, Vec2, Vec3, vec2, vec3};

pub mod camera;
pub mod clock;
pub mod entity;
pub mod transform;

pub use transform::MatrixError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = transform::Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn view_projection_is_deterministic_across_runs() {
        let make = || {
            camera::OrbitCamera {
                angle: 0.37,
                ..camera::OrbitCamera::default()
            }
            .view_projection(800.0 / 600.0)
            .unwrap()
        };
        assert_eq!(make().to_cols_array(), make().to_cols_array());
    }
}
