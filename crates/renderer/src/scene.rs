//! Built-in scene presets.
//!
//! The demo progression collapsed into data: one engine, three scenes.
//! `rect` exercises the 2D pixel-space path, `cube` the orbit camera with
//! depth and culling, `bus` the entity simulation on the ground plane.

use corelib::camera::{OrbitCamera, Projection};
use corelib::entity::MovingEntity;
use corelib::transform::Transform;
use corelib::{vec2, vec3};
use models::{AMBER, bus, cuboid, floor, rectangle};

use crate::engine::{Animation, Scene, SceneObject};

impl Scene {
    /// Looks up a preset by its CLI name.
    pub fn preset(name: &str) -> Option<Scene> {
        match name {
            "rect" => Some(Self::rect()),
            "cube" => Some(Self::cube()),
            "bus" => Some(Self::bus()),
            _ => None,
        }
    }

    /// 2D spinning rectangle in pixel coordinates, origin top-left.
    pub fn rect() -> Scene {
        Scene {
            objects: vec![
                SceneObject::new("rect", rectangle(120.0, 60.0, AMBER))
                    .with_transform(Transform::from_translation(vec3(200.0, 150.0, 0.0)))
                    .with_animation(Animation::Spin {
                        rate: vec3(0.0, 0.0, 1.0),
                    }),
            ],
            projection: Projection::Pixel { depth: 400.0 },
            clear_color: [1.0, 1.0, 1.0, 1.0],
            depth_test: false,
        }
    }

    /// Spinning cuboid under the default orbit camera.
    pub fn cube() -> Scene {
        Scene {
            objects: vec![
                SceneObject::new("cube", cuboid(200.0, 200.0, 200.0)).with_animation(
                    Animation::Spin {
                        rate: vec3(1.0, 0.7, 0.0),
                    },
                ),
            ],
            projection: Projection::Orbit(OrbitCamera::default()),
            clear_color: [0.05, 0.05, 0.08, 1.0],
            depth_test: true,
        }
    }

    /// Bus driving across the floor, reflecting off the world bounds.
    pub fn bus() -> Scene {
        Scene {
            objects: vec![
                SceneObject::new("bus", bus()).with_animation(Animation::Drive(
                    MovingEntity::new(vec2(0.0, 0.0), 0.25 * std::f32::consts::PI, 150.0),
                )),
                SceneObject::new("floor", floor()),
            ],
            projection: Projection::Orbit(OrbitCamera::default()),
            clear_color: [1.0, 1.0, 1.0, 1.0],
            depth_test: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_resolves_and_is_drawable() {
        for name in ["rect", "cube", "bus"] {
            let scene = Scene::preset(name).unwrap();
            assert!(!scene.objects.is_empty(), "{name} has objects");
            for obj in &scene.objects {
                assert!(obj.mesh.is_valid(), "{name}/{} mesh tables agree", obj.name);
            }
        }
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(Scene::preset("teapot").is_none());
    }

    #[test]
    fn rect_is_the_only_2d_preset() {
        assert!(!Scene::rect().depth_test);
        assert!(Scene::cube().depth_test);
        assert!(Scene::bus().depth_test);
        assert!(matches!(Scene::rect().projection, Projection::Pixel { .. }));
    }

    #[test]
    fn rect_shares_the_bus_body_color() {
        let rect_scene = Scene::rect();
        let bus_scene = Scene::bus();
        assert!(rect_scene.objects[0].mesh.colors.iter().all(|c| *c == AMBER));
        assert!(bus_scene.objects[0].mesh.colors.iter().all(|c| *c == AMBER));
    }

    #[test]
    fn bus_preset_simulates_an_entity() {
        let scene = Scene::bus();
        let driven = scene
            .objects
            .iter()
            .filter(|o| matches!(o.animation, Animation::Drive(_)))
            .count();
        assert_eq!(driven, 1);
    }
}
