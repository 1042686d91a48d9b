//! Vertex position and color tables for the built-in scene objects.

use crate::mesh::{Mesh, Topology};

/// Body color shared by the bus and the 2D rectangle demo.
pub const AMBER: [u8; 3] = [255, 193, 7];

/// Axis-aligned rectangle at `z = 0` in pixel space, as a 4-vertex strip.
/// Used by the 2D demo under the pixel projection.
pub fn rectangle(width: f32, height: f32, color: [u8; 3]) -> Mesh {
    Mesh::new(
        vec![
            [0.0, 0.0, 0.0],
            [width, 0.0, 0.0],
            [0.0, height, 0.0],
            [width, height, 0.0],
        ],
        vec![color; 4],
    )
    .with_topology(Topology::TriangleStrip)
}

/// Indexed cuboid centered on the origin with one color per corner,
/// CCW-wound for back-face culling.
pub fn cuboid(width: f32, height: f32, depth: f32) -> Mesh {
    let (hw, hh, hd) = (width * 0.5, height * 0.5, depth * 0.5);
    let positions = vec![
        // back z = -hd
        [-hw, -hh, -hd],
        [hw, -hh, -hd],
        [hw, hh, -hd],
        [-hw, hh, -hd],
        // front z = +hd
        [-hw, -hh, hd],
        [hw, -hh, hd],
        [hw, hh, hd],
        [-hw, hh, hd],
    ];
    let colors = vec![
        [255, 0, 0],
        [0, 255, 0],
        [0, 0, 255],
        [255, 255, 0],
        [255, 0, 255],
        [0, 255, 255],
        [255, 255, 255],
        [255, 128, 0],
    ];
    let indices = vec![
        // front (+Z)
        4, 5, 6, 4, 6, 7,
        // back (-Z)
        0, 2, 1, 0, 3, 2,
        // top (+Y)
        3, 6, 2, 3, 7, 6,
        // bottom (-Y)
        0, 1, 5, 0, 5, 4,
        // left (-X)
        0, 7, 3, 0, 4, 7,
        // right (+X)
        1, 2, 6, 1, 6, 5,
    ];
    Mesh::new(positions, colors).with_indices(indices)
}

/// Stylized bus: five quads (front, back, right, left, roof), no floor
/// face. The front faces +Z, the driving direction at heading zero.
pub fn bus() -> Mesh {
    const HW: f32 = 40.0; // half width (X)
    const H: f32 = 80.0; // height (Y), base at y = 0
    const HL: f32 = 120.0; // half length (Z)

    let positions = vec![
        // Front
        [-HW, 0.0, HL],
        [HW, 0.0, HL],
        [HW, H, HL],
        [-HW, 0.0, HL],
        [HW, H, HL],
        [-HW, H, HL],
        // Back
        [HW, 0.0, -HL],
        [-HW, 0.0, -HL],
        [-HW, H, -HL],
        [HW, 0.0, -HL],
        [-HW, H, -HL],
        [HW, H, -HL],
        // Right facing driving direction
        [HW, 0.0, HL],
        [HW, 0.0, -HL],
        [HW, H, -HL],
        [HW, 0.0, HL],
        [HW, H, -HL],
        [HW, H, HL],
        // Left facing driving direction
        [-HW, 0.0, -HL],
        [-HW, 0.0, HL],
        [-HW, H, HL],
        [-HW, 0.0, -HL],
        [-HW, H, HL],
        [-HW, H, -HL],
        // Roof
        [-HW, H, HL],
        [HW, H, HL],
        [HW, H, -HL],
        [-HW, H, HL],
        [HW, H, -HL],
        [-HW, H, -HL],
    ];
    let colors = vec![AMBER; positions.len()];
    Mesh::new(positions, colors)
}

/// Ground plane spanning the world bounds at `y = 0`, flat grey.
pub fn floor() -> Mesh {
    const B: f32 = 500.0;
    const GREY: [u8; 3] = [150, 150, 150];

    let positions = vec![
        [-B, 0.0, B],
        [B, 0.0, B],
        [-B, 0.0, -B],
        [-B, 0.0, -B],
        [B, 0.0, B],
        [B, 0.0, -B],
    ];
    let colors = vec![GREY; positions.len()];
    Mesh::new(positions, colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tables_are_valid() {
        assert!(rectangle(120.0, 60.0, [40, 90, 200]).is_valid());
        assert!(cuboid(200.0, 200.0, 200.0).is_valid());
        assert!(bus().is_valid());
        assert!(floor().is_valid());
    }

    #[test]
    fn bus_has_five_quads() {
        assert_eq!(bus().draw_count(), 6 * 5);
    }

    #[test]
    fn floor_is_two_triangles_on_ground_level() {
        let f = floor();
        assert_eq!(f.draw_count(), 6);
        assert!(f.positions.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn cuboid_draws_twelve_triangles() {
        assert_eq!(cuboid(1.0, 1.0, 1.0).draw_count(), 36);
    }

    #[test]
    fn cuboid_faces_wind_outward() {
        // The cuboid is centered on the origin, so for a CCW-outward
        // triangle the normal points along its own centroid.
        let c = cuboid(2.0, 4.0, 6.0);
        for tri in c.indices.as_ref().unwrap().chunks(3) {
            let a = c.positions[tri[0] as usize];
            let b = c.positions[tri[1] as usize];
            let d = c.positions[tri[2] as usize];
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
            let n = [
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ];
            let centroid = [
                (a[0] + b[0] + d[0]) / 3.0,
                (a[1] + b[1] + d[1]) / 3.0,
                (a[2] + b[2] + d[2]) / 3.0,
            ];
            let dot = n[0] * centroid[0] + n[1] * centroid[1] + n[2] * centroid[2];
            assert!(dot > 0.0, "triangle {tri:?} is wound inward");
        }
    }

    #[test]
    fn rectangle_is_a_strip() {
        let r = rectangle(10.0, 10.0, [1, 2, 3]);
        assert_eq!(r.topology, Topology::TriangleStrip);
        assert_eq!(r.draw_count(), 4);
    }
}
