//! Static geometry and color tables for the demo scenes.

pub mod mesh;
pub mod tables;

pub use mesh::{Mesh, Topology};
pub use tables::{AMBER, bus, cuboid, floor, rectangle};
