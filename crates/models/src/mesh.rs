//! CPU-side mesh representation consumed by the render engine.

/// Primitive assembly for a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    TriangleStrip,
}

/// Vertex positions and colors as parallel tables, optionally indexed.
/// Colors are 0-255 bytes, normalized in the shader pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[u8; 3]>,
    pub indices: Option<Vec<u16>>,
    pub topology: Topology,
}

impl Default for Topology {
    fn default() -> Self {
        Topology::TriangleList
    }
}

impl Mesh {
    pub fn new(positions: Vec<[f32; 3]>, colors: Vec<[u8; 3]>) -> Self {
        Self {
            positions,
            colors,
            indices: None,
            topology: Topology::TriangleList,
        }
    }

    pub fn with_indices(mut self, indices: Vec<u16>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Number of vertices submitted to a draw call.
    pub fn draw_count(&self) -> u32 {
        match &self.indices {
            Some(idx) => idx.len() as u32,
            None => self.positions.len() as u32,
        }
    }

    /// Returns `true` when the attribute tables agree and every index is in
    /// range. The engine disables (and logs) objects that fail this instead
    /// of aborting.
    pub fn is_valid(&self) -> bool {
        if self.positions.is_empty() || self.colors.len() != self.positions.len() {
            return false;
        }
        match &self.indices {
            Some(idx) => {
                !idx.is_empty() && idx.iter().all(|&i| (i as usize) < self.positions.len())
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_validity() {
        let mesh = Mesh::new(vec![[0.0; 3]; 3], vec![[255, 0, 0]; 3]);
        assert!(mesh.is_valid());
        assert_eq!(mesh.draw_count(), 3);
    }

    #[test]
    fn color_table_length_must_match_positions() {
        let mesh = Mesh::new(vec![[0.0; 3]; 3], vec![[255, 0, 0]; 2]);
        assert!(!mesh.is_valid());
    }

    #[test]
    fn out_of_range_index_is_invalid() {
        let mesh = Mesh::new(vec![[0.0; 3]; 3], vec![[0; 3]; 3]).with_indices(vec![0, 1, 3]);
        assert!(!mesh.is_valid());
    }

    #[test]
    fn indexed_draw_count_uses_index_table() {
        let mesh = Mesh::new(vec![[0.0; 3]; 4], vec![[0; 3]; 4]).with_indices(vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.draw_count(), 6);
    }
}
