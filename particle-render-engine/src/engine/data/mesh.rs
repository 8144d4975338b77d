use bevy::math::Vec3;
use constants::texture::{MAX_TEXTURE_DIMENSION, POSITION_COMPONENTS};

use super::PositionBuffer;
use crate::engine::config::SourceKind;
use crate::engine::error::ParticleError;

/// Node of a loaded mesh scene: either a container or a leaf holding vertices.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshNode {
    Group {
        name: String,
        children: Vec<MeshNode>,
    },
    Mesh {
        name: String,
        vertices: Vec<Vec3>,
    },
}

impl MeshNode {
    pub fn group(name: impl Into<String>, children: Vec<MeshNode>) -> Self {
        Self::Group {
            name: name.into(),
            children,
        }
    }

    pub fn mesh(name: impl Into<String>, vertices: Vec<Vec3>) -> Self {
        Self::Mesh {
            name: name.into(),
            vertices,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Group { name, .. } | Self::Mesh { name, .. } => name,
        }
    }

    /// Visit every node depth-first, children in declaration order, at any depth.
    pub fn walk(&self, mut visit: impl FnMut(&MeshNode)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            if let Self::Group { children, .. } = node {
                stack.extend(children.iter().rev());
            }
        }
    }

    /// Append every leaf vertex in traversal order.
    pub fn collect_vertices(&self, out: &mut Vec<Vec3>) {
        self.walk(|node| {
            if let Self::Mesh { vertices, .. } = node {
                out.extend_from_slice(vertices);
            }
        });
    }

    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        self.walk(|node| {
            if let Self::Mesh { vertices, .. } = node {
                count += vertices.len();
            }
        });
        count
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.walk(|node| {
            if matches!(node, Self::Mesh { .. }) {
                count += 1;
            }
        });
        count
    }
}

/// Side of the square grid a mesh with `vertex_count` vertices is packed into.
pub fn mesh_grid_side(vertex_count: usize) -> u32 {
    ((3 * vertex_count) as f64).sqrt().floor() as u32
}

/// Grid side for `vertex_count` vertices, rejecting grids no texture can hold.
pub fn checked_mesh_grid_side(path: &str, vertex_count: usize) -> Result<u32, ParticleError> {
    let side = mesh_grid_side(vertex_count);
    if side > MAX_TEXTURE_DIMENSION {
        return Err(ParticleError::malformed(
            path,
            format!(
                "{} vertices need a {}x{} grid, larger than the {} texel limit",
                vertex_count, side, side, MAX_TEXTURE_DIMENSION
            ),
        ));
    }
    Ok(side)
}

/// Outcome of packing mesh vertices into a square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshPacking {
    pub vertex_count: usize,
    pub side: u32,
    /// Grid cells left as inactive padding.
    pub padded: usize,
    /// Vertices that did not fit and were dropped.
    pub dropped: usize,
}

/// Pack every vertex of the scene into a `side × side` grid, vertex `i` at index `i`.
///
/// Unused capacity is inactive padding at the origin; vertices beyond capacity
/// are dropped and counted in the returned [`MeshPacking`].
pub fn mesh_positions(root: &MeshNode) -> Result<(PositionBuffer, MeshPacking), ParticleError> {
    let vertex_count = root.vertex_count();
    if vertex_count == 0 {
        return Err(ParticleError::malformed(
            root.name().to_string(),
            "mesh scene contains no vertices",
        ));
    }
    let side = checked_mesh_grid_side(root.name(), vertex_count)?;

    let mut vertices = Vec::with_capacity(vertex_count);
    root.collect_vertices(&mut vertices);

    let capacity = side as usize * side as usize;
    let packed = vertices.len().min(capacity);

    let mut data = vec![0.0; capacity * POSITION_COMPONENTS];
    for (slot, vertex) in data
        .chunks_exact_mut(POSITION_COMPONENTS)
        .zip(vertices.iter().take(packed))
    {
        slot.copy_from_slice(&vertex.to_array());
    }

    let packing = MeshPacking {
        vertex_count: vertices.len(),
        side,
        padded: capacity - packed,
        dropped: vertices.len() - packed,
    };
    let buffer = PositionBuffer::with_active_count(side, side, data, packed, SourceKind::Mesh)?;

    Ok((buffer, packing))
}
