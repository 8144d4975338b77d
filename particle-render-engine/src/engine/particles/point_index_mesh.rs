use bevy::prelude::*;
use bevy::{render::mesh::PrimitiveTopology, render::render_asset::RenderAssetUsages};
use constants::texture::VERTICES_PER_PARTICLE;

/// Create the index mesh the render pipeline expands into particle quads.
///
/// Each vertex position is `(column, row, corner)`: the texel holding its
/// particle and which of the quad's six corners it is. Texel coordinates stay
/// exact in `f32` for every texture side, unlike a running vertex number.
pub fn create_point_index_mesh(width: u32, height: u32) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );

    let vertex_count = width as usize * height as usize * VERTICES_PER_PARTICLE;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(vertex_count);
    for row in 0..height {
        for column in 0..width {
            positions.extend(
                (0..VERTICES_PER_PARTICLE).map(|corner| [column as f32, row as f32, corner as f32]),
            );
        }
    }

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh
}
