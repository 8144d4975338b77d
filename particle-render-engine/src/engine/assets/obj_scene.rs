use bevy::asset::{AssetLoader, LoadContext, io::Reader};
use bevy::prelude::*;

use crate::engine::data::mesh::MeshNode;
use crate::engine::error::ParticleError;

/// Mesh scene graph decoded from a Wavefront OBJ file.
#[derive(Asset, TypePath, Debug, Clone)]
pub struct MeshScene {
    pub root: MeshNode,
}

#[derive(Default)]
pub struct ObjSceneLoader;

impl AssetLoader for ObjSceneLoader {
    type Asset = MeshScene;
    type Settings = ();
    type Error = ParticleError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let path = load_context.path().display().to_string();

        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .map_err(|err| ParticleError::load(path.clone(), err))?;
        let content =
            std::str::from_utf8(&bytes).map_err(|err| ParticleError::malformed(path.clone(), err))?;

        let root = parse_obj(&path, content)?;
        debug!(
            "Parsed {}: {} meshes, {} vertices",
            path,
            root.mesh_count(),
            root.vertex_count()
        );
        Ok(MeshScene { root })
    }

    fn extensions(&self) -> &[&str] {
        &["obj"]
    }
}

/// Builds the scene tree while scanning an OBJ file.
///
/// `o` opens an object group, `g` opens a mesh inside the current object.
/// Faces are fan-triangulated and stored one vertex per corner.
struct SceneBuilder {
    objects: Vec<MeshNode>,
    object_name: String,
    object_meshes: Vec<MeshNode>,
    mesh_name: String,
    mesh_vertices: Vec<Vec3>,
}

impl SceneBuilder {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
            object_name: "default".to_string(),
            object_meshes: Vec::new(),
            mesh_name: "default".to_string(),
            mesh_vertices: Vec::new(),
        }
    }

    fn start_object(&mut self, name: &str) {
        self.finish_object();
        self.object_name = name.to_string();
        self.mesh_name = name.to_string();
    }

    fn start_mesh(&mut self, name: &str) {
        self.finish_mesh();
        self.mesh_name = name.to_string();
    }

    fn finish_mesh(&mut self) {
        if self.mesh_vertices.is_empty() {
            return;
        }
        let vertices = std::mem::take(&mut self.mesh_vertices);
        self.object_meshes
            .push(MeshNode::mesh(self.mesh_name.clone(), vertices));
    }

    fn finish_object(&mut self) {
        self.finish_mesh();
        if self.object_meshes.is_empty() {
            return;
        }
        let meshes = std::mem::take(&mut self.object_meshes);
        self.objects
            .push(MeshNode::group(self.object_name.clone(), meshes));
    }

    fn finish(mut self, name: &str) -> MeshNode {
        self.finish_object();
        MeshNode::group(name, self.objects)
    }
}

/// Parse OBJ text into a `Group(objects) → Group(object) → Mesh` tree.
pub fn parse_obj(path: &str, content: &str) -> Result<MeshNode, ParticleError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut builder = SceneBuilder::new();

    for (line_index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let line_number = line_index + 1;

        match keyword {
            "v" => {
                let mut xyz = [0.0f32; 3];
                for value in &mut xyz {
                    let token = parts.next().ok_or_else(|| {
                        ParticleError::malformed(
                            path,
                            format!("line {line_number}: vertex needs three coordinates"),
                        )
                    })?;
                    *value = token.parse().map_err(|_| {
                        ParticleError::malformed(
                            path,
                            format!("line {line_number}: invalid coordinate '{token}'"),
                        )
                    })?;
                }
                positions.push(Vec3::from_array(xyz));
            }
            "f" => {
                let corners = parts
                    .map(|token| resolve_index(path, line_number, token, positions.len()))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(ParticleError::malformed(
                        path,
                        format!("line {line_number}: face needs at least three vertices"),
                    ));
                }
                for i in 1..corners.len() - 1 {
                    builder.mesh_vertices.extend([
                        positions[corners[0]],
                        positions[corners[i]],
                        positions[corners[i + 1]],
                    ]);
                }
            }
            "o" => builder.start_object(&parts.collect::<Vec<_>>().join(" ")),
            "g" => builder.start_mesh(&parts.collect::<Vec<_>>().join(" ")),
            // Normals, texture coordinates, materials and smoothing groups do not move particles.
            _ => {}
        }
    }

    Ok(builder.finish(path))
}

/// Resolve a face corner token (`v`, `v/vt`, `v//vn`, `v/vt/vn`) to a zero-based position index.
fn resolve_index(
    path: &str,
    line_number: usize,
    token: &str,
    position_count: usize,
) -> Result<usize, ParticleError> {
    let raw = token.split('/').next().unwrap_or_default();
    let index: i64 = raw.parse().map_err(|_| {
        ParticleError::malformed(
            path,
            format!("line {line_number}: invalid face index '{token}'"),
        )
    })?;

    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => position_count as i64 + i,
        _ => -1,
    };

    if resolved < 0 || resolved >= position_count as i64 {
        return Err(ParticleError::malformed(
            path,
            format!("line {line_number}: face index {index} out of range"),
        ));
    }
    Ok(resolved as usize)
}
