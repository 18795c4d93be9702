//! Mesh to material-grouped vertex extraction

use glam::Vec2;
use m2n_core::{Error, Result, Vertex};
use m2n_scene::{Corner, MeshData};

use super::{Model, NO_MATERIAL_KEY};
use crate::convert::to_target;

/// Extract a model from mesh data
///
/// Polygons are fan-triangulated (`c0, ci, ci+1`) and each corner becomes
/// one vertex in target space. A polygon's material comes from
/// `slots[material_index]`; an out-of-range index or an empty slot puts
/// the face in the no-material group. Texture V is flipped.
///
/// A mesh that uses both the no-material group and a material named
/// [`NO_MATERIAL_KEY`] is rejected, since both would share one key.
pub fn extract_model(mesh: &MeshData, slots: &[Option<String>]) -> Result<Model> {
    mesh.validate()
        .map_err(|message| Error::invalid_data(message).with_context(format!("extracting mesh '{}'", mesh.name)))?;

    let has_uv = mesh.has_uv_layer();
    let mut model = Model::new(mesh.name.clone());

    for (face, polygon) in mesh.polygons.iter().enumerate() {
        if polygon.corners.len() < 3 {
            tracing::debug!(
                mesh = %mesh.name,
                face,
                corners = polygon.corners.len(),
                "Skipping degenerate polygon"
            );
            continue;
        }

        let material = slots
            .get(polygon.material_index)
            .and_then(|slot| slot.as_deref());
        let group = model.group_mut(material);

        let first = &polygon.corners[0];
        for pair in polygon.corners[1..].windows(2) {
            for corner in [first, &pair[0], &pair[1]] {
                group.vertices.push(corner_vertex(mesh, corner, has_uv));
            }
        }
    }

    if model.group(None).is_some() && model.group(Some(NO_MATERIAL_KEY)).is_some() {
        return Err(Error::invalid_data(format!(
            "material '{}' collides with the no-material group",
            NO_MATERIAL_KEY
        ))
        .with_context(format!("extracting mesh '{}'", mesh.name)));
    }

    tracing::debug!(
        mesh = %mesh.name,
        groups = model.groups.len(),
        vertices = model.vertex_count(),
        "Extracted model"
    );

    Ok(model)
}

fn corner_vertex(mesh: &MeshData, corner: &Corner, has_uv: bool) -> Vertex {
    let point = &mesh.vertices[corner.vertex as usize];
    let tex_coord = match corner.uv {
        Some(uv) if has_uv => Vec2::new(uv.x, 1.0 - uv.y),
        _ => Vec2::ZERO,
    };

    Vertex::new(to_target(point.position), to_target(point.normal), tex_coord)
}
