//! Material descriptor: texture bindings

use m2n_scene::Material;

use super::lua::{quote, Table};
use crate::naming::{AssetName, Namespace};

/// Render the material file for a material
///
/// Every populated image slot binds `uTexture<slot>` to its PNG texture.
/// The `textures` table is left out when there are none.
pub fn material_descriptor(material: &Material, namespace: &Namespace) -> String {
    let mut textures = Table::new();
    for (slot, image) in material.image_slots() {
        textures.field(
            &format!("uTexture{}", slot),
            quote(&AssetName::texture(namespace, image).to_string()),
        );
    }

    let mut table = Table::new();
    if !textures.is_empty() {
        table.field("textures", textures.render());
    }
    table.document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use m2n_scene::{TextureSlot, TextureType};

    fn slot(slot: u32, texture_type: TextureType, image: Option<&str>) -> TextureSlot {
        TextureSlot {
            slot,
            texture_type,
            image: image.map(str::to_string),
        }
    }

    #[test]
    fn test_textures_table() {
        let material = Material {
            name: "Hull".into(),
            texture_slots: vec![
                slot(0, TextureType::Image, Some("hull.jpg")),
                slot(1, TextureType::Procedural, None),
                slot(2, TextureType::Image, Some("hull_n.tga")),
            ],
        };
        let text = material_descriptor(&material, &Namespace::new("lvl").unwrap());

        assert_eq!(
            text,
            "return {\n\
             \ttextures = {\n\
             \t\tuTexture0 = 'tex2d:assets/textures/lvl/hull.png',\n\
             \t\tuTexture2 = 'tex2d:assets/textures/lvl/hull_n.png'\n\
             \t}\n\
             }"
        );
    }

    #[test]
    fn test_no_textures() {
        let material = Material {
            name: "Plain".into(),
            texture_slots: vec![slot(0, TextureType::Image, None)],
        };
        assert_eq!(material_descriptor(&material, &Namespace::root()), "return {\n}");
    }
}
