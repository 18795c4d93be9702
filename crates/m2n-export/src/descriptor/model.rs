//! Model descriptor: one sub-table per material group

use super::lua::{quote, Table};
use crate::geometry::{GeometryLayout, Model};
use crate::naming::{AssetName, Namespace};

/// Render the model file for a model
///
/// Entries follow group insertion order. `start`/`count` are in vertices;
/// in the split layout every group starts at 0 of its own file.
pub fn model_descriptor(model: &Model, layout: GeometryLayout, namespace: &Namespace) -> String {
    let mut table = Table::new();

    for slice in model.slices(layout) {
        let mut entry = Table::new();
        entry
            .push(quote("mesh"))
            .field("start", slice.start.to_string())
            .field("count", slice.count.to_string())
            .field(
                "geometry",
                quote(&AssetName::geometry(namespace, &slice.geometry).to_string()),
            );

        if let Some(material) = &slice.group.material {
            entry.field(
                "material",
                quote(&AssetName::material(namespace, material).to_string()),
            );
        }

        table.keyed(slice.group.key(), entry.render());
    }

    table.document()
}
