use annotkit_core::DVec2;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::ModelError;
use crate::item::{AnnotationItem, Geometry, ItemData, ItemId, LayerId};
use crate::layer::{ItemEvent, Layer};

/// Ordered stack of layers. Every mutation goes through here so the owning layer can publish
/// the matching [`ItemEvent`].
#[derive(Debug, Default)]
pub struct Scene {
    layers: IndexMap<LayerId, Layer>,
    next_item: u64,
    next_layer: u64,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, name: Option<String>) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers.insert(id, Layer::new(id, name));
        id
    }

    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Mutable access for subscribing to a layer's events.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> impl DoubleEndedIterator<Item = &Layer> {
        self.layers.values()
    }

    /// All items in paint order, bottom to top.
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &AnnotationItem> {
        self.layers.values().flat_map(|l| l.items.values())
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&AnnotationItem> {
        self.layers.values().find_map(|l| l.items.get(&id))
    }

    #[must_use]
    pub fn selected(&self) -> Vec<ItemId> {
        self.items().filter(|i| i.selected).map(|i| i.id).collect()
    }

    pub fn insert_item(&mut self, layer: LayerId, data: ItemData) -> Result<ItemId, ModelError> {
        let id = ItemId(self.next_item);
        let owner = self
            .layers
            .get_mut(&layer)
            .ok_or(ModelError::UnknownLayer(layer))?;
        self.next_item += 1;
        debug!(item = %id, %layer, kind = %data.geometry.kind(), "item added");
        owner.items.insert(
            id,
            AnnotationItem {
                id,
                layer,
                data,
                selected: false,
            },
        );
        owner.emit(ItemEvent::Added(id));
        Ok(id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<AnnotationItem, ModelError> {
        let layer = self.owner_mut(id)?;
        let item = layer
            .items
            .shift_remove(&id)
            .ok_or(ModelError::UnknownItem(id))?;
        debug!(item = %id, "item removed");
        layer.emit(ItemEvent::Removed(id));
        Ok(item)
    }

    /// Drop a layer and everything it owns, publishing `Removed` for each item first.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<Vec<AnnotationItem>, ModelError> {
        let mut layer = self
            .layers
            .shift_remove(&id)
            .ok_or(ModelError::UnknownLayer(id))?;
        let items: Vec<AnnotationItem> = layer.items.drain(..).map(|(_, item)| item).collect();
        for item in &items {
            layer.emit(ItemEvent::Removed(item.id));
        }
        debug!(layer = %id, removed = items.len(), "layer removed");
        Ok(items)
    }

    /// Replace an item's geometry. The variant must match the one it was created with.
    pub fn set_geometry(&mut self, id: ItemId, geometry: Geometry) -> Result<(), ModelError> {
        let layer = self.owner_mut(id)?;
        let item = layer
            .items
            .get_mut(&id)
            .ok_or(ModelError::UnknownItem(id))?;
        let (expected, found) = (item.data.geometry.kind(), geometry.kind());
        if expected != found {
            return Err(ModelError::VariantMismatch { expected, found });
        }
        item.data.geometry = geometry;
        layer.emit(ItemEvent::GeometryChanged(id));
        Ok(())
    }

    pub fn translate(&mut self, id: ItemId, delta: DVec2) -> Result<(), ModelError> {
        let layer = self.owner_mut(id)?;
        let item = layer
            .items
            .get_mut(&id)
            .ok_or(ModelError::UnknownItem(id))?;
        item.data.geometry.translate(delta);
        layer.emit(ItemEvent::GeometryChanged(id));
        Ok(())
    }

    pub fn set_label(&mut self, id: ItemId, label: Option<String>) -> Result<(), ModelError> {
        let layer = self.owner_mut(id)?;
        let item = layer
            .items
            .get_mut(&id)
            .ok_or(ModelError::UnknownItem(id))?;
        if item.data.label == label {
            return Ok(());
        }
        item.data.label.clone_from(&label);
        layer.emit(ItemEvent::LabelChanged { item: id, label });
        Ok(())
    }

    /// Returns whether the selection state changed.
    pub fn select(&mut self, id: ItemId) -> Result<bool, ModelError> {
        self.set_selected(id, true)
    }

    pub fn deselect(&mut self, id: ItemId) -> Result<bool, ModelError> {
        self.set_selected(id, false)
    }

    /// Flip selection; returns the new state.
    pub fn toggle(&mut self, id: ItemId) -> Result<bool, ModelError> {
        let selected = self
            .item(id)
            .map(|i| i.selected)
            .ok_or(ModelError::UnknownItem(id))?;
        self.set_selected(id, !selected)?;
        Ok(!selected)
    }

    /// Returns how many items were deselected.
    pub fn deselect_all(&mut self) -> usize {
        let mut count = 0;
        for layer in self.layers.values_mut() {
            let ids: Vec<ItemId> = layer
                .items
                .values_mut()
                .filter(|i| i.selected)
                .map(|i| {
                    i.selected = false;
                    i.id
                })
                .collect();
            count += ids.len();
            for id in ids {
                layer.emit(ItemEvent::Deselected(id));
            }
        }
        count
    }

    /// Publish pointer hover transitions for an item.
    pub fn hover(&mut self, id: ItemId, entered: bool) -> Result<(), ModelError> {
        let layer = self.owner_mut(id)?;
        layer.emit(if entered {
            ItemEvent::HoverEnter(id)
        } else {
            ItemEvent::HoverLeave(id)
        });
        Ok(())
    }

    fn set_selected(&mut self, id: ItemId, selected: bool) -> Result<bool, ModelError> {
        let layer = self.owner_mut(id)?;
        let item = layer
            .items
            .get_mut(&id)
            .ok_or(ModelError::UnknownItem(id))?;
        if item.selected == selected {
            return Ok(false);
        }
        item.selected = selected;
        layer.emit(if selected {
            ItemEvent::Selected(id)
        } else {
            ItemEvent::Deselected(id)
        });
        Ok(true)
    }

    fn owner_mut(&mut self, id: ItemId) -> Result<&mut Layer, ModelError> {
        self.layers
            .values_mut()
            .find(|l| l.items.contains_key(&id))
            .ok_or(ModelError::UnknownItem(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotkit_geometry::{Rectangle, Region};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn rect_data() -> ItemData {
        ItemData::new(Geometry::Rectangle(Rectangle::spanning(
            DVec2::ZERO,
            DVec2::new(10.0, 10.0),
            0.0,
        )))
    }

    fn recorder(scene: &mut Scene, layer: LayerId) -> Rc<RefCell<Vec<ItemEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        scene
            .layer_mut(layer)
            .unwrap()
            .subscribe(move |e| sink.borrow_mut().push(e.clone()));
        log
    }

    #[test]
    fn mutations_publish_events() {
        let mut scene = Scene::new();
        let layer = scene.add_layer(None);
        let log = recorder(&mut scene, layer);

        let id = scene.insert_item(layer, rect_data()).unwrap();
        scene.select(id).unwrap();
        scene.translate(id, DVec2::new(1.0, 0.0)).unwrap();
        scene.set_label(id, Some("tumor".into())).unwrap();
        scene.remove_item(id).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                ItemEvent::Added(id),
                ItemEvent::Selected(id),
                ItemEvent::GeometryChanged(id),
                ItemEvent::LabelChanged {
                    item: id,
                    label: Some("tumor".into())
                },
                ItemEvent::Removed(id),
            ]
        );
    }

    #[test]
    fn geometry_variant_is_fixed() {
        let mut scene = Scene::new();
        let layer = scene.add_layer(None);
        let id = scene.insert_item(layer, rect_data()).unwrap();
        let err = scene
            .set_geometry(id, Geometry::Region(Region::empty()))
            .unwrap_err();
        assert!(matches!(err, ModelError::VariantMismatch { .. }));
    }

    #[test]
    fn removing_layer_removes_items() {
        let mut scene = Scene::new();
        let layer = scene.add_layer(Some("cells".into()));
        let log = recorder(&mut scene, layer);
        let a = scene.insert_item(layer, rect_data()).unwrap();
        let b = scene.insert_item(layer, rect_data()).unwrap();
        log.borrow_mut().clear();

        let removed = scene.remove_layer(layer).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(scene.item(a).is_none());
        assert_eq!(
            *log.borrow(),
            vec![ItemEvent::Removed(a), ItemEvent::Removed(b)]
        );
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let mut scene = Scene::new();
        let layer = scene.add_layer(None);
        let log = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&log);
        let token = scene
            .layer_mut(layer)
            .unwrap()
            .subscribe(move |_| *sink.borrow_mut() += 1);
        scene.insert_item(layer, rect_data()).unwrap();
        assert!(scene.layer_mut(layer).unwrap().unsubscribe(token));
        scene.insert_item(layer, rect_data()).unwrap();
        assert_eq!(*log.borrow(), 1);
    }

    #[test]
    fn toggle_and_deselect_all() {
        let mut scene = Scene::new();
        let layer = scene.add_layer(None);
        let a = scene.insert_item(layer, rect_data()).unwrap();
        let b = scene.insert_item(layer, rect_data()).unwrap();
        assert!(scene.toggle(a).unwrap());
        assert!(scene.toggle(b).unwrap());
        assert!(!scene.toggle(a).unwrap());
        assert_eq!(scene.selected(), vec![b]);
        assert_eq!(scene.deselect_all(), 1);
        assert!(scene.selected().is_empty());
    }
}
