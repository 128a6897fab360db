use crate::{
    core::viewport::Viewport, input::events::MapEvent, layers::base::LayerTrait,
    rendering::context::RenderContext, MapError, Result,
};

use crate::prelude::HashMap;

/// Manages layers for the map, handling ordering and rendering
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for rendering (sorted by z-index)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer; IDs are unique
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(MapError::Layer(format!("layer '{}' already added", layer_id)));
        }
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index, after equal z-indices
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Downcasts a layer to its concrete type
    pub fn get_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layers
            .get(layer_id)
            .and_then(|l| l.as_any().downcast_ref::<T>())
    }

    pub fn get_as_mut<T: 'static>(&mut self, layer_id: &str) -> Option<&mut T> {
        self.layers
            .get_mut(layer_id)
            .and_then(|l| l.as_any_mut().downcast_mut::<T>())
    }

    /// Layer IDs in render order
    pub fn list_layers(&self) -> Vec<String> {
        self.render_order.clone()
    }

    /// Forwards a map event to each layer in render order
    pub fn dispatch(&mut self, event: &MapEvent) {
        for id in &self.render_order {
            if let Some(layer) = self.layers.get_mut(id) {
                layer.on_map_event(event);
            }
        }
    }

    /// Advances layer animations; true if any layer is still animating
    pub fn update(&mut self, delta_time: f64) -> bool {
        let mut animating = false;
        for layer in self.layers.values_mut() {
            animating |= layer.update(delta_time);
        }
        animating
    }

    /// Renders all visible layers in order
    pub fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        for layer_id in &self.render_order {
            if let Some(layer) = self.layers.get_mut(layer_id) {
                if layer.is_visible() {
                    layer.render(context, viewport)?;
                }
            }
        }
        Ok(())
    }

    /// Updates the render order based on current z-indices
    pub fn update_render_order(&mut self) {
        let layers = &self.layers;
        self.render_order.sort_by_key(|id| layers.get(id).map(|l| l.z_index()).unwrap_or(0));
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::base::{LayerProperties, LayerType};

    struct Probe {
        properties: LayerProperties,
        events: usize,
    }

    impl Probe {
        fn new(id: &str, z: i32) -> Self {
            Self {
                properties: LayerProperties::new(id, id, LayerType::Tile).with_z_index(z),
                events: 0,
            }
        }
    }

    impl LayerTrait for Probe {
        crate::impl_layer_trait!(Probe, properties);

        fn render(&mut self, context: &mut RenderContext, _viewport: &Viewport) -> Result<()> {
            context.fill(crate::rendering::context::Color::WHITE);
            Ok(())
        }

        fn on_map_event(&mut self, _event: &MapEvent) {
            self.events += 1;
        }
    }

    #[test]
    fn test_render_order_follows_z_index() {
        let mut manager = LayerManager::new();
        manager.add_layer(Box::new(Probe::new("markers", 10))).unwrap();
        manager.add_layer(Box::new(Probe::new("base", 0))).unwrap();
        manager.add_layer(Box::new(Probe::new("overlay", 1))).unwrap();

        assert_eq!(manager.list_layers(), vec!["base", "overlay", "markers"]);
    }

    #[test]
    fn test_duplicate_ids_rejected_and_removal() {
        let mut manager = LayerManager::new();
        manager.add_layer(Box::new(Probe::new("base", 0))).unwrap();
        assert!(manager.add_layer(Box::new(Probe::new("base", 0))).is_err());

        assert!(manager.has_layer("base"));
        assert!(manager.remove_layer("base").is_some());
        assert!(manager.remove_layer("base").is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_dispatch_and_hidden_layers() {
        let mut manager = LayerManager::new();
        manager.add_layer(Box::new(Probe::new("a", 0))).unwrap();
        manager.add_layer(Box::new(Probe::new("b", 1))).unwrap();
        manager.with_layer_mut("b", |l| l.set_visible(false));

        manager.dispatch(&MapEvent::Zoom { zoom: 3.0 });
        assert_eq!(manager.get_as::<Probe>("a").map(|p| p.events), Some(1));

        let mut context = RenderContext::new(10, 10);
        manager.render(&mut context, &Viewport::default()).unwrap();
        assert_eq!(context.get_drawing_queue().len(), 1);
    }

    #[test]
    fn test_reorder_after_z_index_change() {
        let mut manager = LayerManager::new();
        manager.add_layer(Box::new(Probe::new("a", 0))).unwrap();
        manager.add_layer(Box::new(Probe::new("b", 1))).unwrap();

        manager.with_layer_mut("a", |l| {
            l.set_z_index(5);
            l.set_opacity(3.0);
        });
        manager.update_render_order();

        assert_eq!(manager.list_layers(), vec!["b", "a"]);
        assert_eq!(manager.get_layer("a").map(|l| l.opacity()), Some(1.0));
    }
}
