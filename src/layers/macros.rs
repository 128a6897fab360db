/// Wires a layer's `LayerProperties` field and downcasting into `LayerTrait`.
///
/// ```ignore
/// impl LayerTrait for MarkerLayer {
///     campusmap::impl_layer_trait!(MarkerLayer, properties);
///
///     fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
///         // ...
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_layer_trait {
    ($layer:ty, $field:ident) => {
        fn properties(&self) -> &$crate::layers::base::LayerProperties {
            &self.$field
        }

        fn properties_mut(&mut self) -> &mut $crate::layers::base::LayerProperties {
            &mut self.$field
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self as &$layer
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self as &mut $layer
        }
    };
}
