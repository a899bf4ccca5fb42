//! Host seam for grid layout algorithms.

use arkui_ui_layout::LayoutWrapper;

use super::layout_property::GridItemProperty;

/// A [`LayoutWrapper`] whose children are grid items.
///
/// Item properties are read lazily, one index at a time, so a data source
/// with millions of entries never has to materialize them all.
pub trait GridLayoutWrapper: LayoutWrapper {
    /// Placement properties of child `index`.
    ///
    /// Defaults to an auto-placed 1x1 item.
    fn item_property(&self, index: usize) -> GridItemProperty {
        let _ = index;
        GridItemProperty::default()
    }
}
