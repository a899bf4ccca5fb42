use std::ops::RangeInclusive;

use crate::constraints::Constraints;
use crate::geometry::{OffsetF, RectF, SizeF};

/// Host seam between a layout algorithm and the node it lays out.
///
/// Implemented by the framework's frame node (and by test fakes). Children
/// are addressed by their index in the data source.
pub trait LayoutWrapper {
    /// Constraints the parent imposed on this node for the current frame.
    fn constraints(&self) -> Constraints;

    /// Number of children the data source currently provides.
    fn total_child_count(&self) -> usize;

    /// Measures child `index`; `None` when the child cannot be created.
    fn measure_child(&mut self, index: usize, constraints: Constraints) -> Option<SizeF>;

    /// Size recorded by the last `measure_child` call for `index`.
    fn child_size(&self, index: usize) -> Option<SizeF>;

    /// Writes the final offset of child `index` into its geometry node.
    fn place_child(&mut self, index: usize, offset: OffsetF);

    /// Paint rect of child `index` from its geometry node.
    fn child_rect(&self, index: usize) -> Option<RectF>;

    fn set_frame_size(&mut self, size: SizeF);

    fn frame_size(&self) -> SizeF;

    /// Children outside `range` are deactivated (kept cached, not rendered).
    fn set_active_range(&mut self, range: Option<RangeInclusive<usize>>);

    /// Whether the data source was mutated since the last measure pass.
    fn children_updated(&self) -> bool {
        false
    }

    /// Main-axis bottom edge of a focused text field inside this node, if any.
    fn focused_text_field_bottom(&self) -> Option<f32> {
        None
    }
}
