use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::rc::Rc;

use arkui_foundation::grid::{GridItemProperty, GridLayoutWrapper};
use arkui_ui_layout::{Constraints, LayoutWrapper, OffsetF, RectF, SizeF};

/// In-memory stand-in for a grid frame node and its lazily created children.
///
/// Each child reports `main_length(index)` along the unbounded axis of the
/// constraints it is measured with and fills the bounded one.
pub struct FakeGridHost {
    size: SizeF,
    count: usize,
    main_length: Rc<dyn Fn(usize) -> f32>,
    properties: BTreeMap<usize, GridItemProperty>,
    sizes: BTreeMap<usize, SizeF>,
    offsets: BTreeMap<usize, OffsetF>,
    measure_log: Vec<usize>,
    frame: SizeF,
    active: Option<RangeInclusive<usize>>,
    updated: bool,
    focused_text_field_bottom: Option<f32>,
}

impl FakeGridHost {
    pub fn new(width: f32, height: f32, count: usize, item_length: f32) -> Self {
        Self {
            size: SizeF::new(width, height),
            count,
            main_length: Rc::new(move |_| item_length),
            properties: BTreeMap::new(),
            sizes: BTreeMap::new(),
            offsets: BTreeMap::new(),
            measure_log: Vec::new(),
            frame: SizeF::ZERO,
            active: None,
            updated: false,
            focused_text_field_bottom: None,
        }
    }

    pub fn with_main_length(mut self, f: impl Fn(usize) -> f32 + 'static) -> Self {
        self.main_length = Rc::new(f);
        self
    }

    pub fn with_item(mut self, index: usize, property: GridItemProperty) -> Self {
        self.properties.insert(index, property);
        self
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = SizeF::new(width, height);
    }

    /// Replaces the data source with `count` items; cached children are
    /// dropped as a real node would recycle them.
    pub fn set_child_count(&mut self, count: usize) {
        self.count = count;
        self.sizes.retain(|index, _| *index < count);
        self.offsets.retain(|index, _| *index < count);
        self.updated = true;
    }

    pub fn set_focused_text_field_bottom(&mut self, bottom: Option<f32>) {
        self.focused_text_field_bottom = bottom;
    }

    /// Called by the harness once a measure pass has seen the update.
    pub fn acknowledge_update(&mut self) {
        self.updated = false;
    }

    /// Every child measured since the last [`clear_measure_log`](Self::clear_measure_log).
    pub fn measure_log(&self) -> &[usize] {
        &self.measure_log
    }

    pub fn clear_measure_log(&mut self) {
        self.measure_log.clear();
    }

    pub fn active_range(&self) -> Option<RangeInclusive<usize>> {
        self.active.clone()
    }

    pub fn offset_of(&self, index: usize) -> Option<OffsetF> {
        self.offsets.get(&index).copied()
    }
}

impl LayoutWrapper for FakeGridHost {
    fn constraints(&self) -> Constraints {
        Constraints::tight(self.size)
    }

    fn total_child_count(&self) -> usize {
        self.count
    }

    fn measure_child(&mut self, index: usize, constraints: Constraints) -> Option<SizeF> {
        if index >= self.count {
            return None;
        }
        let main = (self.main_length)(index);
        let size = if !constraints.max_height.is_finite() {
            SizeF::new(constraints.max_width, main)
        } else if !constraints.max_width.is_finite() {
            SizeF::new(main, constraints.max_height)
        } else {
            constraints.constrain(SizeF::new(constraints.max_width, main))
        };
        self.measure_log.push(index);
        self.sizes.insert(index, size);
        Some(size)
    }

    fn child_size(&self, index: usize) -> Option<SizeF> {
        self.sizes.get(&index).copied()
    }

    fn place_child(&mut self, index: usize, offset: OffsetF) {
        self.offsets.insert(index, offset);
    }

    fn child_rect(&self, index: usize) -> Option<RectF> {
        let offset = self.offsets.get(&index)?;
        let size = self.sizes.get(&index)?;
        Some(RectF::from_offset_size(*offset, *size))
    }

    fn set_frame_size(&mut self, size: SizeF) {
        self.frame = size;
    }

    fn frame_size(&self) -> SizeF {
        self.frame
    }

    fn set_active_range(&mut self, range: Option<RangeInclusive<usize>>) {
        self.active = range;
    }

    fn children_updated(&self) -> bool {
        self.updated
    }

    fn focused_text_field_bottom(&self) -> Option<f32> {
        self.focused_text_field_bottom
    }
}

impl GridLayoutWrapper for FakeGridHost {
    fn item_property(&self, index: usize) -> GridItemProperty {
        self.properties.get(&index).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkui_ui_layout::Axis;

    #[test]
    fn children_fill_the_bounded_axis() {
        let mut host = FakeGridHost::new(300.0, 500.0, 4, 80.0);
        let vertical = host.measure_child(0, Constraints::for_cell(Axis::Vertical, 100.0));
        let horizontal = host.measure_child(1, Constraints::for_cell(Axis::Horizontal, 120.0));
        assert_eq!(vertical, Some(SizeF::new(100.0, 80.0)));
        assert_eq!(horizontal, Some(SizeF::new(80.0, 120.0)));
        assert_eq!(host.measure_child(4, Constraints::default()), None);
        assert_eq!(host.measure_log(), &[0, 1]);
    }

    #[test]
    fn shrinking_data_drops_cached_children() {
        let mut host = FakeGridHost::new(300.0, 500.0, 10, 80.0);
        host.measure_child(8, Constraints::for_cell(Axis::Vertical, 100.0));
        host.set_child_count(5);
        assert!(host.children_updated());
        assert_eq!(host.child_size(8), None);
    }
}
