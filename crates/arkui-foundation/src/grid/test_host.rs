//! In-crate host used by unit tests of the grid algorithms.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use arkui_ui_layout::{Constraints, LayoutWrapper, OffsetF, RectF, SizeF};

use super::layout_property::GridItemProperty;
use super::layout_wrapper::GridLayoutWrapper;

pub(crate) struct TestHost {
    pub size: SizeF,
    pub count: usize,
    /// Natural main-axis length of every item; items fill their cell across.
    pub item_main: f32,
    pub natural: Option<SizeF>,
    pub properties: BTreeMap<usize, GridItemProperty>,
    pub sizes: BTreeMap<usize, SizeF>,
    pub offsets: BTreeMap<usize, OffsetF>,
    pub measured: Vec<usize>,
    pub frame: SizeF,
    pub active: Option<RangeInclusive<usize>>,
    pub updated: bool,
}

impl TestHost {
    pub fn new(width: f32, height: f32, count: usize, item_main: f32) -> Self {
        Self {
            size: SizeF::new(width, height),
            count,
            item_main,
            natural: None,
            properties: BTreeMap::new(),
            sizes: BTreeMap::new(),
            offsets: BTreeMap::new(),
            measured: Vec::new(),
            frame: SizeF::ZERO,
            active: None,
            updated: false,
        }
    }
}

impl LayoutWrapper for TestHost {
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
        let size = match self.natural {
            Some(natural) => constraints.constrain(natural),
            None => SizeF::new(constraints.max_width, self.item_main),
        };
        self.measured.push(index);
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
        Some(RectF::from_offset_size(
            *self.offsets.get(&index)?,
            *self.sizes.get(&index)?,
        ))
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
}

impl GridLayoutWrapper for TestHost {
    fn item_property(&self, index: usize) -> GridItemProperty {
        self.properties.get(&index).copied().unwrap_or_default()
    }
}
