use std::cell::RefCell;
use std::rc::Rc;

use arkui_core::{DirtyFlags, DirtyTracker, HostNode};
use arkui_foundation::grid::{
    FocusHandle, FocusStep, GridLayoutInfo, GridLayoutProperty, GridPattern, ItemDragInfo, KeyCode,
    KeyEvent, ScrollAlign, ScrollSource,
};
use arkui_ui_layout::{OffsetF, RectF};

use crate::fake_host::FakeGridHost;

const GRID_NODE: u64 = 1;
const MAX_FRAMES: usize = 100;

/// Drives a [`GridPattern`] against a [`FakeGridHost`] the way the pipeline
/// would: input marks the node dirty and [`await_idle`](Self::await_idle)
/// runs frames until it is clean.
pub struct GridTestRule {
    tracker: Rc<RefCell<DirtyTracker>>,
    pattern: GridPattern,
    host: FakeGridHost,
    frames: usize,
}

impl GridTestRule {
    pub fn new(property: GridLayoutProperty, host: FakeGridHost) -> Self {
        Self::with_setup(property, host, |_| {})
    }

    /// Like [`new`](Self::new), running `setup` (typically callback
    /// registration) before the first frame.
    pub fn with_setup(
        property: GridLayoutProperty,
        host: FakeGridHost,
        setup: impl FnOnce(&mut GridPattern),
    ) -> Self {
        let tracker = Rc::new(RefCell::new(DirtyTracker::new()));
        let node = HostNode::new(GRID_NODE, tracker.clone());
        node.mark_dirty(DirtyFlags::MEASURE);
        let mut pattern = GridPattern::new(property, node);
        setup(&mut pattern);
        let mut rule = Self {
            pattern,
            tracker,
            host,
            frames: 0,
        };
        rule.await_idle();
        rule
    }

    pub fn pattern(&self) -> &GridPattern {
        &self.pattern
    }

    pub fn pattern_mut(&mut self) -> &mut GridPattern {
        &mut self.pattern
    }

    pub fn host(&self) -> &FakeGridHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut FakeGridHost {
        &mut self.host
    }

    pub fn info(&self) -> &GridLayoutInfo {
        self.pattern.layout_info()
    }

    /// Frames run since the rule was created.
    pub fn frames(&self) -> usize {
        self.frames
    }

    fn is_dirty(&self) -> bool {
        self.tracker.borrow().is_dirty(
            GRID_NODE,
            DirtyFlags::MEASURE | DirtyFlags::MEASURE_SELF | DirtyFlags::LAYOUT,
        )
    }

    pub fn await_idle(&mut self) {
        let mut i = 0;
        while self.is_dirty() {
            self.pattern.flush(&mut self.host);
            self.host.acknowledge_update();
            self.frames += 1;
            i += 1;
            if i > MAX_FRAMES {
                panic!("grid failed to settle after {MAX_FRAMES} frames");
            }
        }
    }

    /// One drag step of `delta` (negative scrolls toward the end).
    pub fn drag_by(&mut self, delta: f32) -> bool {
        let consumed = self.pattern.update_current_offset(delta, ScrollSource::Drag);
        self.await_idle();
        consumed
    }

    /// A whole gesture: drags by `delta` in `steps` equal parts, then lifts.
    pub fn swipe(&mut self, delta: f32, steps: usize) {
        let steps = steps.max(1);
        for _ in 0..steps {
            self.drag_by(delta / steps as f32);
        }
        self.end_scroll();
    }

    pub fn fling_by(&mut self, delta: f32) -> bool {
        let consumed = self.pattern.update_current_offset(delta, ScrollSource::Fling);
        self.await_idle();
        consumed
    }

    pub fn end_scroll(&mut self) {
        self.pattern.on_scroll_end_callback();
        self.await_idle();
    }

    pub fn scroll_to_index(&mut self, index: i32, align: ScrollAlign) {
        self.pattern.scroll_to_index(index, align);
        self.await_idle();
    }

    pub fn press_key(&mut self, code: KeyCode) -> bool {
        let handled = self.pattern.on_key_event(KeyEvent::down(code));
        self.await_idle();
        handled
    }

    /// Moves focus from `current` and lets any scroll it requested settle.
    pub fn move_focus(&mut self, current: FocusHandle, step: FocusStep) -> Option<FocusHandle> {
        let next = self.pattern.get_next_focus_node(current, step);
        self.await_idle();
        next
    }

    pub fn set_child_count(&mut self, count: usize) {
        self.host.set_child_count(count);
        self.pattern.on_children_changed();
        self.await_idle();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.host.resize(width, height);
        self.tracker
            .borrow_mut()
            .mark_dirty(GRID_NODE, DirtyFlags::MEASURE);
        self.await_idle();
    }

    pub fn update_property(&mut self, property: GridLayoutProperty) {
        self.pattern.update_layout_property(property);
        self.pattern.on_modify_done();
        self.await_idle();
    }

    pub fn drag_item(&mut self, item_index: i32, insert_index: i32) {
        let drag = ItemDragInfo::default();
        self.pattern.handle_item_drag_move(drag, item_index, insert_index, &mut self.host);
        self.await_idle();
    }

    pub fn select(&mut self, area: RectF) {
        self.pattern.handle_mouse_select(area, &self.host);
    }

    /// Indices the grid keeps active, in order.
    pub fn visible_items(&self) -> Vec<usize> {
        self.host
            .active_range()
            .map(|range| range.collect())
            .unwrap_or_default()
    }

    pub fn offset_of(&self, index: usize) -> Option<OffsetF> {
        self.host.offset_of(index)
    }
}
