//! Pattern of a grid node: owns the committed [`GridLayoutInfo`], picks a
//! layout algorithm each frame and adopts its result, and turns scroll, key,
//! focus, selection and drag input into state changes on the info.
//!
//! Nothing here measures synchronously except drag reordering, which flushes
//! a frame immediately so the moved item follows the pointer.

use std::collections::BTreeSet;

use arkui_core::collections::map::HashSet;
use arkui_core::{DirtyFlags, HostNode};
use arkui_ui_layout::{LayoutWrapper, RectF};

use crate::error::GridError;

use super::algorithm::GridLayoutAlgorithmKind;
use super::events::{GridEventHub, ItemDragInfo, KeyAction, KeyCode, KeyEvent};
use super::focus::{self, FocusHandle, FocusOutcome, FocusStep};
use super::layout_info::{GridLayoutInfo, ScrollAlign, LAST_ITEM};
use super::layout_property::GridLayoutProperty;
use super::layout_wrapper::GridLayoutWrapper;
use super::prefetch::{PrefetchScheduler, PrefetchStrategy};
use super::scrollable::{can_over_scroll, EdgeState, ScrollSource, ScrollState, ScrollTracker};

const EPSILON: f32 = 0.001;

/// Which phases actually ran for the frame being adopted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtySwapConfig {
    pub skip_measure: bool,
    pub skip_layout: bool,
}

/// Scroll bar position derived from the content estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollBarMetrics {
    pub offset: f32,
    pub content_height: f32,
}

pub struct GridPattern {
    info: GridLayoutInfo,
    property: GridLayoutProperty,
    host: HostNode,
    events: GridEventHub,
    scroll: ScrollTracker,
    prefetch: PrefetchScheduler,
    scrollable: bool,
    scroll_bar: ScrollBarMetrics,
    prev_content_offset: f32,
    last_scroll_index: Option<(i32, i32)>,
    prev_reach_start: bool,
    prev_reach_end: bool,
    focus_generation: u64,
    unfocusable: HashSet<i32>,
    selected: BTreeSet<i32>,
    drag_item: Option<i32>,
}

impl GridPattern {
    pub fn new(property: GridLayoutProperty, host: HostNode) -> Self {
        let info = GridLayoutInfo::with_axis(property.axis());
        Self {
            info,
            scrollable: property.is_configured_scrollable() && property.scroll_enabled,
            property,
            host,
            events: GridEventHub::new(),
            scroll: ScrollTracker::new(),
            prefetch: PrefetchScheduler::new(),
            scroll_bar: ScrollBarMetrics::default(),
            prev_content_offset: 0.0,
            last_scroll_index: None,
            prev_reach_start: false,
            prev_reach_end: false,
            focus_generation: 0,
            unfocusable: HashSet::default(),
            selected: BTreeSet::new(),
            drag_item: None,
        }
    }

    pub fn layout_info(&self) -> &GridLayoutInfo {
        &self.info
    }

    pub fn layout_property(&self) -> &GridLayoutProperty {
        &self.property
    }

    pub fn host(&self) -> &HostNode {
        &self.host
    }

    pub fn events_mut(&mut self) -> &mut GridEventHub {
        &mut self.events
    }

    pub fn is_scrollable(&self) -> bool {
        self.scrollable
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    pub fn scroll_bar(&self) -> ScrollBarMetrics {
        self.scroll_bar
    }

    pub fn fade_overscroll(&self) -> f32 {
        self.scroll.fade_overscroll()
    }

    fn mark_dirty(&self) {
        self.host.mark_dirty(DirtyFlags::MEASURE_SELF);
    }

    // Frame.

    /// A fresh algorithm bound to a copy of the committed info.
    pub fn create_layout_algorithm(&self) -> GridLayoutAlgorithmKind {
        let over_scroll = self.scroll.is_scroll_in_progress()
            && can_over_scroll(self.property.edge_effect, self.scroll.source());
        GridLayoutAlgorithmKind::select(&self.info, &self.property, over_scroll)
    }

    /// Adopts the info the algorithm produced and reports what changed.
    /// Returns whether the node needs repainting.
    pub fn on_dirty_layout_wrapper_swap(
        &mut self,
        algorithm: GridLayoutAlgorithmKind,
        config: DirtySwapConfig,
    ) -> bool {
        if config.skip_measure && config.skip_layout {
            return false;
        }
        let scrollable_layout = algorithm.is_scrollable();
        self.info = algorithm.into_layout_info();
        self.host
            .mark_clean(DirtyFlags::MEASURE | DirtyFlags::MEASURE_SELF | DirtyFlags::LAYOUT);

        let delta = self.process_event();
        self.check_scrollable();
        if scrollable_layout {
            self.update_prefetch(delta);
        }
        true
    }

    /// Measures, lays out and adopts one frame right away.
    pub fn flush(&mut self, wrapper: &mut dyn GridLayoutWrapper) -> bool {
        let mut algorithm = self.create_layout_algorithm();
        algorithm.measure(wrapper);
        algorithm.layout(wrapper);
        self.on_dirty_layout_wrapper_swap(algorithm, DirtySwapConfig::default())
    }

    fn content_offset(&self) -> f32 {
        let gap = self.property.main_gap();
        match &self.property.layout_options {
            Some(options) => self.info.get_content_offset_with_options(options, gap),
            None => self.info.get_content_offset(gap),
        }
    }

    fn content_height(&self) -> f32 {
        let gap = self.property.main_gap();
        match &self.property.layout_options {
            Some(options) => self.info.get_content_height_with_options(options, gap),
            None => self.info.get_content_height(gap),
        }
    }

    /// Fires scroll callbacks for the frame just adopted and returns the
    /// content offset change (positive toward the end).
    fn process_event(&mut self) -> f32 {
        let offset = self.content_offset();
        let delta = offset - self.prev_content_offset;
        self.prev_content_offset = offset;

        if self.scroll.take_start() {
            self.events.fire_scroll_start();
        }
        if delta.abs() > EPSILON {
            self.events.fire_scroll(delta, self.scroll.state());
        }

        let index = (self.info.start_index, self.info.end_index);
        if self.last_scroll_index != Some(index) {
            self.last_scroll_index = Some(index);
            self.events.fire_scroll_index(index.0, index.1);
        }

        if self.info.reach_start && !self.prev_reach_start {
            self.events.fire_reach_start();
        }
        self.prev_reach_start = self.info.reach_start;
        if self.info.offset_end && !self.prev_reach_end {
            self.events.fire_reach_end();
        }
        self.prev_reach_end = self.info.offset_end;

        if self.scroll.take_stop() {
            self.events.fire_scroll_stop();
        }

        let estimate = ScrollBarMetrics {
            offset,
            content_height: self.content_height(),
        };
        self.scroll_bar = match self.events.fire_scroll_bar_update(self.info.start_index, offset) {
            Some((offset, content_height)) => ScrollBarMetrics {
                offset,
                content_height,
            },
            None => estimate,
        };
        delta
    }

    /// The grid stops scrolling when all of its content is in view, unless
    /// the edge effect is always enabled.
    fn check_scrollable(&mut self) {
        let info = &self.info;
        let fits = info.start_index == 0
            && info.end_index >= info.children_count - 1
            && info.total_height_of_items_in_view <= info.last_main_size + EPSILON
            && !info.is_out_of_start()
            && !info.is_out_of_end();
        self.scrollable = self.property.scroll_enabled
            && self.property.is_configured_scrollable()
            && (self.property.always_enabled || !fits);
    }

    fn update_prefetch(&mut self, delta: f32) {
        let (start, end) = (self.info.start_index, self.info.end_index);
        if start < 0 || end < start {
            return;
        }
        let strategy = PrefetchStrategy::for_grid(self.property.cached_count, self.info.cross_count);
        self.prefetch
            .update(start, end, self.info.children_count, delta >= 0.0, strategy);
    }

    /// Items the host should create ahead of time.
    pub fn take_prefetch_indices(&mut self) -> Vec<i32> {
        self.prefetch.take()
    }

    // Scrolling.

    /// Applies a main-axis delta (positive reveals earlier content). Returns
    /// `false` only when the edge effect swallowed the delta.
    pub fn update_current_offset(&mut self, offset: f32, source: ScrollSource) -> bool {
        if !self.property.is_configured_scrollable() || !self.scrollable {
            return true;
        }
        self.scroll.begin(source);
        let edges = EdgeState {
            reach_start: self.info.reach_start,
            reach_end: self.info.reach_end,
            current_offset: self.info.current_offset,
            content_in_view: self.info.total_height_of_items_in_view,
            main_size: self.info.last_main_size,
        };
        let Some(delta) = self
            .scroll
            .apply_edge_effect(self.property.edge_effect, edges, offset)
        else {
            return false;
        };
        self.info.prev_offset = self.info.current_offset;
        self.info.current_offset += delta;
        self.mark_dirty();
        true
    }

    /// Ends the current gesture. An overscrolled spring settles on the next
    /// frame since overscroll is only permitted while scrolling.
    pub fn on_scroll_end_callback(&mut self) {
        self.scroll.end();
        self.mark_dirty();
    }

    /// Requests `index` (or [`LAST_ITEM`]) be brought into view with `align`.
    pub fn scroll_to_index(&mut self, index: i32, align: ScrollAlign) {
        if !self.property.is_configured_scrollable() {
            log::debug!("grid is not scrollable, scroll to {index} ignored");
            return;
        }
        let known = self.info.children_count;
        if index != LAST_ITEM && (index < 0 || (known > 0 && index >= known)) {
            log::debug!("scroll to {index} ignored, {known} items");
            return;
        }
        self.scroll.begin(ScrollSource::Jump);
        self.info.jump_index = Some(index);
        self.info.scroll_align = align;
        self.mark_dirty();
    }

    pub fn update_start_index(&mut self, index: i32) {
        self.scroll_to_index(index, ScrollAlign::Auto);
    }

    /// Moves one viewport toward the start (`reverse`) or the end.
    pub fn scroll_page(&mut self, reverse: bool) {
        let page = self.info.last_main_size;
        let delta = if reverse { page } else { -page };
        self.update_current_offset(delta, ScrollSource::Jump);
    }

    /// Scrolls the content by `pixels` toward the end.
    pub fn scroll_by(&mut self, pixels: f32) {
        self.update_current_offset(-pixels, ScrollSource::Jump);
    }

    /// Scrolls so that the estimated content offset becomes `position`.
    pub fn scroll_to(&mut self, position: f32) {
        let delta = self.content_offset() - position;
        if delta.abs() > EPSILON {
            self.update_current_offset(delta, ScrollSource::Jump);
        }
    }

    pub fn scroll_to_edge(&mut self, top: bool) {
        if top {
            self.scroll_to_index(0, ScrollAlign::Start);
        } else {
            self.scroll_to_index(LAST_ITEM, ScrollAlign::End);
        }
    }

    // Input.

    /// PageUp/PageDown scroll by a page; arrows and Tab are left to focus.
    pub fn on_key_event(&mut self, event: KeyEvent) -> bool {
        if event.action != KeyAction::Down {
            return false;
        }
        match event.code {
            KeyCode::PageUp => {
                self.scroll_page(true);
                true
            }
            KeyCode::PageDown => {
                self.scroll_page(false);
                true
            }
            _ => false,
        }
    }

    /// Focus step a key press asks for.
    pub fn focus_step_for_key(event: KeyEvent) -> Option<FocusStep> {
        if event.action != KeyAction::Down {
            return None;
        }
        Some(match event.code {
            KeyCode::Up => FocusStep::Up,
            KeyCode::Down => FocusStep::Down,
            KeyCode::Left => FocusStep::Left,
            KeyCode::Right => FocusStep::Right,
            KeyCode::Tab if event.shift => FocusStep::ShiftTab,
            KeyCode::Tab => FocusStep::Tab,
            _ => return None,
        })
    }

    // Focus.

    pub fn set_item_focusable(&mut self, index: i32, focusable: bool) {
        if focusable {
            self.unfocusable.remove(&index);
        } else {
            self.unfocusable.insert(index);
        }
    }

    pub fn focus_handle(&self, item_index: i32) -> Option<FocusHandle> {
        (item_index >= 0
            && item_index < self.info.children_count
            && !self.unfocusable.contains(&item_index))
        .then(|| FocusHandle::new(item_index, self.focus_generation))
    }

    /// Item behind `handle`, if the data source has not changed since.
    pub fn resolve_focus(&self, handle: FocusHandle) -> Option<i32> {
        (handle.generation() == self.focus_generation).then(|| handle.item_index())
    }

    /// Next item to focus from `current` on `step`. Targets outside the
    /// window are scrolled into view; a target on a line never recorded only
    /// scrolls, and focus stays put for this step.
    pub fn get_next_focus_node(&mut self, current: FocusHandle, step: FocusStep) -> Option<FocusHandle> {
        let Some(item) = self.resolve_focus(current) else {
            log::debug!("stale focus handle for item {}", current.item_index());
            return None;
        };
        let unfocusable = &self.unfocusable;
        let outcome = focus::next_focus(&self.info, item, step, |i| !unfocusable.contains(&i));
        match outcome {
            FocusOutcome::Item(next) => {
                if next < self.info.start_index || next > self.info.end_index {
                    self.scroll_to_index(next, ScrollAlign::Auto);
                }
                Some(FocusHandle::new(next, self.focus_generation))
            }
            FocusOutcome::ScrollTo(index) => {
                self.scroll_to_index(index, ScrollAlign::Auto);
                None
            }
            FocusOutcome::None => None,
        }
    }

    /// The data source changed: stale focus handles stop resolving and the
    /// matrix is rebuilt on the next frame.
    pub fn on_children_changed(&mut self) {
        self.focus_generation += 1;
        self.selected.clear();
        self.prefetch.reset();
        self.host.mark_dirty(DirtyFlags::MEASURE);
    }

    // Multi-select.

    /// Selects the windowed items intersecting the mouse `selection` rect.
    pub fn handle_mouse_select(&mut self, selection: RectF, wrapper: &dyn LayoutWrapper) {
        if !self.property.multi_selectable {
            return;
        }
        let area = selection.normalized();
        for index in self.info.start_index.max(0)..=self.info.end_index {
            let hit = wrapper
                .child_rect(index as usize)
                .is_some_and(|rect| rect.intersects(&area));
            let changed = if hit {
                self.selected.insert(index)
            } else {
                self.selected.remove(&index)
            };
            if changed {
                self.events.fire_item_select(index, hit);
            }
        }
    }

    pub fn clear_multi_select(&mut self) {
        for index in std::mem::take(&mut self.selected) {
            self.events.fire_item_select(index, false);
        }
    }

    pub fn selected_items(&self) -> impl Iterator<Item = i32> + '_ {
        self.selected.iter().copied()
    }

    // Drag reorder.

    /// Moves the dragged item to the slot of `insert_index` and lays out
    /// the result immediately. `item_index == -1` is an item dragged in
    /// from another grid, which may also be inserted after the last item.
    pub fn move_items(
        &mut self,
        item_index: i32,
        insert_index: i32,
        wrapper: &mut dyn GridLayoutWrapper,
    ) -> bool {
        let children = self.info.children_count;
        let in_bounds = if item_index == -1 {
            (0..=children).contains(&insert_index)
        } else {
            (0..children).contains(&insert_index)
        };
        if !in_bounds {
            log::debug!("drag insert index {insert_index} out of bounds ({children} items)");
            return false;
        }
        if item_index == -1 {
            self.update_rect_of_dragged_in_item(insert_index, wrapper);
        }
        self.info.swap_items(item_index, insert_index);
        self.mark_dirty();
        self.flush(wrapper);
        true
    }

    /// Remembers where an item dragged in from elsewhere will land.
    pub fn update_rect_of_dragged_in_item(&mut self, insert_index: i32, wrapper: &dyn LayoutWrapper) {
        let position = self.info.get_position_by_item_index(insert_index);
        self.info.current_rect = usize::try_from(position)
            .ok()
            .and_then(|position| wrapper.child_rect(position))
            .unwrap_or_default();
    }

    pub fn clear_drag_state(&mut self) {
        self.info.clear_drag_state();
        self.drag_item = None;
        self.mark_dirty();
    }

    pub fn dragging_item(&self) -> Option<i32> {
        self.drag_item
    }

    pub fn handle_item_drag_start(&mut self, drag: ItemDragInfo, item_index: i32) -> bool {
        if !self.property.editable {
            return false;
        }
        let allowed = self.events.fire_item_drag_start(drag, item_index);
        if allowed {
            self.drag_item = Some(item_index);
        }
        allowed
    }

    pub fn handle_item_drag_enter(&mut self, drag: ItemDragInfo) {
        self.events.fire_item_drag_enter(drag);
    }

    pub fn handle_item_drag_move(
        &mut self,
        drag: ItemDragInfo,
        item_index: i32,
        insert_index: i32,
        wrapper: &mut dyn GridLayoutWrapper,
    ) {
        if self.property.editable {
            self.move_items(item_index, insert_index, wrapper);
        }
        self.events.fire_item_drag_move(drag, item_index, insert_index);
    }

    pub fn handle_item_drag_leave(&mut self, drag: ItemDragInfo, item_index: i32) {
        self.events.fire_item_drag_leave(drag, item_index);
        if self.property.editable {
            self.clear_drag_state();
        }
    }

    pub fn handle_item_drop(&mut self, drag: ItemDragInfo, item_index: i32, insert_index: i32, success: bool) {
        self.events.fire_item_drop(drag, item_index, insert_index, success);
        self.clear_drag_state();
    }

    // Properties and restore.

    /// Replaces the layout property, invalidating the matrix when item
    /// positions depend on what changed.
    pub fn update_layout_property(&mut self, property: GridLayoutProperty) {
        if property.needs_matrix_reset(&self.property) {
            self.info.mark_reset();
            self.info.axis = property.axis();
        }
        self.property = property;
        self.host.mark_dirty(DirtyFlags::MEASURE);
    }

    /// Re-reads the layout property after an update.
    pub fn on_modify_done(&mut self) {
        if !self.property.multi_selectable {
            self.clear_multi_select();
        }
        if !self.property.editable && self.drag_item.is_some() {
            self.clear_drag_state();
        }
        self.check_scrollable();
    }

    pub fn provide_restore_info(&self) -> String {
        self.info.start_index.to_string()
    }

    /// Resumes at the item saved by [`provide_restore_info`](Self::provide_restore_info).
    pub fn on_restore_info(&mut self, restore_info: &str) {
        match parse_restore_info(restore_info) {
            Ok(index) => {
                self.info.jump_index = Some(index);
                self.info.scroll_align = ScrollAlign::Start;
                self.mark_dirty();
            }
            Err(err) => log::warn!("{err}"),
        }
    }
}

pub fn parse_restore_info(restore_info: &str) -> Result<i32, GridError> {
    restore_info
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|index| *index >= 0)
        .ok_or_else(|| GridError::InvalidRestoreInfo(restore_info.to_string()))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use arkui_core::DirtyTracker;

    use super::*;
    use crate::grid::layout_property::EdgeEffect;
    use crate::grid::test_host::TestHost;

    fn pattern(property: GridLayoutProperty) -> GridPattern {
        let tracker = Rc::new(RefCell::new(DirtyTracker::new()));
        GridPattern::new(property, HostNode::new(1, tracker))
    }

    fn three_columns() -> GridLayoutProperty {
        GridLayoutProperty::new().columns_template("1fr 1fr 1fr")
    }

    #[test]
    fn restore_info_round_trips_start_index() {
        let mut original = pattern(three_columns());
        let mut host = TestHost::new(300.0, 350.0, 100, 100.0);
        original.flush(&mut host);
        original.update_current_offset(-420.0, ScrollSource::Drag);
        original.flush(&mut host);
        let saved = original.provide_restore_info();
        assert_eq!(saved, original.layout_info().start_index.to_string());

        let mut restored = pattern(three_columns());
        restored.on_restore_info(&saved);
        assert_eq!(restored.layout_info().jump_index, Some(original.layout_info().start_index));
        assert_eq!(restored.layout_info().scroll_align, ScrollAlign::Start);
    }

    #[test]
    fn garbage_restore_info_is_ignored() {
        let mut grid = pattern(three_columns());
        grid.on_restore_info("twelve");
        assert_eq!(grid.layout_info().jump_index, None);
        assert_eq!(
            parse_restore_info("-3"),
            Err(GridError::InvalidRestoreInfo("-3".into()))
        );
    }

    #[test]
    fn rows_template_starts_on_the_horizontal_axis() {
        let grid = pattern(GridLayoutProperty::new().rows_template("1fr 1fr"));
        assert_eq!(grid.layout_info().axis, arkui_ui_layout::Axis::Horizontal);
        assert_eq!(grid.layout_info().end_index, -1);
    }

    #[test]
    fn committed_frame_queues_the_next_line_for_prefetch() {
        let mut grid = pattern(three_columns());
        let mut host = TestHost::new(300.0, 350.0, 100, 100.0);
        grid.flush(&mut host);
        let end = grid.layout_info().end_index;
        assert_eq!(grid.take_prefetch_indices(), vec![end + 1, end + 2, end + 3]);
        assert!(grid.take_prefetch_indices().is_empty());
    }

    #[test]
    fn offset_updates_mark_host_dirty() {
        let mut grid = pattern(three_columns());
        let mut host = TestHost::new(300.0, 350.0, 100, 100.0);
        grid.flush(&mut host);
        assert!(!grid.host().is_dirty(DirtyFlags::MEASURE_SELF));

        assert!(grid.update_current_offset(-50.0, ScrollSource::Drag));
        assert!(grid.host().is_dirty(DirtyFlags::MEASURE_SELF));
        assert_eq!(grid.layout_info().current_offset, -50.0);
    }

    #[test]
    fn no_edge_effect_rejects_pull_at_start() {
        let mut grid = pattern(three_columns().edge_effect(EdgeEffect::None, false));
        let mut host = TestHost::new(300.0, 350.0, 100, 100.0);
        grid.flush(&mut host);
        assert!(!grid.update_current_offset(30.0, ScrollSource::Drag));
        assert_eq!(grid.layout_info().current_offset, 0.0);
    }

    #[test]
    fn content_that_fits_is_not_scrollable() {
        let mut grid = pattern(three_columns());
        let mut host = TestHost::new(300.0, 350.0, 5, 100.0);
        grid.flush(&mut host);
        assert!(!grid.is_scrollable());
        assert!(grid.update_current_offset(-50.0, ScrollSource::Drag));
        assert_eq!(grid.layout_info().current_offset, 0.0);

        let mut always = pattern(three_columns().edge_effect(EdgeEffect::Spring, true));
        always.flush(&mut host);
        assert!(always.is_scrollable());
    }

    #[test]
    fn move_items_validates_insert_bounds() {
        let mut grid = pattern(three_columns().editable(true));
        let mut host = TestHost::new(300.0, 350.0, 9, 100.0);
        grid.flush(&mut host);

        assert!(!grid.move_items(1, 9, &mut host));
        assert!(grid.move_items(-1, 9, &mut host));
        grid.clear_drag_state();
        assert!(!grid.move_items(-1, 10, &mut host));
        assert!(!grid.move_items(0, -1, &mut host));
    }

    #[test]
    fn drag_move_reorders_and_lays_out_immediately() {
        let mut grid = pattern(three_columns().editable(true));
        let mut host = TestHost::new(300.0, 350.0, 9, 100.0);
        grid.flush(&mut host);

        assert!(grid.handle_item_drag_start(ItemDragInfo::default(), 5));
        grid.handle_item_drag_move(ItemDragInfo::default(), 5, 2, &mut host);
        assert_eq!(grid.layout_info().item_at(0, 2), Some(5));
        // item 2 was shifted to the next line
        assert_eq!(host.offsets.get(&2).map(|o| o.y), Some(100.0));
        assert_eq!(host.offsets.get(&5).map(|o| o.y), Some(0.0));

        grid.handle_item_drop(ItemDragInfo::default(), 5, 2, true);
        assert_eq!(grid.layout_info().current_moving_item_position, -1);
        assert_eq!(grid.dragging_item(), None);
    }

    #[test]
    fn drag_is_refused_when_not_editable() {
        let mut grid = pattern(three_columns());
        assert!(!grid.handle_item_drag_start(ItemDragInfo::default(), 0));
    }

    #[test]
    fn page_keys_scroll_by_a_viewport() {
        let mut grid = pattern(three_columns());
        let mut host = TestHost::new(300.0, 350.0, 100, 100.0);
        grid.flush(&mut host);
        assert!(grid.on_key_event(KeyEvent::down(KeyCode::PageDown)));
        assert_eq!(grid.layout_info().current_offset, -350.0);
        assert!(!grid.on_key_event(KeyEvent::down(KeyCode::Other(7))));
    }

    #[test]
    fn out_of_range_scroll_to_index_is_ignored() {
        let mut grid = pattern(three_columns());
        let mut host = TestHost::new(300.0, 350.0, 10, 100.0);
        grid.flush(&mut host);
        grid.scroll_to_index(10, ScrollAlign::Start);
        assert_eq!(grid.layout_info().jump_index, None);
        grid.scroll_to_index(LAST_ITEM, ScrollAlign::End);
        assert_eq!(grid.layout_info().jump_index, Some(LAST_ITEM));
    }

    #[test]
    fn stale_focus_handle_does_not_resolve() {
        let mut grid = pattern(three_columns());
        let mut host = TestHost::new(300.0, 350.0, 9, 100.0);
        grid.flush(&mut host);
        let handle = grid.focus_handle(4);
        assert!(handle.is_some());
        grid.on_children_changed();
        assert_eq!(handle.and_then(|h| grid.resolve_focus(h)), None);
    }

    #[test]
    fn mouse_selection_fires_changes_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut grid = pattern(three_columns().multi_selectable(true));
        let sink = seen.clone();
        grid.events_mut()
            .set_on_item_select(move |index, selected| sink.borrow_mut().push((index, selected)));
        let mut host = TestHost::new(300.0, 350.0, 9, 100.0);
        grid.flush(&mut host);

        grid.handle_mouse_select(RectF::new(150.0, 50.0, -100.0, -40.0), &host);
        assert_eq!(grid.selected_items().collect::<Vec<_>>(), vec![0, 1]);
        grid.handle_mouse_select(RectF::new(150.0, 50.0, -100.0, -40.0), &host);
        grid.clear_multi_select();
        assert_eq!(
            seen.borrow().as_slice(),
            &[(0, true), (1, true), (0, false), (1, false)]
        );
    }
}
