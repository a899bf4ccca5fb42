//! Incremental, viewport-windowed layout of a scrollable grid.
//!
//! Only the lines intersecting the viewport are measured each frame. Lines
//! measured in earlier frames stay recorded in the matrix so scrolling back
//! replays them instead of re-placing items. Large scroll deltas and jumps far
//! outside the recorded lines are resolved by estimation or by simulating
//! placement without measuring.

use std::collections::BTreeMap;

use arkui_core::collections::map::HashSet;
use arkui_ui_layout::{Axis, Constraints, OffsetF, SizeF};
use smallvec::SmallVec;

use super::layout_info::{GridLayoutInfo, GridMatrix, ScrollAlign, LAST_ITEM};
use super::layout_property::{GridLayoutProperty, ItemSpan, TextDirection};
use super::layout_wrapper::GridLayoutWrapper;
use super::template::{cross_tracks_or_single, TrackSizes};

const EPSILON: f32 = 0.001;

/// Where a scrolling grid reads the span of each item from.
pub trait ItemSpanSource {
    fn item_span(
        &self,
        wrapper: &dyn GridLayoutWrapper,
        index: i32,
        axis: Axis,
        cross_count: i32,
    ) -> ItemSpan;

    /// First item of the line holding `index`, when it can be computed
    /// without walking the data source.
    fn starting_item(&self, index: i32, cross_count: i32) -> Option<i32> {
        let _ = (index, cross_count);
        None
    }
}

/// Spans come from each item's row/column start and end.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertySpans;

impl ItemSpanSource for PropertySpans {
    fn item_span(
        &self,
        wrapper: &dyn GridLayoutWrapper,
        index: i32,
        axis: Axis,
        cross_count: i32,
    ) -> ItemSpan {
        wrapper
            .item_property(index as usize)
            .resolve_span(axis, cross_count)
    }
}

/// Distinct items of one line as `(item, first cross, cross span)`.
type LineItems = SmallVec<[(i32, i32, i32); 8]>;

fn line_items(cells: &BTreeMap<i32, i32>) -> LineItems {
    let mut out = LineItems::new();
    for (&cross, &item) in cells {
        match out.iter_mut().find(|(i, _, _)| *i == item) {
            Some(entry) => entry.2 += 1,
            None => out.push((item, cross, 1)),
        }
    }
    out
}

fn cells_free(matrix: &GridMatrix, line: i32, cross: i32, span: ItemSpan) -> bool {
    (line..line + span.main_span).all(|l| {
        matrix.get(&l).map_or(true, |cells| {
            (cross..cross + span.cross_span).all(|c| !cells.contains_key(&c))
        })
    })
}

fn lines_share_item(matrix: &GridMatrix, upper: i32, lower: i32) -> bool {
    match (matrix.get(&upper), matrix.get(&lower)) {
        (Some(upper), Some(lower)) => lower
            .values()
            .any(|item| upper.values().any(|other| other == item)),
        _ => false,
    }
}

/// First cross position at or after `cursor` where `span` fits on `line`.
fn next_grid(
    matrix: &GridMatrix,
    line: i32,
    cursor: i32,
    span: ItemSpan,
    cross_count: i32,
) -> Option<i32> {
    match span.cross_start {
        Some(cross) => (cross >= cursor
            && cross + span.cross_span <= cross_count
            && cells_free(matrix, line, cross, span))
        .then_some(cross),
        None => (cursor..=cross_count - span.cross_span)
            .find(|&cross| cells_free(matrix, line, cross, span)),
    }
}

/// Records `index` over every cell of its span. Placement that leaves the
/// cross range or overlaps a recorded item is rejected.
pub(crate) fn check_grid_placed(
    matrix: &mut GridMatrix,
    index: i32,
    line: i32,
    cross: i32,
    span: ItemSpan,
    cross_count: i32,
) -> bool {
    if cross < 0
        || span.main_span < 1
        || span.cross_span < 1
        || cross + span.cross_span > cross_count
        || !cells_free(matrix, line, cross, span)
    {
        return false;
    }
    for l in line..line + span.main_span {
        let cells = matrix.entry(l).or_default();
        for c in cross..cross + span.cross_span {
            cells.insert(c, index);
        }
    }
    true
}

/// First and last line holding `item`, searching outward from `line`.
pub(crate) fn item_main_range(matrix: &GridMatrix, item: i32, line: i32) -> (i32, i32) {
    let holds = |l: i32| {
        matrix
            .get(&l)
            .is_some_and(|cells| cells.values().any(|v| *v == item))
    };
    let mut start = line;
    while holds(start - 1) {
        start -= 1;
    }
    let mut end = line;
    while holds(end + 1) {
        end += 1;
    }
    (start, end)
}

pub struct GridScrollLayoutAlgorithm<S: ItemSpanSource = PropertySpans> {
    info: GridLayoutInfo,
    property: GridLayoutProperty,
    spans: S,
    axis: Axis,
    main_gap: f32,
    cross_gap: f32,
    items_cross_size: TrackSizes,
    cross_count: i32,
    can_over_scroll: bool,
    /// Largest item index recorded in the matrix.
    placed_end: i32,
    measured: HashSet<i32>,
}

impl GridScrollLayoutAlgorithm<PropertySpans> {
    pub fn new(info: GridLayoutInfo, property: GridLayoutProperty) -> Self {
        Self::with_spans(info, property, PropertySpans)
    }
}

impl<S: ItemSpanSource> GridScrollLayoutAlgorithm<S> {
    pub fn with_spans(info: GridLayoutInfo, property: GridLayoutProperty, spans: S) -> Self {
        Self {
            info,
            axis: property.axis(),
            main_gap: property.main_gap(),
            cross_gap: property.cross_gap(),
            property,
            spans,
            items_cross_size: TrackSizes::new(),
            cross_count: 1,
            can_over_scroll: false,
            placed_end: -1,
            measured: HashSet::default(),
        }
    }

    /// Allow the offset to stay past the content edges (spring overscroll).
    pub fn set_can_over_scroll(&mut self, can_over_scroll: bool) {
        self.can_over_scroll = can_over_scroll;
    }

    pub fn layout_info(&self) -> &GridLayoutInfo {
        &self.info
    }

    pub fn into_layout_info(self) -> GridLayoutInfo {
        self.info
    }

    pub fn items_cross_size(&self) -> &[f32] {
        &self.items_cross_size
    }

    pub fn measure(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let max = wrapper.constraints().max_size();
        let main_size = max.main_size(self.axis);
        let cross_size = max.cross_size(self.axis);
        if main_size <= 0.0 || main_size.is_infinite() {
            log::warn!("grid main size {main_size} is not usable, measure skipped");
            return;
        }
        if !cross_size.is_finite() {
            log::warn!("grid cross size is unbounded, measure skipped");
            return;
        }
        wrapper.set_frame_size(SizeF::from_main_cross(self.axis, main_size, cross_size));

        self.initial_items_cross_size(cross_size);
        self.info.axis = self.axis;
        self.info.children_count = i32::try_from(wrapper.total_child_count()).unwrap_or(i32::MAX);

        if (main_size - self.info.last_main_size).abs() > EPSILON {
            self.info.reset_position_flags();
            if self.info.last_main_size > 0.0 && main_size < self.info.last_main_size {
                self.update_offset_on_virtual_keyboard_height_change(wrapper, main_size);
            }
        }

        self.fill_grid_viewport_and_measure_children(main_size, wrapper);

        self.info.last_main_size = main_size;
        self.info.last_cross_count = self.cross_count;
    }

    fn initial_items_cross_size(&mut self, cross_size: f32) {
        self.items_cross_size =
            cross_tracks_or_single(self.property.cross_template(), cross_size, self.cross_gap);
        self.cross_count = (self.items_cross_size.len() as i32).max(1);
        self.info.cross_count = self.cross_count;
    }

    /// Keeps a focused text field visible when the viewport shrinks, moving
    /// by whole average lines so partially visible lines do not jitter.
    fn update_offset_on_virtual_keyboard_height_change(
        &mut self,
        wrapper: &dyn GridLayoutWrapper,
        main_size: f32,
    ) {
        let Some(bottom) = wrapper.focused_text_field_bottom() else {
            return;
        };
        if bottom <= main_size {
            return;
        }
        let overlap = bottom - main_size;
        let line = self.info.get_average_line_height() + self.main_gap;
        let shift = if line > 0.0 {
            (overlap / line).ceil() * line
        } else {
            overlap
        };
        self.info.current_offset -= shift;
    }

    fn fill_grid_viewport_and_measure_children(
        &mut self,
        main_size: f32,
        wrapper: &mut dyn GridLayoutWrapper,
    ) {
        self.measured.clear();
        if self.info.children_count == 0 {
            self.clear_for_empty_data(wrapper);
            return;
        }

        let cross_changed = self.info.last_cross_count != self.cross_count;
        if cross_changed || wrapper.children_updated() || self.info.is_reset() {
            self.reload_to_start_index(wrapper);
        }
        self.placed_end = self.max_item_in_matrix();

        if let Some(jump) = self.info.jump_index.take() {
            self.update_grid_layout_info(jump, main_size, wrapper);
        }
        self.skip_large_offset(main_size, wrapper);

        let main_length = self.measure_recorded_items(main_size, wrapper);
        self.fill_blank_at_end(main_length, main_size, wrapper);
        self.complete_spillover_lines(wrapper);

        self.update_reach_end();
        if self.info.reach_end && !self.can_over_scroll {
            self.modify_current_offset_when_reach_end(main_size);
        }
        self.fill_blank_at_start(main_size, wrapper);

        self.finalize_window(main_size, wrapper);
    }

    fn clear_for_empty_data(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        self.info.clear_matrix();
        self.info.start_index = 0;
        self.info.end_index = -1;
        self.info.start_main_line_index = 0;
        self.info.end_main_line_index = -1;
        self.info.current_offset = 0.0;
        self.info.jump_index = None;
        self.info.reach_start = true;
        self.info.reach_end = true;
        self.info.offset_end = true;
        self.info.total_height_of_items_in_view = 0.0;
        wrapper.set_active_range(None);
    }

    fn max_item_in_matrix(&self) -> i32 {
        self.info
            .grid_matrix
            .values()
            .flat_map(|cells| cells.values().copied())
            .max()
            .unwrap_or(self.info.start_index - 1)
    }

    fn item_span(&self, wrapper: &dyn GridLayoutWrapper, index: i32) -> ItemSpan {
        let mut span = self
            .spans
            .item_span(wrapper, index, self.axis, self.cross_count);
        span.main_span = span.main_span.max(1);
        span.cross_span = span.cross_span.clamp(1, self.cross_count);
        if span
            .cross_start
            .is_some_and(|c| c < 0 || c + span.cross_span > self.cross_count)
        {
            span.cross_start = None;
        }
        span
    }

    fn record_span(&mut self, index: i32, line: i32, span: ItemSpan) {
        if span.is_big() {
            self.info.has_big_item = true;
            self.info
                .irregular_items_position
                .insert(index, line + span.main_span - 1);
        }
    }

    fn cross_length(&self, cross: i32, span: i32) -> f32 {
        let tracks: f32 = self
            .items_cross_size
            .iter()
            .skip(cross.max(0) as usize)
            .take(span.max(0) as usize)
            .sum();
        tracks + (span - 1).max(0) as f32 * self.cross_gap
    }

    fn is_recorded(&self, line: i32) -> bool {
        self.info.grid_matrix.contains_key(&line) && self.info.line_height_map.contains_key(&line)
    }

    fn at_data_start(&self) -> bool {
        self.info
            .grid_matrix
            .get(&self.info.start_main_line_index)
            .is_some_and(|cells| cells.values().any(|v| *v == 0))
    }

    // Jump.

    fn update_grid_layout_info(
        &mut self,
        jump: i32,
        main_size: f32,
        wrapper: &mut dyn GridLayoutWrapper,
    ) {
        let children = self.info.children_count;
        let target = if jump == LAST_ITEM { children - 1 } else { jump };
        if target < 0 || target >= children {
            log::debug!("jump to {jump} ignored, {children} items");
            return;
        }

        let align = match std::mem::take(&mut self.info.scroll_align) {
            ScrollAlign::Auto => match self.scroll_to_index_auto(target, main_size) {
                Some(align) => align,
                None => return,
            },
            align => align,
        };
        self.scroll_to_index_start(target, wrapper);

        let extent = self.target_extent(target, wrapper);
        self.info.current_offset = match align {
            ScrollAlign::Start | ScrollAlign::Auto => 0.0,
            ScrollAlign::Center => (main_size - extent) / 2.0,
            ScrollAlign::End => main_size - extent,
        };
    }

    /// Adjusts the offset minimally when `target` is in the window; otherwise
    /// returns the alignment the jump should use.
    fn scroll_to_index_auto(&mut self, target: i32, main_size: f32) -> Option<ScrollAlign> {
        if target < self.info.start_index {
            return Some(ScrollAlign::Start);
        }
        if target > self.info.end_index {
            return Some(ScrollAlign::End);
        }
        let Some((line, _)) = self.info.find_item(target) else {
            return Some(ScrollAlign::Start);
        };
        let (main_start, main_end) = item_main_range(&self.info.grid_matrix, target, line);
        let top = self.line_top(main_start);
        let extent = self.lines_extent(main_start, main_end);
        if top < 0.0 {
            self.info.current_offset -= top;
        } else if top + extent > main_size {
            self.info.current_offset -= top + extent - main_size;
        }
        None
    }

    /// Makes the line holding `target` the start line, rebuilding the matrix
    /// around it when the target was never placed.
    fn scroll_to_index_start(&mut self, target: i32, wrapper: &mut dyn GridLayoutWrapper) {
        match self.info.find_item(target) {
            Some((line, _)) if self.is_recorded(line) => {
                self.info.start_main_line_index = line;
                self.info.update_start_index_by_start_line();
            }
            _ => {
                let start = self.locate_line_start(wrapper, target);
                self.rebuild_from(start, target, wrapper);
            }
        }
    }

    fn target_extent(&mut self, target: i32, wrapper: &mut dyn GridLayoutWrapper) -> f32 {
        let Some((line, _)) = self.info.find_item(target) else {
            return 0.0;
        };
        self.measure_line_items(line, wrapper);
        let height = self.compute_line_height(line, wrapper);
        self.info.line_height_map.insert(line, height);
        let (main_start, main_end) = item_main_range(&self.info.grid_matrix, target, line);
        if main_start == main_end {
            return height;
        }
        wrapper
            .child_size(target as usize)
            .map_or(height, |size| size.main_size(self.axis))
    }

    /// First item of a clean line (nothing from earlier lines reaching into
    /// it) at or before the line of `target`.
    fn locate_line_start(&mut self, wrapper: &dyn GridLayoutWrapper, target: i32) -> i32 {
        if let Some(start) = self.spans.starting_item(target, self.cross_count) {
            return start;
        }
        let anchor = self.get_starting_item(wrapper, target);
        if !self.info.has_big_item {
            return anchor;
        }
        self.simulate_line_start(wrapper, anchor, target)
    }

    /// Walks back from `current` to an item known to start at cross 0.
    fn get_starting_item(&mut self, wrapper: &dyn GridLayoutWrapper, current: i32) -> i32 {
        let current = current.min(self.info.children_count - 1);
        let mut index = current;
        if self.info.has_big_item {
            while index > 0 {
                if self.item_span(wrapper, index).cross_start == Some(0) {
                    return index;
                }
                index -= 1;
            }
            return 0;
        }
        while index > 0 {
            let span = self.item_span(wrapper, index);
            // the grid may have gained big items since the last frame
            if span.cross_start.is_some() || span.is_big() {
                self.info.has_big_item = true;
                return self.get_starting_item(wrapper, current);
            }
            if index % self.cross_count == 0 {
                return index;
            }
            index -= 1;
        }
        0
    }

    /// Places spans from `anchor` up to `target` without measuring anything.
    fn simulate_line_start(&self, wrapper: &dyn GridLayoutWrapper, anchor: i32, target: i32) -> i32 {
        let mut sim = GridMatrix::new();
        let mut line = 0;
        let mut cursor = 0;
        let mut line_start = anchor;
        let mut line_has_item = false;
        for index in anchor..=target {
            let span = self.item_span(wrapper, index);
            let cross = loop {
                if let Some(cross) = next_grid(&sim, line, cursor, span, self.cross_count) {
                    break cross;
                }
                line += 1;
                cursor = 0;
                line_has_item = false;
                sim = sim.split_off(&line);
            };
            if !line_has_item {
                line_has_item = true;
                if sim.get(&line).map_or(true, |cells| cells.is_empty()) {
                    line_start = index;
                }
            }
            check_grid_placed(&mut sim, index, line, cross, span, self.cross_count);
            cursor = cross + span.cross_span;
        }
        line_start
    }

    /// Clears the matrix and places items from `start` until `target` is
    /// placed; the line holding `target` becomes the start line.
    fn rebuild_from(&mut self, start: i32, target: i32, wrapper: &mut dyn GridLayoutWrapper) {
        self.info.clear_matrix();
        self.info.start_index = start;
        self.info.start_main_line_index = 0;
        self.info.end_main_line_index = -1;
        self.placed_end = start - 1;
        let mut line = 0;
        while self.placed_end < target {
            if self.fill_new_line_backward(line, wrapper).is_none() {
                break;
            }
            line += 1;
        }
        if let Some((target_line, _)) = self.info.find_item(target) {
            self.info.start_main_line_index = target_line;
        }
        self.info.update_start_index_by_start_line();
    }

    fn reload_to_start_index(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let target = self
            .info
            .start_index
            .clamp(0, self.info.children_count - 1);
        let start = self.locate_line_start(wrapper, target);
        self.rebuild_from(start, target, wrapper);
    }

    // Large offsets.

    fn skip_large_offset(&mut self, main_size: f32, wrapper: &mut dyn GridLayoutWrapper) {
        let threshold = self.property.cached_count.max(1) as f32 * main_size;
        if self.info.current_offset < -threshold {
            self.skip_forward_lines(wrapper);
        } else if self.info.current_offset > threshold {
            self.skip_backward_lines(wrapper);
        }
    }

    fn skip_forward_lines(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let mut line = self.info.start_main_line_index;
        while let Some(&height) = self.info.line_height_map.get(&line) {
            let step = height + self.main_gap;
            if -self.info.current_offset < step {
                break;
            }
            self.info.current_offset += step;
            line += 1;
        }
        self.info.start_main_line_index = line;
        if self.is_recorded(line) {
            self.info.update_start_index_by_start_line();
            return;
        }
        let line_length = self.info.get_average_line_height() + self.main_gap;
        if line_length > self.main_gap && -self.info.current_offset >= line_length {
            self.skip_regular_lines(true, wrapper);
        }
    }

    fn skip_backward_lines(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let mut line = self.info.start_main_line_index - 1;
        while let Some(&height) = self.info.line_height_map.get(&line) {
            let step = height + self.main_gap;
            if self.info.current_offset < step {
                break;
            }
            self.info.current_offset -= step;
            self.info.start_main_line_index = line;
            line -= 1;
        }
        self.info.update_start_index_by_start_line();
        if self.is_recorded(line) {
            return;
        }
        let line_length = self.info.get_average_line_height() + self.main_gap;
        if line_length > self.main_gap && self.info.current_offset >= line_length {
            self.skip_regular_lines(false, wrapper);
        }
    }

    /// Estimates the landing item past the recorded lines from the average
    /// line height (or average item height once big items exist) and
    /// rebuilds the matrix there.
    fn skip_regular_lines(&mut self, forward: bool, wrapper: &mut dyn GridLayoutWrapper) {
        let children = self.info.children_count;
        let cross = self.cross_count;
        let distance = self.info.current_offset.abs();
        let from = if forward {
            self.max_item_in_matrix() + 1
        } else {
            self.info.start_index
        };

        let landing = if self.info.has_big_item {
            let (count, height_sum) = self.info.measured_sample(self.main_gap);
            if count == 0 || height_sum <= 0.0 {
                return;
            }
            let per_item = height_sum / count as f32;
            let items = (distance / per_item).floor() as i32;
            let landing = if forward {
                (from + items).min(children - 1)
            } else {
                (from - items).max(0)
            };
            let skipped = (landing - from).abs() as f32 * per_item;
            self.consume_skipped(forward, skipped);
            landing
        } else {
            let line_length = self.info.get_average_line_height() + self.main_gap;
            let lines = (distance / line_length).floor() as i32;
            let landing = if forward {
                (from + lines * cross).min(children - 1)
            } else {
                (from - lines * cross).max(0)
            };
            let skipped = ((landing - from).abs() / cross) as f32 * line_length;
            self.consume_skipped(forward, skipped);
            landing
        };

        log::debug!("grid skipped from item {from} to {landing}");
        self.info.start_index = landing;
        self.reload_to_start_index(wrapper);
    }

    fn consume_skipped(&mut self, forward: bool, skipped: f32) {
        if forward {
            self.info.current_offset += skipped;
        } else {
            self.info.current_offset -= skipped;
        }
    }

    // Filling.

    /// Re-measures recorded lines from the start line on. Returns the main
    /// position just past the last measured line.
    fn measure_recorded_items(&mut self, main_size: f32, wrapper: &mut dyn GridLayoutWrapper) -> f32 {
        let mut main_length = self.info.current_offset;
        let mut line = self.info.start_main_line_index;
        self.info.end_main_line_index = line - 1;
        while main_length < main_size && self.is_recorded(line) {
            let height = self.measure_recorded_line(line, wrapper);
            main_length += height + self.main_gap;
            self.info.end_main_line_index = line;
            self.slide_start_past(line, main_length);
            line += 1;
        }
        main_length
    }

    fn measure_recorded_line(&mut self, line: i32, wrapper: &mut dyn GridLayoutWrapper) -> f32 {
        self.measure_line_items(line, wrapper);
        let height = self.compute_line_height(line, wrapper);
        self.info.line_height_map.insert(line, height);
        height
    }

    /// Moves the start line past `line` once it has scrolled completely
    /// before the viewport, unless it is the last line of content.
    fn slide_start_past(&mut self, line: i32, line_end: f32) {
        if line != self.info.start_main_line_index || line_end > 0.0 {
            return;
        }
        let more = self.info.grid_matrix.contains_key(&(line + 1))
            || self.placed_end < self.info.children_count - 1;
        if more {
            self.info.start_main_line_index = line + 1;
            self.info.current_offset = line_end;
        }
    }

    fn fill_blank_at_end(
        &mut self,
        mut main_length: f32,
        main_size: f32,
        wrapper: &mut dyn GridLayoutWrapper,
    ) -> f32 {
        let mut line = self.info.end_main_line_index + 1;
        while main_length < main_size {
            let height = if self.is_recorded(line) {
                Some(self.measure_recorded_line(line, wrapper))
            } else {
                self.fill_new_line_backward(line, wrapper)
            };
            let Some(height) = height else {
                break;
            };
            main_length += height + self.main_gap;
            self.info.end_main_line_index = line;
            self.slide_start_past(line, main_length);
            line += 1;
        }
        main_length
    }

    /// Lines reserved by big items below the window still need a height.
    fn complete_spillover_lines(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let mut line = self.info.end_main_line_index + 1;
        while self.info.grid_matrix.contains_key(&line)
            && !self.info.line_height_map.contains_key(&line)
        {
            if self.fill_new_line_backward(line, wrapper).is_none() {
                break;
            }
            line += 1;
        }
    }

    /// Places the next items onto `line` and measures it. `None` when the
    /// line stays empty because the data source is exhausted.
    fn fill_new_line_backward(&mut self, line: i32, wrapper: &mut dyn GridLayoutWrapper) -> Option<f32> {
        let mut cursor = 0;
        while self.placed_end + 1 < self.info.children_count {
            let index = self.placed_end + 1;
            let span = self.item_span(wrapper, index);
            let Some(cross) = next_grid(&self.info.grid_matrix, line, cursor, span, self.cross_count)
            else {
                break;
            };
            if !check_grid_placed(
                &mut self.info.grid_matrix,
                index,
                line,
                cross,
                span,
                self.cross_count,
            ) {
                log::warn!("grid item {index} could not be placed on line {line}");
                break;
            }
            self.record_span(index, line, span);
            self.measure_child(wrapper, index, cross, span.cross_span);
            self.placed_end = index;
            cursor = cross + span.cross_span;
        }

        if !self
            .info
            .grid_matrix
            .get(&line)
            .is_some_and(|cells| !cells.is_empty())
        {
            self.info.grid_matrix.remove(&line);
            return None;
        }
        Some(self.measure_recorded_line(line, wrapper))
    }

    fn fill_blank_at_start(&mut self, main_size: f32, wrapper: &mut dyn GridLayoutWrapper) {
        while self.info.current_offset > EPSILON {
            let Some(height) = self.fill_new_line_forward(wrapper) else {
                break;
            };
            self.info.start_main_line_index -= 1;
            self.info.current_offset -= height + self.main_gap;
        }
        self.info.update_start_index_by_start_line();

        if self.info.current_offset > 0.0 && self.at_data_start() && !self.can_over_scroll {
            self.info.current_offset = 0.0;
            let total = self.info.get_total_height_of_items_in_view(self.main_gap);
            self.fill_blank_at_end(total + self.main_gap, main_size, wrapper);
            self.complete_spillover_lines(wrapper);
        }
    }

    /// Measures the line before the start line, building it first when it
    /// was never recorded.
    fn fill_new_line_forward(&mut self, wrapper: &mut dyn GridLayoutWrapper) -> Option<f32> {
        let line = self.info.start_main_line_index - 1;
        if !self.info.grid_matrix.contains_key(&line) && !self.add_forward_lines(line, wrapper) {
            return None;
        }
        Some(self.measure_recorded_line(line, wrapper))
    }

    /// Lays out the items before the first recorded line into a scratch
    /// matrix, from the nearest clean line start, and merges those lines in
    /// above the matrix so that they end at `line`.
    fn add_forward_lines(&mut self, line: i32, wrapper: &mut dyn GridLayoutWrapper) -> bool {
        let Some(first) = self
            .info
            .grid_matrix
            .get(&(line + 1))
            .and_then(|cells| cells.values().copied().filter(|v| *v >= 0).min())
        else {
            return false;
        };
        if first <= 0 {
            return false;
        }

        let start = self.locate_line_start(wrapper, first - 1);
        let mut temp = GridMatrix::new();
        let mut placed: SmallVec<[(i32, i32, ItemSpan); 16]> = SmallVec::new();
        let mut temp_line = 0;
        let mut cursor = 0;
        for index in start..first {
            let span = self.item_span(wrapper, index);
            loop {
                if let Some(cross) = next_grid(&temp, temp_line, cursor, span, self.cross_count) {
                    check_grid_placed(&mut temp, index, temp_line, cross, span, self.cross_count);
                    placed.push((index, temp_line, span));
                    cursor = cross + span.cross_span;
                    break;
                }
                temp_line += 1;
                cursor = 0;
            }
        }

        // Only `line` and the lines a big item carries into it are merged;
        // the rest is rebuilt when the start line reaches it.
        let mut top = temp_line;
        while top > 0 && lines_share_item(&temp, top - 1, top) {
            top -= 1;
        }
        let shift = line - temp_line;
        for (l, cells) in temp {
            if l > temp_line {
                log::debug!("grid line above item {first} clipped while building backward");
                continue;
            }
            if l >= top {
                self.info.grid_matrix.insert(l + shift, cells);
            }
        }
        for (index, l, span) in placed {
            if l >= top {
                self.record_span(index, l + shift, span);
            }
        }
        for l in top..temp_line {
            self.measure_recorded_line(l + shift, wrapper);
        }
        true
    }

    fn measure_line_items(&mut self, line: i32, wrapper: &mut dyn GridLayoutWrapper) {
        let Some(cells) = self.info.grid_matrix.get(&line) else {
            return;
        };
        for (item, cross, span) in line_items(cells) {
            self.measure_child(wrapper, item, cross, span);
        }
    }

    fn measure_child(&mut self, wrapper: &mut dyn GridLayoutWrapper, item: i32, cross: i32, cross_span: i32) {
        if item < 0 || item >= self.info.children_count || !self.measured.insert(item) {
            return;
        }
        let constraints = Constraints::for_cell(self.axis, self.cross_length(cross, cross_span));
        if wrapper.measure_child(item as usize, constraints).is_none() {
            log::warn!("grid item {item} could not be measured");
        }
    }

    /// Tallest single-line item; items spanning lines contribute their share,
    /// and their last line grows to cover whatever the earlier lines lack.
    fn compute_line_height(&self, line: i32, wrapper: &dyn GridLayoutWrapper) -> f32 {
        let Some(cells) = self.info.grid_matrix.get(&line) else {
            return 0.0;
        };
        let mut height = 0.0f32;
        for (item, _, _) in line_items(cells) {
            if item < 0 {
                continue;
            }
            let Some(size) = wrapper.child_size(item as usize) else {
                continue;
            };
            let main = size.main_size(self.axis);
            let (start, end) = item_main_range(&self.info.grid_matrix, item, line);
            let lines = end - start + 1;
            let contribution = if lines == 1 {
                main
            } else if line == end
                && (start..line).all(|l| self.info.line_height_map.contains_key(&l))
            {
                let above: f32 = (start..line)
                    .filter_map(|l| self.info.line_height_map.get(&l))
                    .map(|h| h + self.main_gap)
                    .sum();
                main - above
            } else {
                (main - (lines - 1) as f32 * self.main_gap) / lines as f32
            };
            height = height.max(contribution);
        }
        height
    }

    fn update_reach_end(&mut self) {
        self.info.end_index = self.window_max_item();
        self.info.reach_end = self.info.end_index >= self.info.children_count - 1;
    }

    fn window_max_item(&self) -> i32 {
        let start = self.info.start_main_line_index;
        let end = self.info.end_main_line_index;
        if end < start {
            return self.info.start_index - 1;
        }
        self.info
            .grid_matrix
            .range(start..=end)
            .flat_map(|(_, cells)| cells.values().copied())
            .max()
            .unwrap_or(self.info.start_index - 1)
    }

    /// Pulls the content down so the last line ends at the viewport end.
    fn modify_current_offset_when_reach_end(&mut self, main_size: f32) {
        let total = self.info.get_total_height_of_items_in_view(self.main_gap);
        if self.info.current_offset + total >= main_size - EPSILON {
            return;
        }
        if total < main_size && self.at_data_start() {
            self.info.current_offset = 0.0;
        } else {
            self.info.current_offset = main_size - total;
        }
    }

    fn finalize_window(&mut self, main_size: f32, wrapper: &mut dyn GridLayoutWrapper) {
        let start = self.info.start_main_line_index;
        let mut top = self.info.current_offset;
        let mut end = start - 1;
        let mut line = start;
        while let Some(&height) = self.info.line_height_map.get(&line) {
            if top >= main_size && end >= start {
                break;
            }
            end = line;
            top += height + self.main_gap;
            line += 1;
        }
        self.info.end_main_line_index = end;
        self.info.update_start_index_by_start_line();
        self.update_reach_end();

        let total = self.info.get_total_height_of_items_in_view(self.main_gap);
        self.info.total_height_of_items_in_view = total;
        self.info.reach_start = self.info.start_index == 0 && self.info.current_offset >= -EPSILON;
        self.info.offset_end =
            self.info.reach_end && self.info.current_offset + total <= main_size + EPSILON;

        if end >= start && self.info.end_index >= 0 {
            let first = self.info.start_index.max(0) as usize;
            let last = (self.info.end_index as usize).max(first);
            wrapper.set_active_range(Some(first..=last));
        } else {
            wrapper.set_active_range(None);
        }
    }

    // Layout.

    fn line_top(&self, line: i32) -> f32 {
        let start = self.info.start_main_line_index;
        let step = |l: i32| {
            self.info.line_height_map.get(&l).copied().unwrap_or(0.0) + self.main_gap
        };
        if line >= start {
            self.info.current_offset + (start..line).map(step).sum::<f32>()
        } else {
            self.info.current_offset - (line..start).map(step).sum::<f32>()
        }
    }

    fn lines_extent(&self, first: i32, last: i32) -> f32 {
        let heights: f32 = (first..=last)
            .map(|l| self.info.line_height_map.get(&l).copied().unwrap_or(0.0))
            .sum();
        heights + (last - first) as f32 * self.main_gap
    }

    /// Places every windowed item at the top of its first line, centered in
    /// its cell on the cross axis.
    pub fn layout(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let start = self.info.start_main_line_index;
        let end = self.info.end_main_line_index;
        if end < start {
            return;
        }
        let cross_size = wrapper.frame_size().cross_size(self.axis);
        let mut positions = TrackSizes::new();
        let mut position = 0.0;
        for track in &self.items_cross_size {
            positions.push(position);
            position += track + self.cross_gap;
        }
        let mirrored = self.property.text_direction == TextDirection::Rtl && self.axis.is_vertical();

        let mut placed: HashSet<i32> = HashSet::default();
        for line in start..=end {
            let Some(cells) = self.info.grid_matrix.get(&line) else {
                log::warn!("grid line {line} missing from the matrix during layout");
                return;
            };
            for (item, cross, span) in line_items(cells) {
                if item < 0 || item >= self.info.children_count || !placed.insert(item) {
                    continue;
                }
                let (main_start, _) = item_main_range(&self.info.grid_matrix, item, line);
                let main = self.line_top(main_start);
                let cell_cross = self.cross_length(cross, span);
                let child_cross = wrapper
                    .child_size(item as usize)
                    .map_or(0.0, |size| size.cross_size(self.axis));
                let track_start = positions.get(cross as usize).copied().unwrap_or(0.0);
                let mut cross_offset = track_start + (cell_cross - child_cross) / 2.0;
                if mirrored {
                    cross_offset = cross_size - cross_offset - child_cross;
                }
                wrapper.place_child(item as usize, OffsetF::from_main_cross(self.axis, main, cross_offset));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layout_property::GridItemProperty;
    use crate::grid::test_host::TestHost as Host;

    fn three_columns() -> GridLayoutProperty {
        GridLayoutProperty::new().columns_template("1fr 1fr 1fr")
    }

    fn run(info: GridLayoutInfo, property: GridLayoutProperty, host: &mut Host) -> GridLayoutInfo {
        let mut algorithm = GridScrollLayoutAlgorithm::new(info, property);
        algorithm.measure(host);
        algorithm.layout(host);
        algorithm.into_layout_info()
    }

    #[test]
    fn first_frame_fills_viewport() {
        let mut host = Host::new(300.0, 350.0, 100, 100.0);
        let info = run(GridLayoutInfo::new(), three_columns(), &mut host);

        assert_eq!(info.cross_count, 3);
        assert_eq!(info.start_index, 0);
        assert_eq!(info.end_main_line_index, 3);
        assert_eq!(info.end_index, 11);
        assert!(info.reach_start);
        assert!(!info.reach_end);
        assert_eq!(host.active, Some(0..=11));
        assert_eq!(host.offsets.get(&4), Some(&OffsetF::new(100.0, 100.0)));
    }

    #[test]
    fn scrolling_slides_start_line() {
        let mut host = Host::new(300.0, 350.0, 100, 100.0);
        let mut info = run(GridLayoutInfo::new(), three_columns(), &mut host);
        info.current_offset -= 150.0;
        let info = run(info, three_columns(), &mut host);

        assert_eq!(info.start_main_line_index, 1);
        assert_eq!(info.start_index, 3);
        assert_eq!(info.current_offset, -50.0);
        assert!(!info.reach_start);
        assert_eq!(host.offsets.get(&3), Some(&OffsetF::new(0.0, -50.0)));
    }

    #[test]
    fn reaching_end_aligns_last_line_with_viewport_end() {
        let mut host = Host::new(200.0, 300.0, 10, 100.0);
        let property = GridLayoutProperty::new().columns_template("1fr 1fr");
        let mut info = run(GridLayoutInfo::new(), property.clone(), &mut host);
        info.current_offset -= 280.0;
        let info = run(info, property, &mut host);

        assert!(info.reach_end);
        assert!(info.offset_end);
        assert_eq!(info.end_index, 9);
        let bottom = info.current_offset + info.total_height_of_items_in_view;
        assert!((bottom - 300.0).abs() < 0.01);
    }

    #[test]
    fn dragging_past_start_is_clamped_without_overscroll() {
        let mut host = Host::new(300.0, 350.0, 100, 100.0);
        let mut info = run(GridLayoutInfo::new(), three_columns(), &mut host);
        info.current_offset = 80.0;
        let info = run(info, three_columns(), &mut host);
        assert_eq!(info.current_offset, 0.0);
        assert!(info.reach_start);
    }

    #[test]
    fn big_item_reserves_cells_below() {
        let mut host = Host::new(300.0, 600.0, 20, 100.0);
        host.properties
            .insert(0, GridItemProperty::new().columns(0, 1).rows(0, 1));
        let info = run(GridLayoutInfo::new(), three_columns(), &mut host);

        assert!(info.has_big_item);
        assert_eq!(info.item_at(0, 0), Some(0));
        assert_eq!(info.item_at(1, 1), Some(0));
        assert_eq!(info.item_at(0, 2), Some(1));
        assert_eq!(info.item_at(1, 2), Some(2));
        assert_eq!(info.item_at(2, 0), Some(3));
        assert_eq!(info.irregular_items_position.get(&0), Some(&1));
        for line in info.grid_matrix.keys() {
            assert!(info.line_height_map.contains_key(line));
        }
    }

    #[test]
    fn building_backward_measures_lines_a_big_item_spans() {
        let mut host = Host::new(300.0, 350.0, 20, 100.0);
        host.properties
            .insert(0, GridItemProperty::new().columns(0, 0).rows(0, 1));
        let mut info = GridLayoutInfo::new();
        info.has_big_item = true;
        info.start_index = 5;
        info.mark_reset();
        let mut info = run(info, three_columns(), &mut host);
        assert_eq!(info.item_at(0, 0), Some(5));

        info.current_offset = 50.0;
        let info = run(info, three_columns(), &mut host);

        assert_eq!(info.start_main_line_index, -1);
        assert_eq!(info.item_at(-2, 0), Some(0));
        assert_eq!(info.item_at(-1, 0), Some(0));
        for line in info.grid_matrix.keys() {
            assert!(info.line_height_map.contains_key(line), "line {line} has no height");
        }
        assert_eq!(host.offsets.get(&0), Some(&OffsetF::new(0.0, -150.0)));
        assert_eq!(host.offsets.get(&3), Some(&OffsetF::new(100.0, -50.0)));
    }

    #[test]
    fn overlapping_placement_is_rejected() {
        let mut matrix = GridMatrix::new();
        let wide = ItemSpan {
            cross_start: None,
            main_span: 2,
            cross_span: 2,
        };
        assert!(check_grid_placed(&mut matrix, 0, 0, 0, wide, 3));
        assert!(!check_grid_placed(&mut matrix, 1, 1, 1, ItemSpan::default(), 3));
        assert!(!check_grid_placed(&mut matrix, 1, 0, 2, wide, 3));
        assert!(check_grid_placed(&mut matrix, 1, 1, 2, ItemSpan::default(), 3));
        assert_eq!(matrix.get(&1).and_then(|l| l.get(&1)), Some(&0));
    }

    #[test]
    fn zero_main_size_skips_measure() {
        let mut host = Host::new(300.0, 0.0, 10, 100.0);
        let info = run(GridLayoutInfo::new(), three_columns(), &mut host);
        assert!(host.measured.is_empty());
        assert!(info.grid_matrix.is_empty());
    }

    #[test]
    fn empty_data_reaches_both_edges() {
        let mut host = Host::new(300.0, 300.0, 0, 100.0);
        let info = run(GridLayoutInfo::new(), three_columns(), &mut host);
        assert!(info.reach_start && info.reach_end);
        assert_eq!(info.end_index, -1);
        assert_eq!(host.active, None);
    }

    #[test]
    fn rtl_mirrors_cross_positions() {
        let mut host = Host::new(300.0, 300.0, 3, 100.0);
        let property = three_columns().text_direction(TextDirection::Rtl);
        run(GridLayoutInfo::new(), property, &mut host);
        assert_eq!(host.offsets.get(&0).map(|o| o.x), Some(200.0));
        assert_eq!(host.offsets.get(&2).map(|o| o.x), Some(0.0));
    }
}
