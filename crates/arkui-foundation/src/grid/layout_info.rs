//! Layout state of a scrollable grid.
//!
//! [`GridLayoutInfo`] is a plain value: every frame the layout algorithm
//! takes a copy, mutates it, and the pattern adopts the result after layout.

use std::collections::BTreeMap;

use arkui_core::collections::map::{HashMap, HashSet};
use arkui_ui_layout::{Axis, RectF};

use super::layout_options::GridLayoutOptions;

/// Sentinel accepted by index APIs meaning "the last item".
pub const LAST_ITEM: i32 = -1;

/// Alignment of a jump target inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
    /// Move the least distance that brings the target fully into view.
    #[default]
    Auto,
}

/// main line -> (cross index -> item index)
pub type GridMatrix = BTreeMap<i32, BTreeMap<i32, i32>>;

#[derive(Clone, Debug, PartialEq)]
pub struct GridLayoutInfo {
    pub axis: Axis,
    pub grid_matrix: GridMatrix,
    /// main line -> main-axis length of that line.
    pub line_height_map: BTreeMap<i32, f32>,

    pub start_index: i32,
    pub end_index: i32,
    pub start_main_line_index: i32,
    pub end_main_line_index: i32,

    /// Offset of the start line relative to the viewport origin. Positive
    /// values reveal blank space before the first line.
    pub current_offset: f32,
    pub prev_offset: f32,
    pub last_main_size: f32,
    pub total_height_of_items_in_view: f32,

    pub cross_count: i32,
    pub last_cross_count: i32,
    pub children_count: i32,

    pub reach_start: bool,
    pub reach_end: bool,
    pub offset_end: bool,
    pub has_big_item: bool,

    pub jump_index: Option<i32>,
    pub scroll_align: ScrollAlign,

    pub position_item_index_map: HashMap<i32, i32>,
    /// Position of the item being dragged, `-1` when no drag is active.
    pub current_moving_item_position: i32,
    pub current_rect: RectF,

    /// Irregular item index -> last main line it occupies.
    pub irregular_items_position: BTreeMap<i32, i32>,

    reset: bool,
}

impl Default for GridLayoutInfo {
    fn default() -> Self {
        Self {
            axis: Axis::Vertical,
            grid_matrix: GridMatrix::new(),
            line_height_map: BTreeMap::new(),
            start_index: 0,
            end_index: -1,
            start_main_line_index: 0,
            end_main_line_index: 0,
            current_offset: 0.0,
            prev_offset: 0.0,
            last_main_size: 0.0,
            total_height_of_items_in_view: 0.0,
            cross_count: 0,
            last_cross_count: 0,
            children_count: 0,
            reach_start: false,
            reach_end: false,
            offset_end: false,
            has_big_item: false,
            jump_index: None,
            scroll_align: ScrollAlign::Auto,
            position_item_index_map: HashMap::default(),
            current_moving_item_position: -1,
            current_rect: RectF::default(),
            irregular_items_position: BTreeMap::new(),
            reset: false,
        }
    }
}

impl GridLayoutInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(axis: Axis) -> Self {
        Self {
            axis,
            ..Self::default()
        }
    }

    /// Main-axis length of the windowed lines including the gaps between them.
    pub fn get_total_height_of_items_in_view(&self, main_gap: f32) -> f32 {
        if self.start_main_line_index > self.end_main_line_index {
            return 0.0;
        }
        let mut length = 0.0;
        let mut lines = 0;
        for (_, height) in self
            .line_height_map
            .range(self.start_main_line_index..=self.end_main_line_index)
        {
            length += height + main_gap;
            lines += 1;
        }
        if lines == 0 {
            0.0
        } else {
            length - main_gap
        }
    }

    pub fn update_start_index_by_start_line(&mut self) {
        if let Some(min) = self
            .grid_matrix
            .get(&self.start_main_line_index)
            .and_then(|line| line.values().min())
        {
            self.start_index = *min;
        }
    }

    pub fn get_average_line_height(&self) -> f32 {
        let (sum, count) = self
            .line_height_map
            .values()
            .filter(|h| **h > 0.0)
            .fold((0.0f32, 0u32), |(sum, count), h| (sum + h, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    /// Distinct measured items and the main length (lines plus one gap each)
    /// of the lines holding them.
    pub(crate) fn measured_sample(&self, main_gap: f32) -> (i32, f32) {
        let mut items: HashSet<i32> = HashSet::default();
        let mut height_sum = 0.0;
        for (line, height) in &self.line_height_map {
            let Some(cells) = self.grid_matrix.get(line) else {
                continue;
            };
            if cells.is_empty() {
                continue;
            }
            items.extend(cells.values().copied());
            height_sum += height + main_gap;
        }
        (items.len() as i32, height_sum)
    }

    /// Whether every line before the start line is recorded, starting at item 0.
    fn prefix_measured(&self) -> bool {
        let Some((first_line, cells)) = self.grid_matrix.iter().next() else {
            return false;
        };
        if cells.values().min() != Some(&0) {
            return false;
        }
        (*first_line..self.start_main_line_index).all(|line| self.line_height_map.contains_key(&line))
    }

    /// Estimated total main-axis extent of the content.
    pub fn get_content_height(&self, main_gap: f32) -> f32 {
        if self.line_height_map.is_empty() {
            return 0.0;
        }
        let (item_count, height_sum) = self.measured_sample(main_gap);
        if item_count == 0 {
            return 0.0;
        }
        let measured = height_sum - main_gap;
        if item_count >= self.children_count - 1 {
            return measured;
        }
        let average = height_sum / item_count as f32;
        measured + (self.children_count - item_count) as f32 * average
    }

    /// Estimated distance scrolled from the top of the content.
    pub fn get_content_offset(&self, main_gap: f32) -> f32 {
        if self.line_height_map.is_empty() {
            return 0.0;
        }
        if self.prefix_measured() {
            let first = self.grid_matrix.keys().next().copied().unwrap_or_default();
            let before: f32 = self
                .line_height_map
                .range(first..self.start_main_line_index)
                .map(|(_, h)| h + main_gap)
                .sum();
            return before - self.current_offset;
        }
        let (item_count, height_sum) = self.measured_sample(main_gap);
        if item_count == 0 {
            return 0.0;
        }
        let average = height_sum / item_count as f32;
        self.start_index as f32 * average - self.current_offset
    }

    /// Number of lines items `[0, end)` occupy when irregular items fill a
    /// whole line and regular items pack `cross_count` per line between them.
    fn lines_before_with_options(&self, options: &GridLayoutOptions, end: i32) -> i32 {
        let cross = self.cross_count.max(1);
        let mut lines = 0;
        let mut last = -1;
        for &index in options.irregular_indexes.range(0..end) {
            lines += ceil_div(index - last - 1, cross) + 1;
            last = index;
        }
        lines + ceil_div(end - last - 1, cross)
    }

    pub fn get_content_height_with_options(&self, options: &GridLayoutOptions, main_gap: f32) -> f32 {
        if options.get_size_by_index.is_some() {
            return self.get_content_height(main_gap);
        }
        if self.line_height_map.is_empty() {
            return 0.0;
        }
        let lines = self.lines_before_with_options(options, self.children_count);
        let line_length = self.get_average_line_height() + main_gap;
        (lines as f32 * line_length - main_gap).max(0.0)
    }

    pub fn get_content_offset_with_options(&self, options: &GridLayoutOptions, main_gap: f32) -> f32 {
        if options.get_size_by_index.is_some() {
            return self.get_content_offset(main_gap);
        }
        if self.line_height_map.is_empty() {
            return 0.0;
        }
        let lines = self.lines_before_with_options(options, self.start_index);
        let line_length = self.get_average_line_height() + main_gap;
        lines as f32 * line_length - self.current_offset
    }

    pub fn reset_position_flags(&mut self) {
        self.reach_start = false;
        self.reach_end = false;
        self.offset_end = false;
    }

    /// Forces the next measure to rebuild the matrix from `start_index`.
    pub fn mark_reset(&mut self) {
        self.reset = true;
    }

    pub fn is_reset(&self) -> bool {
        self.reset || (self.start_index != 0 && self.grid_matrix.is_empty())
    }

    pub fn clear_matrix(&mut self) {
        self.grid_matrix.clear();
        self.line_height_map.clear();
        self.irregular_items_position.clear();
        self.reset = false;
    }

    pub fn item_at(&self, main: i32, cross: i32) -> Option<i32> {
        self.grid_matrix.get(&main)?.get(&cross).copied()
    }

    /// First (main, cross) cell occupied by `item`.
    pub fn find_item(&self, item: i32) -> Option<(i32, i32)> {
        self.grid_matrix.iter().find_map(|(main, cells)| {
            cells
                .iter()
                .find(|(_, index)| **index == item)
                .map(|(cross, _)| (*main, *cross))
        })
    }

    pub fn is_out_of_start(&self) -> bool {
        self.reach_start && self.current_offset > 0.0
    }

    /// The last line ends above the viewport end after scrolling past it.
    pub fn is_out_of_end(&self) -> bool {
        self.offset_end
            && self.current_offset < 0.0
            && self.current_offset + self.total_height_of_items_in_view < self.last_main_size
    }

    // Drag reorder.

    pub fn get_item_index_by_position(&self, position: i32) -> i32 {
        self.position_item_index_map
            .get(&position)
            .copied()
            .unwrap_or(position)
    }

    pub fn get_position_by_item_index(&self, item_index: i32) -> i32 {
        self.position_item_index_map
            .iter()
            .find(|(_, item)| **item == item_index)
            .map(|(position, _)| *position)
            .unwrap_or(item_index)
    }

    /// Moves the dragged item to the slot currently showing `insert_index`.
    /// `item_index == -1` inserts an item dragged in from another grid.
    pub fn swap_items(&mut self, item_index: i32, insert_index: i32) {
        let insert_position = self.get_position_by_item_index(insert_index);
        if item_index == -1 && self.current_moving_item_position == -1 {
            self.move_items_back(insert_position, self.children_count, -1);
            self.current_moving_item_position = insert_position;
            return;
        }
        if self.current_moving_item_position == -1 {
            self.current_moving_item_position = item_index;
        }

        let current = self.current_moving_item_position;
        let moving = self.get_item_index_by_position(current);
        if current > insert_position {
            self.move_items_back(insert_position, current, moving);
            self.current_moving_item_position = insert_position;
        } else if insert_position > current {
            self.move_items_forward(current, insert_position, moving);
            self.current_moving_item_position = insert_position;
        }
    }

    /// Places `item_index` at `from` and shifts `[from, to)` one slot later.
    pub fn move_items_back(&mut self, from: i32, to: i32, item_index: i32) {
        let mut carried = item_index;
        for position in from..=to {
            let occupant = self.get_item_index_by_position(position);
            self.place_dragged(position, carried);
            carried = occupant;
        }
    }

    /// Places `item_index` at `to` and shifts `(from, to]` one slot earlier.
    pub fn move_items_forward(&mut self, from: i32, to: i32, item_index: i32) {
        let mut carried = item_index;
        for position in (from..=to).rev() {
            let occupant = self.get_item_index_by_position(position);
            self.place_dragged(position, carried);
            carried = occupant;
        }
    }

    fn place_dragged(&mut self, position: i32, item_index: i32) {
        self.position_item_index_map.insert(position, item_index);
        // Spans break the position-to-cell arithmetic; only the remap is kept.
        if self.has_big_item || self.cross_count <= 0 || position < self.start_index {
            return;
        }
        let relative = position - self.start_index;
        let main = relative / self.cross_count + self.start_main_line_index;
        let cross = relative % self.cross_count;
        if let Some(line) = self.grid_matrix.get_mut(&main) {
            line.insert(cross, item_index);
        }
    }

    pub fn clear_drag_state(&mut self) {
        self.position_item_index_map.clear();
        self.current_moving_item_position = -1;
        self.current_rect = RectF::default();
    }
}

fn ceil_div(n: i32, d: i32) -> i32 {
    if n <= 0 {
        0
    } else {
        (n + d - 1) / d
    }
}
