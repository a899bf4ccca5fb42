//! Grid without templates: the first child fixes the cell size and cells
//! flow along `layout_direction` until the container is full.

use arkui_ui_layout::{Axis, Constraints, OffsetF, SizeF};

use super::layout_info::{GridLayoutInfo, GridMatrix};
use super::layout_property::{FlexDirection, GridLayoutProperty};
use super::layout_wrapper::GridLayoutWrapper;

pub struct GridAdaptiveLayoutAlgorithm {
    info: GridLayoutInfo,
    property: GridLayoutProperty,
    cell: SizeF,
    per_line: i32,
    display_count: i32,
}

impl GridAdaptiveLayoutAlgorithm {
    pub fn new(info: GridLayoutInfo, property: GridLayoutProperty) -> Self {
        Self {
            info,
            property,
            cell: SizeF::ZERO,
            per_line: 1,
            display_count: 0,
        }
    }

    pub fn layout_info(&self) -> &GridLayoutInfo {
        &self.info
    }

    pub fn into_layout_info(self) -> GridLayoutInfo {
        self.info
    }

    fn gaps(&self) -> (f32, f32) {
        (self.property.columns_gap.max(0.0), self.property.rows_gap.max(0.0))
    }

    pub fn measure(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let max = wrapper.constraints().max_size();
        let children = i32::try_from(wrapper.total_child_count()).unwrap_or(i32::MAX);
        let direction = self.property.layout_direction;
        let (column_gap, row_gap) = self.gaps();

        let first = if children > 0 {
            wrapper.measure_child(0, Constraints::loose(max))
        } else {
            None
        };
        let Some(mut cell) = first else {
            self.clear(wrapper, children, max);
            return;
        };
        if let Some(length) = self.property.cell_length.filter(|l| *l > 0.0) {
            if direction.is_row() {
                cell.width = length;
            } else {
                cell.height = length;
            }
        }
        if cell.width <= 0.0 || cell.height <= 0.0 {
            log::warn!("adaptive grid cell {cell:?} is empty, nothing laid out");
            self.clear(wrapper, children, max);
            return;
        }
        self.cell = cell;

        // fill axis: where consecutive items go; line axis: where new lines go
        let (fill_space, fill_cell, fill_gap, line_space, line_cell, line_gap) = if direction.is_row() {
            (max.width, cell.width, column_gap, max.height, cell.height, row_gap)
        } else {
            (max.height, cell.height, row_gap, max.width, cell.width, column_gap)
        };

        let fits = |space: f32, cell: f32, gap: f32| -> Option<i32> {
            space
                .is_finite()
                .then(|| ((space + gap) / (cell + gap)).floor().max(1.0) as i32)
        };
        let min_count = self.property.min_count.unwrap_or(1).max(1);
        let max_count = self.property.max_count.unwrap_or(i32::MAX).max(min_count);
        self.per_line = fits(fill_space, fill_cell, fill_gap)
            .unwrap_or(children)
            .clamp(min_count, max_count);
        self.display_count = match fits(line_space, line_cell, line_gap) {
            Some(lines) => children.min(lines.saturating_mul(self.per_line)),
            None => children,
        };

        for index in 1..self.display_count {
            if wrapper
                .measure_child(index as usize, Constraints::loose(cell))
                .is_none()
            {
                log::warn!("adaptive grid item {index} could not be measured");
            }
        }

        let lines = (self.display_count + self.per_line - 1) / self.per_line;
        let extent = |count: i32, cell: f32, gap: f32| {
            (count as f32 * (cell + gap) - gap).max(0.0)
        };
        let fill_extent = if fill_space.is_finite() {
            fill_space
        } else {
            extent(self.per_line, fill_cell, fill_gap)
        };
        let line_extent = extent(lines, line_cell, line_gap).min(line_space);
        let frame = if direction.is_row() {
            SizeF::new(fill_extent, line_extent)
        } else {
            SizeF::new(line_extent, fill_extent)
        };
        wrapper.set_frame_size(frame);

        let mut matrix = GridMatrix::new();
        for index in 0..self.display_count {
            matrix
                .entry(index / self.per_line)
                .or_default()
                .insert(index % self.per_line, index);
        }
        let info = &mut self.info;
        info.axis = if direction.is_row() {
            Axis::Vertical
        } else {
            Axis::Horizontal
        };
        info.children_count = children;
        info.cross_count = self.per_line;
        info.last_cross_count = self.per_line;
        info.grid_matrix = matrix;
        info.line_height_map = (0..lines).map(|line| (line, line_cell)).collect();
        info.start_index = 0;
        info.end_index = self.display_count - 1;
        info.start_main_line_index = 0;
        info.end_main_line_index = lines - 1;
        info.current_offset = 0.0;
        info.reach_start = true;
        info.reach_end = true;
        info.offset_end = true;
        info.total_height_of_items_in_view = info.get_total_height_of_items_in_view(line_gap);
        wrapper.set_active_range((self.display_count > 0).then(|| 0..=(self.display_count - 1) as usize));
    }

    fn clear(&mut self, wrapper: &mut dyn GridLayoutWrapper, children: i32, max: SizeF) {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        wrapper.set_frame_size(SizeF::new(finite(max.width), finite(max.height)));
        self.display_count = 0;
        self.info.clear_matrix();
        self.info.children_count = children;
        self.info.start_index = 0;
        self.info.end_index = -1;
        self.info.end_main_line_index = -1;
        self.info.reach_start = true;
        self.info.reach_end = true;
        wrapper.set_active_range(None);
    }

    pub fn layout(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let direction = self.property.layout_direction;
        let (column_gap, row_gap) = self.gaps();
        for index in 0..self.display_count {
            let line = index / self.per_line;
            let mut slot = index % self.per_line;
            if direction.is_reverse() {
                slot = self.per_line - 1 - slot;
            }
            let offset = match direction {
                FlexDirection::Row | FlexDirection::RowReverse => OffsetF::new(
                    slot as f32 * (self.cell.width + column_gap),
                    line as f32 * (self.cell.height + row_gap),
                ),
                FlexDirection::Column | FlexDirection::ColumnReverse => OffsetF::new(
                    line as f32 * (self.cell.width + column_gap),
                    slot as f32 * (self.cell.height + row_gap),
                ),
            };
            wrapper.place_child(index as usize, offset);
        }
    }
}
