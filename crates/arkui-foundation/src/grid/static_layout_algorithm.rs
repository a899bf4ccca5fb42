//! Fixed rows x columns grid. Nothing scrolls; items that do not fit the
//! declared tracks are left inactive.

use arkui_ui_layout::{Axis, Constraints, OffsetF, SizeF};

use super::layout_info::{GridLayoutInfo, GridMatrix};
use super::layout_property::{GridItemProperty, GridLayoutProperty, ItemSpan, TextDirection};
use super::layout_wrapper::GridLayoutWrapper;
use super::scroll_layout_algorithm::check_grid_placed;
use super::template::{cross_tracks_or_single, TrackSizes};

/// A resolved cell rectangle in track units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    row: i32,
    column: i32,
    row_span: i32,
    column_span: i32,
}

pub struct GridLayoutAlgorithm {
    info: GridLayoutInfo,
    property: GridLayoutProperty,
    rows: TrackSizes,
    columns: TrackSizes,
    cells: Vec<(i32, Cell)>,
}

impl GridLayoutAlgorithm {
    pub fn new(info: GridLayoutInfo, property: GridLayoutProperty) -> Self {
        Self {
            info,
            property,
            rows: TrackSizes::new(),
            columns: TrackSizes::new(),
            cells: Vec::new(),
        }
    }

    pub fn layout_info(&self) -> &GridLayoutInfo {
        &self.info
    }

    pub fn into_layout_info(self) -> GridLayoutInfo {
        self.info
    }

    pub fn measure(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let max = wrapper.constraints().max_size();
        if !max.width.is_finite() || !max.height.is_finite() {
            log::warn!("static grid needs a bounded size, got {max:?}");
            return;
        }
        wrapper.set_frame_size(max);

        let row_gap = self.property.rows_gap.max(0.0);
        let column_gap = self.property.columns_gap.max(0.0);
        self.rows = cross_tracks_or_single(self.property.rows_template.as_deref(), max.height, row_gap);
        self.columns =
            cross_tracks_or_single(self.property.columns_template.as_deref(), max.width, column_gap);

        let children = i32::try_from(wrapper.total_child_count()).unwrap_or(i32::MAX);
        let matrix = self.place_items(wrapper, children);

        for &(item, cell) in &self.cells {
            let size = SizeF::new(
                span_length(&self.columns, cell.column, cell.column_span, column_gap),
                span_length(&self.rows, cell.row, cell.row_span, row_gap),
            );
            if wrapper
                .measure_child(item as usize, Constraints::loose(size))
                .is_none()
            {
                log::warn!("static grid item {item} could not be measured");
            }
        }

        let row_count = self.rows.len() as i32;
        let info = &mut self.info;
        info.axis = Axis::Vertical;
        info.children_count = children;
        info.cross_count = self.columns.len() as i32;
        info.last_cross_count = info.cross_count;
        info.grid_matrix = matrix;
        info.line_height_map = (0..row_count)
            .zip(self.rows.iter().copied())
            .collect();
        info.start_index = 0;
        info.end_index = self.cells.iter().map(|(item, _)| *item).max().unwrap_or(-1);
        info.start_main_line_index = 0;
        info.end_main_line_index = row_count - 1;
        info.current_offset = 0.0;
        info.jump_index = None;
        info.reach_start = true;
        info.reach_end = true;
        info.offset_end = true;
        info.last_main_size = max.height;
        info.total_height_of_items_in_view = info.get_total_height_of_items_in_view(row_gap);
        info.has_big_item = self
            .cells
            .iter()
            .any(|(_, cell)| cell.row_span > 1 || cell.column_span > 1);

        // placed items are not contiguous, so the active range covers them all
        match self.cells.iter().map(|(item, _)| *item).min() {
            Some(first) if info.end_index >= first => {
                wrapper.set_active_range(Some(first as usize..=info.end_index as usize));
            }
            _ => wrapper.set_active_range(None),
        }
    }

    /// Explicitly positioned items claim their cells first, the rest flow
    /// row-major into whatever is left.
    fn place_items(&mut self, wrapper: &dyn GridLayoutWrapper, children: i32) -> GridMatrix {
        let row_count = self.rows.len() as i32;
        let column_count = self.columns.len() as i32;
        let mut matrix = GridMatrix::new();
        self.cells.clear();

        let mut auto = Vec::new();
        for item in 0..children {
            let property = wrapper.item_property(item as usize);
            match explicit_cell(&property, row_count, column_count) {
                Some(cell) if place(&mut matrix, item, cell, row_count, column_count) => {
                    self.cells.push((item, cell));
                }
                Some(_) => {
                    log::debug!("static grid item {item} overlaps an earlier item, auto placing");
                    auto.push((item, property));
                }
                None => auto.push((item, property)),
            }
        }

        let mut row = 0;
        let mut column = 0;
        for (item, property) in auto {
            let (row_span, column_span) = auto_spans(&property, row_count, column_count);
            let mut placed = None;
            while row < row_count {
                let cell = Cell {
                    row,
                    column,
                    row_span,
                    column_span,
                };
                if place(&mut matrix, item, cell, row_count, column_count) {
                    placed = Some(cell);
                    break;
                }
                column += 1;
                if column + column_span > column_count {
                    column = 0;
                    row += 1;
                }
            }
            match placed {
                Some(cell) => {
                    self.cells.push((item, cell));
                    column = cell.column + cell.column_span;
                    if column >= column_count {
                        column = 0;
                        row += 1;
                    }
                }
                None => log::debug!("static grid item {item} does not fit and stays inactive"),
            }
        }
        self.cells.sort_unstable_by_key(|(item, _)| *item);
        matrix
    }

    pub fn layout(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        let row_gap = self.property.rows_gap.max(0.0);
        let column_gap = self.property.columns_gap.max(0.0);
        let width = wrapper.frame_size().width;
        let mirrored = self.property.text_direction == TextDirection::Rtl;
        for &(item, cell) in &self.cells {
            let cell_width = span_length(&self.columns, cell.column, cell.column_span, column_gap);
            let child_width = wrapper
                .child_size(item as usize)
                .map_or(0.0, |size| size.width);
            let mut x = track_start(&self.columns, cell.column, column_gap)
                + (cell_width - child_width) / 2.0;
            if mirrored {
                x = width - x - child_width;
            }
            let y = track_start(&self.rows, cell.row, row_gap);
            wrapper.place_child(item as usize, OffsetF::new(x, y));
        }
    }
}

fn place(matrix: &mut GridMatrix, item: i32, cell: Cell, rows: i32, columns: i32) -> bool {
    if cell.row < 0 || cell.row + cell.row_span > rows {
        return false;
    }
    let span = ItemSpan {
        cross_start: Some(cell.column),
        main_span: cell.row_span,
        cross_span: cell.column_span,
    };
    check_grid_placed(matrix, item, cell.row, cell.column, span, columns)
}

fn explicit_cell(property: &GridItemProperty, rows: i32, columns: i32) -> Option<Cell> {
    let (row, row_span) = resolve_track(property.row_start, property.row_end, rows)?;
    let (column, column_span) = resolve_track(property.column_start, property.column_end, columns)?;
    Some(Cell {
        row,
        column,
        row_span,
        column_span,
    })
}

/// `(start, span)` when both ends are set and lie inside `count` tracks.
fn resolve_track(start: Option<i32>, end: Option<i32>, count: i32) -> Option<(i32, i32)> {
    let (start, end) = (start?, end?);
    (start >= 0 && end >= start && end < count).then_some((start, end - start + 1))
}

fn auto_spans(property: &GridItemProperty, rows: i32, columns: i32) -> (i32, i32) {
    let span = |start: Option<i32>, end: Option<i32>, count: i32| match (start, end) {
        (Some(s), Some(e)) if s >= 0 && e >= s && e < count => e - s + 1,
        _ => 1,
    };
    (
        span(property.row_start, property.row_end, rows),
        span(property.column_start, property.column_end, columns),
    )
}

fn track_start(tracks: &[f32], index: i32, gap: f32) -> f32 {
    tracks
        .iter()
        .take(index.max(0) as usize)
        .map(|track| track + gap)
        .sum()
}

fn span_length(tracks: &[f32], start: i32, span: i32, gap: f32) -> f32 {
    let sum: f32 = tracks
        .iter()
        .skip(start.max(0) as usize)
        .take(span.max(0) as usize)
        .sum();
    sum + (span - 1).max(0) as f32 * gap
}
