//! Configuration surface of a grid and of its items.

use arkui_ui_layout::Axis;

use super::layout_options::GridLayoutOptions;

/// Fill order of an adaptive grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }

    /// Rows fill first (items advance horizontally).
    pub fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }
}

/// What happens when content is dragged past its edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EdgeEffect {
    None,
    #[default]
    Spring,
    Fade,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Layout property of a grid node.
///
/// Exactly one template set makes the grid scrollable; both set gives a
/// static grid; neither gives an adaptive grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayoutProperty {
    pub columns_template: Option<String>,
    pub rows_template: Option<String>,
    pub columns_gap: f32,
    pub rows_gap: f32,
    /// Lines kept built beyond the viewport, also the skip threshold in viewports.
    pub cached_count: i32,
    pub max_count: Option<i32>,
    pub min_count: Option<i32>,
    pub cell_length: Option<f32>,
    pub editable: bool,
    pub layout_direction: FlexDirection,
    pub scroll_enabled: bool,
    pub edge_effect: EdgeEffect,
    /// Keep the edge effect active even when content fits the viewport.
    pub always_enabled: bool,
    pub multi_selectable: bool,
    pub text_direction: TextDirection,
    pub layout_options: Option<GridLayoutOptions>,
}

impl Default for GridLayoutProperty {
    fn default() -> Self {
        Self {
            columns_template: None,
            rows_template: None,
            columns_gap: 0.0,
            rows_gap: 0.0,
            cached_count: 1,
            max_count: None,
            min_count: None,
            cell_length: None,
            editable: false,
            layout_direction: FlexDirection::Row,
            scroll_enabled: true,
            edge_effect: EdgeEffect::Spring,
            always_enabled: false,
            multi_selectable: false,
            text_direction: TextDirection::Ltr,
            layout_options: None,
        }
    }
}

impl GridLayoutProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns_template(mut self, template: impl Into<String>) -> Self {
        self.columns_template = Some(template.into());
        self
    }

    pub fn rows_template(mut self, template: impl Into<String>) -> Self {
        self.rows_template = Some(template.into());
        self
    }

    pub fn columns_gap(mut self, gap: f32) -> Self {
        self.columns_gap = gap;
        self
    }

    pub fn rows_gap(mut self, gap: f32) -> Self {
        self.rows_gap = gap;
        self
    }

    pub fn cached_count(mut self, count: i32) -> Self {
        self.cached_count = count;
        self
    }

    pub fn max_count(mut self, count: i32) -> Self {
        self.max_count = Some(count);
        self
    }

    pub fn min_count(mut self, count: i32) -> Self {
        self.min_count = Some(count);
        self
    }

    pub fn cell_length(mut self, length: f32) -> Self {
        self.cell_length = Some(length);
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn layout_direction(mut self, direction: FlexDirection) -> Self {
        self.layout_direction = direction;
        self
    }

    pub fn scroll_enabled(mut self, enabled: bool) -> Self {
        self.scroll_enabled = enabled;
        self
    }

    pub fn edge_effect(mut self, effect: EdgeEffect, always_enabled: bool) -> Self {
        self.edge_effect = effect;
        self.always_enabled = always_enabled;
        self
    }

    pub fn multi_selectable(mut self, enabled: bool) -> Self {
        self.multi_selectable = enabled;
        self
    }

    pub fn text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = direction;
        self
    }

    pub fn layout_options(mut self, options: GridLayoutOptions) -> Self {
        self.layout_options = Some(options);
        self
    }

    fn has_columns_template(&self) -> bool {
        self.columns_template
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    fn has_rows_template(&self) -> bool {
        self.rows_template
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Exactly one template is set.
    pub fn is_configured_scrollable(&self) -> bool {
        self.has_columns_template() != self.has_rows_template()
    }

    pub fn is_static(&self) -> bool {
        self.has_columns_template() && self.has_rows_template()
    }

    /// A grid with a columns template scrolls vertically.
    pub fn axis(&self) -> Axis {
        if self.has_columns_template() || !self.has_rows_template() {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    /// Template describing the cross-axis tracks of a scrollable grid.
    pub fn cross_template(&self) -> Option<&str> {
        match self.axis() {
            Axis::Vertical => self.columns_template.as_deref(),
            Axis::Horizontal => self.rows_template.as_deref(),
        }
    }

    pub fn main_gap(&self) -> f32 {
        match self.axis() {
            Axis::Vertical => self.rows_gap,
            Axis::Horizontal => self.columns_gap,
        }
        .max(0.0)
    }

    pub fn cross_gap(&self) -> f32 {
        match self.axis() {
            Axis::Vertical => self.columns_gap,
            Axis::Horizontal => self.rows_gap,
        }
        .max(0.0)
    }

    /// Whether a change from `old` invalidates every recorded item position.
    pub fn needs_matrix_reset(&self, old: &GridLayoutProperty) -> bool {
        self.columns_template != old.columns_template
            || self.rows_template != old.rows_template
            || self.layout_options != old.layout_options
            || self.layout_direction != old.layout_direction
    }
}

/// Explicit placement of a single grid item. Lines are zero-based.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridItemProperty {
    pub row_start: Option<i32>,
    pub row_end: Option<i32>,
    pub column_start: Option<i32>,
    pub column_end: Option<i32>,
}

impl GridItemProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(mut self, start: i32, end: i32) -> Self {
        self.row_start = Some(start);
        self.row_end = Some(end);
        self
    }

    pub fn columns(mut self, start: i32, end: i32) -> Self {
        self.column_start = Some(start);
        self.column_end = Some(end);
        self
    }

    pub fn main_range(&self, axis: Axis) -> (Option<i32>, Option<i32>) {
        match axis {
            Axis::Vertical => (self.row_start, self.row_end),
            Axis::Horizontal => (self.column_start, self.column_end),
        }
    }

    pub fn cross_range(&self, axis: Axis) -> (Option<i32>, Option<i32>) {
        match axis {
            Axis::Vertical => (self.column_start, self.column_end),
            Axis::Horizontal => (self.row_start, self.row_end),
        }
    }

    /// Resolves the item's span for a scrollable grid with `cross_count`
    /// tracks. Out-of-range or inverted ranges fall back to an auto-placed
    /// 1x1 item; a main-axis start is ignored because scrolling lines are
    /// created on demand.
    pub fn resolve_span(&self, axis: Axis, cross_count: i32) -> ItemSpan {
        let mut span = ItemSpan::default();

        match self.cross_range(axis) {
            (Some(start), Some(end)) => {
                if start >= 0 && end >= start && end < cross_count {
                    span.cross_start = Some(start);
                    span.cross_span = end - start + 1;
                } else {
                    log::debug!("grid item cross range {start}..={end} clamped to 1x1");
                    return ItemSpan::default();
                }
            }
            (Some(start), None) => {
                if start >= 0 && start < cross_count {
                    span.cross_start = Some(start);
                }
            }
            (None, Some(end)) if end < 0 || end >= cross_count => {
                log::debug!("grid item cross end {end} clamped to 1x1");
                return ItemSpan::default();
            }
            _ => {}
        }

        if let (Some(start), Some(end)) = self.main_range(axis) {
            if start >= 0 && end >= start {
                span.main_span = end - start + 1;
            } else {
                log::debug!("grid item main range {start}..={end} clamped to 1x1");
                return ItemSpan::default();
            }
        }
        span
    }
}

/// Resolved occupancy of one item on a scrollable grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemSpan {
    /// Fixed cross track, or `None` for auto-placement.
    pub cross_start: Option<i32>,
    pub main_span: i32,
    pub cross_span: i32,
}

impl Default for ItemSpan {
    fn default() -> Self {
        Self {
            cross_start: None,
            main_span: 1,
            cross_span: 1,
        }
    }
}

impl ItemSpan {
    pub fn is_big(&self) -> bool {
        self.main_span > 1 || self.cross_span > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_template_makes_grid_scrollable() {
        let vertical = GridLayoutProperty::new().columns_template("1fr 1fr");
        assert!(vertical.is_configured_scrollable());
        assert_eq!(vertical.axis(), Axis::Vertical);

        let horizontal = GridLayoutProperty::new().rows_template("1fr");
        assert_eq!(horizontal.axis(), Axis::Horizontal);

        let fixed = vertical.clone().rows_template("1fr");
        assert!(fixed.is_static());
        assert!(!fixed.is_configured_scrollable());

        assert!(!GridLayoutProperty::new().columns_template("  ").is_configured_scrollable());
    }

    #[test]
    fn gaps_follow_axis() {
        let property = GridLayoutProperty::new()
            .rows_template("1fr 1fr")
            .rows_gap(4.0)
            .columns_gap(9.0);
        assert_eq!(property.main_gap(), 9.0);
        assert_eq!(property.cross_gap(), 4.0);
    }

    #[test]
    fn valid_ranges_become_spans() {
        let item = GridItemProperty::new().columns(1, 2).rows(0, 2);
        let span = item.resolve_span(Axis::Vertical, 3);
        assert_eq!(span.cross_start, Some(1));
        assert_eq!(span.cross_span, 2);
        assert_eq!(span.main_span, 3);
        assert!(span.is_big());
    }

    #[test]
    fn malformed_ranges_clamp_to_single_cell() {
        let beyond = GridItemProperty::new().columns(2, 5);
        assert_eq!(beyond.resolve_span(Axis::Vertical, 3), ItemSpan::default());

        let inverted = GridItemProperty::new().columns(0, 0).rows(3, 1);
        assert_eq!(inverted.resolve_span(Axis::Vertical, 3), ItemSpan::default());

        let negative = GridItemProperty::new().columns(-1, 0);
        assert_eq!(negative.resolve_span(Axis::Vertical, 3), ItemSpan::default());
    }
}
