use arkui_ui_layout::Axis;

use super::layout_info::GridLayoutInfo;
use super::layout_options::GridLayoutOptions;
use super::layout_property::{GridLayoutProperty, ItemSpan};
use super::layout_wrapper::GridLayoutWrapper;
use super::scroll_layout_algorithm::{GridScrollLayoutAlgorithm, ItemSpanSource};

/// Spans taken from [`GridLayoutOptions`] instead of per-item properties.
#[derive(Clone, Debug)]
pub struct OptionsSpans {
    options: GridLayoutOptions,
}

impl OptionsSpans {
    pub fn new(options: GridLayoutOptions) -> Self {
        Self { options }
    }

    fn fixed_line_layout(&self) -> bool {
        self.options.get_size_by_index.is_none()
            && self.options.regular_size.rows == 1
            && self.options.regular_size.columns == 1
    }
}

impl ItemSpanSource for OptionsSpans {
    fn item_span(
        &self,
        _wrapper: &dyn GridLayoutWrapper,
        index: i32,
        axis: Axis,
        cross_count: i32,
    ) -> ItemSpan {
        let size = if self.options.is_irregular(index) {
            match &self.options.get_size_by_index {
                Some(size_of) => size_of(index),
                None => {
                    return ItemSpan {
                        cross_start: None,
                        main_span: 1,
                        cross_span: cross_count,
                    }
                }
            }
        } else {
            self.options.regular_size
        };
        let (main_span, cross_span) = match axis {
            Axis::Vertical => (size.rows, size.columns),
            Axis::Horizontal => (size.columns, size.rows),
        };
        ItemSpan {
            cross_start: None,
            main_span: main_span.max(1),
            cross_span: cross_span.clamp(1, cross_count.max(1)),
        }
    }

    /// Irregular items fill whole lines, so regular items realign right
    /// after the last one before `index`.
    fn starting_item(&self, index: i32, cross_count: i32) -> Option<i32> {
        if !self.fixed_line_layout() {
            return None;
        }
        let cross = cross_count.max(1);
        Some(match self.options.last_irregular_at_or_before(index) {
            Some(irregular) if irregular == index => irregular,
            Some(irregular) => irregular + 1 + (index - irregular - 1) / cross * cross,
            None => index - index % cross,
        })
    }
}

/// Scrollable grid whose irregular items are described up front by
/// [`GridLayoutOptions`]. Windowing is shared with
/// [`GridScrollLayoutAlgorithm`]; only span lookup and line-start search
/// differ.
pub struct GridScrollWithOptionsLayoutAlgorithm {
    inner: GridScrollLayoutAlgorithm<OptionsSpans>,
}

impl GridScrollWithOptionsLayoutAlgorithm {
    pub fn new(info: GridLayoutInfo, property: GridLayoutProperty, options: GridLayoutOptions) -> Self {
        Self {
            inner: GridScrollLayoutAlgorithm::with_spans(info, property, OptionsSpans::new(options)),
        }
    }

    pub fn set_can_over_scroll(&mut self, can_over_scroll: bool) {
        self.inner.set_can_over_scroll(can_over_scroll);
    }

    pub fn measure(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        self.inner.measure(wrapper);
    }

    pub fn layout(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        self.inner.layout(wrapper);
    }

    pub fn layout_info(&self) -> &GridLayoutInfo {
        self.inner.layout_info()
    }

    pub fn into_layout_info(self) -> GridLayoutInfo {
        self.inner.into_layout_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layout_options::GridItemSize;

    #[test]
    fn regular_items_realign_after_irregular() {
        let spans = OptionsSpans::new(GridLayoutOptions::new().irregular_indexes([4]));
        assert_eq!(spans.starting_item(2, 3), Some(0));
        assert_eq!(spans.starting_item(4, 3), Some(4));
        assert_eq!(spans.starting_item(5, 3), Some(5));
        assert_eq!(spans.starting_item(8, 3), Some(8));
        assert_eq!(spans.starting_item(7, 3), Some(5));
    }

    #[test]
    fn size_callback_disables_closed_form() {
        let spans = OptionsSpans::new(
            GridLayoutOptions::new()
                .irregular_indexes([1])
                .get_size_by_index(|_| GridItemSize::new(2, 2)),
        );
        assert_eq!(spans.starting_item(5, 3), None);
    }
}
