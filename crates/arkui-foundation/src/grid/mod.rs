//! Grid container: template parsing, the four layout algorithms and the
//! pattern that drives them frame by frame.

mod adaptive_layout_algorithm;
mod algorithm;
mod events;
mod focus;
mod layout_info;
mod layout_options;
mod layout_property;
mod layout_wrapper;
mod pattern;
mod prefetch;
mod scroll_layout_algorithm;
mod scroll_with_options;
mod scrollable;
mod static_layout_algorithm;
mod template;

#[cfg(test)]
mod test_host;

pub use adaptive_layout_algorithm::GridAdaptiveLayoutAlgorithm;
pub use algorithm::GridLayoutAlgorithmKind;
pub use events::{GridEventHub, ItemDragInfo, KeyAction, KeyCode, KeyEvent, ScrollBarOverride};
pub use focus::{item_index_info, next_focus, FocusHandle, FocusOutcome, FocusStep};
pub use layout_info::{GridLayoutInfo, GridMatrix, ScrollAlign, LAST_ITEM};
pub use layout_options::{GridItemIndexInfo, GridItemSize, GridLayoutOptions, ItemSizeFn};
pub use layout_property::{
    EdgeEffect, FlexDirection, GridItemProperty, GridLayoutProperty, ItemSpan, TextDirection,
};
pub use layout_wrapper::GridLayoutWrapper;
pub use pattern::{parse_restore_info, DirtySwapConfig, GridPattern, ScrollBarMetrics};
pub use prefetch::{PrefetchScheduler, PrefetchStrategy};
pub use scroll_layout_algorithm::{GridScrollLayoutAlgorithm, ItemSpanSource, PropertySpans};
pub use scroll_with_options::{GridScrollWithOptionsLayoutAlgorithm, OptionsSpans};
pub use scrollable::{
    calculate_friction, can_over_scroll, EdgeState, ScrollSource, ScrollState, ScrollTracker,
};
pub use static_layout_algorithm::GridLayoutAlgorithm;
pub use template::{cross_tracks_or_single, parse_template, TrackSizes};
