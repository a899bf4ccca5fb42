use super::adaptive_layout_algorithm::GridAdaptiveLayoutAlgorithm;
use super::layout_info::GridLayoutInfo;
use super::layout_property::GridLayoutProperty;
use super::layout_wrapper::GridLayoutWrapper;
use super::scroll_layout_algorithm::GridScrollLayoutAlgorithm;
use super::scroll_with_options::GridScrollWithOptionsLayoutAlgorithm;
use super::static_layout_algorithm::GridLayoutAlgorithm;

/// The layout strategy chosen for one frame.
pub enum GridLayoutAlgorithmKind {
    /// Both templates set.
    Static(GridLayoutAlgorithm),
    /// No template set.
    Adaptive(GridAdaptiveLayoutAlgorithm),
    /// Exactly one template set.
    Scroll(GridScrollLayoutAlgorithm),
    /// Exactly one template set, with layout options.
    ScrollWithOptions(GridScrollWithOptionsLayoutAlgorithm),
}

impl GridLayoutAlgorithmKind {
    /// Picks the algorithm for `property`, working on a copy of `info`.
    pub fn select(info: &GridLayoutInfo, property: &GridLayoutProperty, can_over_scroll: bool) -> Self {
        let info = info.clone();
        let property = property.clone();
        if property.is_static() {
            return Self::Static(GridLayoutAlgorithm::new(info, property));
        }
        if !property.is_configured_scrollable() {
            return Self::Adaptive(GridAdaptiveLayoutAlgorithm::new(info, property));
        }
        match property.layout_options.clone() {
            Some(options) => {
                let mut algorithm = GridScrollWithOptionsLayoutAlgorithm::new(info, property, options);
                algorithm.set_can_over_scroll(can_over_scroll);
                Self::ScrollWithOptions(algorithm)
            }
            None => {
                let mut algorithm = GridScrollLayoutAlgorithm::new(info, property);
                algorithm.set_can_over_scroll(can_over_scroll);
                Self::Scroll(algorithm)
            }
        }
    }

    pub fn is_scrollable(&self) -> bool {
        matches!(self, Self::Scroll(_) | Self::ScrollWithOptions(_))
    }

    pub fn measure(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        match self {
            Self::Static(algorithm) => algorithm.measure(wrapper),
            Self::Adaptive(algorithm) => algorithm.measure(wrapper),
            Self::Scroll(algorithm) => algorithm.measure(wrapper),
            Self::ScrollWithOptions(algorithm) => algorithm.measure(wrapper),
        }
    }

    pub fn layout(&mut self, wrapper: &mut dyn GridLayoutWrapper) {
        match self {
            Self::Static(algorithm) => algorithm.layout(wrapper),
            Self::Adaptive(algorithm) => algorithm.layout(wrapper),
            Self::Scroll(algorithm) => algorithm.layout(wrapper),
            Self::ScrollWithOptions(algorithm) => algorithm.layout(wrapper),
        }
    }

    pub fn layout_info(&self) -> &GridLayoutInfo {
        match self {
            Self::Static(algorithm) => algorithm.layout_info(),
            Self::Adaptive(algorithm) => algorithm.layout_info(),
            Self::Scroll(algorithm) => algorithm.layout_info(),
            Self::ScrollWithOptions(algorithm) => algorithm.layout_info(),
        }
    }

    pub fn into_layout_info(self) -> GridLayoutInfo {
        match self {
            Self::Static(algorithm) => algorithm.into_layout_info(),
            Self::Adaptive(algorithm) => algorithm.into_layout_info(),
            Self::Scroll(algorithm) => algorithm.into_layout_info(),
            Self::ScrollWithOptions(algorithm) => algorithm.into_layout_info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layout_options::GridLayoutOptions;

    fn kind(property: GridLayoutProperty) -> &'static str {
        match GridLayoutAlgorithmKind::select(&GridLayoutInfo::new(), &property, false) {
            GridLayoutAlgorithmKind::Static(_) => "static",
            GridLayoutAlgorithmKind::Adaptive(_) => "adaptive",
            GridLayoutAlgorithmKind::Scroll(_) => "scroll",
            GridLayoutAlgorithmKind::ScrollWithOptions(_) => "options",
        }
    }

    #[test]
    fn templates_select_the_algorithm() {
        let columns = GridLayoutProperty::new().columns_template("1fr 1fr");
        assert_eq!(kind(columns.clone().rows_template("1fr")), "static");
        assert_eq!(kind(GridLayoutProperty::new()), "adaptive");
        assert_eq!(kind(columns.clone()), "scroll");
        assert_eq!(kind(GridLayoutProperty::new().rows_template("1fr")), "scroll");
        assert_eq!(
            kind(columns.layout_options(GridLayoutOptions::new().irregular_indexes([0]))),
            "options"
        );
    }

    #[test]
    fn blank_template_counts_as_unset() {
        assert_eq!(kind(GridLayoutProperty::new().columns_template("  ")), "adaptive");
    }
}
