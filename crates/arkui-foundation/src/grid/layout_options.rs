use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Span of an irregular item in a grid driven by [`GridLayoutOptions`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridItemSize {
    pub rows: i32,
    pub columns: i32,
}

impl Default for GridItemSize {
    fn default() -> Self {
        Self {
            rows: 1,
            columns: 1,
        }
    }
}

impl GridItemSize {
    pub fn new(rows: i32, columns: i32) -> Self {
        Self { rows, columns }
    }
}

pub type ItemSizeFn = Rc<dyn Fn(i32) -> GridItemSize>;

/// Describes which items of a scrollable grid are irregular.
///
/// Items listed in `irregular_indexes` take their span from
/// `get_size_by_index`, or occupy a whole line when no callback is set.
/// Every other item has `regular_size`.
#[derive(Clone)]
pub struct GridLayoutOptions {
    pub regular_size: GridItemSize,
    pub irregular_indexes: BTreeSet<i32>,
    pub get_size_by_index: Option<ItemSizeFn>,
}

impl Default for GridLayoutOptions {
    fn default() -> Self {
        Self {
            regular_size: GridItemSize::default(),
            irregular_indexes: BTreeSet::new(),
            get_size_by_index: None,
        }
    }
}

impl GridLayoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regular_size(mut self, size: GridItemSize) -> Self {
        self.regular_size = size;
        self
    }

    pub fn irregular_indexes(mut self, indexes: impl IntoIterator<Item = i32>) -> Self {
        self.irregular_indexes = indexes.into_iter().collect();
        self
    }

    pub fn get_size_by_index(mut self, f: impl Fn(i32) -> GridItemSize + 'static) -> Self {
        self.get_size_by_index = Some(Rc::new(f));
        self
    }

    pub fn is_irregular(&self, index: i32) -> bool {
        self.irregular_indexes.contains(&index)
    }

    /// Irregular items without a size callback fill their line.
    pub fn fills_line(&self, index: i32) -> bool {
        self.is_irregular(index) && self.get_size_by_index.is_none()
    }

    /// Largest irregular index not greater than `index`.
    pub fn last_irregular_at_or_before(&self, index: i32) -> Option<i32> {
        self.irregular_indexes.range(..=index).next_back().copied()
    }
}

impl PartialEq for GridLayoutOptions {
    fn eq(&self, other: &Self) -> bool {
        let same_callback = match (&self.get_size_by_index, &other.get_size_by_index) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        self.regular_size == other.regular_size
            && self.irregular_indexes == other.irregular_indexes
            && same_callback
    }
}

impl fmt::Debug for GridLayoutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridLayoutOptions")
            .field("regular_size", &self.regular_size)
            .field("irregular_indexes", &self.irregular_indexes)
            .field("get_size_by_index", &self.get_size_by_index.is_some())
            .finish()
    }
}

/// Position snapshot of one item, taken per focus step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridItemIndexInfo {
    pub main_index: i32,
    pub cross_index: i32,
    pub main_span: i32,
    pub cross_span: i32,
    pub main_start: i32,
    pub main_end: i32,
    pub cross_start: i32,
    pub cross_end: i32,
}

impl GridItemIndexInfo {
    pub fn new(main_index: i32, cross_index: i32, main_span: i32, cross_span: i32) -> Self {
        Self {
            main_index,
            cross_index,
            main_span,
            cross_span,
            main_start: main_index,
            main_end: main_index + main_span - 1,
            cross_start: cross_index,
            cross_end: cross_index + cross_span - 1,
        }
    }

    pub fn is_big(&self) -> bool {
        self.main_span > 1 || self.cross_span > 1
    }
}
