//! Spatial focus navigation between grid items.
//!
//! A step is first turned into a move along the grid's own main and cross
//! axes, then resolved against the recorded matrix. Regular grids scan the
//! target line outward from the current cross position; grids holding big
//! items compare every recorded item geometrically instead, and Tab follows
//! reading order there.

use arkui_ui_layout::Axis;

use super::layout_info::GridLayoutInfo;
use super::layout_options::GridItemIndexInfo;
use super::scroll_layout_algorithm::item_main_range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusStep {
    Up,
    Down,
    Left,
    Right,
    UpEnd,
    DownEnd,
    LeftEnd,
    RightEnd,
    Tab,
    ShiftTab,
}

/// Non-owning reference to a focused item.
///
/// The generation is bumped whenever the data source changes, so a handle
/// taken before a mutation no longer resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FocusHandle {
    item_index: i32,
    generation: u64,
}

impl FocusHandle {
    pub(crate) fn new(item_index: i32, generation: u64) -> Self {
        Self {
            item_index,
            generation,
        }
    }

    pub fn item_index(&self) -> i32 {
        self.item_index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of one navigation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusOutcome {
    Item(i32),
    /// The target line is not recorded yet; scroll `index` into view first.
    ScrollTo(i32),
    None,
}

/// A step expressed along the grid's axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Move {
    MainPrev,
    MainNext,
    CrossPrev,
    CrossNext,
    MainFirst,
    MainLast,
    CrossFirst,
    CrossLast,
}

fn to_move(axis: Axis, step: FocusStep) -> Option<Move> {
    let vertical = axis.is_vertical();
    Some(match step {
        FocusStep::Up if vertical => Move::MainPrev,
        FocusStep::Down if vertical => Move::MainNext,
        FocusStep::Left if vertical => Move::CrossPrev,
        FocusStep::Right if vertical => Move::CrossNext,
        FocusStep::UpEnd if vertical => Move::MainFirst,
        FocusStep::DownEnd if vertical => Move::MainLast,
        FocusStep::LeftEnd if vertical => Move::CrossFirst,
        FocusStep::RightEnd if vertical => Move::CrossLast,
        FocusStep::Up => Move::CrossPrev,
        FocusStep::Down => Move::CrossNext,
        FocusStep::Left => Move::MainPrev,
        FocusStep::Right => Move::MainNext,
        FocusStep::UpEnd => Move::CrossFirst,
        FocusStep::DownEnd => Move::CrossLast,
        FocusStep::LeftEnd => Move::MainFirst,
        FocusStep::RightEnd => Move::MainLast,
        FocusStep::Tab | FocusStep::ShiftTab => return None,
    })
}

/// Position and extent of `item` in the recorded matrix.
pub fn item_index_info(info: &GridLayoutInfo, item: i32) -> Option<GridItemIndexInfo> {
    let (main, cross) = info.find_item(item)?;
    let (main_start, main_end) = item_main_range(&info.grid_matrix, item, main);
    let cross_span = info
        .grid_matrix
        .get(&main)
        .map_or(1, |cells| cells.values().filter(|v| **v == item).count() as i32);
    Some(GridItemIndexInfo::new(
        main_start,
        cross,
        main_end - main_start + 1,
        cross_span.max(1),
    ))
}

fn overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> i32 {
    (a_end.min(b_end) - a_start.max(b_start) + 1).max(0)
}

struct Navigator<'a, F> {
    info: &'a GridLayoutInfo,
    focusable: F,
    current: i32,
    cur: GridItemIndexInfo,
}

impl<F: Fn(i32) -> bool> Navigator<'_, F> {
    fn candidate(&self, item: i32) -> bool {
        item >= 0 && item != self.current && (self.focusable)(item)
    }

    fn cross_count(&self) -> i32 {
        self.info.cross_count.max(1)
    }

    fn max_recorded(&self) -> i32 {
        self.info
            .grid_matrix
            .values()
            .flat_map(|cells| cells.values().copied())
            .max()
            .unwrap_or(-1)
    }

    fn min_recorded(&self) -> i32 {
        self.info
            .grid_matrix
            .values()
            .flat_map(|cells| cells.values().copied())
            .filter(|v| *v >= 0)
            .min()
            .unwrap_or(0)
    }

    fn resolve(&self, step: FocusStep) -> FocusOutcome {
        match step {
            FocusStep::Tab | FocusStep::ShiftTab if self.info.has_big_item => {
                self.reading_order(step == FocusStep::Tab)
            }
            FocusStep::Tab => {
                if self.is_last_focusable_in_line() {
                    self.line_end(self.cur.main_end + 1, true)
                } else {
                    self.apply(Move::CrossNext)
                }
            }
            FocusStep::ShiftTab => {
                if self.is_first_focusable_in_line() {
                    self.line_end(self.cur.main_start - 1, false)
                } else {
                    self.apply(Move::CrossPrev)
                }
            }
            _ => match to_move(self.info.axis, step) {
                Some(mv) => self.apply(mv),
                None => FocusOutcome::None,
            },
        }
    }

    fn apply(&self, mv: Move) -> FocusOutcome {
        let cur = self.cur;
        match mv {
            Move::MainPrev => self.step_line(cur.main_start - 1, false),
            Move::MainNext => self.step_line(cur.main_end + 1, true),
            Move::CrossPrev => self.step_cross(false),
            Move::CrossNext => self.step_cross(true),
            Move::CrossFirst => self.scan_line(cur.main_start, 0, Scan::Forward),
            Move::CrossLast => self.scan_line(cur.main_start, self.cross_count() - 1, Scan::Backward),
            Move::MainFirst => match self.info.find_item(0) {
                Some((line, _)) if line != cur.main_start => self.scan_line(line, cur.cross_start, Scan::Outward),
                Some(_) => FocusOutcome::None,
                None => FocusOutcome::ScrollTo(0),
            },
            Move::MainLast => {
                let last = self.info.children_count - 1;
                match self.info.find_item(last) {
                    Some((line, _)) if line > cur.main_end => {
                        self.scan_line(line, cur.cross_start, Scan::Outward)
                    }
                    Some(_) => FocusOutcome::None,
                    None if last >= 0 => FocusOutcome::ScrollTo(last),
                    None => FocusOutcome::None,
                }
            }
        }
    }

    /// Moves to an adjacent line, scrolling when it was never recorded.
    fn step_line(&self, line: i32, forward: bool) -> FocusOutcome {
        if !self.info.grid_matrix.contains_key(&line) {
            return self.beyond_matrix(forward);
        }
        if self.info.has_big_item {
            return self.nearest_irregular(forward);
        }
        self.scan_line(line, self.cur.cross_start, Scan::Outward)
    }

    fn step_cross(&self, forward: bool) -> FocusOutcome {
        if self.info.has_big_item {
            return self.nearest_in_cross(forward);
        }
        let (from, scan) = if forward {
            (self.cur.cross_end + 1, Scan::Forward)
        } else {
            (self.cur.cross_start - 1, Scan::Backward)
        };
        if from < 0 || from >= self.cross_count() {
            return FocusOutcome::None;
        }
        self.scan_line(self.cur.main_start, from, scan)
    }

    /// First (or last) focusable item of `line`, for Tab leaving a line.
    fn line_end(&self, line: i32, forward: bool) -> FocusOutcome {
        if !self.info.grid_matrix.contains_key(&line) {
            return self.beyond_matrix(forward);
        }
        if forward {
            self.scan_line(line, 0, Scan::Forward)
        } else {
            self.scan_line(line, self.cross_count() - 1, Scan::Backward)
        }
    }

    /// Tab order once big items break the line structure: items sort by
    /// their first line, then by cross position. An item reaching into a
    /// line from above was passed on an earlier line.
    fn reading_order(&self, forward: bool) -> FocusOutcome {
        let current = (self.cur.main_start, self.cur.cross_start);
        let keyed = self
            .irregular_candidates()
            .into_iter()
            .map(|(item, c)| ((c.main_start, c.cross_start), item));
        let found = if forward {
            keyed.filter(|(key, _)| *key > current).min_by_key(|(key, _)| *key)
        } else {
            keyed.filter(|(key, _)| *key < current).max_by_key(|(key, _)| *key)
        };
        match found {
            Some((_, item)) => FocusOutcome::Item(item),
            None => self.beyond_matrix(forward),
        }
    }

    fn beyond_matrix(&self, forward: bool) -> FocusOutcome {
        let cross = self.cross_count();
        if forward {
            let next = self.max_recorded() + 1;
            if next >= self.info.children_count {
                return FocusOutcome::None;
            }
            FocusOutcome::ScrollTo((self.current + cross).clamp(next, self.info.children_count - 1))
        } else {
            let prev = self.min_recorded() - 1;
            if prev < 0 {
                return FocusOutcome::None;
            }
            FocusOutcome::ScrollTo((self.current - cross).clamp(0, prev))
        }
    }

    fn scan_line(&self, line: i32, from: i32, scan: Scan) -> FocusOutcome {
        let Some(cells) = self.info.grid_matrix.get(&line) else {
            return FocusOutcome::None;
        };
        let hit = |cross: i32| cells.get(&cross).copied().filter(|item| self.candidate(*item));
        let count = self.cross_count();
        let found = match scan {
            Scan::Forward => (from.max(0)..count).find_map(hit),
            Scan::Backward => (0..=from.min(count - 1)).rev().find_map(hit),
            Scan::Outward => (0..count).find_map(|distance| {
                hit(from - distance).or_else(|| hit(from + distance))
            }),
        };
        found.map_or(FocusOutcome::None, FocusOutcome::Item)
    }

    fn is_last_focusable_in_line(&self) -> bool {
        let Some(cells) = self.info.grid_matrix.get(&self.cur.main_start) else {
            return true;
        };
        !cells
            .range(self.cur.cross_end + 1..)
            .any(|(_, item)| self.candidate(*item))
    }

    fn is_first_focusable_in_line(&self) -> bool {
        let Some(cells) = self.info.grid_matrix.get(&self.cur.main_start) else {
            return true;
        };
        !cells
            .range(..self.cur.cross_start)
            .any(|(_, item)| self.candidate(*item))
    }

    fn irregular_candidates(&self) -> Vec<(i32, GridItemIndexInfo)> {
        let mut seen = Vec::new();
        for cells in self.info.grid_matrix.values() {
            for &item in cells.values() {
                if self.candidate(item) && !seen.iter().any(|(i, _)| *i == item) {
                    if let Some(index_info) = item_index_info(self.info, item) {
                        seen.push((item, index_info));
                    }
                }
            }
        }
        seen
    }

    /// Nearest item past the current one along the main axis, preferring
    /// the largest cross overlap.
    fn nearest_irregular(&self, forward: bool) -> FocusOutcome {
        let cur = self.cur;
        let best = self
            .irregular_candidates()
            .into_iter()
            .filter_map(|(item, c)| {
                let distance = if forward {
                    c.main_start - cur.main_end
                } else {
                    cur.main_start - c.main_end
                };
                (distance > 0).then(|| {
                    let cross_overlap = overlap(c.cross_start, c.cross_end, cur.cross_start, cur.cross_end);
                    let cross_distance = (c.cross_start - cur.cross_start).abs();
                    ((distance, -cross_overlap, cross_distance, c.main_start, c.cross_start), item)
                })
            })
            .min_by_key(|(key, _)| *key);
        match best {
            Some((_, item)) => FocusOutcome::Item(item),
            None => self.beyond_matrix(forward),
        }
    }

    fn nearest_in_cross(&self, forward: bool) -> FocusOutcome {
        let cur = self.cur;
        self.irregular_candidates()
            .into_iter()
            .filter_map(|(item, c)| {
                let main_overlap = overlap(c.main_start, c.main_end, cur.main_start, cur.main_end);
                let distance = if forward {
                    c.cross_start - cur.cross_end
                } else {
                    cur.cross_start - c.cross_end
                };
                (distance > 0 && main_overlap > 0)
                    .then_some(((distance, -main_overlap, c.main_start, c.cross_start), item))
            })
            .min_by_key(|(key, _)| *key)
            .map_or(FocusOutcome::None, |(_, item)| FocusOutcome::Item(item))
    }
}

#[derive(Clone, Copy, Debug)]
enum Scan {
    Forward,
    Backward,
    Outward,
}

/// Item that focus moves to from `current` on `step`.
pub fn next_focus(
    info: &GridLayoutInfo,
    current: i32,
    step: FocusStep,
    focusable: impl Fn(i32) -> bool,
) -> FocusOutcome {
    let Some(cur) = item_index_info(info, current) else {
        log::debug!("focused grid item {current} is not in the matrix");
        return FocusOutcome::None;
    };
    let navigator = Navigator {
        info,
        focusable,
        current,
        cur,
    };
    navigator.resolve(step)
}
