//! User callbacks registered on a grid and the input events it consumes.

use super::scrollable::ScrollState;

/// Pointer position of an item drag, in grid coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemDragInfo {
    pub x: f32,
    pub y: f32,
}

impl ItemDragInfo {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCode {
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Tab,
    Other(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub action: KeyAction,
    pub shift: bool,
}

impl KeyEvent {
    pub fn down(code: KeyCode) -> Self {
        Self {
            code,
            action: KeyAction::Down,
            shift: false,
        }
    }
}

type Callback<Args> = Option<Box<dyn FnMut(Args)>>;

/// Scroll bar position an `onScrollBarUpdate` handler may override:
/// `(offset, content height)`.
pub type ScrollBarOverride = Option<(f32, f32)>;

#[derive(Default)]
pub struct GridEventHub {
    on_scroll_index: Callback<(i32, i32)>,
    on_scroll: Callback<(f32, ScrollState)>,
    on_scroll_start: Callback<()>,
    on_scroll_stop: Callback<()>,
    on_reach_start: Callback<()>,
    on_reach_end: Callback<()>,
    on_scroll_bar_update: Option<Box<dyn FnMut(i32, f32) -> ScrollBarOverride>>,
    on_item_select: Callback<(i32, bool)>,
    on_item_drag_start: Option<Box<dyn FnMut(ItemDragInfo, i32) -> bool>>,
    on_item_drag_enter: Callback<ItemDragInfo>,
    on_item_drag_move: Callback<(ItemDragInfo, i32, i32)>,
    on_item_drag_leave: Callback<(ItemDragInfo, i32)>,
    on_item_drop: Callback<(ItemDragInfo, i32, i32, bool)>,
}

impl std::fmt::Debug for GridEventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridEventHub")
            .field("on_scroll_index", &self.on_scroll_index.is_some())
            .field("on_scroll", &self.on_scroll.is_some())
            .field("on_item_drag_start", &self.on_item_drag_start.is_some())
            .finish_non_exhaustive()
    }
}

impl GridEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_on_scroll_index(&mut self, mut f: impl FnMut(i32, i32) + 'static) {
        self.on_scroll_index = Some(Box::new(move |(start, end)| f(start, end)));
    }

    pub fn set_on_scroll(&mut self, mut f: impl FnMut(f32, ScrollState) + 'static) {
        self.on_scroll = Some(Box::new(move |(offset, state)| f(offset, state)));
    }

    pub fn set_on_scroll_start(&mut self, mut f: impl FnMut() + 'static) {
        self.on_scroll_start = Some(Box::new(move |()| f()));
    }

    pub fn set_on_scroll_stop(&mut self, mut f: impl FnMut() + 'static) {
        self.on_scroll_stop = Some(Box::new(move |()| f()));
    }

    pub fn set_on_reach_start(&mut self, mut f: impl FnMut() + 'static) {
        self.on_reach_start = Some(Box::new(move |()| f()));
    }

    pub fn set_on_reach_end(&mut self, mut f: impl FnMut() + 'static) {
        self.on_reach_end = Some(Box::new(move |()| f()));
    }

    /// `f(start index, estimated offset)` may return its own offset and
    /// content height for the scroll bar.
    pub fn set_on_scroll_bar_update(&mut self, f: impl FnMut(i32, f32) -> ScrollBarOverride + 'static) {
        self.on_scroll_bar_update = Some(Box::new(f));
    }

    pub fn set_on_item_select(&mut self, mut f: impl FnMut(i32, bool) + 'static) {
        self.on_item_select = Some(Box::new(move |(index, selected)| f(index, selected)));
    }

    /// Returning `false` cancels the drag.
    pub fn set_on_item_drag_start(&mut self, f: impl FnMut(ItemDragInfo, i32) -> bool + 'static) {
        self.on_item_drag_start = Some(Box::new(f));
    }

    pub fn set_on_item_drag_enter(&mut self, f: impl FnMut(ItemDragInfo) + 'static) {
        self.on_item_drag_enter = Some(Box::new(f));
    }

    pub fn set_on_item_drag_move(&mut self, mut f: impl FnMut(ItemDragInfo, i32, i32) + 'static) {
        self.on_item_drag_move = Some(Box::new(move |(info, item, insert)| f(info, item, insert)));
    }

    pub fn set_on_item_drag_leave(&mut self, mut f: impl FnMut(ItemDragInfo, i32) + 'static) {
        self.on_item_drag_leave = Some(Box::new(move |(info, item)| f(info, item)));
    }

    pub fn set_on_item_drop(&mut self, mut f: impl FnMut(ItemDragInfo, i32, i32, bool) + 'static) {
        self.on_item_drop = Some(Box::new(move |(info, item, insert, ok)| f(info, item, insert, ok)));
    }

    pub fn has_drag_handlers(&self) -> bool {
        self.on_item_drag_start.is_some() || self.on_item_drop.is_some()
    }

    pub(crate) fn fire_scroll_index(&mut self, start: i32, end: i32) {
        fire(&mut self.on_scroll_index, (start, end));
    }

    pub(crate) fn fire_scroll(&mut self, offset: f32, state: ScrollState) {
        fire(&mut self.on_scroll, (offset, state));
    }

    pub(crate) fn fire_scroll_start(&mut self) {
        fire(&mut self.on_scroll_start, ());
    }

    pub(crate) fn fire_scroll_stop(&mut self) {
        fire(&mut self.on_scroll_stop, ());
    }

    pub(crate) fn fire_reach_start(&mut self) {
        fire(&mut self.on_reach_start, ());
    }

    pub(crate) fn fire_reach_end(&mut self) {
        fire(&mut self.on_reach_end, ());
    }

    pub(crate) fn fire_scroll_bar_update(&mut self, index: i32, offset: f32) -> ScrollBarOverride {
        self.on_scroll_bar_update
            .as_mut()
            .and_then(|f| f(index, offset))
    }

    pub(crate) fn fire_item_select(&mut self, index: i32, selected: bool) {
        fire(&mut self.on_item_select, (index, selected));
    }

    /// Drag is allowed when no handler objects.
    pub(crate) fn fire_item_drag_start(&mut self, info: ItemDragInfo, index: i32) -> bool {
        self.on_item_drag_start
            .as_mut()
            .map_or(true, |f| f(info, index))
    }

    pub(crate) fn fire_item_drag_enter(&mut self, info: ItemDragInfo) {
        fire(&mut self.on_item_drag_enter, info);
    }

    pub(crate) fn fire_item_drag_move(&mut self, info: ItemDragInfo, item: i32, insert: i32) {
        fire(&mut self.on_item_drag_move, (info, item, insert));
    }

    pub(crate) fn fire_item_drag_leave(&mut self, info: ItemDragInfo, item: i32) {
        fire(&mut self.on_item_drag_leave, (info, item));
    }

    pub(crate) fn fire_item_drop(&mut self, info: ItemDragInfo, item: i32, insert: i32, success: bool) {
        fire(&mut self.on_item_drop, (info, item, insert, success));
    }
}

fn fire<Args>(callback: &mut Callback<Args>, args: Args) {
    if let Some(f) = callback.as_mut() {
        f(args);
    }
}
