//! Scroll bookkeeping shared by scrollable containers: where a delta came
//! from, the resulting scroll state, overscroll friction and edge effects.

use super::layout_property::EdgeEffect;

/// Origin of an offset change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollSource {
    /// Finger or mouse drag.
    Drag,
    /// Inertial motion after a drag.
    Fling,
    /// Programmatic animation such as an animated scroll-to.
    Animation,
    /// Spring-back after overscroll.
    EdgeEffect,
    /// Scroll bar drag.
    ScrollBar,
    /// Programmatic jump (page, scroll-to, restore).
    #[default]
    Jump,
}

/// State reported to `onScroll`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollState {
    #[default]
    Idle,
    Scroll,
    Fling,
}

impl From<ScrollSource> for ScrollState {
    fn from(source: ScrollSource) -> Self {
        match source {
            ScrollSource::Drag => Self::Scroll,
            ScrollSource::Fling | ScrollSource::Animation | ScrollSource::EdgeEffect => Self::Fling,
            ScrollSource::ScrollBar | ScrollSource::Jump => Self::Idle,
        }
    }
}

/// Damping applied to a delta when the content is already `gamma`
/// viewports past an edge.
pub fn calculate_friction(gamma: f32) -> f32 {
    (-1.848 * gamma.clamp(0.0, 1.0)).exp()
}

/// Whether `source` may push the content past its edges under `effect`.
pub fn can_over_scroll(effect: EdgeEffect, source: ScrollSource) -> bool {
    effect == EdgeEffect::Spring
        && matches!(
            source,
            ScrollSource::Drag | ScrollSource::Fling | ScrollSource::Animation | ScrollSource::EdgeEffect
        )
}

/// Edge distances of the laid out window, as seen by the offset handler.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct EdgeState {
    pub reach_start: bool,
    pub reach_end: bool,
    /// Offset of the first line; positive reveals blank before the content.
    pub current_offset: f32,
    /// Main-axis length of the windowed lines.
    pub content_in_view: f32,
    pub main_size: f32,
}

impl EdgeState {
    /// Blank revealed before the first line.
    pub fn overscroll_start(&self) -> f32 {
        if self.reach_start {
            self.current_offset.max(0.0)
        } else {
            0.0
        }
    }

    /// Blank revealed after the last line.
    pub fn overscroll_end(&self) -> f32 {
        if self.reach_end && self.content_in_view >= 0.0 {
            let bottom = self.current_offset + self.content_in_view;
            let end = self.main_size.max(0.0);
            // a window shorter than the viewport is pinned to the start
            if self.content_in_view < end {
                return (-self.current_offset).max(0.0);
            }
            (end - bottom).max(0.0)
        } else {
            0.0
        }
    }
}

/// Tracks the scroll in progress and the overscroll an edge effect shows.
#[derive(Clone, Debug, Default)]
pub struct ScrollTracker {
    source: ScrollSource,
    scrolling: bool,
    start_fired: bool,
    stop_pending: bool,
    fade_overscroll: f32,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> ScrollSource {
        self.source
    }

    pub fn state(&self) -> ScrollState {
        if self.scrolling {
            self.source.into()
        } else {
            ScrollState::Idle
        }
    }

    pub fn is_scroll_in_progress(&self) -> bool {
        self.scrolling
    }

    /// Overscroll the fade painter should show, signed like the offset.
    pub fn fade_overscroll(&self) -> f32 {
        self.fade_overscroll
    }

    pub fn begin(&mut self, source: ScrollSource) {
        self.source = source;
        self.scrolling = !matches!(source, ScrollSource::Jump);
    }

    pub fn end(&mut self) {
        if self.scrolling {
            self.stop_pending = true;
        }
        self.scrolling = false;
        self.fade_overscroll = 0.0;
    }

    /// True the first time it is called during a scroll.
    pub fn take_start(&mut self) -> bool {
        if self.scrolling && !self.start_fired {
            self.start_fired = true;
            return true;
        }
        false
    }

    pub fn take_stop(&mut self) -> bool {
        if self.stop_pending {
            self.stop_pending = false;
            self.start_fired = false;
            return true;
        }
        false
    }

    /// Filters `delta` through the edge effect. Returns the delta to apply,
    /// or `None` when the effect consumed it.
    pub fn apply_edge_effect(&mut self, effect: EdgeEffect, edges: EdgeState, delta: f32) -> Option<f32> {
        if can_over_scroll(effect, self.source) {
            return Some(self.spring_delta(edges, delta));
        }
        let pushes_start = delta > 0.0 && edges.reach_start;
        let pushes_end = delta < 0.0 && edges.reach_end;
        if pushes_start {
            let room = (-edges.current_offset).max(0.0);
            if delta > room {
                self.record_fade(effect, delta - room);
                return (room > 0.0).then_some(room);
            }
        } else if pushes_end {
            let room = (edges.current_offset + edges.content_in_view - edges.main_size).max(0.0);
            if -delta > room {
                self.record_fade(effect, delta + room);
                return (room > 0.0).then_some(-room);
            }
        }
        Some(delta)
    }

    fn record_fade(&mut self, effect: EdgeEffect, overflow: f32) {
        if effect == EdgeEffect::Fade {
            self.fade_overscroll += overflow;
        }
    }

    /// Damps deltas that push further past an edge the content already
    /// overscrolls.
    fn spring_delta(&self, edges: EdgeState, delta: f32) -> f32 {
        if matches!(self.source, ScrollSource::EdgeEffect) || edges.main_size <= 0.0 {
            return delta;
        }
        let start = edges.overscroll_start();
        let end = edges.overscroll_end();
        if delta > 0.0 && start > 0.0 {
            delta * calculate_friction(start / edges.main_size)
        } else if delta < 0.0 && end > 0.0 {
            delta * calculate_friction(end / edges.main_size)
        } else {
            delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_start() -> EdgeState {
        EdgeState {
            reach_start: true,
            reach_end: false,
            current_offset: 0.0,
            content_in_view: 900.0,
            main_size: 500.0,
        }
    }

    #[test]
    fn friction_decays_with_overscroll() {
        assert_eq!(calculate_friction(0.0), 1.0);
        assert!(calculate_friction(0.5) < calculate_friction(0.1));
        assert_eq!(calculate_friction(3.0), calculate_friction(1.0));
    }

    #[test]
    fn source_maps_to_scroll_state() {
        assert_eq!(ScrollState::from(ScrollSource::Drag), ScrollState::Scroll);
        assert_eq!(ScrollState::from(ScrollSource::Fling), ScrollState::Fling);
        assert_eq!(ScrollState::from(ScrollSource::Jump), ScrollState::Idle);
    }

    #[test]
    fn none_effect_rejects_delta_at_start() {
        let mut tracker = ScrollTracker::new();
        tracker.begin(ScrollSource::Drag);
        assert_eq!(tracker.apply_edge_effect(EdgeEffect::None, at_start(), 40.0), None);
        assert_eq!(tracker.apply_edge_effect(EdgeEffect::None, at_start(), -40.0), Some(-40.0));
        assert_eq!(tracker.fade_overscroll(), 0.0);
    }

    #[test]
    fn fade_clamps_and_records_overflow() {
        let mut tracker = ScrollTracker::new();
        tracker.begin(ScrollSource::Drag);
        let edges = EdgeState {
            current_offset: -10.0,
            ..at_start()
        };
        assert_eq!(tracker.apply_edge_effect(EdgeEffect::Fade, edges, 25.0), Some(10.0));
        assert_eq!(tracker.fade_overscroll(), 15.0);
        tracker.end();
        assert_eq!(tracker.fade_overscroll(), 0.0);
    }

    #[test]
    fn spring_damps_only_past_the_edge() {
        let mut tracker = ScrollTracker::new();
        tracker.begin(ScrollSource::Drag);
        assert_eq!(tracker.apply_edge_effect(EdgeEffect::Spring, at_start(), 40.0), Some(40.0));
        let pulled = EdgeState {
            current_offset: 250.0,
            ..at_start()
        };
        let damped = tracker
            .apply_edge_effect(EdgeEffect::Spring, pulled, 40.0)
            .unwrap_or_default();
        assert!(damped < 40.0 && damped > 0.0);
    }

    #[test]
    fn jump_never_overscrolls() {
        assert!(!can_over_scroll(EdgeEffect::Spring, ScrollSource::Jump));
        assert!(can_over_scroll(EdgeEffect::Spring, ScrollSource::Fling));
        assert!(!can_over_scroll(EdgeEffect::Fade, ScrollSource::Drag));
    }

    #[test]
    fn start_and_stop_fire_once_per_scroll() {
        let mut tracker = ScrollTracker::new();
        tracker.begin(ScrollSource::Drag);
        assert!(tracker.take_start());
        assert!(!tracker.take_start());
        assert!(!tracker.take_stop());
        tracker.end();
        assert!(tracker.take_stop());
        assert!(!tracker.take_stop());
        assert_eq!(tracker.state(), ScrollState::Idle);
    }
}
