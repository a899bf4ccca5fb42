use std::cell::RefCell;
use std::rc::Rc;

use arkui_foundation::grid::{GridLayoutProperty, ScrollAlign, LAST_ITEM};
use arkui_testing::{FakeGridHost, GridTestRule};

fn three_columns() -> GridLayoutProperty {
    GridLayoutProperty::new()
        .columns_template("1fr 1fr 1fr")
        .rows_gap(10.0)
}

fn grid(count: usize) -> GridTestRule {
    GridTestRule::new(three_columns(), FakeGridHost::new(300.0, 1000.0, count, 100.0))
}

#[test]
fn first_frame_fills_the_viewport() {
    let rule = grid(10_000);
    assert_eq!(rule.visible_items(), (0..30).collect::<Vec<_>>());
    assert_eq!(rule.info().end_main_line_index, 9);
    assert!(rule.info().reach_start);
    assert!(!rule.info().offset_end);
    assert_eq!(rule.offset_of(4).map(|o| (o.x, o.y)), Some((100.0, 110.0)));
}

#[test]
fn fling_skips_lines_by_estimate() {
    let mut rule = grid(10_000);
    rule.host_mut().clear_measure_log();

    assert!(rule.fling_by(-5000.0));

    assert_eq!(rule.info().start_index, 135);
    // everything between the old window and the landing line is skipped
    assert!(rule.host().measure_log().iter().all(|index| *index >= 135));
    assert!(rule.info().current_offset <= 0.0);
}

#[test]
fn jump_far_measures_only_around_the_target() {
    let mut rule = grid(10_000);
    rule.host_mut().clear_measure_log();

    rule.scroll_to_index(9000, ScrollAlign::Start);

    assert_eq!(rule.info().start_index, 9000);
    assert_eq!(rule.offset_of(9000).map(|o| o.y), Some(0.0));
    assert!(!rule.host().measure_log().is_empty());
    assert!(rule.host().measure_log().iter().all(|index| *index >= 9000));
}

#[test]
fn jump_to_last_item_aligns_it_with_the_end() {
    let reached_end = Rc::new(RefCell::new(0));
    let sink = reached_end.clone();
    let mut rule = GridTestRule::with_setup(
        three_columns(),
        FakeGridHost::new(300.0, 1000.0, 100, 100.0),
        |pattern| pattern.events_mut().set_on_reach_end(move || *sink.borrow_mut() += 1),
    );

    rule.scroll_to_index(LAST_ITEM, ScrollAlign::End);

    assert_eq!(rule.offset_of(99).map(|o| o.y), Some(900.0));
    assert_eq!(rule.info().end_index, 99);
    assert!(rule.info().offset_end);
    assert_eq!(*reached_end.borrow(), 1);
}

#[test]
fn drag_past_the_end_settles_back_on_release() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let mut rule = GridTestRule::with_setup(
        three_columns(),
        FakeGridHost::new(300.0, 1000.0, 30, 100.0),
        |pattern| {
            let events = pattern.events_mut();
            let s = sink.clone();
            events.set_on_reach_start(move || s.borrow_mut().push("reach_start"));
            let s = sink.clone();
            events.set_on_reach_end(move || s.borrow_mut().push("reach_end"));
            let s = sink.clone();
            events.set_on_scroll_start(move || s.borrow_mut().push("start"));
            let s = sink.clone();
            events.set_on_scroll_stop(move || s.borrow_mut().push("stop"));
        },
    );
    assert!(rule.pattern().is_scrollable());

    rule.drag_by(-200.0);
    // the spring lets the last line leave the viewport end while dragging
    assert_eq!(rule.offset_of(29).map(|o| o.y), Some(790.0));

    rule.end_scroll();
    assert_eq!(rule.offset_of(29).map(|o| o.y + 100.0), Some(1000.0));
    assert_eq!(
        log.borrow().as_slice(),
        &["reach_start", "start", "reach_end", "stop"]
    );
}

#[test]
fn scroll_index_reports_window_changes() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut rule = GridTestRule::with_setup(
        three_columns(),
        FakeGridHost::new(300.0, 1000.0, 1000, 100.0),
        |pattern| {
            pattern
                .events_mut()
                .set_on_scroll_index(move |start, end| sink.borrow_mut().push((start, end)))
        },
    );

    // line 10 is still below the viewport end
    rule.drag_by(-50.0);
    rule.drag_by(-100.0);

    assert_eq!(seen.borrow().as_slice(), &[(0, 29), (3, 32)]);
}

#[test]
fn page_down_moves_one_viewport() {
    let mut rule = grid(1000);
    assert!(rule.press_key(arkui_foundation::grid::KeyCode::PageDown));
    // ten lines of 110 span 1100, so a 1000 page lands 10 into line 9
    assert_eq!(rule.info().start_index, 27);
    assert_eq!(rule.info().current_offset, -10.0);
}

#[test]
fn shrinking_data_rebuilds_the_matrix() {
    let mut rule = grid(1000);
    rule.drag_by(-300.0);
    rule.end_scroll();
    rule.set_child_count(5);

    assert_eq!(rule.visible_items(), vec![0, 1, 2, 3, 4]);
    assert!(rule.info().reach_end);
    assert!(!rule.pattern().is_scrollable());
}

#[test]
fn restore_info_resumes_at_the_saved_item() {
    let mut rule = grid(1000);
    rule.drag_by(-450.0);
    rule.end_scroll();
    let saved = rule.pattern().provide_restore_info();
    let start = rule.info().start_index;
    assert_eq!(start, 12);

    let restored = GridTestRule::with_setup(
        three_columns(),
        FakeGridHost::new(300.0, 1000.0, 1000, 100.0),
        |pattern| pattern.on_restore_info(&saved),
    );
    assert_eq!(restored.info().start_index, start);
    assert_eq!(restored.offset_of(12).map(|o| o.y), Some(0.0));
}
