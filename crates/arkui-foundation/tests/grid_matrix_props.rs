use std::collections::BTreeMap;

use arkui_foundation::grid::{
    GridItemProperty, GridLayoutInfo, GridLayoutOptions, GridLayoutProperty, ScrollAlign,
};
use arkui_testing::{FakeGridHost, GridTestRule};
use proptest::prelude::*;

fn columns(count: usize) -> String {
    vec!["1fr"; count].join(" ")
}

/// Every recorded line is non-empty and has a height, every height belongs
/// to a recorded line, and every item covers one solid rectangle of cells.
fn check_matrix(info: &GridLayoutInfo, count: usize) -> Result<(), TestCaseError> {
    for (line, cells) in &info.grid_matrix {
        prop_assert!(!cells.is_empty(), "line {} is empty", line);
        prop_assert!(info.line_height_map.contains_key(line), "line {} has no height", line);
    }
    for line in info.line_height_map.keys() {
        prop_assert!(info.grid_matrix.contains_key(line), "height kept for line {}", line);
    }

    let mut cells_of: BTreeMap<i32, Vec<(i32, i32)>> = BTreeMap::new();
    for (&line, cells) in &info.grid_matrix {
        for (&cross, &item) in cells {
            prop_assert!(item >= 0 && (item as usize) < count, "item {} out of range", item);
            cells_of.entry(item).or_default().push((line, cross));
        }
    }
    for (item, cells) in &cells_of {
        let lines = cells.iter().map(|(line, _)| *line);
        let crosses = cells.iter().map(|(_, cross)| *cross);
        let (top, bottom) = (lines.clone().min().unwrap_or(0), lines.max().unwrap_or(0));
        let (left, right) = (crosses.clone().min().unwrap_or(0), crosses.max().unwrap_or(0));
        let area = ((bottom - top + 1) * (right - left + 1)) as usize;
        prop_assert_eq!(cells.len(), area, "item {} is not one rectangle: {:?}", item, cells);
    }

    prop_assert!(info.start_index <= info.end_index);
    prop_assert!((info.end_index as usize) < count);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matrix_stays_row_major_after_scrolling(
        count in 0usize..400,
        cross in 1usize..5,
        deltas in prop::collection::vec(-1500.0f32..1500.0, 1..12),
    ) {
        let property = GridLayoutProperty::new()
            .columns_template(columns(cross))
            .rows_gap(8.0);
        let host = FakeGridHost::new(300.0, 700.0, count, 100.0)
            .with_main_length(|index| 60.0 + (index % 4) as f32 * 20.0);
        let mut rule = GridTestRule::new(property, host);
        for delta in deltas {
            rule.drag_by(delta);
        }
        rule.end_scroll();

        let info = rule.info();
        for cells in info.grid_matrix.values() {
            for (&c, &item) in cells {
                prop_assert!(c >= 0 && (c as usize) < cross);
                prop_assert!(item >= 0 && (item as usize) < count);
            }
        }
        let flat: Vec<i32> = info
            .grid_matrix
            .values()
            .flat_map(|cells| cells.values().copied())
            .collect();
        prop_assert!(flat.windows(2).all(|pair| pair[0] < pair[1]), "matrix out of order: {:?}", flat);

        if count == 0 {
            prop_assert!(info.grid_matrix.is_empty());
            prop_assert_eq!(rule.visible_items(), Vec::<usize>::new());
        } else {
            prop_assert!(info.start_index <= info.end_index);
            prop_assert!((info.end_index as usize) < count);
            prop_assert!(!info.is_out_of_start());
            if info.offset_end && info.current_offset < 0.0 {
                prop_assert!(
                    info.current_offset + info.total_height_of_items_in_view
                        >= info.last_main_size - 0.01
                );
            }
        }
    }

    #[test]
    fn any_jump_target_lands_in_the_window(
        count in 1usize..2000,
        target_seed in 0usize..2000,
        cross in 1usize..5,
    ) {
        let target = (target_seed % count) as i32;
        let property = GridLayoutProperty::new().columns_template(columns(cross));
        let mut rule = GridTestRule::new(property, FakeGridHost::new(300.0, 700.0, count, 90.0));

        rule.scroll_to_index(target, ScrollAlign::Start);

        let info = rule.info();
        prop_assert!(info.start_index <= target && target <= info.end_index);
        prop_assert!(rule.visible_items().contains(&(target as usize)));
    }

    #[test]
    fn spanning_items_keep_lines_measured_and_solid(
        count in 1usize..300,
        cross in 2usize..5,
        spans in prop::collection::vec((0usize..300, 1i32..4, 0i32..3), 0..16),
        deltas in prop::collection::vec(-1500.0f32..1500.0, 1..10),
        target_seed in 0usize..300,
    ) {
        let mut host = FakeGridHost::new(300.0, 700.0, count, 100.0)
            .with_main_length(|index| 70.0 + (index % 3) as f32 * 30.0);
        for (index, rows, extra_columns) in spans {
            if index >= count {
                continue;
            }
            let column = (index % cross) as i32;
            let mut item = GridItemProperty::new().rows(0, rows - 1);
            if extra_columns > 0 {
                item = item.columns(column, column + extra_columns);
            }
            host = host.with_item(index, item);
        }
        let property = GridLayoutProperty::new()
            .columns_template(columns(cross))
            .rows_gap(6.0);
        let mut rule = GridTestRule::new(property, host);
        check_matrix(rule.info(), count)?;

        for delta in deltas {
            rule.drag_by(delta);
            check_matrix(rule.info(), count)?;
        }
        rule.end_scroll();
        check_matrix(rule.info(), count)?;

        rule.scroll_to_index((target_seed % count) as i32, ScrollAlign::Start);
        check_matrix(rule.info(), count)?;
    }

    #[test]
    fn irregular_options_keep_lines_measured_and_solid(
        count in 1usize..300,
        cross in 1usize..5,
        irregular in prop::collection::btree_set(0i32..300, 0..20),
        deltas in prop::collection::vec(-1500.0f32..1500.0, 1..10),
        target_seed in 0usize..300,
    ) {
        let options = GridLayoutOptions::new()
            .irregular_indexes(irregular.into_iter().filter(|index| (*index as usize) < count));
        let property = GridLayoutProperty::new()
            .columns_template(columns(cross))
            .layout_options(options);
        let mut rule = GridTestRule::new(property, FakeGridHost::new(300.0, 700.0, count, 90.0));
        check_matrix(rule.info(), count)?;

        for delta in deltas {
            rule.drag_by(delta);
            check_matrix(rule.info(), count)?;
        }
        rule.end_scroll();
        check_matrix(rule.info(), count)?;

        rule.scroll_to_index((target_seed % count) as i32, ScrollAlign::Start);
        check_matrix(rule.info(), count)?;
        let target = (target_seed % count) as i32;
        prop_assert!(rule.info().start_index <= target && target <= rule.info().end_index);
    }
}
