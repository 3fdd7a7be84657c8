//! Properties of the direction dispatcher.
//!
//! Every column-oriented structural operation must equal the row-oriented
//! primitive run on the transposed grid and transposed back:
//!
//! ```text
//! op_column(g) == transpose(op_row(transpose(g)))
//! ```
//!
//! These properties drive both orientations against one shared expectation,
//! so the two code paths cannot drift apart.

use proptest::collection::vec;
use proptest::prelude::*;
use tabula::{Grid, transpose};

fn grid_from(rows: Vec<Vec<i32>>) -> Grid<i32> {
    Grid::from_rows(rows, |r, c| (r * 31 + c) as i32).unwrap()
}

/// The same factory seen through the transposed coordinate system.
fn grid_from_transposed(rows: Vec<Vec<i32>>) -> Grid<i32> {
    Grid::from_rows(rows, |r, c| (c * 31 + r) as i32).unwrap()
}

prop_compose! {
    fn rect()(dims in (1usize..5, 1usize..5))
             (content in vec(vec(0i32..1000, dims.1), dims.0),
              dims in Just(dims))
             -> (Vec<Vec<i32>>, usize, usize) {
        (content, dims.0, dims.1)
    }
}

proptest! {
    #[test]
    fn transpose_is_an_involution((content, _, _) in rect()) {
        prop_assert_eq!(transpose(&transpose(&content)), content);
    }

    #[test]
    fn reset_round_trip((content, _, _) in rect()) {
        let grid = grid_from(content.clone());
        let snapshot = grid.to_rows();
        grid.reset(snapshot).unwrap();
        prop_assert_eq!(grid.to_rows(), content);
    }

    #[test]
    fn column_insert_matches_transposed_row_insert(
        (content, rows, cols) in rect(),
        at_seed in any::<usize>(),
        count in 1usize..3,
        value_seed in 0i32..1000,
    ) {
        let at = at_seed % (cols + 1);
        let lines: Vec<Vec<i32>> = (0..count)
            .map(|k| (0..rows).map(|r| value_seed + (k * rows + r) as i32).collect())
            .collect();

        let by_column = grid_from(content.clone());
        by_column.insert_columns(at, lines.clone()).unwrap();

        let by_row = grid_from_transposed(transpose(&content));
        by_row.insert_rows(at, lines).unwrap();

        prop_assert_eq!(by_column.to_rows(), transpose(&by_row.to_rows()));
    }

    #[test]
    fn column_remove_matches_transposed_row_remove(
        (content, _, cols) in rect(),
        at_seed in any::<usize>(),
        count_seed in any::<usize>(),
    ) {
        // Keep at least one column: a zero-width row set has no transposed
        // representation.
        prop_assume!(cols >= 2);
        let count = 1 + count_seed % (cols - 1);
        let at = at_seed % (cols - count + 1);

        let by_column = grid_from(content.clone());
        by_column.remove_columns(at, count).unwrap();

        let by_row = grid_from_transposed(transpose(&content));
        by_row.remove_rows(at, count).unwrap();

        prop_assert_eq!(by_column.to_rows(), transpose(&by_row.to_rows()));
    }

    #[test]
    fn column_move_matches_transposed_row_move(
        (content, _, cols) in rect(),
        from_seed in any::<usize>(),
        to_seed in any::<usize>(),
        count_seed in any::<usize>(),
    ) {
        let count = 1 + count_seed % cols;
        let from = from_seed % (cols - count + 1);
        let to = to_seed % (cols - count + 1);

        let by_column = grid_from(content.clone());
        by_column.move_columns(from, to, count).unwrap();

        let by_row = grid_from_transposed(transpose(&content));
        by_row.move_rows(from, to, count).unwrap();

        prop_assert_eq!(by_column.to_rows(), transpose(&by_row.to_rows()));
    }

    #[test]
    fn column_overwrite_matches_transposed_row_overwrite(
        (content, rows, cols) in rect(),
        at_seed in any::<usize>(),
        count in 1usize..4,
        value_seed in 0i32..1000,
    ) {
        let at = at_seed % (cols + 1);
        let lines: Vec<Vec<i32>> = (0..count)
            .map(|k| (0..rows).map(|r| value_seed + (k * rows + r) as i32).collect())
            .collect();

        let by_column = grid_from(content.clone());
        by_column.overwrite_columns(at, lines.clone()).unwrap();

        let by_row = grid_from_transposed(transpose(&content));
        by_row.overwrite_rows(at, lines).unwrap();

        prop_assert_eq!(by_column.to_rows(), transpose(&by_row.to_rows()));
    }

    #[test]
    fn column_adjust_matches_transposed_row_adjust(
        (content, _, _) in rect(),
        target in 1usize..7,
    ) {
        let by_column = grid_from(content.clone());
        by_column.adjust_column_count(target).unwrap();

        let by_row = grid_from_transposed(transpose(&content));
        by_row.adjust_row_count(target).unwrap();

        prop_assert_eq!(by_column.to_rows(), transpose(&by_row.to_rows()));
    }

    #[test]
    fn set_then_get_returns_the_value_and_disturbs_nothing(
        (content, rows, cols) in rect(),
        r_seed in any::<usize>(),
        c_seed in any::<usize>(),
        value in 0i32..1000,
    ) {
        let r = r_seed % rows;
        let c = c_seed % cols;

        let grid = grid_from(content.clone());
        grid.set(r, c, value).unwrap();

        prop_assert_eq!(grid.get(r, c).unwrap(), value);
        for (i, row) in content.iter().enumerate() {
            for (j, &cell) in row.iter().enumerate() {
                if (i, j) != (r, c) {
                    prop_assert_eq!(grid.get(i, j).unwrap(), cell);
                }
            }
        }
    }
}
