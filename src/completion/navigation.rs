//! Selection movement over the visible rows
//!
//! Pure functions over a row sequence. Header rows are skipped and never
//! become the target; they only count as "visited" for scrolling.

use super::model::RowKey;

/// Result of a movement over a row sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Movement {
    /// Index of the proposal row to select, `None` when nothing was reached
    pub target: Option<usize>,
    /// Index of the row the view should scroll to
    pub scroll_to: Option<usize>,
}

impl Movement {
    pub fn moved(&self) -> bool {
        self.target.is_some()
    }
}

/// First proposal row
pub fn first(rows: &[RowKey]) -> Movement {
    match rows.iter().position(|row| !row.is_header()) {
        Some(index) => Movement {
            target: Some(index),
            scroll_to: Some(index),
        },
        None => Movement {
            target: None,
            scroll_to: (!rows.is_empty()).then_some(0),
        },
    }
}

/// Last proposal row
pub fn last(rows: &[RowKey]) -> Movement {
    match rows.iter().rposition(|row| !row.is_header()) {
        Some(index) => Movement {
            target: Some(index),
            scroll_to: Some(index),
        },
        None => Movement {
            target: None,
            scroll_to: rows.len().checked_sub(1),
        },
    }
}

/// Move `n` proposal rows down from `current`
///
/// Without a current row this is [`first`]. Stops early at the last
/// proposal row.
pub fn next(rows: &[RowKey], current: Option<usize>, n: usize) -> Movement {
    match current {
        Some(start) if start < rows.len() => advance(rows, start, n, start + 1..rows.len()),
        _ => first(rows),
    }
}

/// Move `n` proposal rows up from `current`
///
/// Without a current row this is [`last`]. Stops early at the first
/// proposal row.
pub fn previous(rows: &[RowKey], current: Option<usize>, n: usize) -> Movement {
    match current {
        Some(start) if start < rows.len() => advance(rows, start, n, (0..start).rev()),
        _ => last(rows),
    }
}

fn advance(
    rows: &[RowKey],
    start: usize,
    n: usize,
    path: impl Iterator<Item = usize>,
) -> Movement {
    let mut target = None;
    let mut visited = start;
    let mut moved = 0;

    for index in path {
        if moved == n {
            break;
        }
        visited = index;
        if !rows[index].is_header() {
            target = Some(index);
            moved += 1;
        }
    }

    Movement {
        target,
        scroll_to: Some(target.unwrap_or(visited)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::provider::ProviderId;

    const P1: ProviderId = ProviderId(1);
    const P2: ProviderId = ProviderId(2);

    /// [P1] a b [P2] x y z
    fn create_test_rows() -> Vec<RowKey> {
        vec![
            RowKey::header(P1),
            RowKey::proposal(P1, 0),
            RowKey::proposal(P1, 1),
            RowKey::header(P2),
            RowKey::proposal(P2, 0),
            RowKey::proposal(P2, 1),
            RowKey::proposal(P2, 2),
        ]
    }

    #[test]
    fn test_first_and_last_skip_headers() {
        let rows = create_test_rows();
        assert_eq!(first(&rows).target, Some(1));
        assert_eq!(last(&rows).target, Some(6));
    }

    #[test]
    fn test_all_headers_leave_selection_unset() {
        let rows = vec![RowKey::header(P1), RowKey::header(P2)];

        let movement = first(&rows);
        assert!(!movement.moved());
        assert_eq!(movement.scroll_to, Some(0));

        let movement = last(&rows);
        assert!(!movement.moved());
        assert_eq!(movement.scroll_to, Some(1));

        assert!(!next(&rows, None, 1).moved());
        assert!(!previous(&rows, None, 1).moved());
    }

    #[test]
    fn test_empty_rows() {
        assert_eq!(first(&[]), Movement::default());
        assert_eq!(last(&[]), Movement::default());
    }

    #[test]
    fn test_next_skips_header() {
        let rows = create_test_rows();
        assert_eq!(next(&rows, Some(2), 1).target, Some(4));
        assert_eq!(previous(&rows, Some(4), 1).target, Some(2));
    }

    #[test]
    fn test_next_without_selection_is_first() {
        let rows = create_test_rows();
        assert_eq!(next(&rows, None, 5).target, Some(1));
        assert_eq!(previous(&rows, None, 5).target, Some(6));
    }

    #[test]
    fn test_headers_do_not_count_towards_n() {
        let rows = create_test_rows();
        // a -> b -> x -> y
        assert_eq!(next(&rows, Some(1), 3).target, Some(5));
    }

    #[test]
    fn test_page_stops_at_boundary() {
        let rows = create_test_rows();
        assert_eq!(next(&rows, Some(4), 5).target, Some(6));
        assert_eq!(previous(&rows, Some(4), 5).target, Some(1));
    }

    #[test]
    fn test_no_movement_at_boundary() {
        let rows = create_test_rows();

        let movement = next(&rows, Some(6), 1);
        assert!(!movement.moved());
        assert_eq!(movement.scroll_to, Some(6));

        let movement = previous(&rows, Some(1), 1);
        assert!(!movement.moved());
        assert_eq!(movement.scroll_to, Some(0));
    }
}
