//! Side-effect-free scanning. Matches are derived from scratch on every call.

use std::collections::HashMap;

use super::board::Board;
use super::types::{BOARD_SIZE, Gem, GemType, Match, MIN_MATCH_LENGTH, Position};

struct Run {
    gems: Vec<Gem>,
    gem_type: GemType,
    horizontal: bool,
}

/// Every connected match on the board. Runs sharing a cell are merged, so an
/// L, T or cross shape comes back as a single `Match`.
pub fn find_all_matches(board: &Board) -> Vec<Match> {
    merge_runs(find_runs(board))
}

fn find_runs(board: &Board) -> Vec<Run> {
    let mut runs = Vec::new();
    for row in 0..BOARD_SIZE {
        scan_line(board, (0..BOARD_SIZE).map(|col| Position::new(row, col)), true, &mut runs);
    }
    for col in 0..BOARD_SIZE {
        scan_line(board, (0..BOARD_SIZE).map(|row| Position::new(row, col)), false, &mut runs);
    }
    runs
}

fn scan_line(
    board: &Board,
    line: impl Iterator<Item = Position>,
    horizontal: bool,
    runs: &mut Vec<Run>,
) {
    let mut current: Vec<Gem> = Vec::with_capacity(BOARD_SIZE);

    // A trailing `None` acts as the "no gem" sentinel that flushes the last run.
    for cell in line.map(Some).chain(std::iter::once(None)) {
        let gem = cell.and_then(|pos| board.get(pos)).copied();
        let extends = matches!(
            (gem, current.last()),
            (Some(next), Some(last)) if next.gem_type == last.gem_type
        );

        if let (true, Some(next)) = (extends, gem) {
            current.push(next);
            continue;
        }

        if current.len() >= MIN_MATCH_LENGTH {
            let gem_type = current[0].gem_type;
            runs.push(Run {
                gems: std::mem::take(&mut current),
                gem_type,
                horizontal,
            });
        }
        current.clear();
        current.extend(gem);
    }
}

fn find_root(parents: &mut [usize], index: usize) -> usize {
    let mut root = index;
    while parents[root] != root {
        root = parents[root];
    }
    let mut node = index;
    while parents[node] != root {
        let next = parents[node];
        parents[node] = root;
        node = next;
    }
    root
}

fn merge_runs(runs: Vec<Run>) -> Vec<Match> {
    let mut parents: Vec<usize> = (0..runs.len()).collect();
    let mut owner: HashMap<Position, usize> = HashMap::new();

    for (index, run) in runs.iter().enumerate() {
        for gem in &run.gems {
            match owner.get(&gem.position) {
                Some(&other) => {
                    let a = find_root(&mut parents, index);
                    let b = find_root(&mut parents, other);
                    if a != b {
                        parents[a.max(b)] = a.min(b);
                    }
                }
                None => {
                    owner.insert(gem.position, index);
                }
            }
        }
    }

    // Groups keep the order of their first run; the first run supplies the type.
    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    let mut matches: Vec<Match> = Vec::new();

    for (index, run) in runs.into_iter().enumerate() {
        let root = find_root(&mut parents, index);
        let slot = *group_of_root.entry(root).or_insert_with(|| {
            matches.push(Match {
                gems: Vec::new(),
                gem_type: run.gem_type,
                length: 0,
                is_horizontal: false,
                is_vertical: false,
            });
            matches.len() - 1
        });

        let group = &mut matches[slot];
        group.is_horizontal |= run.horizontal;
        group.is_vertical |= !run.horizontal;
        for gem in run.gems {
            if !group.contains(gem.position) {
                group.gems.push(gem);
            }
        }
        group.length = group.gems.len();
    }

    matches
}

/// Every adjacent pair, horizontal pairs first, then vertical, row-major.
fn adjacent_pairs() -> impl Iterator<Item = (Position, Position)> {
    let horizontal = (0..BOARD_SIZE).flat_map(|row| {
        (0..BOARD_SIZE - 1).map(move |col| (Position::new(row, col), Position::new(row, col + 1)))
    });
    let vertical = (0..BOARD_SIZE - 1).flat_map(|row| {
        (0..BOARD_SIZE).map(move |col| (Position::new(row, col), Position::new(row + 1, col)))
    });
    horizontal.chain(vertical)
}

fn swap_matches(scratch: &mut Board, a: Position, b: Position) -> bool {
    if scratch.is_empty_at(a) || scratch.is_empty_at(b) {
        return false;
    }
    scratch.swap(a, b);
    let found = !find_all_matches(scratch).is_empty();
    scratch.swap(a, b);
    found
}

pub fn has_valid_moves(board: &Board) -> bool {
    let mut scratch = board.clone();
    adjacent_pairs().any(|(a, b)| swap_matches(&mut scratch, a, b))
}

/// All swaps that would produce at least one match, in scan order.
pub fn find_valid_swaps(board: &Board) -> Vec<(Position, Position)> {
    let mut scratch = board.clone();
    adjacent_pairs()
        .filter(|&(a, b)| swap_matches(&mut scratch, a, b))
        .collect()
}

pub fn would_create_match(board: &Board, p1: Position, p2: Position) -> bool {
    let mut scratch = board.clone();
    scratch.swap(p1, p2);
    !find_all_matches(&scratch).is_empty()
}

pub fn find_match_at(board: &Board, position: Position) -> Option<Match> {
    find_all_matches(board)
        .into_iter()
        .find(|m| m.contains(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::session_rng::SessionRng;

    #[rustfmt::skip]
    const QUIET: [&str; 8] = [
        "01230123",
        "12301230",
        "23012301",
        "30123012",
        "01230123",
        "12301230",
        "23012301",
        "30123012",
    ];

    fn quiet_with(overrides: &[(usize, usize, char)]) -> Board {
        let mut rows: Vec<Vec<char>> = QUIET.iter().map(|r| r.chars().collect()).collect();
        for &(row, col, c) in overrides {
            rows[row][col] = c;
        }
        let strings: Vec<String> = rows.into_iter().map(|r| r.into_iter().collect()).collect();
        let refs: Vec<&str> = strings.iter().map(|s| s.as_str()).collect();
        Board::from_rows(&refs)
    }

    #[test]
    fn test_quiet_board_has_no_matches() {
        let board = quiet_with(&[]);
        assert!(find_all_matches(&board).is_empty());
    }

    #[test]
    fn test_two_in_a_row_is_not_a_match() {
        let board = quiet_with(&[(0, 0, '5'), (0, 1, '5')]);
        assert!(find_all_matches(&board).is_empty());
    }

    #[test]
    fn test_horizontal_three_at_row_end_is_flushed() {
        let board = quiet_with(&[(2, 5, '5'), (2, 6, '5'), (2, 7, '5')]);
        let matches = find_all_matches(&board);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].length, 3);
        assert!(matches[0].is_horizontal);
        assert!(!matches[0].is_vertical);
        assert_eq!(matches[0].gem_type, GemType::Bracelet);
    }

    #[test]
    fn test_vertical_four_is_one_match() {
        let board = quiet_with(&[(1, 3, '6'), (2, 3, '6'), (3, 3, '6'), (4, 3, '6')]);
        let matches = find_all_matches(&board);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].length, 4);
        assert!(matches[0].is_vertical);
    }

    #[test]
    fn test_l_shape_merges_into_one_match() {
        let board = quiet_with(&[
            (5, 0, '5'),
            (5, 1, '5'),
            (5, 2, '5'),
            (6, 0, '5'),
            (7, 0, '5'),
        ]);
        let matches = find_all_matches(&board);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].gems.len(), 5);
        assert_eq!(matches[0].length, 5);
        assert!(matches[0].is_horizontal && matches[0].is_vertical);
    }

    #[test]
    fn test_t_shape_merges_into_one_match() {
        let board = quiet_with(&[
            (2, 2, '4'),
            (2, 3, '4'),
            (2, 4, '4'),
            (3, 3, '4'),
            (4, 3, '4'),
        ]);
        let matches = find_all_matches(&board);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].length, 5);
        assert!(matches[0].is_horizontal && matches[0].is_vertical);
    }

    #[test]
    fn test_separate_runs_stay_separate() {
        let board = quiet_with(&[
            (0, 0, '5'),
            (0, 1, '5'),
            (0, 2, '5'),
            (7, 5, '6'),
            (7, 6, '6'),
            (7, 7, '6'),
        ]);
        let matches = find_all_matches(&board);

        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.length == 3));
    }

    #[test]
    fn test_would_create_match_leaves_board_untouched() {
        let board = quiet_with(&[(0, 0, '5'), (0, 1, '5'), (1, 2, '5')]);
        let before = board.to_array();

        assert!(would_create_match(&board, Position::new(0, 2), Position::new(1, 2)));
        assert!(!would_create_match(&board, Position::new(4, 4), Position::new(4, 5)));
        assert_eq!(board.to_array(), before);
    }

    #[test]
    fn test_find_match_at() {
        let board = quiet_with(&[(3, 1, '6'), (3, 2, '6'), (3, 3, '6')]);

        let found = find_match_at(&board, Position::new(3, 2)).unwrap();
        assert_eq!(found.gem_type, GemType::Earring);
        assert!(find_match_at(&board, Position::new(0, 0)).is_none());
    }

    #[test]
    fn test_quiet_board_has_no_valid_moves() {
        let board = quiet_with(&[]);
        assert!(!has_valid_moves(&board));
        assert!(find_valid_swaps(&board).is_empty());
    }

    #[test]
    fn test_has_valid_moves_finds_setup() {
        let board = quiet_with(&[(0, 0, '5'), (0, 1, '5'), (1, 2, '5')]);

        assert!(has_valid_moves(&board));
        assert!(find_valid_swaps(&board).contains(&(Position::new(0, 2), Position::new(1, 2))));
    }

    #[test]
    fn test_fuzz_valid_swaps_agree_with_would_create_match() {
        for seed in 0..50u64 {
            let mut rng = SessionRng::new(seed);
            let board = Board::generate(&mut rng);

            let swaps = find_valid_swaps(&board);
            assert_eq!(has_valid_moves(&board), !swaps.is_empty(), "Seed {}", seed);
            for (a, b) in swaps {
                assert!(would_create_match(&board, a, b), "Seed {}: {} <-> {}", seed, a, b);
            }
        }
    }
}
