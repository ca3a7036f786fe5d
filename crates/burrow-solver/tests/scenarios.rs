//! End-to-end runs on full puzzle inputs.

use burrow_solver::{
    solve, solve_board, solve_with, Board, Cell, Layout, SearchConfig, SolveError, Termination,
    VisitPolicy, UNFOLD_ROWS,
};

const BURROW: &str = include_str!("data/burrow.txt");
const DEADLOCK: &str = include_str!("data/deadlock.txt");

fn unfolded_board() -> Board {
    let layout = Layout::parse(BURROW).unwrap().unfolded(&UNFOLD_ROWS).unwrap();
    Board::from_layout(&layout).unwrap()
}

#[test]
fn test_two_deep_burrow() {
    assert_eq!(solve(BURROW), Ok(15412));
}

#[test]
fn test_four_deep_burrow() {
    let board = unfolded_board();
    assert_eq!(board.depth(), 4);
    assert_eq!(
        board.to_string(),
        "...........\n##B#B#D#A##\n##D#C#B#A##\n##D#B#A#C##\n##D#C#A#C##"
    );
    let solution = solve_board(board, &SearchConfig::default()).unwrap();
    assert_eq!(solution.cost, 52358);
}

#[test]
fn test_interior_form_matches_diagram() {
    let interior = "...........\n##B#B#D#A##\n##D#C#A#C##";
    assert_eq!(
        Board::parse(interior).unwrap().canonical_key(),
        Board::parse(BURROW).unwrap().canonical_key()
    );
    assert_eq!(solve(interior), Ok(15412));
}

#[test]
fn test_repeat_runs_agree() {
    let config = SearchConfig::default();
    let first = solve_with(BURROW, &config).unwrap();
    let second = solve_with(BURROW, &config).unwrap();
    assert_eq!(first.cost, second.cost);
    assert_eq!(first.moves, second.moves);
    assert_eq!(first.stats.expansions, second.stats.expansions);
}

#[test]
fn test_winning_moves_replay_to_sorted_board() {
    let solution = solve_with(BURROW, &SearchConfig::default()).unwrap();
    let mut board = Board::parse(BURROW).unwrap();
    let mut total = 0;

    for step in &solution.moves {
        let Cell::Occupied(id) = board.cell_at(step.from) else {
            panic!("no token at {}", step.from);
        };
        let token = board.token(id);
        assert_eq!(token.class, step.class);
        assert!(token.legal_destinations(&board).contains(&step.to));
        assert_eq!(token.move_cost(step.to), step.cost);

        total += step.cost;
        board.apply_move(id, step.to);
    }

    assert!(board.is_solved());
    assert_eq!(total, solution.cost);
}

#[test]
fn test_first_seen_policy_is_never_cheaper() {
    let config = SearchConfig {
        policy: VisitPolicy::FirstSeen,
        ..Default::default()
    };
    let approximate = solve_with(BURROW, &config).unwrap();
    assert!(approximate.cost >= 15412);
}

#[test]
fn test_deadlock_reports_unsolvable() {
    assert!(matches!(
        solve(DEADLOCK),
        Err(SolveError::Unsolvable { .. })
    ));
}

#[test]
fn test_expansion_cap_reports_budget() {
    let config = SearchConfig {
        max_expansions: Some(500),
        ..Default::default()
    };
    match solve_with(BURROW, &config) {
        Err(SolveError::BudgetExhausted {
            termination,
            expansions,
            ..
        }) => {
            assert_eq!(termination, Termination::ExpansionCap);
            assert_eq!(expansions, 500);
        }
        other => panic!("expected budget exhaustion, got {other:?}"),
    }
}
