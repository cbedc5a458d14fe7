//! Best-of-3 tests.
//!
//! A 2x2 board is reduced to two players, then the series is played out:
//! - Round 1 uses the defender's category with the challenger attacking
//! - Round 2 swaps roles and uses the challenger's category
//! - Round 3 avoids both home categories and every earlier round's category

use std::time::Duration;

use tile_duel::{
    BoardController, CategoryCatalog, CommandLog, GameConfig, GameError, GameEvent, Mode, PlayerId,
    Side, Stage, TileKey,
};

fn finish_duel(board: &mut BoardController<CommandLog>, attacker_wins: bool) {
    let countdown = board.config().countdown_total();
    let max = board.config().max_timer;
    board.advance(countdown).unwrap();
    if attacker_wins {
        board.mark_correct(Side::Attacker).unwrap();
    }
    board.advance(max).unwrap();
    assert!(board.battle().is_none());
}

/// Eliminate players 1 and 2 so that players 0 and 3 remain.
fn final_two(seed: u64) -> BoardController<CommandLog> {
    let config = GameConfig::new()
        .with_grid_size(2)
        .with_seed(seed)
        .with_max_timer(Duration::from_secs(1));
    let mut board = BoardController::new(config, CategoryCatalog::builtin(), CommandLog::new());

    for defender in [TileKey::new(0, 1), TileKey::new(1, 0)] {
        board.select_challenger(TileKey::new(0, 0)).unwrap();
        board.pick_target(defender).unwrap();
        board.confirm_start().unwrap();
        finish_duel(&mut board, true);
        if board.mode() == Mode::ChooseCategory {
            board.go_back().unwrap();
        }
    }

    assert_eq!(board.state().alive_ids(), vec![PlayerId::new(0), PlayerId::new(3)]);
    assert_eq!(board.mode(), Mode::Idle);
    assert!(board.series().is_active());
    board
}

fn category_of(board: &BoardController<CommandLog>, id: PlayerId) -> String {
    board.players()[id].category.clone()
}

#[test]
fn test_entering_final_two_announces_series() {
    let board = final_two(1);
    let (title, hint) = board.event_log().last_status().unwrap();
    assert!(title.ends_with("Best-of-3 begins for the final two."));
    assert_eq!(hint, "Next battle uses the defender's category.");
}

#[test]
fn test_round_categories_follow_stage_order() {
    let mut board = final_two(7);
    let (challenger, defender) = board.series().roles().unwrap();
    let homes = [category_of(&board, challenger), category_of(&board, defender)];

    // Round 1: challenger attacks on the defender's category.
    board.request_random_battle().unwrap();
    assert_eq!(board.mode(), Mode::FinalReady);
    let round = board.pending_round().unwrap().plan.clone();
    assert_eq!(round.stage, Stage::Defender);
    assert_eq!((round.attacker, round.defender), (challenger, defender));
    assert_eq!(round.category, homes[1]);
    board.confirm_start().unwrap();
    assert_eq!(board.battle().unwrap().category, homes[1]);
    finish_duel(&mut board, true);
    assert_eq!(board.mode(), Mode::Idle);
    assert_eq!(board.state().alive_count(), 2);

    // Round 2: roles swap, challenger's category; the defender of record
    // attacks and wins, levelling the score.
    board.request_random_battle().unwrap();
    let round = board.pending_round().unwrap().plan.clone();
    assert_eq!(round.stage, Stage::Challenger);
    assert_eq!((round.attacker, round.defender), (defender, challenger));
    assert_eq!(round.category, homes[0]);
    board.confirm_start().unwrap();
    finish_duel(&mut board, true);
    let (title, hint) = board.event_log().last_status().unwrap();
    assert!(title.ends_with("Series score 1-1."));
    assert!(hint.contains("random neutral"));

    // Round 3: neutral category.
    board.request_random_battle().unwrap();
    let round = board.pending_round().unwrap().plan.clone();
    assert_eq!(round.stage, Stage::Random);
    assert!(!homes.contains(&round.category));
    board.confirm_start().unwrap();
    finish_duel(&mut board, true);

    assert_eq!(board.mode(), Mode::GameOver);
    let alive = board.state().alive_ids();
    assert_eq!(alive, vec![round.attacker]);
    assert_eq!(board.players()[round.attacker].territory(), 4);
    assert!(!board.series().is_active());
    let (title, _) = board.event_log().last_status().unwrap();
    assert!(title.ends_with("wins the best-of-3 and the floor!"));
}

#[test]
fn test_two_straight_wins_end_series() {
    let mut board = final_two(3);
    let (challenger, defender) = board.series().roles().unwrap();

    board.request_random_battle().unwrap();
    board.confirm_start().unwrap();
    finish_duel(&mut board, true);
    let scores = board
        .event_log()
        .events()
        .iter()
        .rev()
        .find_map(|e| match e {
            GameEvent::SeriesScore { scores } => Some(*scores),
            _ => None,
        })
        .unwrap();
    assert!(scores.contains(&(challenger, 1)));
    assert!(scores.contains(&(defender, 0)));

    // Round 2: the defender of record attacks and loses again.
    board.request_random_battle().unwrap();
    board.confirm_start().unwrap();
    finish_duel(&mut board, false);

    assert_eq!(board.mode(), Mode::GameOver);
    assert_eq!(board.state().alive_ids(), vec![challenger]);
    assert!(!board.players()[defender].alive);
    assert!(board.state().is_partitioned());
}

#[test]
fn test_series_rounds_do_not_inherit_categories() {
    let mut board = final_two(9);
    let before: Vec<String> = [PlayerId::new(0), PlayerId::new(3)]
        .iter()
        .map(|id| category_of(&board, *id))
        .collect();

    board.request_random_battle().unwrap();
    board.confirm_start().unwrap();
    finish_duel(&mut board, false);

    let after: Vec<String> = [PlayerId::new(0), PlayerId::new(3)]
        .iter()
        .map(|id| category_of(&board, *id))
        .collect();
    assert_eq!(before, after);
    assert_eq!(board.state().alive_count(), 2);
}

#[test]
fn test_repeat_request_reannounces_pending_round() {
    let mut board = final_two(4);
    board.request_random_battle().unwrap();
    let first = board.pending_round().cloned().unwrap();

    board.request_random_battle().unwrap();
    assert_eq!(board.pending_round(), Some(&first));
    assert_eq!(board.series().stage(), Some(Stage::Challenger));
    assert!(board.is_start_enabled());
}

#[test]
fn test_direct_challenger_pick_is_rejected_during_series() {
    let mut board = final_two(2);
    let (challenger, defender) = board.series().roles().unwrap();
    let tile = *board.players()[challenger].tiles.iter().next().unwrap();

    assert!(matches!(
        board.select_challenger(tile),
        Err(GameError::IllegalTransition { action: "select_challenger", mode: Mode::Idle })
    ));
    assert_eq!(board.mode(), Mode::Idle);
    assert!(board.selected_challenger().is_none());
    assert_eq!(board.series().stage(), Some(Stage::Defender));

    // The series still opens with the defender-category round.
    board.request_random_battle().unwrap();
    let round = board.pending_round().unwrap().plan.clone();
    assert_eq!(round.stage, Stage::Defender);
    assert_eq!((round.attacker, round.defender), (challenger, defender));
}
