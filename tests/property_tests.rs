//! Property tests.
//!
//! Random play must never break the board:
//! - Live players' tiles always partition the grid
//! - Every duel ends with a distinct winner holding time on the clock
//! - A best-of-3 ends after at most three rounds, at exactly two wins
//! - Games terminate with one champion owning every tile

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use tile_duel::{
    BattleResult, BoardController, CategoryCatalog, GameConfig, GameEvent, GameRng, Mode, Player,
    PlayerId, PlayerMap, SeriesManager, SeriesVerdict, Side, TileKey,
};

fn headless(seed: u64, size: i64, max_ms: u64) -> BoardController {
    BoardController::headless(
        GameConfig::new()
            .with_grid_size(size)
            .with_seed(seed)
            .with_max_timer(Duration::from_millis(max_ms)),
    )
}

/// Capture duel results as they are published.
fn record_results(board: &mut BoardController) -> Rc<RefCell<Vec<BattleResult>>> {
    let results = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&results);
    board.subscribe(move |event| {
        if let GameEvent::BattleResolved(result) = event {
            sink.borrow_mut().push(result.clone());
        }
    });
    results
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_random_play_keeps_partition_and_terminates(
        seed in any::<u64>(),
        size in 2i64..=4,
        choices in prop::collection::vec((any::<bool>(), 0usize..4, any::<bool>()), 64),
    ) {
        let mut board = headless(seed, size, 500);
        let tile_count = (size * size) as usize;
        let mut steps = choices.into_iter().cycle();
        let mut duels = 0;

        while board.mode() != Mode::GameOver {
            prop_assert!(duels <= tile_count + 3, "too many duels");
            let (answer, pick, go_back) = steps.next().unwrap();
            match board.mode() {
                Mode::Idle => {
                    board.request_random_battle().unwrap();
                    board.advance(Duration::from_secs(7)).unwrap();
                }
                Mode::ChooseTarget => {
                    let targets = board.target_tiles().to_vec();
                    board.pick_target(targets[pick % targets.len()]).unwrap();
                    board.confirm_start().unwrap();
                }
                Mode::FinalReady => board.confirm_start().unwrap(),
                Mode::ChooseCategory if go_back => board.go_back().unwrap(),
                Mode::ChooseCategory => {
                    let choices = board.category_choices().to_vec();
                    board.choose_category(&choices[pick % choices.len()]).unwrap();
                    board.start_category_round().unwrap();
                }
                Mode::Battle => {
                    board.advance(board_countdown()).unwrap();
                    if answer {
                        board.correct_hotkey().unwrap();
                    }
                    board.advance(Duration::from_millis(500)).unwrap();
                    duels += 1;
                }
                Mode::GameOver => unreachable!(),
            }
            if board.mode() != Mode::Battle {
                prop_assert!(board.state().is_partitioned());
            }
        }

        let alive = board.state().alive_ids();
        prop_assert_eq!(alive.len(), 1);
        prop_assert_eq!(board.players()[alive[0]].territory(), tile_count);
        prop_assert_eq!(board.pending_timers(), 0);
    }

    #[test]
    fn prop_duel_resolves_with_distinct_winner(
        seed in any::<u64>(),
        max_ms in 250u64..3000,
        answers in prop::collection::vec((0u64..1500, any::<bool>()), 0..12),
    ) {
        let mut board = headless(seed, 3, max_ms);
        let results = record_results(&mut board);
        board.select_challenger(TileKey::new(1, 1)).unwrap();
        board.pick_target(TileKey::new(0, 1)).unwrap();
        board.confirm_start().unwrap();
        board.advance(board_countdown()).unwrap();

        for (delay, pass) in answers {
            if board.battle().is_none() {
                break;
            }
            board.advance(Duration::from_millis(delay)).unwrap();
            if board.battle().is_none() {
                break;
            }
            if pass {
                let _ = board.request_pass();
            } else {
                let _ = board.correct_hotkey();
            }
        }
        // Nobody answers from here on, so the active clock runs out.
        board.advance(Duration::from_millis(max_ms + 3000)).unwrap();

        let results = results.borrow();
        prop_assert_eq!(results.len(), 1);
        let result = &results[0];
        prop_assert_ne!(result.winner, result.loser);
        prop_assert!(result.winner_time_left > Duration::ZERO);
        prop_assert!(result.winner_time_left <= Duration::from_millis(max_ms));
        prop_assert!(board.battle().is_none());
    }

    #[test]
    fn prop_mark_correct_only_flips_active_side(
        seed in any::<u64>(),
        sides in prop::collection::vec(any::<bool>(), 1..20),
    ) {
        let mut board = headless(seed, 2, 60_000);
        board.select_challenger(TileKey::new(0, 0)).unwrap();
        board.pick_target(TileKey::new(1, 0)).unwrap();
        board.confirm_start().unwrap();
        board.advance(board_countdown()).unwrap();

        let mut expected = Side::Attacker;
        for attacker in sides {
            let side = if attacker { Side::Attacker } else { Side::Defender };
            let flipped = board.mark_correct(side).unwrap();
            prop_assert_eq!(flipped, side == expected);
            if flipped {
                expected = expected.other();
            }
            prop_assert_eq!(board.battle().unwrap().active, expected);
        }
    }

    #[test]
    fn prop_series_ends_at_two_wins(
        seed in any::<u64>(),
        winners in prop::collection::vec(any::<bool>(), 3),
    ) {
        let players: PlayerMap<Player> =
            PlayerMap::new(2, |id| Player::new(id, format!("Home {}", id.0), TileKey::new(0, id.0)));
        let pair = [PlayerId::new(0), PlayerId::new(1)];
        let catalog = CategoryCatalog::builtin();
        let mut rng = GameRng::new(seed);
        let mut series = SeriesManager::new();
        series.ensure_series(&pair, &mut rng);

        let mut rounds = 0;
        let mut champion = None;
        for first_wins in winners {
            let Some(plan) = series.next_round_plan(&players, &mut rng, &catalog) else { break };
            rounds += 1;
            let (winner, loser) = if first_wins { (plan.attacker, plan.defender) } else { (plan.defender, plan.attacker) };
            match series.handle_result(&players, winner, loser) {
                Some(SeriesVerdict::Champion { winner, .. }) => {
                    champion = Some(winner);
                    break;
                }
                Some(SeriesVerdict::Continue { .. }) => {
                    let scores = series.scores().unwrap();
                    prop_assert!(scores.iter().all(|(_, s)| *s < 2));
                }
                None => prop_assert!(false, "series lost track of its players"),
            }
        }

        prop_assert!(champion.is_some());
        prop_assert!(rounds == 2 || rounds == 3);
        prop_assert!(!series.is_active());
    }
}

fn board_countdown() -> Duration {
    GameConfig::new().countdown_total()
}
