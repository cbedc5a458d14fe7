//! The top-level game state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::state::BoardState;
use crate::battle::{BattleClock, BattleResult, BattleSession, Contestant, Side};
use crate::catalog::{CategoryCatalog, ImageRotation};
use crate::context::TurnContext;
use crate::core::{GameConfig, GameError, GameRng, Mode, Player, PlayerId, PlayerMap, Tile, TileKey};
use crate::events::{EventLog, GameEvent, Observers, SubscriptionId};
use crate::overlay::CategoryOverlay;
use crate::render::{HighlightStyle, NullRenderer, Renderer};
use crate::schedule::{Alarm, Scheduler};
use crate::selector::RandomSelector;
use crate::series::{RoundPlan, SeriesManager, SeriesVerdict};

/// Collaborators lent to sub-state-machines through a `TurnContext`.
#[derive(Debug)]
struct Services<R> {
    scheduler: Scheduler,
    renderer: R,
    rng: GameRng,
    catalog: CategoryCatalog,
    outbox: Vec<GameEvent>,
}

impl<R: Renderer> Services<R> {
    fn ctx(&mut self) -> TurnContext<'_> {
        TurnContext {
            scheduler: &mut self.scheduler,
            renderer: &mut self.renderer,
            rng: &mut self.rng,
            catalog: &self.catalog,
            outbox: &mut self.outbox,
        }
    }

    fn status(&mut self, title: impl Into<String>, hint: impl Into<String>) {
        self.outbox.push(GameEvent::status(title, hint));
    }
}

/// A planned best-of-3 round waiting for confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRound {
    pub attacker_tile: TileKey,
    pub defender_tile: TileKey,
    pub plan: RoundPlan,
}

#[derive(Clone, Debug, Default)]
struct Selection {
    challenger: Option<TileKey>,
    targets: SmallVec<[TileKey; 4]>,
    pending: Option<(TileKey, TileKey)>,
    final_round: Option<PendingRound>,
}

/// Owned, read-only copy of the board for display and persistence layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub mode: Mode,
    pub grid_size: u8,
    pub tiles: im::Vector<Tile>,
    pub players: im::Vector<Player>,
    pub battle: Option<BattleSession>,
    pub series_scores: Option<[(PlayerId, u8); 2]>,
    pub category_choices: Vec<String>,
    pub start_enabled: bool,
    pub now_ms: u64,
}

/// Runs one game from deal to champion.
///
/// All input arrives through the public methods and all time through
/// [`BoardController::advance`]. Every method returns `Err` without touching
/// state when the request does not fit the current mode.
///
/// ```
/// use std::time::Duration;
/// use tile_duel::{BoardController, GameConfig, Mode};
///
/// let mut board = BoardController::headless(GameConfig::new().with_seed(3));
/// board.request_random_battle().unwrap();
/// board.advance(Duration::from_secs(10)).unwrap();
/// assert_eq!(board.mode(), Mode::ChooseTarget);
/// ```
#[derive(Debug)]
pub struct BoardController<R: Renderer = NullRenderer> {
    config: GameConfig,
    services: Services<R>,
    state: BoardState,
    mode: Mode,
    battle: BattleClock,
    series: SeriesManager,
    selector: RandomSelector,
    overlay: CategoryOverlay,
    selection: Selection,
    start_enabled: bool,
    torn_down: bool,
    observers: Observers,
    log: EventLog,
}

impl BoardController<NullRenderer> {
    /// A board with the built-in catalog and no renderer.
    #[must_use]
    pub fn headless(config: GameConfig) -> Self {
        Self::new(config, CategoryCatalog::builtin(), NullRenderer)
    }
}

impl<R: Renderer> BoardController<R> {
    /// Deal a fresh board.
    pub fn new(config: GameConfig, catalog: CategoryCatalog, renderer: R) -> Self {
        let mut config = config;
        config.grid_size = GameConfig::clamp_grid_size(i64::from(config.grid_size));

        let mut rng = GameRng::new(config.seed);
        let state = BoardState::new(config.grid_size, &catalog, &mut rng);
        let battle = BattleClock::new(&config, ImageRotation::new(rng.for_context("images")));
        let selector = RandomSelector::new(&config);

        let mut board = Self {
            config,
            services: Services {
                scheduler: Scheduler::new(),
                renderer,
                rng,
                catalog,
                outbox: Vec::new(),
            },
            state,
            mode: Mode::Idle,
            battle,
            series: SeriesManager::new(),
            selector,
            overlay: CategoryOverlay::new(),
            selection: Selection::default(),
            start_enabled: false,
            torn_down: false,
            observers: Observers::new(),
            log: EventLog::default(),
        };
        board.announce_fresh_board();
        board
    }

    fn announce_fresh_board(&mut self) {
        info!(
            grid_size = self.config.grid_size,
            players = self.state.players().player_count(),
            "board dealt"
        );
        for tile in self.state.grid().keys() {
            self.paint_tile(tile);
        }
        self.services.outbox.push(GameEvent::CategoryFocus { category: None });
        self.services.status("Click the Randomizer button to pick a challenger.", "Ready");
        self.flush();
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Throw the current game away and deal a new board.
    ///
    /// `grid_size` is clamped into the supported range. Subscriptions and the
    /// event log survive; everything else starts over.
    pub fn reset(&mut self, grid_size: i64) {
        self.shut_down_activity();
        self.config.grid_size = GameConfig::clamp_grid_size(grid_size);

        self.state = BoardState::new(self.config.grid_size, &self.services.catalog, &mut self.services.rng);
        let images = ImageRotation::new(self.services.rng.for_context("images"));
        self.battle = BattleClock::new(&self.config, images);
        self.selector = RandomSelector::new(&self.config);
        self.series.reset();
        self.overlay.hide();
        self.selection = Selection::default();
        self.mode = Mode::Idle;
        self.set_start_enabled(false);
        self.torn_down = false;

        self.announce_fresh_board();
    }

    /// Tear the board down. Every pending timer is cancelled without firing;
    /// a running duel ends with no winner. Only [`reset`](Self::reset) is
    /// accepted afterwards.
    pub fn destroy(&mut self) {
        if self.torn_down {
            return;
        }
        self.shut_down_activity();
        self.torn_down = true;
        info!("board torn down");
        self.flush();
    }

    fn shut_down_activity(&mut self) {
        let mut ctx = self.services.ctx();
        self.battle.cancel(&mut ctx);
        self.selector.stop(&mut ctx);
        ctx.renderer.clear_highlights();
        self.services.scheduler.cancel_all();
        self.overlay.hide();
        self.selection = Selection::default();
    }

    /// Run simulated time forward by `dt`, firing every alarm that falls due.
    pub fn advance(&mut self, dt: Duration) -> Result<(), GameError> {
        self.ensure_live()?;
        let until = self.services.scheduler.now() + dt;
        while let Some((_, alarm)) = self.services.scheduler.pop_due(until) {
            self.route(alarm);
        }
        self.services.scheduler.advance_to(until);
        self.flush();
        Ok(())
    }

    fn route(&mut self, alarm: Alarm) {
        match alarm {
            Alarm::SelectorStep => {
                if let Some(key) = self.selector.on_step(&mut self.services.ctx()) {
                    self.complete_random_selection(key);
                }
            }
            Alarm::CountdownStep(_)
            | Alarm::CountdownFinished
            | Alarm::ClockTick
            | Alarm::PassCooldownEnded => {
                if let Some(result) = self.battle.on_alarm(&mut self.services.ctx(), alarm) {
                    self.handle_outcome(result);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Ask for a random battle.
    ///
    /// With more than two players alive this starts the randomizer spin,
    /// which lands on a challenger later. With exactly two it prepares the
    /// next best-of-3 round instead.
    pub fn request_random_battle(&mut self) -> Result<(), GameError> {
        let outcome = self.try_random_battle();
        self.finish(outcome)
    }

    fn try_random_battle(&mut self) -> Result<(), GameError> {
        self.ensure_live()?;
        if self.battle.is_active() || self.selector.is_running() {
            return Err(self.illegal("request_random_battle"));
        }
        if !matches!(self.mode, Mode::Idle | Mode::FinalReady) {
            return Err(self.illegal("request_random_battle"));
        }

        let alive = self.state.alive_ids();
        self.series.ensure_series(&alive, &mut self.services.rng);
        if alive.len() == 2 && self.series.is_active() {
            return self.prepare_final_round();
        }

        let candidates = self.state.candidates();
        let Some(final_key) = self.services.rng.choose(&candidates).copied() else {
            self.services.status("No available tiles with neighbors to battle.", "Add more players or reset.");
            return Err(GameError::NoEligibleTarget("no tile borders a live enemy".into()));
        };

        debug!(candidates = candidates.len(), %final_key, "random challenger spin");
        self.selector.start(&mut self.services.ctx(), candidates, final_key);
        Ok(())
    }

    /// Pick the challenger tile directly, skipping the spin.
    ///
    /// Not available once the best-of-3 is under way: those rounds are
    /// planned by [`request_random_battle`](Self::request_random_battle).
    pub fn select_challenger(&mut self, key: TileKey) -> Result<(), GameError> {
        let outcome = self.try_select_challenger(key);
        self.finish(outcome)
    }

    fn try_select_challenger(&mut self, key: TileKey) -> Result<(), GameError> {
        self.ensure_live()?;
        if self.mode != Mode::Idle || self.selector.is_running() || self.battle.is_active() {
            return Err(self.illegal("select_challenger"));
        }
        // Final-two rounds only start from the series plan.
        if self.series.is_active() && self.state.alive_count() == 2 {
            return Err(self.illegal("select_challenger"));
        }
        let owner = self.state.owner_of(key).ok_or(GameError::UnknownTile(key))?;
        if !owner.alive || self.state.enemy_neighbors(key).is_empty() {
            return Err(GameError::NoEligibleTarget(format!("tile {key} borders no live enemy")));
        }
        self.enter_choose_target(key);
        Ok(())
    }

    fn pick_random_candidate(&mut self) -> Option<TileKey> {
        let candidates = self.state.candidates();
        self.services.rng.choose(&candidates).copied()
    }

    fn complete_random_selection(&mut self, key: TileKey) {
        if self.state.owner_of(key).is_some_and(|p| p.alive) {
            self.enter_choose_target(key);
            return;
        }

        match self.pick_random_candidate() {
            Some(retry) if retry != key => {
                debug!(landed = %key, %retry, "spin landed on a stale tile, redrawing");
                self.enter_choose_target(retry);
            }
            _ => self.services.status("No valid challenger found.", "Try Random Battle again."),
        }
    }

    fn enter_choose_target(&mut self, key: TileKey) {
        let Some(owner) = self.state.owner_of(key) else { return };
        let title = format!("{} is up!", owner.name);
        let hint = format!(
            "Click an adjacent enemy tile to challenge. Category will use defender's ({}) or challenger's choice.",
            owner.category
        );

        self.mode = Mode::ChooseTarget;
        self.selection.challenger = Some(key);
        self.selection.pending = None;
        self.selection.targets = self.state.enemy_neighbors(key);
        self.set_start_enabled(false);
        self.repaint_highlights();
        self.services.status(title, hint);
    }

    fn repaint_highlights(&mut self) {
        let renderer = &mut self.services.renderer;
        renderer.clear_highlights();
        if let Some(challenger) = self.selection.challenger {
            renderer.highlight_tile(challenger, HighlightStyle::Selected);
        }
        for &target in &self.selection.targets {
            renderer.highlight_tile(target, HighlightStyle::Target);
        }
        if let Some((_, defender)) = self.selection.pending {
            renderer.highlight_tile(defender, HighlightStyle::PendingDefender);
        }
    }

    /// Lock onto an enemy tile bordering the selected challenger.
    pub fn pick_target(&mut self, key: TileKey) -> Result<(), GameError> {
        let outcome = self.try_pick_target(key);
        self.finish(outcome)
    }

    fn try_pick_target(&mut self, key: TileKey) -> Result<(), GameError> {
        self.ensure_live()?;
        let Some(selected) = self.selection.challenger.filter(|_| self.mode == Mode::ChooseTarget) else {
            return Err(self.illegal("pick_target"));
        };
        if self.state.tile(key).is_none() {
            return Err(GameError::UnknownTile(key));
        }
        if !self.selection.targets.contains(&key) {
            return Err(if self.state.grid().are_adjacent(selected, key) {
                GameError::NotAnEnemy(key)
            } else {
                GameError::NotAdjacent { selected, target: key }
            });
        }

        self.selection.pending = Some((selected, key));
        self.set_start_enabled(true);
        self.repaint_highlights();

        let name = |k: TileKey| self.state.owner_of(k).map(|p| p.name.clone()).unwrap_or_default();
        let (attacker, defender) = (name(selected), name(key));
        self.services.status(
            format!("{attacker} locked on {defender}."),
            "Press Start Battle. Challenger's clock starts first; defender waits until challenger answers correctly.",
        );
        Ok(())
    }

    /// Start the armed battle: the locked-on pair, or the planned series round.
    pub fn confirm_start(&mut self) -> Result<(), GameError> {
        let outcome = self.try_confirm_start();
        self.finish(outcome)
    }

    fn try_confirm_start(&mut self) -> Result<(), GameError> {
        self.ensure_live()?;
        match self.mode {
            Mode::ChooseTarget if self.start_enabled => {
                let (attacker, defender) = self.selection.pending.ok_or(GameError::NoSelection)?;
                self.begin_battle(attacker, defender, None)
            }
            Mode::FinalReady => {
                let round = self.selection.final_round.take().ok_or(GameError::NoSelection)?;
                self.begin_battle(round.attacker_tile, round.defender_tile, Some(round.plan.category))
            }
            _ => Err(self.illegal("confirm_start")),
        }
    }

    // ------------------------------------------------------------------
    // Category choice
    // ------------------------------------------------------------------

    /// Arm one of the offered bordering categories.
    pub fn choose_category(&mut self, category: &str) -> Result<(), GameError> {
        let outcome = self.try_choose_category(category);
        self.finish(outcome)
    }

    fn try_choose_category(&mut self, category: &str) -> Result<(), GameError> {
        self.ensure_live()?;
        if self.mode != Mode::ChooseCategory {
            return Err(self.illegal("choose_category"));
        }
        self.overlay.select(category)?;

        let winner = self.overlay.winner().and_then(|id| self.state.player(id));
        let name = winner.map(|p| p.name.clone()).unwrap_or_default();
        let armed = self.overlay.can_start();
        self.set_start_enabled(armed);
        self.services.status(
            format!("{name} selected \"{category}\"."),
            "Press Start Battle to continue or go back to the floor.",
        );
        Ok(())
    }

    /// Fight for the armed category straight away.
    pub fn start_category_round(&mut self) -> Result<(), GameError> {
        let outcome = self.try_start_category_round();
        self.finish(outcome)
    }

    fn try_start_category_round(&mut self) -> Result<(), GameError> {
        self.ensure_live()?;
        if self.mode != Mode::ChooseCategory {
            return Err(self.illegal("start_category_round"));
        }
        let (Some(winner), Some(category)) = (self.overlay.winner(), self.overlay.selected()) else {
            return Err(GameError::NoSelection);
        };
        let category = category.to_string();

        let Some((attacker, defender)) = self.state.find_pair_for_category(winner, &category) else {
            self.services.status(
                "No adjacent tile with that category.",
                "Pick another category or go back to the floor.",
            );
            return Err(GameError::NoEligibleTarget(format!("no bordering tile holds `{category}`")));
        };

        self.overlay.hide();
        self.begin_battle(attacker, defender, Some(category))
    }

    /// Leave the category choice and return to the floor.
    pub fn go_back(&mut self) -> Result<(), GameError> {
        let outcome = self.try_go_back();
        self.finish(outcome)
    }

    fn try_go_back(&mut self) -> Result<(), GameError> {
        self.ensure_live()?;
        if self.mode != Mode::ChooseCategory {
            return Err(self.illegal("go_back"));
        }
        self.overlay.hide();
        self.mode = Mode::Idle;
        self.set_start_enabled(false);
        self.services.status("Pick a new challenger.", "Click Random Battle to select another player.");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Duel input
    // ------------------------------------------------------------------

    /// A contestant answered correctly. `Ok(false)` means the side was
    /// already waiting and nothing changed.
    pub fn mark_correct(&mut self, side: Side) -> Result<bool, GameError> {
        let outcome = self
            .ensure_live()
            .and_then(|()| self.battle.mark_correct(&mut self.services.ctx(), side));
        self.finish(outcome)
    }

    /// Mark whichever side is answering as correct.
    pub fn correct_hotkey(&mut self) -> Result<bool, GameError> {
        let outcome = self
            .ensure_live()
            .and_then(|()| self.battle.correct_hotkey(&mut self.services.ctx()));
        self.finish(outcome)
    }

    /// Skip the current prompt. Both answer controls lock for the pass cooldown.
    pub fn request_pass(&mut self) -> Result<(), GameError> {
        let outcome = self
            .ensure_live()
            .and_then(|()| self.battle.request_pass(&mut self.services.ctx()));
        self.finish(outcome)
    }

    /// Hotkey alias for [`request_pass`](Self::request_pass).
    pub fn pass_hotkey(&mut self) -> Result<(), GameError> {
        self.request_pass()
    }

    // ------------------------------------------------------------------
    // Randomizer controls
    // ------------------------------------------------------------------

    /// Stop the spin and its music cue without picking anyone.
    pub fn stop_randomizer(&mut self) -> Result<(), GameError> {
        self.ensure_live()?;
        self.selector.stop(&mut self.services.ctx());
        self.flush();
        Ok(())
    }

    /// Report the real length of the spin's music cue.
    pub fn set_selector_cue_length(&mut self, cue_length: Duration) {
        self.selector.set_cue_length(cue_length);
    }

    // ------------------------------------------------------------------
    // Battles and outcomes
    // ------------------------------------------------------------------

    fn begin_battle(
        &mut self,
        attacker_tile: TileKey,
        defender_tile: TileKey,
        forced_category: Option<String>,
    ) -> Result<(), GameError> {
        let contestant = |p: &Player| Contestant { id: p.id, name: p.name.clone() };
        let attacker = self.state.owner_of(attacker_tile).ok_or(GameError::UnknownTile(attacker_tile))?;
        let defender = self.state.owner_of(defender_tile).ok_or(GameError::UnknownTile(defender_tile))?;
        let category = forced_category.unwrap_or_else(|| defender.category.clone());
        let (attacker, defender) = (contestant(attacker), contestant(defender));

        self.selector.halt(&mut self.services.ctx());
        let alive = self.state.alive_ids();
        self.series.ensure_series(&alive, &mut self.services.rng);

        self.mode = Mode::Battle;
        self.selection = Selection::default();
        self.services.renderer.clear_highlights();
        self.set_start_enabled(false);
        self.state.mark_battled(attacker_tile, defender_tile);

        self.battle.start_duel(
            &mut self.services.ctx(),
            attacker,
            defender,
            (attacker_tile, defender_tile),
            &category,
        );
        Ok(())
    }

    fn handle_outcome(&mut self, result: BattleResult) {
        let (winner, loser) = (result.winner, result.loser);
        self.selection = Selection::default();

        if self.series.is_active() && self.state.alive_count() == 2 {
            match self.series.handle_result(self.state.players(), winner, loser) {
                Some(SeriesVerdict::Champion { winner, loser, status, hint }) => {
                    self.transfer(loser, winner);
                    self.services.status(status, hint);
                    self.finish_game(winner);
                    return;
                }
                Some(SeriesVerdict::Continue { status, hint }) => {
                    self.mode = Mode::Idle;
                    if let Some(scores) = self.series.scores() {
                        self.services.outbox.push(GameEvent::SeriesScore { scores });
                    }
                    self.services.status(status, hint);
                    return;
                }
                None => {}
            }
        }

        let loser_category = self.state.player(loser).map(|p| p.category.clone());
        self.transfer(loser, winner);

        if !result.winner_was_attacker {
            if let Some(category) = loser_category {
                info!(%winner, category = %category, "defender inherits challenger's category");
                self.state.set_category(winner, category);
                let tiles: Vec<TileKey> =
                    self.state.player(winner).map(|p| p.tiles.iter().copied().collect()).unwrap_or_default();
                for key in tiles {
                    self.paint_tile(key);
                }
            }
        }

        let name = |id: PlayerId, state: &BoardState| state.player(id).map(|p| p.name.clone()).unwrap_or_default();
        let (winner_name, loser_name) = (name(winner, &self.state), name(loser, &self.state));
        let alive = self.state.alive_ids();

        match alive.len() {
            1 => {
                self.series.reset();
                self.services.status(format!("{winner_name} wins the floor!"), "Reset the scene to play again.");
                self.finish_game(winner);
            }
            2 => {
                self.series.ensure_series(&alive, &mut self.services.rng);
                self.mode = Mode::Idle;
                self.services.status(
                    format!("{winner_name} wins and eliminates {loser_name}. Best-of-3 begins for the final two."),
                    "Next battle uses the defender's category.",
                );
            }
            _ => self.present_category_choice(winner, &winner_name),
        }
    }

    fn transfer(&mut self, loser: PlayerId, winner: PlayerId) {
        for key in self.state.eliminate(loser, winner) {
            self.paint_tile(key);
        }
    }

    fn finish_game(&mut self, winner: PlayerId) {
        self.mode = Mode::GameOver;
        self.set_start_enabled(false);
        self.services.outbox.push(GameEvent::CategoryFocus { category: None });
        self.services.outbox.push(GameEvent::GameOver { winner });
        info!(%winner, "game over");
    }

    fn present_category_choice(&mut self, winner: PlayerId, winner_name: &str) {
        self.overlay.show(&self.state, winner);
        if self.overlay.is_empty() {
            self.overlay.hide();
            self.mode = Mode::Idle;
            self.services.status(
                format!("{winner_name} won!"),
                "No bordering categories to claim. Pick a new challenger with Random Battle.",
            );
            return;
        }

        self.mode = Mode::ChooseCategory;
        self.services.status(
            format!("{winner_name} won! Pick a bordering enemy category or go back to the floor."),
            "Choose a category, then press Start Battle.",
        );
    }

    fn prepare_final_round(&mut self) -> Result<(), GameError> {
        if self.mode == Mode::FinalReady {
            if let Some(round) = self.selection.final_round.clone() {
                self.announce_final_round(&round.plan);
                return Ok(());
            }
        }

        let Some(plan) =
            self.series
                .next_round_plan(self.state.players(), &mut self.services.rng, &self.services.catalog)
        else {
            self.services.status("Could not start final series round.", "Try again.");
            return Err(GameError::NoEligibleTarget("no series round available".into()));
        };

        let Some((attacker_tile, defender_tile)) = self.state.find_adjacent_pair(plan.attacker, plan.defender)
        else {
            self.services.status("No adjacent tiles for the finalists.", "Try again or reset.");
            return Err(GameError::NoEligibleTarget("finalists do not border each other".into()));
        };

        self.announce_final_round(&plan);
        self.selection.final_round = Some(PendingRound { attacker_tile, defender_tile, plan });
        self.mode = Mode::FinalReady;
        self.set_start_enabled(true);
        Ok(())
    }

    fn announce_final_round(&mut self, plan: &RoundPlan) {
        let name = |id: PlayerId| self.state.player(id).map(|p| p.name.clone()).unwrap_or_default();
        let (attacker, defender) = (name(plan.attacker), name(plan.defender));
        self.services.status(
            format!("Best-of-3: {attacker} starts vs {defender}"),
            format!("Category: {}. Press Start Game to begin this round.", plan.category),
        );
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn ensure_live(&self) -> Result<(), GameError> {
        if self.torn_down {
            Err(GameError::TornDown)
        } else {
            Ok(())
        }
    }

    fn illegal(&self, action: &'static str) -> GameError {
        GameError::IllegalTransition { action, mode: self.mode }
    }

    fn set_start_enabled(&mut self, enabled: bool) {
        if self.start_enabled != enabled {
            self.start_enabled = enabled;
            self.services.outbox.push(GameEvent::StartEnabled { enabled });
        }
    }

    fn paint_tile(&mut self, key: TileKey) {
        let Some(owner) = self.state.owner_of(key) else { return };
        self.services.renderer.set_tile_owner(key, owner.id);
        self.services.renderer.set_tile_label(key, owner.id, &owner.category);
    }

    /// Report a rejected request, then publish whatever the call produced.
    fn finish<T>(&mut self, outcome: Result<T, GameError>) -> Result<T, GameError> {
        if let Err(err) = &outcome {
            debug!(error = %err, mode = %self.mode, "request rejected");
            if !matches!(err, GameError::NoEligibleTarget(_) | GameError::TornDown) {
                self.services.outbox.push(GameEvent::hint(err.to_string()));
            }
        }
        self.flush();
        outcome
    }

    fn flush(&mut self) {
        for event in self.services.outbox.drain(..) {
            self.observers.publish(&event);
            self.log.push(event);
        }
    }

    // ------------------------------------------------------------------
    // Observers and queries
    // ------------------------------------------------------------------

    /// Receive every event the board publishes from now on.
    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Recent events, oldest first.
    #[must_use]
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    #[must_use]
    pub fn players(&self) -> &PlayerMap<Player> {
        self.state.players()
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        self.state.tiles()
    }

    /// Running duel, countdown included.
    #[must_use]
    pub fn battle(&self) -> Option<&BattleSession> {
        self.battle.session()
    }

    /// Whether the duel clocks are running (countdown over).
    #[must_use]
    pub fn is_battle_running(&self) -> bool {
        self.battle.is_running()
    }

    /// Whether the pass lockout is active.
    #[must_use]
    pub fn in_pass_cooldown(&self) -> bool {
        self.battle.in_cooldown()
    }

    #[must_use]
    pub fn series(&self) -> &SeriesManager {
        &self.series
    }

    #[must_use]
    pub fn is_randomizer_running(&self) -> bool {
        self.selector.is_running()
    }

    /// Challenger tile while choosing a target.
    #[must_use]
    pub fn selected_challenger(&self) -> Option<TileKey> {
        self.selection.challenger
    }

    /// Enemy tiles the challenger may attack.
    #[must_use]
    pub fn target_tiles(&self) -> &[TileKey] {
        &self.selection.targets
    }

    /// The locked-on (attacker, defender) tiles.
    #[must_use]
    pub fn pending_battle(&self) -> Option<(TileKey, TileKey)> {
        self.selection.pending
    }

    /// The planned best-of-3 round awaiting confirmation.
    #[must_use]
    pub fn pending_round(&self) -> Option<&PendingRound> {
        self.selection.final_round.as_ref()
    }

    #[must_use]
    pub fn category_choices(&self) -> &[String] {
        self.overlay.choices()
    }

    #[must_use]
    pub fn selected_category(&self) -> Option<&str> {
        self.overlay.selected()
    }

    #[must_use]
    pub fn is_start_enabled(&self) -> bool {
        self.start_enabled
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Simulated time since the board was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.services.scheduler.now()
    }

    /// Alarms still scheduled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.services.scheduler.pending()
    }

    #[must_use]
    pub fn catalog(&self) -> &CategoryCatalog {
        &self.services.catalog
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.services.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.services.renderer
    }

    /// Owned copy of everything a display needs.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            mode: self.mode,
            grid_size: self.state.grid().size(),
            tiles: self.state.tiles().iter().cloned().collect(),
            players: self.state.players().values().cloned().collect(),
            battle: self.battle.session().cloned(),
            series_scores: self.series.scores(),
            category_choices: self.overlay.choices().to_vec(),
            start_enabled: self.start_enabled,
            now_ms: self.services.scheduler.now().as_millis() as u64,
        }
    }
}
