//! Duel driver: countdown, tick cadence, pass lockout and prompt images.

use std::time::Duration;

use tracing::{debug, info, trace};

use super::session::{BattleResult, BattleSession, Contestant, Side};
use crate::catalog::ImageRotation;
use crate::context::TurnContext;
use crate::core::{GameConfig, GameError, Mode, TileKey};
use crate::events::GameEvent;
use crate::render::Tone;
use crate::schedule::{Alarm, TimerHandle, MIN_INTERVAL};

/// Labels shown before the clocks start.
pub const COUNTDOWN_LABELS: [&str; 4] = ["3", "2", "1", "GO!"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Countdown,
    Running,
}

#[derive(Clone, Debug)]
struct ActiveDuel {
    session: BattleSession,
    phase: Phase,
    countdown: Option<TimerHandle>,
    tick: Option<TimerHandle>,
    cooldown: Option<TimerHandle>,
}

/// Runs at most one duel at a time.
///
/// The clock owns its timers: every handle it schedules is cancelled when
/// the duel resolves or is torn down, so no alarm of a finished duel can
/// reach it.
#[derive(Clone, Debug)]
pub struct BattleClock {
    max_time: Duration,
    tick_interval: Duration,
    countdown_step: Duration,
    countdown_tail: Duration,
    pass_cooldown: Duration,
    duel: Option<ActiveDuel>,
    images: ImageRotation,
}

impl BattleClock {
    /// Create an idle clock with timings from `config`.
    ///
    /// The tick interval is raised to the scheduler's minimum cadence, and
    /// each tick drains exactly the interval it was scheduled at.
    #[must_use]
    pub fn new(config: &GameConfig, images: ImageRotation) -> Self {
        Self {
            max_time: config.max_timer,
            tick_interval: config.tick_interval.max(MIN_INTERVAL),
            countdown_step: config.countdown_step,
            countdown_tail: config.countdown_tail,
            pass_cooldown: config.pass_cooldown,
            duel: None,
            images,
        }
    }

    /// Check whether a duel (countdown included) is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.duel.is_some()
    }

    /// Check whether the clocks are ticking (countdown over).
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(&self.duel, Some(d) if d.phase == Phase::Running)
    }

    /// Check whether the pass lockout is active.
    #[must_use]
    pub fn in_cooldown(&self) -> bool {
        matches!(&self.duel, Some(d) if d.cooldown.is_some())
    }

    /// Read-only view of the running duel.
    #[must_use]
    pub fn session(&self) -> Option<&BattleSession> {
        self.duel.as_ref().map(|d| &d.session)
    }

    /// Prompt-image history, shared across duels of one board.
    #[must_use]
    pub fn images(&self) -> &ImageRotation {
        &self.images
    }

    /// Begin a duel: announce it and start the "3, 2, 1, GO!" countdown.
    ///
    /// Returns false (and does nothing) if a duel is already in progress.
    pub fn start_duel(
        &mut self,
        ctx: &mut TurnContext<'_>,
        attacker: Contestant,
        defender: Contestant,
        tiles: (TileKey, TileKey),
        category: &str,
    ) -> bool {
        if self.duel.is_some() {
            debug!("duel already in progress, start ignored");
            return false;
        }

        info!(
            attacker = %attacker.id,
            defender = %defender.id,
            category,
            "duel starting"
        );

        ctx.emit(GameEvent::CategoryFocus { category: Some(category.to_string()) });
        ctx.status(
            format!("{} vs {}", attacker.name, defender.name),
            format!(
                "Battle category: {category}. Challenger timer starts; defender waits until challenger answers correctly."
            ),
        );
        ctx.emit(GameEvent::BattleStarted {
            attacker: attacker.id,
            defender: defender.id,
            category: category.to_string(),
        });

        let session =
            BattleSession::new(attacker, defender, tiles.0, tiles.1, category, self.max_time);
        let countdown = ctx.scheduler.schedule(Duration::ZERO, Alarm::CountdownStep(0));
        self.duel = Some(ActiveDuel {
            session,
            phase: Phase::Countdown,
            countdown: Some(countdown),
            tick: None,
            cooldown: None,
        });
        true
    }

    /// Handle one of the clock's alarms. Returns the outcome when the duel ends.
    pub fn on_alarm(&mut self, ctx: &mut TurnContext<'_>, alarm: Alarm) -> Option<BattleResult> {
        match alarm {
            Alarm::CountdownStep(step) => {
                self.countdown_step(ctx, step);
                None
            }
            Alarm::CountdownFinished => {
                self.start_clocks(ctx);
                None
            }
            Alarm::ClockTick => self.tick(ctx),
            Alarm::PassCooldownEnded => {
                self.end_cooldown(ctx);
                None
            }
            Alarm::SelectorStep => None,
        }
    }

    fn countdown_step(&mut self, ctx: &mut TurnContext<'_>, step: u8) {
        let Some(duel) = self.duel.as_mut() else { return };
        let Some(&label) = COUNTDOWN_LABELS.get(step as usize) else { return };

        ctx.renderer.show_countdown_step(Some(label));
        let last = step as usize + 1 == COUNTDOWN_LABELS.len();
        ctx.renderer.play_tone(if last { Tone::COUNTDOWN_GO } else { Tone::COUNTDOWN });

        let next = if last {
            ctx.scheduler.schedule(self.countdown_tail, Alarm::CountdownFinished)
        } else {
            ctx.scheduler.schedule(self.countdown_step, Alarm::CountdownStep(step + 1))
        };
        duel.countdown = Some(next);
    }

    fn start_clocks(&mut self, ctx: &mut TurnContext<'_>) {
        let Some(duel) = self.duel.as_mut() else { return };
        ctx.renderer.show_countdown_step(None);
        duel.countdown = None;
        duel.phase = Phase::Running;
        duel.tick = Some(ctx.scheduler.schedule_repeating(self.tick_interval, Alarm::ClockTick));
        let category = duel.session.category.clone();
        self.images.start(category);
        self.show_next_image(ctx);
        debug!("duel clocks running");
    }

    fn tick(&mut self, ctx: &mut TurnContext<'_>) -> Option<BattleResult> {
        let duel = self.duel.as_mut()?;
        if duel.phase != Phase::Running {
            return None;
        }
        let loser = duel.session.tick(self.tick_interval);
        trace!(
            attacker_ms = duel.session.attacker_time.as_millis() as u64,
            defender_ms = duel.session.defender_time.as_millis() as u64,
            "duel tick"
        );
        let result = duel.session.result(loser?);
        self.resolve(ctx, result.clone());
        Some(result)
    }

    fn end_cooldown(&mut self, ctx: &mut TurnContext<'_>) {
        let Some(duel) = self.duel.as_mut() else { return };
        duel.cooldown = None;
        self.show_next_image(ctx);
    }

    fn show_next_image(&mut self, ctx: &mut TurnContext<'_>) {
        let Some(category) = self.images.current().map(str::to_string) else { return };
        let image = self.images.next(ctx.catalog);
        ctx.renderer.show_image_for_category(&category, image.as_deref());
    }

    fn ensure_accepting(&self, action: &'static str) -> Result<&ActiveDuel, GameError> {
        match &self.duel {
            Some(duel) if duel.phase == Phase::Running && duel.cooldown.is_none() => Ok(duel),
            Some(_) => Err(GameError::IllegalTransition { action, mode: Mode::Battle }),
            None => Err(GameError::IllegalTransition { action, mode: Mode::Idle }),
        }
    }

    /// Register a correct answer from `side`.
    ///
    /// Returns `Ok(true)` when the active side flipped and `Ok(false)` when
    /// `side` was already waiting (a harmless repeat). Errors while the
    /// countdown runs, during the pass lockout, or with no duel.
    pub fn mark_correct(&mut self, ctx: &mut TurnContext<'_>, side: Side) -> Result<bool, GameError> {
        self.ensure_accepting("mark_correct")?;
        let Some(duel) = self.duel.as_mut() else { return Ok(false) };

        if !duel.session.answer_correct(side) {
            debug!(?side, "correct answer from waiting side ignored");
            return Ok(false);
        }

        ctx.renderer.play_tone(Tone::CORRECT_LOW);
        ctx.renderer.play_tone(Tone::CORRECT_HIGH);
        let name = duel.session.contestant(side).name.clone();
        ctx.emit(GameEvent::hint(format!("{name} answered correctly. Their clock is paused.")));
        self.show_next_image(ctx);
        Ok(true)
    }

    /// Mark whichever side is currently active as correct.
    pub fn correct_hotkey(&mut self, ctx: &mut TurnContext<'_>) -> Result<bool, GameError> {
        let side = self.ensure_accepting("correct_hotkey")?.session.active;
        self.mark_correct(ctx, side)
    }

    /// Skip the current prompt: lock answers for the cooldown, then show the next prompt.
    pub fn request_pass(&mut self, ctx: &mut TurnContext<'_>) -> Result<(), GameError> {
        self.ensure_accepting("request_pass")?;
        let Some(duel) = self.duel.as_mut() else { return Ok(()) };

        ctx.renderer.play_tone(Tone::PASS);
        duel.cooldown = Some(ctx.scheduler.schedule(self.pass_cooldown, Alarm::PassCooldownEnded));
        debug!(cooldown_ms = self.pass_cooldown.as_millis() as u64, "pass requested");
        Ok(())
    }

    fn release(&mut self, ctx: &mut TurnContext<'_>) -> Option<ActiveDuel> {
        let duel = self.duel.take()?;
        for handle in [duel.countdown, duel.tick, duel.cooldown].into_iter().flatten() {
            ctx.scheduler.cancel(handle);
        }
        self.images.clear();
        ctx.renderer.clear_category_image();
        Some(duel)
    }

    fn resolve(&mut self, ctx: &mut TurnContext<'_>, result: BattleResult) {
        self.release(ctx);
        ctx.emit(GameEvent::CategoryFocus { category: None });
        ctx.renderer.play_tone(Tone::RESOLVED);
        info!(
            winner = %result.winner,
            loser = %result.loser,
            winner_was_attacker = result.winner_was_attacker,
            "duel resolved"
        );
        ctx.emit(GameEvent::BattleResolved(result));
    }

    /// Abandon the duel without a winner, cancelling every pending timer.
    pub fn cancel(&mut self, ctx: &mut TurnContext<'_>) {
        if self.release(ctx).is_some() {
            ctx.renderer.show_countdown_step(None);
            debug!("duel cancelled without resolution");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryCatalog;
    use crate::core::{GameRng, PlayerId};
    use crate::render::{CommandLog, RenderCommand};
    use crate::schedule::Scheduler;

    struct Rig {
        scheduler: Scheduler,
        renderer: CommandLog,
        rng: GameRng,
        catalog: CategoryCatalog,
        outbox: Vec<GameEvent>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                scheduler: Scheduler::new(),
                renderer: CommandLog::new(),
                rng: GameRng::new(1),
                catalog: CategoryCatalog::from_image_paths([
                    "i/categoryImages/Technology/a.png",
                    "i/categoryImages/Technology/b.png",
                ]),
                outbox: Vec::new(),
            }
        }

        fn ctx(&mut self) -> TurnContext<'_> {
            TurnContext {
                scheduler: &mut self.scheduler,
                renderer: &mut self.renderer,
                rng: &mut self.rng,
                catalog: &self.catalog,
                outbox: &mut self.outbox,
            }
        }

        /// Advance simulated time, routing alarms to the clock.
        fn advance(&mut self, clock: &mut BattleClock, ms: u64) -> Option<BattleResult> {
            let until = self.scheduler.now() + Duration::from_millis(ms);
            let mut outcome = None;
            while let Some((_, alarm)) = self.scheduler.pop_due(until) {
                if let Some(result) = clock.on_alarm(&mut self.ctx(), alarm) {
                    outcome = Some(result);
                }
            }
            self.scheduler.advance_to(until);
            outcome
        }
    }

    fn clock(max_ms: u64) -> BattleClock {
        let config = GameConfig::new().with_max_timer(Duration::from_millis(max_ms));
        BattleClock::new(&config, ImageRotation::new(GameRng::new(9)))
    }

    fn start(rig: &mut Rig, clock: &mut BattleClock) {
        let started = clock.start_duel(
            &mut rig.ctx(),
            Contestant { id: PlayerId::new(0), name: "Player 1".into() },
            Contestant { id: PlayerId::new(1), name: "Player 2".into() },
            (TileKey::new(0, 0), TileKey::new(0, 1)),
            "Technology",
        );
        assert!(started);
    }

    #[test]
    fn test_countdown_then_clocks_run() {
        let mut rig = Rig::new();
        let mut clock = clock(1000);
        start(&mut rig, &mut clock);

        assert!(rig.advance(&mut clock, 2999).is_none());
        assert!(!clock.is_running());
        let labels: Vec<_> = rig
            .renderer
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Countdown(Some(l)) => Some(l.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["3", "2", "1", "GO!"]);

        rig.advance(&mut clock, 1);
        assert!(clock.is_running());
        assert_eq!(clock.session().map(|s| s.attacker_time), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_answers_rejected_during_countdown() {
        let mut rig = Rig::new();
        let mut clock = clock(1000);
        start(&mut rig, &mut clock);

        assert!(clock.mark_correct(&mut rig.ctx(), Side::Attacker).is_err());
        assert!(clock.request_pass(&mut rig.ctx()).is_err());
    }

    #[test]
    fn test_attacker_times_out() {
        let mut rig = Rig::new();
        let mut clock = clock(1000);
        start(&mut rig, &mut clock);

        let result = rig.advance(&mut clock, 3000 + 1000).expect("duel should resolve");
        assert_eq!(result.loser, PlayerId::new(0));
        assert!(!result.winner_was_attacker);
        assert!(!clock.is_active());
        assert_eq!(rig.scheduler.pending(), 0);
    }

    #[test]
    fn test_zero_tick_interval_still_drains_clock() {
        let mut rig = Rig::new();
        let mut config = GameConfig::new().with_max_timer(Duration::from_millis(40));
        config.tick_interval = Duration::ZERO;
        let mut clock = BattleClock::new(&config, ImageRotation::new(GameRng::new(9)));
        start(&mut rig, &mut clock);

        let result = rig.advance(&mut clock, 3000 + 40).expect("duel should resolve");
        assert_eq!(result.loser, PlayerId::new(0));
        assert!(!clock.is_active());
    }

    #[test]
    fn test_pass_locks_answers_until_cooldown_ends() {
        let mut rig = Rig::new();
        let mut clock = clock(20_000);
        start(&mut rig, &mut clock);
        rig.advance(&mut clock, 3000);

        clock.request_pass(&mut rig.ctx()).unwrap();
        assert!(clock.in_cooldown());
        assert!(clock.mark_correct(&mut rig.ctx(), Side::Attacker).is_err());
        assert!(clock.request_pass(&mut rig.ctx()).is_err());

        rig.advance(&mut clock, 3000);
        assert!(!clock.in_cooldown());
        assert_eq!(clock.mark_correct(&mut rig.ctx(), Side::Attacker), Ok(true));
        assert_eq!(clock.session().map(|s| s.active), Some(Side::Defender));
    }

    #[test]
    fn test_correct_answer_shows_new_prompt_and_chirps() {
        let mut rig = Rig::new();
        let mut clock = clock(20_000);
        start(&mut rig, &mut clock);
        rig.advance(&mut clock, 3000);
        rig.renderer.drain();

        assert_eq!(clock.correct_hotkey(&mut rig.ctx()), Ok(true));
        let tones: Vec<_> = rig.renderer.tones().copied().collect();
        assert_eq!(tones, vec![Tone::CORRECT_LOW, Tone::CORRECT_HIGH]);
        assert!(rig
            .renderer
            .commands()
            .iter()
            .any(|c| matches!(c, RenderCommand::ShowImage { image: Some(_), .. })));
        assert_eq!(clock.mark_correct(&mut rig.ctx(), Side::Attacker), Ok(false));
    }

    #[test]
    fn test_cancel_leaves_no_timers_and_no_result() {
        let mut rig = Rig::new();
        let mut clock = clock(1000);
        start(&mut rig, &mut clock);
        rig.advance(&mut clock, 3500);
        clock.request_pass(&mut rig.ctx()).unwrap();

        clock.cancel(&mut rig.ctx());
        assert!(!clock.is_active());
        assert_eq!(rig.scheduler.pending(), 0);
        assert!(rig.advance(&mut clock, 60_000).is_none());
        assert!(!rig.outbox.iter().any(|e| matches!(e, GameEvent::BattleResolved(_))));
    }
}
