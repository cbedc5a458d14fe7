//! Random challenger spin.
//!
//! The spin cycles a cursor through the candidate tiles on a fixed cadence
//! while the music cue plays, then lands on a final key chosen up front.
//! The spin length follows the cue: it ends `scroll_lead` before the cue
//! does, but never runs shorter than `min_spin`.

use std::time::Duration;

use tracing::{debug, trace};

use crate::context::TurnContext;
use crate::core::{GameConfig, TileKey};
use crate::render::HighlightStyle;
use crate::schedule::{Alarm, TimerHandle};

#[derive(Clone, Debug)]
struct Spin {
    keys: Vec<TileKey>,
    index: usize,
    final_key: TileKey,
    started: Duration,
    ends: Duration,
    timer: TimerHandle,
}

/// Animates and reports a random tile pick.
#[derive(Clone, Debug)]
pub struct RandomSelector {
    step: Duration,
    cue_length: Duration,
    scroll_lead: Duration,
    min_spin: Duration,
    spin: Option<Spin>,
}

impl RandomSelector {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            step: config.selector_step,
            cue_length: config.selector_cue,
            scroll_lead: config.selector_scroll_lead,
            min_spin: config.selector_min_spin,
            spin: None,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.spin.is_some()
    }

    /// How long a spin lasts with the current cue length.
    ///
    /// ```
    /// use std::time::Duration;
    /// use tile_duel::core::GameConfig;
    /// use tile_duel::selector::RandomSelector;
    ///
    /// let mut selector = RandomSelector::new(&GameConfig::new());
    /// assert_eq!(selector.run_duration(), Duration::from_millis(6500));
    ///
    /// selector.set_cue_length(Duration::from_millis(3000));
    /// assert_eq!(selector.run_duration(), Duration::from_millis(1500));
    /// ```
    #[must_use]
    pub fn run_duration(&self) -> Duration {
        self.cue_length.saturating_sub(self.scroll_lead).max(self.min_spin)
    }

    /// Report the real cue length. A running spin re-derives its end time.
    pub fn set_cue_length(&mut self, cue_length: Duration) {
        self.cue_length = cue_length;
        let run = self.run_duration();
        if let Some(spin) = self.spin.as_mut() {
            spin.ends = spin.started + run;
            debug!(ends_ms = spin.ends.as_millis() as u64, "spin end re-derived from cue length");
        }
    }

    /// Start spinning over `keys`, landing on `final_key`.
    ///
    /// Ignored (returns false) when `keys` is empty or a spin is running.
    pub fn start(&mut self, ctx: &mut TurnContext<'_>, keys: Vec<TileKey>, final_key: TileKey) -> bool {
        if keys.is_empty() || self.spin.is_some() {
            debug!(candidates = keys.len(), running = self.spin.is_some(), "spin start ignored");
            return false;
        }

        let started = ctx.scheduler.now();
        ctx.renderer.start_selector_cue();
        let timer = ctx.scheduler.schedule_repeating(self.step, Alarm::SelectorStep);
        debug!(candidates = keys.len(), %final_key, "spin started");
        self.spin = Some(Spin {
            keys,
            index: 0,
            final_key,
            started,
            ends: started + self.run_duration(),
            timer,
        });
        true
    }

    /// Advance the cursor. Returns the final key on the step that lands.
    pub fn on_step(&mut self, ctx: &mut TurnContext<'_>) -> Option<TileKey> {
        let spin = self.spin.as_mut()?;
        spin.index = (spin.index + 1) % spin.keys.len();
        let current = spin.keys[spin.index];
        ctx.renderer.highlight_tile(current, HighlightStyle::Cursor);
        trace!(%current, "spin step");

        if ctx.scheduler.now() < spin.ends {
            return None;
        }

        let final_key = spin.final_key;
        ctx.scheduler.cancel(spin.timer);
        self.spin = None;
        ctx.renderer.highlight_tile(final_key, HighlightStyle::Cursor);
        Some(final_key)
    }

    /// Hard stop: cancel the spin, hide the cursor and silence the cue.
    pub fn stop(&mut self, ctx: &mut TurnContext<'_>) {
        if let Some(spin) = self.spin.take() {
            ctx.scheduler.cancel(spin.timer);
            ctx.renderer.hide_selector_cursor();
            debug!("spin stopped");
        }
        ctx.renderer.stop_selector_cue();
    }

    /// Cancel a running spin without touching the cue.
    pub(crate) fn halt(&mut self, ctx: &mut TurnContext<'_>) {
        if let Some(spin) = self.spin.take() {
            ctx.scheduler.cancel(spin.timer);
            ctx.renderer.hide_selector_cursor();
        }
    }
}
