//! Per-call context handed to the sub-state-machines.
//!
//! The board owns the scheduler, renderer, RNG, catalog and event outbox.
//! When it drives a component it lends them through a `TurnContext`, so the
//! component can schedule work, draw, and report status without holding any
//! reference to the board.

use crate::catalog::CategoryCatalog;
use crate::core::GameRng;
use crate::events::GameEvent;
use crate::render::Renderer;
use crate::schedule::Scheduler;

/// Borrowed collaborators for one state transition.
pub struct TurnContext<'a> {
    pub scheduler: &'a mut Scheduler,
    pub renderer: &'a mut dyn Renderer,
    pub rng: &'a mut GameRng,
    pub catalog: &'a CategoryCatalog,
    /// Events produced during the transition; the board publishes them afterwards.
    pub outbox: &'a mut Vec<GameEvent>,
}

impl TurnContext<'_> {
    /// Queue an event.
    pub fn emit(&mut self, event: GameEvent) {
        self.outbox.push(event);
    }

    /// Queue a status update.
    pub fn status(&mut self, title: impl Into<String>, hint: impl Into<String>) {
        self.outbox.push(GameEvent::status(title, hint));
    }
}
