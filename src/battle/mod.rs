//! Timed duels.
//!
//! A duel is a [`BattleSession`] (pure clock arithmetic) driven by a
//! [`BattleClock`] (countdown, tick cadence, pass lockout, prompt images).
//!
//! ## Rules
//!
//! - Both contestants start with the same clock. Only the active side's
//!   clock runs; the attacker is active first.
//! - A correct answer from the active side pauses their clock and starts the
//!   opponent's.
//! - A pass locks both answer controls for a cooldown and then advances the
//!   prompt. It does not change the active side or cost time.
//! - The first clock to reach zero loses.

mod session;
mod clock;

pub use session::{BattleResult, BattleSession, Contestant, Side};
pub use clock::{BattleClock, COUNTDOWN_LABELS};
