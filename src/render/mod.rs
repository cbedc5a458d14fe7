//! Rendering seam.
//!
//! The core never draws anything. It describes what should be shown through
//! the [`Renderer`] trait, and hosts implement the trait over whatever
//! graphics and audio stack they use. Every method has a no-op default so a
//! host only implements what it displays.
//!
//! Two implementations ship with the crate: [`NullRenderer`] for headless
//! use, and [`CommandLog`], which records [`RenderCommand`]s for hosts that
//! prefer to consume a command buffer (and for tests).

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, TileKey};

/// How a highlighted tile should be emphasised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightStyle {
    /// The selected challenger tile.
    Selected,
    /// An enemy tile the challenger may attack.
    Target,
    /// The target the challenger locked on.
    PendingDefender,
    /// The randomizer cursor.
    Cursor,
}

/// A short sine tone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency: f32,
    pub duration_ms: u32,
    pub volume: f32,
    pub delay_ms: u32,
}

impl Tone {
    /// Countdown digit.
    pub const COUNTDOWN: Tone = Tone::new(440.0, 180, 0.24);
    /// Countdown "GO!".
    pub const COUNTDOWN_GO: Tone = Tone::new(740.0, 180, 0.24);
    /// First note of the correct-answer chirp (G).
    pub const CORRECT_LOW: Tone = Tone::new(392.0, 110, 0.22);
    /// Second note of the correct-answer chirp (B), played 120 ms later.
    pub const CORRECT_HIGH: Tone = Tone::new(494.0, 110, 0.22).delayed(120);
    /// Pass.
    pub const PASS: Tone = Tone::new(180.0, 200, 0.25);
    /// Duel over.
    pub const RESOLVED: Tone = Tone::new(220.0, 400, 0.25);

    #[must_use]
    pub const fn new(frequency: f32, duration_ms: u32, volume: f32) -> Self {
        Self { frequency, duration_ms, volume, delay_ms: 0 }
    }

    #[must_use]
    pub const fn delayed(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Everything the core asks a display/audio layer to do.
pub trait Renderer {
    /// Emphasise a tile.
    fn highlight_tile(&mut self, _key: TileKey, _style: HighlightStyle) {}

    /// Return every tile to its normal look.
    fn clear_highlights(&mut self) {}

    /// A tile changed hands; recolour it.
    fn set_tile_owner(&mut self, _key: TileKey, _owner: PlayerId) {}

    /// Redraw a tile's "P<n> / category" label.
    fn set_tile_label(&mut self, _key: TileKey, _owner: PlayerId, _category: &str) {}

    /// Show a prompt for `category`. `image` is `None` when the category has no images.
    fn show_image_for_category(&mut self, _category: &str, _image: Option<&str>) {}

    /// Remove the prompt overlay.
    fn clear_category_image(&mut self) {}

    /// Show a countdown label, or hide it with `None`.
    fn show_countdown_step(&mut self, _label: Option<&str>) {}

    /// Play a tone.
    fn play_tone(&mut self, _tone: Tone) {}

    /// Start the randomizer's music cue from the beginning.
    fn start_selector_cue(&mut self) {}

    /// Stop the randomizer's music cue.
    fn stop_selector_cue(&mut self) {}

    /// Hide the randomizer cursor.
    fn hide_selector_cursor(&mut self) {}
}

/// Renderer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}

/// A recorded renderer call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    Highlight(TileKey, HighlightStyle),
    ClearHighlights,
    SetOwner(TileKey, PlayerId),
    SetLabel(TileKey, PlayerId, String),
    ShowImage { category: String, image: Option<String> },
    ClearImage,
    Countdown(Option<String>),
    Tone(Tone),
    StartCue,
    StopCue,
    HideCursor,
}

/// Renderer that records every call in order.
#[derive(Clone, Debug, Default)]
pub struct CommandLog {
    commands: Vec<RenderCommand>,
}

impl CommandLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty.
    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded tones, in order.
    pub fn tones(&self) -> impl Iterator<Item = &Tone> {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::Tone(t) => Some(t),
            _ => None,
        })
    }
}

impl Renderer for CommandLog {
    fn highlight_tile(&mut self, key: TileKey, style: HighlightStyle) {
        self.commands.push(RenderCommand::Highlight(key, style));
    }

    fn clear_highlights(&mut self) {
        self.commands.push(RenderCommand::ClearHighlights);
    }

    fn set_tile_owner(&mut self, key: TileKey, owner: PlayerId) {
        self.commands.push(RenderCommand::SetOwner(key, owner));
    }

    fn set_tile_label(&mut self, key: TileKey, owner: PlayerId, category: &str) {
        self.commands.push(RenderCommand::SetLabel(key, owner, category.to_string()));
    }

    fn show_image_for_category(&mut self, category: &str, image: Option<&str>) {
        self.commands.push(RenderCommand::ShowImage {
            category: category.to_string(),
            image: image.map(str::to_string),
        });
    }

    fn clear_category_image(&mut self) {
        self.commands.push(RenderCommand::ClearImage);
    }

    fn show_countdown_step(&mut self, label: Option<&str>) {
        self.commands.push(RenderCommand::Countdown(label.map(str::to_string)));
    }

    fn play_tone(&mut self, tone: Tone) {
        self.commands.push(RenderCommand::Tone(tone));
    }

    fn start_selector_cue(&mut self) {
        self.commands.push(RenderCommand::StartCue);
    }

    fn stop_selector_cue(&mut self) {
        self.commands.push(RenderCommand::StopCue);
    }

    fn hide_selector_cursor(&mut self) {
        self.commands.push(RenderCommand::HideCursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_log_records_in_order() {
        let mut log = CommandLog::new();
        log.highlight_tile(TileKey::new(0, 1), HighlightStyle::Cursor);
        log.play_tone(Tone::PASS);
        log.show_countdown_step(Some("GO!"));

        assert_eq!(
            log.commands(),
            &[
                RenderCommand::Highlight(TileKey::new(0, 1), HighlightStyle::Cursor),
                RenderCommand::Tone(Tone::PASS),
                RenderCommand::Countdown(Some("GO!".into())),
            ]
        );
        assert_eq!(log.tones().count(), 1);
        assert_eq!(log.drain().len(), 3);
        assert!(log.commands().is_empty());
    }

    #[test]
    fn test_correct_chirp_second_note_is_delayed() {
        assert_eq!(Tone::CORRECT_LOW.delay_ms, 0);
        assert_eq!(Tone::CORRECT_HIGH.delay_ms, 120);
    }
}
