// Types shared by the TUI and the middle layer.
//
// The TUI only turns keys into InputEvents and draws a DisplayState; players,
// cursor and status text live in the middle layer.

use crate::scheduler::TransportState;

pub const NUM_PADS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    PlayPause,      // space
    Stop,           // backspace
    TempoDown,      // -
    TempoUp,        // =
    NextPlayer,     // tab
    ToggleStep(u8), // pad keys, step 0-15 of the selected player
    CursorLeft,
    CursorRight,
    ToggleAtCursor, // enter
    Quit,           // esc
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedState {
    Off,      // inactive step
    OnMedium, // active step
    OnHigh,   // step currently sounding
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerView {
    pub name: String,
    pub sound: String,
    pub bpm: u32,
    pub transport: TransportState,
    pub beats_per_bar: usize,
    pub steps_per_beat: usize,
    pub leds: Vec<LedState>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub players: Vec<PlayerView>,
    pub selected: usize,
    pub cursor: usize,
    pub display_text: String, // last status or error message
}
