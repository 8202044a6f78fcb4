// The middle layer: owns every player, turns input events into transport
// commands, drives the lookahead ticks and builds what the TUI draws.

use std::time::{Duration, Instant};

use anyhow::Context;

use crate::audio::AudioClock;
use crate::config::SchedulerConfig;
use crate::pipeline::Session;
use crate::scheduler::{Player, Ticker, VisualEvent};
use crate::shared::{DisplayState, InputEvent, LedState, PlayerView};
use crate::sound::SoundProvider;

const TEMPO_STEP: u32 = 1;

pub struct Middle<P: SoundProvider, C: AudioClock> {
    players: Vec<Player<P, C>>,
    ticker: Ticker,
    selected: usize,
    cursor: usize,
    status: String,
}

impl<P: SoundProvider, C: AudioClock> Middle<P, C> {
    pub fn new(players: Vec<Player<P, C>>, config: &SchedulerConfig, now: Instant) -> Self {
        Self {
            players,
            ticker: Ticker::new(config.tick_interval, now),
            selected: 0,
            cursor: 0,
            status: String::new(),
        }
    }

    pub fn players(&self) -> &[Player<P, C>] {
        &self.players
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn current(&mut self) -> Option<&mut Player<P, C>> {
        self.players.get_mut(self.selected)
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PlayPause => {
                if let Some(player) = self.current() {
                    if player.state().is_playing() {
                        player.pause();
                    } else {
                        player.start();
                    }
                }
            }
            InputEvent::Stop => {
                if let Some(player) = self.current() {
                    player.stop();
                }
            }
            InputEvent::TempoUp => self.nudge_tempo(TEMPO_STEP as i64),
            InputEvent::TempoDown => self.nudge_tempo(-(TEMPO_STEP as i64)),
            InputEvent::NextPlayer => {
                if !self.players.is_empty() {
                    self.selected = (self.selected + 1) % self.players.len();
                    self.cursor = 0;
                }
            }
            InputEvent::ToggleStep(step) => self.toggle(step as usize),
            InputEvent::CursorLeft => self.cursor = self.cursor.saturating_sub(1),
            InputEvent::CursorRight => {
                if let Some(player) = self.players.get(self.selected) {
                    let last = player.pattern().total_steps().saturating_sub(1);
                    self.cursor = (self.cursor + 1).min(last);
                }
            }
            InputEvent::ToggleAtCursor => self.toggle(self.cursor),
            InputEvent::Quit => {}
        }
    }

    fn nudge_tempo(&mut self, delta: i64) {
        let Some(player) = self.current() else {
            return;
        };
        let bpm = (player.bpm() as i64 + delta).max(0) as u32;
        let name = player.pattern().name().to_string();
        match player.set_tempo(bpm) {
            Ok(()) => self.status = format!("{name}: {bpm} BPM"),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn toggle(&mut self, step: usize) {
        let Some(player) = self.current() else {
            return;
        };
        match player.toggle_step(step) {
            Ok(on) => {
                tracing::debug!("{}: step {} -> {}", player.pattern().name(), step, on);
                self.status.clear();
            }
            Err(e) => {
                tracing::warn!("toggle rejected: {e}");
                self.status = e.to_string();
            }
        }
    }

    /// Runs a lookahead pass on every player when the cadence is due, then
    /// collects highlight events.
    pub fn tick(&mut self, now: Instant) -> Vec<(usize, VisualEvent)> {
        if self.ticker.poll(now) {
            for player in &mut self.players {
                player.tick();
            }
        }
        let mut events = Vec::new();
        for (i, player) in self.players.iter_mut().enumerate() {
            events.extend(player.poll_events().into_iter().map(|e| (i, e)));
        }
        events
    }

    pub fn until_next_tick(&self, now: Instant) -> Duration {
        self.ticker.until_next(now)
    }

    pub fn stop_all(&mut self) {
        for player in &mut self.players {
            player.stop();
        }
    }

    pub fn display_state(&self) -> DisplayState {
        let players = self
            .players
            .iter()
            .map(|player| {
                let pattern = player.pattern();
                let highlighted = player.highlighted();
                let leds = (0..pattern.total_steps())
                    .map(|step| {
                        if highlighted == Some(step) && player.state().is_playing() {
                            LedState::OnHigh
                        } else if pattern.is_active(step).unwrap_or(false) {
                            LedState::OnMedium
                        } else {
                            LedState::Off
                        }
                    })
                    .collect();
                PlayerView {
                    name: pattern.name().to_string(),
                    sound: pattern.sound_name().to_string(),
                    bpm: player.bpm(),
                    transport: player.state(),
                    beats_per_bar: pattern.beats_per_bar(),
                    steps_per_beat: pattern.steps_per_beat(),
                    leds,
                }
            })
            .collect();
        DisplayState {
            players,
            selected: self.selected,
            cursor: self.cursor,
            display_text: self.status.clone(),
        }
    }
}

impl<P: SoundProvider + Clone, C: AudioClock + Clone> Middle<P, C> {
    /// One player per session entry, all sharing `provider` and `clock`.
    pub fn from_session(session: &Session, provider: P, clock: C, now: Instant) -> anyhow::Result<Self> {
        let config = session.scheduler.to_config()?;
        let players = session
            .players
            .iter()
            .map(|spec| {
                let pattern = spec.pattern()?;
                Player::new(spec.bpm, pattern, provider.clone(), clock.clone(), config)
            })
            .collect::<Result<Vec<_>, _>>()
            .context("building players")?;
        Ok(Self::new(players, &config, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ManualClock;
    use crate::error::SequencerError;
    use crate::scheduler::TransportState;
    use crate::sound::RecordingProvider;

    fn middle() -> (Middle<RecordingProvider, ManualClock>, RecordingProvider, ManualClock) {
        let provider = RecordingProvider::new();
        let clock = ManualClock::new(0.0);
        let middle =
            Middle::from_session(&Session::default(), provider.clone(), clock.clone(), Instant::now())
                .unwrap();
        (middle, provider, clock)
    }

    #[test]
    fn builds_one_player_per_session_entry() {
        let (middle, _, _) = middle();
        let ds = middle.display_state();
        assert_eq!(ds.players.len(), 3);
        assert_eq!(ds.players[1].leds.len(), 12);
        assert_eq!(
            (ds.players[1].beats_per_bar, ds.players[1].steps_per_beat),
            (3, 4)
        );
        assert_eq!(ds.players[2].bpm, 140);
        assert_eq!(ds.players[0].leds[4], LedState::OnMedium);
        assert_eq!(ds.players[0].leds[5], LedState::Off);
    }

    #[test]
    fn play_pause_and_stop_target_selected_player() {
        let (mut middle, provider, _) = middle();
        middle.handle_input(InputEvent::NextPlayer);
        middle.handle_input(InputEvent::PlayPause);
        assert_eq!(middle.players()[1].state(), TransportState::Playing);
        assert_eq!(middle.players()[0].state(), TransportState::Stopped);
        assert_eq!(provider.commits()[0].name, "sangban");

        middle.handle_input(InputEvent::PlayPause);
        assert_eq!(middle.players()[1].state(), TransportState::Paused);
        middle.handle_input(InputEvent::Stop);
        assert_eq!(middle.players()[1].state(), TransportState::Stopped);
    }

    #[test]
    fn tempo_is_bounded() {
        let (mut middle, _, _) = middle();
        for _ in 0..200 {
            middle.handle_input(InputEvent::TempoUp);
        }
        assert_eq!(middle.players()[0].bpm(), 300);
        assert!(middle.status().contains("300"));
    }

    #[test]
    fn tempo_stops_at_lower_bound_and_reports_why() {
        let (mut middle, _, _) = middle();
        for _ in 0..200 {
            middle.handle_input(InputEvent::TempoDown);
        }
        assert_eq!(middle.players()[0].bpm(), 30);
        // the 30 -> 29 attempt is what ends in the status line
        assert_eq!(
            middle.status(),
            SequencerError::InvalidTempo {
                bpm: 29,
                min: 30,
                max: 300
            }
            .to_string()
        );
    }

    #[test]
    fn toggles_by_pad_and_cursor() {
        let (mut middle, _, _) = middle();
        middle.handle_input(InputEvent::ToggleStep(1));
        assert!(middle.players()[0].pattern().is_active(1).unwrap());

        middle.handle_input(InputEvent::CursorRight);
        middle.handle_input(InputEvent::CursorRight);
        middle.handle_input(InputEvent::ToggleAtCursor);
        assert!(middle.players()[0].pattern().is_active(2).unwrap());

        for _ in 0..40 {
            middle.handle_input(InputEvent::CursorRight);
        }
        assert_eq!(middle.display_state().cursor, 15);
    }

    #[test]
    fn out_of_range_pad_reports_status() {
        let (mut middle, _, _) = middle();
        middle.handle_input(InputEvent::NextPlayer); // 12-step groove
        middle.handle_input(InputEvent::ToggleStep(13));
        assert!(middle.status().contains("out of range"));
        let active: Vec<_> = middle.players()[1].pattern().active_steps().collect();
        assert_eq!(active, vec![0, 3, 6, 9]);
    }

    #[test]
    fn tick_reports_highlights_per_player() {
        let (mut middle, _, clock) = middle();
        middle.handle_input(InputEvent::PlayPause);
        let start = Instant::now();
        let events = middle.tick(start);
        assert_eq!(events, vec![(0, VisualEvent::StepHighlighted { step: 0, at: 0.0 })]);
        assert_eq!(middle.display_state().players[0].leds[0], LedState::OnHigh);

        clock.set(0.5);
        let events = middle.tick(start + Duration::from_millis(30));
        assert_eq!(events, vec![(0, VisualEvent::StepHighlighted { step: 4, at: 0.5 })]);

        middle.stop_all();
        let events = middle.tick(start + Duration::from_millis(60));
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|(_, e)| *e == VisualEvent::HighlightCleared));
    }
}
