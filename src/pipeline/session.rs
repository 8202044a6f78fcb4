// The session file: which sounds to load, which patterns to play, and timing.
// Read on startup only; nothing here is ever written back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_LOOKAHEAD, DEFAULT_MAX_BPM, DEFAULT_MIN_BPM, DEFAULT_TICK_INTERVAL, SchedulerConfig,
    TempoRange,
};
use crate::error::SequencerError;
use crate::pipeline::pattern::Pattern;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub lookahead_ms: u64,
    pub tick_interval_ms: u64,
    pub min_bpm: u32,
    pub max_bpm: u32,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            lookahead_ms: DEFAULT_LOOKAHEAD.as_millis() as u64,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            min_bpm: DEFAULT_MIN_BPM,
            max_bpm: DEFAULT_MAX_BPM,
        }
    }
}

impl SchedulerSection {
    pub fn to_config(&self) -> Result<SchedulerConfig, SequencerError> {
        let config = SchedulerConfig {
            lookahead: Duration::from_millis(self.lookahead_ms),
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            tempo_range: TempoRange {
                min: self.min_bpm,
                max: self.max_bpm,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

// One player: its pattern plus the tempo it starts at
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    pub sound: String,
    pub beats_per_bar: usize,
    pub steps_per_beat: usize,
    #[serde(default)]
    pub active_steps: Vec<usize>,
    pub bpm: u32,
}

impl PlayerSpec {
    fn new(name: &str, sound: &str, beats: usize, steps: usize, active: &[usize], bpm: u32) -> Self {
        Self {
            name: name.into(),
            sound: sound.into(),
            beats_per_bar: beats,
            steps_per_beat: steps,
            active_steps: active.to_vec(),
            bpm,
        }
    }

    pub fn pattern(&self) -> Result<Pattern, SequencerError> {
        Pattern::new(
            self.name.clone(),
            self.sound.clone(),
            self.beats_per_bar,
            self.steps_per_beat,
            self.active_steps.iter().copied(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub scheduler: SchedulerSection,
    pub sounds: BTreeMap<String, PathBuf>,
    pub players: Vec<PlayerSpec>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            scheduler: SchedulerSection::default(),
            sounds: BTreeMap::from([
                ("shake".to_string(), PathBuf::from("assets/shake.wav")),
                ("sangban".to_string(), PathBuf::from("assets/sangban.wav")),
                ("kenkeni".to_string(), PathBuf::from("assets/kenkeni.wav")),
            ]),
            players: vec![
                PlayerSpec::new("Groove 1", "shake", 4, 4, &[0, 4, 8, 12], 120),
                PlayerSpec::new("Groove 2", "sangban", 3, 4, &[0, 3, 6, 9], 100),
                PlayerSpec::new("Groove 3", "kenkeni", 4, 4, &[2, 6, 10, 14], 140),
            ],
        }
    }
}

impl Session {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let session: Session = serde_json::from_str(json).context("parsing session")?;
        session.check()?;
        Ok(session)
    }

    /// Reads a session file; relative sound paths resolve against its directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading session {}", path.display()))?;
        let mut session =
            Self::from_json(&data).with_context(|| format!("in {}", path.display()))?;
        if let Some(base) = path.parent() {
            session.resolve_relative_to(base);
        }
        Ok(session)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for path in self.sounds.values_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Adds sounds found elsewhere without overriding names already listed.
    pub fn merge_sounds(&mut self, found: BTreeMap<String, PathBuf>) {
        for (name, path) in found {
            self.sounds.entry(name).or_insert(path);
        }
    }

    // every player must build a valid pattern, use a known sound, and start in range
    pub fn check(&self) -> anyhow::Result<()> {
        let config = self.scheduler.to_config()?;
        for spec in &self.players {
            spec.pattern()
                .with_context(|| format!("player '{}'", spec.name))?;
            config
                .tempo_range
                .check(spec.bpm)
                .with_context(|| format!("player '{}'", spec.name))?;
        }
        Ok(())
    }

    /// Names used by some player but missing from `sounds`.
    pub fn unmapped_sounds(&self) -> Vec<&str> {
        let mut missing: Vec<&str> = self
            .players
            .iter()
            .map(|p| p.sound.as_str())
            .filter(|s| !self.sounds.contains_key(*s))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    /// Only the sounds some player actually uses.
    pub fn used_sounds(&self) -> BTreeMap<String, PathBuf> {
        self.sounds
            .iter()
            .filter(|(name, _)| self.players.iter().any(|p| &p.sound == *name))
            .map(|(n, p)| (n.clone(), p.clone()))
            .collect()
    }
}
