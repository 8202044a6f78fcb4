use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::SoundError;

use super::{PlaybackHandle, SoundProvider};

#[derive(Clone, Debug, PartialEq)]
pub struct CommitRecord {
    pub name: String,
    pub time: f64,
    pub cancelled: bool,
}

// each entry keeps the id of the handle that can cancel it
type Log = Rc<RefCell<Vec<(u64, CommitRecord)>>>;

/// A provider that plays nothing and remembers every commit.
///
/// Used for dry runs of a session and for tests. Clones share one log.
#[derive(Clone, Debug, Default)]
pub struct RecordingProvider {
    log: Log,
    next_id: Rc<Cell<u64>>,
    known: Option<HashSet<String>>,
}

impl RecordingProvider {
    /// Accepts any sound name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only `names` count as loaded; anything else fails with `NotLoaded`.
    pub fn with_sounds<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            log: Rc::default(),
            next_id: Rc::default(),
            known: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.log.borrow().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Commit times that were never cancelled, in commit order.
    pub fn live_times(&self) -> Vec<f64> {
        self.log
            .borrow()
            .iter()
            .map(|(_, c)| c)
            .filter(|c| !c.cancelled)
            .map(|c| c.time)
            .collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl SoundProvider for RecordingProvider {
    type Handle = RecordedPlayback;

    fn start_at(&self, name: &str, time: f64) -> Result<RecordedPlayback, SoundError> {
        if let Some(known) = &self.known {
            if !known.contains(name) {
                return Err(SoundError::NotLoaded(name.to_string()));
            }
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.log.borrow_mut().push((
            id,
            CommitRecord {
                name: name.to_string(),
                time,
                cancelled: false,
            },
        ));
        Ok(RecordedPlayback {
            log: Rc::clone(&self.log),
            id,
        })
    }
}

#[derive(Debug)]
pub struct RecordedPlayback {
    log: Log,
    id: u64,
}

impl PlaybackHandle for RecordedPlayback {
    fn cancel(&mut self) {
        // a cleared log no longer holds the record
        let mut log = self.log.borrow_mut();
        if let Some((_, record)) = log.iter_mut().find(|(id, _)| *id == self.id) {
            record.cancelled = true;
        }
    }
}
