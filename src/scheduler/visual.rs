// Deferred highlight triggers. Each one is keyed by a token so pause/stop can
// drain them explicitly instead of leaving callbacks in flight.

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualToken(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisualEvent {
    StepHighlighted { step: usize, at: f64 },
    HighlightCleared,
}

#[derive(Clone, Copy, Debug)]
struct Trigger {
    fire_at: f64,
    step: usize,
}

#[derive(Debug, Default)]
pub struct VisualQueue {
    next_token: u64,
    triggers: BTreeMap<VisualToken, Trigger>,
}

impl VisualQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, fire_at: f64, step: usize) -> VisualToken {
        let token = VisualToken(self.next_token);
        self.next_token += 1;
        self.triggers.insert(token, Trigger { fire_at, step });
        token
    }

    pub fn cancel(&mut self, token: VisualToken) -> bool {
        self.triggers.remove(&token).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.triggers.len();
        self.triggers.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Removes every trigger due at `now` and returns them, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<VisualEvent> {
        let mut due: Vec<(VisualToken, Trigger)> = self
            .triggers
            .iter()
            .filter(|(_, t)| t.fire_at <= now)
            .map(|(k, t)| (*k, *t))
            .collect();
        for (token, _) in &due {
            self.triggers.remove(token);
        }
        // tokens break ties so equal times keep scheduling order
        due.sort_by(|a, b| a.1.fire_at.total_cmp(&b.1.fire_at).then(a.0.cmp(&b.0)));
        due.into_iter()
            .map(|(_, t)| VisualEvent::StepHighlighted {
                step: t.step,
                at: t.fire_at,
            })
            .collect()
    }
}
