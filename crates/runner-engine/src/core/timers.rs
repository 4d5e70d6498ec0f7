// core/timers.rs
//
// Deferred one-shot actions measured in simulated time.
//
// Usage:
//   let id = ctx.timers.schedule(2.0);
//   ...
//   if ctx.timers.take_fired(id) { /* run the deferred action */ }
//
// The queue is ticked by `EngineContext::begin_step`, so a timer that
// expires during step N is observable by `Game::update` in step N.

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    remaining: f32,
}

/// One-shot timers keyed by `TimerId`.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<Timer>,
    fired: Vec<TimerId>,
    next_id: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer that fires after `delay` seconds of simulated time.
    pub fn schedule(&mut self, delay: f32) -> TimerId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = TimerId(self.next_id);
        self.pending.push(Timer {
            id,
            remaining: delay.max(0.0),
        });
        id
    }

    /// Cancel a pending timer. Returns `true` if it was still pending.
    /// A timer that already fired but was not taken is also discarded.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.fired.retain(|f| *f != id);
        match self.pending.iter().position(|t| t.id == id) {
            Some(idx) => {
                self.pending.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Advance all timers. Expired timers move to the fired list, which is
    /// replaced on every tick.
    pub fn tick(&mut self, dt: f32) {
        self.fired.clear();
        let mut i = 0;
        while i < self.pending.len() {
            self.pending[i].remaining -= dt;
            if self.pending[i].remaining <= 0.0 {
                let timer = self.pending.swap_remove(i);
                self.fired.push(timer.id);
            } else {
                i += 1;
            }
        }
    }

    /// Consume the fired notification for `id`. Returns `true` once, in the
    /// step the timer expired.
    pub fn take_fired(&mut self, id: TimerId) -> bool {
        match self.fired.iter().position(|f| *f == id) {
            Some(idx) => {
                self.fired.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    /// Seconds until `id` fires, if pending.
    pub fn remaining(&self, id: TimerId) -> Option<f32> {
        self.pending.iter().find(|t| t.id == id).map(|t| t.remaining)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.fired.clear();
    }
}
