//! Run state (start screen, playing, game over) and score reporting.

use runner_engine::{EngineContext, GameEvent};

/// Game event kinds sent to the host UI.
pub mod game_events {
    /// `a` = new state code (see `GameState::code`).
    pub const STATE_CHANGED: f32 = 1.0;
    /// `a` = distance travelled, `b` = score.
    pub const SCORE: f32 = 2.0;
}

/// Points per world unit travelled.
const SCORE_PER_UNIT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Start,
    Playing,
    GameOver,
}

impl GameState {
    /// Numeric code carried in `STATE_CHANGED` events.
    pub fn code(self) -> f32 {
        match self {
            GameState::Start => 0.0,
            GameState::Playing => 1.0,
            GameState::GameOver => 2.0,
        }
    }
}

pub struct GameManager {
    state: GameState,
    start_z: f32,
    distance: f32,
}

impl GameManager {
    pub fn new() -> Self {
        Self {
            state: GameState::Start,
            start_z: 0.0,
            distance: 0.0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is(&self, state: GameState) -> bool {
        self.state == state
    }

    /// Switch to `new` and notify the host. Requesting the current state does nothing.
    pub fn change_state(&mut self, ctx: &mut EngineContext, new: GameState) {
        if self.state == new {
            return;
        }
        log::info!("GameManager: {:?} -> {:?}", self.state, new);
        self.state = new;
        ctx.emit_event(GameEvent::new(game_events::STATE_CHANGED, new.code()));
    }

    /// Start measuring distance from `z`.
    pub fn begin_run(&mut self, z: f32) {
        self.start_z = z;
        self.distance = 0.0;
    }

    /// Update the distance from the player's current `z` and report it.
    /// Only counts while playing; the last score stays visible after game over.
    pub fn track_progress(&mut self, ctx: &mut EngineContext, z: f32) {
        if self.state != GameState::Playing {
            return;
        }
        self.distance = (z - self.start_z).max(self.distance);
        ctx.emit_event(GameEvent {
            kind: game_events::SCORE,
            a: self.distance,
            b: self.score() as f32,
            c: 0.0,
        });
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn score(&self) -> u32 {
        (self.distance * SCORE_PER_UNIT) as u32
    }

    /// Back to the start screen with a fresh score.
    pub fn reset(&mut self, ctx: &mut EngineContext) {
        self.begin_run(0.0);
        self.change_state(ctx, GameState::Start);
    }
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_start_screen() {
        let manager = GameManager::new();
        assert_eq!(manager.state(), GameState::Start);
        assert_eq!(manager.score(), 0);
    }

    #[test]
    fn change_state_emits_event() {
        let mut ctx = EngineContext::new();
        let mut manager = GameManager::new();

        manager.change_state(&mut ctx, GameState::Playing);
        assert!(manager.is(GameState::Playing));
        assert_eq!(ctx.events, vec![GameEvent::new(game_events::STATE_CHANGED, 1.0)]);
    }

    #[test]
    fn same_state_is_a_noop() {
        let mut ctx = EngineContext::new();
        let mut manager = GameManager::new();
        manager.change_state(&mut ctx, GameState::GameOver);
        manager.change_state(&mut ctx, GameState::GameOver);
        assert_eq!(ctx.events.len(), 1);
    }

    #[test]
    fn distance_only_counts_while_playing() {
        let mut ctx = EngineContext::new();
        let mut manager = GameManager::new();
        manager.begin_run(5.0);

        manager.track_progress(&mut ctx, 20.0);
        assert_eq!(manager.distance(), 0.0);

        manager.change_state(&mut ctx, GameState::Playing);
        manager.track_progress(&mut ctx, 20.0);
        assert_eq!(manager.distance(), 15.0);
        assert_eq!(manager.score(), 15);

        let last = ctx.events.last().copied().unwrap();
        assert_eq!(last.kind, game_events::SCORE);
        assert_eq!(last.b, 15.0);

        manager.change_state(&mut ctx, GameState::GameOver);
        manager.track_progress(&mut ctx, 40.0);
        assert_eq!(manager.distance(), 15.0);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut ctx = EngineContext::new();
        let mut manager = GameManager::new();
        manager.change_state(&mut ctx, GameState::Playing);
        manager.track_progress(&mut ctx, 30.0);
        manager.change_state(&mut ctx, GameState::GameOver);

        manager.reset(&mut ctx);
        assert!(manager.is(GameState::Start));
        assert_eq!(manager.score(), 0);
    }
}
