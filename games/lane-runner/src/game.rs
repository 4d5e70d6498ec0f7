//! Lane runner: the player dodges obstacle rows on an endless three-lane track.

use glam::Vec3;
use runner_engine::api::game::GameConfig;
use runner_engine::input::queue::InputQueue;
use runner_engine::{
    keys, BodyDesc, ColliderMaterial, EngineContext, Entity, Game, ModelId,
};

use crate::config::{ConfigError, RunnerConfig};
use crate::manager::{GameManager, GameState};
use crate::player::{clips, player_animator, PlayerController, PLAYER_TAG};
use crate::track::Track;

/// Feet slightly above the ground so the first step settles onto it.
const PLAYER_START: Vec3 = Vec3::new(0.0, 0.02, 0.0);
const PLAYER_MODEL: ModelId = ModelId(0);

/// Custom event kinds from the host UI.
pub mod events {
    pub const START: u32 = 1;
    pub const RESTART: u32 = 2;
}

pub struct RunnerGame {
    config: RunnerConfig,
    manager: GameManager,
    player: PlayerController,
    track: Track,
    /// Config waiting for the run to stop before it is applied.
    pending_config: Option<RunnerConfig>,
    camera_z: f32,
}

impl RunnerGame {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            manager: GameManager::new(),
            player: PlayerController::new(config.clone()),
            track: Track::new(&config),
            config,
            pending_config: None,
            camera_z: PLAYER_START.z,
        }
    }

    /// Parse a JSON config. It takes effect on the next step outside a run.
    pub fn configure(&mut self, json: &str) -> Result<(), ConfigError> {
        let config = RunnerConfig::from_json(json)?;
        self.pending_config = Some(config);
        Ok(())
    }

    pub fn manager(&self) -> &GameManager {
        &self.manager
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn runner_config(&self) -> &RunnerConfig {
        &self.config
    }

    fn player_z(&self, ctx: &EngineContext) -> Option<f32> {
        let id = self.player.entity()?;
        ctx.scene.get(id).map(|e| e.pos.z)
    }

    fn start_run(&mut self, ctx: &mut EngineContext) {
        let z = self.player_z(ctx).unwrap_or(PLAYER_START.z);
        self.manager.begin_run(z);
        self.manager.change_state(ctx, GameState::Playing);
    }

    /// Back to the start screen with a fresh track.
    fn restart(&mut self, ctx: &mut EngineContext) {
        self.player.reset(ctx, PLAYER_START);
        self.track.start(ctx, PLAYER_START.z);
        self.manager.reset(ctx);
        self.camera_z = PLAYER_START.z;
    }

    fn apply_pending_config(&mut self, ctx: &mut EngineContext) {
        let Some(config) = self.pending_config.take() else {
            return;
        };

        let entity = self.player.entity();
        self.track.clear(ctx);
        self.player = PlayerController::new(config.clone());
        if let Some(id) = entity {
            ctx.set_character_capsule(id, config.standing_collider.capsule());
            self.player.init(ctx, id);
        }
        self.track = Track::new(&config);
        self.config = config;
        log::info!("RunnerGame: config applied");

        self.restart(ctx);
    }
}

impl Default for RunnerGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for RunnerGame {
    fn config(&self) -> GameConfig {
        GameConfig {
            max_instances: 512,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        let id = ctx.next_id();
        let model = ctx.model("player", PLAYER_MODEL);
        ctx.spawn_with_body(
            Entity::new(id)
                .with_tag(PLAYER_TAG)
                .with_model(model)
                .with_animator(player_animator()),
            BodyDesc::character(self.config.standing_collider.capsule()).with_position(PLAYER_START),
            ColliderMaterial::default(),
        );
        ctx.play_animation(id, clips::RUN);

        self.player.init(ctx, id);
        self.track.start(ctx, PLAYER_START.z);
        log::info!("RunnerGame: ready, press Space to run");
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        if !self.manager.is(GameState::Playing) {
            self.apply_pending_config(ctx);
        }

        let confirm = ctx.keys.just_pressed(keys::SPACE) || ctx.keys.just_pressed(keys::ENTER);
        match self.manager.state() {
            GameState::Start => {
                if confirm || input.custom(events::START).next().is_some() {
                    self.start_run(ctx);
                }
            }
            GameState::GameOver => {
                if input.custom(events::RESTART).next().is_some() {
                    self.restart(ctx);
                }
            }
            GameState::Playing => {}
        }

        self.player.update(ctx, &mut self.manager);

        if let Some(z) = self.player_z(ctx) {
            self.camera_z = z;
            self.track.update(ctx, z);
            self.manager.track_progress(ctx, z);
        }
    }

    fn camera_z(&self) -> f32 {
        self.camera_z
    }
}
