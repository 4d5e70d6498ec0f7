use crate::api::types::{EntityId, SoundEvent, GameEvent, ModelId};
use crate::assets::manifest::AssetManifest;
use crate::core::scene::Scene;
use crate::core::timers::TimerQueue;
use crate::input::keyboard::KeyboardState;
use crate::input::queue::InputQueue;
use crate::renderer::instance::RenderBuffer;
use crate::systems::animation::tick_animations;
#[cfg(feature = "physics")]
use crate::core::physics::{
    PhysicsWorld, BodyDesc, CharacterCapsule, CharacterMove, ColliderMaterial,
};
#[cfg(feature = "physics")]
use crate::components::entity::Entity;
#[cfg(feature = "physics")]
use glam::Vec3;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Maximum number of render instances (default: 256).
    pub max_instances: usize,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_instances: 256,
            max_sounds: 32,
            max_events: 32,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The game loop tick. `ctx.dt()` is the fixed step length and
    /// `ctx.keys` already reflects this step's input.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Optional read-only render pass for custom render commands.
    fn render(&self, _ctx: &mut RenderContext) {}

    /// Z position the host camera should follow.
    fn camera_z(&self) -> f32 {
        0.0
    }
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub keys: KeyboardState,
    pub timers: TimerQueue,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    pub manifest: Option<AssetManifest>,
    dt: f32,
    next_id: u32,
    #[cfg(feature = "physics")]
    pub physics: PhysicsWorld,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::from_config(&GameConfig::default())
    }

    /// Create an EngineContext matching the game's configuration.
    pub fn from_config(config: &GameConfig) -> Self {
        #[cfg(feature = "physics")]
        let physics = {
            let mut world = PhysicsWorld::new();
            world.set_dt(config.fixed_dt);
            world
        };

        Self {
            scene: Scene::new(),
            keys: KeyboardState::new(),
            timers: TimerQueue::new(),
            sounds: Vec::with_capacity(config.max_sounds),
            events: Vec::with_capacity(config.max_events),
            manifest: None,
            dt: config.fixed_dt,
            next_id: 1,
            #[cfg(feature = "physics")]
            physics,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Length of the current simulation step in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Emit a sound event to be forwarded to the host.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    /// Emit a game event to be forwarded to the host.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Resolve a named sound from the loaded manifest, falling back to `default`.
    pub fn sound(&self, name: &str, default: SoundEvent) -> SoundEvent {
        self.manifest
            .as_ref()
            .and_then(|m| m.sound_event(name))
            .unwrap_or(default)
    }

    /// Resolve a named model from the loaded manifest, falling back to `default`.
    pub fn model(&self, name: &str, default: ModelId) -> ModelId {
        self.manifest
            .as_ref()
            .and_then(|m| m.model_id(name))
            .unwrap_or(default)
    }

    /// Parse and install an asset manifest. On error the previous manifest stays.
    pub fn load_manifest(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let manifest = AssetManifest::from_json(json)?;
        log::info!(
            "EngineContext: manifest loaded ({} sounds, {} models)",
            manifest.sounds.len(),
            manifest.models.len()
        );
        self.manifest = Some(manifest);
        Ok(())
    }

    /// Play a clip on an entity's animator. No-op if the entity has none.
    pub fn play_animation(&mut self, id: EntityId, clip: &str) {
        if let Some(animator) = self.scene.get_mut(id).and_then(|e| e.animator.as_mut()) {
            animator.play(clip);
        }
    }

    /// Clear per-frame transient data (sounds, events).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }

    /// Prepare a simulation step: record `dt`, fold the queued input into
    /// `keys`, advance timers. Called by the game runner before `Game::update`.
    pub fn begin_step(&mut self, dt: f32, input: &InputQueue) {
        self.dt = dt;
        self.keys.update(input);
        self.timers.tick(dt);
    }

    /// Finish a simulation step: advance animators and (with physics) step the
    /// world. Called by the game runner after `Game::update`.
    pub fn end_step(&mut self) {
        tick_animations(&mut self.scene, self.dt);
        #[cfg(feature = "physics")]
        self.step_physics();
    }

    // -- Physics convenience methods --

    /// Spawn an entity with a physics body. Returns the EntityId.
    /// The entity's position is set from the BodyDesc.
    #[cfg(feature = "physics")]
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity.with_pos(desc.position).with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    #[cfg(feature = "physics")]
    pub fn despawn(&mut self, id: EntityId) {
        if let Some(entity) = self.scene.despawn(id) {
            if let Some(body) = &entity.body {
                self.physics.remove_body(body);
            }
        }
    }

    /// Move a character entity by `translation` (world units for this step).
    /// Returns an empty move if the entity has no body.
    #[cfg(feature = "physics")]
    pub fn move_character(&mut self, id: EntityId, translation: Vec3) -> CharacterMove {
        let dt = self.dt;
        match self.scene.get(id).and_then(|e| e.body) {
            Some(body) => self.physics.move_character(&body, translation, dt),
            None => CharacterMove::default(),
        }
    }

    /// Place an entity (and its body) at `pos` immediately.
    #[cfg(feature = "physics")]
    pub fn set_position(&mut self, id: EntityId, pos: Vec3) {
        if let Some(entity) = self.scene.get_mut(id) {
            entity.pos = pos;
            if let Some(body) = &entity.body {
                self.physics.teleport(body, pos);
            }
        }
    }

    /// Swap the capsule of a character entity. The entity follows the body
    /// if the swap shifted it.
    #[cfg(feature = "physics")]
    pub fn set_character_capsule(&mut self, id: EntityId, capsule: CharacterCapsule) {
        if let Some(entity) = self.scene.get_mut(id) {
            if let Some(body) = &entity.body {
                self.physics.set_character_capsule(body, capsule);
                entity.pos = self.physics.body_position(body);
            }
        }
    }

    /// Current capsule of a character entity.
    #[cfg(feature = "physics")]
    pub fn character_capsule(&self, id: EntityId) -> Option<CharacterCapsule> {
        let body = self.scene.get(id)?.body?;
        self.physics.character_capsule(&body)
    }

    /// Step the physics simulation and sync positions back to entities.
    #[cfg(feature = "physics")]
    pub fn step_physics(&mut self) {
        self.physics.step();

        // Sync Rapier body positions back to entity positions
        for entity in self.scene.iter_mut() {
            if let Some(body) = &entity.body {
                entity.pos = self.physics.body_position(body);
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render context for optional custom render commands.
pub struct RenderContext<'a> {
    pub render_buffer: &'a mut RenderBuffer,
}
