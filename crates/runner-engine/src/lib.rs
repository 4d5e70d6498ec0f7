pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::types::{EntityId, ModelId, SoundEvent, GameEvent};
pub use components::entity::Entity;
pub use components::animation::{Animator, AnimationClip};
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use core::timers::{TimerQueue, TimerId};
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use input::queue::{InputEvent, InputQueue};
pub use input::keyboard::{KeyboardState, keys};
pub use assets::manifest::AssetManifest;
pub use bridge::protocol::{ProtocolLayout, FrameHeader, HEADER_FLOATS};
pub use systems::animation::tick_animations;
pub use systems::render::build_render_buffer;
pub use systems::rng::Rng;

#[cfg(feature = "physics")]
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial,
    CharacterCapsule, CharacterMove,
};

pub use extensions::{lerp, lerp_vec3};
