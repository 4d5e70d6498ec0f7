//! Animation system: advances every entity's animator.

use crate::core::scene::Scene;

/// Tick all entity animators by `dt` seconds.
///
/// Called once per simulation step by `EngineContext::end_step`.
pub fn tick_animations(scene: &mut Scene, dt: f32) {
    for entity in scene.iter_mut() {
        if !entity.active {
            continue;
        }
        if let Some(ref mut animator) = entity.animator {
            animator.tick(dt);
        }
    }
}
