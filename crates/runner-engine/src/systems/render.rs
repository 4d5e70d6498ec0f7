use crate::components::entity::Entity;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Build the render buffer from a set of entities.
/// Inactive entities and entities without a model are skipped; at most
/// `max_instances` are written.
pub fn build_render_buffer<'a>(
    entities: impl Iterator<Item = &'a Entity>,
    buffer: &mut RenderBuffer,
    max_instances: usize,
) {
    buffer.clear();

    for entity in entities {
        if !entity.active {
            continue;
        }
        let Some(model) = entity.model else {
            continue;
        };
        if buffer.instances.len() >= max_instances {
            log::warn!("build_render_buffer: more than {} instances, dropping the rest", max_instances);
            break;
        }

        let animation = entity
            .animator
            .as_ref()
            .and_then(|a| a.current_clip().map(|clip| RenderInstance::pack_animation(clip.index, a.progress())))
            .unwrap_or(-1.0);

        buffer.push(RenderInstance {
            x: entity.pos.x,
            y: entity.pos.y,
            z: entity.pos.z,
            scale_x: entity.scale.x,
            scale_y: entity.scale.y,
            scale_z: entity.scale.z,
            model: model.0 as f32,
            animation,
        });
    }
}
