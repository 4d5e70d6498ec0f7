use bytemuck::{Pod, Zeroable};

/// Per-instance render data written to SharedArrayBuffer for the host renderer.
/// Must match the host protocol: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// World-space size along each axis.
    pub scale_x: f32,
    pub scale_y: f32,
    pub scale_z: f32,
    /// Model index (`ModelId`).
    pub model: f32,
    /// Animation clip index plus normalized clip progress in the fraction
    /// (e.g. `2.25` = clip 2, a quarter through). `-1.0` when not animated.
    pub animation: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    /// Pack a clip index and progress into the `animation` field.
    /// Progress is kept just below 1.0 so the integer part stays the clip.
    pub fn pack_animation(clip: u32, progress: f32) -> f32 {
        clip as f32 + progress.clamp(0.0, 0.999)
    }
}

/// Render buffer containing all model instances for this frame.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for SharedArrayBuffer reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_instance_is_8_floats() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), RenderInstance::STRIDE_BYTES);
        assert_eq!(RenderInstance::FLOATS, 8);
    }

    #[test]
    fn pack_animation_keeps_clip_in_integer_part() {
        assert_eq!(RenderInstance::pack_animation(2, 0.25), 2.25);
        assert_eq!(RenderInstance::pack_animation(3, 1.0).floor(), 3.0);
    }

    #[test]
    fn render_buffer_push_and_count() {
        let mut buf = RenderBuffer::new();
        buf.push(RenderInstance::default());
        buf.push(RenderInstance::default());
        assert_eq!(buf.instance_count(), 2);
        buf.clear();
        assert_eq!(buf.instance_count(), 0);
    }
}
