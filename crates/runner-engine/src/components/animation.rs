//! Animator component for named model animation clips.
//!
//! The engine does not sample skeletons; it tracks which clip is playing and
//! how far along it is, and the host renderer blends the actual poses.

use std::collections::HashMap;

/// Definition of a single animation clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClip {
    /// Clip index in the host's model, written into the render buffer.
    pub index: u32,
    /// Length of the clip in seconds.
    pub duration: f32,
    /// Whether to loop when reaching the end.
    pub looping: bool,
}

impl AnimationClip {
    pub fn looping(index: u32, duration: f32) -> Self {
        Self { index, duration, looping: true }
    }

    pub fn once(index: u32, duration: f32) -> Self {
        Self { index, duration, looping: false }
    }
}

/// Animation state for an entity.
#[derive(Debug, Clone)]
pub struct Animator {
    /// Named clips available for this entity.
    pub clips: HashMap<String, AnimationClip>,
    /// Currently playing clip name.
    pub current: String,
    /// Time into the current clip.
    pub time: f32,
    /// Playback speed multiplier (1.0 = normal).
    pub speed: f32,
    /// Set when a one-shot clip reaches its end.
    pub finished: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            clips: HashMap::new(),
            current: String::new(),
            time: 0.0,
            speed: 1.0,
            finished: false,
        }
    }
}

impl Animator {
    /// Create with a set of named clips; nothing plays until `play`.
    pub fn new(clips: HashMap<String, AnimationClip>) -> Self {
        Self {
            clips,
            ..Default::default()
        }
    }

    /// Add a clip.
    pub fn add(&mut self, name: impl Into<String>, clip: AnimationClip) {
        self.clips.insert(name.into(), clip);
    }

    /// Builder form of `add`.
    pub fn with_clip(mut self, name: impl Into<String>, clip: AnimationClip) -> Self {
        self.add(name, clip);
        self
    }

    /// Switch to a clip. Playing the clip that is already current is a no-op,
    /// so callers may request it every step. Returns `true` if the clip changed.
    /// Unknown names are ignored.
    pub fn play(&mut self, name: &str) -> bool {
        if self.current == name {
            return false;
        }
        if !self.clips.contains_key(name) {
            log::warn!("Animator: unknown clip '{}'", name);
            return false;
        }
        self.current = name.to_string();
        self.time = 0.0;
        self.finished = false;
        true
    }

    /// Restart a clip even if it is already playing.
    pub fn replay(&mut self, name: &str) -> bool {
        self.current.clear();
        self.play(name)
    }

    /// The current clip definition.
    pub fn current_clip(&self) -> Option<&AnimationClip> {
        self.clips.get(&self.current)
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.current == name
    }

    /// Advance playback by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let Some(clip) = self.clips.get(&self.current).copied() else {
            return;
        };
        if self.finished || clip.duration <= 0.0 {
            return;
        }

        self.time += dt * self.speed;
        if self.time >= clip.duration {
            if clip.looping {
                self.time %= clip.duration;
            } else {
                self.time = clip.duration;
                self.finished = true;
            }
        }
    }

    /// Normalized playback position [0, 1].
    pub fn progress(&self) -> f32 {
        match self.current_clip() {
            Some(clip) if clip.duration > 0.0 => (self.time / clip.duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}
