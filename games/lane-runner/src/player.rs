//! Player movement: three lanes, jump, slide, and game over on obstacle contact.
//!
//! One step runs `detect_input` -> `control_lanes` -> `vertical_motion` ->
//! `move_character`. The physics character body resolves the move; any
//! obstacle it touches ends the run.

use glam::Vec3;
use runner_engine::{
    keys, lerp_vec3, AnimationClip, Animator, CharacterCapsule, EngineContext, EntityId, TimerId,
};

use crate::config::RunnerConfig;
use crate::manager::{GameManager, GameState};
use crate::track::OBSTACLE_TAG;

pub const PLAYER_TAG: &str = "player";

/// Sound ids used when the asset manifest does not name them.
pub mod sounds {
    use runner_engine::SoundEvent;

    pub const JUMP: SoundEvent = SoundEvent(1);
    pub const SLIDE: SoundEvent = SoundEvent(2);
    pub const COLLISION: SoundEvent = SoundEvent(3);
}

/// Animation clip names on the player's animator.
pub mod clips {
    pub const RUN: &str = "run";
    pub const JUMP: &str = "jump";
    pub const SLIDE: &str = "slide";
    pub const COLLISION: &str = "collision";
}

/// Animator with the clips the controller plays.
pub fn player_animator() -> Animator {
    Animator::default()
        .with_clip(clips::RUN, AnimationClip::looping(0, 0.8))
        .with_clip(clips::JUMP, AnimationClip::once(1, 1.0))
        .with_clip(clips::SLIDE, AnimationClip::once(2, 1.0))
        .with_clip(clips::COLLISION, AnimationClip::once(3, 1.2))
}

/// The input direction detected this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Left,
    Right,
    Down,
}

pub struct PlayerController {
    config: RunnerConfig,
    entity: Option<EntityId>,
    /// -1 left, 0 center, 1 right.
    lane: i32,
    vertical_speed: f32,
    /// Lateral velocity; only `x` is used.
    desired: Vec3,
    /// Lane x the lateral velocity is heading for, if still moving.
    lane_target: Option<f32>,
    direction: Direction,
    jumping: bool,
    sliding: bool,
    /// Grounded flag reported by the previous move.
    grounded: bool,
    slide_timer: Option<TimerId>,
    standing: CharacterCapsule,
}

impl PlayerController {
    pub fn new(config: RunnerConfig) -> Self {
        let standing = config.standing_collider.capsule();
        Self {
            config,
            entity: None,
            lane: 0,
            vertical_speed: 0.0,
            desired: Vec3::ZERO,
            lane_target: None,
            direction: Direction::None,
            jumping: false,
            sliding: false,
            grounded: false,
            slide_timer: None,
            standing,
        }
    }

    /// Attach to the player entity and remember its standing capsule.
    pub fn init(&mut self, ctx: &EngineContext, id: EntityId) {
        self.entity = Some(id);
        match ctx.character_capsule(id) {
            Some(capsule) => self.standing = capsule,
            None => log::warn!("PlayerController: entity {:?} has no character capsule", id),
        }
    }

    /// Run one simulation step.
    pub fn update(&mut self, ctx: &mut EngineContext, manager: &mut GameManager) {
        let Some(id) = self.entity else {
            return;
        };

        // A slide that runs out restores the collider whatever the run state.
        self.poll_slide_timer(ctx, id);

        if matches!(manager.state(), GameState::Start | GameState::GameOver) {
            return;
        }

        self.detect_input(ctx);
        self.control_lanes(ctx, id);
        self.vertical_motion(ctx, id);
        self.move_character(ctx, manager, id);
    }

    /// Put the player back at `start`, standing in the center lane.
    pub fn reset(&mut self, ctx: &mut EngineContext, start: Vec3) {
        if let Some(timer) = self.slide_timer.take() {
            ctx.timers.cancel(timer);
        }
        self.lane = 0;
        self.vertical_speed = 0.0;
        self.desired = Vec3::ZERO;
        self.lane_target = None;
        self.direction = Direction::None;
        self.jumping = false;
        self.sliding = false;
        self.grounded = false;

        if let Some(id) = self.entity {
            ctx.set_character_capsule(id, self.standing);
            ctx.set_position(id, start);
            ctx.play_animation(id, clips::RUN);
        }
    }

    fn poll_slide_timer(&mut self, ctx: &mut EngineContext, id: EntityId) {
        let Some(timer) = self.slide_timer else {
            return;
        };
        if ctx.timers.take_fired(timer) {
            self.slide_timer = None;
            self.sliding = false;
            ctx.set_character_capsule(id, self.standing);
            log::debug!("PlayerController: slide finished");
        }
    }

    /// First key pressed this step wins, in the order left, right, down, up.
    fn detect_input(&mut self, ctx: &EngineContext) {
        let pressed = |key: u32, alt: u32| ctx.keys.just_pressed(key) || ctx.keys.just_pressed(alt);

        self.direction = if pressed(keys::A, keys::ARROW_LEFT) {
            self.lane -= 1;
            Direction::Left
        } else if pressed(keys::D, keys::ARROW_RIGHT) {
            self.lane += 1;
            Direction::Right
        } else if pressed(keys::S, keys::ARROW_DOWN) {
            Direction::Down
        } else if pressed(keys::W, keys::ARROW_UP) {
            Direction::Up
        } else {
            Direction::None
        };

        self.lane = self.lane.clamp(-1, 1);
        if matches!(self.direction, Direction::Left | Direction::Right) {
            log::debug!("PlayerController: lane {}", self.lane);
        }
    }

    fn control_lanes(&mut self, ctx: &mut EngineContext, id: EntityId) {
        let Some(x) = ctx.scene.get(id).map(|e| e.pos.x) else {
            return;
        };
        let tol = self.config.lane_tolerance;

        let target = self.config.lane_x(self.lane);
        match self.lane {
            -1 => self.move_horizontal(ctx, id, x, target, Vec3::NEG_X),
            1 => self.move_horizontal(ctx, id, x, target, Vec3::X),
            _ => {
                if x > tol {
                    self.move_horizontal(ctx, id, x, target, Vec3::NEG_X);
                } else if x < -tol {
                    self.move_horizontal(ctx, id, x, target, Vec3::X);
                } else {
                    // Close enough: stop, or the player jitters around the center.
                    self.desired = Vec3::ZERO;
                    self.lane_target = None;
                }
            }
        }
    }

    fn move_horizontal(
        &mut self,
        ctx: &mut EngineContext,
        id: EntityId,
        x: f32,
        target_x: f32,
        dir: Vec3,
    ) {
        if (x - target_x).abs() > self.config.lane_tolerance {
            let t = ctx.dt() * self.config.lateral_blend;
            self.desired = lerp_vec3(self.desired, dir * self.config.lateral_speed, t);
            self.lane_target = Some(target_x);
        } else {
            self.desired = Vec3::ZERO;
            self.lane_target = None;
            if let Some(pos) = ctx.scene.get(id).map(|e| e.pos) {
                if pos.x != target_x {
                    ctx.set_position(id, Vec3::new(target_x, pos.y, pos.z));
                }
            }
        }
    }

    fn vertical_motion(&mut self, ctx: &mut EngineContext, id: EntityId) {
        if self.grounded {
            self.jumping = false;
            self.vertical_speed = 0.0;

            if !self.sliding && !self.jumping {
                ctx.play_animation(id, clips::RUN);
            }

            match self.direction {
                Direction::Up => {
                    let sound = ctx.sound("jump", sounds::JUMP);
                    ctx.emit_sound(sound);
                    self.jumping = true;
                    self.vertical_speed = self.config.jump_speed;
                    ctx.play_animation(id, clips::JUMP);

                    if let Some(timer) = self.slide_timer.take() {
                        ctx.timers.cancel(timer);
                        self.sliding = false;
                        ctx.set_character_capsule(id, self.standing);
                    }
                    log::debug!("PlayerController: jump");
                }
                Direction::Down => {
                    // Already sliding: this step keeps its vertical speed at zero.
                    if self.sliding {
                        return;
                    }
                    self.start_slide(ctx, id);
                }
                _ => {}
            }
        } else if self.direction == Direction::Down {
            self.vertical_speed -= self.config.jump_speed;
            self.start_slide(ctx, id);
        }

        self.vertical_speed -= self.config.gravity * ctx.dt();
    }

    fn start_slide(&mut self, ctx: &mut EngineContext, id: EntityId) {
        if let Some(timer) = self.slide_timer.take() {
            ctx.timers.cancel(timer);
        }

        let sound = ctx.sound("slide", sounds::SLIDE);
        ctx.emit_sound(sound);
        self.sliding = true;
        ctx.play_animation(id, clips::SLIDE);
        ctx.set_character_capsule(id, self.config.slide_collider.capsule());
        self.slide_timer = Some(ctx.timers.schedule(self.config.slide_duration));
        log::debug!("PlayerController: slide");
    }

    fn move_character(&mut self, ctx: &mut EngineContext, manager: &mut GameManager, id: EntityId) {
        let dt = ctx.dt();
        let mut step = Vec3::new(self.desired.x, self.vertical_speed, self.config.forward_speed) * dt;

        // Stop on the lane instead of running past it.
        if let (Some(target), Some(x)) = (self.lane_target, ctx.scene.get(id).map(|e| e.pos.x)) {
            let remaining = target - x;
            if step.x * remaining > 0.0 && step.x.abs() > remaining.abs() {
                step.x = remaining;
            }
        }

        let result = ctx.move_character(id, step);
        self.grounded = result.grounded;

        for hit in result.hits {
            self.on_hit(ctx, manager, hit);
        }
    }

    /// React to the character body touching `hit`.
    pub fn on_hit(&mut self, ctx: &mut EngineContext, manager: &mut GameManager, hit: EntityId) {
        if !ctx.scene.has_tag(hit, OBSTACLE_TAG) || manager.is(GameState::GameOver) {
            return;
        }

        let sound = ctx.sound("collision", sounds::COLLISION);
        ctx.emit_sound(sound);
        if let Some(id) = self.entity {
            ctx.play_animation(id, clips::COLLISION);
        }
        log::info!("PlayerController: hit obstacle {:?}", hit);
        manager.change_state(ctx, GameState::GameOver);
    }

    // -- Accessors --

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn lane(&self) -> i32 {
        self.lane
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn vertical_speed(&self) -> f32 {
        self.vertical_speed
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_engine::{
        BodyDesc, ColliderDesc, ColliderMaterial, Entity, InputEvent, InputQueue, SoundEvent,
    };

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        ctx: EngineContext,
        player: PlayerController,
        manager: GameManager,
        id: EntityId,
        heard: Vec<SoundEvent>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(RunnerConfig::default())
        }

        /// Player standing on a long ground slab, run already started.
        fn with_config(config: RunnerConfig) -> Self {
            let mut ctx = EngineContext::new();

            let ground = ctx.next_id();
            ctx.spawn_with_body(
                Entity::new(ground).with_tag("ground"),
                BodyDesc::fixed(ColliderDesc::Cuboid {
                    half_extents: Vec3::new(10.0, 0.5, 500.0),
                })
                .with_position(Vec3::new(0.0, -0.5, 450.0)),
                ColliderMaterial::default(),
            );

            let id = ctx.next_id();
            ctx.spawn_with_body(
                Entity::new(id)
                    .with_tag(PLAYER_TAG)
                    .with_animator(player_animator()),
                BodyDesc::character(config.standing_collider.capsule())
                    .with_position(Vec3::new(0.0, 0.02, 0.0)),
                ColliderMaterial::default(),
            );
            ctx.step_physics();

            let mut player = PlayerController::new(config);
            player.init(&ctx, id);

            let mut manager = GameManager::new();
            manager.change_state(&mut ctx, GameState::Playing);

            Self {
                ctx,
                player,
                manager,
                id,
                heard: Vec::new(),
            }
        }

        /// One step with `tapped` keys pressed and released.
        fn step(&mut self, tapped: &[u32]) {
            let mut input = InputQueue::new();
            for &key_code in tapped {
                input.push(InputEvent::KeyDown { key_code });
                input.push(InputEvent::KeyUp { key_code });
            }
            self.ctx.clear_frame_data();
            self.ctx.begin_step(DT, &input);
            self.player.update(&mut self.ctx, &mut self.manager);
            self.ctx.end_step();
            self.heard.extend(self.ctx.sounds.iter().copied());
        }

        fn run(&mut self, steps: usize) {
            for _ in 0..steps {
                self.step(&[]);
            }
        }

        fn pos(&self) -> Vec3 {
            self.ctx.scene.get(self.id).unwrap().pos
        }

        fn playing(&self, clip: &str) -> bool {
            self.ctx
                .scene
                .get(self.id)
                .and_then(|e| e.animator.as_ref())
                .map_or(false, |a| a.is_playing(clip))
        }

        fn capsule(&self) -> CharacterCapsule {
            self.ctx.character_capsule(self.id).unwrap()
        }

        fn spawn_obstacle(&mut self, pos: Vec3, half_extents: Vec3) -> EntityId {
            let id = self.ctx.next_id();
            self.ctx.spawn_with_body(
                Entity::new(id).with_tag(OBSTACLE_TAG),
                BodyDesc::fixed(ColliderDesc::Cuboid { half_extents }).with_position(pos),
                ColliderMaterial::default(),
            );
            id
        }
    }

    #[test]
    fn init_captures_standing_capsule() {
        let h = Harness::new();
        assert!((h.player.standing.height - 2.0).abs() < 1e-5);
        assert!((h.player.standing.center_y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn idle_outside_playing_state() {
        let mut h = Harness::new();
        h.manager = GameManager::new();

        h.step(&[keys::D]);
        h.run(10);

        assert_eq!(h.player.lane(), 0);
        assert_eq!(h.player.direction(), Direction::None);
        assert!(h.heard.is_empty());
        assert!(h.pos().z.abs() < 1e-4);
    }

    #[test]
    fn runs_forward_on_the_ground() {
        let mut h = Harness::new();
        h.run(30);

        assert!(h.player.is_grounded());
        assert!(h.pos().z > 4.0, "z={}", h.pos().z);
        assert!(h.pos().y.abs() < 0.05, "y={}", h.pos().y);
        assert!(h.playing(clips::RUN));
        assert!(h.manager.is(GameState::Playing), "ground must not end the run");
    }

    #[test]
    fn input_priority_left_first() {
        let mut h = Harness::new();
        h.step(&[keys::W, keys::S, keys::D, keys::A]);
        assert_eq!(h.player.direction(), Direction::Left);
        assert_eq!(h.player.lane(), -1);

        h.step(&[keys::W, keys::S, keys::D]);
        assert_eq!(h.player.direction(), Direction::Right);
        assert_eq!(h.player.lane(), 0);
    }

    #[test]
    fn lane_is_clamped() {
        let mut h = Harness::new();
        h.step(&[keys::D]);
        h.step(&[keys::D]);
        assert_eq!(h.player.lane(), 1);

        for _ in 0..3 {
            h.step(&[keys::A]);
        }
        assert_eq!(h.player.lane(), -1);
    }

    #[test]
    fn lane_switch_settles_on_lane() {
        let mut h = Harness::new();
        h.run(5);
        h.step(&[keys::D]);
        h.run(30);

        assert!((h.pos().x - 3.1).abs() < 1e-3, "x={}", h.pos().x);
        assert_eq!(h.player.desired, Vec3::ZERO);

        h.step(&[keys::A]);
        h.run(30);
        assert!(h.pos().x.abs() <= 0.1, "x={}", h.pos().x);

        h.step(&[keys::ARROW_LEFT]);
        h.run(30);
        assert!((h.pos().x + 3.1).abs() < 1e-3, "x={}", h.pos().x);
    }

    #[test]
    fn jump_rises_and_lands() {
        let mut h = Harness::new();
        h.run(10);
        assert!(h.player.is_grounded());

        h.step(&[keys::W]);
        assert!(h.player.is_jumping());
        assert!((h.player.vertical_speed() - (15.0 - 20.0 * DT)).abs() < 1e-4);
        assert_eq!(h.heard, vec![sounds::JUMP]);
        assert!(h.playing(clips::JUMP));

        h.run(20);
        assert!(h.pos().y > 2.0, "y={}", h.pos().y);

        h.run(120);
        assert!(h.player.is_grounded());
        assert!(!h.player.is_jumping());
        assert!(h.pos().y.abs() < 0.05, "y={}", h.pos().y);
        assert!(h.playing(clips::RUN));
    }

    #[test]
    fn jump_is_never_dropped_on_flat_ground() {
        for k in 5..=60 {
            let mut h = Harness::new();
            h.run(k);
            assert!(h.player.is_grounded(), "not grounded after {} steps", k);

            h.step(&[keys::W]);
            assert!(h.player.is_jumping(), "jump ignored after {} steps", k);
            assert_eq!(h.heard, vec![sounds::JUMP], "after {} steps", k);
        }
    }

    #[test]
    fn fast_drop_lands_on_top_of_the_ground() {
        let mut h = Harness::new();
        h.run(10);
        h.step(&[keys::W]);
        h.run(5);
        assert!(!h.player.is_grounded());
        assert!(h.player.vertical_speed() > 0.0);

        h.step(&[keys::S]);
        assert!(h.player.is_sliding());

        let mut lowest = f32::MAX;
        for _ in 0..60 {
            h.step(&[]);
            lowest = lowest.min(h.pos().y + h.capsule().bottom());
        }
        assert!(lowest >= 0.0, "capsule sank to {}", lowest);
        assert!(h.player.is_grounded());

        h.run(120);
        assert!(!h.player.is_sliding());
        let y = h.pos().y;
        assert!((0.0..0.05).contains(&y), "y={}", y);
    }

    #[test]
    fn ground_slide_keeps_footing() {
        let mut h = Harness::new();
        h.run(10);
        h.step(&[keys::S]);
        for _ in 0..30 {
            h.step(&[]);
            assert!(h.player.is_grounded());
            assert!(h.pos().y + h.capsule().bottom() >= 0.0);
        }

        // Jumping straight out of a slide works.
        h.step(&[keys::W]);
        assert!(h.player.is_jumping());
        assert!(!h.player.is_sliding());
    }

    #[test]
    fn narrow_lanes_settle() {
        let config = RunnerConfig::from_json(r#"{ "left_lane_x": -0.5, "right_lane_x": 0.5 }"#)
            .unwrap();
        let mut h = Harness::with_config(config);
        h.run(1);
        h.step(&[keys::A]);
        h.run(59);
        assert!((h.pos().x + 0.5).abs() < 1e-3, "x={}", h.pos().x);

        h.step(&[keys::D]);
        h.step(&[keys::D]);
        h.run(58);
        assert!((h.pos().x - 0.5).abs() < 1e-3, "x={}", h.pos().x);
    }

    #[test]
    fn slide_shrinks_capsule_until_timer_fires() {
        let mut h = Harness::new();
        h.run(10);

        h.step(&[keys::S]);
        assert!(h.player.is_sliding());
        assert_eq!(h.heard, vec![sounds::SLIDE]);
        assert!(h.playing(clips::SLIDE));
        let capsule = h.capsule();
        assert!((capsule.height - 0.6).abs() < 1e-5);
        assert!((capsule.center_y - 0.35).abs() < 1e-5);

        h.run(60);
        assert!(h.player.is_sliding());

        h.run(65);
        assert!(!h.player.is_sliding());
        assert!((h.capsule().height - 2.0).abs() < 1e-5);
        assert!(h.player.slide_timer.is_none());
    }

    #[test]
    fn down_while_sliding_on_ground_skips_gravity() {
        let mut h = Harness::new();
        h.player.grounded = true;
        h.player.sliding = true;
        h.player.direction = Direction::Down;

        h.player.vertical_motion(&mut h.ctx, h.id);
        assert_eq!(h.player.vertical_speed(), 0.0);
        assert!(h.heard.is_empty());
    }

    #[test]
    fn airborne_down_drops_fast_and_slides() {
        let mut h = Harness::new();
        h.player.grounded = false;
        h.player.vertical_speed = 5.0;
        h.player.direction = Direction::Down;

        h.player.vertical_motion(&mut h.ctx, h.id);
        assert!((h.player.vertical_speed() - (5.0 - 15.0 - 20.0 * DT)).abs() < 1e-4);
        assert!(h.player.is_sliding());
        assert_eq!(h.ctx.sounds, vec![sounds::SLIDE]);
    }

    #[test]
    fn at_most_one_slide_reset_pending() {
        let mut h = Harness::new();
        h.player.start_slide(&mut h.ctx, h.id);
        h.player.start_slide(&mut h.ctx, h.id);
        assert_eq!(h.ctx.timers.pending_count(), 1);
    }

    #[test]
    fn jump_cancels_slide() {
        let mut h = Harness::new();
        h.player.start_slide(&mut h.ctx, h.id);
        h.player.grounded = true;
        h.player.direction = Direction::Up;

        h.player.vertical_motion(&mut h.ctx, h.id);
        assert!(h.player.is_jumping());
        assert!(!h.player.is_sliding());
        assert_eq!(h.ctx.timers.pending_count(), 0);
        assert!((h.capsule().height - 2.0).abs() < 1e-5);
    }

    #[test]
    fn obstacle_hit_ends_run() {
        let mut h = Harness::new();
        h.spawn_obstacle(Vec3::new(0.0, 1.0, 4.0), Vec3::new(1.0, 1.0, 0.25));
        h.run(60);

        assert!(h.manager.is(GameState::GameOver));
        assert_eq!(h.heard.iter().filter(|s| **s == sounds::COLLISION).count(), 1);
        assert!(h.playing(clips::COLLISION));

        let stopped = h.pos();
        assert!(stopped.z < 3.3, "z={}", stopped.z);
        h.run(10);
        assert_eq!(h.pos(), stopped);
    }

    #[test]
    fn hit_during_game_over_is_ignored() {
        let mut h = Harness::new();
        let obstacle = h.spawn_obstacle(Vec3::new(3.1, 1.0, 40.0), Vec3::ONE);
        h.manager.change_state(&mut h.ctx, GameState::GameOver);
        h.ctx.clear_frame_data();

        h.player.on_hit(&mut h.ctx, &mut h.manager, obstacle);
        assert!(h.ctx.sounds.is_empty());
        assert!(h.ctx.events.is_empty());
    }

    #[test]
    fn manifest_overrides_sound_ids() {
        let mut h = Harness::new();
        h.ctx
            .load_manifest(r#"{ "sounds": { "jump": { "path": "jump.ogg", "event_id": 9 } } }"#)
            .unwrap();
        h.run(10);
        h.step(&[keys::W]);
        assert_eq!(h.heard, vec![SoundEvent(9)]);
    }

    #[test]
    fn reset_returns_to_center_standing() {
        let mut h = Harness::new();
        h.run(5);
        h.step(&[keys::D]);
        h.step(&[keys::S]);
        h.run(5);

        h.player.reset(&mut h.ctx, Vec3::new(0.0, 0.02, 0.0));
        assert_eq!(h.player.lane(), 0);
        assert!(!h.player.is_sliding());
        assert_eq!(h.ctx.timers.pending_count(), 0);
        assert!((h.capsule().height - 2.0).abs() < 1e-5);
        assert_eq!(h.pos(), Vec3::new(0.0, 0.02, 0.0));
    }
}
