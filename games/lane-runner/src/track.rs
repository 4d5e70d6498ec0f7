//! Streams ground and obstacle rows ahead of the player and drops them once
//! they fall behind.

use glam::Vec3;
use runner_engine::{
    lerp, BodyDesc, ColliderDesc, ColliderMaterial, EngineContext, Entity, EntityId, ModelId, Rng,
};

use crate::config::{RunnerConfig, TrackConfig};

pub const GROUND_TAG: &str = "ground";
pub const OBSTACLE_TAG: &str = "obstacle";

/// Model ids used when the asset manifest does not name them.
pub mod models {
    use runner_engine::ModelId;

    pub const GROUND: ModelId = ModelId(1);
    pub const BARRIER: ModelId = ModelId(2);
    pub const OVERHEAD: ModelId = ModelId(3);
}

const GROUND_THICKNESS: f32 = 1.0;
/// Ground extends this far past the outer lanes.
const GROUND_MARGIN: f32 = 1.5;
/// Obstacle half width; keeps neighbouring lanes clear.
const OBSTACLE_HALF_WIDTH: f32 = 1.2;
const OBSTACLE_HALF_DEPTH: f32 = 0.3;

/// Obstacle shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Knee-high barrier. Jump over it.
    Barrier,
    /// Bar with a gap underneath. Slide under it.
    Overhead,
}

impl ObstacleKind {
    /// Bottom and top of the obstacle above the ground.
    fn span(self) -> (f32, f32) {
        match self {
            ObstacleKind::Barrier => (0.0, 1.0),
            ObstacleKind::Overhead => (1.0, 4.0),
        }
    }

    fn half_extents(self) -> Vec3 {
        let (bottom, top) = self.span();
        Vec3::new(OBSTACLE_HALF_WIDTH, (top - bottom) * 0.5, OBSTACLE_HALF_DEPTH)
    }

    fn center_y(self) -> f32 {
        let (bottom, top) = self.span();
        (bottom + top) * 0.5
    }

    fn model_name(self) -> (&'static str, ModelId) {
        match self {
            ObstacleKind::Barrier => ("barrier", models::BARRIER),
            ObstacleKind::Overhead => ("overhead", models::OVERHEAD),
        }
    }
}

/// A spawned track entity and the z where it ends.
#[derive(Debug, Clone, Copy)]
struct Piece {
    id: EntityId,
    end_z: f32,
}

pub struct Track {
    config: TrackConfig,
    lanes: [f32; 3],
    ground_half_width: f32,
    rng: Rng,
    /// Start of the next ground segment.
    next_segment_z: f32,
    /// Z of the next obstacle row.
    next_row_z: f32,
    /// Z where the current run started; spacing ramps from here.
    origin_z: f32,
    pieces: Vec<Piece>,
}

impl Track {
    pub fn new(config: &RunnerConfig) -> Self {
        let outer = config.left_lane_x.abs().max(config.right_lane_x.abs());
        Self {
            config: config.track.clone(),
            lanes: [config.left_lane_x, 0.0, config.right_lane_x],
            ground_half_width: outer + GROUND_MARGIN,
            rng: Rng::new(config.track.seed),
            next_segment_z: 0.0,
            next_row_z: 0.0,
            origin_z: 0.0,
            pieces: Vec::new(),
        }
    }

    /// Lay out the first window around `player_z`.
    pub fn start(&mut self, ctx: &mut EngineContext, player_z: f32) {
        self.clear(ctx);
        self.origin_z = player_z;
        self.next_segment_z = player_z - self.config.segment_length;
        self.next_row_z = player_z + self.config.safe_distance;
        self.update(ctx, player_z);
        log::info!(
            "Track: started at z={} with {} pieces (seed {})",
            player_z,
            self.pieces.len(),
            self.config.seed
        );
    }

    /// Extend the track to `view_distance` ahead of the player and drop
    /// pieces more than `despawn_distance` behind.
    pub fn update(&mut self, ctx: &mut EngineContext, player_z: f32) {
        let horizon = player_z + self.config.view_distance;

        while self.next_segment_z < horizon {
            self.spawn_segment(ctx);
        }

        while self.next_row_z < horizon {
            self.spawn_row(ctx);
            self.next_row_z += self.row_spacing(self.next_row_z);
        }

        let cutoff = player_z - self.config.despawn_distance;
        let mut i = 0;
        while i < self.pieces.len() {
            if self.pieces[i].end_z < cutoff {
                let piece = self.pieces.swap_remove(i);
                ctx.despawn(piece.id);
            } else {
                i += 1;
            }
        }
    }

    /// Despawn everything and rewind the generator, so the next `start`
    /// lays out the same track again.
    pub fn clear(&mut self, ctx: &mut EngineContext) {
        for piece in self.pieces.drain(..) {
            ctx.despawn(piece.id);
        }
        self.rng = Rng::new(self.config.seed);
    }

    /// Gap to the next row when the current row sits at `z`.
    pub fn row_spacing(&self, z: f32) -> f32 {
        let t = if self.config.ramp_distance > 0.0 {
            (z - self.origin_z) / self.config.ramp_distance
        } else {
            1.0
        };
        lerp(self.config.obstacle_spacing, self.config.min_obstacle_spacing, t)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    fn spawn_segment(&mut self, ctx: &mut EngineContext) {
        let length = self.config.segment_length;
        let half_extents = Vec3::new(self.ground_half_width, GROUND_THICKNESS * 0.5, length * 0.5);
        let center = Vec3::new(0.0, -GROUND_THICKNESS * 0.5, self.next_segment_z + length * 0.5);

        let id = ctx.next_id();
        let model = ctx.model("ground", models::GROUND);
        ctx.spawn_with_body(
            Entity::new(id)
                .with_tag(GROUND_TAG)
                .with_model(model)
                .with_scale(half_extents * 2.0),
            BodyDesc::fixed(ColliderDesc::Cuboid { half_extents }).with_position(center),
            ColliderMaterial::default(),
        );

        self.next_segment_z += length;
        self.pieces.push(Piece {
            id,
            end_z: self.next_segment_z,
        });
    }

    /// One row blocks one or two lanes, never all three.
    fn spawn_row(&mut self, ctx: &mut EngineContext) {
        let z = self.next_row_z;
        let kind = if self.rng.next_f32() < self.config.overhead_chance {
            ObstacleKind::Overhead
        } else {
            ObstacleKind::Barrier
        };

        let open = self.rng.next_int(3) as usize;
        let blocked = 1 + self.rng.next_int(2);
        let mut placed = 0;
        let mut lane = (open + 1) % 3;
        while placed < blocked {
            self.spawn_obstacle(ctx, kind, self.lanes[lane], z);
            placed += 1;
            lane = (lane + 1) % 3;
        }
    }

    fn spawn_obstacle(&mut self, ctx: &mut EngineContext, kind: ObstacleKind, x: f32, z: f32) {
        let half_extents = kind.half_extents();
        let (name, default) = kind.model_name();

        let id = ctx.next_id();
        let model = ctx.model(name, default);
        ctx.spawn_with_body(
            Entity::new(id)
                .with_tag(OBSTACLE_TAG)
                .with_model(model)
                .with_scale(half_extents * 2.0),
            BodyDesc::fixed(ColliderDesc::Cuboid { half_extents })
                .with_position(Vec3::new(x, kind.center_y(), z)),
            ColliderMaterial::default(),
        );

        self.pieces.push(Piece {
            id,
            end_z: z + OBSTACLE_HALF_DEPTH,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seed: u64) -> (EngineContext, Track) {
        let mut config = RunnerConfig::default();
        config.track.seed = seed;
        let mut ctx = EngineContext::new();
        let mut track = Track::new(&config);
        track.start(&mut ctx, 0.0);
        (ctx, track)
    }

    fn obstacle_positions(ctx: &EngineContext) -> Vec<Vec3> {
        ctx.scene
            .find_all_by_tag(OBSTACLE_TAG)
            .into_iter()
            .map(|e| e.pos)
            .collect()
    }

    #[test]
    fn start_covers_view_distance() {
        let (ctx, track) = started(1);
        let ground = ctx.scene.find_all_by_tag(GROUND_TAG);

        // Segments from -20 up to at least 120.
        assert_eq!(ground.len(), 7);
        assert!(track.next_segment_z >= 120.0);
        assert_eq!(track.piece_count(), ctx.scene.len());
        assert_eq!(ctx.physics.body_count(), ctx.scene.len());
    }

    #[test]
    fn run_up_is_clear() {
        let (ctx, _track) = started(1);
        let positions = obstacle_positions(&ctx);
        assert!(!positions.is_empty());
        assert!(positions.iter().all(|p| p.z >= 30.0 && p.z < 120.0));
    }

    #[test]
    fn same_seed_same_layout() {
        let (a, _) = started(42);
        let (b, _) = started(42);
        assert_eq!(obstacle_positions(&a), obstacle_positions(&b));
    }

    #[test]
    fn rows_leave_a_lane_open() {
        let (ctx, _) = started(7);
        let positions = obstacle_positions(&ctx);

        let mut rows: Vec<f32> = positions.iter().map(|p| p.z).collect();
        rows.sort_by(|a, b| a.total_cmp(b));
        rows.dedup();
        for z in rows {
            let in_row = positions.iter().filter(|p| p.z == z).count();
            assert!((1..=2).contains(&in_row), "row at z={} blocks {} lanes", z, in_row);
        }
    }

    #[test]
    fn obstacles_sit_in_lanes() {
        let (ctx, _) = started(3);
        for e in ctx.scene.find_all_by_tag(OBSTACLE_TAG) {
            assert!([-3.1, 0.0, 3.1].contains(&e.pos.x), "x={}", e.pos.x);
            assert!(e.pos.y == 0.5 || e.pos.y == 2.5, "y={}", e.pos.y);
        }
    }

    #[test]
    fn spacing_ramps_down() {
        let (_, track) = started(1);
        assert!((track.row_spacing(0.0) - 24.0).abs() < 1e-5);
        assert!((track.row_spacing(750.0) - 18.0).abs() < 1e-5);
        assert!((track.row_spacing(1500.0) - 12.0).abs() < 1e-5);
        assert!((track.row_spacing(5000.0) - 12.0).abs() < 1e-5);
    }

    #[test]
    fn pieces_behind_player_are_despawned() {
        let (mut ctx, mut track) = started(1);
        track.update(&mut ctx, 300.0);

        for e in ctx.scene.iter() {
            assert!(e.pos.z > 300.0 - 20.0 - 20.0, "stale piece at z={}", e.pos.z);
        }
        assert!(track.next_segment_z >= 420.0);
        assert_eq!(ctx.physics.body_count(), ctx.scene.len());
    }

    #[test]
    fn clear_removes_everything() {
        let (mut ctx, mut track) = started(1);
        track.clear(&mut ctx);
        assert!(ctx.scene.is_empty());
        assert_eq!(ctx.physics.body_count(), 0);
        assert_eq!(track.piece_count(), 0);
    }

    #[test]
    fn restart_repeats_layout() {
        let (mut ctx, mut track) = started(9);
        let first = obstacle_positions(&ctx);
        track.update(&mut ctx, 200.0);

        track.start(&mut ctx, 0.0);
        assert_eq!(obstacle_positions(&ctx), first);
    }
}
