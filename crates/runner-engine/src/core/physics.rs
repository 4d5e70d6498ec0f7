use glam::Vec3;
use rapier3d::control::{CharacterCollision, CharacterLength, KinematicCharacterController};
use rapier3d::parry::query::{ShapeCastHit, ShapeCastOptions};
use rapier3d::parry::shape::Shape;
use rapier3d::prelude::*;

use crate::api::types::EntityId;

/// Gap a character keeps above whatever it stands on.
const CHARACTER_SKIN: f32 = 0.02;
/// Gap the horizontal sweep keeps from walls. Smaller than the skin, so
/// the floor never blocks a horizontal move.
const CHARACTER_OFFSET: f32 = 0.01;
/// How far below the skin a character still counts as standing.
const GROUND_REACH: f32 = 0.01;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam <-> nalgebra
// ---------------------------------------------------------------------------

fn vec3_to_na(v: Vec3) -> nalgebra::Vector3<f32> {
    nalgebra::Vector3::new(v.x, v.y, v.z)
}

fn na_to_vec3(v: &nalgebra::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Track pieces: never move.
    Fixed,
    /// Characters: moved only through `PhysicsWorld::move_character`.
    KinematicPositionBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Cuboid { half_extents: Vec3 },
    CapsuleY { half_height: f32, radius: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderDesc::CapsuleY { half_height, radius } => {
                ColliderBuilder::capsule_y(half_height, radius)
            }
        }
    }
}

/// Character capsule in the usual controller terms: `height` is the full
/// height including both caps, `center_y` the capsule center above the
/// body origin (so `center_y == height / 2` puts the feet at the origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterCapsule {
    pub radius: f32,
    pub height: f32,
    pub center_y: f32,
}

impl CharacterCapsule {
    pub fn new(radius: f32, height: f32, center_y: f32) -> Self {
        Self { radius, height, center_y }
    }

    /// Half length of the capsule's inner segment. A capsule shorter than
    /// its diameter degenerates into a sphere.
    pub fn half_height(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }

    /// Lowest point of the capsule above the body origin.
    pub fn bottom(&self) -> f32 {
        self.center_y - self.half_height() - self.radius
    }

    pub fn collider(&self) -> ColliderDesc {
        ColliderDesc::CapsuleY {
            half_height: self.half_height(),
            radius: self.radius,
        }
    }

    pub fn offset(&self) -> Vec3 {
        Vec3::new(0.0, self.center_y, 0.0)
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec3,
    pub collider: ColliderDesc,
    /// Collider translation relative to the body origin.
    pub collider_offset: Vec3,
}

impl BodyDesc {
    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            position: Vec3::ZERO,
            collider,
            collider_offset: Vec3::ZERO,
        }
    }

    /// Create a kinematic character body moved through `PhysicsWorld::move_character`.
    pub fn character(capsule: CharacterCapsule) -> Self {
        Self {
            body_type: BodyType::KinematicPositionBased,
            position: Vec3::ZERO,
            collider: capsule.collider(),
            collider_offset: capsule.offset(),
        }
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }
}

/// Handle pair stored on an Entity, referencing Rapier internals.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// Result of a kinematic character move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterMove {
    /// Translation actually applied after resolving obstacles.
    pub translation: Vec3,
    /// Whether the character ended the move standing on something.
    pub grounded: bool,
    /// Entities touched during the move, in contact order, without duplicates.
    pub hits: Vec<EntityId>,
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier3D boilerplate into a single, easy-to-use struct.
///
/// Nothing here is simulated dynamically: the world holds fixed track pieces
/// and kinematic characters, and stepping it applies the character moves and
/// refreshes the query pipeline the moves sweep against.
pub struct PhysicsWorld {
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    character_controller: KinematicCharacterController,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let character_controller = KinematicCharacterController {
            offset: CharacterLength::Absolute(CHARACTER_OFFSET),
            snap_to_ground: None,
            autostep: None,
            slide: true,
            ..KinematicCharacterController::default()
        };

        Self {
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            character_controller,
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for hit lookups.
    ///
    /// New colliders become visible to character moves after the next `step`.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec3_to_na(desc.position))
            .locked_axes(LockedAxes::ROTATION_LOCKED)
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .translation(vec3_to_na(desc.collider_offset))
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Apply pending character moves and refresh the query pipeline.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &Vector::zeros(),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    // -- Character methods --

    /// Sweep a kinematic character's collider by `desired` (already scaled by
    /// `dt`). The vertical part is swept first and stops `CHARACTER_SKIN`
    /// above whatever is in the way; the horizontal part then slides along
    /// walls through the character controller. The collider never ends a
    /// move inside a solid.
    ///
    /// The resolved translation is applied on the next `step`; call at most
    /// once per body per step.
    pub fn move_character(&mut self, body: &PhysicsBody, desired: Vec3, dt: f32) -> CharacterMove {
        let (Some(rb), Some(collider)) = (
            self.bodies.get(body.body_handle),
            self.colliders.get(body.collider_handle),
        ) else {
            return CharacterMove::default();
        };

        // The body may have been teleported since the last step, so derive the
        // collider pose from the body instead of the cached collider position.
        let mut pose = match collider.position_wrt_parent() {
            Some(local) => rb.position() * local,
            None => *collider.position(),
        };
        let start = *rb.translation();
        let shape = collider.shape();
        let filter = QueryFilter::default().exclude_rigid_body(body.body_handle);

        let mut hits: Vec<EntityId> = Vec::new();

        // Vertical.
        let mut rise = 0.0;
        let mut grounded = false;
        if desired.y != 0.0 {
            match self.sweep(shape, &pose, Vector::new(0.0, desired.y, 0.0), filter) {
                Some((handle, hit)) => {
                    rise = desired.y * hit.time_of_impact;
                    grounded = desired.y < 0.0;
                    self.record_hit(&mut hits, handle);
                }
                None => rise = desired.y,
            }
        }
        pose.translation.vector.y += rise;

        if !grounded && desired.y <= 0.0 {
            grounded = self
                .sweep(shape, &pose, Vector::new(0.0, -GROUND_REACH, 0.0), filter)
                .is_some();
        }

        // Horizontal.
        let mut collisions: Vec<CharacterCollision> = Vec::new();
        let movement = self.character_controller.move_shape(
            dt,
            &self.bodies,
            &self.colliders,
            &self.query_pipeline,
            shape,
            &pose,
            Vector::new(desired.x, 0.0, desired.z),
            filter,
            |collision| collisions.push(collision),
        );
        for collision in &collisions {
            self.record_hit(&mut hits, collision.handle);
        }

        let mut translation = movement.translation;
        translation.y += rise;

        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_next_kinematic_translation(start + translation);
        }

        CharacterMove {
            translation: na_to_vec3(&translation),
            grounded,
            hits,
        }
    }

    /// Replace a character's capsule, e.g. to crouch under an overhead bar.
    /// The body shifts vertically so the capsule's lowest point stays put.
    pub fn set_character_capsule(&mut self, body: &PhysicsBody, capsule: CharacterCapsule) {
        let shift = self
            .character_capsule(body)
            .map_or(0.0, |old| old.bottom() - capsule.bottom());

        if let Some(collider) = self.colliders.get_mut(body.collider_handle) {
            collider.set_shape(SharedShape::capsule_y(capsule.half_height(), capsule.radius));
            collider.set_translation_wrt_parent(vec3_to_na(capsule.offset()));
        }

        if shift != 0.0 {
            let pos = self.body_position(body) + Vec3::new(0.0, shift, 0.0);
            self.teleport(body, pos);
        }
    }

    /// Read back a character's capsule. `None` if the collider is gone or not a capsule.
    pub fn character_capsule(&self, body: &PhysicsBody) -> Option<CharacterCapsule> {
        let collider = self.colliders.get(body.collider_handle)?;
        let capsule = collider.shape().as_capsule()?;
        let center_y = collider
            .position_wrt_parent()
            .map(|iso| iso.translation.vector.y)
            .unwrap_or(0.0);
        Some(CharacterCapsule {
            radius: capsule.radius,
            height: 2.0 * (capsule.half_height() + capsule.radius),
            center_y,
        })
    }

    /// Move a body instantly, bypassing collision resolution.
    pub fn teleport(&mut self, body: &PhysicsBody, pos: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec3_to_na(pos), true);
            if rb.is_kinematic() {
                rb.set_next_kinematic_translation(vec3_to_na(pos));
            }
        }
    }

    /// Get the current position of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> Vec3 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(rb.translation()))
            .unwrap_or(Vec3::ZERO)
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // -- private helpers --

    /// Cast `shape` along `motion`, stopping `CHARACTER_SKIN` short of the
    /// first collider in the way. Time of impact is a fraction of `motion`.
    fn sweep(
        &self,
        shape: &dyn Shape,
        pose: &Isometry<f32>,
        motion: Vector<f32>,
        filter: QueryFilter,
    ) -> Option<(ColliderHandle, ShapeCastHit)> {
        self.query_pipeline.cast_shape(
            &self.bodies,
            &self.colliders,
            pose,
            &motion,
            shape,
            ShapeCastOptions {
                max_time_of_impact: 1.0,
                target_distance: CHARACTER_SKIN,
                stop_at_penetration: true,
                compute_impact_geometry_on_penetration: false,
            },
            filter,
        )
    }

    fn record_hit(&self, hits: &mut Vec<EntityId>, handle: ColliderHandle) {
        if let Some(id) = self.collider_to_entity(handle) {
            if !hits.contains(&id) {
                hits.push(id);
            }
        }
    }

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
