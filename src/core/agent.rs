//! Mobile agents: circle bodies moving through a [`GridMap`].

use core::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{AgentConfig, WandererConfig};
use crate::map::GridMap;
use crate::prng::Prng;

/// Stable identity for anything the ray caster can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    pub const HIDER: EntityId = EntityId(0);
    pub const HUNTER: EntityId = EntityId(1);

    /// Wanderers are numbered after the two adversaries.
    pub const fn wanderer(index: u32) -> EntityId {
        EntityId(2 + index)
    }
}

/// Minimal capability the ray caster needs from a dynamic object.
pub trait Body: Send + Sync {
    fn id(&self) -> EntityId;
    fn position(&self) -> (f32, f32);
    fn radius(&self) -> f32;
}

/// Wrap a heading into [0, 2π).
pub fn wrap_angle(a: f32) -> f32 {
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if r >= TAU {
        0.0
    } else {
        r
    }
}

/// A steerable agent (hider or hunter).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Agent {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    /// Radians in [0, 2π).
    pub heading: f32,
    pub radius: f32,
    pub move_speed: f32,
    pub rot_speed: f32,
}

impl Agent {
    pub fn new(id: EntityId, x: f32, y: f32, heading: f32, cfg: &AgentConfig) -> Self {
        Self {
            id,
            x,
            y,
            heading: wrap_angle(heading),
            radius: cfg.radius,
            move_speed: cfg.move_speed,
            rot_speed: cfg.rot_speed,
        }
    }

    /// Move relative to the current heading.
    ///
    /// `forward` and `strafe` are clamped to {-1, 0, 1}; positive strafe is
    /// to the agent's right (clockwise in screen coordinates, y down).
    pub fn move_by(&mut self, forward: i8, strafe: i8, map: &GridMap, dt: f32) {
        let forward = forward.clamp(-1, 1) as f32;
        let strafe = strafe.clamp(-1, 1) as f32;
        let (sin, cos) = self.heading.sin_cos();
        let scale = self.move_speed * dt;
        let dx = (cos * forward - sin * strafe) * scale;
        let dy = (sin * forward + cos * strafe) * scale;
        self.try_move(dx, dy, map);
    }

    /// Apply a world-space displacement one axis at a time.
    ///
    /// X goes first; Y is then tested from the (possibly updated) X, which lets
    /// the agent slide along a wall instead of stopping dead. A blocked axis
    /// is simply dropped.
    pub fn try_move(&mut self, dx: f32, dy: f32, map: &GridMap) {
        let next_x = self.x + dx;
        if !map.blocks_circle(next_x, self.y, self.radius) {
            self.x = next_x;
        }
        let next_y = self.y + dy;
        if !map.blocks_circle(self.x, next_y, self.radius) {
            self.y = next_y;
        }
    }

    /// `direction` is clamped to {-1, 0, 1}; -1 turns left.
    pub fn rotate(&mut self, direction: i8, dt: f32) {
        let direction = direction.clamp(-1, 1) as f32;
        self.heading = wrap_angle(self.heading + self.rot_speed * direction * dt);
    }

    pub fn distance_to(&self, other: &impl Body) -> f32 {
        let (ox, oy) = other.position();
        (self.x - ox).hypot(self.y - oy)
    }
}

impl Body for Agent {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Decorative NPC that drifts around the maze on random headings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wanderer {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub speed: f32,
    /// Heading it is currently walking along.
    pub target_dir: f32,
    wander_time: f32,
    min_wander_s: f32,
    max_wander_s: f32,
}

impl Wanderer {
    pub fn new(id: EntityId, x: f32, y: f32, cfg: &WandererConfig, rng: &mut Prng) -> Self {
        let mut w = Self {
            id,
            x,
            y,
            radius: cfg.radius,
            speed: cfg.speed,
            target_dir: 0.0,
            wander_time: 0.0,
            min_wander_s: cfg.min_wander_s,
            max_wander_s: cfg.max_wander_s,
        };
        w.pick_new_direction(rng);
        w
    }

    fn pick_new_direction(&mut self, rng: &mut Prng) {
        self.target_dir = rng.angle();
        self.wander_time = rng.gen_range_f32(self.min_wander_s, self.max_wander_s);
    }

    /// Advance by `dt` seconds. Bumping into a wall re-rolls the heading
    /// instead of sliding.
    pub fn update(&mut self, dt: f32, map: &GridMap, rng: &mut Prng) {
        self.wander_time -= dt;
        if self.wander_time <= 0.0 {
            self.pick_new_direction(rng);
        }

        let (sin, cos) = self.target_dir.sin_cos();
        let nx = self.x + cos * self.speed * dt;
        let ny = self.y + sin * self.speed * dt;
        if map.blocks_circle(nx, ny, self.radius) {
            self.pick_new_direction(rng);
        } else {
            self.x = nx;
            self.y = ny;
        }
    }
}

impl Body for Wanderer {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}
