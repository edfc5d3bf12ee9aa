//! Hider/hunter pursuit episodes.
//!
//! An episode starts with [`HiderHunterEnv::reset`], which places both agents
//! on free cells, and advances one [`HiderHunterEnv::step`] at a time with one
//! discrete [`Action`] per agent. The hunter wins when the agents get closer
//! than `capture_ratio × (r_hider + r_hunter)`; the hider wins by lasting
//! until the step cap.

use hashbrown::HashSet;
use tracing::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Body, EntityId, Wanderer};
use crate::config::{ResetMode, RewardPair, SimConfig};
use crate::error::{SimError, SimResult};
use crate::map::{cell_of, CellCoord, GridMap};
use crate::observation::{observation_len, observe_with};
use crate::prng::Prng;
use crate::raycast::{cast_fan, RayHit};
use crate::stats::EpisodeStats;

/// Discrete per-agent action. Indices follow declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Action {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    Hold,
}

impl Action {
    pub const COUNT: usize = 7;

    pub const ALL: [Action; Action::COUNT] = [
        Action::Forward,
        Action::Backward,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::TurnLeft,
        Action::TurnRight,
        Action::Hold,
    ];

    pub fn from_index(index: usize) -> SimResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(SimError::InvalidAction(index))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// `(forward, strafe, rotate)`, each in {-1, 0, 1}.
    pub fn controls(self) -> (i8, i8, i8) {
        match self {
            Action::Forward => (1, 0, 0),
            Action::Backward => (-1, 0, 0),
            Action::StrafeLeft => (0, -1, 0),
            Action::StrafeRight => (0, 1, 0),
            Action::TurnLeft => (0, 0, -1),
            Action::TurnRight => (0, 0, 1),
            Action::Hold => (0, 0, 0),
        }
    }

    pub fn from_action_str(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == action)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Backward => "backward",
            Action::StrafeLeft => "strafe_left",
            Action::StrafeRight => "strafe_right",
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::Hold => "hold",
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = SimError;

    fn try_from(index: usize) -> SimResult<Self> {
        Self::from_index(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    Hider,
    Hunter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EpisodePhase {
    Running,
    /// The hunter closed in on the hider.
    Caught,
    /// The step cap was reached without a capture.
    TimedOut,
}

impl EpisodePhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, EpisodePhase::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EpisodePhase::Running => "running",
            EpisodePhase::Caught => "caught",
            EpisodePhase::TimedOut => "timed_out",
        }
    }
}

/// Explicit placement for [`HiderHunterEnv::reset_at`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

impl Pose {
    pub const fn new(x: f32, y: f32, heading: f32) -> Self {
        Self { x, y, heading }
    }
}

/// Hider observation first, hunter second.
pub type ObservationPair = (Vec<f32>, Vec<f32>);

#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observations: ObservationPair,
    pub rewards: RewardPair,
    pub done: bool,
    pub phase: EpisodePhase,
    /// Center-to-center distance between the agents after the step.
    pub distance: f32,
    pub steps: u32,
}

/// Two-agent pursuit environment over a procedurally generated maze.
#[derive(Debug, Clone)]
pub struct HiderHunterEnv {
    config: SimConfig,
    rng: Prng,
    map: GridMap,
    /// The map came from the caller and is never regenerated.
    fixed_map: bool,
    /// The current map has not hosted an episode yet.
    fresh_map: bool,
    hider: Agent,
    hunter: Agent,
    wanderers: Vec<Wanderer>,
    steps: u32,
    phase: EpisodePhase,
    stats: EpisodeStats,
}

impl HiderHunterEnv {
    /// Generate a maze from `config.maze` and run the first reset.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let mut rng = Prng::new(resolve_seed(config.seed));
        let map = GridMap::generate(&config.maze, &mut rng)?;
        Self::build(config, rng, map, false)
    }

    /// Use a caller-provided layout for every episode.
    pub fn with_map(config: SimConfig, map: GridMap) -> SimResult<Self> {
        config.validate()?;
        let rng = Prng::new(resolve_seed(config.seed));
        Self::build(config, rng, map, true)
    }

    fn build(config: SimConfig, rng: Prng, map: GridMap, fixed_map: bool) -> SimResult<Self> {
        let (sx, sy) = map.start_pos()?;
        let hider = Agent::new(EntityId::HIDER, sx, sy, 0.0, &config.agent);
        let hunter = Agent::new(EntityId::HUNTER, sx, sy, 0.0, &config.agent);
        let mut env = Self {
            config,
            rng,
            map,
            fixed_map,
            fresh_map: true,
            hider,
            hunter,
            wanderers: Vec::new(),
            steps: 0,
            phase: EpisodePhase::Running,
            stats: EpisodeStats::new(),
        };
        env.reset()?;
        Ok(env)
    }

    /// Start a new episode and return the initial observations.
    pub fn reset(&mut self) -> SimResult<ObservationPair> {
        if self.config.episode.regenerate_each_reset && !self.fixed_map && !self.fresh_map {
            self.map = GridMap::generate(&self.config.maze, &mut self.rng)?;
        }
        self.fresh_map = false;

        let nearby = match self.config.episode.reset_mode {
            ResetMode::Random => false,
            ResetMode::Nearby => true,
            ResetMode::Mixed { nearby_probability } => self.rng.chance(nearby_probability),
        };

        let (hider_pos, hunter_pos) = if nearby {
            self.spawn_nearby()?
        } else {
            self.spawn_random()?
        };
        debug!(
            mode = if nearby { "nearby" } else { "random" },
            hider = ?hider_pos,
            hunter = ?hunter_pos,
            "episode reset"
        );

        let hider = Pose::new(hider_pos.0, hider_pos.1, self.rng.angle());
        let hunter = Pose::new(hunter_pos.0, hunter_pos.1, self.rng.angle());
        self.place(hider, hunter)
    }

    /// Start a new episode with both agents at explicit poses on the current map.
    pub fn reset_at(&mut self, hider: Pose, hunter: Pose) -> SimResult<ObservationPair> {
        let radius = self.config.agent.radius;
        if self.map.blocks_circle(hider.x, hider.y, radius)
            || self.map.blocks_circle(hunter.x, hunter.y, radius)
        {
            return Err(SimError::InvalidConfig("spawn pose overlaps a wall"));
        }
        self.fresh_map = false;
        self.place(hider, hunter)
    }

    fn place(&mut self, hider: Pose, hunter: Pose) -> SimResult<ObservationPair> {
        let cfg = &self.config.agent;
        self.hider = Agent::new(EntityId::HIDER, hider.x, hider.y, hider.heading, cfg);
        self.hunter = Agent::new(EntityId::HUNTER, hunter.x, hunter.y, hunter.heading, cfg);
        self.spawn_wanderers()?;
        self.steps = 0;
        self.phase = EpisodePhase::Running;
        Ok(self.observations())
    }

    fn spawn_random(&mut self) -> SimResult<((f32, f32), (f32, f32))> {
        let mut avoid: HashSet<CellCoord> = HashSet::new();
        let hider = self.map.find_random_empty(&avoid, &mut self.rng)?;
        avoid.insert(cell_of(hider.0, hider.1));
        let hunter = self.map.find_random_empty(&avoid, &mut self.rng)?;
        Ok((hider, hunter))
    }

    fn spawn_nearby(&mut self) -> SimResult<((f32, f32), (f32, f32))> {
        let mut avoid: HashSet<CellCoord> = HashSet::new();
        let hider = self.map.find_random_empty(&avoid, &mut self.rng)?;
        let hider_cell = cell_of(hider.0, hider.1);

        if let Some(hunter) = self.map.adjacent_free_cell(hider_cell, &mut self.rng) {
            return Ok((hider, hunter));
        }

        warn!(cell = ?hider_cell, "no free neighbor for nearby spawn, falling back to random");
        avoid.insert(hider_cell);
        let hunter = self.map.find_random_empty(&avoid, &mut self.rng)?;
        Ok((hider, hunter))
    }

    fn spawn_wanderers(&mut self) -> SimResult<()> {
        self.wanderers.clear();
        let mut avoid: HashSet<CellCoord> = HashSet::new();
        avoid.insert(cell_of(self.hider.x, self.hider.y));
        avoid.insert(cell_of(self.hunter.x, self.hunter.y));

        for i in 0..self.config.wanderer.count {
            let (x, y) = self.map.find_random_empty(&avoid, &mut self.rng)?;
            avoid.insert(cell_of(x, y));
            trace!(index = i, x, y, "wanderer spawned");
            let id = EntityId::wanderer(i as u32);
            self.wanderers
                .push(Wanderer::new(id, x, y, &self.config.wanderer, &mut self.rng));
        }
        Ok(())
    }

    /// Advance both agents by one action each (hider first).
    pub fn step(&mut self, hider_action: Action, hunter_action: Action) -> StepResult {
        let move_dt = self.config.episode.move_dt;
        let rotate_dt = self.config.episode.rotate_dt;

        for (action, agent) in [
            (hider_action, &mut self.hider),
            (hunter_action, &mut self.hunter),
        ] {
            let (forward, strafe, rotate) = action.controls();
            agent.move_by(forward, strafe, &self.map, move_dt);
            agent.rotate(rotate, rotate_dt);
        }
        for w in &mut self.wanderers {
            w.update(move_dt, &self.map, &mut self.rng);
        }
        self.steps = self.steps.saturating_add(1);

        let distance = self.hider.distance_to(&self.hunter);
        let capture_distance =
            (self.hider.radius + self.hunter.radius) * self.config.episode.capture_ratio;
        let rewards_cfg = &self.config.reward;

        let (phase, rewards) = if distance < capture_distance {
            (EpisodePhase::Caught, rewards_cfg.capture)
        } else {
            match self.config.episode.max_steps {
                None => (EpisodePhase::Running, rewards_cfg.unlimited),
                Some(cap) if self.steps >= cap => (EpisodePhase::TimedOut, rewards_cfg.timeout),
                Some(_) => (EpisodePhase::Running, rewards_cfg.survival),
            }
        };

        if phase.is_terminal() && !self.phase.is_terminal() {
            self.stats.record(phase == EpisodePhase::Caught, self.steps);
            debug!(
                outcome = phase.as_str(),
                steps = self.steps,
                distance,
                "episode finished"
            );
        }
        self.phase = phase;

        StepResult {
            observations: self.observations(),
            rewards,
            done: phase.is_terminal(),
            phase,
            distance,
            steps: self.steps,
        }
    }

    /// [`step`](Self::step) with raw action indices from a policy.
    pub fn step_indices(
        &mut self,
        hider_action: usize,
        hunter_action: usize,
    ) -> SimResult<StepResult> {
        let hider = Action::from_index(hider_action)?;
        let hunter = Action::from_index(hunter_action)?;
        Ok(self.step(hider, hunter))
    }

    /// Current observations without advancing the episode.
    pub fn observations(&self) -> ObservationPair {
        let bystanders = self.bystanders();
        let sensor = &self.config.sensor;
        (
            observe_with(&self.hider, &self.hunter, &bystanders, &self.map, sensor),
            observe_with(&self.hunter, &self.hider, &bystanders, &self.map, sensor),
        )
    }

    /// The ray fan `side` currently sees, for drawing.
    pub fn rays_for(&self, side: Side) -> Vec<RayHit> {
        let (me, other) = match side {
            Side::Hider => (&self.hider, &self.hunter),
            Side::Hunter => (&self.hunter, &self.hider),
        };
        let mut bodies: Vec<&dyn Body> = Vec::with_capacity(1 + self.wanderers.len());
        bodies.push(other);
        bodies.extend(self.bystanders());
        cast_fan((me.x, me.y), me.heading, &self.config.sensor, &self.map, &bodies)
    }

    fn bystanders(&self) -> Vec<&dyn Body> {
        self.wanderers.iter().map(|w| w as &dyn Body).collect()
    }

    pub fn agent(&self, side: Side) -> &Agent {
        match side {
            Side::Hider => &self.hider,
            Side::Hunter => &self.hunter,
        }
    }

    pub fn hider(&self) -> &Agent {
        &self.hider
    }

    pub fn hunter(&self) -> &Agent {
        &self.hunter
    }

    pub fn wanderers(&self) -> &[Wanderer] {
        &self.wanderers
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    pub fn observation_len(&self) -> usize {
        observation_len(self.config.sensor.num_rays)
    }
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x4D41_5A45)
    })
}
