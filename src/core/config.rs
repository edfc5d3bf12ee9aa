//! Simulation configuration.
//!
//! Defaults mirror the training setup the hider/hunter policies were tuned
//! against. All sections deserialize with `#[serde(default)]`, so a partial
//! JSON file only needs the fields it overrides.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::maze::widened_dims;

/// Upper bound on `max_distance / step_size`, the samples marched per ray.
pub const MAX_RAY_SAMPLES: f32 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MazeConfig {
    /// Logical maze width in cells (odd, >= 3).
    pub width: usize,
    /// Logical maze height in cells (odd, >= 3).
    pub height: usize,
    /// Block expansion factor applied after carving. 1 keeps single-cell corridors.
    pub corridor_width: usize,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 15,
            height: 15,
            corridor_width: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    /// Collision radius in cells.
    pub radius: f32,
    /// Cells per second.
    pub move_speed: f32,
    /// Radians per second.
    pub rot_speed: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            radius: 0.21,
            move_speed: 2.5,
            rot_speed: 120f32.to_radians(),
        }
    }
}

/// Passive wandering NPCs. They move on their own and show up in ray casts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WandererConfig {
    pub count: usize,
    pub radius: f32,
    pub speed: f32,
    /// Bounds (seconds) on how long a wanderer keeps one heading.
    pub min_wander_s: f32,
    pub max_wander_s: f32,
}

impl Default for WandererConfig {
    fn default() -> Self {
        Self {
            count: 0,
            radius: 0.19,
            speed: 2.0,
            min_wander_s: 0.4,
            max_wander_s: 1.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    /// Angular span of the ray fan (radians).
    pub fov: f32,
    pub num_rays: usize,
    /// Range at which rays saturate (cells).
    pub max_distance: f32,
    /// Marching increment (cells). Wall distances overshoot the true boundary
    /// by less than one step; objects thinner than one step can be skipped.
    /// `max_distance / step_size` is capped at [`MAX_RAY_SAMPLES`] so a ray
    /// stays bounded in work.
    pub step_size: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            fov: 65f32.to_radians(),
            num_rays: 15,
            max_distance: 16.0,
            step_size: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardPair {
    pub hider: f32,
    pub hunter: f32,
}

impl RewardPair {
    pub const fn new(hider: f32, hunter: f32) -> Self {
        Self { hider, hunter }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardConfig {
    /// Paid once when the hunter catches the hider.
    pub capture: RewardPair,
    /// Paid once when the step cap is reached without a capture.
    pub timeout: RewardPair,
    /// Shaping paid on every other step.
    pub survival: RewardPair,
    /// Paid on non-terminal steps when the episode has no step cap.
    pub unlimited: RewardPair,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            capture: RewardPair::new(-20.0, 20.0),
            timeout: RewardPair::new(5.0, -2.0),
            survival: RewardPair::new(1.0, -1.0),
            unlimited: RewardPair::new(0.0, 0.0),
        }
    }
}

/// How agents are placed on reset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum ResetMode {
    /// Both agents on independent uniformly random free cells.
    Random,
    /// Hunter on a free cell adjacent to the hider (falls back to `Random`).
    Nearby,
    /// Coin flip per reset: `Nearby` with the given probability, else `Random`.
    Mixed { nearby_probability: f32 },
}

impl Default for ResetMode {
    fn default() -> Self {
        ResetMode::Mixed {
            nearby_probability: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EpisodeConfig {
    /// Step cap. `None` disables the timeout and the per-step shaping reward.
    pub max_steps: Option<u32>,
    /// Simulated seconds of movement per step.
    pub move_dt: f32,
    /// Simulated seconds of rotation per step.
    pub rotate_dt: f32,
    /// Capture when distance < `capture_ratio` × (sum of radii).
    pub capture_ratio: f32,
    pub reset_mode: ResetMode,
    /// Carve a fresh maze on every reset instead of reusing the first one.
    pub regenerate_each_reset: bool,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_steps: Some(300),
            move_dt: 0.20,
            rotate_dt: 0.15,
            capture_ratio: 0.92,
            reset_mode: ResetMode::default(),
            regenerate_each_reset: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    pub maze: MazeConfig,
    pub agent: AgentConfig,
    pub wanderer: WandererConfig,
    pub sensor: SensorConfig,
    pub reward: RewardConfig,
    pub episode: EpisodeConfig,
    /// Seed for every random decision. `None` picks one from the clock.
    pub seed: Option<u64>,
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<u32>) -> Self {
        self.episode.max_steps = max_steps;
        self
    }

    pub fn with_reset_mode(mut self, mode: ResetMode) -> Self {
        self.episode.reset_mode = mode;
        self
    }

    /// Length of each per-agent observation vector.
    pub fn observation_len(&self) -> usize {
        crate::observation::observation_len(self.sensor.num_rays)
    }

    /// Validate the configuration, returning an error if invalid.
    pub fn validate(&self) -> SimResult<()> {
        let m = &self.maze;
        if m.width < 3
            || m.height < 3
            || m.width % 2 == 0
            || m.height % 2 == 0
            || widened_dims(m.width, m.height, 1).is_none()
        {
            return Err(SimError::InvalidMazeDimensions {
                width: m.width,
                height: m.height,
            });
        }
        if m.corridor_width == 0 || widened_dims(m.width, m.height, m.corridor_width).is_none() {
            return Err(SimError::InvalidWidenFactor(m.corridor_width));
        }

        let a = &self.agent;
        if !a.radius.is_finite() || a.radius <= 0.0 || a.radius >= 0.5 {
            return Err(SimError::InvalidConfig("agent.radius must be in (0, 0.5)"));
        }
        if !a.move_speed.is_finite() || a.move_speed < 0.0 {
            return Err(SimError::InvalidConfig("agent.move_speed must be finite and >= 0"));
        }
        if !a.rot_speed.is_finite() || a.rot_speed < 0.0 {
            return Err(SimError::InvalidConfig("agent.rot_speed must be finite and >= 0"));
        }

        let w = &self.wanderer;
        if w.count > 0 {
            if !w.radius.is_finite() || w.radius <= 0.0 || w.radius >= 0.5 {
                return Err(SimError::InvalidConfig("wanderer.radius must be in (0, 0.5)"));
            }
            if !w.speed.is_finite() || w.speed < 0.0 {
                return Err(SimError::InvalidConfig("wanderer.speed must be finite and >= 0"));
            }
            if !(w.min_wander_s > 0.0 && w.min_wander_s <= w.max_wander_s) {
                return Err(SimError::InvalidConfig(
                    "wanderer interval must satisfy 0 < min_wander_s <= max_wander_s",
                ));
            }
        }

        let s = &self.sensor;
        if s.num_rays == 0 {
            return Err(SimError::InvalidConfig("sensor.num_rays must be >= 1"));
        }
        if !s.fov.is_finite() || s.fov < 0.0 || s.fov > core::f32::consts::TAU {
            return Err(SimError::InvalidConfig("sensor.fov must be in [0, 2π]"));
        }
        if !s.max_distance.is_finite() || s.max_distance <= 0.0 {
            return Err(SimError::InvalidConfig("sensor.max_distance must be > 0"));
        }
        if !s.step_size.is_finite() || s.step_size <= 0.0 || s.step_size > s.max_distance {
            return Err(SimError::InvalidConfig(
                "sensor.step_size must be in (0, max_distance]",
            ));
        }
        if s.max_distance / s.step_size > MAX_RAY_SAMPLES {
            return Err(SimError::InvalidConfig(
                "sensor.max_distance / sensor.step_size must be <= 100000",
            ));
        }

        let e = &self.episode;
        if e.max_steps == Some(0) {
            return Err(SimError::InvalidConfig("episode.max_steps must be >= 1 when set"));
        }
        if !e.move_dt.is_finite()
            || e.move_dt < 0.0
            || !e.rotate_dt.is_finite()
            || e.rotate_dt < 0.0
        {
            return Err(SimError::InvalidConfig("episode dt values must be finite and >= 0"));
        }
        if !e.capture_ratio.is_finite() || e.capture_ratio <= 0.0 {
            return Err(SimError::InvalidConfig("episode.capture_ratio must be > 0"));
        }
        if let ResetMode::Mixed { nearby_probability } = e.reset_mode {
            if !(0.0..=1.0).contains(&nearby_probability) {
                return Err(SimError::InvalidConfig(
                    "reset_mode.nearby_probability must be in [0, 1]",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
        assert_eq!(SimConfig::default().observation_len(), 2 * 15 + 6);
    }

    #[test]
    fn validate_rejects_bad_sections() {
        let mut cfg = SimConfig::default();
        cfg.maze.width = 14;
        assert!(matches!(
            cfg.validate(),
            Err(SimError::InvalidMazeDimensions { width: 14, .. })
        ));

        let mut cfg = SimConfig::default();
        cfg.sensor.step_size = 0.0;
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));

        let mut cfg = SimConfig::default();
        cfg.sensor.num_rays = 0;
        assert!(cfg.validate().is_err());

        let cfg = SimConfig::default().with_max_steps(Some(0));
        assert!(cfg.validate().is_err());

        let cfg = SimConfig::default().with_reset_mode(ResetMode::Mixed {
            nearby_probability: 1.5,
        });
        assert!(cfg.validate().is_err());

        let cfg = SimConfig::default().with_max_steps(None).with_seed(3);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn validate_bounds_grid_size_and_ray_work() {
        let mut cfg = SimConfig::default();
        cfg.maze.corridor_width = usize::MAX / 4;
        assert_eq!(cfg.validate(), Err(SimError::InvalidWidenFactor(usize::MAX / 4)));
        assert_eq!(
            crate::episode::HiderHunterEnv::new(cfg.with_seed(1)).err(),
            Some(SimError::InvalidWidenFactor(usize::MAX / 4))
        );

        let mut cfg = SimConfig::default();
        cfg.maze.corridor_width = 4;
        assert_eq!(cfg.validate(), Ok(()));

        let mut cfg = SimConfig::default();
        cfg.sensor.step_size = 1e-30;
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));

        let mut cfg = SimConfig::default();
        cfg.sensor.step_size = 1e-3;
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SimConfig = serde_json::from_str(
            r#"{
                "maze": { "width": 21 },
                "episode": { "max_steps": null, "reset_mode": { "mode": "nearby" } },
                "seed": 9
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.maze.width, 21);
        assert_eq!(cfg.maze.height, 15);
        assert_eq!(cfg.episode.max_steps, None);
        assert_eq!(cfg.episode.reset_mode, ResetMode::Nearby);
        assert_eq!(cfg.sensor, SensorConfig::default());
        assert_eq!(cfg.seed, Some(9));
    }
}
